use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::provider::Address;

pub const DEFAULT_BASE_APY: f64 = 12.5;
pub const DEFAULT_VIP_BONUSES: [f64; 3] = [0.25, 0.5, 1.0];
pub const DEFAULT_WITHDRAWAL_FEE: f64 = 2.0;

/// Treat `null` and missing the same: the type's default.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept JSON numbers and numeric strings, defaulting to zero.
fn flexible_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

/// Backend identifiers arrive as strings or numbers.
fn flexible_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Staking position of one wallet as the backend reports it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    #[serde(default, deserialize_with = "flexible_f64")]
    pub staked_amount: f64,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub total_earned: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub vip_level: u8,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub claimable_rewards: f64,
}

/// Platform-wide parameters. Client defaults apply until the first fetch succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformSettings {
    #[serde(rename = "baseAPY")]
    pub base_apy: f64,
    #[serde(rename = "vip1Bonus")]
    pub vip1_bonus: f64,
    #[serde(rename = "vip2Bonus")]
    pub vip2_bonus: f64,
    #[serde(rename = "vip3Bonus")]
    pub vip3_bonus: f64,
    #[serde(rename = "platformWallet", skip_serializing_if = "Option::is_none")]
    pub platform_wallet: Option<String>,
    #[serde(rename = "withdrawalFee", skip_serializing_if = "Option::is_none")]
    pub withdrawal_fee: Option<f64>,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            base_apy: DEFAULT_BASE_APY,
            vip1_bonus: DEFAULT_VIP_BONUSES[0],
            vip2_bonus: DEFAULT_VIP_BONUSES[1],
            vip3_bonus: DEFAULT_VIP_BONUSES[2],
            platform_wallet: None,
            withdrawal_fee: None,
        }
    }
}

impl PlatformSettings {
    /// APY bonus for a VIP level. Levels outside 1..=3 get none.
    pub fn vip_bonus(&self, level: u8) -> f64 {
        match level {
            1 => self.vip1_bonus,
            2 => self.vip2_bonus,
            3 => self.vip3_bonus,
            _ => 0.0,
        }
    }

    /// Withdrawal fee in percent. An unset or zero fee falls back to the default.
    pub fn withdrawal_fee_percent(&self) -> f64 {
        self.withdrawal_fee
            .filter(|fee| *fee > 0.0)
            .unwrap_or(DEFAULT_WITHDRAWAL_FEE)
    }

    /// Destination for on-chain stakes, if the operator configured a valid one.
    pub fn platform_wallet_address(&self) -> Option<Address> {
        self.platform_wallet
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .and_then(|s| s.parse().ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Stake,
    Unstake,
    Deposit,
    Withdraw,
    Claim,
    Interest,
    Bonus,
    Other(String),
}

impl TransactionKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Stake => "stake",
            Self::Unstake => "unstake",
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
            Self::Claim => "claim",
            Self::Interest => "interest",
            Self::Bonus => "bonus",
            Self::Other(s) => s,
        }
    }

    /// Money moving into the staking position.
    pub fn is_inflow(&self) -> bool {
        matches!(
            self,
            Self::Deposit | Self::Stake | Self::Interest | Self::Claim | Self::Bonus
        )
    }

    /// Capitalized label for tables.
    pub fn label(&self) -> String {
        let s = self.as_str();
        let mut chars = s.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl From<&str> for TransactionKind {
    fn from(s: &str) -> Self {
        match s {
            "stake" => Self::Stake,
            "unstake" => Self::Unstake,
            "deposit" => Self::Deposit,
            "withdraw" => Self::Withdraw,
            "claim" => Self::Claim,
            "interest" => Self::Interest,
            "bonus" => Self::Bonus,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TransactionKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TransactionKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}

/// Status shared by ledger entries and withdrawal requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryStatus {
    Pending,
    Completed,
    Approved,
    Rejected,
    Other(String),
}

impl EntryStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Other(s) => s,
        }
    }

    /// Badge text: known statuses are capitalized, unknown ones shown as-is.
    pub fn badge(&self) -> String {
        match self {
            Self::Pending => "Pending".into(),
            Self::Completed => "Completed".into(),
            Self::Approved => "Approved".into(),
            Self::Rejected => "Rejected".into(),
            Self::Other(s) => s.clone(),
        }
    }
}

impl From<&str> for EntryStatus {
    fn from(s: &str) -> Self {
        match s {
            "pending" => Self::Pending,
            "completed" => Self::Completed,
            "approved" => Self::Approved,
            "rejected" => Self::Rejected,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EntryStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EntryStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}

/// Ledger entry from `/api/user/:address/transactions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default, alias = "_id", deserialize_with = "flexible_id")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub amount: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub date: String,
    pub status: EntryStatus,
}

/// Withdrawal request from `/api/user/:address/withdrawals`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRequest {
    #[serde(default, alias = "_id", deserialize_with = "flexible_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub amount: f64,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub fee: f64,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub net_amount: f64,
    pub status: EntryStatus,
    #[serde(default, deserialize_with = "null_default")]
    pub requested_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl WithdrawalRequest {
    pub fn is_pending(&self) -> bool {
        self.status == EntryStatus::Pending
    }

    /// `YYYY-MM-DD` part of the request timestamp.
    pub fn requested_date(&self) -> &str {
        self.requested_at
            .split_once('T')
            .map(|(date, _)| date)
            .unwrap_or(&self.requested_at)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StakeDirection {
    Stake,
    Unstake,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRequest<'a> {
    pub wallet_address: String,
    pub ip_address: &'a str,
    pub user_agent: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApprovalResponse {
    #[serde(default, deserialize_with = "null_default")]
    pub approved: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeRequest {
    pub wallet_address: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub direction: StakeDirection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceReport {
    pub wallet_address: String,
    pub eth: String,
    pub usdt: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletRequest {
    pub wallet_address: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawRequestBody {
    pub wallet_address: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClaimResponse {
    #[serde(default, deserialize_with = "flexible_f64")]
    pub amount: f64,
}

/// Body of a non-2xx response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendMessage {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_account_defaults_missing_and_null() {
        let account: UserAccount =
            serde_json::from_str(r#"{"stakedAmount": 1500, "vipLevel": null}"#).unwrap();
        assert_eq!(account.staked_amount, 1500.0);
        assert_eq!(account.total_earned, 0.0);
        assert_eq!(account.vip_level, 0);
        assert_eq!(account.claimable_rewards, 0.0);
    }

    #[test]
    fn settings_fill_client_defaults() {
        let settings: PlatformSettings = serde_json::from_str(r#"{"baseAPY": 15}"#).unwrap();
        assert_eq!(settings.base_apy, 15.0);
        assert_eq!(settings.vip2_bonus, 0.5);
        assert_eq!(settings.withdrawal_fee_percent(), 2.0);
        assert!(settings.platform_wallet_address().is_none());
    }

    #[test]
    fn settings_vip_bonus_lookup() {
        let settings = PlatformSettings::default();
        assert_eq!(settings.vip_bonus(0), 0.0);
        assert_eq!(settings.vip_bonus(3), 1.0);
        assert_eq!(settings.vip_bonus(9), 0.0);
    }

    #[test]
    fn zero_withdrawal_fee_uses_default() {
        let settings = PlatformSettings {
            withdrawal_fee: Some(0.0),
            ..Default::default()
        };
        assert_eq!(settings.withdrawal_fee_percent(), 2.0);
        let settings = PlatformSettings {
            withdrawal_fee: Some(1.5),
            ..Default::default()
        };
        assert_eq!(settings.withdrawal_fee_percent(), 1.5);
    }

    #[test]
    fn transaction_unknown_kind_and_string_amount() {
        let tx: Transaction = serde_json::from_str(
            r#"{"_id": 7, "type": "referral", "amount": "12.5", "date": "2024-01-02", "status": "queued"}"#,
        )
        .unwrap();
        assert_eq!(tx.id.as_deref(), Some("7"));
        assert_eq!(tx.kind, TransactionKind::Other("referral".into()));
        assert_eq!(tx.amount, 12.5);
        assert_eq!(tx.status.badge(), "queued");
    }

    #[test]
    fn transaction_kind_flow_classes() {
        for kind in ["deposit", "stake", "interest", "claim", "bonus"] {
            assert!(TransactionKind::from(kind).is_inflow(), "{kind}");
        }
        assert!(!TransactionKind::Withdraw.is_inflow());
        assert!(!TransactionKind::Other("x".into()).is_inflow());
        assert_eq!(TransactionKind::Unstake.label(), "Unstake");
    }

    #[test]
    fn withdrawal_parsing() {
        let w: WithdrawalRequest = serde_json::from_str(
            r#"{"id": "w1", "amount": 100, "fee": 2, "netAmount": 98, "status": "rejected",
                "requestedAt": "2024-03-01T10:00:00Z", "rejectionReason": "KYC"}"#,
        )
        .unwrap();
        assert!(!w.is_pending());
        assert_eq!(w.net_amount, 98.0);
        assert_eq!(w.requested_date(), "2024-03-01");
        assert_eq!(w.rejection_reason.as_deref(), Some("KYC"));
    }

    #[test]
    fn stake_request_wire_format() {
        let body = StakeRequest {
            wallet_address: "0xabc".into(),
            amount: 250.0,
            direction: StakeDirection::Unstake,
            tx_hash: None,
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["walletAddress"], "0xabc");
        assert_eq!(v["type"], "unstake");
        assert!(v.get("txHash").is_none());
    }

    #[test]
    fn approval_request_wire_format() {
        let body = ApprovalRequest {
            wallet_address: "0xabc".into(),
            ip_address: "localhost",
            user_agent: "cryptowave/0.1",
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["ipAddress"], "localhost");
        assert_eq!(v["userAgent"], "cryptowave/0.1");
    }
}
