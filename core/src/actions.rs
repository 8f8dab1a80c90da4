//! Stake, unstake, claim and withdrawal pipelines.
//!
//! Each action validates against the current snapshot, talks to the wallet
//! and the backend, and returns the text shown to the user on success.
//! Refreshing the snapshot afterwards is the caller's job.

use crate::backend::{StakeDirection, StakingApi};
use crate::config::{DashboardConfig, StakeMode};
use crate::dashboard::DashboardSnapshot;
use crate::display::parse_token_amount;
use crate::error::{DashboardError, Result};
use crate::provider::{self, erc20, Address, WalletProvider};

const INVALID_AMOUNT: &str = "Please enter a valid amount";

/// Steps of an on-chain stake, reported as they happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StakeProgress {
    Preparing,
    AwaitingSignature,
    Submitted { hash: String },
    Confirmed,
}

impl StakeProgress {
    pub fn message(&self, symbol: &str) -> String {
        match self {
            Self::Preparing => format!("Preparing {symbol} transfer..."),
            Self::AwaitingSignature => "Please confirm the transaction in your wallet...".into(),
            Self::Submitted { .. } => "Transaction submitted! Waiting for confirmation...".into(),
            Self::Confirmed => "Transaction confirmed! Verifying...".into(),
        }
    }
}

/// What a completed stake left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakeOutcome {
    /// Hash of the token transfer, absent for backend-only stakes.
    pub tx_hash: Option<String>,
    pub message: String,
}

fn positive(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(DashboardError::InvalidAmount(INVALID_AMOUNT.into()));
    }
    Ok(())
}

pub fn validate_stake(amount: f64, min_stake: f64, token_balance: f64, symbol: &str) -> Result<()> {
    positive(amount)?;
    if amount < min_stake {
        return Err(DashboardError::InvalidAmount(format!(
            "Minimum stake is {min_stake} {symbol}"
        )));
    }
    if amount > token_balance {
        return Err(DashboardError::InsufficientBalance(format!(
            "Insufficient {symbol} balance"
        )));
    }
    Ok(())
}

pub fn validate_unstake(amount: f64, staked: f64) -> Result<()> {
    positive(amount)?;
    if amount > staked {
        return Err(DashboardError::InsufficientBalance(
            "Amount exceeds staked balance".into(),
        ));
    }
    Ok(())
}

pub fn validate_claim(claimable: f64) -> Result<()> {
    if claimable <= 0.0 {
        return Err(DashboardError::InvalidAmount("No rewards to claim".into()));
    }
    Ok(())
}

/// `available` is the staked amount minus pending withdrawal requests.
pub fn validate_withdrawal(amount: f64, available: f64) -> Result<()> {
    positive(amount)?;
    if amount > available {
        return Err(DashboardError::InsufficientBalance(
            "Amount exceeds available staked balance".into(),
        ));
    }
    Ok(())
}

/// Replace transport failures with the action's retry hint. Backend
/// rejections and wallet errors pass through untouched.
fn retry_hint(err: DashboardError, hint: &str) -> DashboardError {
    if err.is_unreachable() {
        tracing::warn!(error = %err, "backend unreachable");
        DashboardError::BackendUnreachable(hint.to_string())
    } else {
        err
    }
}

/// Stake `amount` tokens.
///
/// On-chain mode transfers the tokens to the platform wallet, waits for the
/// configured confirmations, then hands the transaction hash to the backend.
/// Backend-only mode records the stake directly.
pub async fn stake(
    api: &dyn StakingApi,
    wallet: Option<&dyn WalletProvider>,
    address: &Address,
    config: &DashboardConfig,
    snapshot: &DashboardSnapshot,
    amount: f64,
    progress: &(dyn Fn(StakeProgress) + Send + Sync),
) -> Result<StakeOutcome> {
    let symbol = &config.token.symbol;
    validate_stake(amount, config.min_stake, snapshot.token_balance(), symbol)?;

    let tx_hash = match config.stake_mode {
        StakeMode::BackendOnly => None,
        StakeMode::OnChain => {
            let wallet = wallet.ok_or_else(|| {
                DashboardError::InvalidState(
                    "Wallet provider not connected. Reconnect your wallet to stake.".into(),
                )
            })?;
            let hash =
                transfer_to_platform(api, wallet, address, config, snapshot, amount, progress)
                    .await?;
            Some(hash)
        }
    };

    api.stake(address, amount, StakeDirection::Stake, tx_hash.as_deref())
        .await
        .map_err(|e| retry_hint(e, "Failed to stake. Please try again."))?;

    tracing::info!(%address, amount, tx_hash = ?tx_hash, "stake recorded");
    Ok(StakeOutcome {
        tx_hash,
        message: format!("Successfully staked {amount} {symbol}!"),
    })
}

async fn transfer_to_platform(
    api: &dyn StakingApi,
    wallet: &dyn WalletProvider,
    address: &Address,
    config: &DashboardConfig,
    snapshot: &DashboardSnapshot,
    amount: f64,
    progress: &(dyn Fn(StakeProgress) + Send + Sync),
) -> Result<String> {
    // Fresh settings: the platform wallet may have changed since the last refresh.
    let settings = api
        .settings()
        .await
        .map_err(|e| retry_hint(e, "Failed to stake. Please try again."))?;
    let platform = settings.platform_wallet_address().ok_or_else(|| {
        DashboardError::InvalidState("Platform wallet not configured. Contact admin.".into())
    })?;

    progress(StakeProgress::Preparing);
    let decimals = snapshot
        .balances
        .map(|b| b.token_decimals)
        .unwrap_or(config.token.fallback_decimals);
    let units = parse_token_amount(&amount.to_string(), decimals)
        .map_err(DashboardError::InvalidAmount)?;

    progress(StakeProgress::AwaitingSignature);
    let hash = erc20::transfer(wallet, address, &config.token.contract, &platform, units).await?;
    tracing::debug!(%hash, "token transfer submitted");
    progress(StakeProgress::Submitted { hash: hash.clone() });

    provider::wait_for_receipt(
        wallet,
        &hash,
        config.confirmations,
        config.receipt_poll_interval,
        config.receipt_timeout,
    )
    .await?;
    progress(StakeProgress::Confirmed);
    Ok(hash)
}

pub async fn unstake(
    api: &dyn StakingApi,
    address: &Address,
    snapshot: &DashboardSnapshot,
    amount: f64,
    symbol: &str,
) -> Result<String> {
    validate_unstake(amount, snapshot.account.staked_amount)?;
    api.stake(address, amount, StakeDirection::Unstake, None)
        .await
        .map_err(|e| retry_hint(e, "Failed to unstake. Please try again."))?;
    Ok(format!("Successfully unstaked {amount} {symbol}!"))
}

/// Claim every claimable reward. The backend decides the amount.
pub async fn claim(
    api: &dyn StakingApi,
    address: &Address,
    snapshot: &DashboardSnapshot,
    symbol: &str,
) -> Result<(f64, String)> {
    validate_claim(snapshot.account.claimable_rewards)?;
    let amount = api
        .claim(address)
        .await
        .map_err(|e| retry_hint(e, "Failed to claim rewards. Please try again."))?;
    Ok((amount, format!("Successfully claimed {amount} {symbol}!")))
}

pub async fn request_withdrawal(
    api: &dyn StakingApi,
    address: &Address,
    snapshot: &DashboardSnapshot,
    amount: f64,
    symbol: &str,
) -> Result<String> {
    validate_withdrawal(amount, snapshot.available_for_withdrawal())?;
    api.request_withdrawal(address, amount)
        .await
        .map_err(|e| retry_hint(e, "Failed to submit withdrawal request. Please try again."))?;
    Ok(format!("Withdrawal request for {amount} {symbol} submitted!"))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::backend::mock::MockBackend;
    use crate::backend::{EntryStatus, UserAccount, WithdrawalRequest};
    use crate::provider::mock::MockProvider;
    use crate::provider::{WalletBalances, U256};

    const PLATFORM: &str = "0x00000000000000000000000000000000000000bb";

    fn addr() -> Address {
        "0x00000000000000000000000000000000000000aa".parse().unwrap()
    }

    fn snapshot() -> DashboardSnapshot {
        DashboardSnapshot {
            balances: Some(WalletBalances {
                native: U256::from(1_000_000_000_000_000_000u128),
                token: U256::from(5_000_000_000u64),
                token_decimals: 6,
            }),
            account: UserAccount {
                staked_amount: 1_000.0,
                total_earned: 10.0,
                vip_level: 0,
                claimable_rewards: 4.5,
            },
            ..DashboardSnapshot::default()
        }
    }

    fn backend_with_platform() -> MockBackend {
        let api = MockBackend::default();
        api.settings.lock().unwrap().platform_wallet = Some(PLATFORM.into());
        api
    }

    fn fast_config() -> DashboardConfig {
        DashboardConfig {
            receipt_poll_interval: std::time::Duration::from_millis(1),
            receipt_timeout: std::time::Duration::from_secs(1),
            ..DashboardConfig::default()
        }
    }

    fn no_progress(_: StakeProgress) {}

    #[test]
    fn stake_validation_messages() {
        let err = validate_stake(0.0, 100.0, 5_000.0, "USDT").unwrap_err();
        assert_eq!(err.to_string(), "Please enter a valid amount");
        let err = validate_stake(f64::NAN, 100.0, 5_000.0, "USDT").unwrap_err();
        assert_eq!(err.to_string(), "Please enter a valid amount");
        let err = validate_stake(50.0, 100.0, 5_000.0, "USDT").unwrap_err();
        assert_eq!(err.to_string(), "Minimum stake is 100 USDT");
        let err = validate_stake(6_000.0, 100.0, 5_000.0, "USDT").unwrap_err();
        assert_eq!(err.to_string(), "Insufficient USDT balance");
        assert!(validate_stake(5_000.0, 100.0, 5_000.0, "USDT").is_ok());
    }

    #[test]
    fn unstake_claim_withdraw_validation() {
        assert_eq!(
            validate_unstake(1_500.0, 1_000.0).unwrap_err().to_string(),
            "Amount exceeds staked balance"
        );
        assert!(validate_unstake(1_000.0, 1_000.0).is_ok());
        assert_eq!(
            validate_claim(0.0).unwrap_err().to_string(),
            "No rewards to claim"
        );
        assert_eq!(
            validate_withdrawal(700.0, 600.0).unwrap_err().to_string(),
            "Amount exceeds available staked balance"
        );
        assert!(validate_withdrawal(-1.0, 600.0).is_err());
    }

    #[tokio::test]
    async fn on_chain_stake_transfers_then_records_hash() {
        let api = backend_with_platform();
        let wallet = MockProvider::new(addr());
        let seen = Mutex::new(Vec::new());
        let record = |p: StakeProgress| seen.lock().unwrap().push(p);

        let outcome = stake(
            &api,
            Some(&wallet),
            &addr(),
            &fast_config(),
            &snapshot(),
            150.5,
            &record,
        )
        .await
        .unwrap();

        assert_eq!(outcome.message, "Successfully staked 150.5 USDT!");
        let hash = outcome.tx_hash.unwrap();

        let sent = wallet.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let (from, to, data) = &sent[0];
        assert_eq!(from, &addr());
        assert_eq!(to, &DashboardConfig::default().token.contract);
        let platform: Address = PLATFORM.parse().unwrap();
        assert_eq!(data, &erc20::encode_transfer(&platform, U256::from(150_500_000u64)));

        let stakes = api.stakes.lock().unwrap();
        assert_eq!(stakes.as_slice(), &[(150.5, StakeDirection::Stake, Some(hash))]);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.first(), Some(&StakeProgress::Preparing));
        assert_eq!(seen.last(), Some(&StakeProgress::Confirmed));
        assert_eq!(seen.len(), 4);
    }

    #[tokio::test]
    async fn stake_without_platform_wallet_stops_early() {
        let api = MockBackend::default();
        let wallet = MockProvider::new(addr());
        let err = stake(
            &api,
            Some(&wallet),
            &addr(),
            &fast_config(),
            &snapshot(),
            200.0,
            &no_progress,
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Platform wallet not configured. Contact admin.");
        assert!(wallet.sent.lock().unwrap().is_empty());
        assert!(api.stakes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejected_signature_skips_backend() {
        let api = backend_with_platform();
        let wallet = MockProvider::new(addr());
        *wallet.send_error.lock().unwrap() = Some(DashboardError::UserRejected);
        let err = stake(
            &api,
            Some(&wallet),
            &addr(),
            &fast_config(),
            &snapshot(),
            200.0,
            &no_progress,
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Transaction rejected by user");
        assert!(api.stakes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn reverted_transfer_is_reported() {
        let api = backend_with_platform();
        let mut wallet = MockProvider::new(addr());
        wallet.receipt_success = false;
        let err = stake(
            &api,
            Some(&wallet),
            &addr(),
            &fast_config(),
            &snapshot(),
            200.0,
            &no_progress,
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Transaction failed on-chain");
        assert!(api.stakes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn backend_verification_failure_is_verbatim() {
        let api = backend_with_platform();
        *api.reject_with.lock().unwrap() = Some("Transaction already used".into());
        let wallet = MockProvider::new(addr());
        let err = stake(
            &api,
            Some(&wallet),
            &addr(),
            &fast_config(),
            &snapshot(),
            200.0,
            &no_progress,
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Transaction already used");
    }

    #[tokio::test]
    async fn backend_only_stake_needs_no_wallet() {
        let api = MockBackend::default();
        let config = DashboardConfig {
            stake_mode: StakeMode::BackendOnly,
            ..DashboardConfig::default()
        };
        let outcome = stake(&api, None, &addr(), &config, &snapshot(), 100.0, &no_progress)
            .await
            .unwrap();
        assert!(outcome.tx_hash.is_none());
        assert_eq!(
            api.stakes.lock().unwrap().as_slice(),
            &[(100.0, StakeDirection::Stake, None)]
        );
    }

    #[tokio::test]
    async fn on_chain_stake_requires_wallet() {
        let api = backend_with_platform();
        let err = stake(&api, None, &addr(), &fast_config(), &snapshot(), 100.0, &no_progress)
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::InvalidState(_)));
    }

    #[tokio::test]
    async fn unstake_and_claim_messages() {
        let api = MockBackend::default();
        api.account.lock().unwrap().claimable_rewards = 4.5;
        let msg = unstake(&api, &addr(), &snapshot(), 250.0, "USDT").await.unwrap();
        assert_eq!(msg, "Successfully unstaked 250 USDT!");

        let (amount, msg) = claim(&api, &addr(), &snapshot(), "USDT").await.unwrap();
        assert_eq!(amount, 4.5);
        assert_eq!(msg, "Successfully claimed 4.5 USDT!");
    }

    #[tokio::test]
    async fn unreachable_backend_gets_retry_hint() {
        let api = MockBackend::default();
        *api.offline.lock().unwrap() = true;
        let err = unstake(&api, &addr(), &snapshot(), 10.0, "USDT")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to unstake. Please try again.");
    }

    #[tokio::test]
    async fn withdrawal_respects_pending_requests() {
        let api = MockBackend::default();
        let mut snap = snapshot();
        snap.withdrawals.push(WithdrawalRequest {
            id: None,
            amount: 800.0,
            fee: 16.0,
            net_amount: 784.0,
            status: EntryStatus::Pending,
            requested_at: String::new(),
            rejection_reason: None,
        });
        let err = request_withdrawal(&api, &addr(), &snap, 300.0, "USDT")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Amount exceeds available staked balance");

        let msg = request_withdrawal(&api, &addr(), &snap, 200.0, "USDT")
            .await
            .unwrap();
        assert_eq!(msg, "Withdrawal request for 200 USDT submitted!");
        assert_eq!(api.withdrawal_requests.lock().unwrap().as_slice(), &[200.0]);
    }
}
