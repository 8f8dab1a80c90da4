//! Runtime configuration: backend location, chain presets, token and provider settings.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use alloy_primitives::address;
use anyhow::{bail, Result};

use crate::provider::{Address, ProviderKind};

pub const DEFAULT_API_BASE: &str = "https://cryptowave-backend-pq3e.onrender.com";

/// Environment variable that overrides the backend base URL.
pub const API_URL_ENV: &str = "CRYPTOWAVE_API_URL";

/// Tether USD on Ethereum mainnet.
pub const USDT_CONTRACT: Address = address!("dac17f958d2ee523a2206206994597c13d831ec7");

pub const TOKEN_SYMBOL: &str = "USDT";
pub const TOKEN_DECIMALS: u8 = 6;

pub const MIN_STAKE_AMOUNT: f64 = 100.0;
pub const QUICK_STAKE_AMOUNTS: [f64; 4] = [100.0, 500.0, 1_000.0, 5_000.0];

pub const APPROVAL_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const BALANCE_REFRESH_INTERVAL: Duration = Duration::from_secs(30);
pub const NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(4);

pub const CONFIRMATION_BLOCKS: u64 = 1;
pub const MAX_CACHED_TRANSACTIONS: usize = 50;

/// Declared interface of the platform staking contract. Carried for reference;
/// no flow calls it, staking goes through a token transfer plus backend verification.
pub const STAKING_CONTRACT_ABI: &[&str] = &[
    "function stake(uint256 amount) external",
    "function unstake(uint256 amount) external",
    "function claimRewards() external",
    "function getStakedBalance(address user) external view returns (uint256)",
    "function getRewards(address user) external view returns (uint256)",
    "function getUserAPY(address user) external view returns (uint256)",
    "function getVIPLevel(address user) external view returns (uint256)",
    "function apy() external view returns (uint256)",
    "function totalStaked() external view returns (uint256)",
    "function emergencyWithdraw() external",
];

/// Reject non-HTTPS URLs unless `allow_insecure` is set.
pub fn validate_url(url: &str, allow_insecure: bool) -> Result<()> {
    if url.starts_with("https://") {
        return Ok(());
    }
    if url.starts_with("http://") {
        if allow_insecure {
            return Ok(());
        }
        bail!("Refusing to connect over plain HTTP: {url}\nUse --insecure to allow unencrypted connections.");
    }
    bail!("Invalid URL scheme: {url}\nExpected an https:// URL.");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Ethereum,
    Polygon,
    Bsc,
}

impl Network {
    pub fn chain_id(&self) -> u64 {
        match self {
            Self::Ethereum => 1,
            Self::Polygon => 137,
            Self::Bsc => 56,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Ethereum => "Ethereum",
            Self::Polygon => "Polygon",
            Self::Bsc => "Binance Smart Chain",
        }
    }

    /// Symbol of the gas currency.
    pub fn native_symbol(&self) -> &'static str {
        match self {
            Self::Ethereum => "ETH",
            Self::Polygon => "MATIC",
            Self::Bsc => "BNB",
        }
    }

    pub fn explorer_url(&self) -> &'static str {
        match self {
            Self::Ethereum => "https://etherscan.io",
            Self::Polygon => "https://polygonscan.com",
            Self::Bsc => "https://bscscan.com",
        }
    }

    pub fn tx_url(&self, hash: &str) -> String {
        format!("{}/tx/{hash}", self.explorer_url())
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ethereum => write!(f, "ethereum"),
            Self::Polygon => write!(f, "polygon"),
            Self::Bsc => write!(f, "bsc"),
        }
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ethereum" | "eth" | "mainnet" => Ok(Self::Ethereum),
            "polygon" | "matic" => Ok(Self::Polygon),
            "bsc" | "bnb" => Ok(Self::Bsc),
            other => Err(format!(
                "Unknown network: '{other}'. Use 'ethereum', 'polygon', or 'bsc'."
            )),
        }
    }
}

/// How a stake reaches the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StakeMode {
    /// Transfer the token to the platform wallet, then hand the hash to the backend.
    OnChain,
    /// Record the stake with the backend only.
    BackendOnly,
}

impl fmt::Display for StakeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OnChain => write!(f, "on-chain"),
            Self::BackendOnly => write!(f, "backend"),
        }
    }
}

impl FromStr for StakeMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "on-chain" | "onchain" | "chain" => Ok(Self::OnChain),
            "backend" | "backend-only" => Ok(Self::BackendOnly),
            other => Err(format!(
                "Unknown stake mode: '{other}'. Use 'on-chain' or 'backend'."
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenConfig {
    pub contract: Address,
    pub symbol: String,
    /// Used when the contract does not answer `decimals()`.
    pub fallback_decimals: u8,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            contract: USDT_CONTRACT,
            symbol: TOKEN_SYMBOL.to_string(),
            fallback_decimals: TOKEN_DECIMALS,
        }
    }
}

/// JSON-RPC endpoints exposed by locally running wallet providers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderEndpoints {
    pub metamask: Option<String>,
    pub coinbase: Option<String>,
    pub trust: Option<String>,
}

impl ProviderEndpoints {
    pub fn get(&self, kind: ProviderKind) -> Option<&str> {
        match kind {
            ProviderKind::MetaMask => self.metamask.as_deref(),
            ProviderKind::Coinbase => self.coinbase.as_deref(),
            ProviderKind::Trust => self.trust.as_deref(),
            ProviderKind::WalletConnect => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub api_base: String,
    pub allow_insecure: bool,
    pub network: Network,
    pub token: TokenConfig,
    pub providers: ProviderEndpoints,
    pub stake_mode: StakeMode,
    pub min_stake: f64,
    pub confirmations: u64,
    pub poll_interval: Duration,
    pub balance_refresh_interval: Duration,
    pub receipt_poll_interval: Duration,
    pub receipt_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            allow_insecure: false,
            network: Network::Ethereum,
            token: TokenConfig::default(),
            providers: ProviderEndpoints::default(),
            stake_mode: StakeMode::OnChain,
            min_stake: MIN_STAKE_AMOUNT,
            confirmations: CONFIRMATION_BLOCKS,
            poll_interval: APPROVAL_POLL_INTERVAL,
            balance_refresh_interval: BALANCE_REFRESH_INTERVAL,
            receipt_poll_interval: Duration::from_secs(2),
            receipt_timeout: Duration::from_secs(600),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl DashboardConfig {
    /// Pick the backend URL: explicit value, then `CRYPTOWAVE_API_URL`, then the default.
    /// A trailing slash is dropped so paths can be appended directly.
    pub fn resolve_api_base(explicit: Option<&str>) -> String {
        let raw = explicit
            .map(str::to_string)
            .or_else(|| std::env::var(API_URL_ENV).ok())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        raw.trim().trim_end_matches('/').to_string()
    }

    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim().trim_end_matches('/').to_string();
        self
    }

    /// Check the URLs before any client is built.
    pub fn validate(&self) -> Result<()> {
        validate_url(&self.api_base, self.allow_insecure)?;
        if self.min_stake < 0.0 {
            bail!("Minimum stake must not be negative.");
        }
        for kind in ProviderKind::ALL {
            if let Some(url) = self.providers.get(kind) {
                // Wallet providers are local processes; plain HTTP on loopback is normal.
                if !is_loopback(url) {
                    validate_url(url, self.allow_insecure)?;
                }
            }
        }
        Ok(())
    }
}

fn is_loopback(url: &str) -> bool {
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .unwrap_or(url);
    rest.starts_with("127.0.0.1") || rest.starts_with("localhost") || rest.starts_with("[::1]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_http_url_without_insecure() {
        let err = validate_url("http://localhost:3000", false).unwrap_err();
        assert!(err.to_string().contains("--insecure"));
    }

    #[test]
    fn accepts_http_url_with_insecure() {
        assert!(validate_url("http://localhost:3000", true).is_ok());
    }

    #[test]
    fn rejects_invalid_url_scheme() {
        let err = validate_url("ftp://example.com", false).unwrap_err();
        assert!(err.to_string().contains("Invalid URL scheme"));
    }

    #[test]
    fn explicit_api_base_wins_and_is_trimmed() {
        assert_eq!(
            DashboardConfig::resolve_api_base(Some("https://api.example.com/")),
            "https://api.example.com"
        );
    }

    #[test]
    fn default_config_points_at_hosted_backend() {
        let config = DashboardConfig::default();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.stake_mode, StakeMode::OnChain);
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.balance_refresh_interval, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn default_token_is_usdt() {
        let token = TokenConfig::default();
        assert_eq!(token.symbol, "USDT");
        assert_eq!(token.fallback_decimals, 6);
        assert_eq!(
            token.contract.to_string(),
            "0xdAC17F958D2ee523a2206206994597C13D831ec7"
        );
    }

    #[test]
    fn loopback_provider_allowed_over_http() {
        let mut config = DashboardConfig::default();
        config.providers.metamask = Some("http://127.0.0.1:8545".into());
        assert!(config.validate().is_ok());

        config.providers.trust = Some("http://wallet.example.com".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn network_presets() {
        assert_eq!(Network::Ethereum.chain_id(), 1);
        assert_eq!(Network::Polygon.chain_id(), 137);
        assert_eq!(Network::Bsc.chain_id(), 56);
        assert_eq!(Network::Bsc.native_symbol(), "BNB");
        assert_eq!(
            Network::Ethereum.tx_url("0xabc"),
            "https://etherscan.io/tx/0xabc"
        );
    }

    #[test]
    fn parse_network_and_mode() {
        assert_eq!("Polygon".parse::<Network>().unwrap(), Network::Polygon);
        assert!("solana".parse::<Network>().is_err());
        assert_eq!("backend".parse::<StakeMode>().unwrap(), StakeMode::BackendOnly);
        assert_eq!("on-chain".parse::<StakeMode>().unwrap(), StakeMode::OnChain);
        assert!("maybe".parse::<StakeMode>().is_err());
    }
}
