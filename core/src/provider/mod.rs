//! Wallet provider access: detection, account requests and the calls the
//! dashboard makes through the user's wallet.
pub mod erc20;
mod rpc;
mod types;

pub use rpc::RpcProvider;
pub use types::*;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::ProviderEndpoints;
use crate::error::{DashboardError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    MetaMask,
    Coinbase,
    Trust,
    WalletConnect,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::MetaMask,
        ProviderKind::Coinbase,
        ProviderKind::Trust,
        ProviderKind::WalletConnect,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::MetaMask => "MetaMask",
            Self::Coinbase => "Coinbase Wallet",
            Self::Trust => "Trust Wallet",
            Self::WalletConnect => "WalletConnect",
        }
    }

    pub fn install_url(&self) -> &'static str {
        match self {
            Self::MetaMask => "https://metamask.io/download/",
            Self::Coinbase => "https://www.coinbase.com/wallet/downloads",
            Self::Trust => "https://trustwallet.com/",
            Self::WalletConnect => "https://walletconnect.com/",
        }
    }

    /// Stable identifier used in the session file and on the command line.
    pub fn id(&self) -> &'static str {
        match self {
            Self::MetaMask => "metamask",
            Self::Coinbase => "coinbase",
            Self::Trust => "trust",
            Self::WalletConnect => "walletconnect",
        }
    }

    /// Whether a provider reporting `client_version` can serve as this kind.
    /// Any EIP-1193 provider passes as MetaMask; the others must identify themselves.
    fn accepts_client(&self, client_version: &str) -> bool {
        let lower = client_version.to_lowercase();
        match self {
            Self::MetaMask => true,
            Self::Coinbase => lower.contains("coinbase"),
            Self::Trust => lower.contains("trust"),
            Self::WalletConnect => false,
        }
    }

    fn not_installed(self) -> DashboardError {
        DashboardError::ProviderNotInstalled {
            kind: self,
            install_url: self.install_url(),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "metamask" | "mm" => Ok(Self::MetaMask),
            "coinbase" | "cb" => Ok(Self::Coinbase),
            "trust" | "trustwallet" => Ok(Self::Trust),
            "walletconnect" | "wc" => Ok(Self::WalletConnect),
            other => Err(format!(
                "Unknown wallet provider: '{other}'. Use 'metamask', 'coinbase', 'trust', or 'walletconnect'."
            )),
        }
    }
}

/// The operations the dashboard needs from a connected wallet.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Identification string of the provider (`web3_clientVersion`).
    async fn client_version(&self) -> Result<String>;

    /// Ask the wallet to expose its accounts. May prompt the user.
    async fn request_accounts(&self) -> Result<Vec<Address>>;

    /// Native currency balance in wei.
    async fn native_balance(&self, address: &Address) -> Result<U256>;

    /// Read-only contract call, returning the raw ABI-encoded result.
    async fn call(&self, to: &Address, data: &[u8]) -> Result<Vec<u8>>;

    /// Submit a transaction for the wallet to sign. Returns the transaction hash.
    async fn send_transaction(&self, from: &Address, to: &Address, data: &[u8]) -> Result<String>;

    async fn transaction_receipt(&self, hash: &str) -> Result<Option<TransactionReceipt>>;

    async fn block_number(&self) -> Result<u64>;
}

/// Probe the endpoint configured for `kind` and return a provider if one answers.
pub async fn detect(
    kind: ProviderKind,
    endpoints: &ProviderEndpoints,
    timeout: Duration,
) -> Result<Arc<dyn WalletProvider>> {
    if kind == ProviderKind::WalletConnect {
        return Err(DashboardError::Unsupported(
            "WalletConnect integration coming soon! For now, please use MetaMask or Coinbase Wallet."
                .into(),
        ));
    }
    let url = endpoints.get(kind).ok_or_else(|| kind.not_installed())?;
    let provider = RpcProvider::new(kind, url, timeout)?;
    probe(kind, &provider).await?;
    Ok(Arc::new(provider))
}

/// Capability check: the provider must answer and identify as `kind`.
pub async fn probe(kind: ProviderKind, provider: &dyn WalletProvider) -> Result<()> {
    match provider.client_version().await {
        Ok(version) if kind.accepts_client(&version) => {
            tracing::debug!(%kind, %version, "wallet provider detected");
            Ok(())
        }
        Ok(version) => {
            tracing::debug!(%kind, %version, "provider does not identify as requested wallet");
            Err(kind.not_installed())
        }
        Err(e) => {
            tracing::debug!(%kind, error = %e, "wallet provider probe failed");
            Err(kind.not_installed())
        }
    }
}

/// Request accounts and return the first one.
pub async fn first_account(provider: &dyn WalletProvider) -> Result<Address> {
    let accounts = provider.request_accounts().await?;
    accounts.into_iter().next().ok_or_else(|| {
        DashboardError::Provider("Wallet returned no accounts. Unlock it and try again.".into())
    })
}

/// Read native and token balances for `owner`. Decimals fall back to
/// `fallback_decimals` when the token contract does not answer `decimals()`.
/// A failed `balanceOf` fails the whole read: an unknown balance is never
/// reported as zero.
pub async fn read_balances(
    provider: &dyn WalletProvider,
    owner: &Address,
    token: &Address,
    fallback_decimals: u8,
) -> Result<WalletBalances> {
    let native = provider.native_balance(owner).await?;
    let token_balance = erc20::balance_of(provider, token, owner).await?;
    let token_decimals = match erc20::decimals(provider, token).await {
        Ok(decimals) => decimals,
        Err(e) => {
            tracing::debug!(error = %e, fallback_decimals, "decimals() failed, using fallback");
            fallback_decimals
        }
    };
    Ok(WalletBalances {
        native,
        token: token_balance,
        token_decimals,
    })
}

/// Poll for the receipt of `hash` until it has `confirmations` blocks on top.
/// Fails with `TransactionFailed` when the receipt reports a revert.
pub async fn wait_for_receipt(
    provider: &dyn WalletProvider,
    hash: &str,
    confirmations: u64,
    poll_interval: Duration,
    timeout: Duration,
) -> Result<TransactionReceipt> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if let Some(receipt) = provider.transaction_receipt(hash).await? {
            if !receipt.success {
                return Err(DashboardError::TransactionFailed {
                    hash: hash.to_string(),
                });
            }
            let head = provider.block_number().await?;
            let depth = head.saturating_sub(receipt.block_number) + 1;
            if depth >= confirmations.max(1) {
                return Ok(receipt);
            }
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(DashboardError::Provider(format!(
                "Timed out waiting for confirmation of {hash}"
            )));
        }
        tokio::time::sleep(poll_interval).await;
    }
}

/// Map a JSON-RPC error object to the dashboard taxonomy.
pub(crate) fn map_rpc_error(code: i64, message: &str) -> DashboardError {
    let lower = message.to_lowercase();
    if code == 4001
        || message.contains("ACTION_REJECTED")
        || lower.contains("user rejected")
        || lower.contains("user denied")
    {
        DashboardError::UserRejected
    } else if lower.contains("insufficient funds") {
        DashboardError::InsufficientGas
    } else {
        DashboardError::Provider(message.to_string())
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use alloy_sol_types::SolCall;

    use super::erc20::IERC20;
    use super::*;

    /// In-memory wallet with scripted balances and receipts.
    pub struct MockProvider {
        pub kind: ProviderKind,
        pub client_version: String,
        pub accounts: Vec<Address>,
        pub native: U256,
        pub token: Option<U256>,
        pub decimals: Option<u8>,
        pub send_error: Mutex<Option<DashboardError>>,
        pub receipt_success: bool,
        pub head: u64,
        pub sent: Mutex<Vec<(Address, Address, Vec<u8>)>>,
        pub receipts: Mutex<HashMap<String, TransactionReceipt>>,
    }

    impl MockProvider {
        pub fn new(account: Address) -> Self {
            Self {
                kind: ProviderKind::MetaMask,
                client_version: "MetaMask/v11.0.0".into(),
                accounts: vec![account],
                native: U256::from(1_000_000_000_000_000_000u128),
                token: Some(U256::from(5_000_000_000u64)),
                decimals: Some(6),
                send_error: Mutex::new(None),
                receipt_success: true,
                head: 100,
                sent: Mutex::new(Vec::new()),
                receipts: Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl WalletProvider for MockProvider {
        fn kind(&self) -> ProviderKind {
            self.kind
        }

        async fn client_version(&self) -> Result<String> {
            Ok(self.client_version.clone())
        }

        async fn request_accounts(&self) -> Result<Vec<Address>> {
            Ok(self.accounts.clone())
        }

        async fn native_balance(&self, _address: &Address) -> Result<U256> {
            Ok(self.native)
        }

        async fn call(&self, _to: &Address, data: &[u8]) -> Result<Vec<u8>> {
            let reverted = || DashboardError::Provider("execution reverted".into());
            if data.starts_with(&IERC20::balanceOfCall::SELECTOR) {
                let balance = self.token.ok_or_else(reverted)?;
                return Ok(balance.to_be_bytes::<32>().to_vec());
            }
            if data.starts_with(&IERC20::decimalsCall::SELECTOR) {
                let decimals = self.decimals.ok_or_else(reverted)?;
                return Ok(U256::from(decimals).to_be_bytes::<32>().to_vec());
            }
            Err(DashboardError::Provider("unknown selector".into()))
        }

        async fn send_transaction(
            &self,
            from: &Address,
            to: &Address,
            data: &[u8],
        ) -> Result<String> {
            if let Some(err) = self.send_error.lock().unwrap().take() {
                return Err(err);
            }
            let mut sent = self.sent.lock().unwrap();
            sent.push((*from, *to, data.to_vec()));
            let hash = format!("0x{:064x}", sent.len());
            self.receipts.lock().unwrap().insert(
                hash.clone(),
                TransactionReceipt {
                    transaction_hash: hash.clone(),
                    success: self.receipt_success,
                    block_number: self.head,
                },
            );
            Ok(hash)
        }

        async fn transaction_receipt(&self, hash: &str) -> Result<Option<TransactionReceipt>> {
            Ok(self.receipts.lock().unwrap().get(hash).cloned())
        }

        async fn block_number(&self) -> Result<u64> {
            Ok(self.head)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockProvider;
    use super::*;

    fn addr(last: u8) -> Address {
        Address::with_last_byte(last)
    }

    #[test]
    fn provider_kind_parse_and_display() {
        assert_eq!("MetaMask".parse::<ProviderKind>().unwrap(), ProviderKind::MetaMask);
        assert_eq!("trust".parse::<ProviderKind>().unwrap(), ProviderKind::Trust);
        assert!("phantom".parse::<ProviderKind>().is_err());
        assert_eq!(ProviderKind::Coinbase.to_string(), "Coinbase Wallet");
        assert_eq!(ProviderKind::Trust.install_url(), "https://trustwallet.com/");
    }

    #[test]
    fn client_identification() {
        assert!(ProviderKind::MetaMask.accepts_client("anvil/v0.2.0"));
        assert!(ProviderKind::Coinbase.accepts_client("CoinbaseWallet/3.0"));
        assert!(!ProviderKind::Coinbase.accepts_client("MetaMask/v11"));
        assert!(ProviderKind::Trust.accepts_client("Trust Wallet/8.1"));
        assert!(!ProviderKind::WalletConnect.accepts_client("anything"));
    }

    #[test]
    fn rpc_error_mapping() {
        assert!(matches!(
            map_rpc_error(4001, "User rejected the request."),
            DashboardError::UserRejected
        ));
        assert!(matches!(
            map_rpc_error(-32000, "ACTION_REJECTED"),
            DashboardError::UserRejected
        ));
        assert!(matches!(
            map_rpc_error(-32000, "insufficient funds for gas * price + value"),
            DashboardError::InsufficientGas
        ));
        assert!(matches!(map_rpc_error(-32000, "nonce too low"), DashboardError::Provider(_)));
    }

    #[tokio::test]
    async fn walletconnect_is_unsupported() {
        let endpoints = ProviderEndpoints::default();
        let err = detect(ProviderKind::WalletConnect, &endpoints, Duration::from_secs(1))
            .await
            .err()
            .expect("should fail");
        assert!(err.to_string().contains("coming soon"));
    }

    #[tokio::test]
    async fn missing_endpoint_means_not_installed() {
        let err = detect(ProviderKind::Trust, &ProviderEndpoints::default(), Duration::from_secs(1))
            .await
            .err()
            .expect("should fail");
        match err {
            DashboardError::ProviderNotInstalled { kind, install_url } => {
                assert_eq!(kind, ProviderKind::Trust);
                assert_eq!(install_url, "https://trustwallet.com/");
            }
            other => panic!("expected ProviderNotInstalled, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn probe_rejects_wrong_wallet() {
        let provider = MockProvider::new(addr(1));
        assert!(probe(ProviderKind::MetaMask, &provider).await.is_ok());
        assert!(matches!(
            probe(ProviderKind::Coinbase, &provider).await,
            Err(DashboardError::ProviderNotInstalled { .. })
        ));
    }

    #[tokio::test]
    async fn first_account_requires_one() {
        let mut provider = MockProvider::new(addr(7));
        assert_eq!(first_account(&provider).await.unwrap(), addr(7));
        provider.accounts.clear();
        assert!(first_account(&provider).await.is_err());
    }

    #[tokio::test]
    async fn balances_fall_back_on_decimals() {
        let mut provider = MockProvider::new(addr(1));
        provider.decimals = None;
        let balances = read_balances(&provider, &addr(1), &addr(2), 6).await.unwrap();
        assert_eq!(balances.token, U256::from(5_000_000_000u64));
        assert_eq!(balances.token_decimals, 6);
        assert_eq!(balances.native, U256::from(1_000_000_000_000_000_000u128));
    }

    #[tokio::test]
    async fn failed_token_read_is_not_zero() {
        let mut provider = MockProvider::new(addr(1));
        provider.token = None;
        assert!(read_balances(&provider, &addr(1), &addr(2), 6).await.is_err());
    }

    #[tokio::test]
    async fn balances_beyond_128_bits_survive() {
        let mut provider = MockProvider::new(addr(1));
        let big = U256::from(u128::MAX) + U256::from(1u8);
        provider.token = Some(big);
        let balances = read_balances(&provider, &addr(1), &addr(2), 6).await.unwrap();
        assert_eq!(balances.token, big);
    }

    #[tokio::test]
    async fn receipt_failure_is_reported() {
        let mut provider = MockProvider::new(addr(1));
        provider.receipt_success = false;
        let hash = provider.send_transaction(&addr(1), &addr(2), &[]).await.unwrap();
        let err = wait_for_receipt(
            &provider,
            &hash,
            1,
            Duration::from_millis(1),
            Duration::from_secs(1),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DashboardError::TransactionFailed { .. }));
        assert_eq!(err.to_string(), "Transaction failed on-chain");
    }

    #[tokio::test(start_paused = true)]
    async fn receipt_wait_times_out() {
        let provider = MockProvider::new(addr(1));
        let err = wait_for_receipt(
            &provider,
            "0xmissing",
            1,
            Duration::from_secs(1),
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("Timed out"));
    }
}
