use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::actions::{self, StakeProgress};
use crate::approval::{self, ApprovalState, ApprovalStatus};
use crate::backend::{default_user_agent, BackendClient, StakingApi};
use crate::cache::SnapshotCache;
use crate::config::DashboardConfig;
use crate::dashboard::{self, DashboardSnapshot};
use crate::error::{DashboardError, Result};
use crate::provider::{self, address_hex, Address, ProviderKind, WalletProvider};
use crate::rewards::{self, WithdrawalQuote};
use crate::session::SessionStore;

/// The wallet currently driving the dashboard.
#[derive(Clone)]
struct ActiveWallet {
    address: Address,
    kind: Option<ProviderKind>,
    /// Absent when a restored session's provider is not reachable.
    provider: Option<Arc<dyn WalletProvider>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn storage(err: anyhow::Error) -> DashboardError {
    DashboardError::Storage(format!("{err:#}"))
}

/// Session-scoped facade over the gate, the aggregator and the actions.
/// Shared by both front-ends; every method takes `&self`.
pub struct DashboardService {
    config: DashboardConfig,
    api: Arc<dyn StakingApi>,
    user_agent: String,
    session: Mutex<SessionStore>,
    cache: Option<Mutex<SnapshotCache>>,
    wallet: Mutex<Option<ActiveWallet>>,
    approval: Mutex<ApprovalState>,
    snapshot: tokio::sync::Mutex<DashboardSnapshot>,
}

impl DashboardService {
    pub fn new(config: DashboardConfig, api: Arc<dyn StakingApi>, session: SessionStore) -> Self {
        Self {
            config,
            api,
            user_agent: default_user_agent(),
            session: Mutex::new(session),
            cache: None,
            wallet: Mutex::new(None),
            approval: Mutex::new(ApprovalState::DISCONNECTED),
            snapshot: tokio::sync::Mutex::new(DashboardSnapshot::default()),
        }
    }

    pub fn with_cache(mut self, cache: SnapshotCache) -> Self {
        self.cache = Some(Mutex::new(cache));
        self
    }

    /// Build the HTTP client and open the session file and cache, either in
    /// `data_dir` or in the platform data directory.
    pub fn from_config(config: DashboardConfig, data_dir: Option<&Path>) -> Result<Self> {
        config.validate()?;
        let api =
            BackendClient::new(&config.api_base, config.allow_insecure, config.request_timeout)?;
        let (session, cache) = match data_dir {
            Some(dir) => (
                SessionStore::open_at(dir.join("session.json")),
                SnapshotCache::open_at(&dir.join("cache.db")),
            ),
            None => (SessionStore::open(), SnapshotCache::open()),
        };
        let service = Self::new(config, Arc::new(api), session.map_err(storage)?);
        Ok(match cache {
            Ok(cache) => service.with_cache(cache),
            Err(e) => {
                tracing::warn!("offline cache unavailable: {e:#}");
                service
            }
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn symbol(&self) -> &str {
        &self.config.token.symbol
    }

    pub fn native_symbol(&self) -> &'static str {
        self.config.network.native_symbol()
    }

    pub fn address(&self) -> Option<Address> {
        lock(&self.wallet).as_ref().map(|w| w.address)
    }

    pub fn provider_kind(&self) -> Option<ProviderKind> {
        lock(&self.wallet).as_ref().and_then(|w| w.kind)
    }

    /// Whether a wallet provider is attached for balance reads and transfers.
    pub fn has_provider(&self) -> bool {
        lock(&self.wallet)
            .as_ref()
            .is_some_and(|w| w.provider.is_some())
    }

    pub fn approval(&self) -> ApprovalState {
        *lock(&self.approval)
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        self.snapshot.lock().await.clone()
    }

    fn active_wallet(&self) -> Result<ActiveWallet> {
        lock(&self.wallet)
            .clone()
            .ok_or_else(|| DashboardError::InvalidState("No wallet connected.".into()))
    }

    fn require_approved(&self) -> Result<ActiveWallet> {
        let wallet = self.active_wallet()?;
        if !self.approval().is_approved() {
            return Err(DashboardError::InvalidState(
                "Your wallet is pending approval.".into(),
            ));
        }
        Ok(wallet)
    }

    /// Record a status change in memory and in the session file.
    fn set_approval(&self, state: ApprovalState) -> Result<()> {
        let previous = std::mem::replace(&mut *lock(&self.approval), state);
        if previous.status != state.status {
            tracing::info!(
                from = %previous.status,
                to = %state.status,
                "approval status changed"
            );
        }
        lock(&self.session).set_approval(state.status).map_err(storage)
    }

    fn cache_key(&self, address: &Address) -> (String, String) {
        (self.config.network.to_string(), address_hex(address))
    }

    fn load_cached_snapshot(&self, address: &Address) -> DashboardSnapshot {
        let Some(cache) = &self.cache else {
            return DashboardSnapshot::default();
        };
        let cache = lock(cache);
        let (network, addr) = self.cache_key(address);
        let read = || -> anyhow::Result<DashboardSnapshot> {
            Ok(DashboardSnapshot::from_cache(
                cache.load_account(&network, &addr)?,
                cache.load_transactions(&network, &addr)?,
                cache.load_withdrawals(&network, &addr)?,
            ))
        };
        read().unwrap_or_else(|e| {
            tracing::warn!("failed to read offline cache: {e:#}");
            DashboardSnapshot::default()
        })
    }

    fn persist_snapshot(&self, address: &Address, snapshot: &DashboardSnapshot) {
        let Some(cache) = &self.cache else { return };
        if !snapshot.is_verified() {
            return;
        }
        let cache = lock(cache);
        let (network, addr) = self.cache_key(address);
        let write = || -> anyhow::Result<()> {
            cache.store_account(&network, &addr, &snapshot.account, &snapshot.settings)?;
            cache.store_transactions(&network, &addr, &snapshot.transactions)?;
            cache.store_withdrawals(&network, &addr, &snapshot.withdrawals)?;
            Ok(())
        };
        if let Err(e) = write() {
            tracing::warn!("failed to update offline cache: {e:#}");
        }
    }

    // -- Connection --

    /// Connect a wallet provider, persist the session and ask for approval.
    pub async fn connect(&self, kind: ProviderKind) -> Result<ApprovalState> {
        let wallet =
            provider::detect(kind, &self.config.providers, self.config.request_timeout).await?;
        self.connect_with(wallet).await
    }

    /// [`connect`](Self::connect) with an already detected provider.
    pub async fn connect_with(&self, wallet: Arc<dyn WalletProvider>) -> Result<ApprovalState> {
        let kind = wallet.kind();
        let address = match provider::first_account(wallet.as_ref()).await {
            Ok(address) => address,
            Err(e) => {
                tracing::warn!(%kind, error = %e, "wallet connection failed");
                return Err(DashboardError::Provider(format!(
                    "Failed to connect {kind}. Please try again."
                )));
            }
        };
        tracing::info!(%kind, %address, "wallet connected");

        lock(&self.session)
            .save_connection(&address, kind)
            .map_err(storage)?;
        *lock(&self.wallet) = Some(ActiveWallet {
            address,
            kind: Some(kind),
            provider: Some(wallet),
        });
        *self.snapshot.lock().await = self.load_cached_snapshot(&address);

        self.request_approval().await
    }

    /// Restore the persisted session, if any. The returned state is the
    /// cached one; call [`check_approval`](Self::check_approval) to verify it.
    pub async fn restore(&self) -> Option<ApprovalState> {
        let stored = lock(&self.session).load()?;
        let provider = match stored.provider {
            Some(kind) => self.reattach(kind).await,
            None => None,
        };
        *lock(&self.wallet) = Some(ActiveWallet {
            address: stored.address,
            kind: stored.provider,
            provider,
        });
        *self.snapshot.lock().await = self.load_cached_snapshot(&stored.address);

        let state = ApprovalState::restored(stored.approval);
        *lock(&self.approval) = state;
        tracing::debug!(address = %stored.address, status = %state.status, "session restored");
        Some(state)
    }

    /// Probe the provider of a restored session without prompting for accounts.
    async fn reattach(&self, kind: ProviderKind) -> Option<Arc<dyn WalletProvider>> {
        let timeout = self.config.request_timeout;
        match provider::detect(kind, &self.config.providers, timeout).await {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::debug!(%kind, error = %e, "restored session has no wallet provider");
                None
            }
        }
    }

    /// Clear the session file and every in-memory value.
    pub async fn disconnect(&self) -> Result<()> {
        lock(&self.session).clear().map_err(storage)?;
        *lock(&self.wallet) = None;
        *lock(&self.approval) = ApprovalState::DISCONNECTED;
        *self.snapshot.lock().await = DashboardSnapshot::default();
        tracing::info!("wallet disconnected");
        Ok(())
    }

    // -- Approval --

    pub async fn request_approval(&self) -> Result<ApprovalState> {
        let wallet = self.active_wallet()?;
        let status = approval::request(self.api.as_ref(), &wallet.address, &self.user_agent).await;
        lock(&self.session).mark_approval_requested().map_err(storage)?;
        let state = ApprovalState::verified(status);
        self.set_approval(state)?;
        Ok(state)
    }

    pub async fn check_approval(&self) -> Result<ApprovalState> {
        let wallet = self.active_wallet()?;
        let current = self.approval().status;
        let state = approval::check(self.api.as_ref(), &wallet.address, current).await;
        // An offline check of a fresh session stays disconnected; nothing to write.
        if state.status != ApprovalStatus::Disconnected {
            self.set_approval(state)?;
        } else {
            *lock(&self.approval) = state;
        }
        Ok(state)
    }

    /// One poll round. Only ever moves the status forward to approved.
    pub async fn poll_approval_once(&self) -> Result<ApprovalState> {
        let wallet = self.active_wallet()?;
        if approval::poll_once(self.api.as_ref(), &wallet.address).await {
            self.set_approval(ApprovalState::verified(ApprovalStatus::Approved))?;
        }
        Ok(self.approval())
    }

    /// Poll at the configured interval until approved. Drop the future to stop.
    pub async fn wait_for_approval(&self) -> Result<ApprovalState> {
        let wallet = self.active_wallet()?;
        let interval = self.config.poll_interval;
        approval::poll_until_approved(self.api.as_ref(), &wallet.address, interval).await;
        let state = ApprovalState::verified(ApprovalStatus::Approved);
        self.set_approval(state)?;
        Ok(state)
    }

    // -- Data --

    /// Refresh everything: wallet balances and all backend reads.
    pub async fn load(&self) -> Result<DashboardSnapshot> {
        let wallet = self.active_wallet()?;
        let previous = self.snapshot().await;
        let next = dashboard::load(
            &self.api,
            wallet.provider.as_deref(),
            &wallet.address,
            &self.config.token,
            &previous,
        )
        .await;
        self.persist_snapshot(&wallet.address, &next);
        *self.snapshot.lock().await = next.clone();
        Ok(next)
    }

    /// Backend reads only, after a mutating action.
    pub async fn refresh_backend(&self) -> Result<DashboardSnapshot> {
        let wallet = self.active_wallet()?;
        let round = dashboard::fetch_backend(self.api.as_ref(), &wallet.address).await;
        let mut snapshot = self.snapshot.lock().await;
        snapshot.apply(round);
        self.persist_snapshot(&wallet.address, &snapshot);
        Ok(snapshot.clone())
    }

    /// Wallet balances only, on the periodic refresh.
    pub async fn refresh_balances(&self) -> Result<DashboardSnapshot> {
        let wallet = self.active_wallet()?;
        if let Some(provider) = &wallet.provider {
            let balances =
                dashboard::fetch_balances(provider.as_ref(), &wallet.address, &self.config.token)
                    .await;
            if let Some(balances) = balances {
                dashboard::report_balances(Arc::clone(&self.api), wallet.address, balances);
                self.snapshot.lock().await.balances = Some(balances);
            }
        }
        Ok(self.snapshot().await)
    }

    // -- Actions --

    pub async fn stake(
        &self,
        amount: f64,
        progress: &(dyn Fn(StakeProgress) + Send + Sync),
    ) -> Result<String> {
        let wallet = self.require_approved()?;
        let snapshot = self.snapshot().await;
        let outcome = actions::stake(
            self.api.as_ref(),
            wallet.provider.as_deref(),
            &wallet.address,
            &self.config,
            &snapshot,
            amount,
            progress,
        )
        .await?;
        self.refresh_backend().await?;
        self.refresh_balances().await?;
        Ok(outcome.message)
    }

    pub async fn unstake(&self, amount: f64) -> Result<String> {
        let wallet = self.require_approved()?;
        let snapshot = self.snapshot().await;
        let message = actions::unstake(
            self.api.as_ref(),
            &wallet.address,
            &snapshot,
            amount,
            self.symbol(),
        )
        .await?;
        self.refresh_backend().await?;
        Ok(message)
    }

    pub async fn claim(&self) -> Result<String> {
        let wallet = self.require_approved()?;
        let snapshot = self.snapshot().await;
        let (_, message) =
            actions::claim(self.api.as_ref(), &wallet.address, &snapshot, self.symbol()).await?;
        self.refresh_backend().await?;
        Ok(message)
    }

    pub async fn withdraw(&self, amount: f64) -> Result<String> {
        let wallet = self.require_approved()?;
        let snapshot = self.snapshot().await;
        let message = actions::request_withdrawal(
            self.api.as_ref(),
            &wallet.address,
            &snapshot,
            amount,
            self.symbol(),
        )
        .await?;
        self.refresh_backend().await?;
        Ok(message)
    }

    /// Fee preview under the current settings.
    pub async fn withdrawal_quote(&self, amount: f64) -> WithdrawalQuote {
        let fee = self.snapshot.lock().await.settings.withdrawal_fee_percent();
        rewards::withdrawal_quote(amount, fee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approval::Phase;
    use crate::backend::mock::MockBackend;
    use crate::backend::UserAccount;
    use crate::config::StakeMode;

    fn addr() -> Address {
        "0x00000000000000000000000000000000000000aa".parse().unwrap()
    }

    fn setup() -> (tempfile::TempDir, Arc<MockBackend>, DashboardService) {
        let dir = tempfile::tempdir().unwrap();
        let mock = Arc::new(MockBackend::default());
        let session = SessionStore::open_at(dir.path().join("session.json")).unwrap();
        let config = DashboardConfig {
            stake_mode: StakeMode::BackendOnly,
            ..DashboardConfig::default()
        };
        let service = DashboardService::new(config, mock.clone(), session)
            .with_cache(SnapshotCache::open_in_memory().unwrap());
        (dir, mock, service)
    }

    /// Put a session on disk as if a wallet had connected earlier.
    fn seed_session(dir: &tempfile::TempDir, status: ApprovalStatus) {
        let mut store = SessionStore::open_at(dir.path().join("session.json")).unwrap();
        store.save_connection(&addr(), ProviderKind::MetaMask).unwrap();
        store.set_approval(status).unwrap();
    }

    fn reopen(dir: &tempfile::TempDir, mock: &Arc<MockBackend>) -> DashboardService {
        let session = SessionStore::open_at(dir.path().join("session.json")).unwrap();
        let config = DashboardConfig {
            stake_mode: StakeMode::BackendOnly,
            ..DashboardConfig::default()
        };
        DashboardService::new(config, mock.clone(), session)
    }

    #[tokio::test]
    async fn restore_without_session_is_none() {
        let (_dir, _mock, service) = setup();
        assert!(service.restore().await.is_none());
        assert!(service.address().is_none());
        assert!(service.load().await.is_err());
    }

    #[tokio::test]
    async fn restore_is_optimistic_then_verified() {
        let (dir, mock, _service) = setup();
        seed_session(&dir, ApprovalStatus::Approved);
        let service = reopen(&dir, &mock);

        let state = service.restore().await.unwrap();
        assert_eq!(state.status, ApprovalStatus::Approved);
        assert_eq!(state.phase, Phase::Cached);
        assert_eq!(service.address(), Some(addr()));
        // No endpoint configured for MetaMask in tests.
        assert!(!service.has_provider());

        // Backend has since revoked approval.
        let state = service.check_approval().await.unwrap();
        assert_eq!(state, ApprovalState::verified(ApprovalStatus::Pending));
        let stored = SessionStore::open_at(dir.path().join("session.json"))
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(stored.approval, Some(ApprovalStatus::Pending));
    }

    #[tokio::test]
    async fn offline_check_keeps_cached_approval() {
        let (dir, mock, _service) = setup();
        seed_session(&dir, ApprovalStatus::Approved);
        *mock.offline.lock().unwrap() = true;
        let service = reopen(&dir, &mock);
        service.restore().await.unwrap();
        let state = service.check_approval().await.unwrap();
        assert!(state.is_approved());
        assert_eq!(state.phase, Phase::Cached);
    }

    #[tokio::test]
    async fn poll_moves_pending_to_approved() {
        let (dir, mock, _service) = setup();
        seed_session(&dir, ApprovalStatus::Pending);
        let service = reopen(&dir, &mock);
        service.restore().await.unwrap();

        assert!(service.poll_approval_once().await.unwrap().is_pending());
        *mock.approved.lock().unwrap() = true;
        assert!(service.poll_approval_once().await.unwrap().is_approved());
    }

    #[tokio::test]
    async fn disconnect_clears_everything() {
        let (dir, mock, _service) = setup();
        seed_session(&dir, ApprovalStatus::Approved);
        let service = reopen(&dir, &mock);
        service.restore().await.unwrap();
        service.disconnect().await.unwrap();

        assert!(service.address().is_none());
        assert_eq!(service.approval(), ApprovalState::DISCONNECTED);
        assert!(!dir.path().join("session.json").exists());
        assert!(reopen(&dir, &mock).restore().await.is_none());
    }

    #[tokio::test]
    async fn actions_require_approval() {
        let (dir, mock, _service) = setup();
        seed_session(&dir, ApprovalStatus::Pending);
        let service = reopen(&dir, &mock);
        service.restore().await.unwrap();
        let err = service.unstake(10.0).await.unwrap_err();
        assert!(matches!(err, DashboardError::InvalidState(_)));
    }

    #[tokio::test]
    async fn actions_refresh_the_snapshot() {
        let (dir, mock, _service) = setup();
        seed_session(&dir, ApprovalStatus::Approved);
        *mock.account.lock().unwrap() = UserAccount {
            staked_amount: 1_000.0,
            total_earned: 0.0,
            vip_level: 0,
            claimable_rewards: 2.0,
        };
        let service = reopen(&dir, &mock);
        service.restore().await.unwrap();
        service.load().await.unwrap();

        let msg = service.unstake(400.0).await.unwrap();
        assert_eq!(msg, "Successfully unstaked 400 USDT!");
        assert_eq!(service.snapshot().await.account.staked_amount, 600.0);

        let msg = service.claim().await.unwrap();
        assert_eq!(msg, "Successfully claimed 2 USDT!");
        assert_eq!(service.snapshot().await.account.claimable_rewards, 0.0);

        service.withdraw(100.0).await.unwrap();
        let snapshot = service.snapshot().await;
        assert_eq!(snapshot.withdrawals.len(), 1);
        assert_eq!(snapshot.available_for_withdrawal(), 500.0);
    }

    #[tokio::test]
    async fn verified_snapshot_survives_restart_offline() {
        let (dir, mock, service) = setup();
        drop(service);
        seed_session(&dir, ApprovalStatus::Approved);
        mock.account.lock().unwrap().staked_amount = 2_500.0;

        let cache_path = dir.path().join("cache.db");
        let cache = SnapshotCache::open_at(&cache_path).unwrap();
        let service = reopen(&dir, &mock).with_cache(cache);
        service.restore().await.unwrap();
        assert!(service.load().await.unwrap().is_verified());
        drop(service);

        *mock.offline.lock().unwrap() = true;
        let cache = SnapshotCache::open_at(&cache_path).unwrap();
        let service = reopen(&dir, &mock).with_cache(cache);
        service.restore().await.unwrap();
        let snapshot = service.load().await.unwrap();
        assert!(!snapshot.is_verified());
        assert_eq!(snapshot.account.staked_amount, 2_500.0);
    }

    #[tokio::test]
    async fn withdrawal_quote_uses_settings_fee() {
        let (_dir, mock, service) = setup();
        mock.settings.lock().unwrap().withdrawal_fee = Some(5.0);
        let quote = service.withdrawal_quote(200.0).await;
        // Settings not loaded yet: client default.
        assert_eq!(quote.fee, 4.0);

        *service.snapshot.lock().await = DashboardSnapshot {
            settings: mock.settings.lock().unwrap().clone(),
            ..DashboardSnapshot::default()
        };
        let quote = service.withdrawal_quote(200.0).await;
        assert_eq!(quote.fee, 10.0);
        assert_eq!(quote.receive, 190.0);
    }
}
