//! Dashboard data aggregation: wallet balances plus the four backend reads.
//!
//! Every read is isolated. A failed read logs a warning and leaves the
//! previous value in place, so one slow or broken endpoint never blanks the
//! whole dashboard.

use std::sync::Arc;

use crate::approval::Phase;
use crate::backend::{
    PlatformSettings, StakingApi, Transaction, UserAccount, WithdrawalRequest,
};
use crate::cache::CachedAccount;
use crate::config::TokenConfig;
use crate::display::{format_units_fixed, units_to_f64, NATIVE_DECIMALS};
use crate::provider::{self, Address, WalletBalances, WalletProvider};
use crate::rewards;

/// Everything the dashboard renders for one wallet.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    /// `None` until the wallet provider has answered once.
    pub balances: Option<WalletBalances>,
    pub account: UserAccount,
    pub settings: PlatformSettings,
    pub transactions: Vec<Transaction>,
    pub withdrawals: Vec<WithdrawalRequest>,
    pub phase: Phase,
}

impl Default for DashboardSnapshot {
    fn default() -> Self {
        Self {
            balances: None,
            account: UserAccount::default(),
            settings: PlatformSettings::default(),
            transactions: Vec::new(),
            withdrawals: Vec::new(),
            phase: Phase::Cached,
        }
    }
}

impl DashboardSnapshot {
    /// Snapshot restored from the offline cache.
    pub fn from_cache(
        cached: Option<CachedAccount>,
        transactions: Vec<Transaction>,
        withdrawals: Vec<WithdrawalRequest>,
    ) -> Self {
        let (account, settings) = cached
            .map(|c| (c.account, c.settings))
            .unwrap_or_default();
        Self {
            balances: None,
            account,
            settings,
            transactions,
            withdrawals,
            phase: Phase::Cached,
        }
    }

    pub fn is_verified(&self) -> bool {
        self.phase == Phase::Verified
    }

    pub fn effective_apy(&self) -> f64 {
        rewards::effective_apy(&self.settings, self.account.vip_level)
    }

    pub fn daily_earnings(&self) -> f64 {
        rewards::daily_earnings(self.account.staked_amount, self.effective_apy())
    }

    pub fn projection(&self) -> rewards::EarningsProjection {
        rewards::project(self.account.staked_amount, self.effective_apy())
    }

    /// Wallet token balance as a decimal amount, zero before the first read.
    pub fn token_balance(&self) -> f64 {
        self.balances
            .map(|b| units_to_f64(b.token, b.token_decimals))
            .unwrap_or(0.0)
    }

    pub fn native_balance(&self) -> f64 {
        self.balances
            .map(|b| units_to_f64(b.native, NATIVE_DECIMALS))
            .unwrap_or(0.0)
    }

    pub fn pending_withdrawals(&self) -> f64 {
        rewards::pending_withdrawal_total(&self.withdrawals)
    }

    pub fn available_for_withdrawal(&self) -> f64 {
        rewards::available_for_withdrawal(self.account.staked_amount, &self.withdrawals)
    }

    /// Merge one round of backend reads. Failed reads (`None`) keep the old value.
    /// The snapshot becomes verified once the account read has succeeded.
    pub fn apply(&mut self, round: BackendRound) {
        if let Some(account) = round.account {
            self.account = account;
            self.phase = Phase::Verified;
        }
        if let Some(settings) = round.settings {
            self.settings = settings;
        }
        if let Some(transactions) = round.transactions {
            self.transactions = transactions;
        }
        if let Some(withdrawals) = round.withdrawals {
            self.withdrawals = withdrawals;
        }
    }
}

/// Results of the backend reads; `None` marks a read that failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendRound {
    pub account: Option<UserAccount>,
    pub settings: Option<PlatformSettings>,
    pub transactions: Option<Vec<Transaction>>,
    pub withdrawals: Option<Vec<WithdrawalRequest>>,
}

fn isolated<T>(what: &str, address: &Address, result: crate::error::Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(%address, error = %e, "failed to fetch {what}");
            None
        }
    }
}

/// Issue the four backend reads concurrently.
pub async fn fetch_backend(api: &dyn StakingApi, address: &Address) -> BackendRound {
    let (account, settings, transactions, withdrawals) = futures::join!(
        api.user_account(address),
        api.settings(),
        api.transactions(address),
        api.withdrawals(address),
    );
    BackendRound {
        account: isolated("user data", address, account),
        settings: isolated("settings", address, settings),
        transactions: isolated("transactions", address, transactions),
        withdrawals: isolated("withdrawals", address, withdrawals),
    }
}

/// Read wallet balances. Failures are logged and reported as `None`.
pub async fn fetch_balances(
    provider: &dyn WalletProvider,
    address: &Address,
    token: &TokenConfig,
) -> Option<WalletBalances> {
    let result =
        provider::read_balances(provider, address, &token.contract, token.fallback_decimals).await;
    isolated("wallet balances", address, result)
}

/// Tell the backend what the wallet holds. Runs detached; the result is ignored.
pub fn report_balances(
    api: Arc<dyn StakingApi>,
    address: Address,
    balances: WalletBalances,
) -> tokio::task::JoinHandle<()> {
    let eth = format_units_fixed(balances.native, NATIVE_DECIMALS, 4);
    let usdt = format_units_fixed(balances.token, balances.token_decimals, 2);
    tokio::spawn(async move {
        if let Err(e) = api.report_balance(&address, &eth, &usdt).await {
            tracing::debug!(%address, error = %e, "balance report failed");
        }
    })
}

/// Full refresh: balances and backend reads in parallel, merged onto `previous`.
pub async fn load(
    api: &Arc<dyn StakingApi>,
    provider: Option<&dyn WalletProvider>,
    address: &Address,
    token: &TokenConfig,
    previous: &DashboardSnapshot,
) -> DashboardSnapshot {
    let balances = async {
        match provider {
            Some(p) => fetch_balances(p, address, token).await,
            None => None,
        }
    };
    let (balances, round) = futures::join!(balances, fetch_backend(api.as_ref(), address));

    let mut snapshot = previous.clone();
    if let Some(balances) = balances {
        report_balances(Arc::clone(api), *address, balances);
        snapshot.balances = Some(balances);
    }
    snapshot.apply(round);
    snapshot
}
