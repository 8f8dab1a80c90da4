//! Typed client for the staking backend's REST surface.
mod account;
mod actions;
mod approval;
mod types;

pub use types::*;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::validate_url;
use crate::error::{DashboardError, Result};
use crate::provider::Address;

/// Backend operations the dashboard depends on. Implemented over HTTP by
/// [`BackendClient`]; tests substitute an in-memory backend.
#[async_trait]
pub trait StakingApi: Send + Sync {
    async fn check_approval(&self, address: &Address) -> Result<bool>;
    async fn request_approval(&self, address: &Address, user_agent: &str) -> Result<bool>;
    async fn user_account(&self, address: &Address) -> Result<UserAccount>;
    async fn settings(&self) -> Result<PlatformSettings>;
    async fn transactions(&self, address: &Address) -> Result<Vec<Transaction>>;
    async fn withdrawals(&self, address: &Address) -> Result<Vec<WithdrawalRequest>>;
    async fn report_balance(&self, address: &Address, eth: &str, usdt: &str) -> Result<()>;
    async fn stake(
        &self,
        address: &Address,
        amount: f64,
        direction: StakeDirection,
        tx_hash: Option<&str>,
    ) -> Result<()>;
    async fn claim(&self, address: &Address) -> Result<f64>;
    async fn request_withdrawal(&self, address: &Address, amount: f64) -> Result<()>;
}

#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    base: String,
}

/// User agent sent with approval requests.
pub fn default_user_agent() -> String {
    format!(
        "cryptowave/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Extract the backend's `message` from an error body, or use `fallback`.
pub(crate) fn rejection_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<BackendMessage>(body)
        .ok()
        .and_then(|m| m.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

impl BackendClient {
    pub fn new(base: &str, allow_insecure: bool, timeout: Duration) -> anyhow::Result<Self> {
        let base = base.trim().trim_end_matches('/');
        validate_url(base, allow_insecure)?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;
        Ok(Self {
            http,
            base: base.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    /// GET a JSON document. Non-2xx answers are reported as rejections.
    pub(super) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        tracing::debug!(path, "GET");
        let response = self.http.get(self.url(path)).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DashboardError::BackendRejected(rejection_message(
                &body,
                &format!("Backend returned {status} for {path}"),
            )));
        }
        Ok(response.json().await?)
    }

    /// POST a JSON body. A 2xx answer with an unreadable body yields `T::default()`;
    /// a non-2xx answer carries the backend's message or `fallback`.
    pub(super) async fn post_json<B, T>(&self, path: &str, body: &B, fallback: &str) -> Result<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned + Default,
    {
        tracing::debug!(path, "POST");
        let response = self.http.post(self.url(path)).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            return Ok(serde_json::from_str(&text).unwrap_or_default());
        }
        tracing::debug!(path, %status, "backend rejected request");
        Err(Self::rejected(status, &text, fallback))
    }

    fn rejected(status: StatusCode, body: &str, fallback: &str) -> DashboardError {
        if status.is_server_error() && body.trim().is_empty() {
            return DashboardError::BackendRejected(format!("{fallback} ({status})"));
        }
        DashboardError::BackendRejected(rejection_message(body, fallback))
    }
}

#[async_trait]
impl StakingApi for BackendClient {
    async fn check_approval(&self, address: &Address) -> Result<bool> {
        BackendClient::check_approval(self, address).await
    }

    async fn request_approval(&self, address: &Address, user_agent: &str) -> Result<bool> {
        BackendClient::request_approval(self, address, user_agent).await
    }

    async fn user_account(&self, address: &Address) -> Result<UserAccount> {
        BackendClient::user_account(self, address).await
    }

    async fn settings(&self) -> Result<PlatformSettings> {
        BackendClient::settings(self).await
    }

    async fn transactions(&self, address: &Address) -> Result<Vec<Transaction>> {
        BackendClient::transactions(self, address).await
    }

    async fn withdrawals(&self, address: &Address) -> Result<Vec<WithdrawalRequest>> {
        BackendClient::withdrawals(self, address).await
    }

    async fn report_balance(&self, address: &Address, eth: &str, usdt: &str) -> Result<()> {
        BackendClient::report_balance(self, address, eth, usdt).await
    }

    async fn stake(
        &self,
        address: &Address,
        amount: f64,
        direction: StakeDirection,
        tx_hash: Option<&str>,
    ) -> Result<()> {
        BackendClient::stake(self, address, amount, direction, tx_hash).await
    }

    async fn claim(&self, address: &Address) -> Result<f64> {
        BackendClient::claim(self, address).await
    }

    async fn request_withdrawal(&self, address: &Address, amount: f64) -> Result<()> {
        BackendClient::request_withdrawal(self, address, amount).await
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use std::sync::Mutex;

    use super::*;

    /// Scriptable in-memory backend. `offline` makes every call fail as unreachable.
    #[derive(Default)]
    pub struct MockBackend {
        pub approved: Mutex<bool>,
        pub offline: Mutex<bool>,
        pub account: Mutex<UserAccount>,
        pub settings: Mutex<PlatformSettings>,
        pub transactions: Mutex<Vec<Transaction>>,
        pub withdrawals: Mutex<Vec<WithdrawalRequest>>,
        pub reject_with: Mutex<Option<String>>,
        pub fail_transactions: Mutex<bool>,
        pub stakes: Mutex<Vec<(f64, StakeDirection, Option<String>)>>,
        pub withdrawal_requests: Mutex<Vec<f64>>,
        pub reports: Mutex<Vec<(String, String)>>,
        pub approval_requests: Mutex<u32>,
        pub checks: Mutex<u32>,
    }

    impl MockBackend {
        fn ensure_online(&self) -> Result<()> {
            if *self.offline.lock().unwrap() {
                return Err(DashboardError::BackendUnreachable("connection refused".into()));
            }
            Ok(())
        }

        fn ensure_accepted(&self) -> Result<()> {
            self.ensure_online()?;
            if let Some(msg) = self.reject_with.lock().unwrap().clone() {
                return Err(DashboardError::BackendRejected(msg));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl StakingApi for MockBackend {
        async fn check_approval(&self, _address: &Address) -> Result<bool> {
            *self.checks.lock().unwrap() += 1;
            self.ensure_online()?;
            Ok(*self.approved.lock().unwrap())
        }

        async fn request_approval(&self, _address: &Address, _user_agent: &str) -> Result<bool> {
            *self.approval_requests.lock().unwrap() += 1;
            self.ensure_online()?;
            Ok(*self.approved.lock().unwrap())
        }

        async fn user_account(&self, _address: &Address) -> Result<UserAccount> {
            self.ensure_online()?;
            Ok(self.account.lock().unwrap().clone())
        }

        async fn settings(&self) -> Result<PlatformSettings> {
            self.ensure_online()?;
            Ok(self.settings.lock().unwrap().clone())
        }

        async fn transactions(&self, _address: &Address) -> Result<Vec<Transaction>> {
            self.ensure_online()?;
            if *self.fail_transactions.lock().unwrap() {
                return Err(DashboardError::BackendRejected("HTTP 500".into()));
            }
            Ok(self.transactions.lock().unwrap().clone())
        }

        async fn withdrawals(&self, _address: &Address) -> Result<Vec<WithdrawalRequest>> {
            self.ensure_online()?;
            Ok(self.withdrawals.lock().unwrap().clone())
        }

        async fn report_balance(&self, _address: &Address, eth: &str, usdt: &str) -> Result<()> {
            self.ensure_online()?;
            self.reports
                .lock()
                .unwrap()
                .push((eth.to_string(), usdt.to_string()));
            Ok(())
        }

        async fn stake(
            &self,
            _address: &Address,
            amount: f64,
            direction: StakeDirection,
            tx_hash: Option<&str>,
        ) -> Result<()> {
            self.ensure_accepted()?;
            self.stakes
                .lock()
                .unwrap()
                .push((amount, direction, tx_hash.map(str::to_string)));
            let mut account = self.account.lock().unwrap();
            match direction {
                StakeDirection::Stake => account.staked_amount += amount,
                StakeDirection::Unstake => account.staked_amount -= amount,
            }
            Ok(())
        }

        async fn claim(&self, _address: &Address) -> Result<f64> {
            self.ensure_accepted()?;
            let mut account = self.account.lock().unwrap();
            let amount = account.claimable_rewards;
            account.claimable_rewards = 0.0;
            account.total_earned += amount;
            Ok(amount)
        }

        async fn request_withdrawal(&self, _address: &Address, amount: f64) -> Result<()> {
            self.ensure_accepted()?;
            self.withdrawal_requests.lock().unwrap().push(amount);
            self.withdrawals.lock().unwrap().push(WithdrawalRequest {
                id: None,
                amount,
                fee: 0.0,
                net_amount: amount,
                status: EntryStatus::Pending,
                requested_at: String::new(),
                rejection_reason: None,
            });
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_message_prefers_backend_text() {
        assert_eq!(
            rejection_message(r#"{"message":"Wallet not approved"}"#, "Claim failed"),
            "Wallet not approved"
        );
        assert_eq!(rejection_message("<html>", "Claim failed"), "Claim failed");
        assert_eq!(rejection_message(r#"{"message":""}"#, "Claim failed"), "Claim failed");
    }

    #[test]
    fn client_requires_https() {
        let err = BackendClient::new("http://api.example.com", false, Duration::from_secs(5))
            .err()
            .expect("should fail");
        assert!(err.to_string().contains("--insecure"));
        assert!(BackendClient::new("http://localhost:5000", true, Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn base_url_is_normalized() {
        let client =
            BackendClient::new("https://api.example.com/", false, Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "https://api.example.com");
        assert_eq!(client.url("/api/settings"), "https://api.example.com/api/settings");
    }

    #[test]
    fn server_error_without_body_mentions_status() {
        let err = BackendClient::rejected(StatusCode::BAD_GATEWAY, "", "Claim failed");
        assert!(err.to_string().starts_with("Claim failed"));
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn user_agent_names_the_client() {
        assert!(default_user_agent().starts_with("cryptowave/"));
    }
}
