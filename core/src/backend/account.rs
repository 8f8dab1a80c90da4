use super::{BackendClient, BalanceReport, PlatformSettings, Transaction, UserAccount, WithdrawalRequest};
use crate::error::Result;
use crate::provider::{address_hex, Address};

impl BackendClient {
    pub async fn user_account(&self, address: &Address) -> Result<UserAccount> {
        self.get_json(&format!("/api/user/{}", address_hex(address))).await
    }

    pub async fn settings(&self) -> Result<PlatformSettings> {
        self.get_json("/api/settings").await
    }

    pub async fn transactions(&self, address: &Address) -> Result<Vec<Transaction>> {
        self.get_json(&format!("/api/user/{}/transactions", address_hex(address)))
            .await
    }

    pub async fn withdrawals(&self, address: &Address) -> Result<Vec<WithdrawalRequest>> {
        self.get_json(&format!("/api/user/{}/withdrawals", address_hex(address)))
            .await
    }

    /// Tell the backend what the wallet holds. Amounts are pre-formatted decimals.
    pub async fn report_balance(&self, address: &Address, eth: &str, usdt: &str) -> Result<()> {
        let body = BalanceReport {
            wallet_address: address_hex(address),
            eth: eth.to_string(),
            usdt: usdt.to_string(),
        };
        let _: serde_json::Value = self
            .post_json("/api/report-balance", &body, "Balance report failed")
            .await?;
        Ok(())
    }
}
