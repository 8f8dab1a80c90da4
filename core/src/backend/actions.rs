use super::{BackendClient, ClaimResponse, StakeDirection, StakeRequest, WalletRequest, WithdrawRequestBody};
use crate::error::Result;
use crate::provider::{address_hex, Address};

impl BackendClient {
    /// Record a stake or unstake. For on-chain stakes `tx_hash` lets the
    /// backend verify the transfer before crediting it.
    pub async fn stake(
        &self,
        address: &Address,
        amount: f64,
        direction: StakeDirection,
        tx_hash: Option<&str>,
    ) -> Result<()> {
        let fallback = match (direction, tx_hash) {
            (StakeDirection::Stake, Some(_)) => "Backend verification failed",
            (StakeDirection::Stake, None) => "Staking failed",
            (StakeDirection::Unstake, _) => "Unstaking failed",
        };
        let body = StakeRequest {
            wallet_address: address_hex(address),
            amount,
            direction,
            tx_hash: tx_hash.map(str::to_string),
        };
        let _: serde_json::Value = self.post_json("/api/stake", &body, fallback).await?;
        Ok(())
    }

    /// Claim all accrued rewards. Returns the amount credited.
    pub async fn claim(&self, address: &Address) -> Result<f64> {
        let body = WalletRequest {
            wallet_address: address_hex(address),
        };
        let response: ClaimResponse = self.post_json("/api/claim", &body, "Claim failed").await?;
        Ok(response.amount)
    }

    pub async fn request_withdrawal(&self, address: &Address, amount: f64) -> Result<()> {
        let body = WithdrawRequestBody {
            wallet_address: address_hex(address),
            amount,
        };
        let _: serde_json::Value = self
            .post_json("/api/withdraw/request", &body, "Withdrawal request failed")
            .await?;
        Ok(())
    }
}
