use super::{ApprovalRequest, ApprovalResponse, BackendClient};
use crate::error::Result;
use crate::provider::{address_hex, Address};

impl BackendClient {
    /// Ask whether `address` may use the dashboard. Any readable answer without
    /// `approved: true` counts as not approved, whatever the HTTP status.
    pub async fn check_approval(&self, address: &Address) -> Result<bool> {
        let path = format!("/api/check-approval/{}", address_hex(address));
        tracing::debug!(path, "GET");
        let response = self.http.get(self.url(&path)).send().await?;
        let body: ApprovalResponse = response.json().await?;
        Ok(body.approved)
    }

    /// Register `address` for approval. Returns whether it is already approved.
    pub async fn request_approval(&self, address: &Address, user_agent: &str) -> Result<bool> {
        let body = ApprovalRequest {
            wallet_address: address_hex(address),
            ip_address: "localhost",
            user_agent,
        };
        let response: ApprovalResponse = self
            .post_json("/api/request-approval", &body, "Approval request failed")
            .await?;
        Ok(response.approved)
    }
}
