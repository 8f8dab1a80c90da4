//! Backend approval state machine: `Disconnected -> Pending -> Approved`.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::backend::StakingApi;
use crate::provider::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApprovalStatus {
    Disconnected,
    Pending,
    Approved,
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disconnected => "disconnected",
            Self::Pending => "pending",
            Self::Approved => "approved",
        })
    }
}

impl FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "disconnected" => Ok(Self::Disconnected),
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            other => Err(format!("Unknown approval status: '{other}'")),
        }
    }
}

/// Whether a value came from local storage or was confirmed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Cached,
    Verified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApprovalState {
    pub status: ApprovalStatus,
    pub phase: Phase,
}

impl ApprovalState {
    pub const DISCONNECTED: Self = Self {
        status: ApprovalStatus::Disconnected,
        phase: Phase::Verified,
    };

    /// Optimistic state for a restored session, shown until the backend answers.
    pub fn restored(cached: Option<ApprovalStatus>) -> Self {
        Self {
            status: cached.unwrap_or(ApprovalStatus::Disconnected),
            phase: Phase::Cached,
        }
    }

    pub fn verified(status: ApprovalStatus) -> Self {
        Self {
            status,
            phase: Phase::Verified,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.status == ApprovalStatus::Approved
    }

    pub fn is_pending(&self) -> bool {
        self.status == ApprovalStatus::Pending
    }
}

fn status_from(approved: bool) -> ApprovalStatus {
    if approved {
        ApprovalStatus::Approved
    } else {
        ApprovalStatus::Pending
    }
}

/// Ask the backend for the current status of `address`.
///
/// If the backend cannot be reached the `current` status is kept so a
/// restored session is not kicked out while offline.
pub async fn check(
    api: &dyn StakingApi,
    address: &Address,
    current: ApprovalStatus,
) -> ApprovalState {
    match api.check_approval(address).await {
        Ok(approved) => ApprovalState::verified(status_from(approved)),
        Err(e) => {
            tracing::warn!(%address, error = %e, "approval check failed, keeping cached status");
            ApprovalState {
                status: current,
                phase: Phase::Cached,
            }
        }
    }
}

/// Submit an approval request. Any failure leaves the wallet pending.
pub async fn request(
    api: &dyn StakingApi,
    address: &Address,
    user_agent: &str,
) -> ApprovalStatus {
    match api.request_approval(address, user_agent).await {
        Ok(approved) => status_from(approved),
        Err(e) => {
            tracing::warn!(%address, error = %e, "approval request failed");
            ApprovalStatus::Pending
        }
    }
}

/// One polling round. Errors count as "not yet".
pub async fn poll_once(api: &dyn StakingApi, address: &Address) -> bool {
    match api.check_approval(address).await {
        Ok(approved) => approved,
        Err(e) => {
            tracing::debug!(%address, error = %e, "approval poll failed");
            false
        }
    }
}

/// Poll every `interval` until the backend approves `address`.
///
/// Never gives up on its own; drop the future to stop polling.
pub async fn poll_until_approved(
    api: &dyn StakingApi,
    address: &Address,
    interval: Duration,
) -> ApprovalStatus {
    let start = tokio::time::Instant::now() + interval;
    let mut ticker = tokio::time::interval_at(start, interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if poll_once(api, address).await {
            tracing::debug!(%address, "wallet approved");
            return ApprovalStatus::Approved;
        }
    }
}
