//! Domain error type for dashboard operations.

use thiserror::Error;

use crate::provider::ProviderKind;

/// Typed error enum for dashboard operations, allowing front-ends to match on
/// specific failure modes instead of inspecting opaque `anyhow::Error` messages.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The selected wallet provider is not available in this environment.
    #[error("{kind} is not installed. Install it from {install_url}")]
    ProviderNotInstalled {
        kind: ProviderKind,
        install_url: &'static str,
    },

    /// Provider or feature that exists in the UI but has no implementation.
    #[error("{0}")]
    Unsupported(String),

    /// The user declined a wallet prompt (EIP-1193 code 4001).
    #[error("Transaction rejected by user")]
    UserRejected,

    /// Not enough native currency to pay for gas.
    #[error("Insufficient ETH for gas fees")]
    InsufficientGas,

    /// The transaction was mined with a failed status.
    #[error("Transaction failed on-chain")]
    TransactionFailed { hash: String },

    /// Wallet provider RPC failure that is not one of the mapped cases above.
    #[error("{0}")]
    Provider(String),

    /// Backend could not be reached or returned an unreadable response.
    #[error("{0}")]
    BackendUnreachable(String),

    /// Backend answered with a non-success status. The message is shown verbatim.
    #[error("{0}")]
    BackendRejected(String),

    /// Invalid or out-of-range amount.
    #[error("{0}")]
    InvalidAmount(String),

    /// Requested amount exceeds the relevant balance.
    #[error("{0}")]
    InsufficientBalance(String),

    /// Operation not valid in the current session state.
    #[error("{0}")]
    InvalidState(String),

    /// Session file or cache database error.
    #[error("{0}")]
    Storage(String),

    /// Unexpected error from internal subsystems.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DashboardError {
    /// Whether the failure came from the transport rather than the backend's answer.
    /// Read paths degrade to cached data on these.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::BackendUnreachable(_))
    }
}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        Self::BackendUnreachable(format!("Backend request failed: {err}"))
    }
}

/// Alias for `std::result::Result<T, DashboardError>`.
pub type Result<T> = std::result::Result<T, DashboardError>;
