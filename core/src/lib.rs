use std::path::PathBuf;

use anyhow::Context;

pub mod actions;
pub mod approval;
pub mod backend;
pub mod cache;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod display;
pub mod error;
pub mod provider;
pub mod rewards;
pub mod service;
pub mod session;
pub mod vip;

pub use approval::{ApprovalState, ApprovalStatus, Phase};
pub use backend::{BackendClient, StakingApi};
pub use cache::SnapshotCache;
pub use commands::Command;
pub use config::{DashboardConfig, Network, StakeMode};
pub use dashboard::DashboardSnapshot;
pub use error::DashboardError;
pub use provider::{Address, ProviderKind, WalletProvider};
pub use service::DashboardService;
pub use session::SessionStore;

/// XDG-compliant data directory for the session file and offline cache.
/// Linux: `~/.local/share/cryptowave/`, macOS: `~/Library/Application Support/cryptowave/`
pub fn data_dir() -> anyhow::Result<PathBuf> {
    let dir = dirs::data_dir()
        .context("Cannot determine data directory")?
        .join("cryptowave");
    Ok(dir)
}
