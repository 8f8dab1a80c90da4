use cryptowave_core::actions::StakeProgress;
use cryptowave_core::commands::Command;
use cryptowave_core::{ApprovalState, DashboardSnapshot, ProviderKind};

use crate::state::{NavTab, Tab};

// -- Messages --

#[derive(Debug, Clone)]
pub(crate) enum Message {
    // Navigation
    SelectTab(Tab),
    SelectNav(NavTab),
    ToggleLayout,
    ToggleBalances,

    // Wallet connector
    OpenWalletModal,
    CloseWalletModal,
    ConnectWallet(ProviderKind),
    WalletConnected(Result<ApprovalState, String>),
    /// Provider kind and its install page.
    ProviderMissing(ProviderKind, &'static str),
    Restored(Option<ApprovalState>),
    CopyAddress,
    Disconnected(Result<(), String>),

    // Approval gate
    CheckApproval,
    ApprovalChecked(Result<ApprovalState, String>),
    PollApproval,
    ApprovalPolled(Result<ApprovalState, String>),

    // Dashboard data
    Refresh,
    Loaded(Result<DashboardSnapshot, String>),
    RefreshBalances,
    BalancesRefreshed(Result<DashboardSnapshot, String>),
    Tick,

    // Form inputs
    StakeAmountChanged(String),
    QuickAmount(f64),
    UnstakeAmountChanged(String),
    WithdrawAmountChanged(String),
    MaxWithdraw,

    // Actions
    SubmitStake,
    SubmitUnstake,
    SubmitWithdraw,
    /// Ask before running a mutating command.
    Confirm(Command),
    ConfirmAccepted,
    ConfirmCancelled,
    StakeProgressed(StakeProgress),
    StakeCompleted(Result<String, String>),
    ActionCompleted(Result<String, String>),

    // Misc
    OpenExplorer(String),
    DismissNotification(u64),
}
