use std::fmt;

// -- Screens --

/// Top-level screen, driven by the approval state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    /// No wallet connected.
    Landing,
    /// Waiting for the backend to answer a connect or a restored session.
    Checking,
    /// Connected, waiting for an administrator.
    Pending,
    Dashboard,
}

/// Sidebar tabs of the wide layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tab {
    Overview,
    Stake,
    Earnings,
    Withdraw,
    Transactions,
    Vip,
}

impl Tab {
    pub(crate) const ALL: [Tab; 6] = [
        Tab::Overview,
        Tab::Stake,
        Tab::Earnings,
        Tab::Withdraw,
        Tab::Transactions,
        Tab::Vip,
    ];

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Stake => "Stake",
            Self::Earnings => "Earnings",
            Self::Withdraw => "Withdraw",
            Self::Transactions => "Transactions",
            Self::Vip => "VIP",
        }
    }
}

/// Bottom navigation of the compact layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NavTab {
    Home,
    Invest,
    Interest,
    Withdraw,
    Profile,
}

impl NavTab {
    pub(crate) const ALL: [NavTab; 5] = [
        NavTab::Home,
        NavTab::Invest,
        NavTab::Interest,
        NavTab::Withdraw,
        NavTab::Profile,
    ];

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Invest => "Invest",
            Self::Interest => "Interest",
            Self::Withdraw => "Withdraw",
            Self::Profile => "Profile",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Layout {
    Sidebar,
    Compact,
}

impl Layout {
    pub(crate) fn toggled(self) -> Self {
        match self {
            Self::Sidebar => Self::Compact,
            Self::Compact => Self::Sidebar,
        }
    }
}

// -- Notifications --

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NotificationKind {
    Success,
    Error,
    Info,
}

/// Toast shown above the content. Dismissed after a fixed timeout; `id`
/// keeps a stale timer from closing a newer toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Notification {
    pub(crate) id: u64,
    pub(crate) kind: NotificationKind,
    pub(crate) text: String,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_toggles_back_and_forth() {
        assert_eq!(Layout::Sidebar.toggled(), Layout::Compact);
        assert_eq!(Layout::Compact.toggled(), Layout::Sidebar);
    }

    #[test]
    fn tab_labels_are_distinct() {
        let mut labels: Vec<_> = Tab::ALL.iter().map(Tab::label).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), Tab::ALL.len());
    }

    #[test]
    fn bottom_nav_has_five_entries() {
        assert_eq!(NavTab::ALL.len(), 5);
        assert_eq!(NavTab::ALL[0].label(), "Home");
    }
}
