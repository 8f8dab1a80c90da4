mod chart;
mod helpers;
mod messages;
mod state;
mod styles;
mod update;
mod views;

use iced::theme::Palette;
use iced::widget::{center, column, container, opaque, row, stack, text, Space};
use iced::{Color, Element, Fill, Subscription, Task, Theme};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use cryptowave_core::actions::StakeProgress;
use cryptowave_core::commands::Command;
use cryptowave_core::config::{
    DashboardConfig, Network, ProviderEndpoints, StakeMode, BALANCE_REFRESH_INTERVAL,
};
use cryptowave_core::rewards::LiveAccrual;
use cryptowave_core::{ApprovalState, DashboardService, DashboardSnapshot};
use tracing_subscriber::EnvFilter;

use chart::EarningsChart;
use messages::Message;
use state::{Layout, NavTab, Notification, Screen, Tab};

// CRYPTOWAVE dark palette
const BG:      Color = Color::from_rgb(0.043, 0.055, 0.102); // #0b0e1a
const SIDEBAR: Color = Color::from_rgb(0.027, 0.035, 0.071); // #070912
const SURFACE: Color = Color::from_rgb(0.090, 0.110, 0.188); // #171c30
const BORDER:  Color = Color::from_rgb(0.184, 0.216, 0.329); // #2f3754
const ACTIVE:  Color = Color::from_rgb(0.110, 0.149, 0.275); // #1c2646
const MUTED:   Color = Color::from_rgb(0.443, 0.486, 0.600); // #717c99
const PRIMARY: Color = Color::from_rgb(0.000, 0.733, 0.902); // #00bbe6

/// Ticks of the interest counter.
const ACCRUAL_TICK: Duration = Duration::from_secs(1);

fn main() -> Result<()> {
    init_tracing();
    let options = Options::from_env_and_args()?;
    let layout = options.layout;
    let service = Arc::new(
        DashboardService::from_config(options.config, options.data_dir.as_deref())
            .context("Failed to start dashboard service")?,
    );

    iced::application(
        move || App::new(Arc::clone(&service), layout),
        App::update,
        App::view,
    )
    .title("CRYPTOWAVE")
    .theme(App::theme)
    .subscription(App::subscription)
    .run()
    .map_err(|e| anyhow!("GUI error: {e}"))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// -- Startup options --

/// Settings taken from `CRYPTOWAVE_*` variables and a few command-line flags.
struct Options {
    config: DashboardConfig,
    data_dir: Option<PathBuf>,
    layout: Layout,
}

impl Options {
    fn from_env_and_args() -> Result<Self> {
        let args: Vec<String> = std::env::args().collect();
        Self::parse(&args, |key| std::env::var(key).ok())
    }

    fn parse(args: &[String], env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let flag = |name: &str| args.iter().any(|a| a == name);
        let value = |name: &str| {
            args.iter()
                .position(|a| a == name)
                .and_then(|i| args.get(i + 1))
                .cloned()
        };

        let network = match value("--network").or_else(|| env("CRYPTOWAVE_NETWORK")) {
            Some(s) => s.parse::<Network>().map_err(|e| anyhow!(e))?,
            None => Network::Ethereum,
        };
        let stake_mode = match value("--stake-mode").or_else(|| env("CRYPTOWAVE_STAKE_MODE")) {
            Some(s) => s.parse::<StakeMode>().map_err(|e| anyhow!(e))?,
            None => StakeMode::OnChain,
        };
        let api_base = value("--api-url").or_else(|| env("CRYPTOWAVE_API_URL"));

        let config = DashboardConfig {
            allow_insecure: flag("--insecure"),
            network,
            stake_mode,
            providers: ProviderEndpoints {
                metamask: env("CRYPTOWAVE_METAMASK_RPC"),
                coinbase: env("CRYPTOWAVE_COINBASE_RPC"),
                trust: env("CRYPTOWAVE_TRUST_RPC"),
            },
            ..DashboardConfig::default()
        };
        let config =
            config.with_api_base(&DashboardConfig::resolve_api_base(api_base.as_deref()));

        Ok(Self {
            config,
            data_dir: value("--data-dir").map(PathBuf::from),
            layout: if flag("--compact") {
                Layout::Compact
            } else {
                Layout::Sidebar
            },
        })
    }
}

// -- App state --

pub(crate) struct App {
    service: Arc<DashboardService>,
    screen: Screen,
    layout: Layout,
    tab: Tab,
    nav: NavTab,
    wallet_modal: bool,
    hide_balances: bool,

    // Session
    approval: ApprovalState,
    address: Option<String>,

    // Dashboard
    snapshot: DashboardSnapshot,
    accrual: LiveAccrual,
    earnings_chart: EarningsChart,

    // Form fields
    stake_amount: String,
    unstake_amount: String,
    withdraw_amount: String,

    // In-flight stake
    stake_step: Option<StakeProgress>,
    last_tx_hash: Option<String>,

    // Mutating command waiting for confirmation
    confirm: Option<Command>,

    // UI state
    loading: usize,
    notification: Option<Notification>,
    next_notification: u64,
    clipboard: Option<arboard::Clipboard>,

    // Cached theme (avoids re-allocating every frame)
    theme: Theme,
}

impl App {
    fn new(service: Arc<DashboardService>, layout: Layout) -> (Self, Task<Message>) {
        let app = Self {
            service: Arc::clone(&service),
            screen: Screen::Landing,
            layout,
            tab: Tab::Overview,
            nav: NavTab::Home,
            wallet_modal: false,
            hide_balances: false,
            approval: ApprovalState::DISCONNECTED,
            address: None,
            snapshot: DashboardSnapshot::default(),
            accrual: LiveAccrual::new(0.0, 0.0, 0.0),
            earnings_chart: EarningsChart::new(),
            stake_amount: String::new(),
            unstake_amount: String::new(),
            withdraw_amount: String::new(),
            stake_step: None,
            last_tx_hash: None,
            confirm: None,
            loading: 1,
            notification: None,
            next_notification: 0,
            clipboard: arboard::Clipboard::new().ok(),
            theme: Theme::custom(
                "CRYPTOWAVE".to_string(),
                Palette {
                    background: BG,
                    text: Color::from_rgb(0.945, 0.953, 0.980),
                    primary: PRIMARY,
                    success: styles::ACCENT,
                    warning: styles::WARNING,
                    danger: styles::DANGER,
                },
            ),
        };
        let restore = Task::perform(async move { service.restore().await }, Message::Restored);
        (app, restore)
    }

    fn theme(&self) -> Theme {
        self.theme.clone()
    }

    fn symbol(&self) -> &str {
        self.service.symbol()
    }

    // -- Subscriptions --

    fn subscription(&self) -> Subscription<Message> {
        let mut subs = Vec::new();
        match self.screen {
            Screen::Pending => {
                let poll = self.service.config().poll_interval;
                subs.push(iced::time::every(poll).map(|_| Message::PollApproval));
            }
            Screen::Dashboard => {
                subs.push(
                    iced::time::every(BALANCE_REFRESH_INTERVAL).map(|_| Message::RefreshBalances),
                );
                if self.snapshot.account.staked_amount > 0.0 {
                    subs.push(iced::time::every(ACCRUAL_TICK).map(|_| Message::Tick));
                }
            }
            Screen::Landing | Screen::Checking => {}
        }
        Subscription::batch(subs)
    }

    // -- Views --

    fn view(&self) -> Element<'_, Message> {
        let base: Element<Message> = match self.screen {
            Screen::Landing => self.view_landing(),
            Screen::Checking => self.view_checking(),
            Screen::Pending => self.view_pending(),
            Screen::Dashboard => match self.layout {
                Layout::Sidebar => self.view_main(),
                Layout::Compact => self.view_compact(),
            },
        };

        let base: Element<Message> = match self.view_notification() {
            Some(toast) => column![toast, base].into(),
            None => base,
        };

        let modal = if self.wallet_modal {
            Some(self.view_wallet_modal())
        } else {
            self.view_confirm_modal()
        };

        match modal {
            Some(card) => {
                let backdrop = center(card).style(|_theme| container::Style {
                    background: Some(Color::from_rgba(0.0, 0.0, 0.0, 0.6).into()),
                    ..Default::default()
                });
                stack![base, opaque(backdrop)].into()
            }
            None => base,
        }
    }

    fn view_notification(&self) -> Option<Element<'_, Message>> {
        let note = self.notification.as_ref()?;
        let color = match note.kind {
            state::NotificationKind::Success => styles::ACCENT,
            state::NotificationKind::Error => styles::DANGER,
            state::NotificationKind::Info => PRIMARY,
        };
        let bar = container(
            row![
                text(note.to_string()).size(13).color(color),
                Space::new().width(Fill),
                iced::widget::button(text("x").size(12))
                    .padding([2, 8])
                    .style(styles::btn_ghost)
                    .on_press(Message::DismissNotification(note.id)),
            ]
            .align_y(iced::Alignment::Center),
        )
        .padding([8, 20])
        .width(Fill)
        .style(|_theme| container::Style {
            background: Some(SIDEBAR.into()),
            ..Default::default()
        });
        Some(bar.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn options_default_to_sidebar_on_ethereum() {
        let opts = Options::parse(&args(&["cryptowave-gui"]), |_| None).unwrap();
        assert_eq!(opts.layout, Layout::Sidebar);
        assert_eq!(opts.config.network, Network::Ethereum);
        assert_eq!(opts.config.stake_mode, StakeMode::OnChain);
        assert!(!opts.config.allow_insecure);
    }

    #[test]
    fn options_read_flags_and_environment() {
        let opts = Options::parse(
            &args(&["cryptowave-gui", "--compact", "--network", "polygon", "--insecure"]),
            |key| match key {
                "CRYPTOWAVE_STAKE_MODE" => Some("backend".into()),
                "CRYPTOWAVE_METAMASK_RPC" => Some("http://127.0.0.1:8545".into()),
                "CRYPTOWAVE_API_URL" => Some("https://api.example.com/".into()),
                _ => None,
            },
        )
        .unwrap();
        assert_eq!(opts.layout, Layout::Compact);
        assert_eq!(opts.config.network, Network::Polygon);
        assert_eq!(opts.config.stake_mode, StakeMode::BackendOnly);
        assert_eq!(opts.config.api_base, "https://api.example.com");
        assert_eq!(
            opts.config.providers.metamask.as_deref(),
            Some("http://127.0.0.1:8545")
        );
        assert!(opts.config.allow_insecure);
    }

    #[test]
    fn unknown_network_is_rejected() {
        let result = Options::parse(&args(&["cryptowave-gui", "--network", "solana"]), |_| None);
        assert!(result.is_err());
    }
}
