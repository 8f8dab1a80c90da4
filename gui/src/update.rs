use crate::messages::Message;
use crate::state::{NavTab, Notification, NotificationKind, Screen, Tab};
use crate::App;
use cryptowave_core::actions::StakeProgress;
use cryptowave_core::commands::Command;
use cryptowave_core::config::NOTIFICATION_TIMEOUT;
use cryptowave_core::display::parse_amount;
use cryptowave_core::error::DashboardError;
use cryptowave_core::rewards::{self, LiveAccrual};
use cryptowave_core::{ApprovalState, ApprovalStatus, DashboardService, DashboardSnapshot};
use iced::Task;
use std::sync::Arc;

impl App {
    // -- Update --

    pub(crate) fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            // -- Navigation --
            Message::SelectTab(tab) => {
                self.tab = tab;
                Task::none()
            }
            Message::SelectNav(nav) => {
                self.nav = nav;
                Task::none()
            }
            Message::ToggleLayout => {
                self.layout = self.layout.toggled();
                Task::none()
            }
            Message::ToggleBalances => {
                self.hide_balances = !self.hide_balances;
                Task::none()
            }

            // -- Wallet connector --
            Message::OpenWalletModal => {
                self.wallet_modal = true;
                Task::none()
            }
            Message::CloseWalletModal => {
                self.wallet_modal = false;
                Task::none()
            }

            Message::ConnectWallet(kind) => {
                if self.loading > 0 {
                    return Task::none();
                }
                self.wallet_modal = false;
                self.loading += 1;
                let service = self.service.clone();

                Task::perform(async move { service.connect(kind).await }, move |r| match r {
                    Err(DashboardError::ProviderNotInstalled { install_url, .. }) => {
                        Message::ProviderMissing(kind, install_url)
                    }
                    r => Message::WalletConnected(r.map_err(|e| e.to_string())),
                })
            }

            Message::ProviderMissing(kind, url) => {
                self.loading = self.loading.saturating_sub(1);
                let _ = open::that(url);
                self.notify(
                    NotificationKind::Error,
                    format!(
                        "{} is not installed. Opening the install page...",
                        kind.display_name()
                    ),
                )
            }

            Message::WalletConnected(result) => {
                self.loading = self.loading.saturating_sub(1);
                match result {
                    Ok(state) => {
                        self.address = self.service.address().map(|a| a.to_string());
                        let note = self.notify(NotificationKind::Success, "Wallet connected");
                        let next = self.apply_approval(state);
                        Task::batch([note, next])
                    }
                    Err(e) => self.notify(NotificationKind::Error, e),
                }
            }

            Message::Restored(restored) => {
                self.loading = self.loading.saturating_sub(1);
                let Some(state) = restored else {
                    self.screen = Screen::Landing;
                    return Task::none();
                };
                // Optimistic: show what the session file says until the backend answers.
                self.address = self.service.address().map(|a| a.to_string());
                self.approval = state;
                self.screen = screen_for(state.status);
                Task::batch([self.read_snapshot(), self.check_approval()])
            }

            Message::CopyAddress => {
                let Some(address) = self.address.clone() else {
                    return Task::none();
                };
                match &mut self.clipboard {
                    Some(cb) => match cb.set_text(address) {
                        Ok(_) => self.notify(NotificationKind::Info, "Address copied"),
                        Err(e) => self.notify(NotificationKind::Error, format!("Copy failed: {e}")),
                    },
                    None => self.notify(NotificationKind::Error, "Clipboard not available"),
                }
            }

            Message::Disconnected(result) => {
                self.loading = self.loading.saturating_sub(1);
                match result {
                    Ok(()) => {
                        self.reset_session();
                        self.notify(NotificationKind::Info, "Wallet disconnected")
                    }
                    Err(e) => self.notify(NotificationKind::Error, e),
                }
            }

            // -- Approval gate --
            Message::CheckApproval => self.check_approval(),

            Message::ApprovalChecked(result) => {
                self.loading = self.loading.saturating_sub(1);
                match result {
                    Ok(state) => self.apply_approval(state),
                    Err(e) => self.notify(NotificationKind::Error, e),
                }
            }

            Message::PollApproval => {
                let service = self.service.clone();
                Task::perform(
                    async move { service.poll_approval_once().await },
                    |r| Message::ApprovalPolled(r.map_err(|e| e.to_string())),
                )
            }

            Message::ApprovalPolled(result) => match result {
                Ok(state) if state.is_approved() && self.screen == Screen::Pending => {
                    let note = self.notify(NotificationKind::Success, "Access approved!");
                    Task::batch([note, self.apply_approval(state)])
                }
                Ok(_) => Task::none(),
                Err(e) => {
                    tracing::debug!("approval poll failed: {e}");
                    Task::none()
                }
            },

            // -- Dashboard data --
            Message::Refresh => self.load(),

            Message::Loaded(result) => {
                self.loading = self.loading.saturating_sub(1);
                match result {
                    Ok(snapshot) => {
                        self.set_snapshot(snapshot);
                        Task::none()
                    }
                    Err(e) => self.notify(NotificationKind::Error, e),
                }
            }

            Message::RefreshBalances => {
                if !self.service.has_provider() {
                    return Task::none();
                }
                let service = self.service.clone();
                Task::perform(
                    async move { service.refresh_balances().await },
                    |r| Message::BalancesRefreshed(r.map_err(|e| e.to_string())),
                )
            }

            Message::BalancesRefreshed(result) => {
                match result {
                    Ok(snapshot) => self.snapshot.balances = snapshot.balances,
                    Err(e) => tracing::debug!("balance refresh failed: {e}"),
                }
                Task::none()
            }

            Message::Tick => {
                self.accrual.tick(1.0);
                Task::none()
            }

            // -- Form inputs --
            Message::StakeAmountChanged(v) => {
                self.stake_amount = v;
                Task::none()
            }
            Message::QuickAmount(amount) => {
                self.stake_amount = format!("{amount}");
                Task::none()
            }
            Message::UnstakeAmountChanged(v) => {
                self.unstake_amount = v;
                Task::none()
            }
            Message::WithdrawAmountChanged(v) => {
                self.withdraw_amount = v;
                Task::none()
            }
            Message::MaxWithdraw => {
                // Rounded down so the filled-in amount never exceeds what is available.
                let max = (self.snapshot.available_for_withdrawal() * 100.0).floor() / 100.0;
                self.withdraw_amount = format!("{max:.2}");
                Task::none()
            }

            // -- Actions --
            Message::SubmitStake => match entered_amount(&self.stake_amount) {
                Ok(amount) => self.ask(Command::Stake { amount }),
                Err(e) => self.notify(NotificationKind::Error, e),
            },
            Message::SubmitUnstake => match entered_amount(&self.unstake_amount) {
                Ok(amount) => self.ask(Command::Unstake { amount }),
                Err(e) => self.notify(NotificationKind::Error, e),
            },
            Message::SubmitWithdraw => match entered_amount(&self.withdraw_amount) {
                Ok(amount) => self.ask(Command::Withdraw { amount }),
                Err(e) => self.notify(NotificationKind::Error, e),
            },

            Message::Confirm(command) => self.ask(command),
            Message::ConfirmCancelled => {
                self.confirm = None;
                Task::none()
            }
            Message::ConfirmAccepted => {
                let Some(command) = self.confirm.take() else {
                    return Task::none();
                };
                if self.loading > 0 {
                    return Task::none();
                }
                self.run(command)
            }

            Message::StakeProgressed(step) => {
                if let StakeProgress::Submitted { hash } = &step {
                    self.last_tx_hash = Some(hash.clone());
                }
                self.stake_step = Some(step);
                Task::none()
            }

            Message::StakeCompleted(result) => {
                self.loading = self.loading.saturating_sub(1);
                self.stake_step = None;
                match result {
                    Ok(msg) => {
                        self.stake_amount.clear();
                        Task::batch([
                            self.notify(NotificationKind::Success, msg),
                            self.read_snapshot(),
                        ])
                    }
                    Err(e) => self.notify(NotificationKind::Error, e),
                }
            }

            Message::ActionCompleted(result) => {
                self.loading = self.loading.saturating_sub(1);
                match result {
                    Ok(msg) => {
                        self.unstake_amount.clear();
                        self.withdraw_amount.clear();
                        Task::batch([
                            self.notify(NotificationKind::Success, msg),
                            self.read_snapshot(),
                        ])
                    }
                    Err(e) => self.notify(NotificationKind::Error, e),
                }
            }

            // -- Misc --
            Message::OpenExplorer(hash) => {
                let url = self.service.config().network.tx_url(&hash);
                let _ = open::that(&url);
                Task::none()
            }

            Message::DismissNotification(id) => {
                if self.notification.as_ref().is_some_and(|n| n.id == id) {
                    self.notification = None;
                }
                Task::none()
            }
        }
    }

    // -- Helpers --

    /// Show a toast and schedule its dismissal.
    fn notify(&mut self, kind: NotificationKind, text: impl Into<String>) -> Task<Message> {
        let id = self.next_notification;
        self.next_notification += 1;
        self.notification = Some(Notification {
            id,
            kind,
            text: text.into(),
        });
        Task::perform(tokio::time::sleep(NOTIFICATION_TIMEOUT), move |_| {
            Message::DismissNotification(id)
        })
    }

    fn ask(&mut self, command: Command) -> Task<Message> {
        if self.loading == 0 {
            self.confirm = Some(command);
        }
        Task::none()
    }

    /// Move to the screen matching `state`. Loads the dashboard on the first
    /// verified approval.
    fn apply_approval(&mut self, state: ApprovalState) -> Task<Message> {
        self.approval = state;
        let needs_load = state.is_approved()
            && (self.screen != Screen::Dashboard || !self.snapshot.is_verified());
        self.screen = screen_for(state.status);
        if needs_load {
            self.load()
        } else {
            Task::none()
        }
    }

    fn check_approval(&mut self) -> Task<Message> {
        self.loading += 1;
        let service = self.service.clone();
        Task::perform(
            async move { service.check_approval().await },
            |r| Message::ApprovalChecked(r.map_err(|e| e.to_string())),
        )
    }

    /// Wallet balances plus all four backend reads.
    fn load(&mut self) -> Task<Message> {
        self.loading += 1;
        let service = self.service.clone();
        Task::perform(
            async move { service.load().await },
            |r| Message::Loaded(r.map_err(|e| e.to_string())),
        )
    }

    /// Pick up the service's snapshot after it refreshed on its own.
    fn read_snapshot(&mut self) -> Task<Message> {
        self.loading += 1;
        let service = self.service.clone();
        Task::perform(async move { Ok(service.snapshot().await) }, Message::Loaded)
    }

    fn set_snapshot(&mut self, snapshot: DashboardSnapshot) {
        let daily_rate = rewards::daily_rate(snapshot.effective_apy());
        self.accrual.sync(
            snapshot.account.total_earned,
            snapshot.account.staked_amount,
            daily_rate,
        );
        self.earnings_chart.update(snapshot.daily_earnings());
        self.snapshot = snapshot;
    }

    fn run(&mut self, command: Command) -> Task<Message> {
        let service = self.service.clone();
        match command {
            Command::Stake { amount } => {
                self.loading += 1;
                self.last_tx_hash = None;
                Task::run(stake_stream(service, amount), |m| m)
            }
            Command::Unstake { amount } => {
                self.loading += 1;
                Task::perform(async move { service.unstake(amount).await }, action_done)
            }
            Command::Claim => {
                self.loading += 1;
                Task::perform(async move { service.claim().await }, action_done)
            }
            Command::Withdraw { amount } => {
                self.loading += 1;
                Task::perform(async move { service.withdraw(amount).await }, action_done)
            }
            Command::Disconnect => {
                self.loading += 1;
                Task::perform(
                    async move { service.disconnect().await },
                    |r| Message::Disconnected(r.map_err(|e| e.to_string())),
                )
            }
            _ => Task::none(),
        }
    }

    /// Drop every per-wallet value and go back to the landing screen.
    fn reset_session(&mut self) {
        self.screen = Screen::Landing;
        self.tab = Tab::Overview;
        self.nav = NavTab::Home;
        self.approval = ApprovalState::DISCONNECTED;
        self.address = None;
        self.snapshot = DashboardSnapshot::default();
        self.accrual = LiveAccrual::new(0.0, 0.0, 0.0);
        self.earnings_chart.update(0.0);
        self.stake_amount.clear();
        self.unstake_amount.clear();
        self.withdraw_amount.clear();
        self.stake_step = None;
        self.last_tx_hash = None;
        self.confirm = None;
    }
}

fn screen_for(status: ApprovalStatus) -> Screen {
    match status {
        ApprovalStatus::Approved => Screen::Dashboard,
        ApprovalStatus::Pending => Screen::Pending,
        ApprovalStatus::Disconnected => Screen::Checking,
    }
}

fn action_done(result: cryptowave_core::error::Result<String>) -> Message {
    Message::ActionCompleted(result.map_err(|e| e.to_string()))
}

/// Positive number typed into one of the amount fields.
fn entered_amount(input: &str) -> Result<f64, String> {
    match parse_amount(input.trim()) {
        Ok(amount) if amount > 0.0 => Ok(amount),
        _ => Err("Please enter a valid amount".to_string()),
    }
}

/// Run a stake on the runtime and forward its progress steps as messages.
fn stake_stream(
    service: Arc<DashboardService>,
    amount: f64,
) -> impl iced::futures::Stream<Item = Message> {
    iced::stream::channel(
        16,
        move |mut output: iced::futures::channel::mpsc::Sender<Message>| async move {
            use iced::futures::SinkExt;

            let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
            let task = tokio::spawn(async move {
                let report = move |step: StakeProgress| {
                    let _ = tx.send(step);
                };
                service.stake(amount, &report).await.map_err(|e| e.to_string())
            });

            // Ends once the stake is done and the sender is dropped.
            while let Some(step) = rx.recv().await {
                let _ = output.send(Message::StakeProgressed(step)).await;
            }

            let result = task
                .await
                .unwrap_or_else(|e| Err(format!("Stake task failed: {e}")));
            let _ = output.send(Message::StakeCompleted(result)).await;
        },
    )
}
