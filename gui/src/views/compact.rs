use crate::helpers::{detail_row, masked, stat, status_badge, status_color};
use crate::messages::Message;
use crate::state::NavTab;
use crate::{styles, App, MUTED, PRIMARY};
use cryptowave_core::commands::Command;
use cryptowave_core::display::{format_number, short_address, transaction_sign};
use cryptowave_core::vip;
use iced::widget::{button, column, container, row, scrollable, text, Space};
use iced::{Color, Element, Fill, Length};

/// Transactions shown on the Home tab.
const HOME_TRANSACTIONS: usize = 5;

impl App {
    /// Narrow layout: a single column with bottom navigation.
    pub(crate) fn view_compact(&self) -> Element<'_, Message> {
        let content: Element<Message> = match self.nav {
            NavTab::Home => column![
                self.view_wallet_card(),
                self.view_interest_card(),
                self.view_quick_actions(),
                self.view_transaction_list(HOME_TRANSACTIONS),
            ]
            .spacing(16)
            .into(),
            NavTab::Invest => column![self.view_stake_form(), self.view_vip_card()]
                .spacing(16)
                .into(),
            NavTab::Interest => self.view_earnings(),
            NavTab::Withdraw => self.view_withdraw(),
            NavTab::Profile => self.view_profile(),
        };

        column![
            self.view_top_bar(),
            scrollable(container(content).padding(16)).height(Fill),
            self.view_bottom_nav(),
        ]
        .into()
    }

    fn view_top_bar(&self) -> Element<'_, Message> {
        let address = self.address.as_deref().map(short_address).unwrap_or_default();
        row![
            text("CRYPTOWAVE").size(18).font(styles::BOLD).color(PRIMARY),
            Space::new().width(Fill),
            button(text(address).size(12))
                .padding([6, 12])
                .style(styles::btn_secondary)
                .on_press(Message::CopyAddress),
            button(text("Sidebar").size(12))
                .padding([6, 12])
                .style(styles::btn_ghost)
                .on_press(Message::ToggleLayout),
        ]
        .spacing(8)
        .padding([12, 16])
        .align_y(iced::Alignment::Center)
        .into()
    }

    fn view_wallet_card(&self) -> Element<'_, Message> {
        let snap = &self.snapshot;
        let hidden = self.hide_balances;
        let balance = match snap.balances {
            Some(_) => masked(self.short_amount(snap.token_balance()), hidden),
            None => "-".into(),
        };
        let staked = masked(self.short_amount(snap.account.staked_amount), hidden);

        let mut content = column![
            row![
                text("Wallet Balance").size(12).color(MUTED),
                Space::new().width(Fill),
                button(text(if hidden { "Show" } else { "Hide" }).size(11))
                    .padding([2, 8])
                    .style(styles::btn_ghost)
                    .on_press(Message::ToggleBalances),
            ]
            .align_y(iced::Alignment::Center),
            text(balance).size(28).font(styles::BOLD),
            row![
                stat("Staked", staked, Color::WHITE),
                Space::new().width(Fill),
                stat("APY", format!("{:.2}%", snap.effective_apy()), styles::ACCENT),
            ],
        ]
        .spacing(8);
        if !snap.is_verified() {
            content = content.push(
                container(text("Offline: cached data").size(11))
                    .padding([2, 8])
                    .style(styles::badge(styles::WARNING)),
            );
        }

        container(content)
            .padding(20)
            .width(Fill)
            .style(styles::card_hero)
            .into()
    }

    fn view_quick_actions(&self) -> Element<'_, Message> {
        let account = &self.snapshot.account;

        let mut claim = button(
            text(format!(
                "Claim {} {}",
                format_number(account.claimable_rewards, 2),
                self.symbol()
            ))
            .size(14),
        )
        .width(Fill)
        .padding([12, 16])
        .style(styles::btn_primary);
        if self.loading == 0 && account.claimable_rewards > 0.0 {
            claim = claim.on_press(Message::Confirm(Command::Claim));
        }

        let info = |label: &'static str, value: String, color: Color| -> Element<Message> {
            container(stat(label, value, color))
                .padding(12)
                .width(Length::FillPortion(1))
                .style(styles::card_flat)
                .into()
        };

        column![
            claim,
            row![
                info("Daily Earnings", self.full_amount(self.snapshot.daily_earnings()), styles::ACCENT),
                info("Claimable", self.full_amount(account.claimable_rewards), Color::WHITE),
                info("VIP Status", vip::tier_name(account.vip_level).to_string(), styles::GOLD),
            ]
            .spacing(8),
        ]
        .spacing(12)
        .into()
    }

    fn view_transaction_list(&self, limit: usize) -> Element<'_, Message> {
        let txs = &self.snapshot.transactions;

        let mut list = column![text("Recent Transactions").size(16)].spacing(10);

        if txs.is_empty() {
            list = list.push(self.view_empty_transactions());
        }
        for tx in txs.iter().take(limit) {
            let sign = transaction_sign(tx);
            let amount_color = if sign == "+" { styles::ACCENT } else { styles::DANGER };
            let date = tx.date.split('T').next().unwrap_or_default().to_string();
            list = list.push(
                row![
                    column![
                        text(tx.kind.label()).size(14),
                        text(date).size(11).color(MUTED),
                    ]
                    .spacing(2),
                    Space::new().width(Fill),
                    column![
                        text(format!("{sign}{}", self.full_amount(tx.amount)))
                            .size(14)
                            .color(amount_color),
                        status_badge(tx.status.badge(), status_color(&tx.status)),
                    ]
                    .spacing(2)
                    .align_x(iced::Alignment::End),
                ]
                .align_y(iced::Alignment::Center),
            );
        }

        container(list)
            .padding(16)
            .width(Fill)
            .style(styles::card)
            .into()
    }

    fn view_profile(&self) -> Element<'_, Message> {
        let config = self.service.config();
        let address = self.address.clone().unwrap_or_default();

        let details = column![
            text("Account").size(16),
            detail_row("Address", short_address(&address)),
            detail_row("Network", config.network.display_name().to_string()),
            detail_row("Backend", config.api_base.clone()),
            detail_row("Stake mode", config.stake_mode.to_string()),
            detail_row("Total earned", self.full_amount(self.snapshot.account.total_earned)),
            row![
                button(text("Copy address").size(13))
                    .padding([8, 14])
                    .style(styles::btn_secondary)
                    .on_press(Message::CopyAddress),
                button(text("Disconnect").size(13))
                    .padding([8, 14])
                    .style(styles::btn_danger)
                    .on_press(Message::Confirm(Command::Disconnect)),
            ]
            .spacing(8),
        ]
        .spacing(10);

        column![
            self.view_vip_card(),
            container(details).padding(20).width(Fill).style(styles::card),
        ]
        .spacing(16)
        .into()
    }

    fn view_bottom_nav(&self) -> Element<'_, Message> {
        let mut nav = row![].spacing(4);
        for tab in NavTab::ALL {
            nav = nav.push(
                button(text(tab.label()).size(12).center())
                    .width(Fill)
                    .padding([10, 4])
                    .style(styles::nav_btn(self.nav == tab))
                    .on_press(Message::SelectNav(tab)),
            );
        }

        container(nav)
            .padding([6, 8])
            .width(Fill)
            .style(styles::bottom_bar)
            .into()
    }
}
