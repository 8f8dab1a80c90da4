use crate::helpers::{detail_row, stat_card};
use crate::messages::Message;
use crate::state::Tab;
use crate::{styles, App, MUTED};
use cryptowave_core::display::{format_number, format_percent};
use cryptowave_core::vip;
use iced::widget::{button, column, container, row, text, Space};
use iced::{Color, Element, Fill};

/// Recent entries shown before "View all".
pub(crate) const RECENT_TRANSACTIONS: usize = 5;

impl App {
    pub(crate) fn view_overview(&self) -> Element<'_, Message> {
        let snap = &self.snapshot;
        let account = &snap.account;

        let wallet_value = match snap.balances {
            Some(_) => self.full_amount(snap.token_balance()),
            None => "-".into(),
        };

        let stats = row![
            stat_card("Wallet Balance", wallet_value, Color::WHITE),
            stat_card("Staked", self.full_amount(account.staked_amount), Color::WHITE),
            stat_card(
                "Claimable Rewards",
                self.full_amount(account.claimable_rewards),
                styles::ACCENT,
            ),
            stat_card(
                "Total Earned",
                format!("{} {}", format_number(self.accrual.value(), 4), self.symbol()),
                styles::ACCENT,
            ),
        ]
        .spacing(12);

        let mut position = column![text("Position").size(16), Space::new().height(4)].spacing(8);
        position = position
            .push(detail_row("VIP level", vip::tier_name(account.vip_level).to_string()))
            .push(detail_row("Current APY", format_percent(snap.effective_apy())))
            .push(detail_row("Daily earnings", self.full_amount(snap.daily_earnings())));
        if snap.balances.is_some() {
            position = position.push(detail_row(
                "Gas balance",
                format!(
                    "{} {}",
                    format_number(snap.native_balance(), 4),
                    self.service.native_symbol()
                ),
            ));
        } else if !self.service.has_provider() {
            position = position.push(
                text("No wallet provider attached. Reconnect your wallet to read balances.")
                    .size(12)
                    .color(MUTED),
            );
        }
        let pending = snap.pending_withdrawals();
        if pending > 0.0 {
            position = position.push(detail_row("Pending withdrawals", self.full_amount(pending)));
        }

        let mut tx_content = column![text("Recent Transactions").size(16)].spacing(12);
        if snap.transactions.is_empty() {
            tx_content = tx_content.push(self.view_empty_transactions());
        } else {
            let count = snap.transactions.len().min(RECENT_TRANSACTIONS);
            tx_content = tx_content.push(self.view_tx_table(&snap.transactions[..count]));
            if snap.transactions.len() > RECENT_TRANSACTIONS {
                tx_content = tx_content.push(
                    button(text("View all transactions").size(12))
                        .style(styles::btn_ghost)
                        .on_press(Message::SelectTab(Tab::Transactions)),
                );
            }
        }

        column![
            row![text("Overview").size(24), Space::new().width(Fill)],
            stats,
            container(position).padding(20).width(Fill).style(styles::card),
            container(tx_content).padding(20).width(Fill).style(styles::card),
        ]
        .spacing(16)
        .into()
    }

    pub(crate) fn view_empty_transactions(&self) -> Element<'_, Message> {
        text(format!(
            "No transactions yet. Start by staking some {}!",
            self.symbol()
        ))
        .size(14)
        .color(MUTED)
        .into()
    }
}
