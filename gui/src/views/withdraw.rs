use crate::helpers::{detail_row, stat_card};
use crate::messages::Message;
use crate::{styles, App, MUTED};
use cryptowave_core::display::{format_percent, parse_amount};
use cryptowave_core::rewards;
use iced::widget::{button, column, container, row, text, text_input, Space};
use iced::{Color, Element, Fill};

impl App {
    pub(crate) fn view_withdraw(&self) -> Element<'_, Message> {
        let snap = &self.snapshot;
        let fee_percent = snap.settings.withdrawal_fee_percent();
        let available = snap.available_for_withdrawal();

        let stats = row![
            stat_card("Staked", self.full_amount(snap.account.staked_amount), Color::WHITE),
            stat_card("Pending", self.full_amount(snap.pending_withdrawals()), styles::WARNING),
            stat_card("Available", self.full_amount(available), styles::ACCENT),
        ]
        .spacing(12);

        let amount = text_input(&format!("Amount ({})", self.symbol()), &self.withdraw_amount)
            .on_input(Message::WithdrawAmountChanged)
            .on_submit(Message::SubmitWithdraw)
            .padding(10);
        let max = button(text("Max").size(12))
            .padding([8, 12])
            .style(styles::btn_secondary)
            .on_press(Message::MaxWithdraw);

        let mut form = column![
            text("Request Withdrawal").size(16),
            row![amount, max].spacing(8).align_y(iced::Alignment::Center),
            detail_row("Withdrawal fee", format_percent(fee_percent)),
        ]
        .spacing(8);

        if let Some(value) = parse_amount(&self.withdraw_amount).ok().filter(|v| *v > 0.0) {
            let quote = rewards::withdrawal_quote(value, fee_percent);
            form = form
                .push(detail_row("Fee", self.full_amount(quote.fee)))
                .push(detail_row("You receive", self.full_amount(quote.receive)));
            if value > available {
                form = form.push(
                    text("Amount exceeds available balance")
                        .size(12)
                        .color(styles::DANGER),
                );
            }
        }

        let mut submit = button(text("Request Withdrawal").size(14))
            .padding([10, 24])
            .style(styles::btn_primary);
        if self.loading == 0 && !self.withdraw_amount.trim().is_empty() && available > 0.0 {
            submit = submit.on_press(Message::SubmitWithdraw);
        }
        form = form
            .push(
                text("Requests are reviewed by an administrator before payout.")
                    .size(12)
                    .color(MUTED),
            )
            .push(Space::new().height(4))
            .push(submit);
        form = self.push_status(form, "Submitting...");

        let mut history = column![text("Withdrawal Requests").size(16)].spacing(12);
        if snap.withdrawals.is_empty() {
            history = history.push(text("No withdrawal requests yet.").size(14).color(MUTED));
        } else {
            history = history.push(self.view_withdrawal_table(&snap.withdrawals));
        }

        column![
            text("Withdraw").size(24),
            stats,
            container(form).padding(24).width(Fill).style(styles::card),
            container(history).padding(20).width(Fill).style(styles::card),
        ]
        .spacing(16)
        .into()
    }
}
