use crate::messages::Message;
use crate::{styles, App, MUTED};
use cryptowave_core::backend::{EntryStatus, Transaction, WithdrawalRequest};
use cryptowave_core::display::{format_amount, format_short, transaction_sign};
use iced::widget::{column, container, row, table, text, Column, Space};
use iced::{Color, Element, Fill, Length};

/// Pre-formatted row data passed to the table column view closures.
#[derive(Clone)]
struct TxRow {
    kind: String,
    amount: String,
    amount_color: Color,
    date: String,
    status: String,
    status_color: Color,
}

#[derive(Clone)]
struct WithdrawalRow {
    amount: String,
    fee: String,
    receive: String,
    date: String,
    status: String,
    status_color: Color,
    reason: Option<String>,
}

pub(crate) fn status_color(status: &EntryStatus) -> Color {
    match status {
        EntryStatus::Completed | EntryStatus::Approved => styles::ACCENT,
        EntryStatus::Pending => styles::WARNING,
        EntryStatus::Rejected => styles::DANGER,
        EntryStatus::Other(_) => MUTED,
    }
}

pub(crate) fn status_badge<'a>(label: String, color: Color) -> Element<'a, Message> {
    container(text(label).size(11))
        .padding([2, 8])
        .style(styles::badge(color))
        .into()
}

/// Shown in place of an amount while balances are hidden.
pub(crate) const HIDDEN_AMOUNT: &str = "••••••";

pub(crate) fn masked(value: String, hidden: bool) -> String {
    if hidden {
        HIDDEN_AMOUNT.to_string()
    } else {
        value
    }
}

/// Label over a large value, the building block of the stat cards.
pub(crate) fn stat<'a>(label: &'a str, value: String, color: Color) -> Element<'a, Message> {
    column![
        text(label).size(12).color(MUTED),
        text(value).size(20).font(styles::BOLD).color(color),
    ]
    .spacing(4)
    .into()
}

pub(crate) fn stat_card<'a>(label: &'a str, value: String, color: Color) -> Element<'a, Message> {
    container(stat(label, value, color))
        .padding(16)
        .width(Fill)
        .style(styles::card_flat)
        .into()
}

/// Label / value line inside a card.
pub(crate) fn detail_row<'a>(label: &'a str, value: String) -> Element<'a, Message> {
    row![
        text(label).size(13).color(MUTED),
        Space::new().width(Fill),
        text(value).size(13),
    ]
    .into()
}

impl App {
    pub(crate) fn view_tx_table<'a>(&'a self, txs: &'a [Transaction]) -> Element<'a, Message> {
        let symbol = self.symbol();
        let rows: Vec<TxRow> = txs
            .iter()
            .map(|tx| TxRow {
                kind: tx.kind.label(),
                amount: format!(
                    "{}{} {symbol}",
                    transaction_sign(tx),
                    format_amount(tx.amount)
                ),
                amount_color: if tx.kind.is_inflow() {
                    styles::ACCENT
                } else {
                    styles::DANGER
                },
                date: tx.date.clone(),
                status: tx.status.badge(),
                status_color: status_color(&tx.status),
            })
            .collect();

        table::table(
            [
                table::column(
                    text("Type").size(12).color(MUTED),
                    |r: TxRow| -> Element<'_, Message> { text(r.kind).size(13).into() },
                )
                .width(Length::FillPortion(3)),
                table::column(
                    text("Amount").size(12).color(MUTED),
                    |r: TxRow| -> Element<'_, Message> {
                        text(r.amount).size(13).color(r.amount_color).into()
                    },
                )
                .width(Length::FillPortion(4)),
                table::column(
                    text("Date").size(12).color(MUTED),
                    |r: TxRow| -> Element<'_, Message> {
                        text(r.date).size(13).color(MUTED).into()
                    },
                )
                .width(Length::FillPortion(4)),
                table::column(
                    text("Status").size(12).color(MUTED),
                    |r: TxRow| -> Element<'_, Message> { status_badge(r.status, r.status_color) },
                )
                .width(Length::FillPortion(3)),
            ],
            rows,
        )
        .width(Fill)
        .padding_x(12)
        .padding_y(8)
        .separator_x(0)
        .separator_y(1)
        .into()
    }

    pub(crate) fn view_withdrawal_table<'a>(
        &'a self,
        withdrawals: &'a [WithdrawalRequest],
    ) -> Element<'a, Message> {
        let rows: Vec<WithdrawalRow> = withdrawals
            .iter()
            .map(|w| WithdrawalRow {
                amount: format_amount(w.amount),
                fee: format_amount(w.fee),
                receive: format_amount(w.net_amount),
                date: w.requested_date().to_string(),
                status: w.status.badge(),
                status_color: status_color(&w.status),
                reason: w.rejection_reason.clone(),
            })
            .collect();

        table::table(
            [
                table::column(
                    text("Amount").size(12).color(MUTED),
                    |r: WithdrawalRow| -> Element<'_, Message> { text(r.amount).size(13).into() },
                )
                .width(Length::FillPortion(3)),
                table::column(
                    text("Fee").size(12).color(MUTED),
                    |r: WithdrawalRow| -> Element<'_, Message> {
                        text(r.fee).size(13).color(MUTED).into()
                    },
                )
                .width(Length::FillPortion(2)),
                table::column(
                    text("Receive").size(12).color(MUTED),
                    |r: WithdrawalRow| -> Element<'_, Message> { text(r.receive).size(13).into() },
                )
                .width(Length::FillPortion(3)),
                table::column(
                    text("Requested").size(12).color(MUTED),
                    |r: WithdrawalRow| -> Element<'_, Message> {
                        text(r.date).size(13).color(MUTED).into()
                    },
                )
                .width(Length::FillPortion(3)),
                table::column(
                    text("Status").size(12).color(MUTED),
                    |r: WithdrawalRow| -> Element<'_, Message> {
                        let badge = status_badge(r.status, r.status_color);
                        match r.reason {
                            Some(reason) => column![badge, text(reason).size(11).color(MUTED)]
                                .spacing(2)
                                .into(),
                            None => badge,
                        }
                    },
                )
                .width(Length::FillPortion(4)),
            ],
            rows,
        )
        .width(Fill)
        .padding_x(12)
        .padding_y(8)
        .separator_x(0)
        .separator_y(1)
        .into()
    }

    /// Append the in-flight indicator and stake progress to a column.
    pub(crate) fn push_status<'a>(
        &'a self,
        col: Column<'a, Message>,
        loading_text: &'a str,
    ) -> Column<'a, Message> {
        let mut col = col;
        if let Some(step) = &self.stake_step {
            col = col.push(text(step.message(self.symbol())).size(13).color(styles::WARNING));
        } else if self.loading > 0 {
            col = col.push(text(loading_text).size(13).color(MUTED));
        }
        col
    }

    /// Amount with the token symbol, shortened above a thousand.
    pub(crate) fn short_amount(&self, value: f64) -> String {
        format!("{} {}", format_short(value, 2), self.symbol())
    }

    pub(crate) fn full_amount(&self, value: f64) -> String {
        format!("{} {}", format_amount(value), self.symbol())
    }
}
