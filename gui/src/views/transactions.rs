use crate::messages::Message;
use crate::{styles, App};
use iced::widget::{column, container, text};
use iced::{Element, Fill};

impl App {
    pub(crate) fn view_transactions(&self) -> Element<'_, Message> {
        let txs = &self.snapshot.transactions;
        let body: Element<Message> = if txs.is_empty() {
            self.view_empty_transactions()
        } else {
            self.view_tx_table(txs)
        };

        column![
            text("Transactions").size(24),
            container(body).padding(20).width(Fill).style(styles::card),
        ]
        .spacing(16)
        .into()
    }
}
