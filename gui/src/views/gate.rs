use crate::messages::Message;
use crate::{styles, App, MUTED};
use cryptowave_core::commands::Command;
use iced::widget::{button, center, column, container, row, text, Space};
use iced::{Element, Font, Length};

impl App {
    pub(crate) fn view_checking(&self) -> Element<'_, Message> {
        let mut col = column![text("Checking access").size(22).font(styles::BOLD)]
            .spacing(12)
            .align_x(iced::Alignment::Center);

        if self.loading > 0 {
            col = col.push(text("Asking the platform about your wallet...").size(14).color(MUTED));
        } else {
            col = col.push(
                text("The platform could not be reached. Your wallet is still connected.")
                    .size(14)
                    .color(MUTED),
            );
            col = col.push(
                row![
                    button(text("Try again").size(13))
                        .padding([8, 16])
                        .style(styles::btn_primary)
                        .on_press(Message::CheckApproval),
                    button(text("Disconnect").size(13))
                        .padding([8, 16])
                        .style(styles::btn_ghost)
                        .on_press(Message::Confirm(Command::Disconnect)),
                ]
                .spacing(8),
            );
        }

        center(col).padding(20).into()
    }

    pub(crate) fn view_pending(&self) -> Element<'_, Message> {
        let address = self.address.as_deref().unwrap_or("");
        let poll_secs = self.service.config().poll_interval.as_secs();

        let address_row = row![
            text(address).size(13).font(Font::MONOSPACE),
            button(text("Copy").size(12))
                .padding([4, 10])
                .style(styles::btn_secondary)
                .on_press(Message::CopyAddress),
        ]
        .spacing(8)
        .align_y(iced::Alignment::Center);

        let mut check = button(text("Check now").size(13))
            .padding([8, 16])
            .style(styles::btn_secondary);
        if self.loading == 0 {
            check = check.on_press(Message::CheckApproval);
        }

        let content = column![
            container(text("Pending").size(12))
                .padding([2, 10])
                .style(styles::badge(styles::WARNING)),
            text("Waiting for approval").size(22).font(styles::BOLD),
            text("Your wallet is pending approval. An administrator will review your access request.")
                .size(14)
                .color(MUTED),
            Space::new().height(4),
            text("Wallet").size(12).color(MUTED),
            address_row,
            Space::new().height(4),
            text(format!("This page checks again every {poll_secs} seconds."))
                .size(12)
                .color(MUTED),
            styles::separator(),
            row![
                check,
                Space::new().width(Length::Fill),
                button(text("Disconnect").size(13))
                    .padding([8, 16])
                    .style(styles::btn_danger)
                    .on_press(Message::Confirm(Command::Disconnect)),
            ]
            .align_y(iced::Alignment::Center),
        ]
        .spacing(10);

        center(
            container(content)
                .padding(28)
                .width(Length::Fixed(480.0))
                .style(styles::card),
        )
        .padding(20)
        .into()
    }
}
