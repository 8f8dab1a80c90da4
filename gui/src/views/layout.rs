use crate::messages::Message;
use crate::state::Tab;
use crate::{styles, App, MUTED, PRIMARY, SIDEBAR};
use cryptowave_core::commands::Command;
use cryptowave_core::display::short_address;
use iced::widget::{button, column, container, row, scrollable, text, Space};
use iced::{Element, Fill, Length};

impl App {
    /// Wide layout: sidebar navigation with one tab at a time.
    pub(crate) fn view_main(&self) -> Element<'_, Message> {
        let content: Element<Message> = match self.tab {
            Tab::Overview => self.view_overview(),
            Tab::Stake => self.view_stake(),
            Tab::Earnings => self.view_earnings(),
            Tab::Withdraw => self.view_withdraw(),
            Tab::Transactions => self.view_transactions(),
            Tab::Vip => self.view_vip(),
        };

        let right = column![
            self.view_header(),
            styles::separator(),
            scrollable(container(content).padding(20)).height(Fill),
        ]
        .width(Fill);

        row![self.view_sidebar(), right].into()
    }

    fn view_sidebar(&self) -> Element<'_, Message> {
        let nav_btn = |tab: Tab| -> Element<Message> {
            button(text(tab.label()).size(14))
                .width(Fill)
                .padding([10, 14])
                .style(styles::nav_btn(self.tab == tab))
                .on_press(Message::SelectTab(tab))
                .into()
        };

        let mut nav = column![].spacing(4);
        for tab in Tab::ALL {
            nav = nav.push(nav_btn(tab));
        }

        let col = column![
            text("CRYPTOWAVE").size(20).font(styles::BOLD).color(PRIMARY),
            Space::new().height(16),
            nav,
            Space::new().height(Fill),
            button(text("Compact view").size(13))
                .width(Fill)
                .style(styles::btn_ghost)
                .on_press(Message::ToggleLayout),
            button(text("Disconnect").size(13))
                .width(Fill)
                .padding([8, 14])
                .style(styles::btn_danger)
                .on_press(Message::Confirm(Command::Disconnect)),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fixed(200.0));

        container(col)
            .height(Fill)
            .style(|_theme| container::Style {
                background: Some(SIDEBAR.into()),
                ..Default::default()
            })
            .into()
    }

    fn view_header(&self) -> Element<'_, Message> {
        let config = self.service.config();
        let address = self.address.as_deref().map(short_address).unwrap_or_default();

        let mut info = row![
            container(text(config.network.display_name()).size(12))
                .padding([4, 10])
                .style(styles::pill),
        ]
        .spacing(8)
        .align_y(iced::Alignment::Center);
        if !self.snapshot.is_verified() {
            info = info.push(
                container(text("Offline: cached data").size(11))
                    .padding([2, 8])
                    .style(styles::badge(styles::WARNING)),
            );
        }
        if self.loading > 0 {
            info = info.push(text("Updating...").size(12).color(MUTED));
        }

        let mut refresh = button(text("Refresh").size(13))
            .padding([8, 16])
            .style(styles::btn_secondary);
        if self.loading == 0 {
            refresh = refresh.on_press(Message::Refresh);
        }

        row![
            info,
            Space::new().width(Fill),
            button(text(address).size(13))
                .padding([8, 14])
                .style(styles::btn_secondary)
                .on_press(Message::CopyAddress),
            refresh,
        ]
        .spacing(8)
        .padding([12, 20])
        .align_y(iced::Alignment::Center)
        .into()
    }
}
