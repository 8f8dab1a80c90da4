use crate::messages::Message;
use crate::{styles, App, MUTED, PRIMARY};
use cryptowave_core::commands::Command;
use cryptowave_core::display::format_percent;
use cryptowave_core::rewards;
use cryptowave_core::vip::VIP_TIERS;
use cryptowave_core::ProviderKind;
use iced::widget::{button, center, column, container, row, text, Space};
use iced::{Element, Fill, Length};

impl App {
    pub(crate) fn view_landing(&self) -> Element<'_, Message> {
        let settings = &self.snapshot.settings;
        let top_apy = rewards::effective_apy(settings, VIP_TIERS[VIP_TIERS.len() - 1].level);

        let feature = |title: &'static str, body: String| -> Element<'_, Message> {
            container(
                column![
                    text(title).size(14).font(styles::BOLD),
                    text(body).size(12).color(MUTED),
                ]
                .spacing(4),
            )
            .padding(16)
            .width(Length::Fixed(200.0))
            .style(styles::card_flat)
            .into()
        };

        let features = row![
            feature(
                "Daily rewards",
                format!("Earn up to {} APY on staked {}", format_percent(top_apy), self.symbol()),
            ),
            feature("VIP tiers", "Higher stakes unlock bonus APY".into()),
            feature("Withdraw anytime", "Requests are reviewed and paid out".into()),
        ]
        .spacing(12);

        let mut connect = button(text("Connect Wallet").size(15))
            .padding([12, 32])
            .style(styles::btn_primary);
        if self.loading == 0 {
            connect = connect.on_press(Message::OpenWalletModal);
        }

        let mut col = column![
            text("CRYPTOWAVE").size(40).font(styles::BOLD).color(PRIMARY),
            text(format!("Stake {} and earn every day", self.symbol()))
                .size(16)
                .color(MUTED),
            Space::new().height(16),
            features,
            Space::new().height(16),
            connect,
        ]
        .spacing(8)
        .align_x(iced::Alignment::Center);

        if self.loading > 0 {
            col = col.push(text("Connecting...").size(13).color(MUTED));
        }

        center(col).padding(20).into()
    }

    /// Provider picker shown over the landing screen.
    pub(crate) fn view_wallet_modal(&self) -> Element<'_, Message> {
        let mut list = column![
            text("Connect Wallet").size(18).font(styles::BOLD),
            text("Choose a wallet provider").size(12).color(MUTED),
            Space::new().height(8),
        ]
        .spacing(8);

        for kind in ProviderKind::ALL {
            let label = if kind == ProviderKind::WalletConnect {
                format!("{} (coming soon)", kind.display_name())
            } else {
                kind.display_name().to_string()
            };
            list = list.push(
                button(text(label).size(14))
                    .width(Fill)
                    .padding([12, 16])
                    .style(styles::btn_secondary)
                    .on_press(Message::ConnectWallet(kind)),
            );
        }

        list = list.push(Space::new().height(4));
        list = list.push(
            row![
                Space::new().width(Fill),
                button(text("Cancel").size(13))
                    .padding([8, 16])
                    .style(styles::btn_ghost)
                    .on_press(Message::CloseWalletModal),
            ],
        );

        container(list)
            .padding(24)
            .width(Length::Fixed(380.0))
            .style(styles::card)
            .into()
    }

    /// Confirmation card for the pending mutating command, if any.
    pub(crate) fn view_confirm_modal(&self) -> Option<Element<'_, Message>> {
        let command = self.confirm.as_ref()?;
        let quote = match command {
            Command::Withdraw { amount } => Some(rewards::withdrawal_quote(
                *amount,
                self.snapshot.settings.withdrawal_fee_percent(),
            )),
            _ => None,
        };
        let prompt = command.confirmation_prompt(self.symbol(), quote.as_ref())?;

        let confirm_style: fn(&iced::Theme, button::Status) -> button::Style =
            if matches!(command, Command::Disconnect) {
                styles::btn_danger
            } else {
                styles::btn_primary
            };

        let card = container(
            column![
                text("Please confirm").size(18).font(styles::BOLD),
                text(prompt).size(14),
                Space::new().height(4),
                styles::separator(),
                row![
                    button(text("Cancel").size(14))
                        .padding([10, 24])
                        .style(styles::btn_ghost)
                        .on_press(Message::ConfirmCancelled),
                    Space::new().width(Fill),
                    button(text("Confirm").size(14))
                        .padding([10, 24])
                        .style(confirm_style)
                        .on_press(Message::ConfirmAccepted),
                ]
                .align_y(iced::Alignment::Center),
            ]
            .spacing(12),
        )
        .padding(24)
        .width(Length::Fixed(420.0))
        .style(styles::card);

        Some(card.into())
    }
}
