use crate::messages::Message;
use crate::{styles, App, MUTED};
use cryptowave_core::display::{format_amount, format_percent};
use cryptowave_core::vip::{self, VIP_TIERS};
use iced::widget::{column, container, progress_bar, row, text, Space};
use iced::{Element, Fill, Length};

impl App {
    pub(crate) fn view_vip(&self) -> Element<'_, Message> {
        let level = self.snapshot.account.vip_level;
        let apys = vip::tier_apys(&self.snapshot.settings);

        let mut tiers = row![].spacing(12);
        for (tier, (_, apy)) in VIP_TIERS.iter().zip(apys) {
            let current = tier.level == level;
            let mut card = column![
                row![
                    text(tier.name).size(16).font(styles::BOLD),
                    Space::new().width(Fill),
                    text(format_percent(apy)).size(14).color(styles::ACCENT),
                ],
                text(format!("From {} {}", format_amount(tier.min_stake), self.symbol()))
                    .size(12)
                    .color(MUTED),
                styles::separator(),
            ]
            .spacing(8);
            for benefit in tier.benefits {
                card = card.push(text(*benefit).size(12));
            }
            if current {
                card = card.push(
                    container(text("Current").size(11))
                        .padding([2, 8])
                        .style(styles::badge(styles::GOLD)),
                );
            }
            let style: fn(&iced::Theme) -> container::Style = if current {
                styles::card
            } else {
                styles::card_flat
            };
            tiers = tiers.push(
                container(card)
                    .padding(16)
                    .width(Length::FillPortion(1))
                    .style(style),
            );
        }

        column![
            text("VIP").size(24),
            self.view_vip_card(),
            tiers,
        ]
        .spacing(16)
        .into()
    }

    /// VIPCard: current tier and progress to the next one.
    pub(crate) fn view_vip_card(&self) -> Element<'_, Message> {
        let account = &self.snapshot.account;
        let tier = vip::tier_by_level(account.vip_level);

        let mut content = column![
            row![
                text("VIP Status").size(12).color(MUTED),
                Space::new().width(Fill),
                container(text(tier.name).size(12))
                    .padding([2, 10])
                    .style(styles::badge(styles::GOLD)),
            ]
            .align_y(iced::Alignment::Center),
            text(format!("{} APY", format_percent(self.snapshot.effective_apy())))
                .size(20)
                .font(styles::BOLD),
        ]
        .spacing(8);

        match vip::progress_to_next(account.vip_level, account.staked_amount) {
            Some(progress) => {
                content = content
                    .push(
                        progress_bar(0.0..=100.0, progress.percent as f32)
                            .girth(8)
                            .style(styles::progress),
                    )
                    .push(
                        text(format!(
                            "Stake {} more to reach {}",
                            self.full_amount(progress.remaining),
                            progress.next.name
                        ))
                        .size(12)
                        .color(MUTED),
                    );
            }
            None => {
                content = content.push(
                    text("Highest tier reached. All benefits unlocked.")
                        .size(12)
                        .color(styles::GOLD),
                );
            }
        }

        container(content)
            .padding(20)
            .width(Fill)
            .style(styles::card)
            .into()
    }
}
