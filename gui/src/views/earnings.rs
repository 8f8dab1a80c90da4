use crate::helpers::stat_card;
use crate::messages::Message;
use crate::{styles, App, MUTED};
use cryptowave_core::commands::Command;
use cryptowave_core::display::{format_number, format_percent};
use iced::widget::{button, canvas, column, container, row, text, Space};
use iced::{Color, Element, Fill, Length};

impl App {
    pub(crate) fn view_earnings(&self) -> Element<'_, Message> {
        let projection = self.snapshot.projection();

        let stats = row![
            stat_card("APY", format_percent(projection.apy), styles::ACCENT),
            stat_card("Daily", self.full_amount(projection.daily), Color::WHITE),
            stat_card("Weekly", self.full_amount(projection.weekly), Color::WHITE),
            stat_card("Monthly", self.full_amount(projection.monthly), Color::WHITE),
        ]
        .spacing(12);

        let mut chart = column![text("Projected Earnings").size(16)].spacing(12);
        if self.earnings_chart.data.is_empty() {
            chart = chart.push(
                text(format!(
                    "Stake {} to start earning.",
                    self.symbol()
                ))
                .size(14)
                .color(MUTED),
            );
        } else {
            chart = chart.push(
                canvas::Canvas::new(&self.earnings_chart)
                    .width(Fill)
                    .height(Length::Fixed(200.0)),
            );
        }

        column![
            text("Earnings").size(24),
            stats,
            self.view_interest_card(),
            container(chart).padding(20).width(Fill).style(styles::card),
            text(format!(
                "Daily rate {:.4}%. Projections assume the current stake and APY stay unchanged.",
                projection.daily_rate
            ))
            .size(12)
            .color(MUTED),
        ]
        .spacing(16)
        .into()
    }

    /// InterestCard: live interest counter and the claim action.
    pub(crate) fn view_interest_card(&self) -> Element<'_, Message> {
        let account = &self.snapshot.account;

        let mut claim = button(text("Claim").size(14))
            .padding([10, 24])
            .style(styles::btn_primary);
        if self.loading == 0 && account.claimable_rewards > 0.0 {
            claim = claim.on_press(Message::Confirm(Command::Claim));
        }

        let content = column![
            text("Interest").size(16),
            row![
                column![
                    text("Total earned").size(12).color(MUTED),
                    text(format!(
                        "{} {}",
                        format_number(self.accrual.value(), 6),
                        self.symbol()
                    ))
                    .size(24)
                    .font(styles::BOLD)
                    .color(styles::ACCENT),
                    text(format!("+{} today", self.full_amount(self.accrual.today())))
                        .size(12)
                        .color(MUTED),
                ]
                .spacing(4),
                Space::new().width(Fill),
                column![
                    text("Claimable").size(12).color(MUTED),
                    text(self.full_amount(account.claimable_rewards))
                        .size(18)
                        .font(styles::BOLD),
                    claim,
                ]
                .spacing(6)
                .align_x(iced::Alignment::End),
            ]
            .align_y(iced::Alignment::Center),
        ]
        .spacing(12);

        container(content)
            .padding(20)
            .width(Fill)
            .style(styles::card)
            .into()
    }
}
