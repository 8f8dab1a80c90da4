use crate::helpers::detail_row;
use crate::messages::Message;
use crate::{styles, App, MUTED};
use cryptowave_core::config::{StakeMode, QUICK_STAKE_AMOUNTS};
use cryptowave_core::display::{format_amount, parse_amount};
use cryptowave_core::rewards;
use iced::widget::{button, column, container, row, text, text_input, Space};
use iced::{Element, Fill};

impl App {
    pub(crate) fn view_stake(&self) -> Element<'_, Message> {
        column![
            text("Stake").size(24),
            self.view_stake_form(),
            self.view_unstake_form(),
        ]
        .spacing(16)
        .into()
    }

    /// Stake card, shared with the Invest tab of the compact layout.
    pub(crate) fn view_stake_form(&self) -> Element<'_, Message> {
        let snap = &self.snapshot;
        let config = self.service.config();
        let entered = parse_amount(&self.stake_amount).ok();

        let amount = text_input(&format!("Amount ({})", self.symbol()), &self.stake_amount)
            .on_input(Message::StakeAmountChanged)
            .on_submit(Message::SubmitStake)
            .padding(10);

        let mut chips = row![].spacing(8);
        for quick in QUICK_STAKE_AMOUNTS {
            chips = chips.push(
                button(text(format_amount(quick)).size(12))
                    .padding([6, 12])
                    .style(styles::toggle_btn(entered == Some(quick)))
                    .on_press(Message::QuickAmount(quick)),
            );
        }

        let mut stake_btn = button(text("Stake").size(14))
            .padding([10, 24])
            .style(styles::btn_primary);
        if self.loading == 0 && !self.stake_amount.trim().is_empty() {
            stake_btn = stake_btn.on_press(Message::SubmitStake);
        }

        let mut form = column![
            text(format!("Stake {}", self.symbol())).size(16),
            detail_row(
                "Wallet balance",
                match snap.balances {
                    Some(_) => self.full_amount(snap.token_balance()),
                    None => "-".into(),
                },
            ),
            detail_row("Current APY", format!("{:.2}%", snap.effective_apy())),
            Space::new().height(4),
            amount,
            chips,
            text(format!(
                "Minimum stake is {} {}",
                format_amount(config.min_stake),
                self.symbol()
            ))
            .size(12)
            .color(MUTED),
        ]
        .spacing(8);

        if let Some(value) = entered.filter(|v| *v > 0.0) {
            let daily = rewards::daily_earnings(value, snap.effective_apy());
            form = form.push(
                text(format!("Estimated daily earnings: {}", self.full_amount(daily)))
                    .size(12)
                    .color(styles::ACCENT),
            );
        }
        if config.stake_mode == StakeMode::OnChain {
            form = form.push(
                text("Your wallet will ask you to sign a token transfer to the platform.")
                    .size(12)
                    .color(MUTED),
            );
        }

        form = form.push(Space::new().height(4)).push(stake_btn);
        form = self.push_status(form, "Processing...");

        if let Some(hash) = &self.last_tx_hash {
            form = form.push(
                button(text("View transaction in explorer").size(12))
                    .padding([4, 10])
                    .style(styles::btn_ghost)
                    .on_press(Message::OpenExplorer(hash.clone())),
            );
        }

        container(form)
            .padding(24)
            .width(Fill)
            .style(styles::card)
            .into()
    }

    fn view_unstake_form(&self) -> Element<'_, Message> {
        let amount = text_input(&format!("Amount ({})", self.symbol()), &self.unstake_amount)
            .on_input(Message::UnstakeAmountChanged)
            .on_submit(Message::SubmitUnstake)
            .padding(10);

        let mut unstake_btn = button(text("Unstake").size(14))
            .padding([10, 24])
            .style(styles::btn_danger);
        if self.loading == 0
            && !self.unstake_amount.trim().is_empty()
            && self.snapshot.account.staked_amount > 0.0
        {
            unstake_btn = unstake_btn.on_press(Message::SubmitUnstake);
        }

        container(
            column![
                text("Unstake").size(16),
                detail_row(
                    "Staked",
                    self.full_amount(self.snapshot.account.staked_amount)
                ),
                amount,
                unstake_btn,
            ]
            .spacing(8),
        )
        .padding(24)
        .width(Fill)
        .style(styles::card)
        .into()
    }
}
