//! Reward and fee arithmetic shared by both front-ends.

use crate::backend::{PlatformSettings, WithdrawalRequest};

const DAYS_PER_YEAR: f64 = 365.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Base APY plus the bonus of the account's VIP level, in percent.
pub fn effective_apy(settings: &PlatformSettings, vip_level: u8) -> f64 {
    settings.base_apy + settings.vip_bonus(vip_level)
}

/// Daily rate in percent for an annual rate in percent.
pub fn daily_rate(apy: f64) -> f64 {
    apy / DAYS_PER_YEAR
}

/// Simple (non-compounding) daily earnings on `staked` at `apy` percent.
pub fn daily_earnings(staked: f64, apy: f64) -> f64 {
    staked * (apy / 100.0) / DAYS_PER_YEAR
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EarningsProjection {
    pub apy: f64,
    pub daily_rate: f64,
    pub daily: f64,
    pub weekly: f64,
    pub monthly: f64,
}

/// Linear projections: a week is 7 days and a month is 30.
pub fn project(staked: f64, apy: f64) -> EarningsProjection {
    let daily = daily_earnings(staked, apy);
    EarningsProjection {
        apy,
        daily_rate: daily_rate(apy),
        daily,
        weekly: daily * 7.0,
        monthly: daily * 30.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WithdrawalQuote {
    pub amount: f64,
    pub fee_percent: f64,
    pub fee: f64,
    pub receive: f64,
}

pub fn withdrawal_quote(amount: f64, fee_percent: f64) -> WithdrawalQuote {
    let fee = amount * fee_percent / 100.0;
    WithdrawalQuote {
        amount,
        fee_percent,
        fee,
        receive: amount - fee,
    }
}

/// Sum of the amounts of withdrawal requests still pending.
pub fn pending_withdrawal_total(withdrawals: &[WithdrawalRequest]) -> f64 {
    withdrawals
        .iter()
        .filter(|w| w.is_pending())
        .map(|w| w.amount)
        .sum()
}

pub fn pending_withdrawal_count(withdrawals: &[WithdrawalRequest]) -> usize {
    withdrawals.iter().filter(|w| w.is_pending()).count()
}

/// Stake not yet committed to a pending withdrawal.
pub fn available_for_withdrawal(staked: f64, withdrawals: &[WithdrawalRequest]) -> f64 {
    staked - pending_withdrawal_total(withdrawals)
}

/// Display-only counter that accrues interest between backend refreshes.
///
/// The value restarts from the backend's total whenever that total changes.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveAccrual {
    base: f64,
    displayed: f64,
    per_second: f64,
}

impl LiveAccrual {
    pub fn new(total_earned: f64, staked: f64, daily_rate_percent: f64) -> Self {
        Self {
            base: total_earned,
            displayed: total_earned,
            per_second: Self::rate(staked, daily_rate_percent),
        }
    }

    fn rate(staked: f64, daily_rate_percent: f64) -> f64 {
        if staked <= 0.0 {
            return 0.0;
        }
        staked * (daily_rate_percent / 100.0) / SECONDS_PER_DAY
    }

    /// Advance by one tick of `seconds`.
    pub fn tick(&mut self, seconds: f64) {
        self.displayed += self.per_second * seconds;
    }

    /// Take new backend figures. Resets the counter only if the total moved.
    pub fn sync(&mut self, total_earned: f64, staked: f64, daily_rate_percent: f64) {
        if (total_earned - self.base).abs() > f64::EPSILON {
            self.base = total_earned;
            self.displayed = total_earned;
        }
        self.per_second = Self::rate(staked, daily_rate_percent);
    }

    pub fn value(&self) -> f64 {
        self.displayed
    }

    /// Interest expected over a full day at the current rate.
    pub fn today(&self) -> f64 {
        self.per_second * SECONDS_PER_DAY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::EntryStatus;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn withdrawal(amount: f64, status: EntryStatus) -> WithdrawalRequest {
        WithdrawalRequest {
            id: None,
            amount,
            fee: 0.0,
            net_amount: amount,
            status,
            requested_at: String::new(),
            rejection_reason: None,
        }
    }

    #[test]
    fn effective_apy_adds_level_bonus() {
        let settings = PlatformSettings::default();
        assert!(approx(effective_apy(&settings, 0), 12.5));
        assert!(approx(effective_apy(&settings, 2), 13.0));
        assert!(approx(effective_apy(&settings, 7), 12.5));
    }

    #[test]
    fn daily_earnings_example() {
        // 10 000 staked at 13% APY
        assert!(approx(daily_earnings(10_000.0, 13.0), 1300.0 / 365.0));
        assert!((daily_earnings(10_000.0, 13.0) - 3.5616).abs() < 1e-4);
    }

    #[test]
    fn projections_scale_linearly() {
        let p = project(36_500.0, 10.0);
        assert!(approx(p.daily, 10.0));
        assert!(approx(p.weekly, 70.0));
        assert!(approx(p.monthly, 300.0));
        assert!(approx(p.daily_rate, 10.0 / 365.0));
    }

    #[test]
    fn withdrawal_fee_and_net() {
        let q = withdrawal_quote(1_000.0, 2.0);
        assert!(approx(q.fee, 20.0));
        assert!(approx(q.receive, 980.0));
        assert!(approx(q.fee + q.receive, q.amount));
    }

    #[test]
    fn available_subtracts_only_pending() {
        let ws = vec![
            withdrawal(300.0, EntryStatus::Pending),
            withdrawal(200.0, EntryStatus::Approved),
            withdrawal(100.0, EntryStatus::Pending),
            withdrawal(50.0, EntryStatus::Rejected),
        ];
        assert!(approx(pending_withdrawal_total(&ws), 400.0));
        assert_eq!(pending_withdrawal_count(&ws), 2);
        assert!(approx(available_for_withdrawal(1_000.0, &ws), 600.0));
    }

    #[test]
    fn live_accrual_ticks_and_resets() {
        let mut live = LiveAccrual::new(100.0, 86_400.0, 1.0);
        // 1% of 86 400 per day = 864/day = 0.01/s
        live.tick(1.0);
        assert!(approx(live.value(), 100.01));
        assert!(approx(live.today(), 864.0));

        // Same total: keep accruing.
        live.sync(100.0, 86_400.0, 1.0);
        assert!(approx(live.value(), 100.01));

        // New total from the backend: restart there.
        live.sync(150.0, 86_400.0, 1.0);
        assert!(approx(live.value(), 150.0));
    }

    #[test]
    fn live_accrual_idle_without_stake() {
        let mut live = LiveAccrual::new(5.0, 0.0, 1.0);
        live.tick(3_600.0);
        assert!(approx(live.value(), 5.0));
    }
}
