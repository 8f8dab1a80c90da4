//! VIP tier table and tier arithmetic.

use crate::backend::PlatformSettings;

#[derive(Debug, Clone, PartialEq)]
pub struct VipTier {
    pub level: u8,
    pub name: &'static str,
    pub min_stake: f64,
    /// Bonus APY in percentage points. The backend's settings override this
    /// when computing the effective APY.
    pub apy_bonus: f64,
    pub benefits: &'static [&'static str],
}

/// Tiers in ascending order of `min_stake`, starting at zero.
pub const VIP_TIERS: [VipTier; 4] = [
    VipTier {
        level: 0,
        name: "Normal",
        min_stake: 0.0,
        apy_bonus: 0.0,
        benefits: &["Standard support", "Daily compounding"],
    },
    VipTier {
        level: 1,
        name: "VIP 1",
        min_stake: 10_000.0,
        apy_bonus: 0.25,
        benefits: &["Priority support", "+0.25% bonus APY", "Advanced analytics"],
    },
    VipTier {
        level: 2,
        name: "VIP 2",
        min_stake: 50_000.0,
        apy_bonus: 0.5,
        benefits: &[
            "Dedicated manager",
            "+0.5% bonus APY",
            "Early feature access",
            "Lower fees",
        ],
    },
    VipTier {
        level: 3,
        name: "VIP 3",
        min_stake: 100_000.0,
        apy_bonus: 1.0,
        benefits: &[
            "All benefits unlocked",
            "+1.0% bonus APY",
            "VIP support 24/7",
            "No withdrawal fees",
            "Exclusive events",
        ],
    },
];

/// Highest tier whose threshold the staked amount reaches.
pub fn tier_for_stake(staked: f64) -> &'static VipTier {
    VIP_TIERS
        .iter()
        .rev()
        .find(|tier| staked >= tier.min_stake)
        .unwrap_or(&VIP_TIERS[0])
}

/// Tier for a backend-reported level. Unknown levels read as Normal.
pub fn tier_by_level(level: u8) -> &'static VipTier {
    VIP_TIERS.get(level as usize).unwrap_or(&VIP_TIERS[0])
}

pub fn tier_name(level: u8) -> &'static str {
    tier_by_level(level).name
}

pub fn next_tier(level: u8) -> Option<&'static VipTier> {
    VIP_TIERS.get(level as usize + 1)
}

/// Distance from the current level to the next tier.
#[derive(Debug, Clone, PartialEq)]
pub struct TierProgress {
    pub next: &'static VipTier,
    /// Percentage of the next threshold already staked, capped at 100.
    pub percent: f64,
    /// Amount still to stake, never negative.
    pub remaining: f64,
}

/// `None` at the top tier.
pub fn progress_to_next(level: u8, staked: f64) -> Option<TierProgress> {
    let next = next_tier(level)?;
    let percent = (staked / next.min_stake * 100.0).clamp(0.0, 100.0);
    Some(TierProgress {
        next,
        percent,
        remaining: (next.min_stake - staked).max(0.0),
    })
}

/// APY of each tier under the given settings, for the tier comparison view.
pub fn tier_apys(settings: &PlatformSettings) -> [(u8, f64); 4] {
    let mut out = [(0u8, 0.0); 4];
    for (slot, tier) in out.iter_mut().zip(VIP_TIERS.iter()) {
        *slot = (tier.level, settings.base_apy + settings.vip_bonus(tier.level));
    }
    out
}
