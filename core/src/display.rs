/// Output formatting: number styles, token unit conversion and CLI renderers.
///
/// Backend amounts are decimal token values (`f64`); wallet amounts are
/// integer base units converted with the token's decimals.
use alloy_primitives::utils::parse_units;
use num_format::{Locale, ToFormattedString};

use crate::backend::{PlatformSettings, Transaction, UserAccount, WithdrawalRequest};
use crate::provider::{address_hex, Address, WalletBalances, U256};
use crate::rewards::{self, EarningsProjection, WithdrawalQuote};
use crate::vip;

pub const NATIVE_DECIMALS: u8 = 18;

/// en-US grouping with a fixed number of decimals: `12345.678` -> `12,345.68`.
#[must_use]
pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let formatted = format!("{:.*}", decimals, value.abs());
    let (whole, frac) = match formatted.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (formatted.as_str(), None),
    };
    let grouped = whole
        .parse::<u128>()
        .map(|w| w.to_formatted_string(&Locale::en))
        .unwrap_or_else(|_| whole.to_string());
    // A value that rounds to zero is shown without a sign.
    let negative = value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0');
    let sign = if negative { "-" } else { "" };
    match frac {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Two-decimal grouped amount, the dashboard's default money format.
#[must_use]
pub fn format_amount(value: f64) -> String {
    format_number(value, 2)
}

/// Short form: `1.50M`, `12.35K`, otherwise plain fixed decimals.
#[must_use]
pub fn format_short(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    if value >= 1_000_000.0 {
        format!("{:.*}M", decimals, value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.*}K", decimals, value / 1_000.0)
    } else {
        format!("{:.*}", decimals, value)
    }
}

#[must_use]
pub fn format_percent(value: f64) -> String {
    format!("{value:.2}%")
}

/// `0x1234...abcd`
#[must_use]
pub fn short_address(address: &str) -> String {
    if address.len() <= 10 {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}

/// Base units to a float for display arithmetic. Precision loss is acceptable here.
#[must_use]
pub fn units_to_f64(raw: U256, decimals: u8) -> f64 {
    let whole: f64 = raw.to_string().parse().unwrap_or_default();
    whole / 10f64.powi(decimals as i32)
}

/// Base units rounded to `places` decimals, without grouping. Used for balance reports.
#[must_use]
pub fn format_units_fixed(raw: U256, decimals: u8, places: usize) -> String {
    format!("{:.*}", places, units_to_f64(raw, decimals))
}

/// Parse a decimal token amount into base units.
/// `"1.5"` at 6 decimals -> `1_500_000`.
#[must_use = "parsing result should be checked"]
pub fn parse_token_amount(input: &str, decimals: u8) -> Result<U256, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("Amount cannot be empty".to_string());
    }
    if input.starts_with('-') {
        return Err("Amount must be positive".to_string());
    }

    let (whole, frac) = input.split_once('.').unwrap_or((input, ""));
    if frac.contains('.') {
        return Err("Invalid amount format. Use a decimal like '1.5' or '100'.".to_string());
    }
    if whole.is_empty() && frac.is_empty() {
        return Err(format!("Invalid amount '{input}'"));
    }
    if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        return Err(format!("Invalid amount '{input}'"));
    }
    if frac.len() > decimals as usize {
        return Err(format!(
            "Too many decimal places. This token supports up to {decimals}."
        ));
    }

    let whole = if whole.is_empty() { "0" } else { whole };
    let canonical = if frac.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{frac}")
    };
    parse_units(&canonical, decimals)
        .map(|units| units.get_absolute())
        .map_err(|e| format!("Invalid amount '{input}': {e}"))
}

/// Parse a user-entered decimal amount for backend requests.
#[must_use = "parsing result should be checked"]
pub fn parse_amount(input: &str) -> Result<f64, String> {
    let input = input.trim().replace(',', "");
    if input.is_empty() {
        return Err("Amount cannot be empty".to_string());
    }
    let value: f64 = input
        .parse()
        .map_err(|_| format!("Invalid amount '{input}'"))?;
    if !value.is_finite() {
        return Err(format!("Invalid amount '{input}'"));
    }
    Ok(value)
}

/// `+` for inflows into the position, `-` for everything else.
#[must_use]
pub fn transaction_sign(tx: &Transaction) -> &'static str {
    if tx.kind.is_inflow() {
        "+"
    } else {
        "-"
    }
}

/// Wallet balances as the balance card shows them: native to 4 places, token to 2.
#[must_use]
pub fn format_wallet_balances(
    balances: &WalletBalances,
    native_symbol: &str,
    token_symbol: &str,
) -> String {
    format!(
        "  {native_symbol}:  {}\n  {token_symbol}: {}",
        format_units_fixed(balances.native, NATIVE_DECIMALS, 4),
        format_amount(units_to_f64(balances.token, balances.token_decimals)),
    )
}

#[must_use]
pub fn format_account(account: &UserAccount, settings: &PlatformSettings, symbol: &str) -> String {
    let apy = rewards::effective_apy(settings, account.vip_level);
    let daily = rewards::daily_earnings(account.staked_amount, apy);
    [
        format!("  Staked:     {} {symbol}", format_amount(account.staked_amount)),
        format!("  Earned:     {} {symbol}", format_amount(account.total_earned)),
        format!("  Claimable:  {} {symbol}", format_amount(account.claimable_rewards)),
        format!("  VIP level:  {}", vip::tier_name(account.vip_level)),
        format!("  APY:        {}", format_percent(apy)),
        format!("  Daily:      {} {symbol}", format_amount(daily)),
    ]
    .join("\n")
}

#[must_use]
pub fn format_overview(
    address: &Address,
    balances: Option<&WalletBalances>,
    account: &UserAccount,
    settings: &PlatformSettings,
    native_symbol: &str,
    token_symbol: &str,
) -> String {
    let mut lines = vec![format!("  Wallet:     {}", short_address(&address.to_string()))];
    if let Some(b) = balances {
        lines.push(format_wallet_balances(b, native_symbol, token_symbol));
    }
    lines.push(format_account(account, settings, token_symbol));
    lines.join("\n")
}

/// Compact ledger: sign, type, amount, date, status.
#[must_use]
pub fn format_transactions(txs: &[Transaction], symbol: &str) -> String {
    if txs.is_empty() {
        return "No transactions yet.".to_string();
    }
    let mut lines = Vec::with_capacity(txs.len());
    for tx in txs {
        lines.push(format!(
            "{}{:>14} {symbol}  {:<9} {:<12} {}",
            transaction_sign(tx),
            format_amount(tx.amount),
            tx.kind.label(),
            tx.date,
            tx.status.badge(),
        ));
    }
    lines.join("\n")
}

#[must_use]
pub fn format_withdrawals(withdrawals: &[WithdrawalRequest], symbol: &str) -> String {
    if withdrawals.is_empty() {
        return "No withdrawal requests.".to_string();
    }
    let mut lines = Vec::with_capacity(withdrawals.len() + 1);
    for w in withdrawals {
        let mut line = format!(
            "  {:<9} {:>12} {symbol}  fee {:>8}  net {:>12}  {}",
            w.status.badge(),
            format_amount(w.amount),
            format_amount(w.fee),
            format_amount(w.net_amount),
            w.requested_date(),
        );
        if let Some(reason) = &w.rejection_reason {
            line.push_str(&format!("\n            Reason: {reason}"));
        }
        lines.push(line);
    }
    let pending = rewards::pending_withdrawal_count(withdrawals);
    if pending > 0 {
        lines.push(format!(
            "\n  {pending} pending withdrawal(s) totaling {} {symbol}",
            format_amount(rewards::pending_withdrawal_total(withdrawals)),
        ));
    }
    lines.join("\n")
}

#[must_use]
pub fn format_earnings(projection: &EarningsProjection, total_earned: f64, symbol: &str) -> String {
    [
        format!("  APY:         {}", format_percent(projection.apy)),
        format!("  Daily rate:  {:.4}%", projection.daily_rate),
        format!("  Daily:       {} {symbol}", format_amount(projection.daily)),
        format!("  Weekly:      {} {symbol}", format_amount(projection.weekly)),
        format!("  Monthly:     {} {symbol}", format_amount(projection.monthly)),
        format!("  Total earned: {} {symbol}", format_amount(total_earned)),
    ]
    .join("\n")
}

#[must_use]
pub fn format_withdrawal_quote(quote: &WithdrawalQuote, symbol: &str) -> String {
    format!(
        "  Amount:  {} {symbol}\n  Fee:     {} {symbol} ({})\n  Receive: {} {symbol}",
        format_amount(quote.amount),
        format_amount(quote.fee),
        format_percent(quote.fee_percent),
        format_amount(quote.receive),
    )
}

/// Tier table with the current level marked and progress to the next tier.
#[must_use]
pub fn format_vip(account: &UserAccount, settings: &PlatformSettings, symbol: &str) -> String {
    let mut lines = Vec::new();
    for (tier, (_, apy)) in vip::VIP_TIERS.iter().zip(vip::tier_apys(settings)) {
        let marker = if tier.level == account.vip_level { "*" } else { " " };
        lines.push(format!(
            "{marker} {:<7} from {:>10} {symbol}  {}",
            tier.name,
            format_short(tier.min_stake, 0),
            format_percent(apy),
        ));
        lines.push(format!("            {}", tier.benefits.join(", ")));
    }
    match vip::progress_to_next(account.vip_level, account.staked_amount) {
        Some(p) => lines.push(format!(
            "\nProgress to {}: {:.0}%  (need {} more {symbol})",
            p.next.name,
            p.percent,
            format_amount(p.remaining),
        )),
        None => lines.push("\nMaximum tier reached.".to_string()),
    }
    lines.join("\n")
}

#[must_use]
pub fn format_settings(settings: &PlatformSettings) -> String {
    let wallet = settings
        .platform_wallet
        .as_deref()
        .filter(|w| !w.is_empty())
        .unwrap_or("(not configured)");
    [
        format!("  Base APY:        {}", format_percent(settings.base_apy)),
        format!("  VIP 1 bonus:     +{}", format_percent(settings.vip1_bonus)),
        format!("  VIP 2 bonus:     +{}", format_percent(settings.vip2_bonus)),
        format!("  VIP 3 bonus:     +{}", format_percent(settings.vip3_bonus)),
        format!("  Withdrawal fee:  {}", format_percent(settings.withdrawal_fee_percent())),
        format!("  Platform wallet: {wallet}"),
    ]
    .join("\n")
}

/// Account state as JSON.
#[must_use]
pub fn format_account_json(
    address: &Address,
    account: &UserAccount,
    settings: &PlatformSettings,
) -> String {
    let apy = rewards::effective_apy(settings, account.vip_level);
    serde_json::json!({
        "address": address_hex(address),
        "staked_amount": account.staked_amount,
        "total_earned": account.total_earned,
        "claimable_rewards": account.claimable_rewards,
        "vip_level": account.vip_level,
        "vip_name": vip::tier_name(account.vip_level),
        "apy": apy,
        "daily_earnings": rewards::daily_earnings(account.staked_amount, apy),
    })
    .to_string()
}

/// Wallet balances as JSON, raw base units next to the display values.
#[must_use]
pub fn format_balances_json(balances: &WalletBalances) -> String {
    serde_json::json!({
        "native_wei": balances.native.to_string(),
        "native": format_units_fixed(balances.native, NATIVE_DECIMALS, 4),
        "token_units": balances.token.to_string(),
        "token": format_units_fixed(balances.token, balances.token_decimals, 2),
        "token_decimals": balances.token_decimals,
    })
    .to_string()
}
