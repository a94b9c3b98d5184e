//! Display Formatting
//!
//! Number formatting shared by every quote category: US-style thousands
//! separators, signed percentages, and compact dollar amounts with
//! K/M/B/T suffixes.

use rust_decimal::{Decimal, RoundingStrategy};

/// Suffix thresholds for compact dollar amounts, largest first.
const COMPACT_SUFFIXES: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

/// Maximum fraction digits shown for a spot price.
const PRICE_MAX_FRACTION_DIGITS: usize = 3;

// =============================================================================
// Direction
// =============================================================================

/// Whether a signed change counts as "up".
///
/// Only a strictly positive change is up; zero, negative and NaN are not.
#[must_use]
pub fn is_up(change: f64) -> bool {
    change > 0.0
}

// =============================================================================
// Float Formatting
// =============================================================================

/// Format a value with a fixed number of decimals and thousands separators.
///
/// `1234.5` with two decimals renders as `1,234.50`.
#[must_use]
pub fn format_grouped(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + fixed.len() / 3 + 1);
    if value.is_sign_negative() && has_nonzero_digit(&fixed) {
        out.push('-');
    }
    out.push_str(&group_digits(int_part));
    if let Some(frac_part) = frac_part {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// Format a spot price in dollars: grouped, up to three fraction digits,
/// trailing zeros trimmed.
///
/// `45230.0` renders as `$45,230`, `0.085` as `$0.085`.
#[must_use]
pub fn format_usd_price(value: f64) -> String {
    let grouped = format_grouped(value, PRICE_MAX_FRACTION_DIGITS);
    let trimmed = grouped.trim_end_matches('0').trim_end_matches('.');
    with_dollar(trimmed)
}

/// Format a percent change with two decimals and an explicit `+` for gains.
#[must_use]
pub fn format_signed_percent(value: f64) -> String {
    let fixed = format!("{value:.2}");
    if !has_nonzero_digit(&fixed) {
        return "0.00%".to_string();
    }
    if value > 0.0 {
        format!("+{fixed}%")
    } else {
        format!("{fixed}%")
    }
}

/// Format a dollar amount compactly.
///
/// `1_500_000_000` renders as `$1.50B`, `2_300_000` as `$2.30M`, and
/// amounts below one thousand as plain dollars (`$500.00`). A figure that
/// rounds up to 1000 moves to the next suffix, so `999_999` is `$1.00M`.
#[must_use]
pub fn format_compact_usd(value: f64) -> String {
    let magnitude = value.abs();
    let mut tier = COMPACT_SUFFIXES
        .iter()
        .position(|&(threshold, _)| magnitude >= threshold);

    loop {
        let (divisor, suffix) = tier
            .and_then(|i| COMPACT_SUFFIXES.get(i).copied())
            .unwrap_or((1.0, ""));
        let scaled = format!("{:.2}", value / divisor);

        let larger = match tier {
            Some(0) => None,
            Some(i) => Some(i - 1),
            None => Some(COMPACT_SUFFIXES.len() - 1),
        };
        match larger {
            Some(next) if rolls_over(&scaled) => tier = Some(next),
            _ => return with_dollar(&format!("{scaled}{suffix}")),
        }
    }
}

/// Whether a rendered two-decimal figure reached the next thousand.
fn rolls_over(scaled: &str) -> bool {
    scaled
        .trim_start_matches('-')
        .parse::<f64>()
        .is_ok_and(|figure| figure >= 1e3)
}

/// Format a value with a fixed number of decimals and no grouping.
///
/// Used for forex rates, where four decimals is the display convention.
#[must_use]
pub fn format_fixed(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}")
}

// =============================================================================
// Decimal Formatting
// =============================================================================

/// Round half away from zero, the way prices are conventionally displayed.
#[must_use]
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Format a decimal with exactly `dp` fraction digits.
#[must_use]
pub fn format_decimal(value: Decimal, dp: u32) -> String {
    let mut rounded = round_half_up(value, dp);
    rounded.rescale(dp);
    rounded.to_string()
}

/// Format the integer part of a decimal with thousands separators.
///
/// Used for share volumes: `6720926` renders as `6,720,926`.
#[must_use]
pub fn format_decimal_grouped(value: Decimal) -> String {
    let whole = round_half_up(value, 0).abs().trunc().to_string();
    let grouped = group_digits(&whole);
    if value.is_sign_negative() && !value.round_dp(0).is_zero() {
        format!("-{grouped}")
    } else {
        grouped
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn group_digits(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn has_nonzero_digit(s: &str) -> bool {
    s.bytes().any(|b| matches!(b, b'1'..=b'9'))
}

fn with_dollar(amount: &str) -> String {
    amount
        .strip_prefix('-')
        .map_or_else(|| format!("${amount}"), |rest| format!("-${rest}"))
}

// =============================================================================
// Tests
// =============================================================================
