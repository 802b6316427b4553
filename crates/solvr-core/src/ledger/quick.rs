//! Quick-choice conversions between a percentage of the remaining rights
//! and an absolute vote amount.
//!
//! The percentage side is an `f64` so that
//! `amount_for_percentage(r, percentage_for_amount(r, a)) == a` holds for
//! every `a` in `[0, r]` while `r <= MAX_EXACT_RIGHTS`; a rounded integer
//! percentage would lose amounts whenever `r > 100`. Any other percentage
//! floors exactly, with no tolerance band.

/// Largest remaining balance for which every amount has a distinct
/// percentage. Past this, neighbouring amounts can share an `f64` and the
/// round trip may land one unit away.
pub const MAX_EXACT_RIGHTS: u64 = 1 << 50;

/// `floor(remaining * percentage / 100)`, clamped to `[0, remaining]`.
///
/// A percentage that `percentage_for_amount` produced for this balance maps
/// back to its amount, even where the `f64` sits a hair under the true ratio.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn amount_for_percentage(remaining: u64, percentage: f64) -> u64 {
    if remaining == 0 || !percentage.is_finite() || percentage <= 0.0 {
        return 0;
    }
    if percentage >= 100.0 {
        return remaining;
    }

    let nearest = (remaining as f64 * percentage / 100.0).round() as u64;
    let inverse = [nearest, nearest.saturating_sub(1), nearest.saturating_add(1)]
        .into_iter()
        .filter(|&candidate| candidate <= remaining)
        .find(|&candidate| {
            percentage_for_amount(remaining, candidate).to_bits() == percentage.to_bits()
        });

    inverse.unwrap_or_else(|| floor_share(remaining, percentage))
}

/// The share of `remaining` that `amount` represents, in `[0, 100]`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percentage_for_amount(remaining: u64, amount: u64) -> f64 {
    if remaining == 0 {
        return 0.0;
    }
    clamp_amount(remaining, amount) as f64 * 100.0 / remaining as f64
}

/// Clamp a typed amount into `[0, remaining]`.
#[must_use]
pub fn clamp_amount(remaining: u64, typed: u64) -> u64 {
    typed.min(remaining)
}

/// Exact `floor(remaining * percentage / 100)` for `0 < percentage < 100`,
/// done on the integer mantissa so no rounding creeps in.
fn floor_share(remaining: u64, percentage: f64) -> u64 {
    let (mantissa, exponent) = decompose(percentage);
    let scaled = u128::from(remaining) * u128::from(mantissa);
    let whole = if exponent >= 0 {
        scaled << exponent.unsigned_abs()
    } else {
        scaled.checked_shr(exponent.unsigned_abs()).unwrap_or(0)
    };
    u64::try_from(whole / 100).map_or(remaining, |amount| amount.min(remaining))
}

/// Split a positive finite `f64` into `mantissa * 2^exponent`.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
const fn decompose(value: f64) -> (u64, i32) {
    let bits = value.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1 << 52) - 1);
    if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1 << 52), biased - 1075)
    }
}
