//! Fixed-point amount conversion and rounding.

use bigdecimal::{BigDecimal, RoundingMode};
use num_bigint::BigInt;
use num_traits::ToPrimitive;

/// Scale a raw fixed-point sum, divide it by `divisor` and round half away
/// from zero to `places` decimals.
///
/// The arithmetic stays in BigDecimal until the final f64 conversion, so
/// ties are real ties (0.125 rounds to 0.13) the way ClickHouse Decimal
/// `round` treats them. A zero divisor or a non-finite result yields 0.0.
///
/// ```ignore
/// let avg = scaled_round(5_000_000, 6, 2, 2); // 2.5
/// ```
pub fn scaled_round(raw: i128, decimals: u8, divisor: u64, places: i64) -> f64 {
    if divisor == 0 {
        return 0.0;
    }

    let scaled = BigDecimal::new(BigInt::from(raw), decimals as i64);
    let value = if divisor == 1 { scaled } else { scaled / BigDecimal::from(divisor) };

    match value.with_scale_round(places, RoundingMode::HalfUp).to_f64() {
        Some(v) if v.is_finite() => v + 0.0,
        _ => 0.0,
    }
}

/// Round half away from zero to `decimals` places.
///
/// Negative zero is normalized to positive zero so that a netted-out week
/// serializes as `0.0`.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor + 0.0
}
