use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept on scaled quantities.
pub const QUANTITY_DECIMALS: u32 = 2;

/// Smallest non-zero quantity at `QUANTITY_DECIMALS` places.
pub const MIN_QUANTITY: f64 = 0.01;

/// Round to two decimals, ties away from zero, deciding ties on the
/// decimal digits the value prints as (`0.125 -> 0.13`, `2.675 -> 2.68`).
pub fn round_quantity(value: f64) -> f64 {
    match to_decimal(value) {
        Some(decimal) => from_decimal(round_decimal(decimal)).unwrap_or(value),
        None => float_round(value),
    }
}

/// `baseline * target / base`, rounded. Multiplies before dividing so a
/// terminating result stays exact (`0.375 * 1 / 3 = 0.125`).
pub fn scale_quantity(baseline: f64, target: u32, base: u32) -> f64 {
    let exact = to_decimal(baseline).and_then(|qty| {
        qty.checked_mul(Decimal::from(target))?
            .checked_div(Decimal::from(base))
    });

    match exact.map(round_decimal).and_then(from_decimal) {
        Some(scaled) => scaled,
        None => float_round(baseline * f64::from(target) / f64::from(base)),
    }
}

fn to_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    // Display yields the shortest string that round-trips, which is the
    // number the recipe actually wrote down.
    Decimal::from_str(&value.to_string()).ok()
}

fn round_decimal(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(QUANTITY_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

fn from_decimal(value: Decimal) -> Option<f64> {
    value.to_f64()
}

fn float_round(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
