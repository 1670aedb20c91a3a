//! Helpers for presenting model output as money.

use rust_decimal::Decimal;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use labor_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Converts a model amount to currency, rounded half-up to cents.
///
/// Returns `None` for NaN or infinite amounts and for magnitudes a
/// [`Decimal`] cannot hold.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use labor_core::calculations::common::to_currency;
///
/// assert_eq!(to_currency(3475.65), Some(dec!(3475.65)));
/// assert_eq!(to_currency(141.004999), Some(dec!(141.00)));
/// assert_eq!(to_currency(f64::NAN), None);
/// ```
pub fn to_currency(value: f64) -> Option<Decimal> {
    Decimal::from_f64_retain(value).map(round_half_up)
}
