//! Rounding and formatting helpers shared by the calculators.
//!
//! Currency values are carried as [`Decimal`] and rounded half-up to cents;
//! everything else stays `f64` and is only rounded for display.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::CalcError;

/// Rounds to whole cents. Half a cent goes away from zero.
///
/// ```
/// use rust_decimal_macros::dec;
/// use calc_core::format::round_half_up;
///
/// // 15% of 54.30
/// assert_eq!(round_half_up(dec!(8.145)), dec!(8.15));
/// assert_eq!(round_half_up(dec!(-8.145)), dec!(-8.15));
/// assert_eq!(round_half_up(dec!(8.144)), dec!(8.14));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts a floating-point amount into cents-rounded [`Decimal`].
///
/// # Errors
///
/// Returns [`CalcError::NonFiniteResult`] when `value` is NaN, infinite, or
/// too large to be represented as a decimal. `what` names the quantity in the
/// message.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use calc_core::format::money;
///
/// assert_eq!(money(1216.0395, "payment").unwrap(), dec!(1216.04));
/// assert!(money(f64::NAN, "payment").is_err());
/// ```
pub fn money(
    value: f64,
    what: &'static str,
) -> Result<Decimal, CalcError> {
    if !value.is_finite() {
        return Err(CalcError::NonFiniteResult(what));
    }
    Decimal::from_f64_retain(value)
        .map(round_half_up)
        .ok_or(CalcError::NonFiniteResult(what))
}

/// Rounds `value` to `places` decimal places, half away from zero.
///
/// ```
/// use calc_core::format::round_to;
///
/// assert_eq!(round_to(22.857142, 1), 22.9);
/// assert_eq!(round_to(-1.25, 1), -1.3);
/// ```
pub fn round_to(
    value: f64,
    places: u32,
) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Formats a float with a fixed number of decimals, dropping a negative sign
/// on zero so `-0.00` never reaches the display.
pub fn format_fixed(
    value: f64,
    places: usize,
) -> String {
    let text = format!("{value:.places$}");
    if text.starts_with('-') && text[1..].chars().all(|c| c == '0' || c == '.') {
        text[1..].to_string()
    } else {
        text
    }
}

/// Formats with at most `places` decimals, dropping trailing zeros.
///
/// ```
/// use calc_core::format::format_compact;
///
/// assert_eq!(format_compact(2.0, 4), "2");
/// assert_eq!(format_compact(-0.25, 4), "-0.25");
/// assert_eq!(format_compact(1.0 / 3.0, 4), "0.3333");
/// ```
pub fn format_compact(
    value: f64,
    places: usize,
) -> String {
    let text = format_fixed(value, places);
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

/// Returns `value` unchanged when finite, otherwise a
/// [`CalcError::NonFiniteResult`] naming the quantity.
pub fn ensure_finite(
    value: f64,
    what: &'static str,
) -> Result<f64, CalcError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::NonFiniteResult(what))
    }
}
