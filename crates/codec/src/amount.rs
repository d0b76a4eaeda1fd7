//! Conversion between human-readable amounts and fixed-point integers.

use alloy_primitives::U256;
use thiserror::Error;

/// Largest exponent for which `10^decimals` fits in a `U256`.
const MAX_DECIMALS: u8 = 77;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is required")]
    Empty,

    #[error("amount must be greater than zero")]
    NotPositive,

    #[error("{0:?} is not a decimal number")]
    Invalid(String),

    #[error("amount has more than {decimals} decimal places")]
    TooPrecise { decimals: u8 },

    #[error("amount does not fit in 256 bits")]
    Overflow,

    #[error("{0} decimals is not supported")]
    UnsupportedDecimals(u8),
}

/// Check that `amount` is a positive decimal number without knowing the
/// token's decimals.
pub fn validate_amount(amount: &str) -> Result<(), AmountError> {
    split_amount(amount).map(|_| ())
}

/// Split a trimmed amount into its whole and fractional digits.
fn split_amount(amount: &str) -> Result<(&str, &str), AmountError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(AmountError::Empty);
    }
    if amount.starts_with('-') {
        return Err(AmountError::NotPositive);
    }

    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
        return Err(AmountError::Invalid(amount.to_string()));
    }
    if whole.bytes().chain(fraction.bytes()).all(|b| b == b'0') {
        return Err(AmountError::NotPositive);
    }
    Ok((whole, fraction))
}

/// Scale a decimal string such as `"1.5"` by `10^decimals`.
///
/// The amount must be strictly positive and carry no more fractional digits
/// than `decimals`; nothing is rounded.
pub fn to_fixed_point(amount: &str, decimals: u8) -> Result<U256, AmountError> {
    if decimals > MAX_DECIMALS {
        return Err(AmountError::UnsupportedDecimals(decimals));
    }

    let (whole, fraction) = split_amount(amount)?;
    if fraction.len() > usize::from(decimals) {
        return Err(AmountError::TooPrecise { decimals });
    }

    let padding = usize::from(decimals) - fraction.len();
    let ten = U256::from(10u8);
    let mut value = U256::ZERO;
    for digit in whole
        .bytes()
        .chain(fraction.bytes())
        .map(|b| b - b'0')
        .chain(std::iter::repeat_n(0, padding))
    {
        value = value
            .checked_mul(ten)
            .and_then(|v| v.checked_add(U256::from(digit)))
            .ok_or(AmountError::Overflow)?;
    }

    Ok(value)
}

/// Render a fixed-point integer with `decimals` places, trimming trailing zeros.
pub fn from_fixed_point(value: U256, decimals: u8) -> Result<String, AmountError> {
    if decimals > MAX_DECIMALS {
        return Err(AmountError::UnsupportedDecimals(decimals));
    }

    let scale = U256::from(10u8).pow(U256::from(decimals));
    let whole = value / scale;
    let fraction = value % scale;

    if fraction.is_zero() {
        return Ok(whole.to_string());
    }

    let fraction = format!("{:0>width$}", fraction.to_string(), width = usize::from(decimals));
    Ok(format!("{whole}.{}", fraction.trim_end_matches('0')))
}
