//! Money parsing helpers

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money, MoneyError,
    iso::{Currency, EUR, GBP, USD},
};
use thiserror::Error;

/// Errors raised while reading a money amount from text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyParseError {
    /// The string was not of the form `AMOUNT CURRENCY`.
    #[error("expected format 'AMOUNT CURRENCY', got: {0}")]
    Format(String),

    /// The amount could not be represented in minor units.
    #[error("invalid amount: {0}")]
    Amount(String),

    /// The currency code is not one the storefront trades in.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// Look up a supported ISO currency by its alphabetic code.
pub fn currency_for_code(code: &str) -> Option<&'static Currency> {
    match code {
        "GBP" => Some(GBP),
        "USD" => Some(USD),
        "EUR" => Some(EUR),
        _ => None,
    }
}

/// Check two amounts are in the same currency.
///
/// # Errors
///
/// Returns [`MoneyError::CurrencyMismatch`] naming `expected`'s currency first.
pub fn ensure_same_currency(
    expected: &Money<'_, Currency>,
    actual: &Money<'_, Currency>,
) -> Result<(), MoneyError> {
    if expected.currency() == actual.currency() {
        Ok(())
    } else {
        Err(MoneyError::CurrencyMismatch {
            expected: expected.currency().iso_alpha_code,
            actual: actual.currency().iso_alpha_code,
        })
    }
}

/// Convert a decimal major-unit amount (e.g. `79.99`) into money.
///
/// # Errors
///
/// Returns [`MoneyParseError::Amount`] if the amount has more precision than the currency's minor
/// unit or does not fit in an `i64`.
pub fn money_from_decimal(
    amount: Decimal,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, MoneyParseError> {
    let scaled = amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or_else(|| MoneyParseError::Amount(amount.to_string()))?;

    if scaled.fract() != Decimal::ZERO {
        return Err(MoneyParseError::Amount(amount.to_string()));
    }

    let minor_units = scaled
        .to_i64()
        .ok_or_else(|| MoneyParseError::Amount(amount.to_string()))?;

    Ok(Money::from_minor(minor_units, currency))
}

/// Parse a price string (e.g. `"79.00 USD"`) into money.
///
/// # Errors
///
/// Returns an error if the string is not in the format `AMOUNT CURRENCY`, if the amount is not a
/// valid decimal, or if the currency code is not recognised.
pub fn parse_price(s: &str) -> Result<Money<'static, Currency>, MoneyParseError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(MoneyParseError::Format(s.to_string()));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| MoneyParseError::Amount(s.to_string()))?;

    let currency =
        currency_for_code(code).ok_or_else(|| MoneyParseError::UnknownCurrency(code.to_string()))?;

    money_from_decimal(amount, currency)
}
