//! Shipping

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{money::ensure_same_currency, pricing::PricingError};

/// Orders with a subtotal at or above this amount, in minor units, ship free.
pub const DEFAULT_FREE_SHIPPING_THRESHOLD_MINOR: i64 = 10_000;

/// Flat shipping fee, in minor units, for orders below the free-shipping threshold.
pub const DEFAULT_SHIPPING_FEE_MINOR: i64 = 1_000;

/// Errors raised while building a shipping policy.
#[derive(Debug, Error, PartialEq)]
pub enum ShippingError {
    /// Thresholds and fees cannot be negative.
    #[error("shipping amounts must not be negative")]
    NegativeAmount,

    /// Threshold and fee are in different currencies.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Flat-fee shipping with a free-shipping threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShippingPolicy<'a> {
    free_shipping_threshold: Money<'a, Currency>,
    flat_fee: Money<'a, Currency>,
}

impl<'a> ShippingPolicy<'a> {
    /// Create a policy.
    ///
    /// # Errors
    ///
    /// Returns a [`ShippingError`] if either amount is negative or they use different currencies.
    pub fn new(
        free_shipping_threshold: Money<'a, Currency>,
        flat_fee: Money<'a, Currency>,
    ) -> Result<Self, ShippingError> {
        ensure_same_currency(&free_shipping_threshold, &flat_fee)?;

        if free_shipping_threshold.to_minor_units() < 0 || flat_fee.to_minor_units() < 0 {
            return Err(ShippingError::NegativeAmount);
        }

        Ok(Self {
            free_shipping_threshold,
            flat_fee,
        })
    }

    /// The storefront's standard policy in `currency`.
    pub fn standard(currency: &'a Currency) -> Self {
        Self {
            free_shipping_threshold: Money::from_minor(
                DEFAULT_FREE_SHIPPING_THRESHOLD_MINOR,
                currency,
            ),
            flat_fee: Money::from_minor(DEFAULT_SHIPPING_FEE_MINOR, currency),
        }
    }

    /// Subtotal at which shipping becomes free
    pub fn free_shipping_threshold(&self) -> Money<'a, Currency> {
        self.free_shipping_threshold
    }

    /// Fee charged below the threshold
    pub fn flat_fee(&self) -> Money<'a, Currency> {
        self.flat_fee
    }

    /// Shipping charged on an order with the given subtotal.
    ///
    /// Nothing to ship means nothing to charge, so a zero subtotal ships free.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Money`] if the subtotal is in another currency.
    pub fn shipping_for(
        &self,
        subtotal: Money<'a, Currency>,
    ) -> Result<Money<'a, Currency>, PricingError> {
        ensure_same_currency(&self.free_shipping_threshold, &subtotal)?;

        let subtotal_minor = subtotal.to_minor_units();

        if subtotal_minor <= 0 || subtotal_minor >= self.free_shipping_threshold.to_minor_units() {
            Ok(Money::from_minor(0, subtotal.currency()))
        } else {
            Ok(self.flat_fee)
        }
    }
}
