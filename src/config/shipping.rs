//! Shipping Config

use clap::Args;
use rust_decimal::Decimal;
use rusty_money::iso::Currency;

use crate::{
    config::ConfigError,
    money::money_from_decimal,
    shipping::ShippingPolicy,
};

/// Shipping settings, in major units of the fixture currency.
#[derive(Debug, Args)]
pub struct ShippingConfig {
    /// Subtotal at which shipping becomes free
    #[arg(long, env = "PAIRWISE_FREE_SHIPPING_THRESHOLD", default_value = "100.00")]
    pub free_shipping_threshold: Decimal,

    /// Flat fee charged below the threshold
    #[arg(long, env = "PAIRWISE_SHIPPING_FEE", default_value = "10.00")]
    pub shipping_fee: Decimal,
}

impl ShippingConfig {
    /// Build the shipping policy in `currency`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if an amount has sub-minor-unit precision or is negative.
    pub fn policy(
        &self,
        currency: &'static Currency,
    ) -> Result<ShippingPolicy<'static>, ConfigError> {
        Ok(ShippingPolicy::new(
            money_from_decimal(self.free_shipping_threshold, currency)?,
            money_from_decimal(self.shipping_fee, currency)?,
        )?)
    }
}
