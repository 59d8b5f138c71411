//! Command-line configuration

use clap::Parser;
use jiff::Timestamp;
use thiserror::Error;

use crate::{money::MoneyParseError, shipping::ShippingError};

pub use fixtures::FixtureConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use shipping::ShippingConfig;

mod fixtures;
mod logging;
mod shipping;

/// Errors raised while turning configuration into runtime values.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configured amount cannot be expressed in the fixture currency.
    #[error("invalid amount: {0}")]
    Amount(#[from] MoneyParseError),

    /// The shipping settings do not form a valid policy.
    #[error("invalid shipping settings: {0}")]
    Shipping(#[from] ShippingError),
}

/// Pairwise pricing CLI configuration
#[derive(Debug, Parser)]
#[command(name = "pairwise", about = "Price a storefront cart", long_about = None)]
pub struct PricingConfig {
    /// Fixture settings.
    #[command(flatten)]
    pub fixtures: FixtureConfig,

    /// Shipping settings.
    #[command(flatten)]
    pub shipping: ShippingConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Price the cart as of this instant (RFC 3339); defaults to now
    #[arg(long, env = "PAIRWISE_AT")]
    pub at: Option<Timestamp>,

    /// Print the order snapshot as JSON instead of a receipt
    #[arg(long, env = "PAIRWISE_JSON", default_value_t = false)]
    pub json: bool,
}

impl PricingConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Instant to price the cart at.
    #[must_use]
    pub fn now(&self) -> Timestamp {
        self.at.unwrap_or_else(Timestamp::now)
    }
}
