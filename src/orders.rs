//! Order Snapshots
//!
//! A placed order freezes the prices each line was sold at. Anything shown after the fact
//! (invoices, receipts, refunds) re-derives from these frozen amounts and never consults live
//! campaigns.

use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::{
    cart::{CartTotals, LinePricing},
    money::currency_for_code,
    pairs::{LineSplit, compute_line_total},
    pricing::PricingError,
    products::Category,
};

/// Errors raised while checking or (de)serialising an order snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The snapshot names a currency this crate does not know.
    #[error("unknown currency code {0}")]
    UnknownCurrency(String),

    /// A stored line total disagrees with the one derived from the frozen prices.
    #[error("line {sku}: stored total {stored} but frozen prices give {derived}")]
    LineTotalMismatch {
        /// Offending line
        sku: String,
        /// Stored total, in minor units
        stored: i64,
        /// Derived total, in minor units
        derived: i64,
    },

    /// A stored order amount disagrees with the one derived from its lines.
    #[error("order {field}: stored {stored} but lines give {derived}")]
    TotalMismatch {
        /// Which amount
        field: &'static str,
        /// Stored amount, in minor units
        stored: i64,
        /// Derived amount, in minor units
        derived: i64,
    },

    /// Re-deriving a line failed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The snapshot could not be (de)serialised.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// One frozen order line. Amounts are in minor units of the order currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineSnapshot {
    /// Product name at the time of sale
    pub product_name: String,

    /// Product SKU
    pub sku: String,

    /// Colour display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Category at the time of sale
    pub category: Category,

    /// Regular unit price
    pub original_price: i64,

    /// Unit price actually charged
    pub price: i64,

    /// Pair price, when a pair was sold at it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pair_price: Option<i64>,

    /// Units sold
    pub quantity: u32,

    /// Amount charged for the line
    pub line_total: i64,
}

impl OrderLineSnapshot {
    fn freeze(line: &LinePricing<'_>) -> Self {
        Self {
            product_name: line.product_name().to_string(),
            sku: line.sku().to_string(),
            color: line.color().map(|color| color.display_name().to_string()),
            category: line.category(),
            original_price: line.base_price().to_minor_units(),
            price: line.unit_price().to_minor_units(),
            pair_price: line.pair_price().map(|price| price.to_minor_units()),
            quantity: line.quantity(),
            line_total: line.line_total().to_minor_units(),
        }
    }

    /// Split the frozen line again from its frozen prices.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::PricingInvariantViolation`] if the frozen price is negative, above
    /// the regular price, or paired with a pair price below it, and other [`PricingError`]s if
    /// the frozen quantity is zero or the total overflows.
    pub fn rederive(
        &self,
        currency: &'static Currency,
    ) -> Result<LineSplit<'static>, PricingError> {
        let price = Money::from_minor(self.price, currency);

        if self.price > self.original_price {
            return Err(PricingError::PricingInvariantViolation {
                sku: self.sku.clone(),
                price: price.to_string(),
                base_price: Money::from_minor(self.original_price, currency).to_string(),
            });
        }

        compute_line_total(
            price,
            self.category,
            self.quantity,
            self.pair_price.map(|pair| Money::from_minor(pair, currency)),
        )
        .map_err(|err| err.for_sku(&self.sku))
    }

    /// Regular price times quantity, less the line total.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the amounts do not fit in minor units.
    pub fn savings(&self) -> Result<i64, PricingError> {
        self.original_price
            .checked_mul(i64::from(self.quantity))
            .and_then(|undiscounted| undiscounted.checked_sub(self.line_total))
            .ok_or(PricingError::Overflow)
    }

    /// Invoice note describing the pair offer, e.g. `2 for $140.00 + 1 at $79.00`.
    ///
    /// Lines that did not sell a pair have no note.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the line cannot be re-derived.
    pub fn promotion_note(
        &self,
        currency: &'static Currency,
    ) -> Result<Option<String>, PricingError> {
        let split = self.rederive(currency)?;

        let Some(pair_price) = split.pair_price() else {
            return Ok(None);
        };

        let mut note = format!("{} for {pair_price}", split.units_at_pair_rate());

        if split.units_at_single_rate() > 0 {
            note.push_str(&format!(
                " + {} at {}",
                split.units_at_single_rate(),
                split.unit_price()
            ));
        }

        Ok(Some(note))
    }
}

/// A frozen, placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSnapshot {
    /// When the order was placed
    pub placed_at: Timestamp,

    /// ISO 4217 code shared by every amount
    pub currency: String,

    /// Frozen lines, in cart order
    pub lines: Vec<OrderLineSnapshot>,

    /// Sum of line totals
    pub subtotal: i64,

    /// Sum of line savings
    pub total_savings: i64,

    /// Shipping charged
    pub shipping: i64,

    /// Amount charged
    pub total: i64,
}

impl OrderSnapshot {
    /// Freeze priced cart totals into an order.
    pub fn freeze(totals: &CartTotals<'_>, placed_at: Timestamp) -> Self {
        Self {
            placed_at,
            currency: totals.currency().iso_alpha_code.to_string(),
            lines: totals.lines().iter().map(OrderLineSnapshot::freeze).collect(),
            subtotal: totals.subtotal().to_minor_units(),
            total_savings: totals.total_savings().to_minor_units(),
            shipping: totals.shipping().to_minor_units(),
            total: totals.total().to_minor_units(),
        }
    }

    /// Currency every amount is in.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::UnknownCurrency`] for codes this crate does not support.
    pub fn currency(&self) -> Result<&'static Currency, SnapshotError> {
        currency_for_code(&self.currency)
            .ok_or_else(|| SnapshotError::UnknownCurrency(self.currency.clone()))
    }

    /// Amount in the order currency.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::UnknownCurrency`] for codes this crate does not support.
    pub fn money(&self, minor: i64) -> Result<Money<'static, Currency>, SnapshotError> {
        Ok(Money::from_minor(minor, self.currency()?))
    }

    /// Re-derive every line and the order totals from the frozen prices.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::LineTotalMismatch`] or [`SnapshotError::TotalMismatch`] when a
    /// stored amount disagrees with its derivation, [`SnapshotError::Pricing`] when a line's
    /// frozen prices break their bounds or it charges more than its regular price, and other
    /// [`SnapshotError`]s if derivation fails.
    pub fn verify(&self) -> Result<(), SnapshotError> {
        let currency = self.currency()?;

        let mut subtotal: i64 = 0;
        let mut total_savings: i64 = 0;

        for line in &self.lines {
            let derived = line.rederive(currency)?.line_total().to_minor_units();

            if derived != line.line_total {
                warn!(
                    sku = %line.sku,
                    stored = line.line_total,
                    derived,
                    "frozen line total mismatch"
                );

                return Err(SnapshotError::LineTotalMismatch {
                    sku: line.sku.clone(),
                    stored: line.line_total,
                    derived,
                });
            }

            let savings = line.savings()?;

            if savings < 0 {
                return Err(PricingError::PricingInvariantViolation {
                    sku: line.sku.clone(),
                    price: Money::from_minor(line.line_total, currency).to_string(),
                    base_price: Money::from_minor(line.line_total - savings, currency)
                        .to_string(),
                }
                .into());
            }

            subtotal = subtotal
                .checked_add(derived)
                .ok_or(PricingError::Overflow)?;
            total_savings = total_savings
                .checked_add(savings)
                .ok_or(PricingError::Overflow)?;
        }

        let total = subtotal
            .checked_add(self.shipping)
            .ok_or(PricingError::Overflow)?;

        for (field, stored, derived) in [
            ("subtotal", self.subtotal, subtotal),
            ("total_savings", self.total_savings, total_savings),
            ("total", self.total, total),
        ] {
            if stored != derived {
                return Err(SnapshotError::TotalMismatch {
                    field,
                    stored,
                    derived,
                });
            }
        }

        Ok(())
    }

    /// Serialise the snapshot as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Json`] if serialisation fails.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a snapshot from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Json`] if the input is not a valid snapshot.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}
