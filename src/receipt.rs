//! Receipt
//!
//! Plain-text receipts for placed orders. Every amount is re-derived from the frozen order lines.

use std::io;

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;

use crate::{
    orders::{OrderSnapshot, SnapshotError},
    pricing::{PricingError, minus, plus, times},
};

/// Errors that can occur when building or writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// The order snapshot is inconsistent.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// Re-deriving a line failed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// One receipt row.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine {
    /// Product name
    pub item: String,

    /// Colour display name
    pub color: Option<String>,

    /// Units sold
    pub quantity: u32,

    /// Single-unit price charged
    pub unit_price: Money<'static, Currency>,

    /// Pair offer note, e.g. `2 for $140.00 + 1 at $79.00`
    pub offer: Option<String>,

    /// Amount charged for the line
    pub line_total: Money<'static, Currency>,
}

/// Receipt for a placed order.
#[derive(Debug, Clone)]
pub struct Receipt {
    lines: Vec<ReceiptLine>,
    subtotal: Money<'static, Currency>,
    savings: Money<'static, Currency>,
    shipping: Money<'static, Currency>,
    total: Money<'static, Currency>,
}

impl Receipt {
    /// Build a receipt from a frozen order.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if the snapshot fails verification or a line cannot be
    /// re-derived.
    pub fn from_snapshot(snapshot: &OrderSnapshot) -> Result<Self, ReceiptError> {
        snapshot.verify()?;

        let currency = snapshot.currency()?;
        let zero = Money::from_minor(0, currency);

        let mut lines = Vec::with_capacity(snapshot.lines.len());
        let mut subtotal = zero;
        let mut savings = zero;

        for line in &snapshot.lines {
            let split = line.rederive(currency)?;
            let original_price = Money::from_minor(line.original_price, currency);
            let undiscounted = times(original_price, line.quantity)?;

            subtotal = plus(subtotal, split.line_total())?;
            savings = plus(savings, minus(undiscounted, split.line_total())?)?;

            lines.push(ReceiptLine {
                item: line.product_name.clone(),
                color: line.color.clone(),
                quantity: line.quantity,
                unit_price: split.unit_price(),
                offer: line.promotion_note(currency)?,
                line_total: split.line_total(),
            });
        }

        let shipping = snapshot.money(snapshot.shipping)?;
        let total = plus(subtotal, shipping)?;

        Ok(Self {
            lines,
            subtotal,
            savings,
            shipping,
            total,
        })
    }

    /// Receipt rows, in order
    pub fn lines(&self) -> &[ReceiptLine] {
        &self.lines
    }

    /// Sum of line totals
    pub fn subtotal(&self) -> Money<'static, Currency> {
        self.subtotal
    }

    /// Amount saved against regular prices
    pub fn savings(&self) -> Money<'static, Currency> {
        self.savings
    }

    /// Shipping charged
    pub fn shipping(&self) -> Money<'static, Currency> {
        self.shipping
    }

    /// Amount charged
    pub fn total(&self) -> Money<'static, Currency> {
        self.total
    }

    /// Savings relative to what the lines would have cost at regular prices.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the undiscounted subtotal does not fit in minor units.
    pub fn savings_percent(&self) -> Result<Percentage, PricingError> {
        let undiscounted_minor = plus(self.subtotal, self.savings)?.to_minor_units();

        if undiscounted_minor == 0 {
            return Ok(Percentage::from(0.0));
        }

        let savings_dec = Decimal::from_i64(self.savings.to_minor_units()).unwrap_or(Decimal::ZERO);
        let undiscounted_dec = Decimal::from_i64(undiscounted_minor).unwrap_or(Decimal::ZERO);

        Ok(Percentage::from(savings_dec / undiscounted_dec))
    }

    /// Write the receipt as a table followed by the order summary.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::IO`] if writing fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["Item", "Colour", "Qty", "Unit Price", "Offer", "Line Total"]);

        for line in &self.lines {
            builder.push_record([
                line.item.clone(),
                line.color.clone().unwrap_or_default(),
                line.quantity.to_string(),
                line.unit_price.to_string(),
                line.offer.clone().unwrap_or_default(),
                line.line_total.to_string(),
            ]);
        }

        let mut table = builder.build();
        table.with(Style::modern_rounded());
        table.modify(Columns::new(2..4), Alignment::right());
        table.modify(Columns::new(5..6), Alignment::right());

        writeln!(out, "\n{table}").map_err(|_err| ReceiptError::IO)?;

        let percent_points = percent_points(self.savings_percent()?);

        let summary = [
            ("Subtotal:", self.subtotal.to_string()),
            ("Savings:", format!("({percent_points:.2}%) {}", self.savings)),
            ("Shipping:", self.shipping.to_string()),
            ("Total:", self.total.to_string()),
        ];

        let value_width = summary
            .iter()
            .map(|(_, value)| value.len())
            .max()
            .unwrap_or_default();

        for (label, value) in summary {
            writeln!(out, " {label:>9}  {value:>value_width$}").map_err(|_err| ReceiptError::IO)?;
        }

        writeln!(out).map_err(|_err| ReceiptError::IO)
    }
}

/// Fractional percentage (0.25) as percent points (25.00).
fn percent_points(percentage: Percentage) -> Decimal {
    ((percentage * Decimal::ONE) * Decimal::ONE_HUNDRED).round_dp(2)
}
