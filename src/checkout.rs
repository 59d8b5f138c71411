//! Checkout Line Items
//!
//! Payment providers take one unit price per line item. A priced cart line that sold a pair is
//! split into a pair sub-line and a single-rate sub-line so every item carries exactly one price.

use rusty_money::{Money, iso::Currency};
use smallvec::{SmallVec, smallvec};

use crate::{
    cart::{CartTotals, LinePricing},
    pricing::{PricingError, plus, times},
};

/// What a checkout line item charges for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutItemKind {
    /// Two units sold together at the pair price
    Pair,

    /// Units sold at the single-unit price
    Single,

    /// Shipping charge
    Shipping,
}

/// One item handed to the checkout session.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutLineItem<'a> {
    /// What the item charges for
    pub kind: CheckoutItemKind,

    /// Customer-facing description
    pub description: String,

    /// Product SKU; `None` for shipping
    pub sku: Option<String>,

    /// Price of one item
    pub unit_amount: Money<'a, Currency>,

    /// Number of items
    pub quantity: u32,
}

impl<'a> CheckoutLineItem<'a> {
    /// `unit_amount * quantity`
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the amount does not fit in minor units.
    pub fn amount(&self) -> Result<Money<'a, Currency>, PricingError> {
        times(self.unit_amount, self.quantity)
    }
}

/// Split priced cart totals into checkout line items.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if an amount does not fit in minor units, or
/// [`PricingError::PricingInvariantViolation`] if the items would not add up to the cart total.
pub fn checkout_line_items<'a>(
    totals: &CartTotals<'a>,
) -> Result<Vec<CheckoutLineItem<'a>>, PricingError> {
    let mut items = Vec::with_capacity(totals.lines().len() + 1);

    for line in totals.lines() {
        items.extend(line_items(line));
    }

    if totals.shipping().to_minor_units() > 0 {
        items.push(CheckoutLineItem {
            kind: CheckoutItemKind::Shipping,
            description: "Shipping".to_string(),
            sku: None,
            unit_amount: totals.shipping(),
            quantity: 1,
        });
    }

    let charged = items
        .iter()
        .try_fold(Money::from_minor(0, totals.currency()), |sum, item| {
            plus(sum, item.amount()?)
        })?;

    if charged != totals.total() {
        return Err(PricingError::PricingInvariantViolation {
            sku: "checkout".to_string(),
            price: charged.to_string(),
            base_price: totals.total().to_string(),
        });
    }

    Ok(items)
}

fn line_items<'a>(line: &LinePricing<'a>) -> SmallVec<[CheckoutLineItem<'a>; 2]> {
    let mut items = smallvec![];
    let name = describe(line);

    if let Some(pair_price) = line.pair_price()
        && line.units_at_pair_rate() > 0
    {
        items.push(CheckoutLineItem {
            kind: CheckoutItemKind::Pair,
            description: format!("{name} (pair offer)"),
            sku: Some(line.sku().to_string()),
            unit_amount: pair_price,
            quantity: line.split().promotional_pairs(),
        });
    }

    if line.units_at_single_rate() > 0 {
        items.push(CheckoutLineItem {
            kind: CheckoutItemKind::Single,
            description: name,
            sku: Some(line.sku().to_string()),
            unit_amount: line.unit_price(),
            quantity: line.units_at_single_rate(),
        });
    }

    items
}

fn describe(line: &LinePricing<'_>) -> String {
    line.color().map_or_else(
        || line.product_name().to_string(),
        |color| format!("{} - {color}", line.product_name()),
    )
}
