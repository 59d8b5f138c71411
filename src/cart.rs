//! Cart
//!
//! Prices cart lines and aggregates them into a subtotal, savings, shipping and a total. A single
//! failing line fails the whole cart; there are no best-effort totals.

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    campaigns::CampaignLookup,
    colors::Color,
    money::ensure_same_currency,
    pairs::{LineSplit, compute_line_total},
    pricing::{PriceSource, PricingError, ResolvedPrice, minus, plus, resolve_unit_price, times},
    products::{Category, Product},
    shipping::ShippingPolicy,
};

/// Errors related to cart construction or editing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// A line's currency differs from the cart currency (index, line currency, cart currency).
    #[error("Line {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// Quantities start at one.
    #[error("invalid quantity {0}; quantities start at 1")]
    InvalidQuantity(u32),

    /// Merging a line pushed its quantity past `u32::MAX`.
    #[error("quantity overflowed")]
    QuantityOverflow,

    /// A line was not found in the cart.
    #[error("Line {0} not found")]
    LineNotFound(usize),
}

/// One product and colour in a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine<'a> {
    /// Product being bought
    pub product: Product<'a>,

    /// Chosen colour, if the product comes in more than one
    pub color: Option<Color>,

    /// Number of units
    pub quantity: u32,
}

impl<'a> CartLine<'a> {
    /// Create a line.
    pub fn new(product: Product<'a>, color: Option<Color>, quantity: u32) -> Self {
        Self {
            product,
            color,
            quantity,
        }
    }

    /// Whether this line holds the same product in the same colour.
    fn matches(&self, product: &Product<'_>, color: Option<&Color>) -> bool {
        self.product.sku == product.sku
            && self.color.as_ref().map(Color::key) == color.map(Color::key)
    }
}

/// A priced cart line.
#[derive(Debug, Clone, PartialEq)]
pub struct LinePricing<'a> {
    product_name: String,
    sku: String,
    color: Option<Color>,
    category: Category,
    resolved: ResolvedPrice<'a>,
    split: LineSplit<'a>,
    line_savings: Money<'a, Currency>,
}

impl<'a> LinePricing<'a> {
    /// Product name
    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    /// Product SKU
    pub fn sku(&self) -> &str {
        &self.sku
    }

    /// Chosen colour
    pub fn color(&self) -> Option<&Color> {
        self.color.as_ref()
    }

    /// Product category
    pub fn category(&self) -> Category {
        self.category
    }

    /// Number of units
    pub fn quantity(&self) -> u32 {
        self.split.quantity()
    }

    /// Price of one unit as resolved
    pub fn unit_price(&self) -> Money<'a, Currency> {
        self.resolved.unit_price()
    }

    /// Regular price of one unit
    pub fn base_price(&self) -> Money<'a, Currency> {
        self.resolved.base_price()
    }

    /// Which pricing source won
    pub fn source(&self) -> PriceSource {
        self.resolved.source()
    }

    /// Name of the campaign that priced the line
    pub fn offer_name(&self) -> Option<&str> {
        self.resolved.offer_name()
    }

    /// Pair price, only when a pair was sold at it
    pub fn pair_price(&self) -> Option<Money<'a, Currency>> {
        self.split.pair_price()
    }

    /// Units covered by the pair price
    pub fn units_at_pair_rate(&self) -> u32 {
        self.split.units_at_pair_rate()
    }

    /// Units sold at the unit price
    pub fn units_at_single_rate(&self) -> u32 {
        self.split.units_at_single_rate()
    }

    /// Total for the line
    pub fn line_total(&self) -> Money<'a, Currency> {
        self.split.line_total()
    }

    /// Base price times quantity minus the line total
    pub fn line_savings(&self) -> Money<'a, Currency> {
        self.line_savings
    }

    /// The underlying pair split
    pub fn split(&self) -> &LineSplit<'a> {
        &self.split
    }
}

/// Price one cart line.
///
/// # Errors
///
/// Returns any [`PricingError`] from resolving the unit price or splitting the line, and
/// [`PricingError::PricingInvariantViolation`] if the line would cost more than its undiscounted
/// price.
pub fn price_line<'a, L>(
    line: &CartLine<'a>,
    campaigns: &L,
    now: Timestamp,
) -> Result<LinePricing<'a>, PricingError>
where
    L: CampaignLookup<'a> + ?Sized,
{
    let resolved = resolve_unit_price(&line.product, campaigns, now)?;

    let split = compute_line_total(
        resolved.unit_price(),
        line.product.category,
        line.quantity,
        resolved.pair_price(),
    )
    .map_err(|err| err.for_sku(&line.product.sku))?;

    let undiscounted = times(resolved.base_price(), line.quantity)?;
    let line_savings = minus(undiscounted, split.line_total())?;

    if line_savings.to_minor_units() < 0 {
        return Err(PricingError::PricingInvariantViolation {
            sku: line.product.sku.clone(),
            price: split.line_total().to_string(),
            base_price: undiscounted.to_string(),
        });
    }

    debug!(
        sku = %line.product.sku,
        quantity = line.quantity,
        line_total = %split.line_total(),
        pair_units = split.units_at_pair_rate(),
        "priced cart line"
    );

    Ok(LinePricing {
        product_name: line.product.name.clone(),
        sku: line.product.sku.clone(),
        color: line.color.clone(),
        category: line.product.category,
        resolved,
        split,
        line_savings,
    })
}

/// Totals for a priced cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartTotals<'a> {
    lines: Vec<LinePricing<'a>>,
    subtotal: Money<'a, Currency>,
    total_savings: Money<'a, Currency>,
    shipping: Money<'a, Currency>,
    total: Money<'a, Currency>,
    currency: &'static Currency,
}

impl<'a> CartTotals<'a> {
    /// Priced lines, in cart order
    pub fn lines(&self) -> &[LinePricing<'a>] {
        &self.lines
    }

    /// Sum of line totals
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Sum of line savings
    pub fn total_savings(&self) -> Money<'a, Currency> {
        self.total_savings
    }

    /// Shipping charge
    pub fn shipping(&self) -> Money<'a, Currency> {
        self.shipping
    }

    /// Subtotal plus shipping
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Currency for every amount
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// What the lines would have cost at base price.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the sum does not fit in minor units.
    pub fn undiscounted_subtotal(&self) -> Result<Money<'a, Currency>, PricingError> {
        plus(self.subtotal, self.total_savings)
    }

    /// Savings as a fraction of the undiscounted subtotal.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the undiscounted subtotal does not fit in minor units.
    pub fn savings_percent(&self) -> Result<Percentage, PricingError> {
        let undiscounted_minor = self.undiscounted_subtotal()?.to_minor_units();

        if undiscounted_minor == 0 {
            return Ok(Percentage::from(0.0));
        }

        let savings_dec =
            Decimal::from_i64(self.total_savings.to_minor_units()).unwrap_or(Decimal::ZERO);
        let undiscounted_dec = Decimal::from_i64(undiscounted_minor).unwrap_or(Decimal::ZERO);

        Ok(Percentage::from(savings_dec / undiscounted_dec))
    }
}

/// Price every line and aggregate the cart.
///
/// # Errors
///
/// Returns the first [`PricingError`] raised by any line, [`PricingError::Money`] if a line is not
/// priced in `currency`, or [`PricingError::Overflow`] if a sum does not fit in minor units.
#[tracing::instrument(
    name = "cart.aggregate",
    skip_all,
    fields(lines = lines.len(), currency = currency.iso_alpha_code)
)]
pub fn aggregate_cart<'a, L>(
    lines: &[CartLine<'a>],
    campaigns: &L,
    now: Timestamp,
    shipping: &ShippingPolicy<'a>,
    currency: &'static Currency,
) -> Result<CartTotals<'a>, PricingError>
where
    L: CampaignLookup<'a> + ?Sized,
{
    let zero = Money::from_minor(0, currency);

    let mut priced = Vec::with_capacity(lines.len());
    let mut subtotal = zero;
    let mut total_savings = zero;

    for line in lines {
        let pricing = price_line(line, campaigns, now)?;

        ensure_same_currency(&zero, &pricing.line_total())?;

        subtotal = plus(subtotal, pricing.line_total())?;
        total_savings = plus(total_savings, pricing.line_savings())?;

        priced.push(pricing);
    }

    let shipping = shipping.shipping_for(subtotal)?;
    let total = plus(subtotal, shipping)?;

    info!(%subtotal, %total_savings, %shipping, %total, "priced cart");

    Ok(CartTotals {
        lines: priced,
        subtotal,
        total_savings,
        shipping,
        total,
        currency,
    })
}

/// Cart
#[derive(Debug, Clone)]
pub struct Cart<'a> {
    lines: Vec<CartLine<'a>>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create an empty cart.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: Vec::new(),
            currency,
        }
    }

    /// Create a cart with the given lines.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError::CurrencyMismatch`] if a line is priced in another currency.
    pub fn with_lines(
        lines: impl Into<Vec<CartLine<'a>>>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let lines = lines.into();

        lines.iter().enumerate().try_for_each(|(i, line)| {
            let line_currency = line.product.currency();

            if line_currency == currency {
                Ok(())
            } else {
                Err(CartError::CurrencyMismatch(
                    i,
                    line_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ))
            }
        })?;

        Ok(Cart { lines, currency })
    }

    /// Add units of a product, merging with an existing line for the same product and colour.
    ///
    /// Returns the index of the line that now holds the units.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if `quantity` is zero, the product is priced in another currency or
    /// the merged quantity overflows.
    pub fn add(
        &mut self,
        product: Product<'a>,
        color: Option<Color>,
        quantity: u32,
    ) -> Result<usize, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        let product_currency = product.currency();

        if product_currency != self.currency {
            return Err(CartError::CurrencyMismatch(
                self.lines.len(),
                product_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        if let Some(index) = self
            .lines
            .iter()
            .position(|line| line.matches(&product, color.as_ref()))
        {
            let line = self
                .lines
                .get_mut(index)
                .ok_or(CartError::LineNotFound(index))?;

            line.quantity = line
                .quantity
                .checked_add(quantity)
                .ok_or(CartError::QuantityOverflow)?;

            return Ok(index);
        }

        self.lines.push(CartLine::new(product, color, quantity));

        Ok(self.lines.len() - 1)
    }

    /// Replace a line's quantity.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if `quantity` is zero or the line does not exist.
    pub fn set_quantity(&mut self, index: usize, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        let line = self
            .lines
            .get_mut(index)
            .ok_or(CartError::LineNotFound(index))?;

        line.quantity = quantity;

        Ok(())
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if the line does not exist.
    pub fn remove(&mut self, index: usize) -> Result<CartLine<'a>, CartError> {
        if index >= self.lines.len() {
            return Err(CartError::LineNotFound(index));
        }

        Ok(self.lines.remove(index))
    }

    /// Get a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError::LineNotFound`] if the line is not found.
    pub fn get_line(&self, index: usize) -> Result<&CartLine<'a>, CartError> {
        self.lines.get(index).ok_or(CartError::LineNotFound(index))
    }

    /// Iterate over the lines in the cart.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine<'a>> {
        self.lines.iter()
    }

    /// All lines, in the order they were added.
    pub fn lines(&self) -> &[CartLine<'a>] {
        &self.lines
    }

    /// Get the number of lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Price the cart.
    ///
    /// # Errors
    ///
    /// See [`aggregate_cart`].
    pub fn price<L>(
        &self,
        campaigns: &L,
        now: Timestamp,
        shipping: &ShippingPolicy<'a>,
    ) -> Result<CartTotals<'a>, PricingError>
    where
        L: CampaignLookup<'a> + ?Sized,
    {
        aggregate_cart(&self.lines, campaigns, now, shipping, self.currency)
    }
}
