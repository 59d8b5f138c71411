//! Pricing
//!
//! Resolves the single unit price in effect for a product. A live campaign price beats a standing
//! discount, which beats the base price. Sources never stack.

use jiff::Timestamp;
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;
use tracing::debug;

use crate::{
    campaigns::{CampaignLookup, LookupError},
    money::ensure_same_currency,
    products::Product,
};

/// Errors that abort a price computation.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// Product pricing facts are unusable.
    #[error("invalid product data for {sku}: {reason}")]
    InvalidProductData {
        /// Offending product
        sku: String,
        /// What is wrong with it
        reason: &'static str,
    },

    /// Quantities start at one.
    #[error("invalid quantity {0}; quantities start at 1")]
    InvalidQuantity(u32),

    /// A resolved amount fell outside the range the product allows.
    #[error("price {price} for {sku} is outside its bound {base_price}")]
    PricingInvariantViolation {
        /// Offending product, empty when the caller did not name one
        sku: String,
        /// Resolved amount
        price: String,
        /// Bound the amount broke
        base_price: String,
    },

    /// The campaign store could not be read.
    #[error(transparent)]
    LookupUnavailable(#[from] LookupError),

    /// Minor-unit arithmetic overflowed.
    #[error("price arithmetic overflowed")]
    Overflow,

    /// Amounts in different currencies were combined.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

impl PricingError {
    /// Name the product an unattributed invariant violation belongs to.
    #[must_use]
    pub fn for_sku(self, product_sku: &str) -> Self {
        match self {
            Self::PricingInvariantViolation {
                sku,
                price,
                base_price,
            } if sku.is_empty() => Self::PricingInvariantViolation {
                sku: product_sku.to_string(),
                price,
                base_price,
            },
            other => other,
        }
    }
}

/// Where a resolved unit price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    /// An active campaign's price for the product's category
    Campaign,

    /// The product's standing discount
    StandingDiscount,

    /// The regular price
    Base,
}

/// The unit price in effect for a product at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPrice<'a> {
    unit_price: Money<'a, Currency>,
    base_price: Money<'a, Currency>,
    source: PriceSource,
    pair_price: Option<Money<'a, Currency>>,
    offer_name: Option<String>,
}

impl<'a> ResolvedPrice<'a> {
    /// Price of one unit
    pub fn unit_price(&self) -> Money<'a, Currency> {
        self.unit_price
    }

    /// Regular price of one unit
    pub fn base_price(&self) -> Money<'a, Currency> {
        self.base_price
    }

    /// Which source won
    pub fn source(&self) -> PriceSource {
        self.source
    }

    /// Fixed price for a pair of units, only ever set by a winning campaign.
    pub fn pair_price(&self) -> Option<Money<'a, Currency>> {
        self.pair_price
    }

    /// Name of the winning campaign
    pub fn offer_name(&self) -> Option<&str> {
        self.offer_name.as_deref()
    }
}

/// Resolve the unit price in effect for `product` at `now`.
///
/// # Errors
///
/// - [`PricingError::InvalidProductData`]: the base price is not positive, or the standing discount
///   is negative or not below the base price.
/// - [`PricingError::LookupUnavailable`]: the campaign store failed.
/// - [`PricingError::PricingInvariantViolation`]: the winning price is negative or above the base
///   price.
/// - [`PricingError::Money`]: campaign or discount amounts are in another currency.
#[tracing::instrument(
    name = "pricing.resolve_unit_price",
    skip_all,
    fields(sku = %product.sku, category = %product.category, source = tracing::field::Empty)
)]
pub fn resolve_unit_price<'a, L>(
    product: &Product<'a>,
    campaigns: &L,
    now: Timestamp,
) -> Result<ResolvedPrice<'a>, PricingError>
where
    L: CampaignLookup<'a> + ?Sized,
{
    let standing_discount = validate_product(product)?;

    let mut resolved = ResolvedPrice {
        unit_price: product.base_price,
        base_price: product.base_price,
        source: PriceSource::Base,
        pair_price: None,
        offer_name: None,
    };

    let campaign = if product.category.is_promotion_eligible() {
        campaigns.category_promotion(product.category, now)?
    } else {
        None
    };

    let offer = campaign.as_ref().and_then(|campaign| {
        campaign
            .offer_for(product.category)
            .filter(|_| campaign.is_active_at(now))
            .map(|offer| (campaign.offer_name(), offer))
    });

    if let Some((offer_name, offer)) = offer {
        resolved.unit_price = offer.discounted_price();
        resolved.pair_price = offer.price_for_two();
        resolved.source = PriceSource::Campaign;
        resolved.offer_name = Some(offer_name.to_string());
    } else if let Some(discounted_price) = standing_discount {
        resolved.unit_price = discounted_price;
        resolved.source = PriceSource::StandingDiscount;
    }

    ensure_within_base(product, resolved.unit_price)?;

    if let Some(pair_price) = resolved.pair_price {
        ensure_same_currency(&product.base_price, &pair_price)?;
    }

    tracing::Span::current().record("source", tracing::field::debug(resolved.source));
    debug!(unit_price = %resolved.unit_price, "resolved unit price");

    Ok(resolved)
}

/// Check the product's own pricing facts, returning the standing discount if one applies.
fn validate_product<'a>(
    product: &Product<'a>,
) -> Result<Option<Money<'a, Currency>>, PricingError> {
    let base = product.base_price.to_minor_units();

    if base <= 0 {
        return Err(invalid_product(product, "base price must be positive"));
    }

    let Some(discounted_price) = product.discounted_price else {
        return Ok(None);
    };

    ensure_same_currency(&product.base_price, &discounted_price)?;

    match discounted_price.to_minor_units() {
        0 => Ok(None),
        discount if discount < 0 => Err(invalid_product(product, "discount must not be negative")),
        discount if discount >= base => Err(invalid_product(
            product,
            "discount must be below the base price",
        )),
        _ => Ok(Some(discounted_price)),
    }
}

fn ensure_within_base(
    product: &Product<'_>,
    price: Money<'_, Currency>,
) -> Result<(), PricingError> {
    ensure_same_currency(&product.base_price, &price)?;

    let minor = price.to_minor_units();

    if minor < 0 || minor > product.base_price.to_minor_units() {
        return Err(PricingError::PricingInvariantViolation {
            sku: product.sku.clone(),
            price: price.to_string(),
            base_price: product.base_price.to_string(),
        });
    }

    Ok(())
}

fn invalid_product(product: &Product<'_>, reason: &'static str) -> PricingError {
    PricingError::InvalidProductData {
        sku: product.sku.clone(),
        reason,
    }
}

/// Multiply a unit amount by a quantity.
pub(crate) fn times<'a>(
    amount: Money<'a, Currency>,
    quantity: u32,
) -> Result<Money<'a, Currency>, PricingError> {
    let minor = amount
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .ok_or(PricingError::Overflow)?;

    Ok(Money::from_minor(minor, amount.currency()))
}

/// Add two amounts of the same currency.
pub(crate) fn plus<'a>(
    left: Money<'a, Currency>,
    right: Money<'a, Currency>,
) -> Result<Money<'a, Currency>, PricingError> {
    ensure_same_currency(&left, &right)?;

    let minor = left
        .to_minor_units()
        .checked_add(right.to_minor_units())
        .ok_or(PricingError::Overflow)?;

    Ok(Money::from_minor(minor, left.currency()))
}

/// Subtract `right` from `left`; both must share a currency.
pub(crate) fn minus<'a>(
    left: Money<'a, Currency>,
    right: Money<'a, Currency>,
) -> Result<Money<'a, Currency>, PricingError> {
    ensure_same_currency(&left, &right)?;

    let minor = left
        .to_minor_units()
        .checked_sub(right.to_minor_units())
        .ok_or(PricingError::Overflow)?;

    Ok(Money::from_minor(minor, left.currency()))
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use crate::{
        campaigns::{Campaign, CampaignBook, CategoryOffer, NoCampaigns},
        products::{Category, ProductType},
    };

    use super::*;

    fn usd(minor: i64) -> Money<'static, Currency> {
        Money::from_minor(minor, USD)
    }

    fn at(s: &str) -> anyhow::Result<Timestamp> {
        Ok(s.parse()?)
    }

    fn frames(category: Category) -> Product<'static> {
        Product::new(
            "Round Metal",
            "SG-RM-001",
            usd(10_000),
            category,
            ProductType::Sunglasses,
        )
    }

    fn summer(signature_price: i64) -> anyhow::Result<CampaignBook<'static>> {
        let campaign = Campaign::new(
            "Summer Pairs",
            at("2026-06-01T00:00:00Z")?,
            at("2026-08-31T23:59:59Z")?,
        )?
        .with_offer(
            Category::Signature,
            CategoryOffer::new(usd(10_000), usd(signature_price), Some(usd(14_000)))?,
        )?;

        Ok([campaign].into_iter().collect())
    }

    struct BrokenStore;

    impl<'a> CampaignLookup<'a> for BrokenStore {
        fn category_promotion(
            &self,
            _category: Category,
            _now: Timestamp,
        ) -> Result<Option<Campaign<'a>>, LookupError> {
            Err(LookupError::Unavailable("connection reset".to_string()))
        }
    }

    #[test]
    fn standing_discount_applies_without_campaign() -> TestResult {
        let product = frames(Category::Signature).with_discounted_price(usd(8_000));

        let resolved = resolve_unit_price(&product, &NoCampaigns, at("2026-07-01T00:00:00Z")?)?;

        assert_eq!(resolved.unit_price(), usd(8_000));
        assert_eq!(resolved.source(), PriceSource::StandingDiscount);
        assert_eq!(resolved.pair_price(), None);

        Ok(())
    }

    #[test]
    fn base_price_applies_without_campaign_or_discount() -> TestResult {
        let resolved = resolve_unit_price(
            &frames(Category::Essentials),
            &NoCampaigns,
            at("2026-07-01T00:00:00Z")?,
        )?;

        assert_eq!(resolved.unit_price(), usd(10_000));
        assert_eq!(resolved.source(), PriceSource::Base);

        Ok(())
    }

    #[test]
    fn campaign_price_wins_over_standing_discount_without_stacking() -> TestResult {
        let product = frames(Category::Signature).with_discounted_price(usd(8_000));

        let resolved =
            resolve_unit_price(&product, &summer(7_900)?, at("2026-07-01T00:00:00Z")?)?;

        assert_eq!(resolved.unit_price(), usd(7_900));
        assert_eq!(resolved.source(), PriceSource::Campaign);
        assert_eq!(resolved.pair_price(), Some(usd(14_000)));
        assert_eq!(resolved.offer_name(), Some("Summer Pairs"));

        Ok(())
    }

    #[test]
    fn campaign_wins_even_when_dearer_than_standing_discount() -> TestResult {
        let product = frames(Category::Signature).with_discounted_price(usd(7_000));

        let resolved =
            resolve_unit_price(&product, &summer(7_900)?, at("2026-07-01T00:00:00Z")?)?;

        assert_eq!(resolved.unit_price(), usd(7_900));

        Ok(())
    }

    #[test]
    fn expired_campaign_falls_through_to_discount() -> TestResult {
        let product = frames(Category::Signature).with_discounted_price(usd(8_000));

        let resolved =
            resolve_unit_price(&product, &summer(7_900)?, at("2026-09-01T00:00:00Z")?)?;

        assert_eq!(resolved.unit_price(), usd(8_000));
        assert_eq!(resolved.pair_price(), None);

        Ok(())
    }

    #[test]
    fn expired_campaign_falls_through_to_base() -> TestResult {
        let resolved = resolve_unit_price(
            &frames(Category::Signature),
            &summer(7_900)?,
            at("2026-09-01T00:00:00Z")?,
        )?;

        assert_eq!(resolved.unit_price(), usd(10_000));
        assert_eq!(resolved.source(), PriceSource::Base);

        Ok(())
    }

    #[test]
    fn ineligible_category_ignores_campaigns_and_store_failures() -> TestResult {
        let resolved = resolve_unit_price(
            &frames(Category::None),
            &BrokenStore,
            at("2026-07-01T00:00:00Z")?,
        )?;

        assert_eq!(resolved.unit_price(), usd(10_000));

        Ok(())
    }

    #[test]
    fn lookup_failure_is_propagated() -> TestResult {
        let product = frames(Category::Signature).with_discounted_price(usd(8_000));

        let result = resolve_unit_price(&product, &BrokenStore, at("2026-07-01T00:00:00Z")?);

        assert_eq!(
            result,
            Err(PricingError::LookupUnavailable(LookupError::Unavailable(
                "connection reset".to_string()
            )))
        );

        Ok(())
    }

    #[test]
    fn non_positive_base_price_is_invalid() -> TestResult {
        let mut product = frames(Category::Signature);
        product.base_price = usd(0);

        let result = resolve_unit_price(&product, &NoCampaigns, at("2026-07-01T00:00:00Z")?);

        assert!(matches!(
            result,
            Err(PricingError::InvalidProductData { .. })
        ));

        Ok(())
    }

    #[test]
    fn discount_at_or_above_base_is_invalid() -> TestResult {
        let product = frames(Category::Signature).with_discounted_price(usd(10_000));

        let result = resolve_unit_price(&product, &NoCampaigns, at("2026-07-01T00:00:00Z")?);

        assert!(matches!(
            result,
            Err(PricingError::InvalidProductData { .. })
        ));

        Ok(())
    }

    #[test]
    fn zero_discount_is_treated_as_absent() -> TestResult {
        let product = frames(Category::Signature).with_discounted_price(usd(0));

        let resolved = resolve_unit_price(&product, &NoCampaigns, at("2026-07-01T00:00:00Z")?)?;

        assert_eq!(resolved.unit_price(), usd(10_000));
        assert_eq!(resolved.source(), PriceSource::Base);

        Ok(())
    }

    #[test]
    fn campaign_price_above_base_violates_invariant() -> TestResult {
        let mut product = frames(Category::Signature);
        product.base_price = usd(7_500);

        let result = resolve_unit_price(&product, &summer(7_900)?, at("2026-07-01T00:00:00Z")?);

        assert!(matches!(
            result,
            Err(PricingError::PricingInvariantViolation { .. })
        ));

        Ok(())
    }

    #[test]
    fn campaign_in_another_currency_is_rejected() -> TestResult {
        let mut product = frames(Category::Signature);
        product.base_price = Money::from_minor(10_000, GBP);

        let result = resolve_unit_price(&product, &summer(7_900)?, at("2026-07-01T00:00:00Z")?);

        assert!(matches!(result, Err(PricingError::Money(_))));

        Ok(())
    }

    #[test]
    fn arithmetic_helpers_check_overflow_and_currency() -> TestResult {
        assert_eq!(times(usd(7_900), 3)?, usd(23_700));
        assert_eq!(plus(usd(100), usd(250))?, usd(350));
        assert_eq!(minus(usd(100), usd(250))?, usd(-150));
        assert_eq!(times(usd(i64::MAX), 2), Err(PricingError::Overflow));
        assert!(matches!(
            plus(usd(100), Money::from_minor(100, GBP)),
            Err(PricingError::Money(_))
        ));

        Ok(())
    }
}
