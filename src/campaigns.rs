//! Campaigns
//!
//! Time-bounded promotional campaigns. A campaign carries an optional [`CategoryOffer`] for each
//! promotion-eligible category: a single-unit campaign price and an optional fixed price for a
//! pair of units.

use jiff::Timestamp;
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;
use tracing::trace;

use crate::{money::ensure_same_currency, products::Category};

/// Errors raised while building a campaign or one of its offers.
#[derive(Debug, Error, PartialEq)]
pub enum CampaignError {
    /// The campaign window ends before it starts.
    #[error("campaign window ends ({valid_to}) before it starts ({valid_from})")]
    InvalidWindow {
        /// Window start
        valid_from: Timestamp,
        /// Window end
        valid_to: Timestamp,
    },

    /// Offers can only be attached to promotion-eligible categories.
    #[error("category {0} is not eligible for campaign offers")]
    IneligibleCategory(Category),

    /// The campaign price is negative.
    #[error("campaign price must not be negative")]
    NegativePrice,

    /// The campaign price is above the offer's original price.
    #[error("campaign price exceeds the original price")]
    DiscountAboveOriginal,

    /// The pair price is cheaper than a single unit, so adding a unit could lower a line total.
    #[error("pair price is below the single-unit campaign price")]
    PairPriceBelowSingle,

    /// The pair price costs more than two single units at the campaign price.
    #[error("pair price exceeds two units at the campaign price")]
    PairPriceAboveTwoSingles,

    /// Offer amounts overflowed while being compared.
    #[error("offer amounts overflowed")]
    Overflow,

    /// Offer amounts are in different currencies.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Errors raised by a campaign store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    /// The store could not be read.
    #[error("campaign store unavailable: {0}")]
    Unavailable(String),
}

/// Campaign pricing for one category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryOffer<'a> {
    original_price: Money<'a, Currency>,
    discounted_price: Money<'a, Currency>,
    price_for_two: Option<Money<'a, Currency>>,
}

impl<'a> CategoryOffer<'a> {
    /// Create an offer.
    ///
    /// # Errors
    ///
    /// Returns a [`CampaignError`] if the amounts mix currencies, the campaign price is negative or
    /// above the original price, or the pair price is below one or above two campaign-priced units.
    pub fn new(
        original_price: Money<'a, Currency>,
        discounted_price: Money<'a, Currency>,
        price_for_two: Option<Money<'a, Currency>>,
    ) -> Result<Self, CampaignError> {
        Self::build(original_price, discounted_price, price_for_two, false)
    }

    /// Create an offer whose pair price may exceed two campaign-priced units.
    ///
    /// All other checks from [`CategoryOffer::new`] still apply.
    ///
    /// # Errors
    ///
    /// Returns a [`CampaignError`] for the same reasons as [`CategoryOffer::new`], except
    /// [`CampaignError::PairPriceAboveTwoSingles`].
    pub fn with_pair_price_override(
        original_price: Money<'a, Currency>,
        discounted_price: Money<'a, Currency>,
        price_for_two: Option<Money<'a, Currency>>,
    ) -> Result<Self, CampaignError> {
        Self::build(original_price, discounted_price, price_for_two, true)
    }

    fn build(
        original_price: Money<'a, Currency>,
        discounted_price: Money<'a, Currency>,
        price_for_two: Option<Money<'a, Currency>>,
        allow_pair_override: bool,
    ) -> Result<Self, CampaignError> {
        ensure_same_currency(&original_price, &discounted_price)?;

        let single = discounted_price.to_minor_units();

        if single < 0 {
            return Err(CampaignError::NegativePrice);
        }

        if single > original_price.to_minor_units() {
            return Err(CampaignError::DiscountAboveOriginal);
        }

        if let Some(pair) = price_for_two {
            ensure_same_currency(&original_price, &pair)?;

            let pair = pair.to_minor_units();

            if pair < single {
                return Err(CampaignError::PairPriceBelowSingle);
            }

            let two_singles = single.checked_mul(2).ok_or(CampaignError::Overflow)?;

            if !allow_pair_override && pair > two_singles {
                return Err(CampaignError::PairPriceAboveTwoSingles);
            }
        }

        Ok(Self {
            original_price,
            discounted_price,
            price_for_two,
        })
    }

    /// Price the campaign advertises as "was".
    pub fn original_price(&self) -> Money<'a, Currency> {
        self.original_price
    }

    /// Campaign price for a single unit.
    pub fn discounted_price(&self) -> Money<'a, Currency> {
        self.discounted_price
    }

    /// Fixed price for two units, if the campaign runs a pair offer.
    pub fn price_for_two(&self) -> Option<Money<'a, Currency>> {
        self.price_for_two
    }
}

/// A promotional campaign.
#[derive(Debug, Clone, PartialEq)]
pub struct Campaign<'a> {
    offer_name: String,
    valid_from: Timestamp,
    valid_to: Timestamp,
    is_active: bool,
    signature: Option<CategoryOffer<'a>>,
    essentials: Option<CategoryOffer<'a>>,
}

impl<'a> Campaign<'a> {
    /// Create an active campaign with no offers, valid from `valid_from` to `valid_to` inclusive.
    ///
    /// # Errors
    ///
    /// Returns [`CampaignError::InvalidWindow`] if `valid_to` is before `valid_from`.
    pub fn new(
        offer_name: impl Into<String>,
        valid_from: Timestamp,
        valid_to: Timestamp,
    ) -> Result<Self, CampaignError> {
        if valid_to < valid_from {
            return Err(CampaignError::InvalidWindow {
                valid_from,
                valid_to,
            });
        }

        Ok(Self {
            offer_name: offer_name.into(),
            valid_from,
            valid_to,
            is_active: true,
            signature: None,
            essentials: None,
        })
    }

    /// Attach an offer for a category, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns [`CampaignError::IneligibleCategory`] for [`Category::None`].
    pub fn with_offer(
        mut self,
        category: Category,
        offer: CategoryOffer<'a>,
    ) -> Result<Self, CampaignError> {
        match category {
            Category::Signature => self.signature = Some(offer),
            Category::Essentials => self.essentials = Some(offer),
            Category::None => return Err(CampaignError::IneligibleCategory(category)),
        }

        Ok(self)
    }

    /// Switch the campaign on or off without touching its window.
    #[must_use]
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Campaign label
    pub fn offer_name(&self) -> &str {
        &self.offer_name
    }

    /// First instant the campaign applies
    pub fn valid_from(&self) -> Timestamp {
        self.valid_from
    }

    /// Last instant the campaign applies
    pub fn valid_to(&self) -> Timestamp {
        self.valid_to
    }

    /// Whether the campaign has been switched on
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Whether the campaign is switched on and `now` falls inside its window.
    pub fn is_active_at(&self, now: Timestamp) -> bool {
        self.is_active && self.valid_from <= now && now <= self.valid_to
    }

    /// The offer for a category, if the campaign has one.
    pub fn offer_for(&self, category: Category) -> Option<&CategoryOffer<'a>> {
        match category {
            Category::Signature => self.signature.as_ref(),
            Category::Essentials => self.essentials.as_ref(),
            Category::None => None,
        }
    }
}

/// Read access to current campaign state.
///
/// Implementations return `Ok(None)` when no campaign exists for the category and reserve
/// [`LookupError`] for genuine store failures.
pub trait CampaignLookup<'a> {
    /// Find the campaign that prices `category` at `now`.
    ///
    /// # Errors
    ///
    /// Returns a [`LookupError`] if the store could not be read.
    fn category_promotion(
        &self,
        category: Category,
        now: Timestamp,
    ) -> Result<Option<Campaign<'a>>, LookupError>;
}

/// A campaign store with nothing in it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCampaigns;

impl<'a> CampaignLookup<'a> for NoCampaigns {
    fn category_promotion(
        &self,
        _category: Category,
        _now: Timestamp,
    ) -> Result<Option<Campaign<'a>>, LookupError> {
        Ok(None)
    }
}

/// In-memory campaign store.
///
/// When several campaigns price the same category at once, the one that started most recently
/// wins; campaigns with the same start keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct CampaignBook<'a> {
    campaigns: Vec<Campaign<'a>>,
}

impl<'a> CampaignBook<'a> {
    /// Create an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self {
            campaigns: Vec::new(),
        }
    }

    /// Add a campaign.
    pub fn insert(&mut self, campaign: Campaign<'a>) {
        self.campaigns.push(campaign);
    }

    /// Iterate over all campaigns, active or not.
    pub fn iter(&self) -> impl Iterator<Item = &Campaign<'a>> {
        self.campaigns.iter()
    }

    /// Number of campaigns in the book.
    #[must_use]
    pub fn len(&self) -> usize {
        self.campaigns.len()
    }

    /// Check if the book is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.campaigns.is_empty()
    }
}

impl<'a> FromIterator<Campaign<'a>> for CampaignBook<'a> {
    fn from_iter<I: IntoIterator<Item = Campaign<'a>>>(iter: I) -> Self {
        Self {
            campaigns: iter.into_iter().collect(),
        }
    }
}

impl<'a> CampaignLookup<'a> for CampaignBook<'a> {
    fn category_promotion(
        &self,
        category: Category,
        now: Timestamp,
    ) -> Result<Option<Campaign<'a>>, LookupError> {
        let mut winner: Option<&Campaign<'a>> = None;

        for campaign in &self.campaigns {
            if !campaign.is_active_at(now) || campaign.offer_for(category).is_none() {
                continue;
            }

            if winner.is_none_or(|current| campaign.valid_from > current.valid_from) {
                winner = Some(campaign);
            }
        }

        trace!(
            %category,
            campaign = winner.map(Campaign::offer_name),
            "campaign lookup"
        );

        Ok(winner.cloned())
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use super::*;

    fn usd(minor: i64) -> Money<'static, Currency> {
        Money::from_minor(minor, USD)
    }

    fn at(s: &str) -> anyhow::Result<Timestamp> {
        Ok(s.parse()?)
    }

    fn summer() -> anyhow::Result<Campaign<'static>> {
        let campaign = Campaign::new(
            "Summer Pairs",
            at("2026-06-01T00:00:00Z")?,
            at("2026-08-31T23:59:59Z")?,
        )?
        .with_offer(
            Category::Signature,
            CategoryOffer::new(usd(10_000), usd(7_900), Some(usd(14_000)))?,
        )?;

        Ok(campaign)
    }

    #[test]
    fn offer_rejects_pair_price_above_two_singles() {
        let result = CategoryOffer::new(usd(10_000), usd(7_900), Some(usd(15_801)));

        assert_eq!(result, Err(CampaignError::PairPriceAboveTwoSingles));
    }

    #[test]
    fn offer_override_allows_pair_price_above_two_singles() -> TestResult {
        let offer =
            CategoryOffer::with_pair_price_override(usd(10_000), usd(7_900), Some(usd(16_000)))?;

        assert_eq!(offer.price_for_two(), Some(usd(16_000)));

        Ok(())
    }

    #[test]
    fn offer_rejects_pair_price_below_single() {
        let result =
            CategoryOffer::with_pair_price_override(usd(10_000), usd(7_900), Some(usd(7_000)));

        assert_eq!(result, Err(CampaignError::PairPriceBelowSingle));
    }

    #[test]
    fn offer_rejects_discount_above_original() {
        let result = CategoryOffer::new(usd(7_900), usd(10_000), None);

        assert_eq!(result, Err(CampaignError::DiscountAboveOriginal));
    }

    #[test]
    fn offer_rejects_negative_price() {
        let result = CategoryOffer::new(usd(7_900), usd(-1), None);

        assert_eq!(result, Err(CampaignError::NegativePrice));
    }

    #[test]
    fn offer_rejects_mixed_currencies() {
        let result = CategoryOffer::new(usd(10_000), Money::from_minor(7_900, GBP), None);

        assert!(matches!(result, Err(CampaignError::Money(_))));
    }

    #[test]
    fn campaign_rejects_inverted_window() -> TestResult {
        let from = at("2026-08-01T00:00:00Z")?;
        let to = at("2026-07-01T00:00:00Z")?;

        assert!(matches!(
            Campaign::new("Backwards", from, to),
            Err(CampaignError::InvalidWindow { .. })
        ));

        Ok(())
    }

    #[test]
    fn campaign_rejects_offer_for_uncategorised_products() -> TestResult {
        let offer = CategoryOffer::new(usd(10_000), usd(7_900), None)?;
        let result = summer()?.with_offer(Category::None, offer);

        assert_eq!(result, Err(CampaignError::IneligibleCategory(Category::None)));

        Ok(())
    }

    #[test]
    fn campaign_window_is_inclusive() -> TestResult {
        let campaign = summer()?;

        assert!(campaign.is_active_at(at("2026-06-01T00:00:00Z")?));
        assert!(campaign.is_active_at(at("2026-08-31T23:59:59Z")?));
        assert!(!campaign.is_active_at(at("2026-09-01T00:00:00Z")?));
        assert!(!campaign.is_active_at(at("2026-05-31T23:59:59Z")?));

        Ok(())
    }

    #[test]
    fn switched_off_campaign_is_never_active() -> TestResult {
        let campaign = summer()?.with_active(false);

        assert!(!campaign.is_active_at(at("2026-07-01T00:00:00Z")?));

        Ok(())
    }

    #[test]
    fn offer_for_returns_category_offer() -> TestResult {
        let campaign = summer()?;

        assert!(campaign.offer_for(Category::Signature).is_some());
        assert!(campaign.offer_for(Category::Essentials).is_none());
        assert!(campaign.offer_for(Category::None).is_none());

        Ok(())
    }

    #[test]
    fn book_returns_none_outside_window() -> TestResult {
        let book: CampaignBook<'_> = [summer()?].into_iter().collect();

        let found = book.category_promotion(Category::Signature, at("2026-10-01T00:00:00Z")?)?;

        assert_eq!(found, None);

        Ok(())
    }

    #[test]
    fn book_skips_campaigns_without_an_offer_for_the_category() -> TestResult {
        let book: CampaignBook<'_> = [summer()?].into_iter().collect();

        let found = book.category_promotion(Category::Essentials, at("2026-07-01T00:00:00Z")?)?;

        assert_eq!(found, None);

        Ok(())
    }

    #[test]
    fn book_prefers_most_recently_started_campaign() -> TestResult {
        let flash = Campaign::new(
            "Flash Sale",
            at("2026-07-10T00:00:00Z")?,
            at("2026-07-12T23:59:59Z")?,
        )?
        .with_offer(
            Category::Signature,
            CategoryOffer::new(usd(10_000), usd(6_900), Some(usd(12_000)))?,
        )?;

        let mut book = CampaignBook::new();
        book.insert(summer()?);
        book.insert(flash);

        let during = book.category_promotion(Category::Signature, at("2026-07-11T00:00:00Z")?)?;
        let after = book.category_promotion(Category::Signature, at("2026-07-20T00:00:00Z")?)?;

        assert_eq!(during.as_ref().map(Campaign::offer_name), Some("Flash Sale"));
        assert_eq!(after.as_ref().map(Campaign::offer_name), Some("Summer Pairs"));

        Ok(())
    }

    #[test]
    fn book_keeps_insertion_order_for_equal_starts() -> TestResult {
        let first = summer()?;
        let second = Campaign::new("Copycat", first.valid_from(), first.valid_to())?.with_offer(
            Category::Signature,
            CategoryOffer::new(usd(10_000), usd(5_000), None)?,
        )?;

        let book: CampaignBook<'_> = [first, second].into_iter().collect();
        let found = book.category_promotion(Category::Signature, at("2026-07-01T00:00:00Z")?)?;

        assert_eq!(found.as_ref().map(Campaign::offer_name), Some("Summer Pairs"));
        assert_eq!(book.len(), 2);

        Ok(())
    }

    #[test]
    fn no_campaigns_finds_nothing() -> TestResult {
        let found = NoCampaigns.category_promotion(Category::Signature, Timestamp::UNIX_EPOCH)?;

        assert_eq!(found, None);

        Ok(())
    }
}
