//! Campaign Fixtures

use jiff::Timestamp;
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{
    campaigns::{Campaign, CategoryOffer},
    fixtures::FixtureError,
    money::parse_price,
    products::Category,
};

/// Wrapper for campaigns in YAML
#[derive(Debug, Deserialize)]
pub struct CampaignsFixture {
    /// Map of campaign key -> campaign fixture
    #[serde(default)]
    pub campaigns: FxHashMap<String, CampaignFixture>,
}

/// Campaign Fixture
#[derive(Debug, Deserialize)]
pub struct CampaignFixture {
    /// Campaign label
    pub offer_name: String,

    /// First instant the campaign applies (RFC 3339)
    pub valid_from: Timestamp,

    /// Last instant the campaign applies (RFC 3339)
    pub valid_to: Timestamp,

    /// Whether the campaign is switched on
    #[serde(default = "switched_on")]
    pub is_active: bool,

    /// Offer for the signature collection
    #[serde(default)]
    pub signature: Option<OfferFixture>,

    /// Offer for the essentials collection
    #[serde(default)]
    pub essentials: Option<OfferFixture>,
}

fn switched_on() -> bool {
    true
}

/// Category offer fixture
#[derive(Debug, Deserialize)]
pub struct OfferFixture {
    /// "Was" price (e.g., "100.00 USD")
    pub original_price: String,

    /// Campaign price for one unit
    pub discounted_price: String,

    /// Campaign price for two units
    #[serde(default)]
    pub price_for_two: Option<String>,

    /// Allow a pair price above two campaign-priced units
    #[serde(default)]
    pub allow_pair_price_override: bool,
}

impl TryFrom<OfferFixture> for CategoryOffer<'_> {
    type Error = FixtureError;

    fn try_from(fixture: OfferFixture) -> Result<Self, Self::Error> {
        let original_price = parse_price(&fixture.original_price)?;
        let discounted_price = parse_price(&fixture.discounted_price)?;
        let price_for_two = fixture
            .price_for_two
            .as_deref()
            .map(parse_price)
            .transpose()?;

        let offer = if fixture.allow_pair_price_override {
            CategoryOffer::with_pair_price_override(
                original_price,
                discounted_price,
                price_for_two,
            )?
        } else {
            CategoryOffer::new(original_price, discounted_price, price_for_two)?
        };

        Ok(offer)
    }
}

impl TryFrom<CampaignFixture> for Campaign<'_> {
    type Error = FixtureError;

    fn try_from(fixture: CampaignFixture) -> Result<Self, Self::Error> {
        let mut campaign = Campaign::new(fixture.offer_name, fixture.valid_from, fixture.valid_to)?
            .with_active(fixture.is_active);

        for (category, offer) in [
            (Category::Signature, fixture.signature),
            (Category::Essentials, fixture.essentials),
        ] {
            if let Some(offer) = offer {
                campaign = campaign.with_offer(category, offer.try_into()?)?;
            }
        }

        Ok(campaign)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::USD};
    use testresult::TestResult;

    use crate::campaigns::CampaignError;

    use super::*;

    const SUMMER: &str = "\
offer_name: Summer Pairs
valid_from: 2026-06-01T00:00:00Z
valid_to: 2026-08-31T23:59:59Z
signature:
  original_price: 100.00 USD
  discounted_price: 79.00 USD
  price_for_two: 140.00 USD
";

    #[test]
    fn campaign_fixture_builds_campaign() -> TestResult {
        let fixture: CampaignFixture = serde_norway::from_str(SUMMER)?;

        let campaign: Campaign<'_> = fixture.try_into()?;

        let offer = campaign
            .offer_for(Category::Signature)
            .ok_or("missing signature offer")?;

        assert_eq!(campaign.offer_name(), "Summer Pairs");
        assert!(campaign.is_active());
        assert_eq!(offer.discounted_price(), Money::from_minor(7_900, USD));
        assert_eq!(offer.price_for_two(), Some(Money::from_minor(14_000, USD)));
        assert!(campaign.offer_for(Category::Essentials).is_none());

        Ok(())
    }

    #[test]
    fn pair_price_above_two_singles_needs_override() -> TestResult {
        let yaml = "original_price: 100.00 USD\n\
                    discounted_price: 60.00 USD\n\
                    price_for_two: 130.00 USD\n";

        let strict: OfferFixture = serde_norway::from_str(yaml)?;
        let result: Result<CategoryOffer<'_>, _> = strict.try_into();

        assert!(matches!(
            result,
            Err(FixtureError::Campaign(CampaignError::PairPriceAboveTwoSingles))
        ));

        let relaxed: OfferFixture =
            serde_norway::from_str(&format!("{yaml}allow_pair_price_override: true\n"))?;
        let offer: CategoryOffer<'_> = relaxed.try_into()?;

        assert_eq!(offer.price_for_two(), Some(Money::from_minor(13_000, USD)));

        Ok(())
    }

    #[test]
    fn inverted_window_is_rejected() -> TestResult {
        let fixture: CampaignFixture = serde_norway::from_str(
            "offer_name: Backwards\n\
             valid_from: 2026-09-01T00:00:00Z\n\
             valid_to: 2026-06-01T00:00:00Z\n",
        )?;

        let result: Result<Campaign<'_>, _> = fixture.try_into();

        assert!(matches!(
            result,
            Err(FixtureError::Campaign(CampaignError::InvalidWindow { .. }))
        ));

        Ok(())
    }
}
