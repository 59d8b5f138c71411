//! Pair Offers
//!
//! "Two for a fixed price" campaign offers. Only one pair per line is sold at the pair price,
//! however many pairs the quantity could form; every other unit is sold at the single-unit price.

use rusty_money::{Money, iso::Currency};

use crate::{
    money::ensure_same_currency,
    pricing::{PricingError, plus, times},
    products::Category,
};

/// Most pairs on one line that are sold at the pair price.
///
/// A line of four units gets one discounted pair and two single-rate units, not two pairs. This
/// matches every invoice issued so far and is awaiting product-owner sign-off before it changes.
pub const MAX_PROMOTIONAL_PAIRS_PER_LINE: u32 = 1;

/// How a line's quantity splits between the pair price and the single-unit price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSplit<'a> {
    line_total: Money<'a, Currency>,
    unit_price: Money<'a, Currency>,
    pair_price: Option<Money<'a, Currency>>,
    units_at_pair_rate: u32,
    units_at_single_rate: u32,
}

impl<'a> LineSplit<'a> {
    /// Total for the whole line
    pub fn line_total(&self) -> Money<'a, Currency> {
        self.line_total
    }

    /// Single-unit price
    pub fn unit_price(&self) -> Money<'a, Currency> {
        self.unit_price
    }

    /// Pair price, only when at least one pair was sold at it
    pub fn pair_price(&self) -> Option<Money<'a, Currency>> {
        self.pair_price
    }

    /// Units covered by the pair price
    pub fn units_at_pair_rate(&self) -> u32 {
        self.units_at_pair_rate
    }

    /// Units sold at the single-unit price
    pub fn units_at_single_rate(&self) -> u32 {
        self.units_at_single_rate
    }

    /// Number of pairs sold at the pair price
    pub fn promotional_pairs(&self) -> u32 {
        self.units_at_pair_rate / 2
    }

    /// Total quantity on the line
    pub fn quantity(&self) -> u32 {
        self.units_at_pair_rate + self.units_at_single_rate
    }
}

/// Compute a line total for `quantity` units at `unit_price`, with an optional pair price.
///
/// A pair price on a category that cannot take promotions is ignored.
///
/// # Errors
///
/// - [`PricingError::InvalidQuantity`]: `quantity` is zero.
/// - [`PricingError::PricingInvariantViolation`]: `unit_price` is negative, or an applied pair
///   price is below `unit_price`. The error carries no SKU; see [`PricingError::for_sku`].
/// - [`PricingError::Money`]: the pair price is in another currency.
/// - [`PricingError::Overflow`]: the total does not fit in minor units.
pub fn compute_line_total<'a>(
    unit_price: Money<'a, Currency>,
    category: Category,
    quantity: u32,
    pair_price: Option<Money<'a, Currency>>,
) -> Result<LineSplit<'a>, PricingError> {
    if quantity == 0 {
        return Err(PricingError::InvalidQuantity(quantity));
    }

    if unit_price.to_minor_units() < 0 {
        return Err(PricingError::PricingInvariantViolation {
            sku: String::new(),
            price: unit_price.to_string(),
            base_price: Money::from_minor(0, unit_price.currency()).to_string(),
        });
    }

    let pair_price = pair_price.filter(|_| category.is_promotion_eligible() && quantity >= 2);

    let Some(pair_price) = pair_price else {
        return Ok(LineSplit {
            line_total: times(unit_price, quantity)?,
            unit_price,
            pair_price: None,
            units_at_pair_rate: 0,
            units_at_single_rate: quantity,
        });
    };

    ensure_same_currency(&unit_price, &pair_price)?;

    // A pair cheaper than one unit would make a second unit lower the line total.
    if pair_price.to_minor_units() < unit_price.to_minor_units() {
        return Err(PricingError::PricingInvariantViolation {
            sku: String::new(),
            price: pair_price.to_string(),
            base_price: unit_price.to_string(),
        });
    }

    let promotional_pairs = MAX_PROMOTIONAL_PAIRS_PER_LINE.min(quantity / 2);
    let units_at_pair_rate = promotional_pairs * 2;
    let units_at_single_rate = quantity - units_at_pair_rate;

    let line_total = plus(
        times(pair_price, promotional_pairs)?,
        times(unit_price, units_at_single_rate)?,
    )?;

    Ok(LineSplit {
        line_total,
        unit_price,
        pair_price: Some(pair_price),
        units_at_pair_rate,
        units_at_single_rate,
    })
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use super::*;

    fn usd(minor: i64) -> Money<'static, Currency> {
        Money::from_minor(minor, USD)
    }

    #[test]
    fn single_unit_never_uses_pair_price() -> TestResult {
        let split = compute_line_total(usd(7_900), Category::Signature, 1, Some(usd(14_000)))?;

        assert_eq!(split.line_total(), usd(7_900));
        assert_eq!(split.units_at_pair_rate(), 0);
        assert_eq!(split.units_at_single_rate(), 1);
        assert_eq!(split.pair_price(), None);

        Ok(())
    }

    #[test]
    fn two_units_cost_the_pair_price() -> TestResult {
        let split = compute_line_total(usd(7_900), Category::Signature, 2, Some(usd(14_000)))?;

        assert_eq!(split.line_total(), usd(14_000));
        assert_eq!(split.units_at_pair_rate(), 2);
        assert_eq!(split.units_at_single_rate(), 0);

        Ok(())
    }

    #[test]
    fn third_unit_is_charged_at_single_rate() -> TestResult {
        let split = compute_line_total(usd(7_900), Category::Signature, 3, Some(usd(14_000)))?;

        assert_eq!(split.line_total(), usd(21_900));
        assert_eq!(split.units_at_single_rate(), 1);

        Ok(())
    }

    #[test]
    fn five_units_get_one_pair_and_three_singles() -> TestResult {
        let split = compute_line_total(usd(7_900), Category::Signature, 5, Some(usd(14_000)))?;

        assert_eq!(split.line_total(), usd(37_700));
        assert_eq!(split.promotional_pairs(), 1);
        assert_eq!(split.quantity(), 5);

        Ok(())
    }

    #[test]
    fn only_one_pair_per_line_gets_the_pair_price() -> TestResult {
        for quantity in 2..=6 {
            let split =
                compute_line_total(usd(7_900), Category::Essentials, quantity, Some(usd(14_000)))?;

            assert_eq!(split.units_at_pair_rate(), 2, "quantity {quantity}");
            assert_eq!(
                split.units_at_single_rate(),
                quantity - 2,
                "quantity {quantity}"
            );
        }

        Ok(())
    }

    #[test]
    fn without_pair_price_total_is_unit_price_times_quantity() -> TestResult {
        for quantity in 1..=8 {
            let split = compute_line_total(usd(4_999), Category::Signature, quantity, None)?;

            assert_eq!(
                split.line_total(),
                usd(4_999 * i64::from(quantity)),
                "quantity {quantity}"
            );
        }

        Ok(())
    }

    #[test]
    fn line_total_never_decreases_as_quantity_grows() -> TestResult {
        let cases = [
            (usd(7_900), Some(usd(14_000))),
            (usd(7_900), Some(usd(7_900))),
            (usd(7_900), Some(usd(15_800))),
            (usd(5_000), None),
            (usd(0), Some(usd(0))),
        ];

        for (unit_price, pair_price) in cases {
            let mut previous = 0;

            for quantity in 1..=10 {
                let split =
                    compute_line_total(unit_price, Category::Signature, quantity, pair_price)?;
                let total = split.line_total().to_minor_units();

                assert!(
                    total >= previous,
                    "total fell from {previous} to {total} at quantity {quantity}"
                );

                previous = total;
            }
        }

        Ok(())
    }

    #[test]
    fn pair_price_below_unit_price_is_rejected() {
        let result = compute_line_total(usd(7_900), Category::Signature, 2, Some(usd(5_000)));

        assert!(matches!(
            result,
            Err(PricingError::PricingInvariantViolation { ref price, ref base_price, .. })
                if price == "$50.00" && base_price == "$79.00"
        ));
    }

    #[test]
    fn pair_price_below_unit_price_is_ignored_for_single_units() -> TestResult {
        let split = compute_line_total(usd(7_900), Category::Signature, 1, Some(usd(5_000)))?;

        assert_eq!(split.line_total(), usd(7_900));

        Ok(())
    }

    #[test]
    fn negative_unit_price_is_rejected() {
        let result = compute_line_total(usd(-500), Category::None, 3, None);

        assert!(matches!(
            result,
            Err(PricingError::PricingInvariantViolation { ref sku, .. }) if sku.is_empty()
        ));
    }

    #[test]
    fn violations_can_be_attributed_to_a_product() {
        let result = compute_line_total(usd(-500), Category::None, 1, None)
            .map_err(|err| err.for_sku("SG-AV-001"));

        assert!(matches!(
            result,
            Err(PricingError::PricingInvariantViolation { ref sku, .. }) if sku == "SG-AV-001"
        ));
    }

    #[test]
    fn ineligible_category_ignores_pair_price() -> TestResult {
        let split = compute_line_total(usd(7_900), Category::None, 2, Some(usd(14_000)))?;

        assert_eq!(split.line_total(), usd(15_800));
        assert_eq!(split.units_at_pair_rate(), 0);

        Ok(())
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let result = compute_line_total(usd(7_900), Category::Signature, 0, Some(usd(14_000)));

        assert_eq!(result, Err(PricingError::InvalidQuantity(0)));
    }

    #[test]
    fn pair_price_in_another_currency_is_rejected() {
        let result = compute_line_total(
            usd(7_900),
            Category::Signature,
            2,
            Some(Money::from_minor(14_000, GBP)),
        );

        assert!(matches!(result, Err(PricingError::Money(_))));
    }

    #[test]
    fn overflowing_total_is_an_error() {
        let result = compute_line_total(usd(i64::MAX), Category::Signature, 3, None);

        assert_eq!(result, Err(PricingError::Overflow));
    }
}
