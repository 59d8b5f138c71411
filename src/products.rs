//! Products

use std::fmt;

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// Collection a product is sold under.
///
/// Only the signature and essentials collections take part in campaign pricing and pair offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Signature collection
    Signature,

    /// Essentials collection
    Essentials,

    /// Not part of any promotional collection
    None,
}

impl Category {
    /// Whether campaign pricing and pair offers can apply to this category.
    pub const fn is_promotion_eligible(self) -> bool {
        matches!(self, Self::Signature | Self::Essentials)
    }

    /// Lower-case name used in fixtures and snapshots.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Signature => "signature",
            Self::Essentials => "essentials",
            Self::None => "none",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of eyewear. Informational only; pricing never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    /// Sunglasses
    Sunglasses,

    /// Prescription or fashion glasses
    Glasses,

    /// Contact lenses
    Contacts,

    /// Cases, cloths and other accessories
    Accessory,
}

/// Product pricing facts, as read from the product store.
#[derive(Debug, Clone, PartialEq)]
pub struct Product<'a> {
    /// Product name
    pub name: String,

    /// Stock keeping unit; identifies the product across cart lines
    pub sku: String,

    /// Regular price
    pub base_price: Money<'a, Currency>,

    /// Standing discount price, independent of any campaign
    pub discounted_price: Option<Money<'a, Currency>>,

    /// Promotional collection
    pub category: Category,

    /// Kind of eyewear
    pub product_type: ProductType,
}

impl<'a> Product<'a> {
    /// Create a product with no standing discount.
    pub fn new(
        name: impl Into<String>,
        sku: impl Into<String>,
        base_price: Money<'a, Currency>,
        category: Category,
        product_type: ProductType,
    ) -> Self {
        Self {
            name: name.into(),
            sku: sku.into(),
            base_price,
            discounted_price: None,
            category,
            product_type,
        }
    }

    /// Set a standing discount price.
    #[must_use]
    pub fn with_discounted_price(mut self, discounted_price: Money<'a, Currency>) -> Self {
        self.discounted_price = Some(discounted_price);
        self
    }

    /// Currency the product is priced in.
    pub fn currency(&self) -> &'a Currency {
        self.base_price.currency()
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;

    use super::*;

    #[test]
    fn only_collections_are_promotion_eligible() {
        assert!(Category::Signature.is_promotion_eligible());
        assert!(Category::Essentials.is_promotion_eligible());
        assert!(!Category::None.is_promotion_eligible());
    }

    #[test]
    fn category_displays_snake_case_name() {
        assert_eq!(Category::Signature.to_string(), "signature");
        assert_eq!(Category::None.to_string(), "none");
    }

    #[test]
    fn with_discounted_price_sets_standing_discount() {
        let product = Product::new(
            "Wayfarer",
            "SG-WF-001",
            Money::from_minor(10_000, USD),
            Category::Essentials,
            ProductType::Sunglasses,
        )
        .with_discounted_price(Money::from_minor(8_000, USD));

        assert_eq!(product.discounted_price, Some(Money::from_minor(8_000, USD)));
        assert_eq!(product.currency(), USD);
    }

    #[test]
    fn category_deserialises_from_snake_case() -> testresult::TestResult {
        let category: Category = serde_json::from_str("\"essentials\"")?;

        assert_eq!(category, Category::Essentials);

        Ok(())
    }
}
