//! Product Fixtures

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    money::{ensure_same_currency, parse_price},
    products::{Category, Product, ProductType},
};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Map of product key -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// Product SKU
    pub sku: String,

    /// Regular price (e.g., "100.00 USD")
    pub price: String,

    /// Standing discount price; `"0.00 USD"` or absent means none
    #[serde(default)]
    pub discounted_price: Option<String>,

    /// Collection
    #[serde(default = "default_category")]
    pub category: Category,

    /// Kind of eyewear
    pub product_type: ProductType,
}

fn default_category() -> Category {
    Category::None
}

impl TryFrom<ProductFixture> for Product<'_> {
    type Error = FixtureError;

    fn try_from(fixture: ProductFixture) -> Result<Self, Self::Error> {
        let base_price = parse_price(&fixture.price)?;

        let mut product = Product::new(
            fixture.name,
            fixture.sku,
            base_price,
            fixture.category,
            fixture.product_type,
        );

        if let Some(discounted_price) = fixture.discounted_price {
            let discounted_price = parse_price(&discounted_price)?;

            ensure_same_currency(&base_price, &discounted_price).map_err(|_err| {
                FixtureError::CurrencyMismatch(
                    base_price.currency().iso_alpha_code.to_string(),
                    discounted_price.currency().iso_alpha_code.to_string(),
                )
            })?;

            product = product.with_discounted_price(discounted_price);
        }

        Ok(product)
    }
}
