//! Fixtures

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use serde::de::DeserializeOwned;
use slotmap::SlotMap;
use thiserror::Error;
use tracing::debug;

use crate::{
    campaigns::{Campaign, CampaignBook, CampaignError},
    cart::{Cart, CartError},
    colors::Color,
    fixtures::{campaigns::CampaignsFixture, carts::CartFixture, products::ProductsFixture},
    money::MoneyParseError,
    products::{Category, Product, ProductKey},
};

pub mod campaigns;
pub mod carts;
pub mod products;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price
    #[error("Invalid price: {0}")]
    Price(#[from] MoneyParseError),

    /// Invalid campaign data
    #[error("Invalid campaign: {0}")]
    Campaign(#[from] CampaignError),

    /// Cart could not be built
    #[error("Failed to build cart: {0}")]
    Cart(#[from] CartError),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,
}

/// A product, campaign and cart set loaded from YAML.
#[derive(Debug)]
pub struct Fixture<'a> {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Products keyed by generated `SlotMap` key
    product_meta: SlotMap<ProductKey, Product<'a>>,

    /// Fixture key -> `SlotMap` key
    product_keys: FxHashMap<String, ProductKey>,

    /// Campaigns, in fixture key order
    campaigns: CampaignBook<'a>,

    /// Cart lines, in the order they were added
    cart_lines: Vec<(ProductKey, Option<Color>, u32)>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl<'a> Fixture<'a> {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            product_meta: SlotMap::with_key(),
            product_keys: FxHashMap::default(),
            campaigns: CampaignBook::new(),
            cart_lines: Vec::new(),
            currency: None,
        }
    }

    fn read<T: DeserializeOwned>(&self, kind: &str, name: &str) -> Result<T, FixtureError> {
        let file_path = self.base_path.join(kind).join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        debug!(path = %file_path.display(), "loading fixture");

        Ok(serde_norway::from_str(&contents)?)
    }

    fn check_currency(&mut self, currency: &'static Currency) -> Result<(), FixtureError> {
        match self.currency {
            Some(existing) if existing != currency => Err(FixtureError::CurrencyMismatch(
                existing.iso_alpha_code.to_string(),
                currency.iso_alpha_code.to_string(),
            )),
            Some(_) => Ok(()),
            None => {
                self.currency = Some(currency);

                Ok(())
            }
        }
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are currency mismatches.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: ProductsFixture = self.read("products", name)?;

        let mut entries: Vec<_> = fixture.products.into_iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));

        for (key, product_fixture) in entries {
            let product: Product<'static> = product_fixture.try_into()?;

            self.check_currency(product.currency())?;

            let product_key = self.product_meta.insert(product);

            self.product_keys.insert(key, product_key);
        }

        Ok(self)
    }

    /// Load campaigns from a YAML fixture file
    ///
    /// Campaigns are added in fixture key order, so ties between campaigns starting at the same
    /// instant resolve the same way on every load.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a campaign is invalid, or an offer
    /// is priced in a different currency from the products.
    pub fn load_campaigns(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CampaignsFixture = self.read("campaigns", name)?;

        let mut entries: Vec<_> = fixture.campaigns.into_iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));

        for (_key, campaign_fixture) in entries {
            let campaign: Campaign<'static> = campaign_fixture.try_into()?;

            for category in [Category::Signature, Category::Essentials] {
                if let Some(offer) = campaign.offer_for(category) {
                    self.check_currency(offer.original_price().currency())?;
                }
            }

            self.campaigns.insert(campaign);
        }

        Ok(self)
    }

    /// Load a cart from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a line names an unknown product.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CartFixture = self.read("carts", name)?;

        for line in fixture.lines {
            let product_key = self.product_key(&line.product)?;

            self.cart_lines.push((product_key, line.color, line.quantity));
        }

        Ok(self)
    }

    /// Load a complete fixture set (products, campaigns and cart with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Self::new().with_set(name)
    }

    /// Load a complete fixture set into this fixture
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn with_set(mut self, name: &str) -> Result<Self, FixtureError> {
        self.load_products(name)?
            .load_campaigns(name)?
            .load_cart(name)?;

        Ok(self)
    }

    /// Get a product by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, key: &str) -> Result<&Product<'a>, FixtureError> {
        let product_key = self.product_key(key)?;

        self.product_meta
            .get(product_key)
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Get a product key by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product_key(&self, key: &str) -> Result<ProductKey, FixtureError> {
        self.product_keys
            .get(key)
            .copied()
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Campaigns loaded so far
    pub fn campaigns(&self) -> &CampaignBook<'a> {
        &self.campaigns
    }

    /// Build the cart, merging lines for the same product and colour.
    ///
    /// # Errors
    ///
    /// Returns an error if no products are loaded or a line cannot be added.
    pub fn cart(&self) -> Result<Cart<'a>, FixtureError> {
        let currency = self.currency()?;
        let mut cart = Cart::new(currency);

        for (product_key, color, quantity) in &self.cart_lines {
            let product = self
                .product_meta
                .get(*product_key)
                .ok_or_else(|| FixtureError::ProductNotFound(format!("{product_key:?}")))?;

            cart.add(product.clone(), color.clone(), *quantity)?;
        }

        Ok(cart)
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }
}

impl Default for Fixture<'_> {
    fn default() -> Self {
        Self::new()
    }
}
