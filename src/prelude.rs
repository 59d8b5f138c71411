//! Pairwise prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    campaigns::{
        Campaign, CampaignBook, CampaignError, CampaignLookup, CategoryOffer, LookupError,
        NoCampaigns,
    },
    cart::{Cart, CartError, CartLine, CartTotals, LinePricing, aggregate_cart, price_line},
    checkout::{CheckoutItemKind, CheckoutLineItem, checkout_line_items},
    colors::Color,
    fixtures::{Fixture, FixtureError},
    orders::{OrderLineSnapshot, OrderSnapshot, SnapshotError},
    pairs::{LineSplit, MAX_PROMOTIONAL_PAIRS_PER_LINE, compute_line_total},
    pricing::{PriceSource, PricingError, ResolvedPrice, resolve_unit_price},
    products::{Category, Product, ProductKey, ProductType},
    receipt::{Receipt, ReceiptError},
    shipping::{ShippingError, ShippingPolicy},
};
