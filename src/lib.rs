//! Pairwise
//!
//! Pairwise is the pricing engine behind an eyewear storefront. It resolves the unit price in
//! effect for a product, applies "two for a fixed price" pair offers and aggregates carts into a
//! subtotal, savings, shipping and a total. Placed orders are frozen into snapshots that can be
//! re-derived without consulting live campaigns.

pub mod campaigns;
pub mod cart;
pub mod checkout;
pub mod colors;
pub mod config;
pub mod fixtures;
pub mod money;
pub mod observability;
pub mod orders;
pub mod pairs;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod shipping;
