//! Fixture Config

use std::path::PathBuf;

use clap::Args;

/// Where to load products, campaigns and the cart from.
#[derive(Debug, Args)]
pub struct FixtureConfig {
    /// Directory holding `products/`, `campaigns/` and `carts/`
    #[arg(long, env = "PAIRWISE_FIXTURES_DIR", default_value = "./fixtures")]
    pub fixtures_dir: PathBuf,

    /// Fixture set name
    #[arg(short, long, env = "PAIRWISE_SET", default_value = "storefront")]
    pub set: String,
}
