//! Pairwise CLI
//!
//! Prices a fixture cart and prints the receipt, or the frozen order as JSON.

use std::{
    io::{self, Write},
    process::{self, ExitCode},
};

use anyhow::Context;
use tracing::{error, info};

use pairwise::{
    config::PricingConfig, fixtures::Fixture, observability, orders::OrderSnapshot,
    receipt::Receipt,
};

fn main() -> ExitCode {
    // Load configuration from .env and CLI arguments
    let config = PricingConfig::load().unwrap_or_else(|err| {
        if !err.use_stderr() {
            err.exit();
        }

        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized yet, must use eprintln for config errors"
        )]
        {
            eprintln!("Configuration error: {err}");
        }

        process::exit(2);
    });

    if let Err(err) = observability::init_subscriber(&config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialise, stderr is all that is left"
        )]
        {
            eprintln!("{err}");
        }

        return ExitCode::FAILURE;
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");

            ExitCode::FAILURE
        }
    }
}

fn run(config: &PricingConfig) -> anyhow::Result<()> {
    let fixture = Fixture::with_base_path(&config.fixtures.fixtures_dir)
        .with_set(&config.fixtures.set)
        .with_context(|| format!("loading fixture set {}", config.fixtures.set))?;

    let currency = fixture.currency()?;
    let shipping = config.shipping.policy(currency)?;
    let now = config.now();

    let cart = fixture.cart()?;
    let totals = cart.price(fixture.campaigns(), now, &shipping)?;
    let snapshot = OrderSnapshot::freeze(&totals, now);

    info!(lines = cart.len(), total = %totals.total(), "priced cart");

    let mut out = io::stdout().lock();

    if config.json {
        writeln!(out, "{}", snapshot.to_json()?)?;
    } else {
        Receipt::from_snapshot(&snapshot)?.write_to(&mut out)?;
    }

    Ok(())
}
