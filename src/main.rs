//! REPRICER — Competitive pricing with an EBITDA margin floor
//!
//! Entry point. Loads configuration, initialises structured logging, and
//! runs the load→price→report→push cycle once, or on a fixed interval
//! with graceful shutdown when a schedule is configured.

use anyhow::Result;
use std::time::Duration;
use tracing::{error, info, warn};

use repricer::config;
use repricer::gateway::http::HttpGateway;
use repricer::gateway::{DryRunGateway, GatewayReport, PriceGateway};
use repricer::pricing::PricingEngine;
use repricer::sources::catalog::JsonCatalogSource;
use repricer::sources::listing::JsonListingSource;
use repricer::sources::{self, CatalogSource, ListingSource};
use repricer::storage;
use repricer::types::PricingResult;

const BANNER: &str = r#"
 ____  _____ ____  ____  ___ ____ _____ ____
|  _ \| ____|  _ \|  _ \|_ _/ ___| ____|  _ \
| |_) |  _| | |_) | |_) || | |   |  _| | |_) |
|  _ <| |___|  __/|  _ < | | |___| |___|  _ <
|_| \_\_____|_|   |_| \_\___\____|_____|_| \_\

  Competitive pricing with an EBITDA margin floor
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path =
        std::env::var("REPRICER_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let cfg = config::AppConfig::load(&config_path)?;

    init_logging();

    println!("{BANNER}");
    info!(
        config = %config_path,
        seller = %cfg.pricing.operator_seller_name,
        limit_rate_ebitda = %cfg.pricing.limit_rate_ebitda,
        gateway_enabled = cfg.gateway.enabled,
        "REPRICER starting up"
    );

    // -- Initialise components -------------------------------------------

    let listings = JsonListingSource::new(&cfg.sources.offers_path);
    let catalog = JsonCatalogSource::new(&cfg.sources.catalog_path);

    let engine = PricingEngine::new(&cfg.pricing)?;

    let gateway: Box<dyn PriceGateway> = match (cfg.gateway.enabled, &cfg.gateway.base_url) {
        (true, Some(base_url)) => {
            info!(base_url = %base_url, "Using HTTP price gateway");
            Box::new(HttpGateway::new(
                base_url,
                cfg.gateway_token()?,
                cfg.gateway.concurrency,
                cfg.gateway.timeout_secs,
            )?)
        }
        (true, None) => {
            warn!("Gateway enabled without base_url, falling back to dry run");
            Box::new(DryRunGateway)
        }
        (false, _) => Box::new(DryRunGateway),
    };

    // -- Single run ------------------------------------------------------

    let Some(every_seconds) = cfg.schedule.every_seconds else {
        let (result, push) =
            run_cycle(&listings, &catalog, &engine, &*gateway, &cfg.reports.dir).await?;
        log_cycle_report(&result, &push);
        return Ok(());
    };

    // -- Scheduled loop --------------------------------------------------

    let mut interval = tokio::time::interval(Duration::from_secs(every_seconds.max(1)));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(
        interval_secs = every_seconds,
        "Entering main loop. Press Ctrl+C to stop."
    );

    let mut cycles: u64 = 0;
    loop {
        tokio::select! {
            _ = interval.tick() => {
                cycles += 1;
                match run_cycle(&listings, &catalog, &engine, &*gateway, &cfg.reports.dir).await {
                    Ok((result, push)) => log_cycle_report(&result, &push),
                    Err(e) => error!(cycle = cycles, error = %format!("{e:#}"), "Cycle failed, continuing to next"),
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received.");
                break;
            }
        }
    }

    info!(cycles, "REPRICER shut down cleanly.");
    Ok(())
}

/// Run a single load→price→report→push cycle.
async fn run_cycle(
    listings: &dyn ListingSource,
    catalog: &dyn CatalogSource,
    engine: &PricingEngine,
    gateway: &dyn PriceGateway,
    reports_dir: &std::path::Path,
) -> Result<(PricingResult, GatewayReport)> {
    info!(
        listings = listings.name(),
        catalog = catalog.name(),
        gateway = gateway.name(),
        "Starting cycle"
    );

    // 1. Load inputs
    let (catalog_rows, offers) = sources::load_snapshot(listings, catalog).await?;

    // 2. Price
    let result = engine.run(&catalog_rows, &offers);

    // 3. Persist reports
    storage::write_reports(&result, reports_dir)?;

    // 4. Push
    let push = gateway.push_prices(&result.price_updates()).await?;

    Ok((result, push))
}

/// Log a human-readable cycle summary.
fn log_cycle_report(result: &PricingResult, push: &GatewayReport) {
    info!(
        priced = result.prices.len(),
        compared = result.comparisons.len(),
        skipped = result.skipped.len(),
        pushed = push.updated.len(),
        push_failed = push.failed.len(),
        "Cycle complete: {result}"
    );
    if !push.is_clean() {
        for failed in &push.failed {
            warn!(sku = %failed.sku, reason = %failed.reason, "Price not applied");
        }
    }
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("repricer=info"));

    let json_logging = std::env::var("REPRICER_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
