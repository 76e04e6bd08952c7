//! End-to-end pipeline tests through the public API.

use anyhow::Result;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::path::{Path, PathBuf};

use repricer::gateway::{GatewayReport, PriceGateway};
use repricer::pricing::suggested::UndercutPolicy;
use repricer::pricing::{PricingConfig, PricingEngine};
use repricer::sources::load_snapshot;
use repricer::storage;
use repricer::types::*;

use crate::mock_marketplace::{entry, offer, MockGateway, StaticMarketplace, OPERATOR};

fn config(limit_rate_ebitda: Decimal) -> PricingConfig {
    PricingConfig {
        limit_rate_ebitda,
        operator_seller_name: OPERATOR.to_string(),
        ..PricingConfig::default()
    }
}

fn reports_dir() -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("repricer_it_{}", uuid::Uuid::new_v4()));
    p
}

/// Same sequence as the binary's cycle.
async fn run_cycle(
    market: &StaticMarketplace,
    engine: &PricingEngine,
    gateway: &dyn PriceGateway,
    dir: &Path,
) -> Result<(PricingResult, GatewayReport)> {
    let (catalog, offers) = load_snapshot(market, market).await?;
    let result = engine.run(&catalog, &offers);
    storage::write_reports(&result, dir)?;
    let push = gateway.push_prices(&result.price_updates()).await?;
    Ok((result, push))
}

fn costed(internal: &str, external: &str) -> CatalogEntry {
    entry(internal, external, dec!(40), dec!(5), dec!(5))
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_undercut_competitor_and_push() {
    let market = StaticMarketplace::new(
        vec![
            offer("MP-A", dec!(100.00), OPERATOR),
            offer("MP-A", dec!(90.00), "Loja A"),
        ],
        vec![costed("HP-A", "MP-A")],
    );
    let engine = PricingEngine::new(&config(dec!(4))).unwrap();
    let gateway = MockGateway::new();
    let dir = reports_dir();

    let (result, push) = run_cycle(&market, &engine, &gateway, &dir).await.unwrap();

    let cmp = &result.comparisons[0];
    assert_eq!(cmp.competitor_price, Some(dec!(90.00)));
    assert_eq!(cmp.suggested_price, dec!(89.90));
    assert_eq!(cmp.gain_pct, dec!(-10.10));

    assert_eq!(result.prices[0].sku, "HP-A");
    assert_eq!(result.prices[0].price, dec!(89.90));
    assert_eq!(result.prices[0].steps, 0);

    assert!(push.is_clean());
    assert_eq!(
        gateway.applied(),
        vec![PriceUpdate {
            sku: "HP-A".to_string(),
            price: dec!(89.90)
        }]
    );

    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn test_no_competitor_keeps_own_price() {
    let market = StaticMarketplace::new(
        vec![offer("MP-B", dec!(100.00), OPERATOR)],
        vec![costed("HP-B", "MP-B")],
    );
    let engine = PricingEngine::new(&config(dec!(4))).unwrap();
    let result = engine.run(market.catalog(), market.offers());

    let cmp = &result.comparisons[0];
    assert_eq!(cmp.competitor_price, None);
    assert_eq!(cmp.suggested_price, dec!(100.00));
    assert_eq!(cmp.gain_pct, dec!(0));

    let priced = &result.prices[0];
    assert_eq!(priced.price, dec!(100.00));
    assert_eq!(priced.ebitda.commission, dec!(15.00));
    assert_eq!(priced.ebitda.admin_fee, dec!(5.00));
    assert_eq!(priced.ebitda.reverse_fee, dec!(0.30));
    assert_eq!(priced.ebitda.ebitda_abs, dec!(29.70));
    assert_eq!(priced.ebitda.ebitda_pct, dec!(29.7));
}

#[tokio::test]
async fn test_escalates_to_margin_floor() {
    // Competitor at 100.10 puts the suggestion at exactly 100.00
    let market = StaticMarketplace::new(
        vec![
            offer("MP-D", dec!(120.00), OPERATOR),
            offer("MP-D", dec!(100.10), "Loja A"),
        ],
        vec![costed("HP-D", "MP-D")],
    );
    let engine = PricingEngine::new(&config(dec!(35))).unwrap();
    let gateway = MockGateway::new();
    let dir = reports_dir();

    let (result, _) = run_cycle(&market, &engine, &gateway, &dir).await.unwrap();

    assert_eq!(result.comparisons[0].suggested_price, dec!(100.00));
    let priced = &result.prices[0];
    assert_eq!(priced.price, dec!(111.80));
    assert_eq!(priced.steps, 118);
    assert_eq!(priced.ebitda.ebitda_pct, dec!(35.0));
    assert!(priced.ebitda.ebitda_pct >= dec!(35));
    assert_eq!(gateway.applied()[0].price, dec!(111.80));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn test_cheapest_of_competitors_wins() {
    let market = StaticMarketplace::new(
        vec![
            offer("MP-E", dec!(60.00), OPERATOR),
            offer("MP-E", dec!(50.00), "Loja A"),
            offer("MP-E", dec!(49.99), "Loja B"),
        ],
        vec![entry("HP-E", "MP-E", dec!(20), dec!(5), dec!(1))],
    );
    let engine = PricingEngine::new(&config(dec!(4))).unwrap();
    let result = engine.run(market.catalog(), market.offers());

    assert_eq!(result.comparisons[0].competitor_price, Some(dec!(49.99)));
    assert_eq!(result.comparisons[0].suggested_price, dec!(49.89));
    assert_eq!(result.price_for("HP-E"), Some(dec!(49.89)));
}

#[tokio::test]
async fn test_keep_when_cheaper_policy() {
    let market = StaticMarketplace::new(
        vec![
            offer("MP-K", dec!(80.00), OPERATOR),
            offer("MP-K", dec!(95.00), "Loja A"),
        ],
        vec![costed("HP-K", "MP-K")],
    );

    let always = PricingEngine::new(&config(dec!(4))).unwrap();
    let result = always.run(market.catalog(), market.offers());
    assert_eq!(result.comparisons[0].suggested_price, dec!(94.90));

    let keep = PricingEngine::new(&PricingConfig {
        undercut_policy: UndercutPolicy::KeepWhenCheaper,
        ..config(dec!(4))
    })
    .unwrap();
    let result = keep.run(market.catalog(), market.offers());
    assert_eq!(result.comparisons[0].suggested_price, dec!(80.00));
    assert_eq!(result.price_for("HP-K"), Some(dec!(80.00)));
}

// ---------------------------------------------------------------------------
// Skips and failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_skipped_rows_are_reported_not_fatal() {
    let mut inactive = costed("HP-I", "MP-I");
    inactive.status = CatalogStatus::Inactive;
    let mut no_cost = costed("HP-N", "MP-N");
    no_cost.cost = None;

    let market = StaticMarketplace::new(
        vec![
            offer("MP-OK", dec!(100.00), OPERATOR),
            offer("MP-X", dec!(100.00), OPERATOR),
            offer("MP-I", dec!(100.00), OPERATOR),
            offer("MP-N", dec!(100.00), OPERATOR),
            offer("MP-Z", dec!(0), OPERATOR),
        ],
        vec![costed("HP-OK", "MP-OK"), inactive, no_cost],
    );
    let engine = PricingEngine::new(&config(dec!(4))).unwrap();
    let gateway = MockGateway::new();
    let dir = reports_dir();

    let (result, push) = run_cycle(&market, &engine, &gateway, &dir).await.unwrap();

    assert_eq!(result.prices.len(), 1);
    assert_eq!(result.prices[0].sku, "HP-OK");
    assert_eq!(push.updated.len(), 1);

    let reasons: Vec<&PricingError> = result.skipped.iter().map(|s| &s.reason).collect();
    assert!(reasons.contains(&&PricingError::InvalidPrice {
        sku: "MP-Z".to_string(),
        price: dec!(0)
    }));
    assert!(reasons.contains(&&PricingError::ReconciliationMiss {
        sku: "MP-X".to_string()
    }));
    assert!(reasons.contains(&&PricingError::Inactive {
        sku: "HP-I".to_string()
    }));
    assert!(reasons.contains(&&PricingError::MissingCostData {
        sku: "HP-N".to_string(),
        field: "cost".to_string()
    }));

    // Skip reasons land in the prices report
    let report: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.join(storage::PRICES_FILE)).unwrap(),
    )
    .unwrap();
    assert_eq!(report["skipped"].as_array().unwrap().len(), 4);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn test_gateway_rejection_is_per_sku() {
    let market = StaticMarketplace::new(
        vec![
            offer("MP-1", dec!(100.00), OPERATOR),
            offer("MP-2", dec!(100.00), OPERATOR),
        ],
        vec![costed("HP-1", "MP-1"), costed("HP-2", "MP-2")],
    );
    let engine = PricingEngine::new(&config(dec!(4))).unwrap();
    let gateway = MockGateway::new();
    gateway.reject("HP-1");
    let dir = reports_dir();

    let (_, push) = run_cycle(&market, &engine, &gateway, &dir).await.unwrap();

    assert!(!push.is_clean());
    assert_eq!(push.failed[0].sku, "HP-1");
    assert_eq!(push.updated[0].sku, "HP-2");
    assert_eq!(gateway.applied().len(), 1);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn test_source_failure_aborts_cycle() {
    let market = StaticMarketplace::new(vec![], vec![]);
    market.set_error("listing page unavailable");
    let engine = PricingEngine::new(&config(dec!(4))).unwrap();
    let gateway = MockGateway::new();
    let dir = reports_dir();

    let err = run_cycle(&market, &engine, &gateway, &dir).await.unwrap_err();
    assert!(err.to_string().contains("listing page unavailable"));
    assert!(gateway.applied().is_empty());
    assert!(!dir.exists());
}

#[tokio::test]
async fn test_gateway_outage_fails_cycle_after_reports() {
    let market = StaticMarketplace::new(
        vec![offer("MP-1", dec!(100.00), OPERATOR)],
        vec![costed("HP-1", "MP-1")],
    );
    let engine = PricingEngine::new(&config(dec!(4))).unwrap();
    let gateway = MockGateway::new();
    gateway.set_error("integrator down");
    let dir = reports_dir();

    assert!(run_cycle(&market, &engine, &gateway, &dir).await.is_err());
    assert!(dir.join(storage::PRICES_FILE).exists());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_invalid_configuration_is_fatal() {
    let err = PricingEngine::new(&PricingConfig {
        multiplier_commission: dec!(-0.1),
        ..PricingConfig::default()
    })
    .err()
    .unwrap();
    assert!(matches!(err, PricingError::InvalidConfiguration { .. }));
}

#[tokio::test]
async fn test_repeated_runs_are_identical() {
    let market = StaticMarketplace::new(
        vec![
            offer("MP-D", dec!(120.00), OPERATOR),
            offer("MP-D", dec!(100.10), "Loja A"),
            offer("MP-E", dec!(60.00), OPERATOR),
            offer("MP-E", dec!(49.99), "Loja B"),
        ],
        vec![costed("HP-D", "MP-D"), costed("HP-E", "MP-E")],
    );
    let engine = PricingEngine::new(&config(dec!(20))).unwrap();

    let first = engine.run(market.catalog(), market.offers());
    let second = engine.run(market.catalog(), market.offers());
    assert_eq!(first, second);
}
