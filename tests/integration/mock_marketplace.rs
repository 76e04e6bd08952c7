//! Mock marketplace for integration testing.
//!
//! Provides deterministic in-memory `ListingSource` / `CatalogSource`
//! implementations and a `PriceGateway` that records every update it
//! receives, with no external dependencies.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use repricer::gateway::{FailedUpdate, GatewayReport, PriceGateway};
use repricer::sources::{CatalogSource, ListingSource};
use repricer::types::*;

pub const OPERATOR: &str = "HAIRPRO";

/// Build an offer with placeholder product metadata.
pub fn offer(sku: &str, price: Decimal, seller: &str) -> Offer {
    Offer {
        sku: sku.to_string(),
        brand: "Acme".to_string(),
        category: "Cabelos".to_string(),
        name: format!("Product {sku}"),
        price,
        seller_name: seller.to_string(),
    }
}

/// Build an active catalog row.
pub fn entry(
    internal_sku: &str,
    external_sku: &str,
    cost: Decimal,
    freight: Decimal,
    input_cost: Decimal,
) -> CatalogEntry {
    CatalogEntry {
        internal_sku: internal_sku.to_string(),
        external_sku: external_sku.to_string(),
        status: CatalogStatus::Active,
        cost: Some(cost),
        freight: Some(freight),
        input_cost: Some(input_cost),
    }
}

/// Serves a fixed set of offers and catalog rows.
pub struct StaticMarketplace {
    offers: Vec<Offer>,
    catalog: Vec<CatalogEntry>,
    /// If set, fetches return this error.
    force_error: Arc<Mutex<Option<String>>>,
}

impl StaticMarketplace {
    pub fn new(offers: Vec<Offer>, catalog: Vec<CatalogEntry>) -> Self {
        Self {
            offers,
            catalog,
            force_error: Arc::new(Mutex::new(None)),
        }
    }

    pub fn offers(&self) -> &[Offer] {
        &self.offers
    }

    pub fn catalog(&self) -> &[CatalogEntry] {
        &self.catalog
    }

    /// Force all subsequent fetches to return an error.
    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    fn check_error(&self) -> Result<()> {
        match self.force_error.lock().unwrap().as_ref() {
            Some(msg) => Err(anyhow!("{msg}")),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ListingSource for StaticMarketplace {
    async fn fetch_offers(&self) -> Result<Vec<Offer>> {
        self.check_error()?;
        Ok(self.offers.clone())
    }

    fn name(&self) -> &str {
        "static-listings"
    }
}

#[async_trait]
impl CatalogSource for StaticMarketplace {
    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>> {
        self.check_error()?;
        Ok(self.catalog.clone())
    }

    fn name(&self) -> &str {
        "static-catalog"
    }
}

/// A gateway that records pushed prices in memory.
///
/// SKUs added with `reject` fail individually; `set_error` fails the whole
/// push.
#[derive(Default)]
pub struct MockGateway {
    applied: Arc<Mutex<Vec<PriceUpdate>>>,
    rejected: Arc<Mutex<HashSet<String>>>,
    force_error: Arc<Mutex<Option<String>>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject(&self, sku: &str) {
        self.rejected.lock().unwrap().insert(sku.to_string());
    }

    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    /// Every update applied so far, across pushes.
    pub fn applied(&self) -> Vec<PriceUpdate> {
        self.applied.lock().unwrap().clone()
    }
}

#[async_trait]
impl PriceGateway for MockGateway {
    async fn push_prices(&self, updates: &[PriceUpdate]) -> Result<GatewayReport> {
        if let Some(msg) = self.force_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{msg}"));
        }

        let rejected = self.rejected.lock().unwrap();
        let mut report = GatewayReport::default();
        for update in updates {
            if rejected.contains(&update.sku) {
                report.failed.push(FailedUpdate {
                    sku: update.sku.clone(),
                    reason: "rejected by mock".to_string(),
                });
            } else {
                self.applied.lock().unwrap().push(update.clone());
                report.updated.push(update.clone());
            }
        }
        Ok(report)
    }

    fn name(&self) -> &str {
        "mock"
    }
}
