//! Input sources.
//!
//! Defines the `ListingSource` and `CatalogSource` traits and provides
//! file-backed implementations:
//! - `listing` — competitor offers, flat or in the marketplace's
//!   add-to-cart payload shape
//! - `catalog` — the operator's own catalog rows

pub mod catalog;
pub mod listing;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{CatalogEntry, Offer};

/// Supplies the raw offers scraped for a batch of product pages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch_offers(&self) -> Result<Vec<Offer>>;

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// Supplies the operator's catalog (SKU mapping, status and costs).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>>;

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// Fetch both inputs of a pricing run concurrently.
pub async fn load_snapshot(
    listings: &dyn ListingSource,
    catalog: &dyn CatalogSource,
) -> Result<(Vec<CatalogEntry>, Vec<Offer>)> {
    let (catalog, offers) = tokio::try_join!(catalog.fetch_catalog(), listings.fetch_offers())?;
    Ok((catalog, offers))
}
