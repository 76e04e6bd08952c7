//! File-backed listing source.
//!
//! Reads a JSON array of offers. Each element is either a flat `Offer` or
//! the object the marketplace embeds in the `data-sku` attribute of its
//! add-to-cart buttons, where the seller is nested:
//!
//! ```json
//! {"sku": "MP-1", "brand": "..", "category": "..", "name": "..",
//!  "price": 49.99, "seller": {"id": 12, "name": "Loja A"}}
//! ```

use anyhow::{Context, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{debug, info};

use super::ListingSource;
use crate::types::Offer;

/// Seller block of the marketplace payload.
#[derive(Debug, Deserialize)]
struct PayloadSeller {
    name: String,
}

/// One listing element, flat or marketplace-shaped.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawListing {
    Flat(Offer),
    Marketplace {
        sku: String,
        #[serde(default)]
        brand: String,
        #[serde(default)]
        category: String,
        #[serde(default)]
        name: String,
        price: Decimal,
        seller: PayloadSeller,
    },
}

impl From<RawListing> for Offer {
    fn from(raw: RawListing) -> Self {
        match raw {
            RawListing::Flat(offer) => offer,
            RawListing::Marketplace {
                sku,
                brand,
                category,
                name,
                price,
                seller,
            } => Offer {
                sku,
                brand,
                category,
                name,
                price,
                seller_name: seller.name,
            },
        }
    }
}

/// Parse a JSON array of listings.
pub fn parse_offers(json: &str) -> Result<Vec<Offer>> {
    let raw: Vec<RawListing> =
        serde_json::from_str(json).context("Failed to parse listing payload")?;
    Ok(raw.into_iter().map(Offer::from).collect())
}

pub struct JsonListingSource {
    path: PathBuf,
}

impl JsonListingSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ListingSource for JsonListingSource {
    async fn fetch_offers(&self) -> Result<Vec<Offer>> {
        debug!(path = %self.path.display(), "Reading offers");
        let json = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read offers from {}", self.path.display()))?;
        let offers = parse_offers(&json)
            .with_context(|| format!("Invalid offers file {}", self.path.display()))?;
        info!(path = %self.path.display(), count = offers.len(), "Offers loaded");
        Ok(offers)
    }

    fn name(&self) -> &str {
        "json-listing"
    }
}
