//! File-backed catalog source.
//!
//! Reads a JSON array of catalog rows exported from the operator's product
//! sheet. Amounts are parsed leniently (see `types::parse_amount`).

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

use super::CatalogSource;
use crate::types::CatalogEntry;

pub struct JsonCatalogSource {
    path: PathBuf,
}

impl JsonCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for JsonCatalogSource {
    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>> {
        let json = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read catalog from {}", self.path.display()))?;
        let entries: Vec<CatalogEntry> = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse catalog {}", self.path.display()))?;

        let active = entries.iter().filter(|e| e.is_active()).count();
        info!(
            path = %self.path.display(),
            rows = entries.len(),
            active,
            "Catalog loaded"
        );
        Ok(entries)
    }

    fn name(&self) -> &str {
        "json-catalog"
    }
}
