//! SKU reconciliation.
//!
//! Maps marketplace-facing SKUs back to the operator's internal SKUs using
//! the catalog as a one-to-one mapping table.

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::types::{CatalogEntry, PricingError};

/// Hash-indexed view over the catalog, keyed by external SKU.
pub struct SkuReconciler<'a> {
    by_external: HashMap<&'a str, &'a CatalogEntry>,
}

impl<'a> SkuReconciler<'a> {
    /// Index a catalog. When an external SKU appears more than once, an
    /// active row takes precedence over inactive ones; among rows of the
    /// same status the first wins. Inactive rows stay indexed only when no
    /// active row shares their external SKU.
    pub fn new(catalog: &'a [CatalogEntry]) -> Self {
        let mut by_external: HashMap<&'a str, &'a CatalogEntry> =
            HashMap::with_capacity(catalog.len());

        for entry in catalog {
            match by_external.get(entry.external_sku.as_str()) {
                None => {}
                Some(existing) if !existing.is_active() && entry.is_active() => {
                    debug!(
                        external_sku = %entry.external_sku,
                        active = %entry.internal_sku,
                        inactive = %existing.internal_sku,
                        "Active catalog row supersedes inactive one"
                    );
                }
                Some(existing) => {
                    if existing.is_active() == entry.is_active() {
                        warn!(
                            external_sku = %entry.external_sku,
                            kept = %existing.internal_sku,
                            ignored = %entry.internal_sku,
                            "Duplicate external SKU in catalog"
                        );
                    }
                    continue;
                }
            }
            by_external.insert(entry.external_sku.as_str(), entry);
        }

        Self { by_external }
    }

    /// Internal SKU for a marketplace SKU.
    pub fn reconcile(&self, external_sku: &str) -> Result<&'a str, PricingError> {
        self.entry(external_sku).map(|e| e.internal_sku.as_str())
    }

    /// Full catalog row for a marketplace SKU.
    pub fn entry(&self, external_sku: &str) -> Result<&'a CatalogEntry, PricingError> {
        self.by_external
            .get(external_sku)
            .copied()
            .ok_or_else(|| PricingError::ReconciliationMiss {
                sku: external_sku.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.by_external.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_external.is_empty()
    }
}
