//! Marketplace price gateway.
//!
//! Defines the `PriceGateway` trait that receives the final price table and
//! provides a dry-run implementation. The HTTP integrator client lives in
//! `http`.

pub mod http;

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::info;

use crate::types::PriceUpdate;

// ---------------------------------------------------------------------------
// Push report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct FailedUpdate {
    pub sku: String,
    pub reason: String,
}

/// Outcome of pushing a batch of prices.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GatewayReport {
    pub updated: Vec<PriceUpdate>,
    pub failed: Vec<FailedUpdate>,
}

impl GatewayReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Receives final prices for remote update.
///
/// A failure on one SKU is recorded in the report and never aborts the
/// rest of the batch; `Err` is reserved for failures of the whole push.
#[async_trait]
pub trait PriceGateway: Send + Sync {
    async fn push_prices(&self, updates: &[PriceUpdate]) -> Result<GatewayReport>;

    /// Gateway name for logging.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Dry run
// ---------------------------------------------------------------------------

/// Logs every update and reports it as applied.
pub struct DryRunGateway;

#[async_trait]
impl PriceGateway for DryRunGateway {
    async fn push_prices(&self, updates: &[PriceUpdate]) -> Result<GatewayReport> {
        let mut total = Decimal::ZERO;
        for update in updates {
            info!(sku = %update.sku, price = %update.price, "[DRY RUN] Would update price");
            total = total.saturating_add(update.price);
        }
        info!(count = updates.len(), total = %total, "[DRY RUN] Price batch complete");

        Ok(GatewayReport {
            updated: updates.to_vec(),
            failed: Vec::new(),
        })
    }

    fn name(&self) -> &str {
        "dry-run"
    }
}
