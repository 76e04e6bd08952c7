//! Pricing engine — competitor aggregation, undercut suggestion, EBITDA
//! projection, and margin-floor escalation.

pub mod aggregator;
pub mod ebitda;
pub mod escalator;
pub mod reconciler;
pub mod suggested;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::types::{
    CatalogEntry, CompetitorComparison, Offer, PricedSku, PricingError, PricingResult, SkippedSku,
};
use aggregator::CompetitorAggregator;
use ebitda::{CostStructure, EbitdaProjector, FeeRates};
use escalator::{EscalatorConfig, PriceEscalator};
use reconciler::SkuReconciler;
use suggested::{SuggestedPriceCalculator, UndercutPolicy};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

fn default_increment() -> Decimal {
    dec!(0.10)
}

fn default_undercut() -> Decimal {
    dec!(0.10)
}

fn default_max_steps() -> u32 {
    10_000
}

/// Pricing parameters, the `[pricing]` table of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    /// Marketplace commission rate (0–1).
    pub multiplier_commission: Decimal,
    /// Administrative fee rate (0–1).
    pub multiplier_admin: Decimal,
    /// Reverse-logistics fee rate (0–1).
    pub multiplier_reverse: Decimal,
    /// EBITDA floor, in percent.
    pub limit_rate_ebitda: Decimal,
    /// Escalation step, in currency units.
    #[serde(default = "default_increment")]
    pub increment_price_new: Decimal,
    /// Seller name identifying the operator's own offers.
    pub operator_seller_name: String,
    /// How far below the cheapest competitor to price.
    #[serde(default = "default_undercut")]
    pub undercut_amount: Decimal,
    #[serde(default)]
    pub undercut_policy: UndercutPolicy,
    #[serde(default = "default_max_steps")]
    pub max_escalation_steps: u32,
    #[serde(default)]
    pub max_price: Option<Decimal>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            multiplier_commission: dec!(0.15),
            multiplier_admin: dec!(0.05),
            multiplier_reverse: dec!(0.003),
            limit_rate_ebitda: dec!(4.0),
            increment_price_new: default_increment(),
            operator_seller_name: "HAIRPRO".to_string(),
            undercut_amount: default_undercut(),
            undercut_policy: UndercutPolicy::Always,
            max_escalation_steps: default_max_steps(),
            max_price: None,
        }
    }
}

impl PricingConfig {
    /// Check every field once, before any row is processed.
    pub fn validate(&self) -> Result<(), PricingError> {
        let rates = [
            ("multiplier_commission", self.multiplier_commission),
            ("multiplier_admin", self.multiplier_admin),
            ("multiplier_reverse", self.multiplier_reverse),
        ];
        for (name, rate) in rates {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(PricingError::config(format!("{name} must be within [0, 1], got {rate}")));
            }
        }

        if self.limit_rate_ebitda < Decimal::ZERO || self.limit_rate_ebitda >= dec!(100) {
            return Err(PricingError::config(format!(
                "limit_rate_ebitda must be within [0, 100), got {}",
                self.limit_rate_ebitda
            )));
        }
        if self.increment_price_new <= Decimal::ZERO {
            return Err(PricingError::config(format!(
                "increment_price_new must be positive, got {}",
                self.increment_price_new
            )));
        }
        if self.undercut_amount < Decimal::ZERO {
            return Err(PricingError::config(format!(
                "undercut_amount must not be negative, got {}",
                self.undercut_amount
            )));
        }
        if self.operator_seller_name.trim().is_empty() {
            return Err(PricingError::config("operator_seller_name must not be empty"));
        }
        if self.max_escalation_steps == 0 {
            return Err(PricingError::config("max_escalation_steps must be at least 1"));
        }
        if let Some(max) = self.max_price {
            if max <= Decimal::ZERO {
                return Err(PricingError::config(format!("max_price must be positive, got {max}")));
            }
        }
        Ok(())
    }

    pub fn fee_rates(&self) -> FeeRates {
        FeeRates {
            commission: self.multiplier_commission,
            admin: self.multiplier_admin,
            reverse: self.multiplier_reverse,
        }
    }

    pub fn escalator_config(&self) -> EscalatorConfig {
        EscalatorConfig {
            limit_rate_ebitda: self.limit_rate_ebitda,
            increment: self.increment_price_new,
            max_steps: self.max_escalation_steps,
            max_price: self.max_price,
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Runs aggregation → suggestion → reconciliation → projection →
/// escalation over one snapshot of offers and catalog.
///
/// Holds no state between runs: the same inputs always produce the same
/// result.
pub struct PricingEngine {
    aggregator: CompetitorAggregator,
    suggester: SuggestedPriceCalculator,
    escalator: PriceEscalator,
}

impl PricingEngine {
    /// Build an engine from a validated configuration.
    pub fn new(config: &PricingConfig) -> Result<Self, PricingError> {
        config.validate()?;

        let escalator = PriceEscalator::new(
            EbitdaProjector::new(config.fee_rates()),
            config.escalator_config(),
        );
        if !escalator.is_reachable() {
            warn!(
                limit_rate_ebitda = %config.limit_rate_ebitda,
                fee_rates = %config.fee_rates().total(),
                "EBITDA floor is above the asymptotic margin; every escalation will be abandoned"
            );
        }

        Ok(Self {
            aggregator: CompetitorAggregator::new(config.operator_seller_name.clone()),
            suggester: SuggestedPriceCalculator::new(config.undercut_amount, config.undercut_policy),
            escalator,
        })
    }

    /// Price one batch.
    ///
    /// Row-level failures land in `PricingResult::skipped`; they never abort
    /// the batch. Skipped SKUs are marketplace SKUs up to reconciliation and
    /// internal SKUs after it.
    pub fn run(&self, catalog: &[CatalogEntry], offers: &[Offer]) -> PricingResult {
        let mut result = PricingResult::empty();

        // Step 1 – aggregate offers per own SKU
        let aggregated = self.aggregator.aggregate(offers);

        // Step 2 – suggested prices (the comparison table)
        for row in &aggregated {
            match self.suggester.suggest(row) {
                Ok(comparison) => result.comparisons.push(comparison),
                Err(reason) => record_skip(&mut result.skipped, &row.sku, reason),
            }
        }

        // Step 3 – reconcile, project, escalate
        let reconciler = SkuReconciler::new(catalog);
        let mut prices = Vec::with_capacity(result.comparisons.len());
        for comparison in &result.comparisons {
            match self.price_row(&reconciler, comparison) {
                Ok(priced) => prices.push(priced),
                Err((sku, reason)) => record_skip(&mut result.skipped, &sku, reason),
            }
        }
        result.prices = prices;

        info!(
            offers = offers.len(),
            catalog = catalog.len(),
            compared = result.comparisons.len(),
            priced = result.prices.len(),
            skipped = result.skipped.len(),
            "Pricing run complete"
        );

        result
    }

    /// Reconcile and escalate one comparison row. The error carries the
    /// SKU the failure is reported under.
    fn price_row(
        &self,
        reconciler: &SkuReconciler<'_>,
        comparison: &CompetitorComparison,
    ) -> Result<PricedSku, (String, PricingError)> {
        let entry = reconciler
            .entry(&comparison.sku)
            .map_err(|e| (comparison.sku.clone(), e))?;

        let internal_sku = entry.internal_sku.clone();
        let tag = |e: PricingError| (internal_sku.clone(), e);

        if !entry.is_active() {
            return Err(tag(PricingError::Inactive {
                sku: entry.internal_sku.clone(),
            }));
        }

        let costs = CostStructure::from_entry(entry).map_err(tag)?;
        let escalation = self
            .escalator
            .escalate(&entry.internal_sku, comparison.suggested_price, &costs)
            .and_then(|e| e.into_result())
            .map_err(tag)?;

        debug!(
            sku = %entry.internal_sku,
            external_sku = %comparison.sku,
            suggested = %comparison.suggested_price,
            price = %escalation.row.price,
            ebitda_pct = %escalation.row.ebitda_pct,
            steps = escalation.steps,
            "SKU priced"
        );

        Ok(PricedSku {
            sku: entry.internal_sku.clone(),
            external_sku: comparison.sku.clone(),
            price: escalation.row.price,
            ebitda: escalation.row,
            steps: escalation.steps,
        })
    }
}

/// Record a skipped row, logged at the severity its reason deserves.
fn record_skip(skipped: &mut Vec<SkippedSku>, sku: &str, reason: PricingError) {
    if reason.is_warning() {
        warn!(sku, reason = %reason, "SKU skipped");
    } else {
        info!(sku, reason = %reason, "SKU skipped");
    }
    skipped.push(SkippedSku {
        sku: sku.to_string(),
        reason,
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
