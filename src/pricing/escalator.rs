//! Margin-floor price escalation.
//!
//! Raises a price in fixed increments until the projected EBITDA percentage
//! reaches the configured floor. Fees grow with price, so the floor is only
//! reachable when `1 - fee_rates > floor / 100`; the walk is therefore
//! bounded by a step cap and an optional price ceiling.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use super::ebitda::{CostStructure, EbitdaProjector};
use crate::types::{EbitdaRow, PricingError};

/// Per-SKU escalation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationState {
    BelowTarget,
    /// Terminal: the floor is met.
    Converged,
    /// Terminal: the step cap or price ceiling was hit first.
    Abandoned,
}

/// Outcome of escalating one SKU.
#[derive(Debug, Clone, PartialEq)]
pub struct Escalation {
    pub state: EscalationState,
    /// Projection at the last price tried.
    pub row: EbitdaRow,
    /// Increments applied to the starting price.
    pub steps: u32,
}

impl Escalation {
    pub fn is_converged(&self) -> bool {
        self.state == EscalationState::Converged
    }

    /// Turn an abandoned walk into the matching row-level error.
    pub fn into_result(self) -> Result<Escalation, PricingError> {
        if self.is_converged() {
            return Ok(self);
        }
        Err(PricingError::EscalationAbandoned {
            sku: self.row.sku,
            last_price: self.row.price,
            last_ebitda_pct: self.row.ebitda_pct,
            steps: self.steps,
        })
    }
}

/// Escalator bounds and step.
#[derive(Debug, Clone)]
pub struct EscalatorConfig {
    /// Minimum EBITDA percentage (e.g. `4.0` for 4%).
    pub limit_rate_ebitda: Decimal,
    /// Monetary step added per iteration.
    pub increment: Decimal,
    pub max_steps: u32,
    /// Never propose a price above this.
    pub max_price: Option<Decimal>,
}

impl Default for EscalatorConfig {
    fn default() -> Self {
        Self {
            limit_rate_ebitda: dec!(4.0),
            increment: dec!(0.10),
            max_steps: 10_000,
            max_price: None,
        }
    }
}

pub struct PriceEscalator {
    projector: EbitdaProjector,
    config: EscalatorConfig,
}

impl PriceEscalator {
    pub fn new(projector: EbitdaProjector, config: EscalatorConfig) -> Self {
        Self { projector, config }
    }

    /// Whether the floor can ever be met with these fee rates.
    pub fn is_reachable(&self) -> bool {
        Decimal::ONE - self.projector.rates().total() > self.config.limit_rate_ebitda / dec!(100)
    }

    /// Escalate `start_price` for one SKU.
    ///
    /// Errors only when the starting price itself cannot be projected; an
    /// unreachable floor is reported through `EscalationState::Abandoned`.
    pub fn escalate(
        &self,
        sku: &str,
        start_price: Decimal,
        costs: &CostStructure,
    ) -> Result<Escalation, PricingError> {
        let mut current = Escalation {
            state: EscalationState::BelowTarget,
            row: self.projector.project_costs(sku, start_price, costs)?,
            steps: 0,
        };

        while current.state == EscalationState::BelowTarget {
            current = self.step(current, costs)?;
        }

        debug!(
            sku,
            start = %start_price,
            price = %current.row.price,
            ebitda_pct = %current.row.ebitda_pct,
            steps = current.steps,
            state = ?current.state,
            "Escalation finished"
        );

        Ok(current)
    }

    /// One transition of the state machine.
    fn step(&self, current: Escalation, costs: &CostStructure) -> Result<Escalation, PricingError> {
        if current.row.ebitda_pct >= self.config.limit_rate_ebitda {
            return Ok(Escalation {
                state: EscalationState::Converged,
                ..current
            });
        }

        // Overflowing the representable range counts as hitting the ceiling
        let next_price = match current.row.price.checked_add(self.config.increment) {
            Some(price) if current.steps < self.config.max_steps => price,
            _ => {
                return Ok(Escalation {
                    state: EscalationState::Abandoned,
                    ..current
                })
            }
        };
        if self.config.max_price.is_some_and(|max| next_price > max) {
            return Ok(Escalation {
                state: EscalationState::Abandoned,
                ..current
            });
        }

        Ok(Escalation {
            state: EscalationState::BelowTarget,
            row: self.projector.project_costs(&current.row.sku, next_price, costs)?,
            steps: current.steps + 1,
        })
    }
}
