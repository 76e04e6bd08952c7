//! Suggested price derivation.
//!
//! Undercuts the cheapest competitor by a fixed monetary amount. With no
//! competitor on the page there is nothing to react to and the current
//! price is kept.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use super::aggregator::AggregatedOffer;
use crate::types::{CompetitorComparison, PricingError};

/// What to do when the operator already sells below the cheapest competitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndercutPolicy {
    /// Always price at `competitor - undercut`, even when that raises the
    /// price of an already-cheaper listing.
    #[default]
    Always,
    /// Keep the current price when it is already below the competitor.
    KeepWhenCheaper,
}

pub struct SuggestedPriceCalculator {
    undercut_amount: Decimal,
    policy: UndercutPolicy,
}

impl SuggestedPriceCalculator {
    pub fn new(undercut_amount: Decimal, policy: UndercutPolicy) -> Self {
        Self {
            undercut_amount,
            policy,
        }
    }

    /// Derive the suggested price and gain for one aggregated row.
    pub fn suggest(&self, row: &AggregatedOffer) -> Result<CompetitorComparison, PricingError> {
        if row.own_price <= Decimal::ZERO {
            return Err(PricingError::InvalidPrice {
                sku: row.sku.clone(),
                price: row.own_price,
            });
        }

        let suggested_price = match row.competitor_price {
            None => row.own_price,
            Some(competitor) => match self.policy {
                UndercutPolicy::KeepWhenCheaper if row.own_price < competitor => row.own_price,
                _ => (competitor - self.undercut_amount).round_dp(2),
            },
        };

        let gain_pct = ((suggested_price / row.own_price - Decimal::ONE) * dec!(100)).round_dp(2);

        Ok(CompetitorComparison {
            sku: row.sku.clone(),
            own_price: row.own_price,
            competitor_price: row.competitor_price,
            suggested_price,
            gain_pct,
        })
    }
}
