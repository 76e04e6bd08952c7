//! EBITDA projection.
//!
//! Marketplace fees (commission, administrative, reverse logistics) scale
//! with price and are rounded to cents individually before being deducted.
//! The percentage is rounded to three places of the ratio before scaling to
//! percent, so `29.7` rather than `29.70297..`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{CatalogEntry, EbitdaRow, PricingError};

/// Fully-populated cost structure of one product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostStructure {
    pub cost: Decimal,
    pub freight: Decimal,
    pub input_cost: Decimal,
}

impl CostStructure {
    /// Extract the costs of a catalog row. The first missing field is
    /// reported as `MissingCostData`.
    pub fn from_entry(entry: &CatalogEntry) -> Result<Self, PricingError> {
        let require = |value: Option<Decimal>, field: &str| {
            value.ok_or_else(|| PricingError::MissingCostData {
                sku: entry.internal_sku.clone(),
                field: field.to_string(),
            })
        };

        Ok(Self {
            cost: require(entry.cost, "cost")?,
            freight: require(entry.freight, "freight")?,
            input_cost: require(entry.input_cost, "input_cost")?,
        })
    }
}

/// Fee rates applied to the sale price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeRates {
    pub commission: Decimal,
    pub admin: Decimal,
    pub reverse: Decimal,
}

impl FeeRates {
    pub fn total(&self) -> Decimal {
        self.commission + self.admin + self.reverse
    }
}

#[derive(Debug, Clone)]
pub struct EbitdaProjector {
    rates: FeeRates,
}

impl EbitdaProjector {
    pub fn new(rates: FeeRates) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &FeeRates {
        &self.rates
    }

    /// Project a catalog row at `price`.
    pub fn project(&self, entry: &CatalogEntry, price: Decimal) -> Result<EbitdaRow, PricingError> {
        let costs = CostStructure::from_entry(entry)?;
        self.project_costs(&entry.internal_sku, price, &costs)
    }

    /// Project a known cost structure at `price`.
    pub fn project_costs(
        &self,
        sku: &str,
        price: Decimal,
        costs: &CostStructure,
    ) -> Result<EbitdaRow, PricingError> {
        if price <= Decimal::ZERO {
            return Err(PricingError::NonPositivePrice {
                sku: sku.to_string(),
                price,
            });
        }

        let commission = (price * self.rates.commission).round_dp(2);
        let admin_fee = (price * self.rates.admin).round_dp(2);
        let reverse_fee = (price * self.rates.reverse).round_dp(2);

        let ebitda_abs = price
            - costs.cost
            - costs.freight
            - costs.input_cost
            - commission
            - admin_fee
            - reverse_fee;
        let ebitda_pct = (ebitda_abs / price).round_dp(3) * dec!(100);

        Ok(EbitdaRow {
            sku: sku.to_string(),
            price,
            commission,
            admin_fee,
            reverse_fee,
            ebitda_abs,
            ebitda_pct,
        })
    }
}
