//! Shared types for the repricer.
//!
//! These types form the data model used across all modules: marketplace
//! offers, catalog rows, the derived comparison and EBITDA tables, and the
//! final pricing result. Every value here is a snapshot; nothing is mutated
//! after a pricing run produces it.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Offer
// ---------------------------------------------------------------------------

/// A single seller's listing for a product on the marketplace.
///
/// Several offers usually share a `sku`, one per competing seller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Offer {
    /// Marketplace-facing SKU.
    pub sku: String,
    pub brand: String,
    pub category: String,
    pub name: String,
    pub price: Decimal,
    pub seller_name: String,
}

impl fmt::Display for Offer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} @ {:.2} by {}",
            self.sku, self.brand, self.name, self.price, self.seller_name,
        )
    }
}

impl Offer {
    /// Helper to build a test offer with sensible defaults.
    #[cfg(test)]
    pub fn sample(sku: &str, price: Decimal, seller_name: &str) -> Self {
        Offer {
            sku: sku.to_string(),
            brand: "Acme".to_string(),
            category: "Cabelos".to_string(),
            name: format!("Product {sku}"),
            price,
            seller_name: seller_name.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Lifecycle status of a catalog row. Only `Active` rows are priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogStatus {
    Active,
    Inactive,
}

impl fmt::Display for CatalogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogStatus::Active => write!(f, "ACTIVE"),
            CatalogStatus::Inactive => write!(f, "INACTIVE"),
        }
    }
}

/// Parse a status string (case-insensitive, Portuguese spellings accepted).
impl FromStr for CatalogStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" | "ativo" | "enabled" => Ok(CatalogStatus::Active),
            "inactive" | "inativo" | "disabled" => Ok(CatalogStatus::Inactive),
            _ => Err(anyhow::anyhow!("Unknown catalog status: {s}")),
        }
    }
}

impl<'de> Deserialize<'de> for CatalogStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One row of the operator's own catalog.
///
/// Cost fields are optional: partially-populated catalogs are normal and
/// rows with a missing amount are excluded from EBITDA projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub internal_sku: String,
    pub external_sku: String,
    pub status: CatalogStatus,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub cost: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub freight: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub input_cost: Option<Decimal>,
}

impl CatalogEntry {
    pub fn is_active(&self) -> bool {
        self.status == CatalogStatus::Active
    }

    /// Helper to build a fully-costed active catalog row for tests.
    #[cfg(test)]
    pub fn sample(internal_sku: &str, external_sku: &str) -> Self {
        use rust_decimal_macros::dec;
        CatalogEntry {
            internal_sku: internal_sku.to_string(),
            external_sku: external_sku.to_string(),
            status: CatalogStatus::Active,
            cost: Some(dec!(40)),
            freight: Some(dec!(5)),
            input_cost: Some(dec!(5)),
        }
    }
}

/// Parse a monetary amount as it appears in spreadsheet exports.
///
/// Accepts `12.50`, `12,50` and surrounding whitespace. Empty strings and
/// the literal `None`/`NaN` read as missing.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("none")
        || trimmed.eq_ignore_ascii_case("nan")
    {
        return None;
    }
    Decimal::from_str(&trimmed.replace(',', ".")).ok()
}

fn lenient_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Decimal>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Number(f64),
        Text(String),
    }

    let raw: Option<RawAmount> = Option::deserialize(deserializer)?;
    Ok(match raw {
        None => None,
        Some(RawAmount::Number(n)) => Decimal::from_str(&n.to_string()).ok(),
        Some(RawAmount::Text(s)) => parse_amount(&s),
    })
}

// ---------------------------------------------------------------------------
// Derived tables
// ---------------------------------------------------------------------------

/// Own price vs. cheapest competitor for one marketplace SKU.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetitorComparison {
    /// Marketplace-facing SKU.
    pub sku: String,
    pub own_price: Decimal,
    /// `None` when no competitor lists this SKU.
    pub competitor_price: Option<Decimal>,
    pub suggested_price: Decimal,
    /// Percentage change from `own_price` to `suggested_price`.
    pub gain_pct: Decimal,
}

impl fmt::Display for CompetitorComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let competitor = match self.competitor_price {
            Some(p) => format!("{p:.2}"),
            None => "none".to_string(),
        };
        write!(
            f,
            "{} own={:.2} competitor={} suggested={:.2} ({:+.2}%)",
            self.sku, self.own_price, competitor, self.suggested_price, self.gain_pct,
        )
    }
}

/// EBITDA projection of one internal SKU at a given price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EbitdaRow {
    /// Internal SKU.
    pub sku: String,
    pub price: Decimal,
    pub commission: Decimal,
    pub admin_fee: Decimal,
    pub reverse_fee: Decimal,
    pub ebitda_abs: Decimal,
    pub ebitda_pct: Decimal,
}

impl fmt::Display for EbitdaRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ {:.2}: ebitda={:.2} ({}%) [comm={:.2} admin={:.2} rev={:.2}]",
            self.sku,
            self.price,
            self.ebitda_abs,
            self.ebitda_pct.normalize(),
            self.commission,
            self.admin_fee,
            self.reverse_fee,
        )
    }
}

// ---------------------------------------------------------------------------
// Pricing result
// ---------------------------------------------------------------------------

/// Final, margin-valid price for one internal SKU.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricedSku {
    /// Internal SKU (what the marketplace gateway is keyed on).
    pub sku: String,
    pub external_sku: String,
    pub price: Decimal,
    /// Projection at the final price.
    pub ebitda: EbitdaRow,
    /// Number of escalation increments applied to the suggested price.
    pub steps: u32,
}

/// A SKU that did not make it into the price table, and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedSku {
    pub sku: String,
    pub reason: PricingError,
}

impl fmt::Display for SkippedSku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.sku, self.reason)
    }
}

/// Price pushed to the marketplace gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdate {
    pub sku: String,
    pub price: Decimal,
}

/// Output of one pricing run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingResult {
    /// Final price table (drives marketplace updates).
    pub prices: Vec<PricedSku>,
    /// Competitor comparison table (used for reporting).
    pub comparisons: Vec<CompetitorComparison>,
    /// Every row dropped along the way, with its reason.
    pub skipped: Vec<SkippedSku>,
}

impl PricingResult {
    pub fn empty() -> Self {
        Self {
            prices: Vec::new(),
            comparisons: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// The `{sku, price}` mapping consumed by the marketplace gateway.
    pub fn price_updates(&self) -> Vec<PriceUpdate> {
        self.prices
            .iter()
            .map(|p| PriceUpdate {
                sku: p.sku.clone(),
                price: p.price,
            })
            .collect()
    }

    /// Final price for an internal SKU, if it was priced.
    pub fn price_for(&self, sku: &str) -> Option<Decimal> {
        self.prices.iter().find(|p| p.sku == sku).map(|p| p.price)
    }
}

impl fmt::Display for PricingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} priced | {} compared | {} skipped",
            self.prices.len(),
            self.comparisons.len(),
            self.skipped.len(),
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Pricing failures.
///
/// Only `InvalidConfiguration` is fatal; every other variant is a row-level
/// condition recorded in `PricingResult::skipped`.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PricingError {
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("Invalid own price for {sku}: {price}")]
    InvalidPrice { sku: String, price: Decimal },

    #[error("No catalog entry for marketplace SKU {sku}")]
    ReconciliationMiss { sku: String },

    #[error("Catalog entry {sku} is not active")]
    Inactive { sku: String },

    #[error("Missing {field} for {sku}")]
    MissingCostData { sku: String, field: String },

    #[error("Non-positive price {price} for {sku}, EBITDA percentage undefined")]
    NonPositivePrice { sku: String, price: Decimal },

    #[error("Escalation abandoned for {sku} after {steps} steps at {last_price:.2} (ebitda {last_ebitda_pct}%)")]
    EscalationAbandoned {
        sku: String,
        last_price: Decimal,
        last_ebitda_pct: Decimal,
        steps: u32,
    },
}

impl PricingError {
    pub fn config(message: impl Into<String>) -> Self {
        PricingError::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Whether this condition deserves a warning rather than an info line.
    /// Missing cost data and inactive rows are steady state for a
    /// partially-populated catalog.
    pub fn is_warning(&self) -> bool {
        !matches!(
            self,
            PricingError::MissingCostData { .. } | PricingError::Inactive { .. }
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
