//! Competitor aggregation.
//!
//! Turns the raw offer list scraped for a batch of product pages into one
//! row per operator SKU: the operator's own price next to the cheapest
//! competing price for the same SKU.

use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::types::Offer;

/// Own price vs. cheapest competitor, before a suggestion is derived.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedOffer {
    /// Marketplace-facing SKU.
    pub sku: String,
    pub own_price: Decimal,
    /// `None` when no competing seller lists this SKU.
    pub competitor_price: Option<Decimal>,
}

pub struct CompetitorAggregator {
    operator_seller_name: String,
}

impl CompetitorAggregator {
    pub fn new(operator_seller_name: impl Into<String>) -> Self {
        Self {
            operator_seller_name: operator_seller_name.into(),
        }
    }

    fn is_own(&self, offer: &Offer) -> bool {
        offer.seller_name == self.operator_seller_name
    }

    /// Aggregate a batch of offers.
    ///
    /// Output follows the order in which the operator's own SKUs first
    /// appear. A repeated own SKU keeps its first price.
    pub fn aggregate(&self, offers: &[Offer]) -> Vec<AggregatedOffer> {
        // Step 1 – exact duplicates come from re-fetching the same page
        let mut seen: HashSet<&Offer> = HashSet::with_capacity(offers.len());
        let unique: Vec<&Offer> = offers.iter().filter(|o| seen.insert(*o)).collect();

        // Step 2 – partition
        let (own, competitors): (Vec<&Offer>, Vec<&Offer>) =
            unique.into_iter().partition(|o| self.is_own(o));

        // Step 3 – cheapest competitor per SKU; strict `<` keeps the first on ties
        let mut cheapest: HashMap<&str, Decimal> = HashMap::new();
        for offer in &competitors {
            cheapest
                .entry(offer.sku.as_str())
                .and_modify(|best| {
                    if offer.price < *best {
                        *best = offer.price;
                    }
                })
                .or_insert(offer.price);
        }

        // Step 4 – one row per own SKU
        let mut emitted: HashSet<&str> = HashSet::new();
        let rows: Vec<AggregatedOffer> = own
            .iter()
            .filter(|o| emitted.insert(o.sku.as_str()))
            .map(|o| AggregatedOffer {
                sku: o.sku.clone(),
                own_price: o.price,
                competitor_price: cheapest.get(o.sku.as_str()).copied(),
            })
            .collect();

        debug!(
            offers_in = offers.len(),
            duplicates = offers.len() - own.len() - competitors.len(),
            own = own.len(),
            competitors = competitors.len(),
            rows = rows.len(),
            "Offers aggregated"
        );

        rows
    }
}
