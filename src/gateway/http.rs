//! HTTP integrator gateway.
//!
//! Pushes each price with `PUT {base_url}/prices/{sku}` and a JSON body
//! `{"price": <number>}`. Auth: `Authorization: Bearer {token}` when a token
//! is configured. Requests run with bounded concurrency; output order
//! follows input order.

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{FailedUpdate, GatewayReport, PriceGateway};
use crate::types::PriceUpdate;

const DEFAULT_CONCURRENCY: usize = 4;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
struct PriceBody {
    price: Decimal,
}

pub struct HttpGateway {
    http: Client,
    base_url: String,
    token: Option<SecretString>,
    concurrency: usize,
}

impl HttpGateway {
    pub fn new(
        base_url: &str,
        token: Option<SecretString>,
        concurrency: Option<usize>,
        timeout_secs: Option<u64>,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)))
            .user_agent("repricer/0.1.0")
            .build()
            .context("Failed to build HTTP client for price gateway")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            concurrency: concurrency.unwrap_or(DEFAULT_CONCURRENCY).max(1),
        })
    }

    fn price_url(&self, sku: &str) -> String {
        format!("{}/prices/{}", self.base_url, urlencoding::encode(sku))
    }

    async fn push_one(&self, update: &PriceUpdate) -> Result<()> {
        let url = self.price_url(&update.sku);
        debug!(url = %url, price = %update.price, "Pushing price");

        let mut req = self.http.put(&url).json(&PriceBody {
            price: update.price,
        });
        if let Some(ref token) = self.token {
            req = req.bearer_auth(token.expose_secret());
        }

        let resp = req.send().await.context("Price update request failed")?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Gateway error {status}: {body}");
        }
        Ok(())
    }
}

#[async_trait]
impl PriceGateway for HttpGateway {
    async fn push_prices(&self, updates: &[PriceUpdate]) -> Result<GatewayReport> {
        info!(count = updates.len(), base_url = %self.base_url, "Pushing prices");

        let pushes: Vec<_> = updates
            .iter()
            .map(|update| async move { (update, self.push_one(update).await) })
            .collect();
        let outcomes: Vec<(&PriceUpdate, Result<()>)> = stream::iter(pushes)
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut report = GatewayReport::default();
        for (update, outcome) in outcomes {
            match outcome {
                Ok(()) => report.updated.push(update.clone()),
                Err(e) => {
                    warn!(sku = %update.sku, error = %e, "Price update failed");
                    report.failed.push(FailedUpdate {
                        sku: update.sku.clone(),
                        reason: format!("{e:#}"),
                    });
                }
            }
        }

        info!(
            updated = report.updated.len(),
            failed = report.failed.len(),
            "Price push complete"
        );
        Ok(report)
    }

    fn name(&self) -> &str {
        "http"
    }
}
