//! Report persistence.
//!
//! Writes the two reports of a pricing run as JSON files: the competitor
//! comparison table and the new price table (with skipped SKUs). Reports
//! from the previous run are cleared first so the directory only ever
//! holds the latest run.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::types::{CompetitorComparison, PricedSku, PricingResult, SkippedSku};

/// Default reports directory.
pub const DEFAULT_REPORTS_DIR: &str = "reports";

pub const COMPETITORS_FILE: &str = "competitors.json";
pub const PRICES_FILE: &str = "new_prices.json";

#[derive(Debug, Serialize)]
struct CompetitorsReport<'a> {
    run_id: Uuid,
    generated_at: DateTime<Utc>,
    rows: &'a [CompetitorComparison],
}

#[derive(Debug, Serialize)]
struct PricesReport<'a> {
    run_id: Uuid,
    generated_at: DateTime<Utc>,
    prices: &'a [PricedSku],
    skipped: &'a [SkippedSku],
}

/// Paths of the files written for one run.
#[derive(Debug, Clone)]
pub struct WrittenReports {
    pub run_id: Uuid,
    pub competitors: PathBuf,
    pub prices: PathBuf,
}

/// Remove the previous run's report files. Other files are left alone.
pub fn clear_reports(dir: &Path) -> Result<()> {
    for name in [COMPETITORS_FILE, PRICES_FILE] {
        let path = dir.join(name);
        if path.exists() {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!(path = %path.display(), error = %e, "Failed to delete old report");
            }
        }
    }
    Ok(())
}

/// Write both reports for `result` into `dir`, creating it if needed.
pub fn write_reports(result: &PricingResult, dir: &Path) -> Result<WrittenReports> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create reports dir {}", dir.display()))?;
    clear_reports(dir)?;

    let run_id = Uuid::new_v4();
    let generated_at = Utc::now();

    let competitors = dir.join(COMPETITORS_FILE);
    write_json(
        &competitors,
        &CompetitorsReport {
            run_id,
            generated_at,
            rows: &result.comparisons,
        },
    )?;

    let prices = dir.join(PRICES_FILE);
    write_json(
        &prices,
        &PricesReport {
            run_id,
            generated_at,
            prices: &result.prices,
            skipped: &result.skipped,
        },
    )?;

    info!(
        run_id = %run_id,
        dir = %dir.display(),
        priced = result.prices.len(),
        compared = result.comparisons.len(),
        "Reports written"
    );

    Ok(WrittenReports {
        run_id,
        competitors,
        prices,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialise report")?;
    std::fs::write(path, &json).context(format!("Failed to write report to {}", path.display()))?;
    debug!(path = %path.display(), bytes = json.len(), "Report saved");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
