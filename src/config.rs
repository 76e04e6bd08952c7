//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (the integrator token) are referenced by env-var name in the
//! config and resolved at runtime via `std::env::var`.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use crate::pricing::PricingConfig;
use crate::storage::DEFAULT_REPORTS_DIR;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub pricing: PricingConfig,
    pub sources: SourcesConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub reports: ReportsConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourcesConfig {
    pub offers_path: PathBuf,
    pub catalog_path: PathBuf,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct GatewayConfig {
    /// When false, prices are only logged.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub base_url: Option<String>,
    /// Name of the env var holding the bearer token.
    #[serde(default)]
    pub api_token_env: Option<String>,
    #[serde(default)]
    pub concurrency: Option<usize>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportsConfig {
    pub dir: PathBuf,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_REPORTS_DIR),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ScheduleConfig {
    /// Re-run every N seconds; absent means a single run.
    #[serde(default)]
    pub every_seconds: Option<u64>,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse configuration from a TOML string.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }

    /// The gateway bearer token, if one is configured.
    pub fn gateway_token(&self) -> Result<Option<SecretString>> {
        match self.gateway.api_token_env.as_deref() {
            Some(env) => Ok(Some(SecretString::new(Self::resolve_env(env)?))),
            None => Ok(None),
        }
    }
}
