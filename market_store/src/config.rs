//! Application configuration: parsing, normalization, and loading.
//!
//! A TOML file describes:
//! - where the SQLite database lives (`database_url`, overridable by `DATABASE_URL`)
//! - the symbol universe to ingest and score
//! - Alpha Vantage connection settings, indicator periods and scoring options
//!
//! Normalization trims and upper-cases symbols and de-duplicates them while
//! preserving order, so `[" aapl", "AAPL", "msft"]` becomes `["AAPL", "MSFT"]`.
//!
//! Entrypoints:
//! - Parse + normalize from a TOML string: [`load_config_str`]
//! - Parse + normalize from a file path: [`load_config_path`]

use std::collections::HashSet;

use anyhow::{Context, bail};
use investment_scoring::ScoringOptions;
use market_data_ingestor::{
    models::indicator::IndicatorSettings, providers::alpha_vantage::AlphaVantageConfig,
};
use serde::{Deserialize, Serialize};
use shared_utils::env::env_override;
use toml::from_str;

/// Environment variable that replaces [`AppConfig::database_url`] when set.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// SQLite path or `sqlite:` URL.
    pub database_url: String,
    /// Tickers to ingest and score, normalized to unique upper-case values.
    pub symbols: Vec<String>,
    /// Vendor connection settings.
    #[serde(default)]
    pub alpha_vantage: AlphaVantageConfig,
    /// Look-back periods of the fetched indicators.
    #[serde(default)]
    pub indicators: IndicatorSettings,
    /// Scoring engine options.
    #[serde(default)]
    pub scoring: ScoringOptions,
}

impl AppConfig {
    /// Applies `DATABASE_URL` from the environment, if set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = env_override(DATABASE_URL_ENV) {
            self.database_url = url;
        }
        self
    }
}

/// Summary of changes performed during normalization.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct NormalizationReport {
    /// Symbols that changed when trimming/upper-casing.
    pub symbols_renamed: usize,
    /// Duplicate symbols removed after normalization.
    pub symbols_deduped: usize,
}

/// Normalize a config in place.
///
/// Errors:
/// - Empty `database_url`
/// - Empty symbol after trimming, or no symbols at all
pub fn normalize_config(cfg: &mut AppConfig) -> anyhow::Result<NormalizationReport> {
    let mut report = NormalizationReport::default();

    cfg.database_url = cfg.database_url.trim().to_string();
    if cfg.database_url.is_empty() {
        bail!("database_url cannot be empty");
    }

    let mut seen = HashSet::new();
    let mut symbols = Vec::with_capacity(cfg.symbols.len());
    for raw in std::mem::take(&mut cfg.symbols) {
        let symbol = raw.trim().to_uppercase();
        if symbol.is_empty() {
            bail!("symbol cannot be empty after trimming");
        }
        if symbol != raw {
            report.symbols_renamed += 1;
        }
        if seen.insert(symbol.clone()) {
            symbols.push(symbol);
        } else {
            report.symbols_deduped += 1;
        }
    }
    if symbols.is_empty() {
        bail!("at least one symbol must be configured");
    }
    cfg.symbols = symbols;
    Ok(report)
}

/// Parse and normalize a config from a TOML string.
pub fn load_config_str(toml_str: &str) -> anyhow::Result<AppConfig> {
    let mut cfg: AppConfig = from_str(toml_str).context("failed to parse config TOML")?;
    let report = normalize_config(&mut cfg).context("normalize_config failed")?;
    tracing::debug!(?report, "config normalized");
    Ok(cfg)
}

/// Read a config TOML file from disk, parse, and normalize it.
///
/// See [`load_config_str`] for details on parsing and normalization.
pub fn load_config_path(path: impl AsRef<std::path::Path>) -> anyhow::Result<AppConfig> {
    let text = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("read config file {}", path.as_ref().display()))?;
    load_config_str(&text)
}
