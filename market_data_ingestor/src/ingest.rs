//! Pulls the whole symbol universe through a [`DataProvider`].
//!
//! Symbols are fetched one after another (the vendor quota is per key, not
//! per connection). A failure on one symbol is logged and recorded, and the
//! remaining symbols still run.

use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use crate::{
    models::{
        bar::BarSeries,
        company::CompanyOverview,
        indicator::{IndicatorSettings, TechnicalIndicatorRow, combine_indicators},
    },
    providers::{DataProvider, ProviderError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestStage {
    Daily,
    Indicators,
    Overview,
}

impl fmt::Display for IngestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IngestStage::Daily => "daily",
            IngestStage::Indicators => "indicators",
            IngestStage::Overview => "overview",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestFailure {
    pub symbol: String,
    pub stage: IngestStage,
    pub message: String,
}

/// Everything fetched in one run. Stages of one symbol succeed or fail
/// independently.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub daily: Vec<BarSeries>,
    pub indicators: Vec<TechnicalIndicatorRow>,
    pub companies: Vec<CompanyOverview>,
    pub failures: Vec<IngestFailure>,
}

impl IngestReport {
    pub fn daily_rows(&self) -> usize {
        self.daily.iter().map(|s| s.bars.len()).sum()
    }

    /// Symbols whose `stage` failed, in universe order.
    pub fn failed_symbols(&self, stage: IngestStage) -> Vec<&str> {
        self.failures
            .iter()
            .filter(|f| f.stage == stage)
            .map(|f| f.symbol.as_str())
            .collect()
    }

    fn record(&mut self, symbol: &str, stage: IngestStage, err: ProviderError) {
        warn!(symbol, %stage, error = %err, "ingestion stage failed");
        self.failures.push(IngestFailure {
            symbol: symbol.to_string(),
            stage,
            message: err.to_string(),
        });
    }
}

async fn fetch_indicators(
    provider: &dyn DataProvider,
    symbol: &str,
    settings: IndicatorSettings,
) -> Result<Vec<TechnicalIndicatorRow>, ProviderError> {
    let [sma, ema, rsi] = settings.requests();
    let sma = provider.fetch_indicator(symbol, sma).await?;
    let ema = provider.fetch_indicator(symbol, ema).await?;
    let rsi = provider.fetch_indicator(symbol, rsi).await?;
    Ok(combine_indicators(symbol, &sma, &ema, &rsi))
}

pub async fn ingest_universe(
    provider: &dyn DataProvider,
    symbols: &[String],
    settings: IndicatorSettings,
) -> IngestReport {
    let mut report = IngestReport::default();

    for symbol in symbols {
        match provider.fetch_daily(symbol).await {
            Ok(series) => {
                info!(symbol = %symbol, bars = series.bars.len(), "daily bars fetched");
                report.daily.push(series);
            }
            Err(err) => report.record(symbol, IngestStage::Daily, err),
        }

        match fetch_indicators(provider, symbol, settings).await {
            Ok(rows) => {
                info!(symbol = %symbol, rows = rows.len(), "technical indicators fetched");
                report.indicators.extend(rows);
            }
            Err(err) => report.record(symbol, IngestStage::Indicators, err),
        }

        match provider.fetch_overview(symbol).await {
            Ok(overview) => report.companies.push(overview),
            Err(err) => report.record(symbol, IngestStage::Overview, err),
        }
    }

    info!(
        symbols = symbols.len(),
        daily_rows = report.daily_rows(),
        indicator_rows = report.indicators.len(),
        failures = report.failures.len(),
        "ingestion finished"
    );
    report
}
