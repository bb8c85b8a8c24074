use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use market_data_ingestor::{
    ingest::{IngestStage, ingest_universe},
    models::{
        bar::{BarSeries, DailyBar},
        company::CompanyOverview,
        indicator::{IndicatorPoint, IndicatorRequest, IndicatorSeries, IndicatorSettings},
    },
    providers::{ApiSnafu, DataProvider, ProviderError},
};

/// Serves canned data; symbols listed in `broken` fail at the named stage.
struct FakeProvider {
    broken: HashMap<&'static str, IngestStage>,
}

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
}

impl FakeProvider {
    fn fail_if(&self, symbol: &str, stage: IngestStage) -> Result<(), ProviderError> {
        if self.broken.get(symbol) == Some(&stage) {
            return ApiSnafu {
                symbol,
                message: "Invalid API call",
            }
            .fail();
        }
        Ok(())
    }
}

#[async_trait]
impl DataProvider for FakeProvider {
    async fn fetch_daily(&self, symbol: &str) -> Result<BarSeries, ProviderError> {
        self.fail_if(symbol, IngestStage::Daily)?;
        let bars = (0..3)
            .map(|i| DailyBar {
                date: start() + Days::new(i),
                open: 10.0,
                high: 11.0,
                low: 9.0,
                close: 10.5,
                volume: 1_000.0,
            })
            .collect();
        Ok(BarSeries {
            symbol: symbol.to_string(),
            bars,
        })
    }

    async fn fetch_indicator(
        &self,
        symbol: &str,
        request: IndicatorRequest,
    ) -> Result<IndicatorSeries, ProviderError> {
        self.fail_if(symbol, IngestStage::Indicators)?;
        let points = (0..3)
            .map(|i| IndicatorPoint {
                date: start() + Days::new(i),
                value: f64::from(request.time_period),
            })
            .collect();
        Ok(IndicatorSeries {
            symbol: symbol.to_string(),
            kind: request.kind,
            points,
        })
    }

    async fn fetch_overview(&self, symbol: &str) -> Result<CompanyOverview, ProviderError> {
        self.fail_if(symbol, IngestStage::Overview)?;
        Ok(CompanyOverview {
            symbol: symbol.to_string(),
            name: Some(format!("{symbol} Corp")),
            ..Default::default()
        })
    }
}

fn universe() -> Vec<String> {
    ["META", "AAPL", "MSFT"].map(String::from).to_vec()
}

#[tokio::test]
async fn happy_path_fetches_every_stage() {
    let provider = FakeProvider {
        broken: HashMap::new(),
    };
    let report = ingest_universe(&provider, &universe(), IndicatorSettings::default()).await;

    assert!(report.failures.is_empty());
    assert_eq!(report.daily.len(), 3);
    assert_eq!(report.daily_rows(), 9);
    assert_eq!(report.indicators.len(), 9);
    assert_eq!(report.companies.len(), 3);

    let row = &report.indicators[0];
    assert_eq!((row.sma, row.ema, row.rsi), (Some(10.0), Some(10.0), Some(14.0)));
}

#[tokio::test]
async fn one_failing_symbol_does_not_stop_the_rest() {
    let provider = FakeProvider {
        broken: HashMap::from([("AAPL", IngestStage::Daily), ("MSFT", IngestStage::Indicators)]),
    };
    let report = ingest_universe(&provider, &universe(), IndicatorSettings::default()).await;

    let failed: Vec<_> = report
        .failures
        .iter()
        .map(|f| (f.symbol.as_str(), f.stage))
        .collect();
    assert_eq!(failed, [("AAPL", IngestStage::Daily), ("MSFT", IngestStage::Indicators)]);

    let daily: Vec<_> = report.daily.iter().map(|s| s.symbol.as_str()).collect();
    assert_eq!(daily, ["META", "MSFT"]);
    assert!(report.indicators.iter().all(|r| r.symbol != "MSFT"));
    assert_eq!(report.companies.len(), 3);
    assert!(report.failures[0].message.contains("Invalid API call"));

    assert_eq!(report.failed_symbols(IngestStage::Daily), ["AAPL"]);
    assert_eq!(report.failed_symbols(IngestStage::Indicators), ["MSFT"]);
    assert!(report.failed_symbols(IngestStage::Overview).is_empty());
}
