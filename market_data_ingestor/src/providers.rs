//! Provider abstraction for market data sources.
//!
//! This module defines the [`DataProvider`] trait, the interface the ingestion
//! job uses to pull daily bars, vendor-computed technical indicators and
//! company fundamentals from a market data vendor.
//!
//! The trait is designed for async usage and supports dynamic dispatch
//! (`dyn DataProvider`), which is how tests substitute an in-memory fake.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use market_data_ingestor::models::{
//!     bar::BarSeries,
//!     company::CompanyOverview,
//!     indicator::{IndicatorRequest, IndicatorSeries},
//! };
//! use market_data_ingestor::providers::{DataProvider, ProviderError};
//!
//! struct MyProvider;
//!
//! #[async_trait]
//! impl DataProvider for MyProvider {
//!     async fn fetch_daily(&self, symbol: &str) -> Result<BarSeries, ProviderError> {
//!         Ok(BarSeries { symbol: symbol.to_string(), bars: vec![] })
//!     }
//!
//!     async fn fetch_indicator(
//!         &self,
//!         symbol: &str,
//!         request: IndicatorRequest,
//!     ) -> Result<IndicatorSeries, ProviderError> {
//!         Ok(IndicatorSeries { symbol: symbol.to_string(), kind: request.kind, points: vec![] })
//!     }
//!
//!     async fn fetch_overview(&self, symbol: &str) -> Result<CompanyOverview, ProviderError> {
//!         Ok(CompanyOverview { symbol: symbol.to_string(), ..Default::default() })
//!     }
//! }
//! ```

pub mod alpha_vantage;

use async_trait::async_trait;
use shared_utils::env::MissingEnvVarError;
use snafu::{Backtrace, Snafu};

use crate::models::{
    bar::BarSeries,
    company::CompanyOverview,
    indicator::{IndicatorRequest, IndicatorSeries},
};

/// Trait for fetching daily market data from a vendor.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Full daily OHLCV history of `symbol`, ascending by date.
    async fn fetch_daily(&self, symbol: &str) -> Result<BarSeries, ProviderError>;

    /// One vendor-computed indicator over daily closes, ascending by date.
    async fn fetch_indicator(
        &self,
        symbol: &str,
        request: IndicatorRequest,
    ) -> Result<IndicatorSeries, ProviderError>;

    /// Company fundamentals.
    async fn fetch_overview(&self, symbol: &str) -> Result<CompanyOverview, ProviderError>;
}

/// Errors that can occur during the creation of a provider instance
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// missed environment variable.
    #[snafu(display("Missing environment variable: {source}"))]
    MissingEnvVar {
        source: MissingEnvVarError,
        backtrace: Backtrace,
    },

    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// A zero request quota would block forever.
    #[snafu(display("requests_per_minute must be at least 1"))]
    InvalidRateLimit { backtrace: Backtrace },
}

/// Errors that can occur within a `DataProvider` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout).
    #[snafu(display("API request failed: {source}"))]
    Reqwest {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The provider's API returned a specific error message (e.g., invalid
    /// symbol, exhausted quota).
    #[snafu(display("API error for {symbol}: {message}"))]
    Api {
        symbol: String,
        message: String,
        backtrace: Backtrace,
    },

    /// The response body did not have the expected shape.
    #[snafu(display("Malformed response for {symbol}: {source}"))]
    Decode {
        symbol: String,
        source: serde_json::Error,
        backtrace: Backtrace,
    },

    /// An error during provider configuration or initialization.
    #[snafu(display("Provider initialization error: {source}"))]
    Init {
        #[snafu(backtrace)]
        source: ProviderInitError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::indicator::IndicatorKind;

    struct EmptyProvider;
    struct FailingProvider;

    #[async_trait]
    impl DataProvider for EmptyProvider {
        async fn fetch_daily(&self, symbol: &str) -> Result<BarSeries, ProviderError> {
            Ok(BarSeries {
                symbol: symbol.to_string(),
                bars: vec![],
            })
        }

        async fn fetch_indicator(
            &self,
            symbol: &str,
            request: IndicatorRequest,
        ) -> Result<IndicatorSeries, ProviderError> {
            Ok(IndicatorSeries {
                symbol: symbol.to_string(),
                kind: request.kind,
                points: vec![],
            })
        }

        async fn fetch_overview(&self, symbol: &str) -> Result<CompanyOverview, ProviderError> {
            Ok(CompanyOverview {
                symbol: symbol.to_string(),
                ..Default::default()
            })
        }
    }

    #[async_trait]
    impl DataProvider for FailingProvider {
        async fn fetch_daily(&self, symbol: &str) -> Result<BarSeries, ProviderError> {
            ApiSnafu {
                symbol,
                message: "Invalid API call",
            }
            .fail()
        }

        async fn fetch_indicator(
            &self,
            symbol: &str,
            _request: IndicatorRequest,
        ) -> Result<IndicatorSeries, ProviderError> {
            self.fetch_daily(symbol).await.map(|_| unreachable!())
        }

        async fn fetch_overview(&self, symbol: &str) -> Result<CompanyOverview, ProviderError> {
            self.fetch_daily(symbol).await.map(|_| unreachable!())
        }
    }

    // Decides at runtime which provider to hand back.
    fn get_provider(name: &str) -> Box<dyn DataProvider> {
        if name == "empty" {
            Box::new(EmptyProvider)
        } else {
            Box::new(FailingProvider)
        }
    }

    #[tokio::test]
    async fn test_dynamic_provider() {
        let provider = get_provider("empty");
        let series = provider
            .fetch_indicator("AAPL", IndicatorRequest::new(IndicatorKind::Rsi, 14))
            .await
            .unwrap();
        assert_eq!(series.kind, IndicatorKind::Rsi);

        let err = get_provider("failing").fetch_overview("ZZZZ").await.unwrap_err();
        assert_eq!(err.to_string(), "API error for ZZZZ: Invalid API call");
    }
}
