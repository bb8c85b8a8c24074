use std::num::NonZeroU32;

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use shared_utils::env::get_env_var;
use snafu::{OptionExt, ResultExt};
use tracing::debug;

use crate::{
    models::{
        bar::BarSeries,
        company::CompanyOverview,
        indicator::{IndicatorRequest, IndicatorSeries},
    },
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, InvalidRateLimitSnafu, MissingEnvVarSnafu,
        ProviderError, ProviderInitError, ReqwestSnafu,
        alpha_vantage::{
            params::{AlphaVantageConfig, OutputSize, Query, daily_query, indicator_query, overview_query},
            response::{parse_daily, parse_indicator, parse_overview},
        },
    },
};

pub struct AlphaVantageProvider {
    client: Client,
    api_key: SecretString,
    base_url: String,
    output_size: OutputSize,
    limiter: DefaultDirectRateLimiter,
}

impl AlphaVantageProvider {
    /// Creates a new Alpha Vantage provider.
    ///
    /// Reads the API key from the environment variable named by
    /// `config.api_key_env` (`ALPHAVANTAGE_API_KEY` by default).
    pub fn new(config: AlphaVantageConfig) -> Result<Self, ProviderInitError> {
        let api_key = SecretString::from(get_env_var(&config.api_key_env).context(MissingEnvVarSnafu)?);
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(
        config: AlphaVantageConfig,
        api_key: SecretString,
    ) -> Result<Self, ProviderInitError> {
        let per_minute =
            NonZeroU32::new(config.requests_per_minute).context(InvalidRateLimitSnafu)?;
        let client = Client::builder().build().context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url,
            output_size: config.output_size,
            limiter: RateLimiter::direct(Quota::per_minute(per_minute)),
        })
    }

    /// Waits for a quota slot, sends the query and returns the raw body.
    async fn get(&self, symbol: &str, mut query: Query) -> Result<String, ProviderError> {
        self.limiter.until_ready().await;
        debug!(symbol, function = %query[0].1, "alpha vantage request");

        query.push(("apikey", self.api_key.expose_secret().to_string()));
        let response = self
            .client
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .context(ReqwestSnafu)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            return ApiSnafu {
                symbol,
                message: format!("HTTP {status}: {body}"),
            }
            .fail();
        }

        response.text().await.context(ReqwestSnafu)
    }
}

#[async_trait]
impl DataProvider for AlphaVantageProvider {
    async fn fetch_daily(&self, symbol: &str) -> Result<BarSeries, ProviderError> {
        let body = self.get(symbol, daily_query(symbol, self.output_size)).await?;
        parse_daily(symbol, &body)
    }

    async fn fetch_indicator(
        &self,
        symbol: &str,
        request: IndicatorRequest,
    ) -> Result<IndicatorSeries, ProviderError> {
        let body = self.get(symbol, indicator_query(symbol, request)).await?;
        parse_indicator(symbol, request.kind, &body)
    }

    async fn fetch_overview(&self, symbol: &str) -> Result<CompanyOverview, ProviderError> {
        let body = self.get(symbol, overview_query(symbol)).await?;
        parse_overview(symbol, &body)
    }
}
