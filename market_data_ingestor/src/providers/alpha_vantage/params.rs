use serde::{Deserialize, Serialize};

use crate::models::indicator::IndicatorRequest;

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";
pub const DEFAULT_API_KEY_ENV: &str = "ALPHAVANTAGE_API_KEY";
/// Free-tier quota.
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 5;

/// How much daily history to request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputSize {
    /// Latest 100 bars.
    Compact,
    /// Full history.
    #[default]
    Full,
}

impl OutputSize {
    pub const fn as_str(self) -> &'static str {
        match self {
            OutputSize::Compact => "compact",
            OutputSize::Full => "full",
        }
    }
}

/// Connection settings for [`AlphaVantageProvider`](super::AlphaVantageProvider).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlphaVantageConfig {
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub base_url: String,
    pub requests_per_minute: u32,
    pub output_size: OutputSize,
}

impl Default for AlphaVantageConfig {
    fn default() -> Self {
        Self {
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
            output_size: OutputSize::default(),
        }
    }
}

/// Query pairs without the API key; the provider appends it.
pub type Query = Vec<(&'static str, String)>;

pub fn daily_query(symbol: &str, output_size: OutputSize) -> Query {
    vec![
        ("function", "TIME_SERIES_DAILY".to_string()),
        ("symbol", symbol.to_string()),
        ("outputsize", output_size.as_str().to_string()),
    ]
}

pub fn indicator_query(symbol: &str, request: IndicatorRequest) -> Query {
    vec![
        ("function", request.kind.function().to_string()),
        ("symbol", symbol.to_string()),
        ("interval", "daily".to_string()),
        ("time_period", request.time_period.to_string()),
        ("series_type", "close".to_string()),
    ]
}

pub fn overview_query(symbol: &str) -> Query {
    vec![
        ("function", "OVERVIEW".to_string()),
        ("symbol", symbol.to_string()),
    ]
}
