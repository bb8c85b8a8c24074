//! Wire shapes of Alpha Vantage responses and their conversion into models.
//!
//! Every value arrives as a string. Entries that fail to parse are dropped
//! with a warning instead of failing the whole series.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;
use snafu::ResultExt;
use tracing::warn;

use crate::{
    models::{
        bar::{BarSeries, DailyBar},
        company::CompanyOverview,
        indicator::{IndicatorKind, IndicatorPoint, IndicatorSeries},
    },
    providers::{ApiSnafu, DecodeSnafu, ProviderError},
};

/// Keys Alpha Vantage uses instead of an HTTP error status.
#[derive(Debug, Default, Deserialize)]
pub struct Notice {
    #[serde(rename = "Error Message")]
    pub error_message: Option<String>,
    /// Sent when the per-minute quota is exhausted.
    #[serde(rename = "Note")]
    pub note: Option<String>,
    /// Sent when the daily quota is exhausted or the endpoint is premium.
    #[serde(rename = "Information")]
    pub information: Option<String>,
}

impl Notice {
    fn into_message(self) -> Option<String> {
        self.error_message.or(self.note).or(self.information)
    }

    fn check(self, symbol: &str) -> Result<(), ProviderError> {
        match self.into_message() {
            Some(message) => ApiSnafu { symbol, message }.fail(),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DailyEntry {
    #[serde(rename = "1. open")]
    pub open: String,
    #[serde(rename = "2. high")]
    pub high: String,
    #[serde(rename = "3. low")]
    pub low: String,
    #[serde(rename = "4. close")]
    pub close: String,
    #[serde(rename = "5. volume")]
    pub volume: String,
}

#[derive(Debug, Deserialize)]
pub struct DailyResponse {
    #[serde(flatten)]
    pub notice: Notice,
    /// Keyed by `YYYY-MM-DD`; the map iterates ascending.
    #[serde(rename = "Time Series (Daily)")]
    pub time_series: Option<BTreeMap<String, DailyEntry>>,
}

#[derive(Debug, Deserialize)]
pub struct IndicatorResponse {
    #[serde(flatten)]
    pub notice: Notice,
    /// Date → `{ "<FUNCTION>": "<value>" }`.
    #[serde(
        rename = "Technical Analysis: SMA",
        alias = "Technical Analysis: EMA",
        alias = "Technical Analysis: RSI"
    )]
    pub technical_analysis: Option<BTreeMap<String, BTreeMap<String, String>>>,
}

#[derive(Debug, Deserialize)]
pub struct OverviewResponse {
    #[serde(flatten)]
    pub notice: Notice,
    #[serde(rename = "Symbol")]
    pub symbol: Option<String>,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "Sector")]
    pub sector: Option<String>,
    #[serde(rename = "Industry")]
    pub industry: Option<String>,
    #[serde(rename = "MarketCapitalization")]
    pub market_capitalization: Option<String>,
    #[serde(rename = "PERatio")]
    pub pe_ratio: Option<String>,
    #[serde(rename = "EPS")]
    pub eps: Option<String>,
    #[serde(rename = "DividendYield")]
    pub dividend_yield: Option<String>,
    #[serde(rename = "Beta")]
    pub beta: Option<String>,
    #[serde(rename = "52WeekHigh")]
    pub week52_high: Option<String>,
    #[serde(rename = "52WeekLow")]
    pub week52_low: Option<String>,
}

/// Parses a vendor number; `"None"`, `"-"`, blanks and non-finite values are `None`.
fn number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() || text == "None" || text == "-" {
        return None;
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn date(key: &str) -> Option<NaiveDate> {
    let day = key.split_whitespace().next()?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn text(value: Option<String>) -> Option<String> {
    value.filter(|v| {
        let v = v.trim();
        !v.is_empty() && v != "None" && v != "-"
    })
}

pub fn parse_daily(symbol: &str, body: &str) -> Result<BarSeries, ProviderError> {
    let response: DailyResponse = serde_json::from_str(body).context(DecodeSnafu { symbol })?;
    response.notice.check(symbol)?;
    let Some(series) = response.time_series else {
        return ApiSnafu {
            symbol,
            message: "response carried no daily time series",
        }
        .fail();
    };

    let bars = series
        .into_iter()
        .filter_map(|(key, entry)| {
            let bar = date(&key).and_then(|date| {
                Some(DailyBar {
                    date,
                    open: number(&entry.open)?,
                    high: number(&entry.high)?,
                    low: number(&entry.low)?,
                    close: number(&entry.close)?,
                    volume: number(&entry.volume)?,
                })
            });
            if bar.is_none() {
                warn!(symbol, date = %key, "dropping unparseable daily bar");
            }
            bar
        })
        .collect();

    Ok(BarSeries {
        symbol: symbol.to_string(),
        bars,
    })
}

pub fn parse_indicator(
    symbol: &str,
    kind: IndicatorKind,
    body: &str,
) -> Result<IndicatorSeries, ProviderError> {
    let response: IndicatorResponse =
        serde_json::from_str(body).context(DecodeSnafu { symbol })?;
    response.notice.check(symbol)?;
    let Some(series) = response.technical_analysis else {
        return ApiSnafu {
            symbol,
            message: format!("response carried no {kind} values"),
        }
        .fail();
    };

    let points = series
        .into_iter()
        .filter_map(|(key, values)| {
            let point = date(&key).and_then(|date| {
                let value = number(values.get(kind.function())?)?;
                Some(IndicatorPoint { date, value })
            });
            if point.is_none() {
                warn!(symbol, indicator = %kind, date = %key, "dropping unparseable indicator value");
            }
            point
        })
        .collect();

    Ok(IndicatorSeries {
        symbol: symbol.to_string(),
        kind,
        points,
    })
}

pub fn parse_overview(symbol: &str, body: &str) -> Result<CompanyOverview, ProviderError> {
    let response: OverviewResponse = serde_json::from_str(body).context(DecodeSnafu { symbol })?;
    let OverviewResponse {
        notice,
        symbol: reported,
        name,
        description,
        sector,
        industry,
        market_capitalization,
        pe_ratio,
        eps,
        dividend_yield,
        beta,
        week52_high,
        week52_low,
    } = response;
    notice.check(symbol)?;
    // Unknown tickers come back as an empty object.
    if reported.is_none() {
        return ApiSnafu {
            symbol,
            message: "no overview data for symbol",
        }
        .fail();
    }

    let num = |v: Option<String>| v.as_deref().and_then(number);
    Ok(CompanyOverview {
        symbol: symbol.to_string(),
        name: text(name),
        description: text(description),
        sector: text(sector),
        industry: text(industry),
        market_capitalization: market_capitalization
            .as_deref()
            .and_then(|v| v.trim().parse::<i64>().ok()),
        pe_ratio: num(pe_ratio),
        eps: num(eps),
        dividend_yield: num(dividend_yield),
        beta: num(beta),
        week52_high: num(week52_high),
        week52_low: num(week52_low),
    })
}
