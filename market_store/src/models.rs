//! Diesel models mapping to the database schema.
//!
//! These types mirror the tables defined in the embedded migrations and in
//! [`crate::schema`]:
//! - [`crate::schema::daily_data`]: daily OHLCV bars
//! - [`crate::schema::technical_indicators`]: vendor SMA/EMA/RSI per day
//! - [`crate::schema::company_data`]: company fundamentals, upserted by symbol
//! - [`crate::schema::investment_scores`]: output of the scoring engine

use chrono::NaiveDate;
use diesel::prelude::*;
use investment_scoring::{RawBar, ScoredBar};
use market_data_ingestor::models::{
    bar::DailyBar, company::CompanyOverview, indicator::TechnicalIndicatorRow,
};

use crate::schema::*;

/// Insert payload for [`crate::schema::daily_data`].
#[derive(Debug, Insertable)]
#[diesel(table_name = daily_data)]
pub struct NewDailyBar<'a> {
    /// Ticker symbol.
    pub symbol: &'a str,
    /// Trading day.
    pub date: NaiveDate,
    /// Opening price.
    pub open: f64,
    /// Daily high.
    pub high: f64,
    /// Daily low.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Shares traded.
    pub volume: f64,
}

impl<'a> NewDailyBar<'a> {
    /// Borrows `symbol` and copies the prices of `bar`.
    pub fn new(symbol: &'a str, bar: &DailyBar) -> Self {
        Self {
            symbol,
            date: bar.date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }
    }
}

/// Insert payload for [`crate::schema::technical_indicators`].
#[derive(Debug, Insertable)]
#[diesel(table_name = technical_indicators, treat_none_as_default_value = false)]
pub struct NewIndicatorRow<'a> {
    /// Ticker symbol.
    pub symbol: &'a str,
    /// Trading day.
    pub date: NaiveDate,
    /// Simple moving average; NULL when the vendor had no value.
    pub sma: Option<f64>,
    /// Exponential moving average.
    pub ema: Option<f64>,
    /// Relative strength index.
    pub rsi: Option<f64>,
}

impl<'a> From<&'a TechnicalIndicatorRow> for NewIndicatorRow<'a> {
    fn from(row: &'a TechnicalIndicatorRow) -> Self {
        Self {
            symbol: &row.symbol,
            date: row.date,
            sma: row.sma,
            ema: row.ema,
            rsi: row.rsi,
        }
    }
}

/// Insert/update payload for [`crate::schema::company_data`].
///
/// `treat_none_as_null` makes an upsert clear a field the vendor stopped reporting.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = company_data, treat_none_as_null = true)]
pub struct CompanyRow<'a> {
    /// Ticker symbol (primary key).
    pub symbol: &'a str,
    /// Company name.
    pub name: Option<&'a str>,
    /// Business description.
    pub description: Option<&'a str>,
    /// Sector, e.g. "TECHNOLOGY".
    pub sector: Option<&'a str>,
    /// Industry, e.g. "ELECTRONIC COMPUTERS".
    pub industry: Option<&'a str>,
    /// Market capitalization in currency units.
    pub market_capitalization: Option<i64>,
    /// Price / earnings ratio.
    pub pe_ratio: Option<f64>,
    /// Earnings per share.
    pub eps: Option<f64>,
    /// Dividend yield as a fraction.
    pub dividend_yield: Option<f64>,
    /// Beta against the market.
    pub beta: Option<f64>,
    /// 52-week high.
    pub week52_high: Option<f64>,
    /// 52-week low.
    pub week52_low: Option<f64>,
    /// RFC3339 UTC timestamp of this write.
    pub updated_at: &'a str,
}

impl<'a> CompanyRow<'a> {
    /// Borrows every field of `overview`, stamped with `updated_at`.
    pub fn new(overview: &'a CompanyOverview, updated_at: &'a str) -> Self {
        Self {
            symbol: &overview.symbol,
            name: overview.name.as_deref(),
            description: overview.description.as_deref(),
            sector: overview.sector.as_deref(),
            industry: overview.industry.as_deref(),
            market_capitalization: overview.market_capitalization,
            pe_ratio: overview.pe_ratio,
            eps: overview.eps,
            dividend_yield: overview.dividend_yield,
            beta: overview.beta,
            week52_high: overview.week52_high,
            week52_low: overview.week52_low,
            updated_at,
        }
    }
}

/// A row of [`crate::schema::company_data`].
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = company_data, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Company {
    /// Ticker symbol.
    pub symbol: String,
    /// Company name.
    pub name: Option<String>,
    /// Sector.
    pub sector: Option<String>,
    /// Industry.
    pub industry: Option<String>,
    /// Market capitalization.
    pub market_capitalization: Option<i64>,
    /// Price / earnings ratio.
    pub pe_ratio: Option<f64>,
    /// RFC3339 UTC timestamp of the last upsert.
    pub updated_at: String,
}

/// A row of [`crate::schema::investment_scores`]; used for both insert and select.
#[derive(Debug, Clone, PartialEq, Insertable, Queryable, Selectable)]
#[diesel(
    table_name = investment_scores,
    check_for_backend(diesel::sqlite::Sqlite),
    treat_none_as_default_value = false
)]
pub struct ScoreRow {
    /// Ticker symbol.
    pub symbol: String,
    /// Trading day.
    pub date: NaiveDate,
    /// 10-bar SMA of close.
    pub ma_10: Option<f64>,
    /// 50-bar SMA of close.
    pub ma_50: Option<f64>,
    /// 200-bar SMA of close.
    pub ma_200: Option<f64>,
    /// Percent change versus the previous close.
    pub price_momentum: Option<f64>,
    /// Intraday range as a percent of close.
    pub volatility_score: Option<f64>,
    /// Percent deviation from the 50-bar volume mean.
    pub volume_score: Option<f64>,
    /// +1 / -1, NULL during warm-up.
    pub ema_sma_score: Option<i32>,
    /// +2 / 0 / -2.
    pub rsi_score: i32,
    /// Weighted composite.
    pub investment_score: Option<f64>,
    /// `Buy`, `Sell`, `Hold` or `Undefined`.
    pub signal: String,
}

impl From<&ScoredBar> for ScoreRow {
    fn from(row: &ScoredBar) -> Self {
        Self {
            symbol: row.bar.symbol.clone(),
            date: row.bar.date,
            ma_10: row.ma_10,
            ma_50: row.ma_50,
            ma_200: row.ma_200,
            price_momentum: row.price_momentum,
            volatility_score: row.volatility_score,
            volume_score: row.volume_score,
            ema_sma_score: row.ema_sma_score.map(i32::from),
            rsi_score: i32::from(row.rsi_score),
            investment_score: row.investment_score,
            signal: row.signal.as_str().to_string(),
        }
    }
}

/// One row of `daily_data ⋈ technical_indicators`.
#[derive(Debug, Clone, PartialEq, Queryable)]
pub struct MergedRow {
    /// Ticker symbol.
    pub symbol: String,
    /// Trading day.
    pub date: NaiveDate,
    /// Opening price.
    pub open: f64,
    /// Daily high.
    pub high: f64,
    /// Daily low.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Shares traded.
    pub volume: f64,
    /// Vendor EMA.
    pub ema: Option<f64>,
    /// Vendor RSI.
    pub rsi: Option<f64>,
}

impl From<MergedRow> for RawBar {
    fn from(row: MergedRow) -> Self {
        RawBar {
            symbol: row.symbol,
            date: row.date.format("%Y-%m-%d").to_string(),
            open: Some(row.open.into()),
            high: Some(row.high.into()),
            low: Some(row.low.into()),
            close: Some(row.close.into()),
            volume: Some(row.volume.into()),
            ema: row.ema.map(Into::into),
            rsi: row.rsi.map(Into::into),
        }
    }
}
