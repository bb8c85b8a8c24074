//! Row types flowing through the scoring engine.
//!
//! [`RawBar`] is what callers hand in: loosely typed, the way rows come out
//! of a merged `daily_data ⋈ technical_indicators` table or a JSON export.
//! [`PriceBar`] is a validated row and [`ScoredBar`] is a validated row plus
//! every derived column.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Field, RowError};
use crate::signal::Signal;

/// A numeric cell as supplied by the caller.
///
/// Market-data APIs commonly send numbers as strings (`"123.4500"`), so text
/// is accepted as long as it parses to a finite float.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Coerces to a finite float, or returns the offending text.
    fn coerce(&self) -> Result<f64, String> {
        match self {
            RawValue::Number(n) if n.is_finite() => Ok(*n),
            RawValue::Number(n) => Err(n.to_string()),
            RawValue::Text(s) => match s.trim().parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(value),
                _ => Err(s.clone()),
            },
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, RawValue::Text(s) if s.trim().is_empty())
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

/// One unvalidated input row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawBar {
    pub symbol: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    #[serde(default)]
    pub open: Option<RawValue>,
    #[serde(default)]
    pub high: Option<RawValue>,
    #[serde(default)]
    pub low: Option<RawValue>,
    #[serde(default)]
    pub close: Option<RawValue>,
    #[serde(default)]
    pub volume: Option<RawValue>,
    #[serde(default)]
    pub ema: Option<RawValue>,
    #[serde(default)]
    pub rsi: Option<RawValue>,
}

impl From<PriceBar> for RawBar {
    fn from(bar: PriceBar) -> Self {
        RawBar {
            symbol: bar.symbol,
            date: bar.date.format("%Y-%m-%d").to_string(),
            open: Some(bar.open.into()),
            high: Some(bar.high.into()),
            low: Some(bar.low.into()),
            close: Some(bar.close.into()),
            volume: Some(bar.volume.into()),
            ema: Some(bar.ema.into()),
            rsi: Some(bar.rsi.into()),
        }
    }
}

/// A validated daily bar for one symbol, with its externally supplied
/// indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// Exponential moving average of close, computed upstream.
    pub ema: f64,
    /// Relative Strength Index in `[0, 100]`, computed upstream.
    pub rsi: f64,
}

fn parse_date(symbol: &str, text: &str) -> Result<NaiveDate, RowError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(RowError::MissingField {
            symbol: symbol.to_string(),
            date: None,
            field: Field::Date,
        });
    }
    text.parse::<NaiveDate>()
        .or_else(|_| text.parse::<NaiveDateTime>().map(|dt| dt.date()))
        // SQL exports emit "2024-01-05 00:00:00"
        .or_else(|_| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f").map(|dt| dt.date())
        })
        .map_err(|_| RowError::InvalidDate {
            symbol: symbol.to_string(),
            value: text.to_string(),
        })
}

fn numeric(
    symbol: &str,
    date: NaiveDate,
    field: Field,
    cell: Option<&RawValue>,
) -> Result<f64, RowError> {
    match cell {
        None => Err(RowError::MissingField {
            symbol: symbol.to_string(),
            date: Some(date),
            field,
        }),
        Some(v) if v.is_blank() => Err(RowError::MissingField {
            symbol: symbol.to_string(),
            date: Some(date),
            field,
        }),
        Some(v) => v.coerce().map_err(|value| RowError::NonNumericValue {
            symbol: symbol.to_string(),
            date: Some(date),
            field,
            value,
        }),
    }
}

impl TryFrom<RawBar> for PriceBar {
    type Error = RowError;

    /// Validates one row. The first offending field (in column order) is reported.
    fn try_from(raw: RawBar) -> Result<Self, Self::Error> {
        let symbol = raw.symbol.trim().to_string();
        if symbol.is_empty() {
            return Err(RowError::MissingField {
                symbol,
                date: parse_date("", &raw.date).ok(),
                field: Field::Symbol,
            });
        }
        let date = parse_date(&symbol, &raw.date)?;

        Ok(PriceBar {
            open: numeric(&symbol, date, Field::Open, raw.open.as_ref())?,
            high: numeric(&symbol, date, Field::High, raw.high.as_ref())?,
            low: numeric(&symbol, date, Field::Low, raw.low.as_ref())?,
            close: numeric(&symbol, date, Field::Close, raw.close.as_ref())?,
            volume: numeric(&symbol, date, Field::Volume, raw.volume.as_ref())?,
            ema: numeric(&symbol, date, Field::Ema, raw.ema.as_ref())?,
            rsi: numeric(&symbol, date, Field::Rsi, raw.rsi.as_ref())?,
            symbol,
            date,
        })
    }
}

/// A [`PriceBar`] with its moving averages, component scores, composite
/// score and signal. `None` means "undefined" (warm-up or zero denominator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredBar {
    #[serde(flatten)]
    pub bar: PriceBar,
    pub ma_10: Option<f64>,
    pub ma_50: Option<f64>,
    pub ma_200: Option<f64>,
    pub price_momentum: Option<f64>,
    pub volatility_score: Option<f64>,
    pub volume_score: Option<f64>,
    pub ema_sma_score: Option<i8>,
    pub rsi_score: i8,
    pub investment_score: Option<f64>,
    pub signal: Signal,
}

impl ScoredBar {
    pub fn symbol(&self) -> &str {
        &self.bar.symbol
    }

    pub fn date(&self) -> NaiveDate {
        self.bar.date
    }

    /// True once the composite score is defined.
    pub fn is_scored(&self) -> bool {
        self.investment_score.is_some()
    }
}
