//! Technical indicators computed by the vendor and their per-day join.

use std::{collections::BTreeMap, fmt};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Indicator functions this crate requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorKind {
    Sma,
    Ema,
    Rsi,
}

impl IndicatorKind {
    /// Function name on the wire, also the key of each value object.
    pub const fn function(self) -> &'static str {
        match self {
            IndicatorKind::Sma => "SMA",
            IndicatorKind::Ema => "EMA",
            IndicatorKind::Rsi => "RSI",
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.function())
    }
}

/// One indicator request: daily interval over closing prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorRequest {
    pub kind: IndicatorKind,
    pub time_period: u32,
}

impl IndicatorRequest {
    pub const fn new(kind: IndicatorKind, time_period: u32) -> Self {
        Self { kind, time_period }
    }
}

/// Look-back periods of the three indicators fetched per symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndicatorSettings {
    pub sma_period: u32,
    pub ema_period: u32,
    pub rsi_period: u32,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            sma_period: 10,
            ema_period: 10,
            rsi_period: 14,
        }
    }
}

impl IndicatorSettings {
    pub fn requests(&self) -> [IndicatorRequest; 3] {
        [
            IndicatorRequest::new(IndicatorKind::Sma, self.sma_period),
            IndicatorRequest::new(IndicatorKind::Ema, self.ema_period),
            IndicatorRequest::new(IndicatorKind::Rsi, self.rsi_period),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Values of one indicator for one symbol, ascending by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    pub symbol: String,
    pub kind: IndicatorKind,
    pub points: Vec<IndicatorPoint>,
}

/// SMA, EMA and RSI of one symbol on one day. A value is `None` when the
/// vendor returned no point for that day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalIndicatorRow {
    pub symbol: String,
    pub date: NaiveDate,
    pub sma: Option<f64>,
    pub ema: Option<f64>,
    pub rsi: Option<f64>,
}

/// Outer-joins the three indicator series on date, ascending.
///
/// Gaps are kept as `None` rather than zero: a zero EMA would silently decide
/// the EMA-versus-SMA comparison downstream.
pub fn combine_indicators(
    symbol: &str,
    sma: &IndicatorSeries,
    ema: &IndicatorSeries,
    rsi: &IndicatorSeries,
) -> Vec<TechnicalIndicatorRow> {
    let mut rows: BTreeMap<NaiveDate, TechnicalIndicatorRow> = BTreeMap::new();
    for point in &sma.points {
        row_at(&mut rows, symbol, point.date).sma = Some(point.value);
    }
    for point in &ema.points {
        row_at(&mut rows, symbol, point.date).ema = Some(point.value);
    }
    for point in &rsi.points {
        row_at(&mut rows, symbol, point.date).rsi = Some(point.value);
    }
    rows.into_values().collect()
}

fn row_at<'a>(
    rows: &'a mut BTreeMap<NaiveDate, TechnicalIndicatorRow>,
    symbol: &str,
    date: NaiveDate,
) -> &'a mut TechnicalIndicatorRow {
    rows.entry(date).or_insert_with(|| TechnicalIndicatorRow {
        symbol: symbol.to_string(),
        date,
        sma: None,
        ema: None,
        rsi: None,
    })
}
