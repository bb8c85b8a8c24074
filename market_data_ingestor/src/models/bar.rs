//! Canonical in-memory representation of a daily bar (OHLCV).
//!
//! This struct is the standard output of
//! [`DataProvider::fetch_daily`](crate::providers::DataProvider::fetch_daily),
//! independent of the vendor that produced it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single daily bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    /// Trading day.
    pub date: NaiveDate,

    /// Opening price.
    pub open: f64,

    /// Highest price of the day.
    pub high: f64,

    /// Lowest price of the day.
    pub low: f64,

    /// Closing price.
    pub close: f64,

    /// Shares traded.
    pub volume: f64,
}

/// Every daily bar returned for one symbol, ascending by date.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BarSeries {
    /// The symbol this data represents (e.g., "AAPL").
    pub symbol: String,
    /// The collection of OHLCV bars.
    pub bars: Vec<DailyBar>,
}

impl BarSeries {
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }
}
