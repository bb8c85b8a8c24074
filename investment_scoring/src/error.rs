//! Row-level errors and run-level warnings reported by the scoring pipeline.
//!
//! Nothing in the engine aborts a run: malformed or duplicated rows are
//! excluded and described by a [`RowError`], and conditions that only leave a
//! derived value undefined are described by a [`ScoringWarning`].

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Input columns of a [`RawBar`](crate::table::RawBar).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Symbol,
    Date,
    Open,
    High,
    Low,
    Close,
    Volume,
    Ema,
    Rsi,
}

impl Field {
    /// Column name as it appears in the merged table.
    pub const fn as_str(self) -> &'static str {
        match self {
            Field::Symbol => "symbol",
            Field::Date => "date",
            Field::Open => "open",
            Field::High => "high",
            Field::Low => "low",
            Field::Close => "close",
            Field::Volume => "volume",
            Field::Ema => "ema",
            Field::Rsi => "rsi",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a single input row was left out of the scored table.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowError {
    /// A required field was absent (or blank).
    #[error("{symbol}: missing required field `{field}`")]
    MissingField {
        symbol: String,
        date: Option<NaiveDate>,
        field: Field,
    },

    /// A numeric field could not be coerced to a finite float.
    #[error("{symbol}: field `{field}` is not numeric ({value:?})")]
    NonNumericValue {
        symbol: String,
        date: Option<NaiveDate>,
        field: Field,
        value: String,
    },

    /// The date is not a `YYYY-MM-DD` calendar date.
    #[error("{symbol}: invalid date {value:?}")]
    InvalidDate { symbol: String, value: String },

    /// More than one row shares this `(symbol, date)` key. Every such row is
    /// excluded and reported.
    #[error("{symbol}: duplicate row for {date}")]
    DuplicateKey { symbol: String, date: NaiveDate },
}

impl RowError {
    /// Symbol of the rejected row (empty when the symbol itself was missing).
    pub fn symbol(&self) -> &str {
        match self {
            RowError::MissingField { symbol, .. }
            | RowError::NonNumericValue { symbol, .. }
            | RowError::InvalidDate { symbol, .. }
            | RowError::DuplicateKey { symbol, .. } => symbol,
        }
    }

    /// Date of the rejected row, when it could be parsed.
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            RowError::MissingField { date, .. } | RowError::NonNumericValue { date, .. } => *date,
            RowError::InvalidDate { .. } => None,
            RowError::DuplicateKey { date, .. } => Some(*date),
        }
    }
}

/// Derived columns that divide by an input value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreComponent {
    /// Divides by the previous close.
    PriceMomentum,
    /// Divides by the close.
    VolatilityScore,
    /// Divides by the trailing volume mean.
    VolumeScore,
}

impl fmt::Display for ScoreComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScoreComponent::PriceMomentum => "price_momentum",
            ScoreComponent::VolatilityScore => "volatility_score",
            ScoreComponent::VolumeScore => "volume_score",
        })
    }
}

/// Conditions that leave derived values undefined without rejecting a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoringWarning {
    /// The first `rows` bars of `symbol` have no composite score because fewer
    /// than `required` bars of history were available.
    InsufficientHistory {
        symbol: String,
        rows: usize,
        required: usize,
    },

    /// A zero denominator left `component` undefined on this row.
    DivisionEdgeCase {
        symbol: String,
        date: NaiveDate,
        component: ScoreComponent,
    },
}

impl fmt::Display for ScoringWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringWarning::InsufficientHistory {
                symbol,
                rows,
                required,
            } => write!(
                f,
                "{symbol}: {rows} warm-up row(s) unscored ({required} bars of history required)"
            ),
            ScoringWarning::DivisionEdgeCase {
                symbol,
                date,
                component,
            } => write!(f, "{symbol} {date}: zero denominator in {component}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_expose_row_identity() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dup = RowError::DuplicateKey {
            symbol: "X".into(),
            date,
        };
        assert_eq!(dup.symbol(), "X");
        assert_eq!(dup.date(), Some(date));

        let bad_date = RowError::InvalidDate {
            symbol: "X".into(),
            value: "01/02/2024".into(),
        };
        assert_eq!(bad_date.date(), None);
    }

    #[test]
    fn display_names_the_field() {
        let err = RowError::NonNumericValue {
            symbol: "AAPL".into(),
            date: None,
            field: Field::Close,
            value: "n/a".into(),
        };
        assert_eq!(err.to_string(), "AAPL: field `close` is not numeric (\"n/a\")");
    }
}
