//! Composite score → discrete trading signal.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Short-term outlook derived from the sign of the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
    /// The score was undefined (warm-up or a zero denominator). Kept apart
    /// from `Hold` so callers can filter incomplete rows.
    Undefined,
}

impl Signal {
    pub const fn as_str(self) -> &'static str {
        match self {
            Signal::Buy => "Buy",
            Signal::Sell => "Sell",
            Signal::Hold => "Hold",
            Signal::Undefined => "Undefined",
        }
    }

    pub const fn is_defined(self) -> bool {
        !matches!(self, Signal::Undefined)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown signal: {0:?}")]
pub struct UnknownSignal(pub String);

impl FromStr for Signal {
    type Err = UnknownSignal;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Buy" => Ok(Signal::Buy),
            "Sell" => Ok(Signal::Sell),
            "Hold" => Ok(Signal::Hold),
            "Undefined" => Ok(Signal::Undefined),
            other => Err(UnknownSignal(other.to_string())),
        }
    }
}

/// Strict sign partition of the composite score.
///
/// `> 0` is `Buy`, `< 0` is `Sell`, exactly zero (either sign) is `Hold`.
/// A missing or non-finite score is `Undefined`, never `Hold`.
pub fn classify(score: Option<f64>) -> Signal {
    match score {
        Some(s) if !s.is_finite() => Signal::Undefined,
        Some(s) if s > 0.0 => Signal::Buy,
        Some(s) if s < 0.0 => Signal::Sell,
        Some(_) => Signal::Hold,
        None => Signal::Undefined,
    }
}
