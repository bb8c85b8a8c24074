//! Composite investment scoring over daily OHLCV bars.
//!
//! Callers hand a merged table of [`RawBar`]s (prices plus upstream EMA and
//! RSI) to [`ScoringPipeline::score_table`] and get back a [`ScoringReport`]:
//! one [`ScoredBar`] per valid row with its moving averages, five component
//! scores, the weighted composite and a [`Signal`], plus the rows that were
//! rejected and any warnings. The crate performs no I/O.

pub mod error;
pub mod pipeline;
pub mod rolling;
pub mod score;
pub mod signal;
pub mod table;

pub use error::{Field, RowError, ScoreComponent, ScoringWarning};
pub use pipeline::{
    CancellationFlag, PartitionOutcome, PartitionStatus, ProgressFn, ScoringOptions,
    ScoringPipeline, ScoringReport, score_table,
};
pub use rolling::{RollingMean, rolling_mean};
pub use score::{ScoreCalculator, ScoreWeights, SeriesScores, WarmUpPolicy};
pub use signal::{Signal, classify};
pub use table::{PriceBar, RawBar, RawValue, ScoredBar};
