//! Single entry point: validate, partition by symbol, order, score, merge.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RowError, ScoringWarning};
use crate::score::{ScoreCalculator, SeriesScores, WarmUpPolicy};
use crate::table::{PriceBar, RawBar, ScoredBar};

/// Shared flag a caller can flip to stop scheduling further partitions.
///
/// Partitions already running finish; the rest are reported as
/// [`PartitionStatus::Cancelled`].
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringOptions {
    /// Score partitions on the rayon thread pool.
    pub parallel: bool,
    pub warm_up: WarmUpPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PartitionStatus {
    Scored { rows: usize, warm_up_rows: usize },
    /// The symbol appeared in the input but every row was rejected.
    Empty,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionOutcome {
    pub symbol: String,
    #[serde(flatten)]
    pub status: PartitionStatus,
}

/// Everything one scoring run produced. Nothing is thrown; errors are data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoringReport {
    /// Grouped by symbol (first-appearance order), ascending date within a symbol.
    pub scored: Vec<ScoredBar>,
    pub rejected: Vec<RowError>,
    pub warnings: Vec<ScoringWarning>,
    pub partitions: Vec<PartitionOutcome>,
}

impl ScoringReport {
    pub fn rows_for<'a>(&'a self, symbol: &'a str) -> impl Iterator<Item = &'a ScoredBar> + 'a {
        self.scored.iter().filter(move |r| r.symbol() == symbol)
    }

    /// Most recent row of every scored symbol, in partition order.
    pub fn latest_by_symbol(&self) -> Vec<&ScoredBar> {
        let mut latest: IndexMap<&str, &ScoredBar> = IndexMap::new();
        for row in &self.scored {
            latest.insert(row.symbol(), row);
        }
        latest.into_values().collect()
    }

    pub fn was_cancelled(&self) -> bool {
        self.partitions
            .iter()
            .any(|p| p.status == PartitionStatus::Cancelled)
    }
}

struct PartitionResult {
    outcome: PartitionOutcome,
    scores: SeriesScores,
    duplicates: Vec<RowError>,
}

/// Observer of finished partitions, see [`ScoringPipeline::with_progress`].
pub type ProgressFn = Arc<dyn Fn(&PartitionOutcome) + Send + Sync>;

#[derive(Clone, Default)]
pub struct ScoringPipeline {
    options: ScoringOptions,
    cancel: Option<CancellationFlag>,
    progress: Option<ProgressFn>,
}

impl fmt::Debug for ScoringPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoringPipeline")
            .field("options", &self.options)
            .field("cancel", &self.cancel)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl ScoringPipeline {
    pub fn new(options: ScoringOptions) -> Self {
        Self {
            options,
            cancel: None,
            progress: None,
        }
    }

    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Calls `progress` with the outcome of every partition as soon as it
    /// is finished, before the next partition is scheduled.
    ///
    /// On the rayon path the callback runs on worker threads in no
    /// particular order.
    pub fn with_progress<F>(mut self, progress: F) -> Self
    where
        F: Fn(&PartitionOutcome) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(progress));
        self
    }

    /// Scores a merged multi-symbol table.
    ///
    /// Input order does not matter; rows are validated individually, grouped
    /// by symbol, sorted by date and deduplicated before any window is
    /// computed.
    pub fn score_table<I>(&self, rows: I) -> ScoringReport
    where
        I: IntoIterator<Item = RawBar>,
    {
        let mut rejected = Vec::new();
        let mut partitions: IndexMap<String, Vec<PriceBar>> = IndexMap::new();

        for raw in rows {
            match PriceBar::try_from(raw) {
                Ok(bar) => partitions.entry(bar.symbol.clone()).or_default().push(bar),
                Err(err) => {
                    if !err.symbol().is_empty() && !partitions.contains_key(err.symbol()) {
                        partitions.insert(err.symbol().to_string(), Vec::new());
                    }
                    rejected.push(err);
                }
            }
        }

        let calculator = ScoreCalculator::new(self.options.warm_up);
        let partitions: Vec<(String, Vec<PriceBar>)> = partitions.into_iter().collect();

        let results: Vec<PartitionResult> = if self.options.parallel {
            partitions
                .into_par_iter()
                .map(|(symbol, bars)| self.score_partition(&calculator, symbol, bars))
                .collect()
        } else {
            partitions
                .into_iter()
                .map(|(symbol, bars)| self.score_partition(&calculator, symbol, bars))
                .collect()
        };

        let mut report = ScoringReport {
            rejected,
            ..ScoringReport::default()
        };
        for result in results {
            report.scored.extend(result.scores.rows);
            report.warnings.extend(result.scores.warnings);
            report.rejected.extend(result.duplicates);
            report.partitions.push(result.outcome);
        }
        debug!(
            scored = report.scored.len(),
            rejected = report.rejected.len(),
            partitions = report.partitions.len(),
            "scoring run finished"
        );
        report
    }

    fn score_partition(
        &self,
        calculator: &ScoreCalculator,
        symbol: String,
        bars: Vec<PriceBar>,
    ) -> PartitionResult {
        if self.cancel.as_ref().is_some_and(CancellationFlag::is_cancelled) {
            debug!(%symbol, "partition skipped after cancellation");
            let outcome = PartitionOutcome {
                symbol,
                status: PartitionStatus::Cancelled,
            };
            if let Some(progress) = &self.progress {
                progress(&outcome);
            }
            return PartitionResult {
                outcome,
                scores: SeriesScores::default(),
                duplicates: Vec::new(),
            };
        }

        let (bars, duplicates) = drop_duplicate_dates(bars);
        let scores = calculator.score_series(bars);
        let status = if scores.rows.is_empty() {
            PartitionStatus::Empty
        } else {
            PartitionStatus::Scored {
                rows: scores.rows.len(),
                warm_up_rows: scores.warm_up_rows,
            }
        };
        debug!(%symbol, ?status, duplicates = duplicates.len(), "partition scored");

        let outcome = PartitionOutcome { symbol, status };
        if let Some(progress) = &self.progress {
            progress(&outcome);
        }
        PartitionResult {
            outcome,
            scores,
            duplicates,
        }
    }
}

/// Sorts by date and removes every row whose date occurs more than once.
fn drop_duplicate_dates(mut bars: Vec<PriceBar>) -> (Vec<PriceBar>, Vec<RowError>) {
    bars.sort_by_key(|b| b.date);
    let duplicated: Vec<bool> = (0..bars.len())
        .map(|i| {
            (i > 0 && bars[i - 1].date == bars[i].date)
                || (i + 1 < bars.len() && bars[i + 1].date == bars[i].date)
        })
        .collect();

    let mut errors = Vec::new();
    let kept = bars
        .into_iter()
        .zip(duplicated)
        .filter_map(|(bar, dup)| {
            if dup {
                errors.push(RowError::DuplicateKey {
                    symbol: bar.symbol,
                    date: bar.date,
                });
                None
            } else {
                Some(bar)
            }
        })
        .collect();
    (kept, errors)
}

/// Scores `rows` sequentially with the default warm-up policy.
pub fn score_table<I>(rows: I) -> ScoringReport
where
    I: IntoIterator<Item = RawBar>,
{
    ScoringPipeline::default().score_table(rows)
}
