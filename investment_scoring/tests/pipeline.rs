use std::sync::{Arc, Mutex};

use chrono::{Days, NaiveDate};
use proptest::prelude::*;

use investment_scoring::{
    CancellationFlag, PartitionStatus, RawBar, RowError, ScoringOptions, ScoringPipeline,
    ScoringWarning, Signal, WarmUpPolicy, score_table,
};

fn day(i: usize) -> String {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    (start + Days::new(i as u64)).format("%Y-%m-%d").to_string()
}

#[derive(Clone, Copy)]
struct Quote {
    close: f64,
    high: f64,
    low: f64,
    volume: f64,
    ema: f64,
    rsi: f64,
}

impl Quote {
    fn flat(close: f64) -> Self {
        Quote {
            close,
            high: close,
            low: close,
            volume: 1_000.0,
            ema: close,
            rsi: 50.0,
        }
    }

    fn row(self, symbol: &str, i: usize) -> RawBar {
        RawBar {
            symbol: symbol.into(),
            date: day(i),
            open: Some(self.close.into()),
            high: Some(self.high.into()),
            low: Some(self.low.into()),
            close: Some(self.close.into()),
            volume: Some(self.volume.into()),
            ema: Some(self.ema.into()),
            rsi: Some(self.rsi.into()),
        }
    }
}

fn series(symbol: &str, n: usize, quote: impl Fn(usize) -> Quote) -> Vec<RawBar> {
    (0..n).map(|i| quote(i).row(symbol, i)).collect()
}

#[test]
fn momentum_over_three_closes() {
    let closes = [100.0, 102.0, 101.0];
    let report = score_table(series("AAPL", 3, |i| Quote::flat(closes[i])));
    let momentum: Vec<_> = report.scored.iter().map(|r| r.price_momentum).collect();
    assert_eq!(momentum[0], None);
    assert!((momentum[1].unwrap() - 2.0).abs() < 1e-12);
    assert!((momentum[2].unwrap() + 0.980_392_156_862_745).abs() < 1e-9);
}

#[test]
fn rsi_and_volatility_components() {
    let rsis = [25.0, 75.0, 50.0];
    let report = score_table(series("MSFT", 3, |i| Quote {
        high: 110.0,
        low: 90.0,
        rsi: rsis[i],
        ..Quote::flat(100.0)
    }));
    let rsi: Vec<_> = report.scored.iter().map(|r| r.rsi_score).collect();
    assert_eq!(rsi, [2, -2, 0]);
    for row in &report.scored {
        assert!((row.volatility_score.unwrap() - 20.0).abs() < 1e-12);
    }
}

#[test]
fn constant_series_scores_first_full_window() {
    let report = score_table(series("META", 50, |_| Quote {
        high: 110.0,
        low: 90.0,
        ..Quote::flat(100.0)
    }));
    assert_eq!(report.scored.len(), 50);

    let last = report.scored.last().unwrap();
    assert_eq!(last.ma_50, Some(100.0));
    assert_eq!(last.ema_sma_score, Some(-1), "ema equal to ma_50 is not above it");
    assert_eq!(last.volume_score, Some(0.0));
    assert!((last.investment_score.unwrap() - 4.8).abs() < 1e-9);
    assert_eq!(last.signal, Signal::Buy);

    assert!(report.scored[..49].iter().all(|r| r.signal == Signal::Undefined));
    assert!(report.scored.iter().all(|r| r.ma_200.is_none()));
}

#[test]
fn exact_zero_is_hold_and_negative_is_sell() {
    // flat bars: momentum, volatility and volume all zero
    let hold = score_table(series("HOLD", 60, |_| Quote {
        ema: 101.0,
        rsi: 75.0,
        ..Quote::flat(100.0)
    }));
    let last = hold.scored.last().unwrap();
    assert_eq!(last.investment_score, Some(0.0));
    assert_eq!(last.signal, Signal::Hold);

    let sell = score_table(series("SELL", 60, |_| Quote {
        ema: 99.0,
        rsi: 75.0,
        ..Quote::flat(100.0)
    }));
    let last = sell.scored.last().unwrap();
    assert!((last.investment_score.unwrap() + 0.4).abs() < 1e-12);
    assert_eq!(last.signal, Signal::Sell);
}

#[test]
fn short_history_is_undefined_under_longest_window() {
    let pipeline = ScoringPipeline::new(ScoringOptions {
        warm_up: WarmUpPolicy::LongestWindow,
        ..ScoringOptions::default()
    });
    let report = pipeline.score_table(series("AMZN", 150, |i| Quote::flat(100.0 + i as f64)));

    assert_eq!(report.scored.len(), 150);
    for row in &report.scored {
        assert_eq!(row.ma_200, None);
        assert_eq!(row.investment_score, None);
        assert_eq!(row.signal, Signal::Undefined);
    }
    assert_eq!(
        report.warnings,
        vec![ScoringWarning::InsufficientHistory {
            symbol: "AMZN".into(),
            rows: 150,
            required: 200,
        }]
    );
    assert_eq!(
        report.partitions[0].status,
        PartitionStatus::Scored {
            rows: 150,
            warm_up_rows: 150
        }
    );
}

#[test]
fn duplicate_key_excludes_every_copy() {
    let mut rows = series("X", 5, |i| Quote::flat(10.0 + i as f64));
    rows.push(Quote::flat(99.0).row("X", 0));
    rows.extend(series("Y", 3, |_| Quote::flat(5.0)));

    let report = score_table(rows);

    let dups: Vec<_> = report
        .rejected
        .iter()
        .filter(|e| matches!(e, RowError::DuplicateKey { .. }))
        .collect();
    assert_eq!(dups.len(), 2);
    assert!(dups.iter().all(|e| e.symbol() == "X" && e.date().map(|d| d.to_string()) == Some(day(0))));

    let x_dates: Vec<_> = report.rows_for("X").map(|r| r.date().to_string()).collect();
    assert_eq!(x_dates, (1..5).map(day).collect::<Vec<_>>());
    assert_eq!(report.rows_for("Y").count(), 3);
}

#[test]
fn malformed_rows_are_reported_not_fatal() {
    let mut rows = series("GOOGL", 4, |_| Quote::flat(140.0));
    rows[2].close = Some("n/a".into());
    rows[3].rsi = None;
    rows.push(RawBar {
        symbol: "".into(),
        date: day(9),
        ..RawBar::default()
    });
    rows.push(RawBar {
        symbol: "BAD".into(),
        date: "not-a-date".into(),
        ..RawBar::default()
    });

    let report = score_table(rows);

    assert_eq!(report.scored.len(), 2);
    assert_eq!(report.rejected.len(), 4);
    assert!(matches!(report.rejected[0], RowError::NonNumericValue { .. }));
    assert!(matches!(report.rejected[1], RowError::MissingField { .. }));
    assert!(matches!(report.rejected[3], RowError::InvalidDate { .. }));

    let bad = report.partitions.iter().find(|p| p.symbol == "BAD").unwrap();
    assert_eq!(bad.status, PartitionStatus::Empty);
}

#[test]
fn symbols_do_not_leak_into_each_other() {
    let a = series("A", 80, |i| Quote::flat(50.0 + (i % 7) as f64));
    let b = series("B", 80, |i| Quote {
        volume: 10_000.0 * (i + 1) as f64,
        ..Quote::flat(900.0 - i as f64)
    });

    let alone = score_table(a.clone());

    let mut mixed: Vec<_> = a.into_iter().zip(b).flat_map(|(x, y)| [y, x]).collect();
    mixed.reverse();
    let together = score_table(mixed);

    let a_mixed: Vec<_> = together.rows_for("A").cloned().collect();
    assert_eq!(alone.scored, a_mixed);
    assert_eq!(together.partitions.len(), 2);
}

#[test]
fn scoring_is_idempotent_and_parallel_matches_sequential() {
    let mut rows = Vec::new();
    for (k, symbol) in ["META", "AAPL", "MSFT", "AMZN", "GOOGL"].iter().enumerate() {
        rows.extend(series(symbol, 120, |i| Quote {
            high: 101.0 + k as f64,
            low: 99.0,
            volume: 1_000.0 + (i * 37 % 11) as f64,
            ema: 100.0 + (i % 5) as f64,
            rsi: (i * 13 % 100) as f64,
            ..Quote::flat(100.0 + ((i + k) % 9) as f64)
        }));
    }

    let sequential = ScoringPipeline::default();
    let parallel = ScoringPipeline::new(ScoringOptions {
        parallel: true,
        ..ScoringOptions::default()
    });

    let first = sequential.score_table(rows.clone());
    let second = sequential.score_table(rows.clone());
    let par = parallel.score_table(rows);

    assert_eq!(first, second);
    assert_eq!(first, par);
    let order: Vec<_> = first.partitions.iter().map(|p| p.symbol.as_str()).collect();
    assert_eq!(order, ["META", "AAPL", "MSFT", "AMZN", "GOOGL"]);
    assert_eq!(first.latest_by_symbol().len(), 5);
}

#[test]
fn cancelled_run_schedules_nothing() {
    let flag = CancellationFlag::new();
    flag.cancel();
    let report = ScoringPipeline::default()
        .with_cancellation(flag)
        .score_table(series("AAPL", 10, |_| Quote::flat(1.0)));

    assert!(report.scored.is_empty());
    assert!(report.was_cancelled());
    assert_eq!(report.partitions[0].status, PartitionStatus::Cancelled);
}

#[test]
fn cancelling_mid_run_keeps_finished_partitions() {
    let mut rows = series("AAPL", 12, |i| Quote::flat(100.0 + i as f64));
    rows.extend(series("MSFT", 12, |i| Quote::flat(50.0 + i as f64)));
    rows.extend(series("IBM", 12, |_| Quote::flat(10.0)));

    let flag = CancellationFlag::new();
    let stop = flag.clone();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    let report = ScoringPipeline::default()
        .with_cancellation(flag)
        .with_progress(move |outcome| {
            log.lock().unwrap().push(outcome.symbol.clone());
            stop.cancel();
        })
        .score_table(rows);

    assert_eq!(*seen.lock().unwrap(), ["AAPL", "MSFT", "IBM"]);
    assert_eq!(
        report.partitions[0].status,
        PartitionStatus::Scored {
            rows: 12,
            warm_up_rows: 12
        }
    );
    assert_eq!(report.partitions[1].status, PartitionStatus::Cancelled);
    assert_eq!(report.partitions[2].status, PartitionStatus::Cancelled);
    assert!(report.was_cancelled());

    assert_eq!(report.scored.len(), 12);
    assert!(report.scored.iter().all(|r| r.symbol() == "AAPL"));
    assert_eq!(report.rows_for("MSFT").count(), 0);
    assert!(report.rejected.is_empty());
}

proptest! {
    #[test]
    fn output_is_sorted_and_complete_for_any_input_order(
        rows in Just(series("P", 60, |i| Quote::flat(20.0 + i as f64))).prop_shuffle()
    ) {
        let report = score_table(rows);
        prop_assert_eq!(report.scored.len(), 60);
        prop_assert!(report.rejected.is_empty());
        prop_assert!(report.scored.windows(2).all(|w| w[0].date() < w[1].date()));
        prop_assert_eq!(report.scored.iter().filter(|r| r.is_scored()).count(), 11);
    }
}
