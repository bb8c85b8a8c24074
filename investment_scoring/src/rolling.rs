//! Trailing-window statistics over one ordered numeric column.
//!
//! A window of size `w` yields nothing until it has seen `w` values; there is
//! no zero-fill and no partial-window mean.

use std::{collections::VecDeque, num::NonZeroUsize};

/// Running sum with Neumaier compensation, so values can be added and later
/// subtracted without the error growing with series length.
#[derive(Debug, Default, Clone, Copy)]
struct CompensatedSum {
    sum: f64,
    compensation: f64,
}

impl CompensatedSum {
    fn add(&mut self, x: f64) {
        let t = self.sum + x;
        if self.sum.abs() >= x.abs() {
            self.compensation += (self.sum - t) + x;
        } else {
            self.compensation += (x - t) + self.sum;
        }
        self.sum = t;
    }

    fn value(&self) -> f64 {
        self.sum + self.compensation
    }
}

/// Incremental simple moving average over the last `window` pushed values.
#[derive(Debug, Clone)]
pub struct RollingMean {
    window: NonZeroUsize,
    buffer: VecDeque<f64>,
    sum: CompensatedSum,
}

impl RollingMean {
    pub fn new(window: NonZeroUsize) -> Self {
        Self {
            window,
            buffer: VecDeque::with_capacity(window.get()),
            sum: CompensatedSum::default(),
        }
    }

    /// Pushes the next value and returns the mean of the trailing window, or
    /// `None` while fewer than `window` values have been seen.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        self.buffer.push_back(value);
        self.sum.add(value);
        if self.buffer.len() > self.window.get() {
            if let Some(evicted) = self.buffer.pop_front() {
                self.sum.add(-evicted);
            }
        }
        (self.buffer.len() == self.window.get()).then(|| self.sum.value() / self.window.get() as f64)
    }
}

/// Simple moving average of `series`, same length as the input.
///
/// Element `i` is the mean of `series[i + 1 - window..=i]` when
/// `i + 1 >= window`, otherwise `None`.
pub fn rolling_mean(series: &[f64], window: NonZeroUsize) -> Vec<Option<f64>> {
    let mut mean = RollingMean::new(window);
    series.iter().map(|&v| mean.push(v)).collect()
}
