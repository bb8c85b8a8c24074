//! Component scores and the weighted composite for one symbol's series.

use std::num::NonZeroUsize;

use nonzero_ext::nonzero;
use serde::{Deserialize, Serialize};

use crate::error::{ScoreComponent, ScoringWarning};
use crate::rolling::RollingMean;
use crate::signal::classify;
use crate::table::{PriceBar, ScoredBar};

pub const SHORT_WINDOW: NonZeroUsize = nonzero!(10usize);
pub const MEDIUM_WINDOW: NonZeroUsize = nonzero!(50usize);
pub const LONG_WINDOW: NonZeroUsize = nonzero!(200usize);
/// Trailing window of the volume mean used by [`volume_score`].
pub const VOLUME_WINDOW: NonZeroUsize = nonzero!(50usize);

pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;

/// Weights of the five addends of the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub price_momentum: f64,
    pub volatility: f64,
    pub volume: f64,
    pub ema_sma: f64,
    pub rsi: f64,
}

impl ScoreWeights {
    pub const STANDARD: ScoreWeights = ScoreWeights {
        price_momentum: 0.25,
        volatility: 0.25,
        volume: 0.20,
        ema_sma: 0.20,
        rsi: 0.10,
    };

    /// Weighted sum, accumulated left to right in column order.
    pub fn combine(
        &self,
        price_momentum: f64,
        volatility: f64,
        volume: f64,
        ema_sma: i8,
        rsi: i8,
    ) -> f64 {
        self.price_momentum * price_momentum
            + self.volatility * volatility
            + self.volume * volume
            + self.ema_sma * f64::from(ema_sma)
            + self.rsi * f64::from(rsi)
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// When the composite score of a row counts as defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarmUpPolicy {
    /// Defined as soon as all five addends are, which takes 50 bars.
    ///
    /// `ma_200` is reported but is not an addend of the composite, so a
    /// symbol with 50 to 199 bars still gets scores. The stricter reading
    /// "fewer than 200 bars means no score" is [`WarmUpPolicy::LongestWindow`].
    #[default]
    ScoreInputs,
    /// Additionally requires `ma_200`, so nothing is scored before 200 bars.
    LongestWindow,
}

impl WarmUpPolicy {
    /// Bars of history a row needs before its score can be defined.
    pub const fn required_history(self) -> usize {
        match self {
            WarmUpPolicy::ScoreInputs => {
                if MEDIUM_WINDOW.get() > VOLUME_WINDOW.get() {
                    MEDIUM_WINDOW.get()
                } else {
                    VOLUME_WINDOW.get()
                }
            }
            WarmUpPolicy::LongestWindow => LONG_WINDOW.get(),
        }
    }
}

/// Percent change of close versus the previous close.
pub fn price_momentum(prev_close: f64, close: f64) -> Option<f64> {
    (prev_close != 0.0).then(|| (close - prev_close) / prev_close * 100.0)
}

/// Intraday range as a percent of close.
pub fn volatility_score(high: f64, low: f64, close: f64) -> Option<f64> {
    (close != 0.0).then(|| (high - low) / close * 100.0)
}

/// Percent deviation of volume from its trailing mean.
pub fn volume_score(volume: f64, trailing_mean: f64) -> Option<f64> {
    (trailing_mean != 0.0).then(|| (volume - trailing_mean) / trailing_mean * 100.0)
}

/// `+1` when the EMA is strictly above the 50-bar SMA, `-1` otherwise
/// (equality included).
pub fn ema_sma_score(ema: f64, ma_50: Option<f64>) -> Option<i8> {
    ma_50.map(|ma| if ema > ma { 1 } else { -1 })
}

/// `+2` oversold, `-2` overbought, `0` in between (bounds are neutral).
pub fn rsi_score(rsi: f64) -> i8 {
    if rsi < RSI_OVERSOLD {
        2
    } else if rsi > RSI_OVERBOUGHT {
        -2
    } else {
        0
    }
}

/// Scored rows of one partition plus the warnings raised while scoring it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesScores {
    pub rows: Vec<ScoredBar>,
    pub warnings: Vec<ScoringWarning>,
    /// Rows left unscored by the warm-up policy.
    pub warm_up_rows: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreCalculator {
    weights: ScoreWeights,
    warm_up: WarmUpPolicy,
}

impl ScoreCalculator {
    pub fn new(warm_up: WarmUpPolicy) -> Self {
        Self {
            weights: ScoreWeights::STANDARD,
            warm_up,
        }
    }

    /// Scores one symbol's bars.
    ///
    /// `bars` must belong to a single symbol, be sorted by date ascending and
    /// carry no duplicate dates; the pipeline guarantees this. Every output
    /// value at index `i` depends only on `bars[..=i]`.
    pub fn score_series(&self, bars: Vec<PriceBar>) -> SeriesScores {
        let mut ma_10 = RollingMean::new(SHORT_WINDOW);
        let mut ma_50 = RollingMean::new(MEDIUM_WINDOW);
        let mut ma_200 = RollingMean::new(LONG_WINDOW);
        let mut volume_mean = RollingMean::new(VOLUME_WINDOW);

        let required = self.warm_up.required_history();
        let warm_up_rows = bars.len().min(required - 1);

        let mut warnings = Vec::new();
        if warm_up_rows > 0 {
            if let Some(first) = bars.first() {
                warnings.push(ScoringWarning::InsufficientHistory {
                    symbol: first.symbol.clone(),
                    rows: warm_up_rows,
                    required,
                });
            }
        }

        let mut prev_close: Option<f64> = None;
        let mut rows = Vec::with_capacity(bars.len());

        for bar in bars {
            let edge = |component| ScoringWarning::DivisionEdgeCase {
                symbol: bar.symbol.clone(),
                date: bar.date,
                component,
            };

            let ma_10 = ma_10.push(bar.close);
            let ma_50 = ma_50.push(bar.close);
            let ma_200 = ma_200.push(bar.close);
            let avg_volume = volume_mean.push(bar.volume);

            let price_momentum = match prev_close {
                Some(prev) => {
                    let m = price_momentum(prev, bar.close);
                    if m.is_none() {
                        warnings.push(edge(ScoreComponent::PriceMomentum));
                    }
                    m
                }
                None => None,
            };
            prev_close = Some(bar.close);

            let volatility_score = volatility_score(bar.high, bar.low, bar.close);
            if volatility_score.is_none() {
                warnings.push(edge(ScoreComponent::VolatilityScore));
            }

            let volume_score = match avg_volume {
                Some(avg) => {
                    let v = volume_score(bar.volume, avg);
                    if v.is_none() {
                        warnings.push(edge(ScoreComponent::VolumeScore));
                    }
                    v
                }
                None => None,
            };

            let ema_sma_score = ema_sma_score(bar.ema, ma_50);
            let rsi_score = rsi_score(bar.rsi);

            let past_warm_up = match self.warm_up {
                WarmUpPolicy::ScoreInputs => true,
                WarmUpPolicy::LongestWindow => ma_200.is_some(),
            };
            let investment_score = match (
                past_warm_up,
                price_momentum,
                volatility_score,
                volume_score,
                ema_sma_score,
            ) {
                (true, Some(pm), Some(vs), Some(vol), Some(es)) => {
                    Some(self.weights.combine(pm, vs, vol, es, rsi_score))
                }
                _ => None,
            };

            rows.push(ScoredBar {
                bar,
                ma_10,
                ma_50,
                ma_200,
                price_momentum,
                volatility_score,
                volume_score,
                ema_sma_score,
                rsi_score,
                investment_score,
                signal: classify(investment_score),
            });
        }

        SeriesScores {
            rows,
            warnings,
            warm_up_rows,
        }
    }
}
