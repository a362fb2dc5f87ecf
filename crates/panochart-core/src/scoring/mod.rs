//! # Score Calculators
//!
//! Pure, stateless functions from a [`CandleSeries`] to a scalar score.
//!
//! | Calculator | Name | Min candles | Range |
//! |------------|------|-------------|-------|
//! | [`GainLoss`] | `Gain/Loss` | 2 | unbounded |
//! | [`TrendPredictability`] | `Trend Predictability` | 2 | unbounded, 0 for flat |
//! | [`SidewaysConsistency`] | `Sideways Consistency` | 6 | `[0, 1]` |
//!
//! Precondition violations are errors; genuine flat-line cases score 0.

mod gain_loss;
mod sideways;
mod trend;

pub use gain_loss::GainLoss;
pub use sideways::SidewaysConsistency;
pub use trend::TrendPredictability;

use crate::{CandleSeries, ScoreError};

/// Scores a candle series.
///
/// `name` is stable and used as the key in per-symbol score maps.
pub trait ScoreCalculator: Send + Sync {
    fn name(&self) -> &'static str;

    fn score(&self, series: &CandleSeries) -> Result<f64, ScoreError>;
}

fn require_candles(
    calculator: &'static str,
    series: &CandleSeries,
    required: usize,
) -> Result<(), ScoreError> {
    if series.len() < required {
        return Err(ScoreError::InsufficientCandles {
            calculator,
            required,
            actual: series.len(),
        });
    }
    Ok(())
}

/// Min and max of a non-empty slice.
fn price_bounds(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &value| {
            (min.min(value), max.max(value))
        })
}
