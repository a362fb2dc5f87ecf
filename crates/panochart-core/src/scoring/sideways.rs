use crate::scoring::{price_bounds, require_candles, ScoreCalculator};
use crate::{CandleSeries, ScoreError};

const WINDOW: usize = 5;

/// Scores range-bound, oscillating price action in `[0, 1]`.
///
/// The score is the product of three sub-scores, each clamped to `[0, 1]`:
/// low net displacement relative to the full range, stable rolling-window
/// ranges, and a high density of local extrema.
#[derive(Debug, Clone, Copy, Default)]
pub struct SidewaysConsistency;

impl SidewaysConsistency {
    pub const NAME: &'static str = "Sideways Consistency";
}

impl ScoreCalculator for SidewaysConsistency {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn score(&self, series: &CandleSeries) -> Result<f64, ScoreError> {
        require_candles(Self::NAME, series, 6)?;

        let closes = series.closes();
        let (min, max) = price_bounds(&closes);
        let range = max - min;
        if range == 0.0 {
            return Ok(0.0);
        }

        let displacement = net_displacement(&closes, range);
        let stability = range_stability(&closes);
        let density = oscillation_density(&closes);

        Ok(((1.0 - displacement) * stability * density).clamp(0.0, 1.0))
    }
}

fn net_displacement(closes: &[f64], range: f64) -> f64 {
    let first = closes[0];
    let last = closes[closes.len() - 1];
    ((last - first).abs() / range).clamp(0.0, 1.0)
}

fn range_stability(closes: &[f64]) -> f64 {
    let window = WINDOW.min(closes.len());
    let ranges: Vec<f64> = closes
        .windows(window)
        .map(|slice| {
            let (min, max) = price_bounds(slice);
            max - min
        })
        .collect();

    let count = ranges.len() as f64;
    let mean = ranges.iter().sum::<f64>() / count;
    if mean <= 0.0 {
        return 0.0;
    }
    let variance = ranges.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / count;

    (1.0 - variance.sqrt() / mean).clamp(0.0, 1.0)
}

fn oscillation_density(closes: &[f64]) -> f64 {
    let candidates = closes.len().saturating_sub(2);
    if candidates == 0 {
        return 0.0;
    }
    let extrema = closes
        .windows(3)
        .filter(|w| (w[1] > w[0] && w[1] > w[2]) || (w[1] < w[0] && w[1] < w[2]))
        .count();

    (extrema as f64 / candidates as f64).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::series_from_closes;

    #[test]
    fn flat_series_scores_exactly_zero() {
        let score = SidewaysConsistency
            .score(&series_from_closes(&[42.0; 10]))
            .expect("flat is not an error");
        assert_eq!(score, 0.0);
    }

    #[test]
    fn requires_six_candles() {
        let err = SidewaysConsistency
            .score(&series_from_closes(&[1.0, 2.0, 1.0, 2.0, 1.0]))
            .expect_err("must fail");
        assert_eq!(
            err,
            ScoreError::InsufficientCandles {
                calculator: SidewaysConsistency::NAME,
                required: 6,
                actual: 5,
            }
        );
    }

    #[test]
    fn steady_zigzag_scores_near_one() {
        // Every interior point is an extremum, window ranges are constant,
        // and the series ends where it started.
        let closes = [1.0, 2.0, 1.0, 2.0, 1.0, 2.0, 1.0, 2.0, 1.0];
        let score = SidewaysConsistency
            .score(&series_from_closes(&closes))
            .expect("valid");
        assert!((score - 1.0).abs() < 1e-12, "score was {score}");
    }

    #[test]
    fn monotonic_trend_scores_zero() {
        let score = SidewaysConsistency
            .score(&series_from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]))
            .expect("valid");
        assert_eq!(score, 0.0);
    }

    #[test]
    fn score_stays_within_unit_interval() {
        let closes = [10.0, 12.0, 9.0, 15.0, 11.0, 30.0, 8.0, 13.0];
        let score = SidewaysConsistency
            .score(&series_from_closes(&closes))
            .expect("valid");
        assert!((0.0..=1.0).contains(&score));
    }
}
