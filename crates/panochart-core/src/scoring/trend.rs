use crate::scoring::{price_bounds, require_candles, ScoreCalculator};
use crate::{CandleSeries, ScoreError};

/// Least-squares slope of close against index, scaled by price range and R².
///
/// Positive for clean uptrends, negative for clean downtrends, near zero for
/// noisy or flat series.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendPredictability;

impl TrendPredictability {
    pub const NAME: &'static str = "Trend Predictability";
}

impl ScoreCalculator for TrendPredictability {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn score(&self, series: &CandleSeries) -> Result<f64, ScoreError> {
        require_candles(Self::NAME, series, 2)?;

        let closes = series.closes();
        let n = closes.len() as f64;
        let mean_x = (n - 1.0) / 2.0;
        let mean_y = closes.iter().sum::<f64>() / n;

        let (mut covariance, mut variance_x) = (0.0, 0.0);
        for (index, close) in closes.iter().enumerate() {
            let dx = index as f64 - mean_x;
            covariance += dx * (close - mean_y);
            variance_x += dx * dx;
        }
        if variance_x == 0.0 {
            return Err(ScoreError::DegenerateRegression);
        }
        let slope = covariance / variance_x;

        let (mut ss_tot, mut ss_res) = (0.0, 0.0);
        for (index, close) in closes.iter().enumerate() {
            let fit = mean_y + slope * (index as f64 - mean_x);
            ss_tot += (close - mean_y).powi(2);
            ss_res += (close - fit).powi(2);
        }
        // Flat line: R² is undefined and the trend is scored 0.
        if ss_tot == 0.0 {
            return Ok(0.0);
        }
        let r_squared = 1.0 - ss_res / ss_tot;

        let (min, max) = price_bounds(&closes);
        let range = max - min;
        if range == 0.0 {
            return Ok(0.0);
        }

        Ok(slope / range * r_squared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::series_from_closes;

    #[test]
    fn perfect_uptrend_scores_normalized_slope() {
        // slope 1 per candle over a range of 4, R² = 1.
        let score = TrendPredictability
            .score(&series_from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0]))
            .expect("valid");
        assert!((score - 0.25).abs() < 1e-12, "score was {score}");
    }

    #[test]
    fn downtrend_is_negative_and_scale_invariant() {
        let small = TrendPredictability
            .score(&series_from_closes(&[5.0, 4.0, 3.0, 2.0, 1.0]))
            .expect("valid");
        let large = TrendPredictability
            .score(&series_from_closes(&[500.0, 400.0, 300.0, 200.0, 100.0]))
            .expect("valid");
        assert!(small < 0.0);
        assert!((small - large).abs() < 1e-12);
    }

    #[test]
    fn flat_series_scores_zero() {
        let score = TrendPredictability
            .score(&series_from_closes(&[7.0; 8]))
            .expect("flat is not an error");
        assert_eq!(score, 0.0);
    }

    #[test]
    fn noisy_series_is_damped_by_fit() {
        let clean = TrendPredictability
            .score(&series_from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]))
            .expect("valid");
        let noisy = TrendPredictability
            .score(&series_from_closes(&[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]))
            .expect("valid");
        assert!(noisy > 0.0);
        assert!(noisy < clean);
    }

    #[test]
    fn requires_two_candles() {
        let err = TrendPredictability
            .score(&series_from_closes(&[1.0]))
            .expect_err("must fail");
        assert!(matches!(err, ScoreError::InsufficientCandles { .. }));
    }
}
