use crate::scoring::{require_candles, ScoreCalculator};
use crate::{CandleSeries, ScoreError};

/// Net relative change from the first close to the last.
#[derive(Debug, Clone, Copy, Default)]
pub struct GainLoss;

impl GainLoss {
    pub const NAME: &'static str = "Gain/Loss";
}

impl ScoreCalculator for GainLoss {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn score(&self, series: &CandleSeries) -> Result<f64, ScoreError> {
        require_candles(Self::NAME, series, 2)?;

        let first = series.first()?.close();
        let last = series.last()?.close();
        if first == 0.0 {
            return Err(ScoreError::ZeroFirstClose);
        }

        Ok((last - first) / first)
    }
}
