use std::collections::HashSet;

use crate::{Candle, SeriesError, Symbol, Timeframe, UtcDateTime, ValidationError};

/// Immutable, timestamp-ascending candles for one symbol and timeframe.
///
/// An empty series is valid and means "no data available".
#[derive(Debug, Clone, PartialEq)]
pub struct CandleSeries {
    symbol: Symbol,
    timeframe: Timeframe,
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Builds a sorted series, rejecting foreign or duplicate candles.
    ///
    /// Input order is irrelevant; duplicates are detected by identity, so two
    /// candles at the same timestamp are rejected even if their prices differ.
    pub fn new(
        symbol: Symbol,
        timeframe: Timeframe,
        candles: Vec<Candle>,
    ) -> Result<Self, ValidationError> {
        for candle in &candles {
            if candle.symbol() != &symbol {
                return Err(ValidationError::CandleSymbolMismatch {
                    candle: candle.symbol().to_string(),
                    series: symbol.to_string(),
                });
            }
            if candle.timeframe() != timeframe {
                return Err(ValidationError::CandleTimeframeMismatch {
                    candle: candle.timeframe().as_str(),
                    series: timeframe.as_str(),
                });
            }
        }

        let mut seen = HashSet::with_capacity(candles.len());
        for candle in &candles {
            if !seen.insert(candle.timestamp()) {
                return Err(ValidationError::DuplicateTimestamp {
                    timestamp: candle.timestamp().format_rfc3339(),
                });
            }
        }

        let mut candles = candles;
        candles.sort_by_key(Candle::timestamp);

        Ok(Self {
            symbol,
            timeframe,
            candles,
        })
    }

    pub fn empty(symbol: Symbol, timeframe: Timeframe) -> Self {
        Self {
            symbol,
            timeframe,
            candles: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub const fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn at(&self, index: usize) -> Result<&Candle, SeriesError> {
        self.candles.get(index).ok_or(SeriesError::IndexOutOfBounds {
            index,
            len: self.candles.len(),
        })
    }

    pub fn first(&self) -> Result<&Candle, SeriesError> {
        self.candles.first().ok_or(SeriesError::Empty)
    }

    pub fn last(&self) -> Result<&Candle, SeriesError> {
        self.candles.last().ok_or(SeriesError::Empty)
    }

    /// Owned copy of every candle, oldest first.
    pub fn all(&self) -> Vec<Candle> {
        self.candles.clone()
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    /// Borrowing iterator, oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, Candle> {
        self.candles.iter()
    }

    /// Close prices in chronological order.
    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(Candle::close).collect()
    }

    /// True when the candle after `index` is not exactly one timeframe later.
    ///
    /// Indices without a successor report no gap.
    pub fn has_gap_after(&self, index: usize) -> bool {
        let (Some(current), Some(next)) = (self.candles.get(index), self.candles.get(index + 1))
        else {
            return false;
        };

        let expected: Option<UtcDateTime> =
            current.timestamp().checked_add(self.timeframe.duration());
        expected != Some(next.timestamp())
    }
}

impl<'a> IntoIterator for &'a CandleSeries {
    type Item = &'a Candle;
    type IntoIter = std::slice::Iter<'a, Candle>;

    fn into_iter(self) -> Self::IntoIter {
        self.candles.iter()
    }
}
