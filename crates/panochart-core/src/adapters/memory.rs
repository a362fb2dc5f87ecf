use std::collections::HashMap;
use std::sync::Arc;

use crate::data_source::{CandleSource, SeriesQuery, SourceError, SourceFuture};
use crate::{Candle, CandleSeries, Symbol, Timeframe, UtcDateTime};

/// Source of "now" used to decide whether a candle has closed.
pub type Clock = Arc<dyn Fn() -> UtcDateTime + Send + Sync>;

/// In-memory candle store keyed by symbol and timeframe.
///
/// Serves as the reference [`CandleSource`] for wiring and tests. Symbols that
/// were never loaded report `not_found`; a loaded symbol without data for the
/// requested timeframe yields an empty series.
#[derive(Clone)]
pub struct MemoryCandleSource {
    store: HashMap<Symbol, HashMap<Timeframe, CandleSeries>>,
    clock: Clock,
}

impl Default for MemoryCandleSource {
    fn default() -> Self {
        Self {
            store: HashMap::new(),
            clock: Arc::new(UtcDateTime::now),
        }
    }
}

impl MemoryCandleSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a series, replacing any stored data for the same symbol/timeframe.
    pub fn with_series(mut self, series: CandleSeries) -> Self {
        self.store
            .entry(series.symbol().clone())
            .or_default()
            .insert(series.timeframe(), series);
        self
    }

    /// Pins the clock used by [`CandleSource::last_n`].
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn stored(&self, symbol: &Symbol, timeframe: Timeframe) -> Result<&[Candle], SourceError> {
        let by_timeframe = self.store.get(symbol).ok_or_else(|| {
            SourceError::not_found(format!("no candle data for symbol {symbol}"))
        })?;

        Ok(by_timeframe
            .get(&timeframe)
            .map(|series| series.candles())
            .unwrap_or_default())
    }

    fn range(&self, query: &SeriesQuery) -> Result<CandleSeries, SourceError> {
        let candles = self
            .stored(&query.symbol, query.timeframe)?
            .iter()
            .filter(|candle| query.from.map_or(true, |from| candle.timestamp() >= from))
            .filter(|candle| query.to.map_or(true, |to| candle.timestamp() < to))
            .cloned()
            .collect();

        Ok(CandleSeries::new(
            query.symbol.clone(),
            query.timeframe,
            candles,
        )?)
    }

    fn completed(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
        n: usize,
    ) -> Result<CandleSeries, SourceError> {
        let now = (self.clock)();
        let closed: Vec<&Candle> = self
            .stored(symbol, timeframe)?
            .iter()
            .filter(|candle| {
                candle
                    .timestamp()
                    .checked_add(timeframe.duration())
                    .is_some_and(|close_time| close_time <= now)
            })
            .collect();

        let skip = closed.len().saturating_sub(n);
        let candles = closed.into_iter().skip(skip).cloned().collect();

        Ok(CandleSeries::new(symbol.clone(), timeframe, candles)?)
    }
}

impl std::fmt::Debug for MemoryCandleSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCandleSource")
            .field("symbols", &self.store.len())
            .finish_non_exhaustive()
    }
}

impl CandleSource for MemoryCandleSource {
    fn series<'a>(&'a self, query: &'a SeriesQuery) -> SourceFuture<'a, CandleSeries> {
        Box::pin(async move { self.range(query) })
    }

    fn last_n<'a>(
        &'a self,
        symbol: &'a Symbol,
        timeframe: Timeframe,
        n: usize,
    ) -> SourceFuture<'a, CandleSeries> {
        Box::pin(async move { self.completed(symbol, timeframe, n) })
    }
}
