//! Shared fixtures and port doubles for unit tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use time::{Duration, OffsetDateTime};

use crate::adapters::Clock;
use crate::data_source::{CandleSource, SeriesQuery, SourceError, SourceFuture};
use crate::{Candle, CandleSeries, Symbol, Timeframe, UtcDateTime};

/// 2026-01-01T00:00:00Z
pub fn epoch() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(1_767_225_600).expect("valid epoch")
}

/// Clock pinned one day after [`epoch`], so fixture candles are all closed.
pub fn day_after_epoch() -> Clock {
    let now = UtcDateTime::from_offset_datetime(epoch() + Duration::days(1)).expect("utc");
    Arc::new(move || now)
}

/// One-minute series for `symbol` with the given closes, starting at [`epoch`].
pub fn series_for(symbol: &str, closes: &[f64]) -> CandleSeries {
    let symbol = Symbol::parse(symbol).expect("valid symbol");
    let candles = closes
        .iter()
        .enumerate()
        .map(|(index, &close)| {
            Candle::new(
                symbol.clone(),
                Timeframe::OneMinute,
                epoch() + Duration::minutes(index as i64),
                close,
                close,
                close,
                close,
                1.0,
            )
            .expect("valid candle")
        })
        .collect();
    CandleSeries::new(symbol, Timeframe::OneMinute, candles).expect("valid series")
}

pub fn series_from_closes(closes: &[f64]) -> CandleSeries {
    series_for("TESTUSDT", closes)
}

/// Candle source that fails for selected symbols and counts every call.
pub struct FlakySource<S> {
    pub inner: S,
    pub failing: HashSet<String>,
    pub calls: AtomicUsize,
}

impl<S> FlakySource<S> {
    pub fn new(inner: S, failing: &[&str]) -> Self {
        Self {
            inner,
            failing: failing.iter().map(|s| (*s).to_owned()).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self, symbol: &Symbol) -> Result<(), SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(symbol.as_str()) {
            return Err(SourceError::unavailable(format!("upstream down for {symbol}")));
        }
        Ok(())
    }
}

impl<S: CandleSource> CandleSource for FlakySource<S> {
    fn series<'a>(&'a self, query: &'a SeriesQuery) -> SourceFuture<'a, CandleSeries> {
        Box::pin(async move {
            self.check(&query.symbol)?;
            self.inner.series(query).await
        })
    }

    fn last_n<'a>(
        &'a self,
        symbol: &'a Symbol,
        timeframe: Timeframe,
        n: usize,
    ) -> SourceFuture<'a, CandleSeries> {
        Box::pin(async move {
            self.check(symbol)?;
            self.inner.last_n(symbol, timeframe, n).await
        })
    }
}
