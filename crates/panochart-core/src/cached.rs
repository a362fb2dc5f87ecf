//! # Cached Ports
//!
//! Cache-aside decorators for every expensive boundary call. Each one owns a
//! [`CacheAside`] configured with its key shape and payload codec; the
//! read-through contract itself lives in `panochart-cache`.
//!
//! | Decorator | Key |
//! |-----------|-----|
//! | [`CachedCandleSource::series`](CandleSource::series) | `SYMBOL\|tf\|from\|to` |
//! | [`CachedCandleSource::last_n`](CandleSource::last_n) | `SYMBOL\|tf\|last\|n` |
//! | [`CachedUniverse`] | fixed key |
//! | [`CachedVolumes`] | fixed key |
//! | [`CachedRankings`] | `prefix:tf:sort` |
//! | [`CachedOverview`] | `prefix:tf:limit` |
//!
//! Candle payloads are rebuilt through [`Candle::new`] and [`CandleSeries::new`],
//! so a single invalid record turns the whole entry into a miss.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use panochart_cache::{CacheAside, CacheError, CachePolicy, TtlCache};
use serde::Deserialize;

use crate::data_source::{
    CandleSource, SeriesQuery, SourceFuture, SymbolUniverse, VolumeSource,
};
use crate::ranking::RankFuture;
use crate::usecases::{
    OverviewFuture, OverviewRequest, OverviewResult, OverviewUseCase, RankedResult,
    RankingsRequest, RankingsUseCase,
};
use crate::{Candle, CandleSeries, Symbol, Timeframe, UtcDateTime};

/// Cached candle payload: the candle without its symbol and timeframe.
#[derive(Deserialize)]
struct CandleRecord {
    timestamp: UtcDateTime,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

fn encode_series(series: &CandleSeries) -> Result<Vec<u8>, CacheError> {
    serde_json::to_vec(series.candles()).map_err(CacheError::encode)
}

fn decode_series(
    symbol: &Symbol,
    timeframe: Timeframe,
    bytes: &[u8],
) -> Result<CandleSeries, CacheError> {
    let records: Vec<CandleRecord> = serde_json::from_slice(bytes).map_err(CacheError::decode)?;
    let candles = records
        .into_iter()
        .map(|record| {
            Candle::new(
                symbol.clone(),
                timeframe,
                record.timestamp.into_inner(),
                record.open,
                record.high,
                record.low,
                record.close,
                record.volume,
            )
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(CacheError::decode)?;

    CandleSeries::new(symbol.clone(), timeframe, candles).map_err(CacheError::decode)
}

fn bound_key(bound: Option<UtcDateTime>) -> String {
    bound.map(UtcDateTime::format_rfc3339).unwrap_or_default()
}

/// Cache key for a range query.
pub fn series_key(query: &SeriesQuery) -> String {
    format!(
        "{}|{}|{}|{}",
        query.symbol,
        query.timeframe,
        bound_key(query.from),
        bound_key(query.to)
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LastN {
    symbol: Symbol,
    timeframe: Timeframe,
    n: usize,
}

fn last_n_key(query: &LastN) -> String {
    format!("{}|{}|last|{}", query.symbol, query.timeframe, query.n)
}

/// Caches both range and last-N candle lookups.
pub struct CachedCandleSource {
    inner: Arc<dyn CandleSource>,
    series: CacheAside<SeriesQuery, CandleSeries>,
    last_n: CacheAside<LastN, CandleSeries>,
}

impl CachedCandleSource {
    pub fn new(inner: Arc<dyn CandleSource>, store: Arc<dyn TtlCache>, ttl: Duration) -> Self {
        Self {
            inner,
            series: CacheAside::new(
                "candles",
                Arc::clone(&store),
                ttl,
                CachePolicy::new(series_key, encode_series, |query: &SeriesQuery, bytes: &[u8]| {
                    decode_series(&query.symbol, query.timeframe, bytes)
                }),
            ),
            last_n: CacheAside::new(
                "candles_last_n",
                store,
                ttl,
                CachePolicy::new(last_n_key, encode_series, |query: &LastN, bytes: &[u8]| {
                    decode_series(&query.symbol, query.timeframe, bytes)
                }),
            ),
        }
    }
}

impl CandleSource for CachedCandleSource {
    fn series<'a>(&'a self, query: &'a SeriesQuery) -> SourceFuture<'a, CandleSeries> {
        Box::pin(
            self.series
                .read_through(query, || self.inner.series(query)),
        )
    }

    fn last_n<'a>(
        &'a self,
        symbol: &'a Symbol,
        timeframe: Timeframe,
        n: usize,
    ) -> SourceFuture<'a, CandleSeries> {
        Box::pin(async move {
            let query = LastN {
                symbol: symbol.clone(),
                timeframe,
                n,
            };
            self.last_n
                .read_through(&query, || self.inner.last_n(symbol, timeframe, n))
                .await
        })
    }
}

/// Caches the symbol universe under one fixed key.
pub struct CachedUniverse {
    inner: Arc<dyn SymbolUniverse>,
    key: String,
    cache: CacheAside<str, Vec<Symbol>>,
}

impl CachedUniverse {
    pub fn new(
        inner: Arc<dyn SymbolUniverse>,
        store: Arc<dyn TtlCache>,
        ttl: Duration,
        key: impl Into<String>,
    ) -> Self {
        Self {
            inner,
            key: key.into(),
            cache: CacheAside::new("universe", store, ttl, CachePolicy::json(str::to_owned)),
        }
    }
}

impl SymbolUniverse for CachedUniverse {
    fn symbols(&self) -> SourceFuture<'_, Vec<Symbol>> {
        Box::pin(self.cache.read_through(&self.key, || self.inner.symbols()))
    }
}

/// Caches the volume map under one fixed key.
pub struct CachedVolumes {
    inner: Arc<dyn VolumeSource>,
    key: String,
    cache: CacheAside<str, HashMap<String, f64>>,
}

impl CachedVolumes {
    pub fn new(
        inner: Arc<dyn VolumeSource>,
        store: Arc<dyn TtlCache>,
        ttl: Duration,
        key: impl Into<String>,
    ) -> Self {
        Self {
            inner,
            key: key.into(),
            cache: CacheAside::new("volumes", store, ttl, CachePolicy::json(str::to_owned)),
        }
    }
}

impl VolumeSource for CachedVolumes {
    fn volumes(&self) -> SourceFuture<'_, HashMap<String, f64>> {
        Box::pin(self.cache.read_through(&self.key, || self.inner.volumes()))
    }
}

/// Caches full rankings per timeframe and sort mode.
pub struct CachedRankings {
    inner: Arc<dyn RankingsUseCase>,
    cache: CacheAside<RankingsRequest, Vec<RankedResult>>,
}

impl CachedRankings {
    pub fn new(
        inner: Arc<dyn RankingsUseCase>,
        store: Arc<dyn TtlCache>,
        ttl: Duration,
        prefix: impl Into<String>,
    ) -> Self {
        let prefix = prefix.into();
        Self {
            inner,
            cache: CacheAside::new(
                "rankings",
                store,
                ttl,
                CachePolicy::json(move |request: &RankingsRequest| {
                    format!("{prefix}:{}:{}", request.timeframe, request.sort)
                }),
            ),
        }
    }
}

impl RankingsUseCase for CachedRankings {
    fn execute<'a>(&'a self, request: &'a RankingsRequest) -> RankFuture<'a, Vec<RankedResult>> {
        Box::pin(
            self.cache
                .read_through(request, || self.inner.execute(request)),
        )
    }
}

/// Caches overview results per timeframe and limit.
pub struct CachedOverview {
    inner: Arc<dyn OverviewUseCase>,
    cache: CacheAside<OverviewRequest, Vec<OverviewResult>>,
}

impl CachedOverview {
    pub fn new(
        inner: Arc<dyn OverviewUseCase>,
        store: Arc<dyn TtlCache>,
        ttl: Duration,
        prefix: impl Into<String>,
    ) -> Self {
        let prefix = prefix.into();
        Self {
            inner,
            cache: CacheAside::new(
                "overview",
                store,
                ttl,
                CachePolicy::json(move |request: &OverviewRequest| {
                    format!("{prefix}:{}:{}", request.timeframe, request.limit)
                }),
            ),
        }
    }
}

impl OverviewUseCase for CachedOverview {
    fn execute<'a>(&'a self, request: &'a OverviewRequest) -> OverviewFuture<'a> {
        Box::pin(
            self.cache
                .read_through(request, || self.inner.execute(request)),
        )
    }
}
