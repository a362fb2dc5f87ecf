//! Core of the panochart scoring service.
//!
//! This crate contains:
//! - Validated candle domain models (`Symbol`, `Timeframe`, `Candle`, `CandleSeries`)
//! - Score calculators and the weighted ranking engine
//! - Source ports with in-memory reference adapters
//! - Cache-aside decorators over `panochart-cache`
//! - Use cases: candle series, rankings, overview sparklines, symbol detail
//! - Settings and logging bootstrap

pub mod adapters;
pub mod cached;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod ranking;
pub mod scoring;
pub mod usecases;

#[cfg(test)]
mod testing;

pub use adapters::{Clock, MemoryCandleSource, StaticUniverse, StaticVolumes, BINANCE_TOP_15};
pub use cached::{CachedCandleSource, CachedOverview, CachedRankings, CachedUniverse, CachedVolumes};
pub use config::{init_tracing, Settings};
pub use data_source::{
    CandleSource, SeriesQuery, SourceError, SourceErrorKind, SourceFuture, SymbolUniverse,
    VolumeSource,
};
pub use domain::{Candle, CandleSeries, Symbol, Timeframe, UtcDateTime};
pub use error::{
    DetailError, OverviewError, RankError, ScoreError, SeriesError, ValidationError,
};
pub use ranking::{
    default_weights, RankFuture, RankedSymbol, Ranker, ScoreWeight, SortMode, SymbolStats,
    VolumeSortedRanker, WeightedRanker, WeightedScorer,
};
pub use scoring::{GainLoss, ScoreCalculator, SidewaysConsistency, TrendPredictability};
pub use usecases::{
    GetCandleSeries, GetOverview, GetRankings, GetSymbolDetail, OverviewRequest, OverviewResult,
    OverviewUseCase, RankedResult, RankingsPage, RankingsRequest, RankingsUseCase, SymbolDetail,
    SymbolDetailRequest,
};
