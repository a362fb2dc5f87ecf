use thiserror::Error;

use crate::data_source::SourceError;

/// Validation failures for domain value objects.
///
/// Always surfaced to the caller; never retried or silently corrected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol cannot be whitespace-only")]
    BlankSymbol,
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("timeframe cannot be empty")]
    EmptyTimeframe,
    #[error("invalid timeframe '{value}', expected one of 1m, 5m, 15m, 1h, 4h, 1d")]
    InvalidTimeframe { value: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("candle high must be >= max(open, close)")]
    HighBelowBody,
    #[error("candle low must be <= min(open, close)")]
    LowAboveBody,
    #[error("candle high must be >= low")]
    HighBelowLow,
    #[error("{timeframe} candle timestamp {timestamp} is not aligned: {reason}")]
    Misaligned {
        timeframe: &'static str,
        timestamp: String,
        reason: &'static str,
    },

    #[error("candle symbol {candle} does not match series symbol {series}")]
    CandleSymbolMismatch { candle: String, series: String },
    #[error("candle timeframe {candle} does not match series timeframe {series}")]
    CandleTimeframeMismatch {
        candle: &'static str,
        series: &'static str,
    },
    #[error("duplicate candle timestamp {timestamp}")]
    DuplicateTimestamp { timestamp: String },
}

/// Access failures on a [`crate::CandleSeries`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SeriesError {
    #[error("index {index} out of bounds (series length: {len})")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("candle series is empty")]
    Empty,
}

/// Score calculator failures. These abort an enclosing ranking.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScoreError {
    #[error("{calculator} requires at least {required} candles, got {actual}")]
    InsufficientCandles {
        calculator: &'static str,
        required: usize,
        actual: usize,
    },
    #[error("first close is zero, cannot normalize")]
    ZeroFirstClose,
    #[error("zero index variance in regression")]
    DegenerateRegression,
    #[error(transparent)]
    Series(#[from] SeriesError),
}

/// Ranking failures. A single calculator error fails the whole ranking.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RankError {
    #[error("calculator {calculator} failed for {symbol}: {source}")]
    Calculator {
        calculator: &'static str,
        symbol: String,
        #[source]
        source: ScoreError,
    },
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Overview aggregation failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OverviewError {
    #[error("ranking failed: {0}")]
    Rankings(#[from] RankError),
    #[error("no candles available for any ranked symbol")]
    NoCandles,
    #[error("overview aggregation cancelled")]
    Cancelled,
}

/// Symbol detail failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DetailError {
    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("score computation failed: {0}")]
    Score(#[from] RankError),
}
