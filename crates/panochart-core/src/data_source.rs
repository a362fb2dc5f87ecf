//! Source ports and request types.
//!
//! The core consumes three upstream capabilities, each a `Send + Sync` trait
//! returning boxed futures so implementations can be shared behind `Arc`:
//!
//! | Port | Operation | Returns |
//! |------|-----------|---------|
//! | [`CandleSource`] | [`series`](CandleSource::series), [`last_n`](CandleSource::last_n) | [`CandleSeries`] |
//! | [`SymbolUniverse`] | [`symbols`](SymbolUniverse::symbols) | `Vec<Symbol>` |
//! | [`VolumeSource`] | [`volumes`](VolumeSource::volumes) | `HashMap<String, f64>` |
//!
//! Timeouts, retries and rate limits belong to the implementations.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{CandleSeries, Symbol, Timeframe, UtcDateTime, ValidationError};

/// Boxed future returned by source ports.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    RateLimited,
    InvalidRequest,
    NotFound,
    Internal,
}

/// Structured upstream/transport error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::NotFound,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::NotFound => "source.not_found",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

impl From<ValidationError> for SourceError {
    /// Upstream payloads that fail domain validation are reported as internal errors.
    fn from(value: ValidationError) -> Self {
        Self::internal(format!("upstream candle data rejected: {value}"))
    }
}

/// Range request for [`CandleSource::series`].
///
/// `from` is inclusive and `to` exclusive; `None` leaves the bound to the source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesQuery {
    pub symbol: Symbol,
    pub timeframe: Timeframe,
    pub from: Option<UtcDateTime>,
    pub to: Option<UtcDateTime>,
}

impl SeriesQuery {
    pub fn new(
        symbol: Symbol,
        timeframe: Timeframe,
        from: Option<UtcDateTime>,
        to: Option<UtcDateTime>,
    ) -> Result<Self, SourceError> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(SourceError::invalid_request(format!(
                    "range start {from} is after range end {to}"
                )));
            }
        }
        Ok(Self {
            symbol,
            timeframe,
            from,
            to,
        })
    }

    /// Query for the source's default window.
    pub fn latest(symbol: Symbol, timeframe: Timeframe) -> Self {
        Self {
            symbol,
            timeframe,
            from: None,
            to: None,
        }
    }
}

/// Candle retrieval port.
pub trait CandleSource: Send + Sync {
    /// Candles in the requested range, oldest first; may be empty or gapped.
    fn series<'a>(&'a self, query: &'a SeriesQuery) -> SourceFuture<'a, CandleSeries>;

    /// At most `n` completed candles, oldest first.
    ///
    /// The in-progress candle (one whose period has not yet closed) is never included.
    fn last_n<'a>(
        &'a self,
        symbol: &'a Symbol,
        timeframe: Timeframe,
        n: usize,
    ) -> SourceFuture<'a, CandleSeries>;
}

/// Tradable instrument universe port.
pub trait SymbolUniverse: Send + Sync {
    fn symbols(&self) -> SourceFuture<'_, Vec<Symbol>>;
}

/// Trading volume port, keyed by normalized symbol string.
pub trait VolumeSource: Send + Sync {
    fn volumes(&self) -> SourceFuture<'_, HashMap<String, f64>>;
}
