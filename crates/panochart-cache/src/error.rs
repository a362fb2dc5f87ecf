use std::fmt::Display;

use thiserror::Error;

/// Failures raised by cache stores and payload codecs.
///
/// None of these ever reach the caller of a cached component; [`crate::CacheAside`]
/// logs them and falls through to the source of truth.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),
    #[error("failed to encode cache payload: {0}")]
    Encode(String),
    #[error("failed to decode cache payload: {0}")]
    Decode(String),
}

impl CacheError {
    pub fn backend(error: impl Display) -> Self {
        Self::Backend(error.to_string())
    }

    pub fn encode(error: impl Display) -> Self {
        Self::Encode(error.to_string())
    }

    pub fn decode(error: impl Display) -> Self {
        Self::Decode(error.to_string())
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(value: redis::RedisError) -> Self {
        Self::backend(value)
    }
}
