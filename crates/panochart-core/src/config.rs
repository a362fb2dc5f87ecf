//! Process settings and logging bootstrap.
//!
//! Settings are read once at startup and handed to components through their
//! constructors.

use std::str::FromStr;
use std::time::Duration;

use dotenv::dotenv;
use tracing_subscriber::EnvFilter;

use crate::usecases::{
    DEFAULT_DETAIL_LIMIT, DEFAULT_MAX_WORKERS, DEFAULT_SPARKLINE_PRECISION, MAX_DETAIL_LIMIT,
};

pub const MAX_SPARKLINE_PRECISION: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub redis_url: String,
    pub candle_cache_ttl: Duration,
    pub universe_cache_ttl: Duration,
    pub volume_cache_ttl: Duration,
    pub rankings_cache_ttl: Duration,
    pub overview_cache_ttl: Duration,
    pub sparkline_precision: usize,
    pub overview_max_workers: usize,
    pub detail_default_limit: usize,
    pub detail_max_limit: usize,
    pub universe_cache_key: String,
    pub volume_cache_key: String,
    pub rankings_key_prefix: String,
    pub overview_key_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            redis_url: String::from("redis://localhost:6379"),
            candle_cache_ttl: Duration::from_secs(300),
            universe_cache_ttl: Duration::from_secs(1800),
            volume_cache_ttl: Duration::from_secs(120),
            rankings_cache_ttl: Duration::from_secs(60),
            overview_cache_ttl: Duration::from_secs(60),
            sparkline_precision: DEFAULT_SPARKLINE_PRECISION,
            overview_max_workers: DEFAULT_MAX_WORKERS,
            detail_default_limit: DEFAULT_DETAIL_LIMIT,
            detail_max_limit: MAX_DETAIL_LIMIT,
            universe_cache_key: String::from("symbol_universe:exchange_info"),
            volume_cache_key: String::from("binance:24h_volume"),
            rankings_key_prefix: String::from("rankings"),
            overview_key_prefix: String::from("overview"),
        }
    }
}

impl Settings {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Self {
        dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds settings from any variable lookup. Absent or unparsable values
    /// keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let secs = |name: &str, default: Duration| {
            parsed::<u64>(&lookup, name).map_or(default, Duration::from_secs)
        };

        let sparkline_precision = parsed::<usize>(&lookup, "OVERVIEW_SPARKLINE_PRECISION")
            .unwrap_or(defaults.sparkline_precision)
            .clamp(1, MAX_SPARKLINE_PRECISION);
        let overview_max_workers = parsed::<usize>(&lookup, "PC_OVERVIEW_MAX_WORKERS")
            .unwrap_or(defaults.overview_max_workers)
            .max(1);

        Self {
            redis_url: lookup("PC_REDIS_URL")
                .filter(|value| !value.trim().is_empty())
                .unwrap_or(defaults.redis_url),
            candle_cache_ttl: secs("PC_CANDLE_CACHE_TTL_SECS", defaults.candle_cache_ttl),
            universe_cache_ttl: secs("PC_UNIVERSE_CACHE_TTL_SECS", defaults.universe_cache_ttl),
            volume_cache_ttl: secs("PC_VOLUME_CACHE_TTL_SECS", defaults.volume_cache_ttl),
            rankings_cache_ttl: secs("PC_RANKINGS_CACHE_TTL_SECS", defaults.rankings_cache_ttl),
            overview_cache_ttl: secs("PC_OVERVIEW_CACHE_TTL_SECS", defaults.overview_cache_ttl),
            sparkline_precision,
            overview_max_workers,
            detail_default_limit: parsed(&lookup, "PC_DETAIL_DEFAULT_LIMIT")
                .unwrap_or(defaults.detail_default_limit),
            detail_max_limit: parsed(&lookup, "PC_DETAIL_MAX_LIMIT")
                .unwrap_or(defaults.detail_max_limit),
            ..defaults
        }
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    lookup(name).and_then(|value| value.trim().parse().ok())
}

/// Installs a fmt subscriber filtered by `RUST_LOG` (default `info`).
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
