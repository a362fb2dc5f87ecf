//! # Panochart Cache
//!
//! Best-effort TTL caching for the panochart scoring service.
//!
//! ## Overview
//!
//! - **[`TtlCache`]**: the key-value port (`get`/`set` with expiry)
//! - **[`MemoryCache`]**: in-process store, used in tests and single-node setups
//! - **[`RedisCache`]**: Redis-backed store over a multiplexed connection
//! - **[`CacheAside`]**: generic read-through wrapper parameterized by a
//!   [`CachePolicy`] (key builder, encoder, decoder)
//!
//! A cache is never a dependency whose failure reaches the caller. Read errors,
//! write errors and undecodable entries all fall through to the wrapped loader.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use panochart_cache::{CacheAside, CachePolicy, MemoryCache};
//!
//! let aside = CacheAside::new(
//!     "volumes",
//!     Arc::new(MemoryCache::new()),
//!     Duration::from_secs(120),
//!     CachePolicy::<(), Vec<String>>::json(|_| "binance:24h_volume".to_owned()),
//! );
//! let value = aside.read_through(&(), || async { Ok::<_, MyError>(load().await?) }).await?;
//! ```

pub mod aside;
pub mod error;
pub mod memory;
pub mod redis_store;
pub mod store;

pub use aside::{CacheAside, CachePolicy};
pub use error::CacheError;
pub use memory::MemoryCache;
pub use redis_store::RedisCache;
pub use store::{CacheFuture, TtlCache};
