//! # Domain Models
//!
//! Validated, immutable value objects for candle data.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Uppercase instrument identifier (`[A-Z0-9_-]`) |
//! | [`Timeframe`] | Candle interval (1m, 5m, 15m, 1h, 4h, 1d) |
//! | [`UtcDateTime`] | UTC timestamp |
//! | [`Candle`] | OHLCV datapoint with alignment checks |
//! | [`CandleSeries`] | Sorted, duplicate-free candles for one symbol/timeframe |
//!
//! ```rust,ignore
//! use panochart_core::{Candle, CandleSeries, Symbol, Timeframe};
//! use time::macros::datetime;
//!
//! let btc = Symbol::parse("btcusdt")?;
//! let candle = Candle::new(btc.clone(), Timeframe::OneHour, datetime!(2026-01-01 12:00 UTC),
//!     100.0, 105.0, 95.0, 102.0, 1_000.0)?;
//! let series = CandleSeries::new(btc, Timeframe::OneHour, vec![candle])?;
//! ```

mod candle;
mod series;
mod symbol;
mod timeframe;
mod timestamp;

pub use candle::Candle;
pub use series::CandleSeries;
pub use symbol::Symbol;
pub use timeframe::Timeframe;
pub use timestamp::UtcDateTime;
