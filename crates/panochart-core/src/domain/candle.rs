use serde::Serialize;
use time::OffsetDateTime;

use crate::{Symbol, Timeframe, UtcDateTime, ValidationError};

/// Single OHLCV datapoint for one symbol and timeframe.
///
/// Immutable once built; [`Candle::new`] enforces, in order: UTC timestamp,
/// non-negative finite values, high/low envelope, timeframe alignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candle {
    #[serde(skip)]
    symbol: Symbol,
    #[serde(skip)]
    timeframe: Timeframe,
    timestamp: UtcDateTime,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl Candle {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: Symbol,
        timeframe: Timeframe,
        timestamp: OffsetDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Result<Self, ValidationError> {
        let timestamp = UtcDateTime::from_offset_datetime(timestamp)?;

        validate_non_negative("open", open)?;
        validate_non_negative("high", high)?;
        validate_non_negative("low", low)?;
        validate_non_negative("close", close)?;
        validate_non_negative("volume", volume)?;

        if high < open || high < close {
            return Err(ValidationError::HighBelowBody);
        }
        if low > open || low > close {
            return Err(ValidationError::LowAboveBody);
        }
        if high < low {
            return Err(ValidationError::HighBelowLow);
        }

        validate_alignment(timeframe, timestamp)?;

        Ok(Self {
            symbol,
            timeframe,
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub const fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub const fn timestamp(&self) -> UtcDateTime {
        self.timestamp
    }

    pub const fn open(&self) -> f64 {
        self.open
    }

    pub const fn high(&self) -> f64 {
        self.high
    }

    pub const fn low(&self) -> f64 {
        self.low
    }

    pub const fn close(&self) -> f64 {
        self.close
    }

    pub const fn volume(&self) -> f64 {
        self.volume
    }

    /// Identity comparison on `(symbol, timeframe, timestamp)`, ignoring OHLCV.
    pub fn same_identity(&self, other: &Self) -> bool {
        self.symbol == other.symbol
            && self.timeframe == other.timeframe
            && self.timestamp == other.timestamp
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    pub fn is_doji(&self) -> bool {
        self.close == self.open
    }
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

fn validate_alignment(timeframe: Timeframe, timestamp: UtcDateTime) -> Result<(), ValidationError> {
    let inner = timestamp.into_inner();
    let misaligned = |reason: &'static str| ValidationError::Misaligned {
        timeframe: timeframe.as_str(),
        timestamp: timestamp.format_rfc3339(),
        reason,
    };

    if inner.second() != 0 {
        return Err(misaligned("second must be 0"));
    }

    let (minute, hour) = (inner.minute(), inner.hour());
    match timeframe {
        Timeframe::OneMinute => {}
        Timeframe::FiveMinutes if minute % 5 != 0 => {
            return Err(misaligned("minute must be divisible by 5"))
        }
        Timeframe::FifteenMinutes if minute % 15 != 0 => {
            return Err(misaligned("minute must be divisible by 15"))
        }
        Timeframe::FiveMinutes | Timeframe::FifteenMinutes => {}
        Timeframe::OneHour | Timeframe::FourHours | Timeframe::OneDay if minute != 0 => {
            return Err(misaligned("minute must be 0"))
        }
        Timeframe::FourHours if hour % 4 != 0 => {
            return Err(misaligned("hour must be divisible by 4"))
        }
        Timeframe::OneDay if hour != 0 => return Err(misaligned("hour must be 0")),
        Timeframe::OneHour | Timeframe::FourHours | Timeframe::OneDay => {}
    }

    Ok(())
}
