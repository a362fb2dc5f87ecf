use std::collections::HashMap;

use crate::data_source::{SourceFuture, SymbolUniverse, VolumeSource};
use crate::{Symbol, ValidationError};

/// Top Binance USDT pairs by market presence.
pub const BINANCE_TOP_15: [&str; 15] = [
    "BTCUSDT", "ETHUSDT", "BNBUSDT", "SOLUSDT", "XRPUSDT", "ADAUSDT", "DOGEUSDT", "AVAXUSDT",
    "LINKUSDT", "DOTUSDT", "MATICUSDT", "TRXUSDT", "LTCUSDT", "ATOMUSDT", "UNIUSDT",
];

/// Fixed symbol universe, returned sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticUniverse {
    symbols: Vec<Symbol>,
}

impl StaticUniverse {
    pub fn new(symbols: impl IntoIterator<Item = Symbol>) -> Self {
        let mut symbols: Vec<Symbol> = symbols.into_iter().collect();
        symbols.sort();
        symbols.dedup();
        Self { symbols }
    }

    pub fn parse<'a>(symbols: impl IntoIterator<Item = &'a str>) -> Result<Self, ValidationError> {
        let symbols = symbols
            .into_iter()
            .map(Symbol::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(symbols))
    }

    pub fn binance_top_15() -> Result<Self, ValidationError> {
        Self::parse(BINANCE_TOP_15)
    }

    pub fn as_slice(&self) -> &[Symbol] {
        &self.symbols
    }
}

impl SymbolUniverse for StaticUniverse {
    fn symbols(&self) -> SourceFuture<'_, Vec<Symbol>> {
        Box::pin(async move { Ok(self.symbols.clone()) })
    }
}

/// Fixed volume map, keyed by normalized symbol string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticVolumes {
    volumes: HashMap<String, f64>,
}

impl StaticVolumes {
    pub fn new(volumes: HashMap<String, f64>) -> Self {
        Self { volumes }
    }

    pub fn with(mut self, symbol: &Symbol, volume: f64) -> Self {
        self.volumes.insert(symbol.as_str().to_owned(), volume);
        self
    }
}

impl VolumeSource for StaticVolumes {
    fn volumes(&self) -> SourceFuture<'_, HashMap<String, f64>> {
        Box::pin(async move { Ok(self.volumes.clone()) })
    }
}
