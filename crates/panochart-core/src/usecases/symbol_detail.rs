use std::sync::Arc;

use serde::Serialize;

use crate::data_source::{CandleSource, SymbolUniverse};
use crate::ranking::{SymbolStats, WeightedScorer};
use crate::{Candle, DetailError, Symbol, Timeframe};

pub const DEFAULT_DETAIL_LIMIT: usize = 200;
pub const MAX_DETAIL_LIMIT: usize = 1000;

/// Input for [`GetSymbolDetail::execute`]. A `limit` of zero or less uses the default.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolDetailRequest {
    pub symbol: Symbol,
    pub timeframe: Timeframe,
    pub limit: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolDetail {
    pub symbol: Symbol,
    pub timeframe: Timeframe,
    pub candles: Vec<Candle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<SymbolStats>,
}

/// Recent candles and optional weighted stats for one universe member.
#[derive(Clone)]
pub struct GetSymbolDetail {
    candles: Arc<dyn CandleSource>,
    universe: Arc<dyn SymbolUniverse>,
    scorer: Option<WeightedScorer>,
    default_limit: usize,
    max_limit: usize,
}

impl GetSymbolDetail {
    /// Zero limits fall back to the defaults; the default never exceeds the max.
    pub fn new(
        candles: Arc<dyn CandleSource>,
        universe: Arc<dyn SymbolUniverse>,
        scorer: Option<WeightedScorer>,
        default_limit: usize,
        max_limit: usize,
    ) -> Self {
        let max_limit = if max_limit == 0 {
            MAX_DETAIL_LIMIT
        } else {
            max_limit
        };
        let default_limit = if default_limit == 0 {
            DEFAULT_DETAIL_LIMIT
        } else {
            default_limit
        };

        Self {
            candles,
            universe,
            scorer,
            default_limit: default_limit.min(max_limit),
            max_limit,
        }
    }

    pub fn resolve_limit(&self, requested: i64) -> usize {
        match usize::try_from(requested) {
            Ok(0) | Err(_) => self.default_limit,
            Ok(limit) => limit.min(self.max_limit),
        }
    }

    pub async fn execute(&self, request: &SymbolDetailRequest) -> Result<SymbolDetail, DetailError> {
        let universe = self.universe.symbols().await?;
        if !universe.contains(&request.symbol) {
            return Err(DetailError::SymbolNotFound {
                symbol: request.symbol.to_string(),
            });
        }

        let limit = self.resolve_limit(request.limit);
        let series = self
            .candles
            .last_n(&request.symbol, request.timeframe, limit)
            .await?;

        let stats = match &self.scorer {
            Some(_) if series.len() < 2 => Some(SymbolStats::default()),
            Some(scorer) => Some(scorer.score(&series)?),
            None => None,
        };

        Ok(SymbolDetail {
            symbol: request.symbol.clone(),
            timeframe: request.timeframe,
            candles: series.all(),
            stats,
        })
    }
}
