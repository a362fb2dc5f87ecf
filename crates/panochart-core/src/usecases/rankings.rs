use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::data_source::{CandleSource, SeriesQuery, SymbolUniverse, VolumeSource};
use crate::ranking::{descending, RankFuture, Ranker, SortMode};
use crate::{RankError, Symbol, Timeframe};

pub const DEFAULT_PAGE_SIZE: usize = 30;
pub const MAX_PAGE_SIZE: usize = 100;

/// Input for [`RankingsUseCase::execute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RankingsRequest {
    pub timeframe: Timeframe,
    pub sort: SortMode,
}

/// One ranked symbol, annotated with its trading volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedResult {
    pub symbol: Symbol,
    pub total_score: f64,
    pub scores: BTreeMap<String, f64>,
    pub volume: f64,
}

/// Full ranking of the universe for one timeframe.
pub trait RankingsUseCase: Send + Sync {
    fn execute<'a>(&'a self, request: &'a RankingsRequest) -> RankFuture<'a, Vec<RankedResult>>;
}

/// Universe, then volumes, then per-symbol series, then ranking and re-sort.
///
/// Symbols whose series cannot be fetched, or come back empty, are skipped.
/// A non-empty series shorter than a calculator's minimum history is still
/// ranked, so it fails the whole ranking with [`RankError::Calculator`].
#[derive(Clone)]
pub struct GetRankings {
    universe: Arc<dyn SymbolUniverse>,
    volumes: Arc<dyn VolumeSource>,
    candles: Arc<dyn CandleSource>,
    ranker: Arc<dyn Ranker>,
}

impl GetRankings {
    pub fn new(
        universe: Arc<dyn SymbolUniverse>,
        volumes: Arc<dyn VolumeSource>,
        candles: Arc<dyn CandleSource>,
        ranker: Arc<dyn Ranker>,
    ) -> Self {
        Self {
            universe,
            volumes,
            candles,
            ranker,
        }
    }

    async fn rank(&self, request: &RankingsRequest) -> Result<Vec<RankedResult>, RankError> {
        let symbols = self.universe.symbols().await?;
        if symbols.is_empty() {
            return Ok(Vec::new());
        }
        let volumes = self.volumes.volumes().await?;

        let mut series = HashMap::with_capacity(symbols.len());
        for symbol in symbols {
            let query = SeriesQuery::latest(symbol, request.timeframe);
            match self.candles.series(&query).await {
                Ok(fetched) if fetched.is_empty() => {
                    warn!(symbol = %query.symbol, timeframe = %request.timeframe, "skipping symbol with no candles");
                }
                Ok(fetched) => {
                    series.insert(query.symbol, fetched);
                }
                Err(error) => {
                    warn!(symbol = %query.symbol, timeframe = %request.timeframe, %error, "skipping symbol, candle fetch failed");
                }
            }
        }

        let ranked = self.ranker.rank(&series).await?;
        debug!(ranked = ranked.len(), timeframe = %request.timeframe, "ranked universe");

        let mut results: Vec<RankedResult> = ranked
            .into_iter()
            .map(|entry| RankedResult {
                volume: volumes.get(entry.symbol.as_str()).copied().unwrap_or(0.0),
                symbol: entry.symbol,
                total_score: entry.total_score,
                scores: entry.scores,
            })
            .collect();
        sort_results(&mut results, request.sort);

        Ok(results)
    }
}

impl RankingsUseCase for GetRankings {
    fn execute<'a>(&'a self, request: &'a RankingsRequest) -> RankFuture<'a, Vec<RankedResult>> {
        Box::pin(self.rank(request))
    }
}

/// Stable re-sort: selected metric descending, then symbol ascending.
pub fn sort_results(results: &mut [RankedResult], mode: SortMode) {
    results.sort_by(|a, b| match descending(sort_value(a, mode), sort_value(b, mode)) {
        Ordering::Equal => a.symbol.cmp(&b.symbol),
        ordering => ordering,
    });
}

fn sort_value(result: &RankedResult, mode: SortMode) -> f64 {
    match mode {
        SortMode::Total => result.total_score,
        SortMode::Volume => result.volume,
        calculator => calculator
            .score_key()
            .and_then(|key| result.scores.get(key).copied())
            .unwrap_or(0.0),
    }
}

/// One page of a ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingsPage {
    pub results: Vec<RankedResult>,
    pub sort: SortMode,
    pub timeframe: Timeframe,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl RankingsPage {
    /// Slices `results` into a page.
    ///
    /// `page` below 1 becomes 1; `page_size` of 0 becomes the default and is
    /// capped at [`MAX_PAGE_SIZE`]. Pages past the end are empty.
    pub fn paginate(
        results: Vec<RankedResult>,
        sort: SortMode,
        timeframe: Timeframe,
        page: usize,
        page_size: usize,
    ) -> Self {
        let page = page.max(1);
        let page_size = match page_size {
            0 => DEFAULT_PAGE_SIZE,
            size => size.min(MAX_PAGE_SIZE),
        };
        let total_items = results.len();
        let total_pages = total_items.div_ceil(page_size);

        let start = (page - 1).saturating_mul(page_size).min(total_items);
        let end = start.saturating_add(page_size).min(total_items);
        let results = results
            .into_iter()
            .skip(start)
            .take(end - start)
            .collect();

        Self {
            results,
            sort,
            timeframe,
            page,
            page_size,
            total_items,
            total_pages,
        }
    }
}
