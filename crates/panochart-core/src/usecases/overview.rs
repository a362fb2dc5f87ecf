use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::data_source::CandleSource;
use crate::ranking::SortMode;
use crate::usecases::rankings::{RankedResult, RankingsRequest, RankingsUseCase};
use crate::{OverviewError, Symbol, Timeframe};

pub const DEFAULT_SPARKLINE_PRECISION: usize = 30;
pub const DEFAULT_MAX_WORKERS: usize = 5;

pub type OverviewFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<OverviewResult>, OverviewError>> + Send + 'a>>;

/// Input for [`OverviewUseCase::execute`]. A `limit` of 0 keeps every ranked symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverviewRequest {
    pub timeframe: Timeframe,
    pub limit: usize,
}

/// A ranked symbol with its recent closes, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewResult {
    pub symbol: Symbol,
    pub total_score: f64,
    pub sparkline: Vec<f64>,
}

pub trait OverviewUseCase: Send + Sync {
    fn execute<'a>(&'a self, request: &'a OverviewRequest) -> OverviewFuture<'a>;
}

/// Top-ranked symbols with sparklines, fetched with bounded concurrency.
///
/// At most `max_workers` candle fetches are in flight. A symbol whose fetch
/// fails or returns no candles is dropped; the call fails with
/// [`OverviewError::NoCandles`] only when every symbol is dropped. Survivors
/// keep their rank order.
#[derive(Clone)]
pub struct GetOverview {
    rankings: Arc<dyn RankingsUseCase>,
    candles: Arc<dyn CandleSource>,
    precision: usize,
    max_workers: usize,
}

impl GetOverview {
    /// Zero `precision` or `max_workers` fall back to the defaults.
    pub fn new(
        rankings: Arc<dyn RankingsUseCase>,
        candles: Arc<dyn CandleSource>,
        precision: usize,
        max_workers: usize,
    ) -> Self {
        Self {
            rankings,
            candles,
            precision: if precision == 0 {
                DEFAULT_SPARKLINE_PRECISION
            } else {
                precision
            },
            max_workers: if max_workers == 0 {
                DEFAULT_MAX_WORKERS
            } else {
                max_workers
            },
        }
    }

    pub const fn precision(&self) -> usize {
        self.precision
    }

    pub const fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Like [`OverviewUseCase::execute`], but stops waiting once `signal` resolves.
    ///
    /// Fetches already started keep running in their own tasks; no new ones
    /// start after cancellation.
    pub async fn execute_until<S>(
        &self,
        request: &OverviewRequest,
        signal: S,
    ) -> Result<Vec<OverviewResult>, OverviewError>
    where
        S: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            () = signal => {
                debug!(timeframe = %request.timeframe, "overview cancelled");
                Err(OverviewError::Cancelled)
            }
            result = self.aggregate(request) => result,
        }
    }

    async fn aggregate(
        &self,
        request: &OverviewRequest,
    ) -> Result<Vec<OverviewResult>, OverviewError> {
        let mut ranked = self
            .rankings
            .execute(&RankingsRequest {
                timeframe: request.timeframe,
                sort: SortMode::Total,
            })
            .await?;
        if request.limit > 0 {
            ranked.truncate(request.limit);
        }
        if ranked.is_empty() {
            return Ok(Vec::new());
        }

        let fetches = ranked
            .into_iter()
            .enumerate()
            .map(|(index, entry)| self.sparkline(index, entry, request.timeframe));

        let mut collected: Vec<(usize, OverviewResult)> = stream::iter(fetches)
            .buffer_unordered(self.max_workers)
            .filter_map(|outcome| async move { outcome })
            .collect()
            .await;

        if collected.is_empty() {
            return Err(OverviewError::NoCandles);
        }
        collected.sort_unstable_by_key(|(index, _)| *index);

        Ok(collected.into_iter().map(|(_, result)| result).collect())
    }

    fn sparkline(
        &self,
        index: usize,
        entry: RankedResult,
        timeframe: Timeframe,
    ) -> impl Future<Output = Option<(usize, OverviewResult)>> + Send + 'static {
        let candles = Arc::clone(&self.candles);
        let precision = self.precision;

        async move {
            let symbol = entry.symbol.clone();
            let fetch = tokio::spawn(async move {
                candles.last_n(&symbol, timeframe, precision).await
            });

            let series = match fetch.await {
                Ok(Ok(series)) => series,
                Ok(Err(error)) => {
                    warn!(symbol = %entry.symbol, %timeframe, %error, "skipping symbol, candle fetch failed");
                    return None;
                }
                Err(error) => {
                    warn!(symbol = %entry.symbol, %timeframe, %error, "skipping symbol, candle fetch task failed");
                    return None;
                }
            };
            if series.is_empty() {
                warn!(symbol = %entry.symbol, %timeframe, "skipping symbol with no candles");
                return None;
            }

            Some((
                index,
                OverviewResult {
                    sparkline: series.closes(),
                    symbol: entry.symbol,
                    total_score: entry.total_score,
                },
            ))
        }
    }
}

impl OverviewUseCase for GetOverview {
    fn execute<'a>(&'a self, request: &'a OverviewRequest) -> OverviewFuture<'a> {
        Box::pin(self.aggregate(request))
    }
}
