//! Application use cases composed from the source ports and the ranking engine.

mod candle_series;
mod overview;
mod rankings;
mod symbol_detail;

pub use candle_series::GetCandleSeries;
pub use overview::{
    GetOverview, OverviewFuture, OverviewRequest, OverviewResult, OverviewUseCase,
    DEFAULT_MAX_WORKERS, DEFAULT_SPARKLINE_PRECISION,
};
pub use rankings::{
    sort_results, GetRankings, RankedResult, RankingsPage, RankingsRequest, RankingsUseCase,
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use symbol_detail::{
    GetSymbolDetail, SymbolDetail, SymbolDetailRequest, DEFAULT_DETAIL_LIMIT, MAX_DETAIL_LIMIT,
};
