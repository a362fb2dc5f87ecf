use std::sync::Arc;

use crate::data_source::{CandleSource, SeriesQuery, SourceError};
use crate::CandleSeries;

/// Fetches one series; source errors surface unchanged.
#[derive(Clone)]
pub struct GetCandleSeries {
    source: Arc<dyn CandleSource>,
}

impl GetCandleSeries {
    pub fn new(source: Arc<dyn CandleSource>) -> Self {
        Self { source }
    }

    pub async fn execute(&self, query: &SeriesQuery) -> Result<CandleSeries, SourceError> {
        self.source.series(query).await
    }
}
