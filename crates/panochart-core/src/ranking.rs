//! # Ranking Engine
//!
//! Weighted combination of calculator scores into a deterministic ordering.
//!
//! - [`WeightedScorer`] scores one series against a list of [`ScoreWeight`]s.
//! - [`WeightedRanker`] ranks a map of series: total score descending, then
//!   symbol ascending.
//! - [`VolumeSortedRanker`] restricts the input to symbols present in both the
//!   universe and the volume map before applying the weighted ranking.
//! - [`SortMode`] selects the metric used to re-sort an existing ranking.
//!
//! Calculators with weight `0` are skipped entirely. Any calculator error
//! aborts the whole ranking.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::data_source::{SymbolUniverse, VolumeSource};
use crate::scoring::{GainLoss, ScoreCalculator, SidewaysConsistency, TrendPredictability};
use crate::{CandleSeries, RankError, Symbol};

/// Boxed future returned by rankers and the rankings use case.
pub type RankFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RankError>> + Send + 'a>>;

/// A calculator and its contribution to the total score.
#[derive(Clone)]
pub struct ScoreWeight {
    pub calculator: Arc<dyn ScoreCalculator>,
    pub weight: f64,
}

impl ScoreWeight {
    pub fn new(calculator: impl ScoreCalculator + 'static, weight: f64) -> Self {
        Self {
            calculator: Arc::new(calculator),
            weight,
        }
    }
}

impl std::fmt::Debug for ScoreWeight {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreWeight")
            .field("calculator", &self.calculator.name())
            .field("weight", &self.weight)
            .finish()
    }
}

/// Equal weights for the three built-in calculators.
pub fn default_weights() -> Vec<ScoreWeight> {
    vec![
        ScoreWeight::new(GainLoss, 1.0),
        ScoreWeight::new(SidewaysConsistency, 1.0),
        ScoreWeight::new(TrendPredictability, 1.0),
    ]
}

/// Weighted scores for a single series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolStats {
    pub total_score: f64,
    pub scores: BTreeMap<String, f64>,
}

/// One entry of a ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedSymbol {
    pub symbol: Symbol,
    pub total_score: f64,
    pub scores: BTreeMap<String, f64>,
}

/// Scores one series with every non-zero weight.
#[derive(Debug, Clone)]
pub struct WeightedScorer {
    weights: Vec<ScoreWeight>,
}

impl WeightedScorer {
    pub fn new(weights: Vec<ScoreWeight>) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &[ScoreWeight] {
        &self.weights
    }

    pub fn score(&self, series: &CandleSeries) -> Result<SymbolStats, RankError> {
        let mut stats = SymbolStats::default();
        for entry in self.weights.iter().filter(|entry| entry.weight != 0.0) {
            let name = entry.calculator.name();
            let score = entry
                .calculator
                .score(series)
                .map_err(|source| RankError::Calculator {
                    calculator: name,
                    symbol: series.symbol().to_string(),
                    source,
                })?;
            stats.scores.insert(name.to_owned(), score);
            stats.total_score += score * entry.weight;
        }
        Ok(stats)
    }

    /// Scores every series and orders by total descending, then symbol ascending.
    pub fn rank<'s>(
        &self,
        series: impl IntoIterator<Item = &'s CandleSeries>,
    ) -> Result<Vec<RankedSymbol>, RankError> {
        let mut ranked = series
            .into_iter()
            .map(|series| {
                let stats = self.score(series)?;
                Ok::<_, RankError>(RankedSymbol {
                    symbol: series.symbol().clone(),
                    total_score: stats.total_score,
                    scores: stats.scores,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        ranked.sort_by(|a, b| {
            descending(a.total_score, b.total_score).then_with(|| a.symbol.cmp(&b.symbol))
        });
        Ok(ranked)
    }
}

/// Orders larger values first; incomparable values tie.
pub(crate) fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Ranks prefetched candle series.
pub trait Ranker: Send + Sync {
    fn rank<'a>(
        &'a self,
        series: &'a HashMap<Symbol, CandleSeries>,
    ) -> RankFuture<'a, Vec<RankedSymbol>>;
}

/// Ranks every provided series with a [`WeightedScorer`].
#[derive(Debug, Clone)]
pub struct WeightedRanker {
    scorer: WeightedScorer,
}

impl WeightedRanker {
    pub fn new(weights: Vec<ScoreWeight>) -> Self {
        Self {
            scorer: WeightedScorer::new(weights),
        }
    }
}

impl Ranker for WeightedRanker {
    fn rank<'a>(
        &'a self,
        series: &'a HashMap<Symbol, CandleSeries>,
    ) -> RankFuture<'a, Vec<RankedSymbol>> {
        Box::pin(async move {
            let mut ordered: Vec<&CandleSeries> = series.values().collect();
            ordered.sort_by(|a, b| a.symbol().cmp(b.symbol()));
            self.scorer.rank(ordered)
        })
    }
}

/// Ranks only symbols that appear in both the universe and the volume map.
///
/// Candidates are visited in volume order (descending, then symbol ascending);
/// the final ordering is still the weighted one.
#[derive(Clone)]
pub struct VolumeSortedRanker {
    universe: Arc<dyn SymbolUniverse>,
    volumes: Arc<dyn VolumeSource>,
    scorer: WeightedScorer,
}

impl VolumeSortedRanker {
    pub fn new(
        universe: Arc<dyn SymbolUniverse>,
        volumes: Arc<dyn VolumeSource>,
        weights: Vec<ScoreWeight>,
    ) -> Self {
        Self {
            universe,
            volumes,
            scorer: WeightedScorer::new(weights),
        }
    }

    /// Universe this ranker filters against, for wiring sibling use cases.
    pub fn universe(&self) -> &Arc<dyn SymbolUniverse> {
        &self.universe
    }
}

impl Ranker for VolumeSortedRanker {
    fn rank<'a>(
        &'a self,
        series: &'a HashMap<Symbol, CandleSeries>,
    ) -> RankFuture<'a, Vec<RankedSymbol>> {
        Box::pin(async move {
            let symbols = self.universe.symbols().await?;
            let volumes = self.volumes.volumes().await?;

            let mut candidates: Vec<(Symbol, f64)> = symbols
                .into_iter()
                .filter_map(|symbol| {
                    let volume = volumes.get(symbol.as_str()).copied()?;
                    Some((symbol, volume))
                })
                .collect();
            candidates.sort_by(|(sa, va), (sb, vb)| descending(*va, *vb).then_with(|| sa.cmp(sb)));

            self.scorer
                .rank(candidates.iter().filter_map(|(symbol, _)| series.get(symbol)))
        })
    }
}

/// Metric used to order a ranking for presentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Total,
    Gain,
    Sideways,
    Trend,
    Volume,
}

impl SortMode {
    /// Lenient parse; anything unrecognised sorts by total score.
    pub fn parse(input: &str) -> Self {
        match input {
            "gain" => Self::Gain,
            "sideways" => Self::Sideways,
            "trend" => Self::Trend,
            "volume" => Self::Volume,
            _ => Self::Total,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Total => "total",
            Self::Gain => "gain",
            Self::Sideways => "sideways",
            Self::Trend => "trend",
            Self::Volume => "volume",
        }
    }

    /// Calculator whose raw score backs this mode.
    pub const fn score_key(self) -> Option<&'static str> {
        match self {
            Self::Gain => Some(GainLoss::NAME),
            Self::Sideways => Some(SidewaysConsistency::NAME),
            Self::Trend => Some(TrendPredictability::NAME),
            Self::Total | Self::Volume => None,
        }
    }
}

impl Display for SortMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{StaticUniverse, StaticVolumes};
    use crate::testing::series_for;
    use crate::ScoreError;

    /// Returns a fixed score per symbol.
    struct Fixed {
        name: &'static str,
        scores: HashMap<&'static str, f64>,
    }

    impl ScoreCalculator for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }

        fn score(&self, series: &CandleSeries) -> Result<f64, ScoreError> {
            self.scores
                .get(series.symbol().as_str())
                .copied()
                .ok_or(ScoreError::ZeroFirstClose)
        }
    }

    fn fixed(name: &'static str, scores: &[(&'static str, f64)]) -> Fixed {
        Fixed {
            name,
            scores: scores.iter().copied().collect(),
        }
    }

    fn series_map(symbols: &[&str]) -> HashMap<Symbol, CandleSeries> {
        symbols
            .iter()
            .map(|s| {
                let series = series_for(s, &[1.0, 1.0, 1.0]);
                (series.symbol().clone(), series)
            })
            .collect()
    }

    fn names(ranked: &[RankedSymbol]) -> Vec<&str> {
        ranked.iter().map(|r| r.symbol.as_str()).collect()
    }

    #[tokio::test]
    async fn ties_break_by_ascending_symbol() {
        let ranker = WeightedRanker::new(vec![ScoreWeight::new(
            fixed("x", &[("B", 1.0), ("A", 1.0), ("C", 2.0)]),
            1.0,
        )]);
        let ranked = ranker.rank(&series_map(&["B", "A", "C"])).await.expect("ranks");
        assert_eq!(names(&ranked), vec!["C", "A", "B"]);
    }

    #[tokio::test]
    async fn zero_weight_is_neither_computed_nor_reported() {
        // The zero-weighted calculator would fail if it were invoked.
        let ranker = WeightedRanker::new(vec![
            ScoreWeight::new(fixed("kept", &[("A", 2.0)]), 0.5),
            ScoreWeight::new(fixed("ignored", &[]), 0.0),
        ]);
        let ranked = ranker.rank(&series_map(&["A"])).await.expect("ranks");

        assert_eq!(ranked[0].total_score, 1.0);
        assert_eq!(ranked[0].scores.len(), 1);
        assert!(!ranked[0].scores.contains_key("ignored"));
    }

    #[tokio::test]
    async fn calculator_error_aborts_the_ranking() {
        let ranker = WeightedRanker::new(vec![ScoreWeight::new(fixed("x", &[("A", 1.0)]), 1.0)]);
        let err = ranker
            .rank(&series_map(&["A", "B"]))
            .await
            .expect_err("B has no score");
        assert!(matches!(
            err,
            RankError::Calculator { calculator: "x", ref symbol, .. } if symbol == "B"
        ));
    }

    #[tokio::test]
    async fn first_failing_symbol_in_ascending_order_is_reported() {
        let ranker = WeightedRanker::new(vec![ScoreWeight::new(fixed("x", &[("A", 1.0)]), 1.0)]);
        let input = series_map(&["A", "E", "D", "C", "B", "F"]);

        for _ in 0..8 {
            let err = ranker.rank(&input).await.expect_err("B..F have no score");
            assert!(matches!(
                err,
                RankError::Calculator { ref symbol, .. } if symbol == "B"
            ));
        }
    }

    #[tokio::test]
    async fn empty_input_ranks_to_empty_output() {
        let ranker = WeightedRanker::new(default_weights());
        let ranked = ranker.rank(&HashMap::new()).await.expect("ranks");
        assert!(ranked.is_empty());
    }

    #[tokio::test]
    async fn volume_sorted_ranker_keeps_the_intersection() {
        let universe = StaticUniverse::parse(["A", "B", "C"]).expect("valid");
        let volumes = StaticVolumes::default()
            .with(&Symbol::parse("A").expect("valid"), 5.0)
            .with(&Symbol::parse("C").expect("valid"), 9.0)
            .with(&Symbol::parse("D").expect("valid"), 100.0);
        let ranker = VolumeSortedRanker::new(
            Arc::new(universe),
            Arc::new(volumes),
            vec![ScoreWeight::new(
                fixed("x", &[("A", 3.0), ("B", 9.0), ("C", 1.0), ("D", 7.0)]),
                1.0,
            )],
        );

        let ranked = ranker
            .rank(&series_map(&["A", "B", "C", "D"]))
            .await
            .expect("ranks");
        assert_eq!(names(&ranked), vec!["A", "C"]);

        let universe = ranker.universe().symbols().await.expect("static");
        assert_eq!(universe.len(), 3);
    }

    #[test]
    fn sort_mode_parse_defaults_to_total() {
        assert_eq!(SortMode::parse("trend"), SortMode::Trend);
        assert_eq!(SortMode::parse("volume"), SortMode::Volume);
        assert_eq!(SortMode::parse(""), SortMode::Total);
        assert_eq!(SortMode::parse("nonsense"), SortMode::Total);
        assert_eq!(SortMode::Gain.score_key(), Some("Gain/Loss"));
        assert_eq!(SortMode::Volume.score_key(), None);
    }
}
