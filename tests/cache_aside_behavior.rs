//! Behavior-driven tests for cache-aside decorators
//!
//! These tests verify that caching is invisible to callers: hits reproduce
//! the source's answer exactly, and cache trouble never surfaces as an error.

use std::sync::Arc;
use std::time::Duration;

use panochart_cache::MemoryCache;
use panochart_core::{
    CachedCandleSource, CachedOverview, CachedUniverse, CachedVolumes, CandleSource, GainLoss,
    GetOverview, GetRankings, MemoryCandleSource, OverviewRequest, OverviewUseCase, ScoreWeight,
    SeriesQuery, Settings, SourceError, SourceErrorKind, StaticUniverse, StaticVolumes,
    SymbolUniverse, Timeframe, VolumeSource, WeightedRanker,
};
use panochart_tests::{
    series, settled_clock, symbol, CountingSource, CountingVolumes, UnreachableCache,
};

const TTL: Duration = Duration::from_secs(300);

fn hourly_source() -> MemoryCandleSource {
    MemoryCandleSource::new()
        .with_series(series("BTCUSDT", Timeframe::OneHour, &[100.0, 101.5, 99.25, 102.0]))
        .with_clock(settled_clock())
}

#[tokio::test]
async fn when_cache_is_empty_the_source_is_called_once_then_never_again() {
    // Given: an empty cache in front of a counting source
    let cache = MemoryCache::new();
    let source = Arc::new(CountingSource::new(hourly_source()));
    let cached = CachedCandleSource::new(source.clone(), Arc::new(cache.clone()), TTL);
    let query = SeriesQuery::latest(symbol("BTCUSDT"), Timeframe::OneHour);

    // When: the same query is made twice
    let first = cached.series(&query).await.expect("loads");
    let second = cached.series(&query).await.expect("cached");

    // Then: the source saw one call and the cache holds the entry
    assert_eq!(source.calls(), 1);
    assert!(cache.read("BTCUSDT|1h||").await.is_some());

    // And: the reconstructed series is byte-identical to the original
    assert_eq!(second, first);
    assert_eq!(
        serde_json::to_vec(second.candles()).expect("serializable"),
        serde_json::to_vec(first.candles()).expect("serializable")
    );
}

#[tokio::test]
async fn when_a_price_needs_all_seventeen_digits_a_cache_hit_returns_it_exactly() {
    // Given: a candle whose price only survives an exact float parse
    let price = 57415.518664216484_f64;
    let source = MemoryCandleSource::new()
        .with_series(series("BTCUSDT", Timeframe::OneMinute, &[price]))
        .with_clock(settled_clock());
    let cache = MemoryCache::new();
    let cached = CachedCandleSource::new(Arc::new(source), Arc::new(cache.clone()), TTL);
    let query = SeriesQuery::latest(symbol("BTCUSDT"), Timeframe::OneMinute);

    // When: the first call fills the cache and the second is a hit
    let miss = cached.series(&query).await.expect("loads");
    let hit = cached.series(&query).await.expect("cached");

    // Then: every price on the hit matches the source bit for bit
    let candle = hit.first().expect("one candle");
    for value in [candle.open(), candle.high(), candle.low(), candle.close()] {
        assert_eq!(value.to_bits(), price.to_bits());
    }
    assert_eq!(hit, miss);
}

#[tokio::test]
async fn when_volumes_are_cached_the_ticker_is_read_once_under_its_fixed_key() {
    // Given: an empty cache in front of a counting volume feed
    let settings = Settings::default();
    let cache = MemoryCache::new();
    let feed = Arc::new(CountingVolumes::new(&[("BTCUSDT", 1_250.5), ("ETHUSDT", 980.0)]));
    let cached = CachedVolumes::new(
        feed.clone(),
        Arc::new(cache.clone()),
        settings.volume_cache_ttl,
        settings.volume_cache_key.clone(),
    );

    // When: volumes are requested twice
    let first = cached.volumes().await.expect("loads");
    let second = cached.volumes().await.expect("cached");

    // Then: the feed was read once and the entry sits under the fixed key
    assert_eq!(feed.calls(), 1);
    assert_eq!(first, second);
    assert_eq!(second.get("BTCUSDT"), Some(&1_250.5));
    assert!(cache.read("binance:24h_volume").await.is_some());
}

#[tokio::test]
async fn when_the_volume_feed_fails_the_error_surfaces_and_nothing_is_cached() {
    let settings = Settings::default();
    let cache = MemoryCache::new();
    let feed = Arc::new(CountingVolumes::offline());
    let cached = CachedVolumes::new(
        feed.clone(),
        Arc::new(cache.clone()),
        settings.volume_cache_ttl,
        settings.volume_cache_key.clone(),
    );

    let err = cached.volumes().await.expect_err("feed offline");

    assert_eq!(err, SourceError::unavailable("ticker feed offline"));
    assert_eq!(feed.calls(), 1);
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn when_the_source_fails_nothing_is_cached_and_the_error_is_unchanged() {
    let cache = MemoryCache::new();
    let source = Arc::new(CountingSource::failing(hourly_source(), &["BTCUSDT"]));
    let cached = CachedCandleSource::new(source.clone(), Arc::new(cache.clone()), TTL);

    let err = cached
        .last_n(&symbol("BTCUSDT"), Timeframe::OneHour, 3)
        .await
        .expect_err("feed offline");

    assert_eq!(err.kind(), SourceErrorKind::Unavailable);
    assert_eq!(err.message(), "BTCUSDT feed offline");
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn when_the_source_returns_nothing_the_empty_answer_is_cached() {
    let cache = MemoryCache::new();
    let source = Arc::new(CountingSource::new(hourly_source()));
    let cached = CachedCandleSource::new(source.clone(), Arc::new(cache.clone()), TTL);
    let query = SeriesQuery::latest(symbol("BTCUSDT"), Timeframe::OneDay);

    assert!(cached.series(&query).await.expect("loads").is_empty());
    assert!(cached.series(&query).await.expect("cached").is_empty());
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn when_the_cache_is_unreachable_every_call_falls_through_to_the_source() {
    // Given: a cache backend that refuses every operation
    let backend = Arc::new(UnreachableCache::default());
    let source = Arc::new(CountingSource::new(hourly_source()));
    let cached = CachedCandleSource::new(source.clone(), backend.clone(), TTL);

    // When: the caller asks twice
    for _ in 0..2 {
        let series = cached
            .last_n(&symbol("BTCUSDT"), Timeframe::OneHour, 2)
            .await
            .expect("cache failure is not user-visible");
        assert_eq!(series.closes(), vec![99.25, 102.0]);
    }

    // Then: both calls reached the source, and the cache was tried on each
    assert_eq!(source.calls(), 2);
    assert_eq!(backend.attempts(), 4);
}

#[tokio::test]
async fn when_a_cached_universe_is_corrupt_it_is_refetched_as_a_whole() {
    let settings = Settings::default();
    let cache = MemoryCache::new();
    cache
        .write(
            settings.universe_cache_key.clone(),
            br#"["BTCUSDT", "not a symbol"]"#.to_vec(),
            TTL,
        )
        .await;
    let cached = CachedUniverse::new(
        Arc::new(StaticUniverse::parse(["ETHUSDT"]).expect("valid")),
        Arc::new(cache.clone()),
        settings.universe_cache_ttl,
        settings.universe_cache_key.clone(),
    );

    let symbols = cached.symbols().await.expect("falls through");
    assert_eq!(symbols, vec![symbol("ETHUSDT")]);

    let stored = cache
        .read(&settings.universe_cache_key)
        .await
        .expect("rewritten");
    assert_eq!(stored, br#"["ETHUSDT"]"#.to_vec());
}

#[tokio::test]
async fn when_the_overview_is_cached_a_second_request_skips_all_fetches() {
    // Given: the full pipeline behind an overview cache
    let settings = Settings::default();
    let cache = MemoryCache::new();
    let source = Arc::new(CountingSource::new(hourly_source()));
    let rankings = GetRankings::new(
        Arc::new(StaticUniverse::parse(["BTCUSDT"]).expect("valid")),
        Arc::new(StaticVolumes::default()),
        source.clone(),
        Arc::new(WeightedRanker::new(vec![ScoreWeight::new(GainLoss, 1.0)])),
    );
    let overview = GetOverview::new(Arc::new(rankings), source.clone(), 3, 2);
    let cached = CachedOverview::new(
        Arc::new(overview),
        Arc::new(cache.clone()),
        settings.overview_cache_ttl,
        settings.overview_key_prefix.clone(),
    );
    let request = OverviewRequest {
        timeframe: Timeframe::OneHour,
        limit: 10,
    };

    // When: requested twice
    let first = cached.execute(&request).await.expect("overview");
    let calls_after_first = source.calls();
    let second = cached.execute(&request).await.expect("cached overview");

    // Then: the second answer came from the cache
    assert_eq!(first, second);
    assert_eq!(source.calls(), calls_after_first);
    assert_eq!(first[0].sparkline, vec![101.5, 99.25, 102.0]);
    assert!(cache.read("overview:1h:10").await.is_some());
}
