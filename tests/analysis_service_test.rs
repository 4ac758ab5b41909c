// Tests for the fetch-extract-score workflow
// Mocks the source site with mockito and injects an in-memory cache

use mockito::{Server, ServerGuard};
use std::sync::Arc;
use std::time::Duration;
use stock_score_service::cache::{FileCache, MemoryCache, SeriesCache};
use stock_score_service::extract::ExtractError;
use stock_score_service::fetch_error::FetchError;
use stock_score_service::fetcher::KessanFetcher;
use stock_score_service::models::Metric;
use stock_score_service::services::{AnalysisError, AnalysisService};

const SAMPLE: &str = include_str!("fixtures/kessan_sample.html");

fn create_test_service(server: &ServerGuard, cache: Arc<MemoryCache>) -> AnalysisService {
    let fetcher = KessanFetcher::new(server.url())
        .with_request_delay(Duration::ZERO)
        .with_retry_min_delay(Duration::from_millis(1))
        .with_max_retries(1);
    AnalysisService::new(cache, fetcher)
}

fn memory_cache() -> Arc<MemoryCache> {
    Arc::new(MemoryCache::new(chrono::Duration::hours(1)))
}

#[tokio::test]
async fn test_analyze_fetches_and_scores() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/7203/kessan")
        .with_status(200)
        .with_body(SAMPLE)
        .create_async()
        .await;

    let cache = memory_cache();
    let service = create_test_service(&server, cache.clone());
    let result = service.analyze("7203").await.unwrap();

    assert_eq!(result.ticker, "7203");
    assert_eq!(result.total_score, 80.0);
    assert_eq!(result.financial_data.year_count(), 5);

    // The extracted series is now cached under the normalized ticker
    assert_eq!(cache.get("7203"), Some(result.financial_data));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_cached_series_skips_fetch() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/7203/kessan")
        .with_status(200)
        .with_body(SAMPLE)
        .expect(1)
        .create_async()
        .await;

    let service = create_test_service(&server, memory_cache());
    let first = service.financials("7203").await.unwrap();
    // Suffix and lower-case forms normalize to the same cache key
    let second = service.financials(" 7203.t ").await.unwrap();

    assert_eq!(first, second);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_invalid_ticker_rejected_before_fetch() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", mockito::Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let service = create_test_service(&server, memory_cache());
    let result = service.analyze("../etc").await;

    match result.unwrap_err() {
        AnalysisError::InvalidTicker(t) => assert_eq!(t, "../etc"),
        other => panic!("Expected InvalidTicker error, got {other:?}"),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unknown_ticker_is_not_found() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/9999/kessan")
        .with_status(404)
        .create_async()
        .await;

    let service = create_test_service(&server, memory_cache());
    let result = service.analyze("9999").await;

    assert!(matches!(
        result,
        Err(AnalysisError::Fetch(FetchError::NotFound(_)))
    ));
}

#[tokio::test]
async fn test_page_without_table_is_extract_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/1301/kessan")
        .with_status(200)
        .with_body("<html><body><p>no data</p></body></html>")
        .create_async()
        .await;

    let cache = memory_cache();
    let service = create_test_service(&server, cache.clone());
    let result = service.analyze("1301").await;

    assert!(matches!(
        result,
        Err(AnalysisError::Extract(ExtractError::TableNotFound { .. }))
    ));
    assert!(cache.get("1301").is_none());
}

#[tokio::test]
async fn test_score_window_limits_history() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/7203/kessan")
        .with_status(200)
        .with_body(SAMPLE)
        .create_async()
        .await;

    let service = create_test_service(&server, memory_cache()).with_score_window(Some(3));
    let result = service.analyze("7203").await.unwrap();

    assert_eq!(
        result.financial_data.fiscal_years,
        vec!["2022/03", "2023/03", "2024/03"]
    );
    // Payout ratio stays under 40% over the last three years
    assert_eq!(result.breakdown[&Metric::DividendPayoutRatio], 10.0);

    // The full history remains available
    let series = service.financials("7203").await.unwrap();
    assert_eq!(series.year_count(), 5);
}

#[tokio::test]
async fn test_file_cache_serves_repeat_requests() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/7203/kessan")
        .with_status(200)
        .with_body(SAMPLE)
        .expect(1)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cache = Arc::new(FileCache::new(dir.path(), chrono::Duration::hours(1)));
    let fetcher = KessanFetcher::new(server.url()).with_request_delay(Duration::ZERO);
    let service = AnalysisService::new(cache, fetcher);

    let first = service.analyze("7203").await.unwrap();
    let second = service.analyze("7203").await.unwrap();

    assert_eq!(first, second);
    assert!(dir.path().join("7203.json").exists());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_expired_memory_entry_is_refetched() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/7203/kessan")
        .with_status(200)
        .with_body(SAMPLE)
        .expect(2)
        .create_async()
        .await;

    let cache = Arc::new(MemoryCache::new(chrono::Duration::zero()));
    let service = create_test_service(&server, cache);

    service.financials("7203").await.unwrap();
    service.financials("7203").await.unwrap();

    mock.assert_async().await;
}
