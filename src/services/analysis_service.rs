use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::cache::SeriesCache;
use crate::extract::{ExtractError, Extractor};
use crate::fetch_error::FetchError;
use crate::fetcher::KessanFetcher;
use crate::models::{FinancialSeries, ScoreResult};
use crate::scoring;
use crate::utils;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Invalid ticker '{0}'")]
    InvalidTicker(String),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Fetch-extract-score workflow for one ticker at a time.
///
/// Series are served from the injected cache while fresh; otherwise the
/// results page is fetched, extracted, and the cache refreshed.
#[derive(Clone)]
pub struct AnalysisService {
    cache: Arc<dyn SeriesCache>,
    fetcher: KessanFetcher,
    extractor: Extractor,
    score_window_years: Option<usize>,
}

impl AnalysisService {
    pub fn new(cache: Arc<dyn SeriesCache>, fetcher: KessanFetcher) -> Self {
        Self {
            cache,
            fetcher,
            extractor: Extractor::default(),
            score_window_years: None,
        }
    }

    pub fn with_extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Score only the most recent `years` fiscal years.
    pub fn with_score_window(mut self, years: Option<usize>) -> Self {
        self.score_window_years = years;
        self
    }

    /// Financial series for `ticker`, from cache when fresh.
    #[instrument(skip(self))]
    pub async fn financials(&self, ticker: &str) -> Result<FinancialSeries, AnalysisError> {
        let ticker = utils::normalize_ticker(ticker)
            .map_err(|_| AnalysisError::InvalidTicker(ticker.to_string()))?;

        if let Some(series) = self.cached(&ticker).await {
            info!("Using cached series for {}", ticker);
            return Ok(series);
        }

        let html = self.fetcher.fetch_document(&ticker).await?;
        let series = self.extractor.extract_html(&ticker, &html)?;

        self.store(&ticker, &series).await;

        Ok(series)
    }

    // Cache implementations may touch the filesystem, so they run off the
    // async workers. Cache failures never fail the request.
    async fn cached(&self, ticker: &str) -> Option<FinancialSeries> {
        let cache = Arc::clone(&self.cache);
        let key = ticker.to_string();
        match tokio::task::spawn_blocking(move || cache.get(&key)).await {
            Ok(series) => series,
            Err(e) => {
                warn!("Cache lookup for {} did not complete: {}", ticker, e);
                None
            }
        }
    }

    async fn store(&self, ticker: &str, series: &FinancialSeries) {
        let cache = Arc::clone(&self.cache);
        let key = ticker.to_string();
        let series = series.clone();
        match tokio::task::spawn_blocking(move || cache.put(&key, &series)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Failed to cache series for {}: {}", ticker, e),
            Err(e) => warn!("Cache write for {} did not complete: {}", ticker, e),
        }
    }

    /// Score `ticker`, applying the configured history window if any.
    #[instrument(skip(self))]
    pub async fn analyze(&self, ticker: &str) -> Result<ScoreResult, AnalysisError> {
        let series = self.financials(ticker).await?;
        let series = match self.score_window_years {
            Some(years) => series.recent(years),
            None => series,
        };

        let result = scoring::score(&series);
        info!(
            "Scored {}: {} over {} fiscal years",
            result.ticker,
            result.total_score,
            series.year_count()
        );
        Ok(result)
    }
}
