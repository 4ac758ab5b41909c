//! Series caching keyed by ticker.
//!
//! The analysis service is handed a [`SeriesCache`]; nothing in extraction or
//! scoring touches a cache directly.
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::models::FinancialSeries;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize cached series: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Storage for previously extracted series.
pub trait SeriesCache: Send + Sync {
    /// A fresh series for `ticker`, or `None` when absent, expired or unreadable.
    fn get(&self, ticker: &str) -> Option<FinancialSeries>;

    fn put(&self, ticker: &str, series: &FinancialSeries) -> Result<(), CacheError>;
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedSeries {
    stored_at: DateTime<Utc>,
    series: FinancialSeries,
}

fn is_fresh(stored_at: DateTime<Utc>, ttl: Duration) -> bool {
    Utc::now() - stored_at < ttl
}

/// One JSON file per ticker under a directory.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
    ttl: Duration,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{ticker}.json"))
    }

    fn read_entry(&self, path: &Path) -> Result<CachedSeries, CacheError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl SeriesCache for FileCache {
    fn get(&self, ticker: &str) -> Option<FinancialSeries> {
        let path = self.path_for(ticker);
        if !path.exists() {
            return None;
        }

        match self.read_entry(&path) {
            Ok(entry) if !is_fresh(entry.stored_at, self.ttl) => {
                debug!("Cached series for {} is stale (stored {})", ticker, entry.stored_at);
                None
            }
            Ok(entry) if !entry.series.is_consistent() => {
                warn!("Cached series for {} has mismatched lengths, ignoring", ticker);
                None
            }
            Ok(entry) => {
                debug!("Loaded {} from cache", ticker);
                Some(entry.series)
            }
            Err(e) => {
                warn!("Cache entry {} unreadable, ignoring: {}", path.display(), e);
                None
            }
        }
    }

    fn put(&self, ticker: &str, series: &FinancialSeries) -> Result<(), CacheError> {
        std::fs::create_dir_all(&self.dir)?;

        let entry = CachedSeries {
            stored_at: Utc::now(),
            series: series.clone(),
        };
        let content = serde_json::to_vec_pretty(&entry)?;

        // Write beside the target and rename so readers never see a partial file
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&content)?;
        tmp.persist(self.path_for(ticker)).map_err(|e| e.error)?;

        debug!("Stored {} in cache", ticker);
        Ok(())
    }
}

/// In-process cache with the same freshness rule as [`FileCache`].
#[derive(Debug)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CachedSeries>>,
    ttl: Duration,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Number of entries currently held, fresh or not.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SeriesCache for MemoryCache {
    fn get(&self, ticker: &str) -> Option<FinancialSeries> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(ticker) {
            Some(entry) if is_fresh(entry.stored_at, self.ttl) => Some(entry.series.clone()),
            Some(_) => {
                debug!("Evicting stale cached series for {}", ticker);
                entries.remove(ticker);
                None
            }
            None => None,
        }
    }

    fn put(&self, ticker: &str, series: &FinancialSeries) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            ticker.to_string(),
            CachedSeries {
                stored_at: Utc::now(),
                series: series.clone(),
            },
        );
        Ok(())
    }
}
