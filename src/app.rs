use std::sync::Arc;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{create_router, AppState};
use crate::cache::FileCache;
use crate::config::Config;
use crate::fetcher::KessanFetcher;
use crate::services::AnalysisService;

/// Application with its spawned server task
pub struct Application {
    pub server_handle: JoinHandle<Result<(), std::io::Error>>,
}

impl Application {
    /// Build and initialize the application
    ///
    /// Wires the on-disk series cache, the results-page fetcher and the
    /// analysis service into the HTTP API, then spawns the server.
    pub async fn build(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        info!("Initializing application components");

        let cache = FileCache::new(&config.cache_dir, config.cache_ttl());
        info!(
            "Series cache at {} (ttl {}h)",
            cache.dir().display(),
            config.cache_ttl_hours
        );

        let fetcher = KessanFetcher::new(config.source_base_url.clone())
            .with_request_delay(config.request_delay())
            .with_max_retries(config.fetch_max_retries);

        let analysis_service = AnalysisService::new(Arc::new(cache), fetcher)
            .with_score_window(config.score_window_years);

        let app_state = AppState { analysis_service };
        let app = create_router(app_state).layer(TraceLayer::new_for_http());

        let addr = config.server_addr();
        info!("Starting HTTP server on {}", addr);

        let server_handle = tokio::spawn(async move {
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            axum::serve(listener, app).await
        });

        info!("Application initialized successfully");

        Ok(Self { server_handle })
    }

    /// Run until the server stops
    pub async fn run_until_stopped(self) -> Result<(), Box<dyn std::error::Error>> {
        self.server_handle.await??;
        Ok(())
    }
}
