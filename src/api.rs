use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::extract::ExtractError;
use crate::fetch_error::FetchError;
use crate::models::{FinancialSeries, ScoreResult};
use crate::services::{AnalysisError, AnalysisService};

#[derive(Clone)]
pub struct AppState {
    pub analysis_service: AnalysisService,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Maps service failures onto HTTP statuses with a JSON error body.
pub struct ApiError(AnalysisError);

impl From<AnalysisError> for ApiError {
    fn from(e: AnalysisError) -> Self {
        Self(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            AnalysisError::InvalidTicker(_) => StatusCode::BAD_REQUEST,
            AnalysisError::Fetch(FetchError::NotFound(_)) => StatusCode::NOT_FOUND,
            AnalysisError::Fetch(_) => StatusCode::BAD_GATEWAY,
            AnalysisError::Extract(ExtractError::TableNotFound { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Analysis failed: {}", self.0);
        } else {
            warn!("Analysis rejected: {}", self.0);
        }
        let body = ErrorResponse {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/analyze/{ticker}", get(analyze))
        .route("/financials/{ticker}", get(get_financials))
        .with_state(state);

    Router::new().nest("/api/v1", api_routes)
}

#[instrument(skip(_state))]
async fn health(State(_state): State<AppState>) -> impl IntoResponse {
    debug!("Health check requested");
    let response = HealthResponse {
        status: "healthy".to_string(),
    };
    (StatusCode::OK, Json(response))
}

#[instrument(skip(state), fields(ticker = %ticker))]
async fn analyze(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<ScoreResult>, ApiError> {
    debug!("Analyzing ticker {}", ticker);
    let result = state.analysis_service.analyze(&ticker).await?;

    info!(
        "Analysis for {} complete: total score {}",
        result.ticker, result.total_score
    );
    Ok(Json(result))
}

#[instrument(skip(state), fields(ticker = %ticker))]
async fn get_financials(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<FinancialSeries>, ApiError> {
    debug!("Fetching financial series for {}", ticker);
    let series = state.analysis_service.financials(&ticker).await?;

    info!(
        "Retrieved {} fiscal years for {}",
        series.year_count(),
        series.ticker
    );
    Ok(Json(series))
}
