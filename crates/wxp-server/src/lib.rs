use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use wxp_db::BucketInterval;
use wxp_pipeline::{PipelineError, WeatherPipeline};
use wxp_upstream::LocationRequest;

pub struct AppState {
    pipeline: WeatherPipeline,
}

impl AppState {
    pub fn pipeline(&self) -> &WeatherPipeline {
        &self.pipeline
    }
}

pub fn build_app(pipeline: WeatherPipeline) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState { pipeline });

    let router = Router::new()
        .route("/health", get(health))
        .route("/api/v1/ingest", post(ingest))
        .route("/api/v1/weather-data", get(weather_data))
        .route("/api/v1/statistics", get(statistics))
        .route("/api/v1/analytics", get(analytics))
        .route("/api/v1/summary", get(summary))
        .route("/api/v1/aggregated/:interval", get(aggregated))
        .route("/api/v1/retention/:days", delete(retention))
        .with_state(Arc::clone(&state));

    (router, state)
}

/// Map a pipeline failure onto an HTTP response. Valid-but-empty outcomes
/// are handled by the individual handlers and never reach this.
fn error_response(err: PipelineError) -> (StatusCode, Json<serde_json::Value>) {
    let (status, message) = match &err {
        PipelineError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        PipelineError::UpstreamUnavailable(msg) => {
            (StatusCode::SERVICE_UNAVAILABLE, msg.clone())
        }
        PipelineError::NoDataReturned => {
            (StatusCode::OK, "provider returned no usable data".to_string())
        }
        PipelineError::Storage(e) => {
            tracing::error!(error = %e, "storage failure");
            (StatusCode::INTERNAL_SERVER_ERROR, "storage failure".to_string())
        }
    };
    (status, Json(json!({ "error": message })))
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.pipeline.summary().await {
        Ok(summary) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "data_records": summary.total_points,
            })),
        ),
        Err(err) => {
            tracing::error!(error = %err, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unhealthy" })),
            )
        }
    }
}

fn default_hours() -> u32 {
    24
}

#[derive(Deserialize)]
struct IngestBody {
    latitude: f64,
    longitude: f64,
    #[serde(default = "default_hours")]
    hours: u32,
    location_name: Option<String>,
}

async fn ingest(
    State(state): State<Arc<AppState>>,
    Json(body): Json<IngestBody>,
) -> impl IntoResponse {
    let location = LocationRequest {
        latitude: body.latitude,
        longitude: body.longitude,
        name: body.location_name,
    };

    match state.pipeline.ingest(&location, body.hours).await {
        Ok(report) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "stored": report.stored,
                "normalized": report.normalized,
                "location": { "latitude": report.latitude, "longitude": report.longitude },
            })),
        )
            .into_response(),
        Err(PipelineError::NoDataReturned) => (
            StatusCode::OK,
            Json(json!({ "status": "no_data", "stored": 0 })),
        )
            .into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

#[derive(Deserialize)]
struct RecentQuery {
    limit: Option<i64>,
    start_time: Option<i64>,
    end_time: Option<i64>,
}

async fn weather_data(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecentQuery>,
) -> impl IntoResponse {
    let limit = query.limit.or(Some(100));
    match state
        .pipeline
        .recent(limit, query.start_time, query.end_time)
        .await
    {
        Ok(rows) => (
            StatusCode::OK,
            Json(json!({ "count": rows.len(), "data": rows })),
        )
            .into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

async fn statistics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.pipeline.statistics().await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

async fn analytics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.pipeline.patterns().await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

async fn summary(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.pipeline.summary().await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

async fn aggregated(
    State(state): State<Arc<AppState>>,
    Path(interval): Path<String>,
) -> impl IntoResponse {
    let Some(interval) = BucketInterval::parse(&interval) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid interval, use: hour, day, week or month" })),
        )
            .into_response();
    };

    match state.pipeline.bucketed(interval).await {
        Ok(rows) => (
            StatusCode::OK,
            Json(json!({
                "interval": interval.as_str(),
                "count": rows.len(),
                "data": rows,
            })),
        )
            .into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

async fn retention(
    State(state): State<Arc<AppState>>,
    Path(days): Path<u32>,
) -> impl IntoResponse {
    match state.pipeline.prune_retention(days).await {
        Ok(deleted) => (
            StatusCode::OK,
            Json(json!({ "deleted_records": deleted, "days": days })),
        )
            .into_response(),
        Err(err) => error_response(err).into_response(),
    }
}
