//! Pipeline orchestration

use crate::{PipelineError, PipelineResult};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use wxp_core::{analyze_patterns, summarize, PatternReport, WeatherStatistics, MIN_PATTERN_POINTS};
use wxp_db::{BucketInterval, BucketRow, DbClient, SnapshotRow, StoreSummary};
use wxp_upstream::{normalize, ForecastProvider, LocationRequest};

/// Newest rows considered when computing statistics
pub const STATS_WINDOW: i64 = 10_000;

/// Newest rows considered when analyzing patterns
pub const PATTERNS_WINDOW: i64 = 5_000;

/// Default cap on points normalized from one fetch
pub const DEFAULT_MAX_POINTS: usize = 24;

const SECS_PER_DAY: i64 = 86_400;

/// Outcome of one ingest call
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    /// Points produced by normalization
    pub normalized: usize,
    /// Rows affected in the store (upserts count once)
    pub stored: u64,
    pub latitude: f64,
    pub longitude: f64,
}

/// Display-shaped point: numeric fields rounded, timestamp echoed as
/// RFC 3339 for convenience
#[derive(Debug, Clone, Serialize)]
pub struct RecentPoint {
    pub timestamp: i64,
    pub datetime: String,
    pub latitude: f64,
    pub longitude: f64,
    pub location_name: String,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub wind_speed: f64,
    pub rainfall: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl From<wxp_core::WeatherPoint> for RecentPoint {
    fn from(point: wxp_core::WeatherPoint) -> Self {
        let datetime = chrono::DateTime::from_timestamp(point.timestamp, 0)
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_default();

        Self {
            timestamp: point.timestamp,
            datetime,
            latitude: point.latitude,
            longitude: point.longitude,
            location_name: point.location_name,
            temperature: round2(point.temperature),
            humidity: round2(point.humidity),
            pressure: round2(point.pressure),
            wind_speed: round2(point.wind_speed),
            rainfall: round2(point.rainfall),
        }
    }
}

/// Result of a statistics request; empty stores are an explicit outcome
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatisticsOutcome {
    NoData,
    Ready(WeatherStatistics),
}

/// Result of a pattern-analysis request
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PatternsOutcome {
    InsufficientData { available: usize, required: usize },
    Ready(PatternReport),
}

/// The façade consumed by presentation layers.
///
/// Holds the injected provider and store; cheap to clone into handler
/// state.
#[derive(Clone)]
pub struct WeatherPipeline {
    provider: Arc<dyn ForecastProvider>,
    db: DbClient,
    max_points: usize,
}

impl WeatherPipeline {
    pub fn new(provider: Arc<dyn ForecastProvider>, db: DbClient) -> Self {
        Self {
            provider,
            db,
            max_points: DEFAULT_MAX_POINTS,
        }
    }

    pub fn with_max_points(mut self, max_points: usize) -> Self {
        self.max_points = max_points;
        self
    }

    pub fn db(&self) -> &DbClient {
        &self.db
    }

    /// Write path: fetch, normalize, store.
    ///
    /// Reports the stored count, or the failure reason. An upstream
    /// payload with no usable sections is `NoDataReturned`.
    #[instrument(skip(self, location), fields(latitude = location.latitude, longitude = location.longitude))]
    pub async fn ingest(
        &self,
        location: &LocationRequest,
        horizon_hours: u32,
    ) -> PipelineResult<IngestReport> {
        let payload = self
            .provider
            .fetch_forecast(location.latitude, location.longitude, horizon_hours)
            .await?;

        let now = Utc::now().timestamp();
        let points = normalize(payload, location, self.max_points, now);
        if points.is_empty() {
            return Err(PipelineError::NoDataReturned);
        }

        let stored = self.db.insert_points(&points).await?;
        info!(
            normalized = points.len(),
            stored,
            provider = self.provider.name(),
            "ingest complete"
        );

        Ok(IngestReport {
            normalized: points.len(),
            stored,
            latitude: location.latitude,
            longitude: location.longitude,
        })
    }

    /// Read path: filtered retrieval shaped for display
    pub async fn recent(
        &self,
        limit: Option<i64>,
        start_time: Option<i64>,
        end_time: Option<i64>,
    ) -> PipelineResult<Vec<RecentPoint>> {
        let points = self.db.query_points(limit, start_time, end_time).await?;
        Ok(points.into_iter().map(RecentPoint::from).collect())
    }

    /// Compute statistics over the newest window and cache the result
    #[instrument(skip(self))]
    pub async fn statistics(&self) -> PipelineResult<StatisticsOutcome> {
        let points = self.db.query_points(Some(STATS_WINDOW), None, None).await?;

        let Some(stats) = summarize(&points) else {
            return Ok(StatisticsOutcome::NoData);
        };

        // Snapshot persistence is best-effort caching; a serialization
        // problem downgrades to a warning rather than failing the read
        match serde_json::to_string(&stats) {
            Ok(json) => {
                self.db
                    .save_snapshot(Utc::now().timestamp(), &json, None)
                    .await?;
            }
            Err(err) => warn!(error = %err, "could not serialize statistics snapshot"),
        }

        Ok(StatisticsOutcome::Ready(stats))
    }

    /// Analyze trends/correlations over the newest window; the report is
    /// attached to the newest cached snapshot when one exists
    #[instrument(skip(self))]
    pub async fn patterns(&self) -> PipelineResult<PatternsOutcome> {
        let points = self
            .db
            .query_points(Some(PATTERNS_WINDOW), None, None)
            .await?;

        let Some(report) = analyze_patterns(&points) else {
            return Ok(PatternsOutcome::InsufficientData {
                available: points.len(),
                required: MIN_PATTERN_POINTS,
            });
        };

        match serde_json::to_string(&report) {
            Ok(json) => {
                self.db.update_latest_analytics(&json).await?;
            }
            Err(err) => warn!(error = %err, "could not serialize pattern report"),
        }

        Ok(PatternsOutcome::Ready(report))
    }

    /// Drop points older than the retention window. Returns the count of
    /// rows removed.
    #[instrument(skip(self))]
    pub async fn prune_retention(&self, days: u32) -> PipelineResult<u64> {
        if days < 1 {
            return Err(PipelineError::InvalidRequest(
                "retention must be at least one day".to_string(),
            ));
        }

        let cutoff = Utc::now().timestamp() - days as i64 * SECS_PER_DAY;
        let deleted = self.db.prune_older_than(cutoff).await?;
        info!(days, deleted, "retention prune complete");
        Ok(deleted)
    }

    /// Interval-grouped summaries, newest bucket first
    pub async fn bucketed(&self, interval: BucketInterval) -> PipelineResult<Vec<BucketRow>> {
        Ok(self.db.query_bucketed(interval).await?)
    }

    /// Dataset overview for health/summary endpoints
    pub async fn summary(&self) -> PipelineResult<StoreSummary> {
        Ok(self.db.summary().await?)
    }

    /// Most recent cached aggregate computation
    pub async fn latest_snapshot(&self) -> PipelineResult<Option<SnapshotRow>> {
        Ok(self.db.latest_snapshot().await?)
    }
}
