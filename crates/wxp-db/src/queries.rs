//! Query operations for the weather store

use crate::schema::{
    BucketInterval, BucketRow, LatestReading, PointRow, SnapshotRow, StoreSummary, SNAPSHOT_CAP,
};
use crate::{DbClient, DbResult};
use sqlx::Row;
use tracing::{debug, instrument};
use wxp_core::WeatherPoint;

const POINT_COLUMNS: &str = "id, timestamp, latitude, longitude, location_name, \
temperature, humidity, pressure, wind_speed, rainfall, \
wind_direction, cloudiness, visibility, uv_index, feels_like, dew_point";

impl DbClient {
    /// Upsert a batch of weather points.
    ///
    /// Each row is written in its own autocommit statement: on failure the
    /// call reports the error, but rows already written remain. Returns
    /// the number of rows affected.
    #[instrument(skip(self, points))]
    pub async fn insert_points(&self, points: &[WeatherPoint]) -> DbResult<u64> {
        let mut affected = 0u64;

        for point in points {
            let result = sqlx::query(
                r#"
                INSERT INTO weather_points (
                    timestamp, latitude, longitude, location_name,
                    temperature, humidity, pressure, wind_speed, rainfall,
                    wind_direction, cloudiness, visibility, uv_index, feels_like, dew_point
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT (latitude, longitude, timestamp) DO UPDATE SET
                    location_name = excluded.location_name,
                    temperature = excluded.temperature,
                    humidity = excluded.humidity,
                    pressure = excluded.pressure,
                    wind_speed = excluded.wind_speed,
                    rainfall = excluded.rainfall,
                    wind_direction = excluded.wind_direction,
                    cloudiness = excluded.cloudiness,
                    visibility = excluded.visibility,
                    uv_index = excluded.uv_index,
                    feels_like = excluded.feels_like,
                    dew_point = excluded.dew_point
                "#,
            )
            .bind(point.timestamp)
            .bind(point.latitude)
            .bind(point.longitude)
            .bind(&point.location_name)
            .bind(point.temperature)
            .bind(point.humidity)
            .bind(point.pressure)
            .bind(point.wind_speed)
            .bind(point.rainfall)
            .bind(point.wind_direction)
            .bind(point.cloudiness)
            .bind(point.visibility)
            .bind(point.uv_index)
            .bind(point.feels_like)
            .bind(point.dew_point)
            .execute(self.pool())
            .await?;

            affected += result.rows_affected();
        }

        debug!("Upserted {} weather points", affected);
        Ok(affected)
    }

    /// Get points ordered by timestamp descending.
    ///
    /// Both time bounds are inclusive; an absent bound leaves that side
    /// unbounded. The limit caps the result after ordering.
    #[instrument(skip(self))]
    pub async fn query_points(
        &self,
        limit: Option<i64>,
        start_time: Option<i64>,
        end_time: Option<i64>,
    ) -> DbResult<Vec<WeatherPoint>> {
        let mut sql = format!("SELECT {POINT_COLUMNS} FROM weather_points");

        let mut conditions = Vec::new();
        if start_time.is_some() {
            conditions.push("timestamp >= ?");
        }
        if end_time.is_some() {
            conditions.push("timestamp <= ?");
        }
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY timestamp DESC");
        if limit.is_some() {
            sql.push_str(" LIMIT ?");
        }

        let mut query = sqlx::query_as::<_, PointRow>(&sql);
        if let Some(start) = start_time {
            query = query.bind(start);
        }
        if let Some(end) = end_time {
            query = query.bind(end);
        }
        if let Some(limit) = limit {
            query = query.bind(limit);
        }

        let rows = query.fetch_all(self.pool()).await?;
        debug!("Retrieved {} weather points", rows.len());
        Ok(rows.into_iter().map(PointRow::into_point).collect())
    }

    /// Group points into calendar buckets, newest bucket first
    #[instrument(skip(self))]
    pub async fn query_bucketed(&self, interval: BucketInterval) -> DbResult<Vec<BucketRow>> {
        // Truncation format and row cap are compile-time constants per
        // granularity, never caller input
        let sql = format!(
            r#"
            SELECT
                strftime('{fmt}', datetime(timestamp, 'unixepoch')) AS time_period,
                AVG(temperature) AS avg_temperature,
                MIN(temperature) AS min_temperature,
                MAX(temperature) AS max_temperature,
                AVG(humidity) AS avg_humidity,
                AVG(pressure) AS avg_pressure,
                AVG(wind_speed) AS avg_wind_speed,
                SUM(rainfall) AS total_rainfall,
                COUNT(*) AS data_points
            FROM weather_points
            GROUP BY time_period
            ORDER BY time_period DESC
            LIMIT {cap}
            "#,
            fmt = interval.truncation(),
            cap = interval.max_rows(),
        );

        let rows = sqlx::query_as::<_, BucketRow>(&sql)
            .fetch_all(self.pool())
            .await?;

        debug!(
            "Bucketed into {} {} groups",
            rows.len(),
            interval.as_str()
        );
        Ok(rows)
    }

    /// Delete points older than the cutoff; permanent. Returns the count
    /// of rows removed.
    #[instrument(skip(self))]
    pub async fn prune_older_than(&self, cutoff: i64) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM weather_points WHERE timestamp < ?")
            .bind(cutoff)
            .execute(self.pool())
            .await?;

        let deleted = result.rows_affected();
        debug!("Pruned {} points older than {}", deleted, cutoff);
        Ok(deleted)
    }

    /// Get count of stored points
    #[instrument(skip(self))]
    pub async fn count_points(&self) -> DbResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM weather_points")
            .fetch_one(self.pool())
            .await?;
        Ok(row.get("count"))
    }

    /// Overview of the stored dataset: row count, covered range, newest
    /// reading
    #[instrument(skip(self))]
    pub async fn summary(&self) -> DbResult<StoreSummary> {
        let total_points = self.count_points().await?;

        let range = sqlx::query(
            "SELECT MIN(timestamp) AS first_ts, MAX(timestamp) AS last_ts FROM weather_points",
        )
        .fetch_one(self.pool())
        .await?;

        let latest = sqlx::query_as::<_, LatestReading>(
            r#"
            SELECT timestamp, temperature, humidity, pressure
            FROM weather_points
            ORDER BY timestamp DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(self.pool())
        .await?;

        Ok(StoreSummary {
            total_points,
            first_timestamp: range.get("first_ts"),
            last_timestamp: range.get("last_ts"),
            latest,
        })
    }

    /// Persist one aggregate snapshot and trim the cache to the newest
    /// [`SNAPSHOT_CAP`] rows
    #[instrument(skip(self, stats_json, analytics_json))]
    pub async fn save_snapshot(
        &self,
        computed_at: i64,
        stats_json: &str,
        analytics_json: Option<&str>,
    ) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO aggregate_snapshots (computed_at, stats_json, analytics_json) VALUES (?, ?, ?)",
        )
        .bind(computed_at)
        .bind(stats_json)
        .bind(analytics_json)
        .execute(self.pool())
        .await?;

        sqlx::query(
            r#"
            DELETE FROM aggregate_snapshots
            WHERE id NOT IN (
                SELECT id FROM aggregate_snapshots
                ORDER BY computed_at DESC, id DESC
                LIMIT ?
            )
            "#,
        )
        .bind(SNAPSHOT_CAP)
        .execute(self.pool())
        .await?;

        debug!("Saved aggregate snapshot at {}", computed_at);
        Ok(())
    }

    /// Get the most recent snapshot, if any
    #[instrument(skip(self))]
    pub async fn latest_snapshot(&self) -> DbResult<Option<SnapshotRow>> {
        let row = sqlx::query_as::<_, SnapshotRow>(
            r#"
            SELECT computed_at, stats_json, analytics_json
            FROM aggregate_snapshots
            ORDER BY computed_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(self.pool())
        .await?;
        Ok(row)
    }

    /// Attach a pattern analysis to the most recent snapshot. Returns
    /// false when no snapshot exists yet.
    #[instrument(skip(self, analytics_json))]
    pub async fn update_latest_analytics(&self, analytics_json: &str) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE aggregate_snapshots SET analytics_json = ?
            WHERE id = (
                SELECT id FROM aggregate_snapshots
                ORDER BY computed_at DESC, id DESC
                LIMIT 1
            )
            "#,
        )
        .bind(analytics_json)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Midnight UTC, so hourly offsets line up with calendar days
    const DAY_START: i64 = 1_700_006_400;

    fn make_point(timestamp: i64, temperature: f64) -> WeatherPoint {
        WeatherPoint {
            temperature,
            ..WeatherPoint::new(timestamp, 51.5074, -0.1278)
        }
    }

    async fn store() -> DbClient {
        DbClient::in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn test_round_trip_descending_order() {
        let db = store().await;
        let points: Vec<_> = (0..5)
            .map(|i| make_point(DAY_START + i * 3600, 10.0 + i as f64))
            .collect();

        let stored = db.insert_points(&points).await.unwrap();
        assert_eq!(stored, 5);

        let fetched = db.query_points(Some(10), None, None).await.unwrap();
        assert_eq!(fetched.len(), 5);
        for pair in fetched.windows(2) {
            assert!(pair[0].timestamp > pair[1].timestamp);
        }

        // Newest row first, values intact
        assert_eq!(fetched[0].temperature, 14.0);
        assert_eq!(fetched[4].temperature, 10.0);
        assert_eq!(fetched[0].latitude, 51.5074);
    }

    #[tokio::test]
    async fn test_time_bounds_are_inclusive() {
        let db = store().await;
        let points: Vec<_> = (0..5)
            .map(|i| make_point(DAY_START + i * 3600, 20.0))
            .collect();
        db.insert_points(&points).await.unwrap();

        let fetched = db
            .query_points(None, Some(DAY_START + 3600), Some(DAY_START + 3 * 3600))
            .await
            .unwrap();
        assert_eq!(fetched.len(), 3);
        assert_eq!(fetched[0].timestamp, DAY_START + 3 * 3600);
        assert_eq!(fetched[2].timestamp, DAY_START + 3600);
    }

    #[tokio::test]
    async fn test_limit_applies_after_ordering() {
        let db = store().await;
        let points: Vec<_> = (0..10)
            .map(|i| make_point(DAY_START + i * 3600, 20.0))
            .collect();
        db.insert_points(&points).await.unwrap();

        let fetched = db.query_points(Some(3), None, None).await.unwrap();
        assert_eq!(fetched.len(), 3);
        assert_eq!(fetched[0].timestamp, DAY_START + 9 * 3600);
    }

    #[tokio::test]
    async fn test_upsert_deduplicates_identity() {
        let db = store().await;
        let point = make_point(DAY_START, 20.0);

        db.insert_points(&[point.clone()]).await.unwrap();

        let mut refreshed = point;
        refreshed.temperature = 21.5;
        db.insert_points(&[refreshed]).await.unwrap();

        assert_eq!(db.count_points().await.unwrap(), 1);
        let fetched = db.query_points(None, None, None).await.unwrap();
        assert_eq!(fetched[0].temperature, 21.5);

        // Same timestamp at a different location is a distinct identity
        let elsewhere = WeatherPoint::new(DAY_START, 48.8566, 2.3522);
        db.insert_points(&[elsewhere]).await.unwrap();
        assert_eq!(db.count_points().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_prune_removes_only_older() {
        let db = store().await;
        let cutoff = DAY_START + 5 * 3600;
        let points: Vec<_> = (0..10)
            .map(|i| make_point(DAY_START + i * 3600, 20.0))
            .collect();
        db.insert_points(&points).await.unwrap();

        let deleted = db.prune_older_than(cutoff).await.unwrap();
        assert_eq!(deleted, 5);

        let remaining = db.query_points(None, None, None).await.unwrap();
        assert_eq!(remaining.len(), 5);
        assert!(remaining.iter().all(|p| p.timestamp >= cutoff));
    }

    #[tokio::test]
    async fn test_day_bucketing_over_two_days() {
        let db = store().await;
        // 48 hourly points spanning exactly two calendar days; day one
        // carries temperatures 0..24, day two 24..48
        let points: Vec<_> = (0..48)
            .map(|i| make_point(DAY_START + i * 3600, i as f64))
            .collect();
        db.insert_points(&points).await.unwrap();

        let buckets = db.query_bucketed(BucketInterval::Day).await.unwrap();
        assert_eq!(buckets.len(), 2);

        // Newest bucket first
        assert_eq!(buckets[0].data_points, 24);
        assert_eq!(buckets[1].data_points, 24);
        assert!((buckets[0].avg_temperature - 35.5).abs() < 1e-9);
        assert!((buckets[1].avg_temperature - 11.5).abs() < 1e-9);
        assert_eq!(buckets[1].min_temperature, 0.0);
        assert_eq!(buckets[1].max_temperature, 23.0);
    }

    #[tokio::test]
    async fn test_hour_bucketing_groups_within_hour() {
        let db = store().await;
        let points = vec![
            make_point(DAY_START, 10.0),
            make_point(DAY_START + 600, 20.0),
            make_point(DAY_START + 3600, 30.0),
        ];
        db.insert_points(&points).await.unwrap();

        let buckets = db.query_bucketed(BucketInterval::Hour).await.unwrap();
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[1].data_points, 2);
        assert!((buckets[1].avg_temperature - 15.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_rainfall_totals_per_bucket() {
        let db = store().await;
        let mut points: Vec<_> = (0..4)
            .map(|i| make_point(DAY_START + i * 3600, 20.0))
            .collect();
        for (i, point) in points.iter_mut().enumerate() {
            point.rainfall = i as f64;
        }
        db.insert_points(&points).await.unwrap();

        let buckets = db.query_bucketed(BucketInterval::Day).await.unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].total_rainfall, 6.0);
    }

    #[tokio::test]
    async fn test_snapshot_save_and_latest() {
        let db = store().await;
        assert!(db.latest_snapshot().await.unwrap().is_none());

        db.save_snapshot(100, r#"{"count":1}"#, None).await.unwrap();
        db.save_snapshot(200, r#"{"count":2}"#, None).await.unwrap();

        let latest = db.latest_snapshot().await.unwrap().unwrap();
        assert_eq!(latest.computed_at, 200);
        assert_eq!(latest.stats_json, r#"{"count":2}"#);
        assert!(latest.analytics_json.is_none());
    }

    #[tokio::test]
    async fn test_snapshot_cap_bounds_table() {
        let db = store().await;
        for i in 0..(SNAPSHOT_CAP + 20) {
            db.save_snapshot(i, "{}", None).await.unwrap();
        }

        let row = sqlx::query("SELECT COUNT(*) AS count FROM aggregate_snapshots")
            .fetch_one(db.pool())
            .await
            .unwrap();
        let count: i64 = row.get("count");
        assert_eq!(count, SNAPSHOT_CAP);

        // The newest snapshots survive
        let latest = db.latest_snapshot().await.unwrap().unwrap();
        assert_eq!(latest.computed_at, SNAPSHOT_CAP + 19);
    }

    #[tokio::test]
    async fn test_update_latest_analytics() {
        let db = store().await;
        assert!(!db.update_latest_analytics("{}").await.unwrap());

        db.save_snapshot(100, "{}", None).await.unwrap();
        assert!(db.update_latest_analytics(r#"{"trend":"stable"}"#).await.unwrap());

        let latest = db.latest_snapshot().await.unwrap().unwrap();
        assert_eq!(latest.analytics_json.as_deref(), Some(r#"{"trend":"stable"}"#));
    }

    #[tokio::test]
    async fn test_summary_reflects_dataset() {
        let db = store().await;
        let empty = db.summary().await.unwrap();
        assert_eq!(empty.total_points, 0);
        assert!(empty.first_timestamp.is_none());
        assert!(empty.latest.is_none());

        let points: Vec<_> = (0..3)
            .map(|i| make_point(DAY_START + i * 3600, 10.0 + i as f64))
            .collect();
        db.insert_points(&points).await.unwrap();

        let summary = db.summary().await.unwrap();
        assert_eq!(summary.total_points, 3);
        assert_eq!(summary.first_timestamp, Some(DAY_START));
        assert_eq!(summary.last_timestamp, Some(DAY_START + 2 * 3600));
        assert_eq!(summary.latest.unwrap().temperature, 12.0);
    }
}
