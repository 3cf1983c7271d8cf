//! Repository for the `detection_metrics` table.

use arstudio_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::detection_metric::{
    CreateDetectionMetric, DailyDetectionCount, DetectionMetric,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, experience_id, detected_at";

/// Records and aggregates marker detections.
pub struct DetectionMetricRepo;

impl DetectionMetricRepo {
    /// Record one detection at the current time.
    pub async fn create(
        pool: &PgPool,
        input: &CreateDetectionMetric,
    ) -> Result<DetectionMetric, sqlx::Error> {
        let query = format!(
            "INSERT INTO detection_metrics (experience_id)
             VALUES ($1)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DetectionMetric>(&query)
            .bind(input.experience_id)
            .fetch_one(pool)
            .await
    }

    /// List detections newest first, optionally for one experience.
    pub async fn list(
        pool: &PgPool,
        experience_id: Option<DbId>,
    ) -> Result<Vec<DetectionMetric>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM detection_metrics
             WHERE ($1::BIGINT IS NULL OR experience_id = $1)
             ORDER BY detected_at DESC, id DESC"
        );
        sqlx::query_as::<_, DetectionMetric>(&query)
            .bind(experience_id)
            .fetch_all(pool)
            .await
    }

    /// Detection counts per UTC day since `since`. Days without detections
    /// are omitted.
    pub async fn daily_counts(
        pool: &PgPool,
        since: Timestamp,
    ) -> Result<Vec<DailyDetectionCount>, sqlx::Error> {
        sqlx::query_as::<_, DailyDetectionCount>(
            "SELECT (detected_at AT TIME ZONE 'UTC')::DATE AS day, COUNT(*) AS count
             FROM detection_metrics
             WHERE detected_at >= $1
             GROUP BY day
             ORDER BY day",
        )
        .bind(since)
        .fetch_all(pool)
        .await
    }
}
