//! Detection telemetry model and DTOs.

use arstudio_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from `detection_metrics`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DetectionMetric {
    pub id: DbId,
    pub experience_id: DbId,
    pub detected_at: Timestamp,
}

/// DTO for recording a detection. The viewer posts `{ "experience": id }`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDetectionMetric {
    #[serde(alias = "experience")]
    pub experience_id: DbId,
}

/// Number of detections on a single UTC day.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DailyDetectionCount {
    pub day: chrono::NaiveDate,
    pub count: i64,
}
