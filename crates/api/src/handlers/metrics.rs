//! Handlers for detection telemetry.

use arstudio_core::types::Timestamp;
use arstudio_db::models::detection_metric::{
    CreateDetectionMetric, DailyDetectionCount, DetectionMetric,
};
use arstudio_db::repositories::DetectionMetricRepo;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Days, NaiveDate, Utc};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::query::ExperienceFilter;
use crate::state::AppState;

/// Number of days covered by the weekly series, today included.
const WEEK_DAYS: u64 = 7;

/// Chart-ready daily detection counts.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct WeeklySeries {
    /// ISO dates, oldest first.
    pub labels: Vec<String>,
    pub values: Vec<i64>,
}

/// POST /api/v1/metrics
///
/// Body: `{ "experience": id }`. An unknown experience is rejected by the
/// foreign key.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateDetectionMetric>,
) -> AppResult<(StatusCode, Json<DetectionMetric>)> {
    let metric = DetectionMetricRepo::create(&state.pool, &input).await?;
    tracing::debug!(experience_id = metric.experience_id, "Detection recorded");
    Ok((StatusCode::CREATED, Json(metric)))
}

/// GET /api/v1/metrics
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<ExperienceFilter>,
) -> AppResult<Json<Vec<DetectionMetric>>> {
    let metrics = DetectionMetricRepo::list(&state.pool, filter.experience_id).await?;
    Ok(Json(metrics))
}

/// GET /api/v1/metrics/weekly
///
/// Detections per UTC day for the last seven days, zero-filled.
pub async fn weekly(State(state): State<AppState>) -> AppResult<Json<WeeklySeries>> {
    let today = Utc::now().date_naive();
    let first = first_day(today)?;
    let since: Timestamp = first
        .and_hms_opt(0, 0, 0)
        .map(|t| t.and_utc())
        .ok_or_else(|| AppError::InternalError("Invalid week start".into()))?;

    let counts = DetectionMetricRepo::daily_counts(&state.pool, since).await?;
    Ok(Json(weekly_series(first, &counts)))
}

fn first_day(today: NaiveDate) -> AppResult<NaiveDate> {
    today
        .checked_sub_days(Days::new(WEEK_DAYS - 1))
        .ok_or_else(|| AppError::InternalError("Date out of range".into()))
}

/// Lay `counts` out over the seven days starting at `first`.
fn weekly_series(first: NaiveDate, counts: &[DailyDetectionCount]) -> WeeklySeries {
    let days: Vec<NaiveDate> = first.iter_days().take(WEEK_DAYS as usize).collect();
    let values = days
        .iter()
        .map(|day| {
            counts
                .iter()
                .find(|c| c.day == *day)
                .map_or(0, |c| c.count)
        })
        .collect();
    let labels = days.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect();
    WeeklySeries { labels, values }
}
