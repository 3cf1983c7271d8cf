//! Aggregate counters for the dashboard.

use serde::Serialize;
use sqlx::FromRow;

/// Totals shown on the dashboard overview.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DashboardStats {
    pub targets: i64,
    pub assets: i64,
    pub experiences: i64,
    pub published: i64,
    pub total_views: i64,
    pub total_detections: i64,
}
