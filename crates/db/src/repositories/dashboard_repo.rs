//! Aggregate queries backing the dashboard.

use sqlx::PgPool;

use crate::models::dashboard::DashboardStats;

pub struct DashboardRepo;

impl DashboardRepo {
    /// Entity counts and engagement totals in a single round trip.
    pub async fn stats(pool: &PgPool) -> Result<DashboardStats, sqlx::Error> {
        sqlx::query_as::<_, DashboardStats>(
            "SELECT
                (SELECT COUNT(*) FROM targets) AS targets,
                (SELECT COUNT(*) FROM assets) AS assets,
                (SELECT COUNT(*) FROM experiences) AS experiences,
                (SELECT COUNT(*) FROM experiences WHERE is_published) AS published,
                (SELECT COALESCE(SUM(views), 0)::BIGINT FROM experiences) AS total_views,
                (SELECT COUNT(*) FROM detection_metrics) AS total_detections",
        )
        .fetch_one(pool)
        .await
    }
}
