//! Repository for the `targets` table.

use arstudio_core::markers::{
    MARKER_STATUS_FAILED, MARKER_STATUS_PENDING, MARKER_STATUS_PROCESSING, MARKER_STATUS_READY,
};
use arstudio_core::types::DbId;
use sqlx::PgPool;

use crate::models::target::{CreateTarget, Target, UpdateTarget};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, image_path, marker_path, marker_status, marker_error, \
    created_at, updated_at";

/// Provides CRUD operations and marker-state transitions for targets.
pub struct TargetRepo;

impl TargetRepo {
    /// Insert a new target in the `pending` marker state.
    pub async fn create(pool: &PgPool, input: &CreateTarget) -> Result<Target, sqlx::Error> {
        let query = format!(
            "INSERT INTO targets (name, image_path, marker_status)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Target>(&query)
            .bind(&input.name)
            .bind(&input.image_path)
            .bind(MARKER_STATUS_PENDING)
            .fetch_one(pool)
            .await
    }

    /// Find a target by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Target>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM targets WHERE id = $1");
        sqlx::query_as::<_, Target>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List targets, newest first.
    ///
    /// With `experience_id`, only targets linked to that experience directly or
    /// through one of its asset bindings are returned.
    pub async fn list(
        pool: &PgPool,
        experience_id: Option<DbId>,
    ) -> Result<Vec<Target>, sqlx::Error> {
        match experience_id {
            None => {
                let query =
                    format!("SELECT {COLUMNS} FROM targets ORDER BY created_at DESC, id DESC");
                sqlx::query_as::<_, Target>(&query).fetch_all(pool).await
            }
            Some(experience_id) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM targets
                     WHERE id IN (
                         SELECT target_id FROM experience_targets WHERE experience_id = $1
                         UNION
                         SELECT target_id FROM experience_assets WHERE experience_id = $1
                     )
                     ORDER BY created_at DESC, id DESC"
                );
                sqlx::query_as::<_, Target>(&query)
                    .bind(experience_id)
                    .fetch_all(pool)
                    .await
            }
        }
    }

    /// Update a target. Only non-`None` fields in `input` are applied.
    ///
    /// A new `image_path` clears the descriptor and puts the marker back into
    /// `pending`. Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTarget,
    ) -> Result<Option<Target>, sqlx::Error> {
        let query = format!(
            "UPDATE targets SET
                name = COALESCE($2, name),
                image_path = COALESCE($3, image_path),
                marker_path = CASE WHEN $3::TEXT IS NULL THEN marker_path ELSE NULL END,
                marker_status = CASE WHEN $3::TEXT IS NULL THEN marker_status ELSE $4 END,
                marker_error = CASE WHEN $3::TEXT IS NULL THEN marker_error ELSE NULL END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Target>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.image_path)
            .bind(MARKER_STATUS_PENDING)
            .fetch_optional(pool)
            .await
    }

    /// Delete a target, returning the removed row so its files can be cleaned up.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Target>, sqlx::Error> {
        let query = format!("DELETE FROM targets WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Target>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Move a target into `processing` if its image is still `image_path`.
    ///
    /// Returns `false` when the target is gone or its image was replaced.
    pub async fn mark_processing(
        pool: &PgPool,
        id: DbId,
        image_path: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE targets SET marker_status = $3, marker_error = NULL
             WHERE id = $1 AND image_path = $2",
        )
        .bind(id)
        .bind(image_path)
        .bind(MARKER_STATUS_PROCESSING)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record a generated descriptor, unless the image changed meanwhile.
    pub async fn mark_ready(
        pool: &PgPool,
        id: DbId,
        image_path: &str,
        marker_path: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE targets SET marker_status = $3, marker_path = $4, marker_error = NULL
             WHERE id = $1 AND image_path = $2",
        )
        .bind(id)
        .bind(image_path)
        .bind(MARKER_STATUS_READY)
        .bind(marker_path)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record a generation failure, unless the image changed meanwhile.
    pub async fn mark_failed(
        pool: &PgPool,
        id: DbId,
        image_path: &str,
        error: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE targets SET marker_status = $3, marker_path = NULL, marker_error = $4
             WHERE id = $1 AND image_path = $2",
        )
        .bind(id)
        .bind(image_path)
        .bind(MARKER_STATUS_FAILED)
        .bind(error)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Targets whose marker generation never finished (e.g. across a restart).
    pub async fn list_unfinished(pool: &PgPool) -> Result<Vec<Target>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM targets
             WHERE marker_status IN ($1, $2)
             ORDER BY id"
        );
        sqlx::query_as::<_, Target>(&query)
            .bind(MARKER_STATUS_PENDING)
            .bind(MARKER_STATUS_PROCESSING)
            .fetch_all(pool)
            .await
    }
}
