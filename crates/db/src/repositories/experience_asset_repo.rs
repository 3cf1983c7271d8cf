//! Repository for the `experience_assets` table.

use arstudio_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::experience_asset::{
    CreateExperienceAsset, ExperienceAsset, UpdateExperienceAsset, ViewerBinding,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, experience_id, asset_id, target_id, transform, autoplay, looped, \
    face_user, created_at, updated_at";

/// Provides CRUD operations for asset placements.
pub struct ExperienceAssetRepo;

impl ExperienceAssetRepo {
    /// Insert a new binding, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateExperienceAsset,
    ) -> Result<ExperienceAsset, sqlx::Error> {
        let query = format!(
            "INSERT INTO experience_assets
                (experience_id, asset_id, target_id, transform, autoplay, looped, face_user)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ExperienceAsset>(&query)
            .bind(input.experience_id)
            .bind(input.asset_id)
            .bind(input.target_id)
            .bind(Json(&input.transform))
            .bind(input.autoplay)
            .bind(input.looped)
            .bind(input.face_user)
            .fetch_one(pool)
            .await
    }

    /// Find a binding by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ExperienceAsset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM experience_assets WHERE id = $1");
        sqlx::query_as::<_, ExperienceAsset>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List bindings in insertion order, optionally for one experience.
    pub async fn list(
        pool: &PgPool,
        experience_id: Option<DbId>,
    ) -> Result<Vec<ExperienceAsset>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM experience_assets
             WHERE ($1::BIGINT IS NULL OR experience_id = $1)
             ORDER BY id"
        );
        sqlx::query_as::<_, ExperienceAsset>(&query)
            .bind(experience_id)
            .fetch_all(pool)
            .await
    }

    /// Update a binding. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateExperienceAsset,
    ) -> Result<Option<ExperienceAsset>, sqlx::Error> {
        let query = format!(
            "UPDATE experience_assets SET
                asset_id = COALESCE($2, asset_id),
                target_id = COALESCE($3, target_id),
                transform = COALESCE($4, transform),
                autoplay = COALESCE($5, autoplay),
                looped = COALESCE($6, looped),
                face_user = COALESCE($7, face_user)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ExperienceAsset>(&query)
            .bind(id)
            .bind(input.asset_id)
            .bind(input.target_id)
            .bind(input.transform.as_ref().map(Json))
            .bind(input.autoplay)
            .bind(input.looped)
            .bind(input.face_user)
            .fetch_optional(pool)
            .await
    }

    /// Delete a binding. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM experience_assets WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Bindings of one experience joined with asset and target data,
    /// grouped by target then in insertion order.
    pub async fn list_viewer_bindings(
        pool: &PgPool,
        experience_id: DbId,
    ) -> Result<Vec<ViewerBinding>, sqlx::Error> {
        sqlx::query_as::<_, ViewerBinding>(
            "SELECT ea.id AS binding_id, t.id AS target_id, t.name AS target_name,
                    t.marker_path, a.name AS asset_name, a.asset_type, a.file_path,
                    ea.transform, ea.autoplay, ea.looped, ea.face_user
             FROM experience_assets ea
             JOIN assets a ON a.id = ea.asset_id
             JOIN targets t ON t.id = ea.target_id
             WHERE ea.experience_id = $1
             ORDER BY t.id, ea.id",
        )
        .bind(experience_id)
        .fetch_all(pool)
        .await
    }
}
