//! Repository for the `assets` table.

use arstudio_core::asset::size_mb;
use arstudio_core::types::DbId;
use sqlx::PgPool;

use crate::models::asset::{Asset, CreateAsset, UpdateAsset};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, name, file_path, asset_type, size_bytes, size_mb, created_at, updated_at";

/// Provides CRUD operations for assets.
///
/// `size_mb` is always derived from `size_bytes` here, so the two columns
/// cannot drift apart.
pub struct AssetRepo;

impl AssetRepo {
    /// Insert a new asset, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateAsset) -> Result<Asset, sqlx::Error> {
        let query = format!(
            "INSERT INTO assets (name, file_path, asset_type, size_bytes, size_mb)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Asset>(&query)
            .bind(&input.name)
            .bind(&input.file_path)
            .bind(input.asset_type.as_str())
            .bind(input.size_bytes)
            .bind(size_mb(input.size_bytes.max(0) as u64))
            .fetch_one(pool)
            .await
    }

    /// Find an asset by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Asset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assets WHERE id = $1");
        sqlx::query_as::<_, Asset>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all assets, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Asset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assets ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Asset>(&query).fetch_all(pool).await
    }

    /// Update an asset. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAsset,
    ) -> Result<Option<Asset>, sqlx::Error> {
        let new_size_mb = input.size_bytes.map(|b| size_mb(b.max(0) as u64));
        let query = format!(
            "UPDATE assets SET
                name = COALESCE($2, name),
                asset_type = COALESCE($3, asset_type),
                file_path = COALESCE($4, file_path),
                size_bytes = COALESCE($5, size_bytes),
                size_mb = COALESCE($6, size_mb)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Asset>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.asset_type.map(|t| t.as_str()))
            .bind(&input.file_path)
            .bind(input.size_bytes)
            .bind(new_size_mb)
            .fetch_optional(pool)
            .await
    }

    /// Delete an asset, returning the removed row so its file can be cleaned up.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Asset>, sqlx::Error> {
        let query = format!("DELETE FROM assets WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Asset>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
