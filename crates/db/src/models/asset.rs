//! Asset entity model and DTOs.

use arstudio_core::asset::AssetType;
use arstudio_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// An asset row from the `assets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Asset {
    pub id: DbId,
    pub name: String,
    /// Stored file, relative to the media root.
    pub file_path: String,
    /// One of `model`, `image`, `video`, `audio`.
    #[serde(rename = "type")]
    pub asset_type: String,
    pub size_bytes: i64,
    pub size_mb: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new asset. `size_bytes` is read from the stored file.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAsset {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: String,
    pub file_path: String,
    pub asset_type: AssetType,
    pub size_bytes: i64,
}

/// DTO for updating an asset. `file_path` and `size_bytes` travel together.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateAsset {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: Option<String>,
    pub asset_type: Option<AssetType>,
    pub file_path: Option<String>,
    pub size_bytes: Option<i64>,
}
