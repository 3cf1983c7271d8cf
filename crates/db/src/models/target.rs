//! Target entity model and DTOs.

use arstudio_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A target row from the `targets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Target {
    pub id: DbId,
    pub name: String,
    /// Source image, relative to the media root.
    pub image_path: String,
    /// Generated marker descriptor, relative to the media root.
    pub marker_path: Option<String>,
    /// One of `pending`, `processing`, `ready`, `failed`.
    pub marker_status: String,
    pub marker_error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new target. The image is stored before the insert.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTarget {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: String,
    pub image_path: String,
}

/// DTO for updating a target. A new `image_path` resets the marker state.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTarget {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: Option<String>,
    pub image_path: Option<String>,
}

/// Marker generation state for a single target.
#[derive(Debug, Clone, Serialize)]
pub struct TargetMarker {
    pub target_id: DbId,
    pub marker_status: String,
    pub marker_path: Option<String>,
    pub marker_error: Option<String>,
}

impl From<&Target> for TargetMarker {
    fn from(target: &Target) -> Self {
        Self {
            target_id: target.id,
            marker_status: target.marker_status.clone(),
            marker_path: target.marker_path.clone(),
            marker_error: target.marker_error.clone(),
        }
    }
}
