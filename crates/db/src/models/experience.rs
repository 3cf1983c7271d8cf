//! Experience entity model and DTOs.

use arstudio_core::experience_config::ExperienceConfig;
use arstudio_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

/// An experience row from the `experiences` table, with its linked target ids.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Experience {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub config: Json<ExperienceConfig>,
    pub is_published: bool,
    pub published_at: Option<Timestamp>,
    pub views: i64,
    /// Ids from `experience_targets`, ascending.
    #[serde(rename = "targets")]
    pub target_ids: Vec<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new experience. The slug is derived from `name`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateExperience {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: String,
    #[serde(default)]
    pub targets: Vec<DbId>,
}

/// DTO for updating an experience. `targets`, when present, replaces the set.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateExperience {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: Option<String>,
    pub targets: Option<Vec<DbId>>,
}

