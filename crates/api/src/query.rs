//! Shared query parameter types for API handlers.

use arstudio_core::types::DbId;
use serde::Deserialize;

/// `?experience_id=` filter accepted by the target, binding and metric lists.
#[derive(Debug, Default, Deserialize)]
pub struct ExperienceFilter {
    pub experience_id: Option<DbId>,
}
