//! Typed experience configuration and asset transforms.
//!
//! Both are persisted as JSONB but parsed through these structs at the API
//! boundary, so malformed client input is rejected before it reaches the
//! database. Unknown keys are refused.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Tracking technique the published viewer uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerType {
    /// Square pattern markers (`.patt`).
    #[default]
    Pattern,
    /// Natural feature tracking on arbitrary images (`.fset`/`.fset3`/`.iset`).
    Nft,
}

impl MarkerType {
    pub fn as_str(self) -> &'static str {
        match self {
            MarkerType::Pattern => "pattern",
            MarkerType::Nft => "nft",
        }
    }
}

/// Per-experience playback configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperienceConfig {
    pub marker_type: MarkerType,
    /// Ids of the experience-asset bindings placed in the editor scene.
    pub objects: Vec<DbId>,
    pub show_detection_overlay: bool,
}

/// Position / rotation (degrees) / scale of an asset relative to its target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Transform {
    pub pos: [f64; 3],
    pub rot: [f64; 3],
    pub scale: [f64; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            pos: [0.0; 3],
            rot: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

impl Transform {
    /// Reject non-finite components and zero scale.
    pub fn validate(&self) -> Result<(), CoreError> {
        let groups = [("pos", &self.pos), ("rot", &self.rot), ("scale", &self.scale)];
        for (name, values) in groups {
            if values.iter().any(|v| !v.is_finite()) {
                return Err(CoreError::Validation(format!(
                    "Transform '{name}' components must be finite numbers"
                )));
            }
        }
        if self.scale.iter().any(|v| *v == 0.0) {
            return Err(CoreError::Validation(
                "Transform 'scale' components must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Parse a raw JSON value into an [`ExperienceConfig`].
pub fn parse_config(value: serde_json::Value) -> Result<ExperienceConfig, CoreError> {
    serde_json::from_value(value)
        .map_err(|e| CoreError::Validation(format!("Invalid experience config: {e}")))
}
