//! Asset media types and size accounting.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Bytes per megabyte used for the `size_mb` column (binary MB).
pub const BYTES_PER_MB: f64 = 1_048_576.0;

/// Kind of media an asset carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Model,
    Image,
    Video,
    Audio,
}

impl AssetType {
    pub const ALL: [AssetType; 4] = [
        AssetType::Model,
        AssetType::Image,
        AssetType::Video,
        AssetType::Audio,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AssetType::Model => "model",
            AssetType::Image => "image",
            AssetType::Video => "video",
            AssetType::Audio => "audio",
        }
    }

    /// Parse the stored/submitted string form.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == value)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid asset type '{value}'. Must be one of: model, image, video, audio"
                ))
            })
    }
}

impl std::fmt::Display for AssetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert a byte count into the megabyte figure stored on the asset row.
pub fn size_mb(size_bytes: u64) -> f64 {
    size_bytes as f64 / BYTES_PER_MB
}
