//! Marker descriptor generation via an external command-line tool.
//!
//! The tool is opaque: it receives the source image path and an output
//! directory and is expected to emit descriptor file(s) named after the
//! image stem. Two tool variants are supported:
//!
//! - [`MarkerToolVariant::Nft`] emits `<stem>.fset`, `<stem>.fset3` and
//!   `<stem>.iset`; the descriptor is recorded as the extension-less prefix.
//! - [`MarkerToolVariant::Pattern`] emits `<stem>.patt`.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::experience_config::MarkerType;

/// Placeholder replaced by the source image path in the argument template.
pub const INPUT_PLACEHOLDER: &str = "{input}";

/// Placeholder replaced by the output directory in the argument template.
pub const OUTPUT_DIR_PLACEHOLDER: &str = "{output_dir}";

/// Lifecycle of a target's marker descriptor.
pub const MARKER_STATUS_PENDING: &str = "pending";
pub const MARKER_STATUS_PROCESSING: &str = "processing";
pub const MARKER_STATUS_READY: &str = "ready";
pub const MARKER_STATUS_FAILED: &str = "failed";

/// Error type for marker generation.
#[derive(Debug, thiserror::Error)]
pub enum MarkerError {
    #[error("marker tool could not be started: {0}")]
    Spawn(std::io::Error),

    #[error("marker tool failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("marker tool timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("marker tool exited successfully but produced no descriptor at {0}")]
    MissingOutput(String),

    #[error("source image not found: {0}")]
    ImageNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which descriptor layout the configured tool produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerToolVariant {
    Nft,
    Pattern,
}

impl MarkerToolVariant {
    /// Extensions of every file the tool must produce.
    pub fn output_extensions(self) -> &'static [&'static str] {
        match self {
            MarkerToolVariant::Nft => &["fset", "fset3", "iset"],
            MarkerToolVariant::Pattern => &["patt"],
        }
    }

    /// Viewer tracking mode that can load this variant's descriptors.
    pub fn marker_type(self) -> MarkerType {
        match self {
            MarkerToolVariant::Nft => MarkerType::Nft,
            MarkerToolVariant::Pattern => MarkerType::Pattern,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "nft" => Some(MarkerToolVariant::Nft),
            "pattern" | "patt" => Some(MarkerToolVariant::Pattern),
            _ => None,
        }
    }
}

/// How to invoke the external marker tool.
#[derive(Debug, Clone)]
pub struct MarkerToolConfig {
    pub program: String,
    /// Argument template; see [`INPUT_PLACEHOLDER`] and [`OUTPUT_DIR_PLACEHOLDER`].
    pub args: Vec<String>,
    pub variant: MarkerToolVariant,
    pub timeout: Duration,
}

/// Result of a successful generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerDescriptor {
    /// Path recorded on the target: the prefix for NFT, the `.patt` file otherwise.
    pub descriptor_path: PathBuf,
    /// Every file the tool produced.
    pub files: Vec<PathBuf>,
}

/// Paths the tool is expected to produce for `image_path`.
///
/// Outputs are colocated with the image and share its stem.
pub fn expected_outputs(image_path: &Path, variant: MarkerToolVariant) -> MarkerDescriptor {
    let dir = image_path.parent().unwrap_or_else(|| Path::new("."));
    let stem = image_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let prefix = dir.join(&stem);

    let files: Vec<PathBuf> = variant
        .output_extensions()
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .collect();

    let descriptor_path = match variant {
        MarkerToolVariant::Nft => prefix,
        MarkerToolVariant::Pattern => files[0].clone(),
    };

    MarkerDescriptor {
        descriptor_path,
        files,
    }
}

/// Substitute the placeholders in the argument template.
pub fn build_args(template: &[String], image_path: &Path, output_dir: &Path) -> Vec<String> {
    let input = image_path.to_string_lossy();
    let output = output_dir.to_string_lossy();
    template
        .iter()
        .map(|arg| {
            arg.replace(INPUT_PLACEHOLDER, &input)
                .replace(OUTPUT_DIR_PLACEHOLDER, &output)
        })
        .collect()
}

/// Run the marker tool on `image_path` and verify its outputs exist.
///
/// Stdout is discarded; stderr is captured for the error message. The child
/// is killed if `config.timeout` elapses.
pub async fn generate(
    config: &MarkerToolConfig,
    image_path: &Path,
) -> Result<MarkerDescriptor, MarkerError> {
    if !tokio::fs::try_exists(image_path).await? {
        return Err(MarkerError::ImageNotFound(
            image_path.to_string_lossy().into_owned(),
        ));
    }

    let output_dir = image_path.parent().unwrap_or_else(|| Path::new("."));
    let args = build_args(&config.args, image_path, output_dir);

    tracing::info!(
        program = %config.program,
        image = %image_path.display(),
        variant = ?config.variant,
        "Running marker tool"
    );

    let child = tokio::process::Command::new(&config.program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(MarkerError::Spawn)?;

    // On timeout the future is dropped together with the child, which kills it.
    let output = tokio::time::timeout(config.timeout, child.wait_with_output())
        .await
        .map_err(|_| MarkerError::Timeout {
            secs: config.timeout.as_secs(),
        })??;

    if !output.status.success() {
        return Err(MarkerError::ExecutionFailed {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let expected = expected_outputs(image_path, config.variant);
    for file in &expected.files {
        if !tokio::fs::try_exists(file).await? {
            return Err(MarkerError::MissingOutput(file.to_string_lossy().into_owned()));
        }
    }

    tracing::info!(
        descriptor = %expected.descriptor_path.display(),
        files = expected.files.len(),
        "Marker descriptor generated"
    );
    Ok(expected)
}

/// Remove every descriptor file the tool would have produced for `image_path`.
pub async fn remove_outputs(
    image_path: &Path,
    variant: MarkerToolVariant,
) -> Result<(), MarkerError> {
    for file in expected_outputs(image_path, variant).files {
        match tokio::fs::remove_file(&file).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
