use std::path::PathBuf;
use std::time::Duration;

use arstudio_core::markers::{MarkerToolConfig, MarkerToolVariant};

/// Default argument template for the NFT marker creator.
const DEFAULT_MARKER_TOOL_ARGS: &str = "tools/nft-marker/node_modules/@webarkit/nft-marker-creator-app/src/NFTMarkerCreator.js -i {input} -o {output_dir} -noConf";

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Directory uploads and generated artifacts are written to.
    pub media_root: PathBuf,
    /// URL prefix under which the media root is served by the fronting server.
    pub media_url: String,
    /// Absolute base URL of this service, used for QR codes and viewer callbacks.
    pub public_base_url: String,
    /// Request body limit for uploads, in bytes.
    pub max_upload_bytes: usize,
    /// External marker generator invocation.
    pub marker_tool: MarkerToolConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                    |
    /// |----------------------------|----------------------------|
    /// | `HOST`                     | `0.0.0.0`                  |
    /// | `PORT`                     | `3000`                     |
    /// | `CORS_ORIGINS`             | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                       |
    /// | `MEDIA_ROOT`               | `media`                    |
    /// | `MEDIA_URL`                | `/media/`                  |
    /// | `PUBLIC_BASE_URL`          | `http://localhost:3000`    |
    /// | `MAX_UPLOAD_BYTES`         | `104857600`                |
    /// | `MARKER_TOOL_PROGRAM`      | `node`                     |
    /// | `MARKER_TOOL_ARGS`         | NFT marker creator script  |
    /// | `MARKER_TOOL_VARIANT`      | `nft`                      |
    /// | `MARKER_TOOL_TIMEOUT_SECS` | `300`                      |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let media_root =
            PathBuf::from(std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".into()));

        let media_url = std::env::var("MEDIA_URL").unwrap_or_else(|_| "/media/".into());

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .trim_end_matches('/')
            .to_string();

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| "104857600".into())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let marker_tool = marker_tool_from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            media_root,
            media_url,
            public_base_url,
            max_upload_bytes,
            marker_tool,
        }
    }
}

fn marker_tool_from_env() -> MarkerToolConfig {
    let program = std::env::var("MARKER_TOOL_PROGRAM").unwrap_or_else(|_| "node".into());

    let args: Vec<String> = std::env::var("MARKER_TOOL_ARGS")
        .unwrap_or_else(|_| DEFAULT_MARKER_TOOL_ARGS.into())
        .split_whitespace()
        .map(str::to_string)
        .collect();

    let variant_raw = std::env::var("MARKER_TOOL_VARIANT").unwrap_or_else(|_| "nft".into());
    let variant = MarkerToolVariant::parse(&variant_raw)
        .unwrap_or_else(|| panic!("MARKER_TOOL_VARIANT must be 'nft' or 'pattern', got '{variant_raw}'"));

    let timeout_secs: u64 = std::env::var("MARKER_TOOL_TIMEOUT_SECS")
        .unwrap_or_else(|_| "300".into())
        .parse()
        .expect("MARKER_TOOL_TIMEOUT_SECS must be a valid u64");

    MarkerToolConfig {
        program,
        args,
        variant,
        timeout: Duration::from_secs(timeout_secs),
    }
}
