//! Publish rules and artifact naming.
//!
//! Publishing is a one-way transition. Before the flag flips, the aggregate
//! size of every asset bound to the experience is checked against
//! [`MAX_PUBLISH_BYTES`]. Artifacts are written to fixed, id-keyed names under
//! the media root.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::DbId;

/// Upper bound on the summed size of bound assets (50 MiB).
pub const MAX_PUBLISH_BYTES: i64 = 50 * 1024 * 1024;

/// File name of the static viewer snapshot for an experience.
pub fn viewer_filename(experience_id: DbId) -> String {
    format!("viewer_{experience_id}.html")
}

/// File name of the QR code image for an experience.
pub fn qr_filename(experience_id: DbId) -> String {
    format!("qr_exp_{experience_id}.png")
}

/// Absolute URL of the live public viewer route.
pub fn public_viewer_url(public_base_url: &str, experience_id: DbId) -> String {
    format!(
        "{}/viewer/{experience_id}",
        public_base_url.trim_end_matches('/')
    )
}

/// URL of a file under the media root, given the configured media prefix.
pub fn media_url(media_url_prefix: &str, relative: &str) -> String {
    let prefix = media_url_prefix.trim_end_matches('/');
    format!("{prefix}/{}", relative.trim_start_matches('/'))
}

/// Reject publishing when bound assets exceed [`MAX_PUBLISH_BYTES`].
pub fn check_content_size(total_bytes: i64) -> Result<(), CoreError> {
    if total_bytes > MAX_PUBLISH_BYTES {
        return Err(CoreError::Validation(format!(
            "Content too large: bound assets total {total_bytes} bytes, limit is {MAX_PUBLISH_BYTES} bytes"
        )));
    }
    Ok(())
}

/// Outcome of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishResult {
    pub experience_id: DbId,
    /// Media URL of the static viewer snapshot.
    pub viewer_url: String,
    /// Media URL of the QR code image.
    pub qr_url: String,
    /// Absolute URL encoded in the QR code.
    pub public_url: String,
}

impl PublishResult {
    pub fn new(experience_id: DbId, media_url_prefix: &str, public_base_url: &str) -> Self {
        Self {
            experience_id,
            viewer_url: media_url(media_url_prefix, &viewer_filename(experience_id)),
            qr_url: media_url(media_url_prefix, &qr_filename(experience_id)),
            public_url: public_viewer_url(public_base_url, experience_id),
        }
    }
}
