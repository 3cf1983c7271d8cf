//! Local media storage.
//!
//! Every uploaded file, generated marker descriptor, viewer snapshot and QR
//! image lives under a single media root. Paths persisted in the database are
//! relative to that root and always use `/` separators.

use std::path::{Component, Path, PathBuf};

/// Sub-directory for uploaded target images (and their marker descriptors).
pub const TARGETS_DIR: &str = "targets";

/// Sub-directory for uploaded assets.
pub const ASSETS_DIR: &str = "assets";

/// Error type for media storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid storage path: {0}")]
    InvalidPath(String),
}

/// Filesystem-backed media root.
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a stored relative path to an absolute location under the root.
    ///
    /// Rejects absolute paths and `..` components.
    pub fn absolute(&self, relative: &str) -> Result<PathBuf, StorageError> {
        let rel = Path::new(relative);
        let safe = rel
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if relative.is_empty() || !safe {
            return Err(StorageError::InvalidPath(relative.to_string()));
        }
        Ok(self.root.join(rel))
    }

    /// Express an absolute path under the root as a stored relative path.
    pub fn relative(&self, absolute: &Path) -> Result<String, StorageError> {
        let rel = absolute
            .strip_prefix(&self.root)
            .map_err(|_| StorageError::InvalidPath(absolute.to_string_lossy().into_owned()))?;
        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Ok(parts.join("/"))
    }

    /// Persist an uploaded file under `subdir`, returning its relative path.
    ///
    /// The original filename is sanitized. If any file in `subdir` already
    /// uses the stem, whatever its extension, an 8-character random suffix is
    /// appended to the stem. Marker descriptors are named after the image
    /// stem, so two targets never share one.
    pub async fn save_upload(
        &self,
        subdir: &str,
        original_filename: &str,
        data: &[u8],
    ) -> Result<String, StorageError> {
        let dir = self.absolute(subdir)?;
        tokio::fs::create_dir_all(&dir).await?;

        let (stem, ext) = sanitize_filename(original_filename);
        let mut filename = join_stem_ext(&stem, ext.as_deref());
        if stem_in_use(&dir, &stem).await? {
            let suffix = uuid::Uuid::new_v4().simple().to_string();
            filename = join_stem_ext(&format!("{stem}_{}", &suffix[..8]), ext.as_deref());
        }

        tokio::fs::write(dir.join(&filename), data).await?;
        tracing::debug!(subdir, filename = %filename, bytes = data.len(), "Stored upload");
        Ok(format!("{subdir}/{filename}"))
    }

    /// Write a generated artifact directly under the media root.
    pub async fn write_artifact(&self, name: &str, data: &[u8]) -> Result<PathBuf, StorageError> {
        let path = self.absolute(name)?;
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&path, data).await?;
        Ok(path)
    }

    /// Size in bytes of a stored file.
    pub async fn file_size(&self, relative: &str) -> Result<u64, StorageError> {
        let meta = tokio::fs::metadata(self.absolute(relative)?).await?;
        Ok(meta.len())
    }

    /// Remove a stored file. A file that is already gone is not an error.
    pub async fn remove(&self, relative: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.absolute(relative)?).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Whether any entry of `dir` has the file stem `stem`.
async fn stem_in_use(dir: &Path, stem: &str) -> Result<bool, StorageError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        if Path::new(&name).file_stem().is_some_and(|s| s == stem) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Lowercase file extension of `filename`, if any.
pub fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
}

/// Split a client-supplied filename into a safe stem and lowercase extension.
fn sanitize_filename(filename: &str) -> (String, Option<String>) {
    // Drop any client-side directory components.
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let path = Path::new(base);

    let stem: String = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = stem.trim_matches('_').to_string();
    let stem = if stem.is_empty() { "upload".to_string() } else { stem };

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()));

    (stem, ext)
}

fn join_stem_ext(stem: &str, ext: Option<&str>) -> String {
    match ext {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn sanitize_strips_directories_and_odd_characters() {
        assert_eq!(
            sanitize_filename("../../etc/My Logo!.PNG"),
            ("My_Logo".to_string(), Some("png".to_string()))
        );
        assert_eq!(
            sanitize_filename("C:\\Users\\me\\photo.jpeg"),
            ("photo".to_string(), Some("jpeg".to_string()))
        );
    }

    #[test]
    fn sanitize_falls_back_for_empty_stem() {
        assert_eq!(sanitize_filename("???"), ("upload".to_string(), None));
    }

    #[test]
    fn absolute_rejects_traversal() {
        let storage = MediaStorage::new("/srv/media");
        assert_matches!(storage.absolute("../secret"), Err(StorageError::InvalidPath(_)));
        assert_matches!(storage.absolute("/etc/passwd"), Err(StorageError::InvalidPath(_)));
        assert_eq!(
            storage.absolute("targets/a.png").unwrap(),
            PathBuf::from("/srv/media/targets/a.png")
        );
    }

    #[tokio::test]
    async fn save_upload_deduplicates_names() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MediaStorage::new(dir.path());

        let first = storage.save_upload(TARGETS_DIR, "logo.png", b"one").await.unwrap();
        let second = storage.save_upload(TARGETS_DIR, "logo.png", b"two").await.unwrap();

        assert_eq!(first, "targets/logo.png");
        assert_ne!(first, second);
        assert!(second.starts_with("targets/logo_"));
        assert!(second.ends_with(".png"));
        assert_eq!(storage.file_size(&second).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn save_upload_deduplicates_stems_across_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MediaStorage::new(dir.path());

        let png = storage.save_upload(TARGETS_DIR, "logo.png", b"one").await.unwrap();
        let jpg = storage.save_upload(TARGETS_DIR, "logo.jpg", b"two").await.unwrap();

        assert_eq!(png, "targets/logo.png");
        assert!(jpg.starts_with("targets/logo_"));
        assert!(jpg.ends_with(".jpg"));
    }

    #[tokio::test]
    async fn save_upload_treats_descriptor_files_as_taken_stems() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MediaStorage::new(dir.path());
        std::fs::create_dir_all(dir.path().join(TARGETS_DIR)).unwrap();
        std::fs::write(dir.path().join("targets/poster.fset"), b"").unwrap();

        let saved = storage.save_upload(TARGETS_DIR, "poster.png", b"img").await.unwrap();
        assert_ne!(saved, "targets/poster.png");
    }

    #[tokio::test]
    async fn relative_round_trips_absolute() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MediaStorage::new(dir.path());
        let rel = storage.save_upload(ASSETS_DIR, "clip.mp4", b"x").await.unwrap();
        let abs = storage.absolute(&rel).unwrap();
        assert_eq!(storage.relative(&abs).unwrap(), rel);
    }

    #[tokio::test]
    async fn remove_missing_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MediaStorage::new(dir.path());
        assert!(storage.remove("assets/nope.bin").await.is_ok());
    }
}
