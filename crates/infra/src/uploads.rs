//! Local-disk storage for uploaded images.
//!
//! Files are written under `<root>/<folder>/<uuid>.<ext>` and referenced by
//! their root-relative, forward-slash path (e.g. `products/3f2c....png`), which
//! is also the path they are served under.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Accepted content for one upload slot.
#[derive(Debug, Clone, Copy)]
pub struct ImageRules {
    pub folder: &'static str,
    pub max_bytes: usize,
    pub allowed_types: &'static [&'static str],
}

/// Product cover images: JPEG, PNG or WebP up to 5 MiB.
pub const PRODUCT_IMAGES: ImageRules = ImageRules {
    folder: "products",
    max_bytes: 5 * 1024 * 1024,
    allowed_types: &["image/jpeg", "image/png", "image/webp"],
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("invalid file type: {0}")]
    InvalidFileType(String),

    #[error("file exceeds the {limit} byte limit")]
    FileTooLarge { limit: usize },

    #[error("failed to write upload: {0}")]
    Io(#[from] std::io::Error),
}

impl ImageRules {
    /// Reject files the slot does not accept, without touching disk.
    pub fn check(&self, file: &UploadedFile) -> Result<(), UploadError> {
        let content_type = file.content_type.to_ascii_lowercase();
        if !self.allowed_types.contains(&content_type.as_str()) {
            return Err(UploadError::InvalidFileType(file.content_type.clone()));
        }
        if file.bytes.len() > self.max_bytes {
            return Err(UploadError::FileTooLarge {
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ImageStorage {
    root: PathBuf,
}

impl ImageStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Validate and persist `file`, returning its public path.
    #[instrument(skip(self, file), fields(folder = rules.folder, size = file.bytes.len()), err)]
    pub async fn store(
        &self,
        rules: &ImageRules,
        file: UploadedFile,
    ) -> Result<String, UploadError> {
        rules.check(&file)?;

        let dir = self.root.join(rules.folder);
        tokio::fs::create_dir_all(&dir).await?;

        let stored_name = match extension(&file.file_name) {
            Some(ext) => format!("{}.{ext}", Uuid::new_v4()),
            None => Uuid::new_v4().to_string(),
        };
        let path = dir.join(&stored_name);
        tokio::fs::write(&path, &file.bytes).await?;

        let public = self.to_public_path(&path);
        debug!(path = %public, "stored upload");
        Ok(public)
    }

    /// Root-relative, forward-slash form of a path under the storage root.
    pub fn to_public_path(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .to_string_lossy()
            .replace('\\', "/")
            .trim_start_matches('/')
            .to_string()
    }
}

fn extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, content_type: &str, len: usize) -> UploadedFile {
        UploadedFile {
            file_name: name.into(),
            content_type: content_type.into(),
            bytes: vec![0xAB; len],
        }
    }

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("rigshop-uploads-{}", Uuid::new_v4()))
    }

    #[test]
    fn rules_reject_wrong_type_and_oversize() {
        assert!(PRODUCT_IMAGES.check(&file("a.png", "image/png", 10)).is_ok());
        assert!(PRODUCT_IMAGES.check(&file("a.JPG", "IMAGE/JPEG", 10)).is_ok());
        assert!(matches!(
            PRODUCT_IMAGES.check(&file("a.gif", "image/gif", 10)),
            Err(UploadError::InvalidFileType(_))
        ));
        assert!(matches!(
            PRODUCT_IMAGES.check(&file("a.png", "image/png", PRODUCT_IMAGES.max_bytes + 1)),
            Err(UploadError::FileTooLarge { .. })
        ));
        assert!(PRODUCT_IMAGES
            .check(&file("a.png", "image/png", PRODUCT_IMAGES.max_bytes))
            .is_ok());
    }

    #[test]
    fn extension_is_lowercased_and_sanitised() {
        assert_eq!(extension("Photo.PNG").as_deref(), Some("png"));
        assert_eq!(extension("noext"), None);
        assert_eq!(extension("weird.p/g"), None);
    }

    #[tokio::test]
    async fn store_writes_under_folder_and_returns_relative_path() {
        let root = scratch_dir();
        let storage = ImageStorage::new(&root);

        let public = storage
            .store(&PRODUCT_IMAGES, file("cover.WebP", "image/webp", 64))
            .await
            .unwrap();

        assert!(public.starts_with("products/"));
        assert!(public.ends_with(".webp"));
        let on_disk = tokio::fs::read(root.join(&public)).await.unwrap();
        assert_eq!(on_disk.len(), 64);

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }

    #[tokio::test]
    async fn rejected_file_is_not_written() {
        let root = scratch_dir();
        let storage = ImageStorage::new(&root);

        let err = storage
            .store(&PRODUCT_IMAGES, file("x.exe", "application/octet-stream", 8))
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::InvalidFileType(_)));
        assert!(!root.exists());
    }

    #[test]
    fn public_path_uses_forward_slashes() {
        let storage = ImageStorage::new("/srv/uploads");
        let p = Path::new("/srv/uploads/products/abc.png");
        assert_eq!(storage.to_public_path(p), "products/abc.png");
    }
}
