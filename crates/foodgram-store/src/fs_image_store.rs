//! Filesystem implementation of the `ImageStore` port.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use foodgram_core::error::DomainError;
use foodgram_core::repository::ImageStore;
use tracing::debug;
use uuid::Uuid;

/// Subdirectory of the media root that holds recipe images.
const RECIPE_DIR: &str = "recipes";

/// Stores images under a media root and serves them below
/// `<public_url>/media/`.
#[derive(Debug, Clone)]
pub struct FsImageStore {
    root: PathBuf,
    public_url: String,
}

impl FsImageStore {
    /// Creates a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, public_url: &str) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.trim_end_matches('/').to_owned(),
        }
    }

    /// The media root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a stored relative path, refusing anything that escapes the
    /// media root.
    fn resolve(&self, path: &str) -> Result<PathBuf, DomainError> {
        let relative = Path::new(path);
        let safe = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if !safe {
            return Err(DomainError::Infrastructure(format!(
                "refusing media path outside the media root: {path}"
            )));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn save_image(&self, bytes: &[u8], extension: &str) -> Result<String, DomainError> {
        let extension: String = extension
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect();
        let relative = format!("{RECIPE_DIR}/{}.{extension}", Uuid::new_v4());
        let target = self.resolve(&relative)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::Infrastructure(format!("failed to create media dir: {e}")))?;
        }
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|e| DomainError::Infrastructure(format!("failed to write image: {e}")))?;
        debug!(path = %relative, size = bytes.len(), "image stored");
        Ok(relative)
    }

    async fn delete_image(&self, path: &str) -> Result<(), DomainError> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::Infrastructure(format!(
                "failed to delete image: {e}"
            ))),
        }
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/media/{path}", self.public_url)
    }
}
