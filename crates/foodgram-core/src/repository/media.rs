//! Uploaded media storage.

use async_trait::async_trait;

use crate::error::DomainError;

/// Storage for uploaded recipe images.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Stores `bytes` under a fresh name with the given extension and returns
    /// the path relative to the media root.
    async fn save_image(&self, bytes: &[u8], extension: &str) -> Result<String, DomainError>;

    /// Deletes a stored image. Missing files are not an error.
    async fn delete_image(&self, path: &str) -> Result<(), DomainError>;

    /// Absolute URL under which a stored image is served.
    fn public_url(&self, path: &str) -> String;
}
