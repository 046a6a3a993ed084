//! In-memory `ImageStore` for tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use foodgram_core::error::DomainError;
use foodgram_core::repository::ImageStore;

/// Image store that keeps uploads in a map and serves them from
/// `http://testserver/media/`.
#[derive(Debug, Default)]
pub struct InMemoryImageStore {
    files: Mutex<BTreeMap<String, Vec<u8>>>,
    counter: Mutex<u64>,
}

impl InMemoryImageStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths of all stored images.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn stored_paths(&self) -> Vec<String> {
        self.files.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn save_image(&self, bytes: &[u8], extension: &str) -> Result<String, DomainError> {
        let mut counter = self.counter.lock().unwrap();
        *counter += 1;
        let path = format!("recipes/{}.{extension}", *counter);
        self.files
            .lock()
            .unwrap()
            .insert(path.clone(), bytes.to_vec());
        Ok(path)
    }

    async fn delete_image(&self, path: &str) -> Result<(), DomainError> {
        self.files.lock().unwrap().remove(path);
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("http://testserver/media/{path}")
    }
}
