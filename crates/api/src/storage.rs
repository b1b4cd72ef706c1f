//! Recipe image storage.
//!
//! Handlers only see the [`ImageStore`] trait. The default implementation
//! writes files under a local media root which the router serves at
//! `/media`.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use foodgram_core::image::DecodedImage;

/// URL prefix the media root is served under.
pub const MEDIA_URL_PREFIX: &str = "/media";

/// Sub-directory of the media root holding recipe images.
const RECIPE_IMAGE_DIR: &str = "recipes";

/// Errors from the image store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid stored path: {0}")]
    InvalidPath(String),
}

/// Where recipe images live.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist an image and return its stored path.
    async fn save(&self, image: &DecodedImage) -> Result<String, StorageError>;

    /// Remove a previously stored image. Missing files are not an error.
    async fn delete(&self, path: &str) -> Result<(), StorageError>;

    /// Public URL for a stored path.
    fn url(&self, path: &str) -> String;
}

/// Image store on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    root: PathBuf,
    public_base: String,
}

impl LocalImageStore {
    /// Store files under `root`, publishing them below `public_base`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, public_base: &str) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.trim_end_matches('/').to_owned(),
        }
    }

    /// The media root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path);
        if path.is_empty()
            || !relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::InvalidPath(path.to_owned()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn save(&self, image: &DecodedImage) -> Result<String, StorageError> {
        let path = format!("{RECIPE_IMAGE_DIR}/{}.{}", Uuid::new_v4(), image.extension);
        let full = self.resolve(&path)?;

        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, &image.bytes).await?;

        tracing::debug!(path = %path, bytes = image.bytes.len(), "image stored");
        Ok(path)
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let full = self.resolve(path)?;
        match tokio::fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{MEDIA_URL_PREFIX}/{path}", self.public_base)
    }
}
