//! Storage for listing images.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};

/// URL prefix under which saved images are served
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Persists an uploaded image and returns the URI it will be served from.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn save(&self, original_filename: &str, bytes: &[u8]) -> ProductResult<String>;
}

/// Writes images to a local directory as `<uuid>.<ext>`.
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    dir: PathBuf,
}

impl LocalImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Lowercased extension of the client's filename, if it looks like one
fn extension(original_filename: &str) -> Option<String> {
    Path::new(original_filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
}

fn stored_name(original_filename: &str) -> String {
    let id = Uuid::new_v4();
    match extension(original_filename) {
        Some(ext) => format!("{id}.{ext}"),
        None => id.to_string(),
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn save(&self, original_filename: &str, bytes: &[u8]) -> ProductResult<String> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ProductError::Image(format!("Failed to create {}: {}", self.dir.display(), e)))?;

        let name = stored_name(original_filename);
        let path = self.dir.join(&name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| ProductError::Image(format!("Failed to write {}: {}", path.display(), e)))?;

        tracing::debug!(path = %path.display(), size = bytes.len(), "Saved product image");
        Ok(format!("{PUBLIC_PREFIX}/{name}"))
    }
}
