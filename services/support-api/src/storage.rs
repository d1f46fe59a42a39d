//! On-disk storage for ticket photos
//!
//! Files are laid out as `<root>/<ticket_id>/<file_id><extension>`, where
//! `file_id` is a random UUID and the extension is taken from the uploaded
//! file name.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

/// A file written by [`PhotoStorage::save`]
#[derive(Debug, Clone)]
pub struct StoredPhoto {
    pub file_id: String,
    pub file_path: String,
}

/// Photo file store rooted at the uploads directory
#[derive(Debug, Clone)]
pub struct PhotoStorage {
    root: PathBuf,
}

impl PhotoStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the uploads directory if needed
    pub async fn init(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| {
                format!("Failed to create uploads directory {}", self.root.display())
            })
    }

    /// Write `bytes` under the ticket's directory with a fresh opaque name
    pub async fn save(
        &self,
        ticket_id: i32,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<StoredPhoto> {
        let dir = self.root.join(ticket_id.to_string());
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;

        let file_id = Uuid::new_v4().to_string();
        let file_name = match extension_of(original_name) {
            Some(ext) => format!("{}.{}", file_id, ext),
            None => file_id.clone(),
        };
        let path = dir.join(file_name);

        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write photo {}", path.display()))?;

        info!(ticket_id, file_id = %file_id, size = bytes.len(), "Stored ticket photo");

        Ok(StoredPhoto {
            file_id,
            file_path: path.to_string_lossy().into_owned(),
        })
    }

    /// Remove a stored file. Failures are logged and otherwise ignored; a file
    /// that is already gone is not an error.
    pub async fn remove(&self, file_path: &str) {
        match tokio::fs::remove_file(file_path).await {
            Ok(()) => info!(file_path, "Removed photo file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(file_path, error = %e, "Failed to remove photo file"),
        }
    }
}

/// Extension of the uploaded file name, without the dot
fn extension_of(original_name: &str) -> Option<&str> {
    Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
}
