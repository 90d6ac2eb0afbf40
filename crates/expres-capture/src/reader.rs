//! Filesystem-backed asset reader.

use std::path::{Path, PathBuf};

use crate::ports::AssetReader;

/// Reads assets whose handle is a local path or a `file://` URI.
///
/// Relative paths are resolved against `root` when one is configured.
#[derive(Debug, Clone, Default)]
pub struct FsAssetReader {
    root: Option<PathBuf>,
}

impl FsAssetReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// Resolve a content handle to a filesystem path.
    pub fn resolve(&self, content_handle: &str) -> PathBuf {
        let raw = content_handle
            .strip_prefix("file://")
            .unwrap_or(content_handle);
        let path = Path::new(raw);
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl AssetReader for FsAssetReader {
    async fn read(&self, content_handle: &str) -> std::io::Result<Vec<u8>> {
        let path = self.resolve(content_handle);
        let bytes = tokio::fs::read(&path).await?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Asset read");
        Ok(bytes)
    }
}
