//! # Output Sinks
//!
//! Where finished images go. The session hands each encoded image to an
//! [`OutputSink`] together with its file name and the shared output
//! subdirectory, and records the returned path in the batch report.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::{MergeError, MergeResult};

/// Suffix appended to the source folder name to form the output directory.
pub const MERGED_SUFFIX: &str = "_merged";

/// One encoded merge result, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeResult {
    pub bytes: Vec<u8>,
    /// File name, e.g. `A.jpg`.
    pub filename: String,
    /// Directory below the sink's root, e.g. `Photos_merged`.
    pub subdirectory: String,
}

/// Output directory name for images merged from `source_folder_name`.
///
/// An existing `_merged` suffix is stripped first, so re-running on an output
/// folder does not stack suffixes.
pub fn output_subdirectory(source_folder_name: &str) -> String {
    let base = source_folder_name
        .strip_suffix(MERGED_SUFFIX)
        .unwrap_or(source_folder_name);
    format!("{}{}", base, MERGED_SUFFIX)
}

/// Abstract destination for finished images.
#[async_trait]
pub trait OutputSink: Send + Sync {
    /// Persist `artifact` and return where it ended up.
    async fn write(&self, artifact: &CompositeResult) -> MergeResult<PathBuf>;
}

/// Writes images below a root directory, creating subdirectories as needed.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl OutputSink for DirectorySink {
    async fn write(&self, artifact: &CompositeResult) -> MergeResult<PathBuf> {
        let dir = if artifact.subdirectory.is_empty() {
            self.root.clone()
        } else {
            self.root.join(&artifact.subdirectory)
        };
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| MergeError::output_sink(&dir, e))?;
        let path = dir.join(&artifact.filename);
        tokio::fs::write(&path, &artifact.bytes)
            .await
            .map_err(|e| MergeError::output_sink(&path, e))?;
        debug!(path = %path.display(), bytes = artifact.bytes.len(), "wrote merged image");
        Ok(path)
    }
}

/// Save one encoded image to an explicit path, creating parent directories.
pub async fn write_single(path: &Path, bytes: &[u8]) -> MergeResult<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| MergeError::output_sink(parent, e))?;
    }
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| MergeError::output_sink(path, e))?;
    Ok(path.to_path_buf())
}
