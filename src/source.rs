//! # Input Sources
//!
//! Collects the flat `(name, bytes)` list a merge starts from, either from a
//! directory (non-recursive, image extensions only) or from an explicit list
//! of files. Each batch also records the name of the folder it came from,
//! which names the output directory.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{MergeError, MergeResult};
use crate::grouping::{is_image_extension, RawImage};

/// Folder name used when picked files do not share one parent directory.
pub const MIXED_SOURCE_NAME: &str = "selection";

/// Images read from one source plus where they came from.
#[derive(Debug, Clone, Default)]
pub struct InputBatch {
    pub items: Vec<RawImage>,
    pub source_folder_name: String,
    /// The directory the images came from, when there is exactly one.
    pub origin: Option<PathBuf>,
}

fn absolute(path: &Path) -> MergeResult<PathBuf> {
    std::path::absolute(path).map_err(|e| MergeError::input(path, e))
}

fn folder_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| MIXED_SOURCE_NAME.to_string())
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(is_image_extension)
}

/// Read every JPEG/PNG file directly inside `dir`, sorted by file name.
pub async fn read_images_in_dir(dir: &Path) -> MergeResult<InputBatch> {
    let dir = absolute(dir)?;
    let mut entries = tokio::fs::read_dir(&dir)
        .await
        .map_err(|e| MergeError::input(&dir, e))?;

    let mut paths = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| MergeError::input(&dir, e))?
    {
        let path = entry.path();
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| MergeError::input(&path, e))?;
        if file_type.is_file() && has_image_extension(&path) {
            paths.push(path);
        }
    }
    paths.sort();

    let mut items = Vec::with_capacity(paths.len());
    for path in &paths {
        items.push(read_one(path).await?);
    }
    debug!(dir = %dir.display(), files = items.len(), "read image directory");

    Ok(InputBatch {
        items,
        source_folder_name: folder_name(&dir),
        origin: Some(dir),
    })
}

/// Read an explicit list of files in the given order.
///
/// Files without an image extension are skipped with a warning.
pub async fn read_image_files(paths: &[PathBuf]) -> MergeResult<InputBatch> {
    let mut items = Vec::with_capacity(paths.len());
    let mut parents = BTreeSet::new();
    for path in paths {
        if !has_image_extension(path) {
            warn!(path = %path.display(), "skipping file without a jpg/jpeg/png extension");
            continue;
        }
        let path = absolute(path)?;
        if let Some(parent) = path.parent() {
            parents.insert(parent.to_path_buf());
        }
        items.push(read_one(&path).await?);
    }

    let origin = if parents.len() == 1 {
        parents.into_iter().next()
    } else {
        None
    };
    let source_folder_name = origin
        .as_deref()
        .map(folder_name)
        .unwrap_or_else(|| MIXED_SOURCE_NAME.to_string());

    Ok(InputBatch {
        items,
        source_folder_name,
        origin,
    })
}

async fn read_one(path: &Path) -> MergeResult<RawImage> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| MergeError::input(path, e))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(RawImage { name, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_only_images_non_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("Photos");
        std::fs::create_dir_all(root.join("nested")).unwrap();
        std::fs::write(root.join("B1.PNG"), b"b").unwrap();
        std::fs::write(root.join("A1.jpg"), b"a").unwrap();
        std::fs::write(root.join("notes.txt"), b"n").unwrap();
        std::fs::write(root.join("nested").join("A2.jpg"), b"x").unwrap();

        let batch = read_images_in_dir(&root).await.unwrap();
        let names: Vec<&str> = batch.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["A1.jpg", "B1.PNG"]);
        assert_eq!(batch.source_folder_name, "Photos");
        assert_eq!(batch.items[0].bytes, b"a");
    }

    #[tokio::test]
    async fn test_missing_dir_is_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_images_in_dir(&dir.path().join("absent")).await.unwrap_err();
        assert_eq!(err.category(), "input");
    }

    #[tokio::test]
    async fn test_picked_files_name_their_folder() {
        let dir = tempfile::tempdir().unwrap();
        let one = dir.path().join("Trip");
        let two = dir.path().join("Other");
        std::fs::create_dir_all(&one).unwrap();
        std::fs::create_dir_all(&two).unwrap();
        std::fs::write(one.join("A1.jpg"), b"1").unwrap();
        std::fs::write(one.join("A2.jpg"), b"2").unwrap();
        std::fs::write(two.join("A3.jpg"), b"3").unwrap();
        std::fs::write(one.join("readme.md"), b"r").unwrap();

        let same = read_image_files(&[one.join("A2.jpg"), one.join("A1.jpg"), one.join("readme.md")])
            .await
            .unwrap();
        assert_eq!(same.source_folder_name, "Trip");
        assert_eq!(same.items.len(), 2);
        assert_eq!(same.items[0].name, "A2.jpg");

        let mixed = read_image_files(&[one.join("A1.jpg"), two.join("A3.jpg")])
            .await
            .unwrap();
        assert_eq!(mixed.source_folder_name, MIXED_SOURCE_NAME);
        assert!(mixed.origin.is_none());
    }
}
