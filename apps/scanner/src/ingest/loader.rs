//! Document Loader: lists resume files and reads each into a `RawDocument`.
//!
//! Listing problems (the input directory itself is unreadable) are fatal; anything
//! wrong with an individual file is a `DocumentError` that the batch reports and skips.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::errors::{AppError, DocumentError};
use crate::models::document::RawDocument;

/// Lists candidate resume files in `dir`, sorted by file name.
///
/// Creates the directory if it does not exist yet (an empty batch is not an error).
/// Hidden files and sub-directories are skipped.
pub fn list_resumes(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|source| AppError::InputDir {
            path: dir.to_path_buf(),
            source,
        })?;
        info!("Created missing input directory {}", dir.display());
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(dir).map_err(|source| AppError::InputDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| AppError::InputDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'));
        if hidden || path.is_dir() {
            debug!("Skipping {}", path.display());
            continue;
        }
        paths.push(path);
    }
    paths.sort();
    Ok(paths)
}

/// Reads one file. Unsupported formats are rejected here, before any parsing.
pub fn load_document(path: &Path) -> Result<RawDocument, DocumentError> {
    let content = std::fs::read(path).map_err(|e| DocumentError::Unreadable(e.to_string()))?;
    let doc = RawDocument::new(path.to_path_buf(), content);

    if doc.format() == crate::models::document::DocumentFormat::Unsupported {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("unknown")
            .to_string();
        return Err(DocumentError::UnsupportedFormat(ext));
    }
    Ok(doc)
}
