//! Manifest file writing
//!
//! This module provides:
//! - ManifestWriter for persisting a rewritten pyproject.toml
//! - Dry-run mode support (no actual file modifications)
//! - All-or-nothing writes through a sibling temp file

use super::PyprojectDocument;
use crate::error::ManifestError;
use std::fs;
use std::path::{Path, PathBuf};

/// Writer for manifest files
pub struct ManifestWriter {
    /// Whether to run in dry-run mode (no file modifications)
    dry_run: bool,
}

/// Result of writing a manifest file
#[derive(Debug, PartialEq, Eq)]
pub struct WriteResult {
    /// Path to the manifest file
    pub path: PathBuf,
    /// Whether the rendered document differs from what was read
    pub changed: bool,
    /// Whether the file was actually modified
    pub file_modified: bool,
}

impl ManifestWriter {
    /// Create a new ManifestWriter
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Write the document back to its path if it changed
    pub fn write(&self, document: &PyprojectDocument) -> Result<WriteResult, ManifestError> {
        let path = document.path().to_path_buf();
        let changed = document.is_modified();

        if !changed || self.dry_run {
            log::debug!(
                "not writing {} (changed: {}, dry-run: {})",
                path.display(),
                changed,
                self.dry_run
            );
            return Ok(WriteResult {
                path,
                changed,
                file_modified: false,
            });
        }

        write_manifest(&path, &document.render())?;
        log::info!("wrote {}", path.display());
        Ok(WriteResult {
            path,
            changed,
            file_modified: true,
        })
    }
}

/// Write content to a manifest file
///
/// The content goes to a temp file next to `path` which is then renamed over
/// it, so a failed write never leaves a truncated manifest behind.
pub fn write_manifest(path: &Path, content: &str) -> Result<(), ManifestError> {
    let tmp = temp_path(path);
    let result = fs::write(&tmp, content).and_then(|_| fs::rename(&tmp, path));
    if let Err(e) = result {
        let _ = fs::remove_file(&tmp);
        return Err(ManifestError::write_error(path, e));
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "pyproject.toml".to_string());
    path.with_file_name(format!(".{}.bumpdeps-tmp", name))
}
