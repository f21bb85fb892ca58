//! Manifest loading and rewriting
//!
//! This module provides functionality to:
//! - Load a pyproject.toml with its layout preserved
//! - List the dependency arrays and their elements
//! - Replace individual elements in place
//! - Write the result back atomically

mod pyproject_toml;
mod writer;

pub use pyproject_toml::{ManifestEntry, PyprojectDocument};
pub use writer::{write_manifest, ManifestWriter, WriteResult};

/// Default manifest file name
pub const DEFAULT_MANIFEST: &str = "pyproject.toml";
