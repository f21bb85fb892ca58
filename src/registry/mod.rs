//! Package index access
//!
//! This module provides:
//! - HTTP client shared foundation with retry logic
//! - PyPI JSON API adapter
//! - Per-run memoization of lookups

mod cache;
mod client;
mod pypi;

pub use cache::ReleaseCache;
pub use client::HttpClient;
pub use pypi::{PyPIAdapter, PYPI_API_URL};

use crate::domain::{Version, VersionConstraint};
use crate::error::RegistryError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A release published on the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Release {
    pub version: Version,
    /// Earliest upload time of the release files
    pub released_at: Option<DateTime<Utc>>,
    /// `Requires-Python` metadata
    pub requires_python: Option<String>,
    /// True when every file of the release is yanked
    pub yanked: bool,
}

impl Release {
    /// Creates a non-yanked release without metadata
    pub fn new(version: Version) -> Self {
        Self {
            version,
            released_at: None,
            requires_python: None,
            yanked: false,
        }
    }

    /// Sets Requires-Python (builder pattern)
    pub fn with_requires_python(mut self, requires_python: impl Into<String>) -> Self {
        self.requires_python = Some(requires_python.into());
        self
    }

    /// Marks the release as yanked (builder pattern)
    pub fn yanked(mut self) -> Self {
        self.yanked = true;
        self
    }

    /// True if the release can be installed on `python`
    ///
    /// Missing or unparseable metadata counts as compatible.
    pub fn supports_python(&self, python: &Version) -> bool {
        match self.requires_python.as_deref() {
            None => true,
            Some(text) => match text.parse::<VersionConstraint>() {
                Ok(constraint) => constraint.contains(python),
                Err(_) => {
                    log::debug!(
                        "ignoring unparseable requires-python '{}' of {}",
                        text,
                        self.version
                    );
                    true
                }
            },
        }
    }
}

/// Source of release lists
#[async_trait]
pub trait VersionSource: Send + Sync {
    /// Name shown in error messages
    fn registry_name(&self) -> &str;

    /// Fetch every release of a package, sorted ascending by version
    async fn fetch_releases(&self, package: &str) -> Result<Vec<Release>, RegistryError>;
}
