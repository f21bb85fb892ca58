//! PyPI JSON API adapter
//!
//! Fetches release information from any index exposing the PyPI JSON API.
//! API endpoint: {index_url}/{normalized-name}/json

use crate::domain::{normalize_name, Version};
use crate::error::RegistryError;
use crate::registry::{HttpClient, Release, VersionSource};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

/// PyPI API base URL
pub const PYPI_API_URL: &str = "https://pypi.org/pypi";

/// PyPI adapter
pub struct PyPIAdapter {
    client: HttpClient,
    index_url: String,
}

/// PyPI package metadata response
#[derive(Debug, Deserialize)]
struct PyPIResponse {
    /// Release files keyed by version
    releases: HashMap<String, Vec<ReleaseFile>>,
}

/// Release file information
#[derive(Debug, Deserialize)]
struct ReleaseFile {
    upload_time_iso_8601: Option<String>,
    requires_python: Option<String>,
    #[serde(default)]
    yanked: bool,
}

impl PyPIAdapter {
    /// Create an adapter for pypi.org
    pub fn new(client: HttpClient) -> Self {
        Self::with_index_url(client, PYPI_API_URL)
    }

    /// Create an adapter for a PyPI-compatible mirror
    pub fn with_index_url(client: HttpClient, index_url: impl Into<String>) -> Self {
        let index_url = index_url.into().trim_end_matches('/').to_string();
        Self { client, index_url }
    }

    /// Build the URL for a package
    fn build_url(&self, package: &str) -> String {
        format!("{}/{}/json", self.index_url, normalize_name(package))
    }
}

/// Convert the `releases` map into an ascending list
fn collect_releases(releases: HashMap<String, Vec<ReleaseFile>>) -> Vec<Release> {
    let mut collected: Vec<Release> = releases
        .into_iter()
        .filter_map(|(text, files)| {
            if files.is_empty() {
                return None;
            }
            let version: Version = match text.parse() {
                Ok(v) => v,
                Err(_) => {
                    log::debug!("ignoring non PEP 440 version '{}'", text);
                    return None;
                }
            };

            let released_at = files
                .iter()
                .filter_map(|f| f.upload_time_iso_8601.as_deref())
                .filter_map(|t| t.parse::<DateTime<Utc>>().ok())
                .min();
            let requires_python = files
                .iter()
                .filter_map(|f| f.requires_python.as_deref())
                .map(str::trim)
                .find(|r| !r.is_empty())
                .map(str::to_string);
            let yanked = files.iter().all(|f| f.yanked);

            Some(Release {
                version,
                released_at,
                requires_python,
                yanked,
            })
        })
        .collect();

    collected.sort_by(|a, b| a.version.cmp(&b.version));
    collected
}

#[async_trait]
impl VersionSource for PyPIAdapter {
    fn registry_name(&self) -> &str {
        &self.index_url
    }

    async fn fetch_releases(&self, package: &str) -> Result<Vec<Release>, RegistryError> {
        let url = self.build_url(package);
        log::debug!("GET {}", url);
        let response: PyPIResponse = self
            .client
            .get_json(&url, package, self.registry_name())
            .await?;

        Ok(collect_releases(response.releases))
    }
}
