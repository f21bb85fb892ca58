//! Per-run memoization of index lookups

use super::{Release, VersionSource};
use crate::domain::normalize_name;
use crate::error::RegistryError;
use std::collections::HashMap;
use std::sync::Arc;

/// Lookup results keyed by normalized package name
///
/// Failures are cached too, so a package listed in several groups is queried
/// once per run whatever the outcome.
#[derive(Default)]
pub struct ReleaseCache {
    entries: HashMap<String, Result<Arc<Vec<Release>>, RegistryError>>,
    connectivity_failures: usize,
}

impl ReleaseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Releases of `package`, fetching them on first use
    pub async fn releases(
        &mut self,
        source: &dyn VersionSource,
        package: &str,
    ) -> Result<Arc<Vec<Release>>, RegistryError> {
        let key = normalize_name(package);
        if let Some(hit) = self.entries.get(&key) {
            log::debug!("cache hit for {}", key);
            return hit.clone();
        }

        log::debug!("looking up {} on {}", key, source.registry_name());
        let fetched = source.fetch_releases(&key).await.map(Arc::new);
        match &fetched {
            Ok(releases) => log::debug!("{}: {} releases", key, releases.len()),
            Err(e) => {
                log::warn!("{}", e);
                if e.is_connectivity() {
                    self.connectivity_failures += 1;
                }
            }
        }
        self.entries.insert(key, fetched.clone());
        fetched
    }

    /// Number of distinct packages looked up
    pub fn lookups(&self) -> usize {
        self.entries.len()
    }

    /// Number of lookups that could not reach the index
    pub fn connectivity_failures(&self) -> usize {
        self.connectivity_failures
    }

    /// True when lookups were attempted and none reached the index
    pub fn index_unreachable(&self) -> bool {
        self.lookups() > 0 && self.connectivity_failures == self.lookups()
    }
}
