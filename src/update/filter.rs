//! Include/exclude filtering on normalized package names
//!
//! Patterns match at the start of the name, so `foo` selects `foo` and
//! `foo-bar` but not `types-foo`.

use crate::error::ConfigError;
use regex::Regex;

/// Name filter built from --include / --exclude
#[derive(Debug, Clone, Default)]
pub struct UpdateFilter {
    /// Only names matching this pattern are processed
    pub include: Option<Regex>,
    /// Names matching this pattern are skipped
    pub exclude: Option<Regex>,
}

impl UpdateFilter {
    /// Create a filter that accepts every name
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile an include pattern (builder pattern)
    pub fn with_include(mut self, pattern: &str) -> Result<Self, ConfigError> {
        self.include = Some(compile("include", pattern)?);
        Ok(self)
    }

    /// Compile an exclude pattern (builder pattern)
    pub fn with_exclude(mut self, pattern: &str) -> Result<Self, ConfigError> {
        self.exclude = Some(compile("exclude", pattern)?);
        Ok(self)
    }

    /// Check if a normalized name passes both patterns
    pub fn should_process_package(&self, normalized_name: &str) -> bool {
        if let Some(include) = &self.include {
            if !include.is_match(normalized_name) {
                return false;
            }
        }
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(normalized_name) {
                return false;
            }
        }
        true
    }
}

fn compile(option: &'static str, pattern: &str) -> Result<Regex, ConfigError> {
    let invalid = |e: regex::Error| ConfigError::invalid_regex(option, pattern, e.to_string());
    // Validate alone first so a stray `)` cannot escape the anchor group
    Regex::new(pattern).map_err(invalid)?;
    Regex::new(&format!("^(?:{})", pattern)).map_err(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_filter_accepts_everything() {
        let filter = UpdateFilter::new();
        assert!(filter.include.is_none());
        assert!(filter.exclude.is_none());
        assert!(filter.should_process_package("anything"));
    }

    #[test]
    fn test_include() {
        let filter = UpdateFilter::new().with_include("^foo").unwrap();
        assert!(filter.should_process_package("foo"));
        assert!(filter.should_process_package("foo-bar"));
        assert!(!filter.should_process_package("bar"));
        assert!(!filter.should_process_package("barfoo"));
    }

    #[test]
    fn test_exclude() {
        let filter = UpdateFilter::new().with_exclude("req.*").unwrap();
        assert!(!filter.should_process_package("requests"));
        assert!(filter.should_process_package("packaging"));
    }

    #[test]
    fn test_patterns_match_from_name_start() {
        let filter = UpdateFilter::new().with_exclude("foo").unwrap();
        assert!(!filter.should_process_package("foo"));
        assert!(!filter.should_process_package("foo-bar"));
        assert!(filter.should_process_package("barfoo"));
        assert!(filter.should_process_package("types-foo"));

        let filter = UpdateFilter::new().with_include("req").unwrap();
        assert!(filter.should_process_package("requests"));
        assert!(!filter.should_process_package("pyreq"));

        let filter = UpdateFilter::new().with_include(".*-stubs$").unwrap();
        assert!(filter.should_process_package("types-stubs"));
        assert!(!filter.should_process_package("stubs-tool"));
    }

    #[test]
    fn test_alternation_stays_anchored() {
        let filter = UpdateFilter::new().with_include("django|celery").unwrap();
        assert!(filter.should_process_package("django"));
        assert!(filter.should_process_package("celery"));
        assert!(!filter.should_process_package("flask-celery"));
    }

    #[test]
    fn test_include_and_exclude() {
        let filter = UpdateFilter::new()
            .with_include("^py")
            .unwrap()
            .with_exclude(".*test")
            .unwrap();
        assert!(filter.should_process_package("pyyaml"));
        assert!(!filter.should_process_package("pytest"));
        assert!(!filter.should_process_package("requests"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = UpdateFilter::new().with_include("foo(").unwrap_err();
        let msg = format!("{}", err);
        assert!(msg.contains("invalid include pattern"));
        assert!(msg.contains("foo("));
    }
}
