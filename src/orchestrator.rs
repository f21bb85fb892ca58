//! Update orchestrator for coordinating the entire update workflow
//!
//! This module provides:
//! - Workflow coordination: load → select groups → parse → look up → judge → rewrite
//! - Per-run memoization of index lookups
//! - Dry-run mode support
//! - Error handling with per-entry continuation

use crate::config::{GroupSelection, RunConfig, ToolSettings};
use crate::domain::{
    DependencyGroup, EntryReport, GroupReport, RunReport, SkipReason, UpdateDecision,
};
use crate::error::{AppError, ConfigError, ParseError};
use crate::manifest::{ManifestEntry, ManifestWriter, PyprojectDocument, WriteResult};
use crate::parser::parse_entry;
use crate::progress::Progress;
use crate::registry::{HttpClient, PyPIAdapter, ReleaseCache, VersionSource};
use crate::update::{RuleEvaluator, UpdateJudge, VersionSelector};
use chrono::NaiveDate;

/// Orchestrator for coordinating the update workflow
pub struct Orchestrator {
    /// Resolved run configuration
    config: RunConfig,
    /// Where release lists come from
    source: Box<dyn VersionSource>,
    /// Fixed date for ignore-until checks (for testing)
    today: Option<NaiveDate>,
}

/// Result of running the orchestrator
#[derive(Debug)]
pub struct OrchestratorResult {
    /// Per-group, per-entry outcomes
    pub report: RunReport,
    /// What happened to the manifest file
    pub write_result: WriteResult,
    /// Number of distinct packages looked up
    pub lookups: usize,
}

impl Orchestrator {
    /// Create an orchestrator that queries the configured index over HTTP
    pub fn new(config: RunConfig) -> Result<Self, AppError> {
        let client = HttpClient::new()?;
        let source = PyPIAdapter::with_index_url(client, config.index_url.clone());
        Ok(Self::with_source(config, Box::new(source)))
    }

    /// Create an orchestrator with a custom version source (for testing)
    pub fn with_source(config: RunConfig, source: Box<dyn VersionSource>) -> Self {
        Self {
            config,
            source,
            today: None,
        }
    }

    /// Pin the date used for ignore-until comparisons
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Run the update workflow
    pub async fn run(&self) -> Result<OrchestratorResult, AppError> {
        self.run_with_progress(false).await
    }

    /// Run the update workflow with optional progress display
    pub async fn run_with_progress(
        &self,
        show_progress: bool,
    ) -> Result<OrchestratorResult, AppError> {
        // Step 1: Load the manifest and its settings
        let mut document = PyprojectDocument::load(&self.config.file_path)?;
        let settings = ToolSettings::from_manifest(document.original(), document.path())?;
        let config = self.config.clone().merge_settings(&settings);
        let filter = config.filter()?;
        let groups = resolve_groups(&document, &config.groups)?;
        log::debug!(
            "processing {} with groups: {}",
            document.path().display(),
            groups
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );

        let rules = match self.today {
            Some(today) => RuleEvaluator::with_today(filter, today),
            None => RuleEvaluator::new(filter),
        };
        let selector = VersionSelector::new(config.upper_bounds)
            .with_requires_python(document.requires_python());
        let judge = UpdateJudge::new(rules, selector);

        // Step 2: Collect the array elements of every selected group
        let mut planned = Vec::with_capacity(groups.len());
        for group in groups {
            let entries = document.entries(&group)?;
            planned.push((group, entries));
        }
        let total: usize = planned.iter().map(|(_, entries)| entries.len()).sum();

        // Step 3: Decide every entry
        let mut progress = Progress::new(show_progress);
        progress.start(total as u64, "Checking dependencies");

        let mut report = RunReport::new(document.path(), config.dry_run);
        let mut cache = ReleaseCache::new();
        let mut replacements = Vec::new();

        for (group, entries) in planned {
            let mut group_report = GroupReport::new(group.clone());
            for entry in entries {
                let entry_report = self
                    .process_entry(&judge, &mut cache, &group, &entry, &progress)
                    .await;
                if let Some(text) = entry_report.decision().and_then(UpdateDecision::new_text) {
                    replacements.push((group.clone(), entry.index, text));
                }
                group_report.add_entry(entry_report);
                progress.inc();
            }
            report.add_group(group_report);
        }
        progress.finish_and_clear();

        if cache.index_unreachable() {
            return Err(AppError::IndexUnreachable {
                index_url: self.source.registry_name().to_string(),
                failures: cache.connectivity_failures(),
            });
        }

        // Step 4: Apply updates (unless dry-run)
        for (group, index, text) in &replacements {
            document.replace_entry(group, *index, text)?;
        }
        let write_result = ManifestWriter::new(config.dry_run).write(&document)?;
        report.written = write_result.file_modified;

        log::info!(
            "{} updates, {} skipped, {} parse errors",
            report.total_updates(),
            report.total_skips(),
            report.total_parse_failures()
        );

        Ok(OrchestratorResult {
            report,
            write_result,
            lookups: cache.lookups(),
        })
    }

    /// Parse, filter, look up and judge one array element
    async fn process_entry(
        &self,
        judge: &UpdateJudge,
        cache: &mut ReleaseCache,
        group: &DependencyGroup,
        entry: &ManifestEntry,
        progress: &Progress,
    ) -> EntryReport {
        let raw = match &entry.value {
            Ok(raw) => raw,
            Err(repr) => {
                let error = ParseError::NotAString {
                    value: repr.clone(),
                };
                log::warn!("{}[{}]: {}", group, entry.index, error);
                return EntryReport::parse_failed(entry.index, repr.clone(), error);
            }
        };

        let spec = match parse_entry(raw, entry.comment.as_deref()) {
            Ok(spec) => spec,
            Err(error) => {
                log::warn!("{}[{}] '{}': {}", group, entry.index, raw, error);
                return EntryReport::parse_failed(entry.index, raw.clone(), error);
            }
        };

        if let Some(reason) = judge.should_skip(&spec) {
            log::debug!("{}: skipped ({})", spec.name, reason);
            return EntryReport::decided(entry.index, raw.clone(), UpdateDecision::skip(spec, reason));
        }

        progress.set_message(&format!("Checking {}", spec.name));
        let decision = match cache.releases(self.source.as_ref(), &spec.name).await {
            Ok(releases) => judge.judge(&spec, &releases),
            Err(e) => UpdateDecision::skip(spec, SkipReason::LookupFailed(e.to_string())),
        };
        EntryReport::decided(entry.index, raw.clone(), decision)
    }
}

/// Turn the requested groups into declared ones, base first, without duplicates
pub fn resolve_groups(
    document: &PyprojectDocument,
    selection: &GroupSelection,
) -> Result<Vec<DependencyGroup>, ConfigError> {
    let mut groups = Vec::new();
    if selection.includes_base() {
        groups.push(DependencyGroup::Base);
    }

    let mut push = |group: DependencyGroup| {
        if !groups.contains(&group) {
            groups.push(group);
        }
    };

    for name in &selection.extras {
        let declared = document
            .find_extra(name)
            .ok_or_else(|| ConfigError::unknown_extra(name, document.path()))?;
        push(DependencyGroup::Extra(declared));
    }

    if selection.all {
        for declared in document.extras() {
            push(DependencyGroup::Extra(declared));
        }
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Version;
    use crate::error::RegistryError;
    use crate::registry::Release;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"[project]
name = "demo"
dependencies = [
    "foo==1.0.0",
    "bar>=1.0,<2.0",
    "baz",
]

[project.optional-dependencies]
dev = ["foo==1.0.0", "pytest==7.0.0"]
docs = ["sphinx==6.0.0"]
"#;

    struct FakeSource {
        releases: HashMap<String, Vec<&'static str>>,
        unreachable: bool,
    }

    impl FakeSource {
        fn new(entries: &[(&str, &[&'static str])]) -> Self {
            Self {
                releases: entries
                    .iter()
                    .map(|(name, versions)| (name.to_string(), versions.to_vec()))
                    .collect(),
                unreachable: false,
            }
        }

        fn unreachable() -> Self {
            Self {
                releases: HashMap::new(),
                unreachable: true,
            }
        }
    }

    #[async_trait]
    impl VersionSource for FakeSource {
        fn registry_name(&self) -> &str {
            "fake"
        }

        async fn fetch_releases(&self, package: &str) -> Result<Vec<Release>, RegistryError> {
            if self.unreachable {
                return Err(RegistryError::network_error(package, "fake", "connection refused"));
            }
            self.releases
                .get(package)
                .map(|versions| {
                    versions
                        .iter()
                        .map(|v| Release::new(v.parse::<Version>().unwrap()))
                        .collect()
                })
                .ok_or_else(|| RegistryError::package_not_found(package, "fake"))
        }
    }

    fn setup(content: &str) -> (TempDir, std::path::PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pyproject.toml");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    fn default_source() -> FakeSource {
        FakeSource::new(&[
            ("foo", &["1.0.0", "1.1.0", "2.0.0"]),
            ("bar", &["1.0", "1.9.0", "2.5.0"]),
            ("pytest", &["7.0.0", "8.1.1"]),
            ("sphinx", &["6.0.0", "7.2.6"]),
        ])
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[tokio::test]
    async fn test_run_updates_base_only_by_default() {
        let (_dir, path) = setup(MANIFEST);
        let orchestrator =
            Orchestrator::with_source(RunConfig::new(&path), Box::new(default_source()))
                .with_today(today());
        let result = orchestrator.run().await.unwrap();

        assert_eq!(result.report.groups.len(), 1);
        assert_eq!(result.report.total_updates(), 1);
        assert!(result.write_result.file_modified);

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"foo==2.0.0\",\n    \"bar>=1.0,<2.0\""));
        assert!(content.contains("dev = [\"foo==1.0.0\", \"pytest==7.0.0\"]"));
    }

    #[tokio::test]
    async fn test_run_dry_run_does_not_write() {
        let (_dir, path) = setup(MANIFEST);
        let config = RunConfig::new(&path).with_all().with_dry_run(true);
        let orchestrator = Orchestrator::with_source(config, Box::new(default_source()));
        let result = orchestrator.run().await.unwrap();

        assert!(result.report.has_updates());
        assert!(result.write_result.changed);
        assert!(!result.report.written);
        assert_eq!(fs::read_to_string(&path).unwrap(), MANIFEST);
    }

    #[tokio::test]
    async fn test_lookups_are_shared_across_groups() {
        let (_dir, path) = setup(MANIFEST);
        let config = RunConfig::new(&path).with_all();
        let orchestrator = Orchestrator::with_source(config, Box::new(default_source()));
        let result = orchestrator.run().await.unwrap();

        // foo appears in base and dev, baz is unconstrained
        assert_eq!(result.lookups, 4);
        assert_eq!(result.report.groups.len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_extra_is_config_error() {
        let (_dir, path) = setup(MANIFEST);
        let config = RunConfig::new(&path).with_extras(["test"]);
        let orchestrator = Orchestrator::with_source(config, Box::new(default_source()));
        let err = orchestrator.run().await.unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::UnknownExtra { .. })));
        assert_eq!(fs::read_to_string(&path).unwrap(), MANIFEST);
    }

    #[tokio::test]
    async fn test_unreachable_index_is_fatal() {
        let (_dir, path) = setup(MANIFEST);
        let orchestrator =
            Orchestrator::with_source(RunConfig::new(&path), Box::new(FakeSource::unreachable()));
        let err = orchestrator.run().await.unwrap_err();
        assert!(matches!(err, AppError::IndexUnreachable { .. }));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), MANIFEST);
    }

    #[tokio::test]
    async fn test_unknown_package_is_skipped() {
        let (_dir, path) = setup("[project]\ndependencies = [\"nope==1.0\", \"foo==1.0.0\"]\n");
        let orchestrator =
            Orchestrator::with_source(RunConfig::new(&path), Box::new(default_source()));
        let result = orchestrator.run().await.unwrap();

        let base = result.report.group(&DependencyGroup::Base).unwrap();
        assert!(matches!(
            base.entries[0].decision().and_then(UpdateDecision::skip_reason),
            Some(SkipReason::LookupFailed(_))
        ));
        assert!(base.entries[1].is_update());
    }

    #[tokio::test]
    async fn test_parse_failure_is_reported() {
        let (_dir, path) = setup("[project]\ndependencies = [\"foo[bar\", 3, \"foo==1.0.0\"]\n");
        let orchestrator =
            Orchestrator::with_source(RunConfig::new(&path), Box::new(default_source()));
        let result = orchestrator.run().await.unwrap();
        assert_eq!(result.report.total_parse_failures(), 2);
        assert_eq!(result.report.total_updates(), 1);
    }

    #[test]
    fn test_resolve_groups() {
        let doc = PyprojectDocument::parse("pyproject.toml", MANIFEST).unwrap();

        let groups = resolve_groups(&doc, &GroupSelection::default()).unwrap();
        assert_eq!(groups, vec![DependencyGroup::Base]);

        let selection = GroupSelection {
            extras: vec!["docs".into(), "docs".into()],
            all: true,
            ..Default::default()
        };
        let groups = resolve_groups(&doc, &selection).unwrap();
        assert_eq!(
            groups,
            vec![
                DependencyGroup::Base,
                DependencyGroup::Extra("docs".into()),
                DependencyGroup::Extra("dev".into()),
            ]
        );

        let selection = GroupSelection {
            extras: vec!["dev".into()],
            ..Default::default()
        };
        let groups = resolve_groups(&doc, &selection).unwrap();
        assert_eq!(groups, vec![DependencyGroup::Extra("dev".into())]);
    }
}
