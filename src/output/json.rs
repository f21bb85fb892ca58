//! JSON output formatter for machine processing
//!
//! This module provides:
//! - JSON serialization of the run report
//! - Structured group-by-group update/skip/parse-error information

use crate::domain::{EntryOutcome, GroupReport, RunReport, UpdateDecision};
use crate::orchestrator::OrchestratorResult;
use crate::output::{OutputFormatter, Verbosity};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Verbosity level affects detail in output
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

/// JSON representation of the full result
#[derive(Serialize)]
struct JsonOutput {
    /// Manifest path
    file: String,
    /// Whether this was a dry-run
    dry_run: bool,
    /// Whether the manifest was rewritten
    written: bool,
    /// Summary statistics
    summary: JsonSummary,
    /// Per-group results
    groups: Vec<JsonGroup>,
}

/// JSON representation of summary statistics
#[derive(Serialize)]
struct JsonSummary {
    updates: usize,
    skips: usize,
    parse_errors: usize,
}

/// JSON representation of a dependency group
#[derive(Serialize)]
struct JsonGroup {
    /// `dependencies` or `optional-dependencies.<name>`
    group: String,
    updates: Vec<JsonUpdate>,
    /// List of skips (omitted in quiet mode)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    skips: Vec<JsonSkip>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    parse_errors: Vec<JsonParseError>,
}

/// JSON representation of an update
#[derive(Serialize)]
struct JsonUpdate {
    /// Package name
    name: String,
    /// Entry text before
    from: String,
    /// Entry text after
    to: String,
    /// Version the new constraint was built around
    version: String,
    /// Upload date of that version (`YYYY-MM-DD`)
    #[serde(skip_serializing_if = "Option::is_none")]
    released: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

/// JSON representation of a skip
#[derive(Serialize)]
struct JsonSkip {
    /// Package name
    name: String,
    /// Entry text
    entry: String,
    /// Skip reason
    reason: String,
}

/// JSON representation of an entry that could not be parsed
#[derive(Serialize)]
struct JsonParseError {
    index: usize,
    entry: String,
    error: String,
}

impl JsonFormatter {
    /// Convert a group report to JSON representation
    fn group_to_json(&self, group: &GroupReport) -> JsonGroup {
        let mut json = JsonGroup {
            group: group.group.to_string(),
            updates: Vec::new(),
            skips: Vec::new(),
            parse_errors: Vec::new(),
        };

        for entry in &group.entries {
            match &entry.outcome {
                EntryOutcome::Decided(
                    decision @ UpdateDecision::Update {
                        specifier,
                        new_version,
                        released_at,
                        warnings,
                        ..
                    },
                ) => json.updates.push(JsonUpdate {
                    name: specifier.name.clone(),
                    from: entry.raw.clone(),
                    to: decision.new_text().unwrap_or_default(),
                    version: new_version.to_string(),
                    released: released_at.map(|t| t.format("%Y-%m-%d").to_string()),
                    warnings: warnings.clone(),
                }),
                EntryOutcome::Decided(UpdateDecision::Skip { specifier, reason }) => {
                    if self.verbosity != Verbosity::Quiet {
                        json.skips.push(JsonSkip {
                            name: specifier.name.clone(),
                            entry: entry.raw.clone(),
                            reason: reason.to_string(),
                        });
                    }
                }
                EntryOutcome::ParseFailed(error) => json.parse_errors.push(JsonParseError {
                    index: entry.index,
                    entry: entry.raw.clone(),
                    error: error.to_string(),
                }),
            }
        }

        json
    }

    fn summary_to_json(report: &RunReport) -> JsonSummary {
        JsonSummary {
            updates: report.total_updates(),
            skips: report.total_skips(),
            parse_errors: report.total_parse_failures(),
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let report = &result.report;
        let output = JsonOutput {
            file: report.path.display().to_string(),
            dry_run: report.dry_run,
            written: report.written,
            summary: Self::summary_to_json(report),
            groups: report
                .groups
                .iter()
                .map(|g| self.group_to_json(g))
                .collect(),
        };

        let json = serde_json::to_string_pretty(&output)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        writeln!(writer, "{}", json)
    }

    fn format_summary(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(&Self::summary_to_json(report))
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        writeln!(writer, "{}", json)
    }

    fn format_group(&self, group: &GroupReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(&self.group_to_json(group))
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        writeln!(writer, "{}", json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DependencyGroup, EntryReport, SkipReason};
    use crate::error::ParseError;
    use crate::manifest::WriteResult;
    use crate::parser::{parse_requirement, parse_specifier};

    fn sample_result() -> OrchestratorResult {
        let foo = parse_requirement("foo>=1.0").unwrap();
        let bar = parse_specifier("bar==1.0  # bumpdeps: ignore").unwrap();

        let mut base = GroupReport::new(DependencyGroup::Base);
        base.add_entry(EntryReport::decided(
            0,
            "foo>=1.0",
            UpdateDecision::update(
                foo,
                "2.1.0".parse().unwrap(),
                ">=2.1.0".parse().unwrap(),
                vec!["dropped '>=1.0'".to_string()],
            )
            .with_released_at(Some("2024-03-05T08:30:00Z".parse().unwrap())),
        ));
        base.add_entry(EntryReport::decided(
            1,
            "bar==1.0",
            UpdateDecision::skip(bar, SkipReason::Ignored),
        ));

        let mut docs = GroupReport::new(DependencyGroup::Extra("docs".to_string()));
        docs.add_entry(EntryReport::parse_failed(
            0,
            "42",
            ParseError::NotAString {
                value: "42".to_string(),
            },
        ));

        let mut report = RunReport::new("pyproject.toml", true);
        report.add_group(base);
        report.add_group(docs);

        OrchestratorResult {
            report,
            write_result: WriteResult {
                path: "pyproject.toml".into(),
                changed: true,
                file_modified: false,
            },
            lookups: 1,
        }
    }

    fn render(verbosity: Verbosity) -> serde_json::Value {
        let mut output = Vec::new();
        JsonFormatter::new(verbosity)
            .format(&sample_result(), &mut output)
            .unwrap();
        serde_json::from_slice(&output).unwrap()
    }

    #[test]
    fn test_json_structure() {
        let json = render(Verbosity::Normal);
        assert_eq!(json["file"], "pyproject.toml");
        assert_eq!(json["dry_run"], true);
        assert_eq!(json["written"], false);
        assert_eq!(json["summary"]["updates"], 1);
        assert_eq!(json["summary"]["skips"], 1);
        assert_eq!(json["summary"]["parse_errors"], 1);

        let base = &json["groups"][0];
        assert_eq!(base["group"], "dependencies");
        assert_eq!(base["updates"][0]["name"], "foo");
        assert_eq!(base["updates"][0]["from"], "foo>=1.0");
        assert_eq!(base["updates"][0]["to"], "foo>=2.1.0");
        assert_eq!(base["updates"][0]["version"], "2.1.0");
        assert_eq!(base["updates"][0]["released"], "2024-03-05");
        assert_eq!(base["skips"][0]["reason"], "ignored");

        let docs = &json["groups"][1];
        assert_eq!(docs["group"], "optional-dependencies.docs");
        assert_eq!(docs["parse_errors"][0]["entry"], "42");
    }

    #[test]
    fn test_json_quiet_omits_skips() {
        let json = render(Verbosity::Quiet);
        assert!(json["groups"][0].get("skips").is_none());
        assert_eq!(json["summary"]["skips"], 1);
    }

    #[test]
    fn test_json_summary_only() {
        let mut output = Vec::new();
        JsonFormatter::new(Verbosity::Normal)
            .format_summary(&sample_result().report, &mut output)
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(json["updates"], 1);
    }
}
