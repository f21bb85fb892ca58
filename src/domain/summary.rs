//! Update result summary types
//!
//! Provides structures for tracking results per dependency group and per run.

use super::{SkipReason, UpdateDecision};
use crate::error::ParseError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

/// A dependency array in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DependencyGroup {
    /// `[project].dependencies`
    Base,
    /// `[project.optional-dependencies].<name>`
    Extra(String),
}

impl DependencyGroup {
    pub fn is_base(&self) -> bool {
        matches!(self, DependencyGroup::Base)
    }
}

impl fmt::Display for DependencyGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyGroup::Base => write!(f, "dependencies"),
            DependencyGroup::Extra(name) => write!(f, "optional-dependencies.{}", name),
        }
    }
}

impl Serialize for DependencyGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// What happened to a single array element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryOutcome {
    Decided(UpdateDecision),
    ParseFailed(#[serde(serialize_with = "serialize_display")] ParseError),
}

fn serialize_display<S: Serializer>(error: &ParseError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Report line for one array element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryReport {
    /// Position in the dependency array
    pub index: usize,
    /// Entry text as found in the manifest
    pub raw: String,
    pub outcome: EntryOutcome,
}

impl EntryReport {
    pub fn decided(index: usize, raw: impl Into<String>, decision: UpdateDecision) -> Self {
        Self {
            index,
            raw: raw.into(),
            outcome: EntryOutcome::Decided(decision),
        }
    }

    pub fn parse_failed(index: usize, raw: impl Into<String>, error: ParseError) -> Self {
        Self {
            index,
            raw: raw.into(),
            outcome: EntryOutcome::ParseFailed(error),
        }
    }

    pub fn decision(&self) -> Option<&UpdateDecision> {
        match &self.outcome {
            EntryOutcome::Decided(decision) => Some(decision),
            EntryOutcome::ParseFailed(_) => None,
        }
    }

    pub fn parse_error(&self) -> Option<&ParseError> {
        match &self.outcome {
            EntryOutcome::ParseFailed(error) => Some(error),
            EntryOutcome::Decided(_) => None,
        }
    }

    pub fn is_update(&self) -> bool {
        self.decision().is_some_and(UpdateDecision::is_update)
    }
}

/// Results for one dependency group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupReport {
    pub group: DependencyGroup,
    pub entries: Vec<EntryReport>,
}

impl GroupReport {
    pub fn new(group: DependencyGroup) -> Self {
        Self {
            group,
            entries: Vec::new(),
        }
    }

    pub fn add_entry(&mut self, entry: EntryReport) {
        self.entries.push(entry);
    }

    /// Entries that get a new constraint
    pub fn updates(&self) -> impl Iterator<Item = &EntryReport> {
        self.entries.iter().filter(|e| e.is_update())
    }

    /// Skipped entries with their reason
    pub fn skips(&self) -> impl Iterator<Item = (&EntryReport, &SkipReason)> {
        self.entries
            .iter()
            .filter_map(|e| e.decision().and_then(|d| d.skip_reason()).map(|r| (e, r)))
    }

    /// Entries that could not be parsed
    pub fn parse_failures(&self) -> impl Iterator<Item = &EntryReport> {
        self.entries.iter().filter(|e| e.parse_error().is_some())
    }

    pub fn update_count(&self) -> usize {
        self.updates().count()
    }

    pub fn has_updates(&self) -> bool {
        self.updates().next().is_some()
    }
}

/// Overall result of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Manifest that was processed
    pub path: PathBuf,
    pub dry_run: bool,
    /// Whether the manifest was rewritten
    pub written: bool,
    pub groups: Vec<GroupReport>,
}

impl RunReport {
    pub fn new(path: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            path: path.into(),
            dry_run,
            written: false,
            groups: Vec::new(),
        }
    }

    pub fn add_group(&mut self, group: GroupReport) {
        self.groups.push(group);
    }

    pub fn group(&self, group: &DependencyGroup) -> Option<&GroupReport> {
        self.groups.iter().find(|g| &g.group == group)
    }

    pub fn total_updates(&self) -> usize {
        self.groups.iter().map(GroupReport::update_count).sum()
    }

    pub fn total_skips(&self) -> usize {
        self.groups.iter().map(|g| g.skips().count()).sum()
    }

    pub fn total_parse_failures(&self) -> usize {
        self.groups.iter().map(|g| g.parse_failures().count()).sum()
    }

    pub fn total_entries(&self) -> usize {
        self.groups.iter().map(|g| g.entries.len()).sum()
    }

    pub fn has_updates(&self) -> bool {
        self.total_updates() > 0
    }

    /// Every decision of the run, in manifest order
    pub fn decisions(&self) -> impl Iterator<Item = &UpdateDecision> {
        self.groups
            .iter()
            .flat_map(|g| g.entries.iter())
            .filter_map(EntryReport::decision)
    }
}
