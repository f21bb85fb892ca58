//! Update decision result types

use super::{DependencySpecifier, Version, VersionConstraint};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;

/// Reason why a dependency update was skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// `# bumpdeps: ignore`
    Ignored,
    /// `# bumpdeps: ignore-until=` with a date after today
    IgnoredUntilFuture { until: NaiveDate },
    /// Rejected by --include or --exclude
    FilteredOut,
    /// No release passed the selection filters
    NoMatchingVersion,
    /// Index lookup failed
    LookupFailed(String),
    /// No version clause to bump (bare name or direct URL)
    Unconstrained,
    /// The best eligible release is already allowed
    UpToDate,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Ignored => write!(f, "ignored"),
            SkipReason::IgnoredUntilFuture { until } => {
                write!(f, "ignored until {}", until.format("%Y-%m-%d"))
            }
            SkipReason::FilteredOut => write!(f, "filtered out"),
            SkipReason::NoMatchingVersion => write!(f, "no matching version"),
            SkipReason::LookupFailed(msg) => write!(f, "lookup failed: {}", msg),
            SkipReason::Unconstrained => write!(f, "no version constraint"),
            SkipReason::UpToDate => write!(f, "up to date"),
        }
    }
}

/// Outcome of evaluating one dependency entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpdateDecision {
    /// The entry gets a new constraint
    Update {
        specifier: DependencySpecifier,
        /// Release the new constraint was built around
        new_version: Version,
        new_constraint: VersionConstraint,
        /// Upload time of `new_version`, when the index reports one
        #[serde(skip_serializing_if = "Option::is_none")]
        released_at: Option<DateTime<Utc>>,
        /// Clauses dropped while re-synthesizing
        #[serde(skip_serializing_if = "Vec::is_empty")]
        warnings: Vec<String>,
    },
    /// The entry stays as it is
    Skip {
        specifier: DependencySpecifier,
        reason: SkipReason,
    },
}

impl UpdateDecision {
    pub fn update(
        specifier: DependencySpecifier,
        new_version: Version,
        new_constraint: VersionConstraint,
        warnings: Vec<String>,
    ) -> Self {
        UpdateDecision::Update {
            specifier,
            new_version,
            new_constraint,
            released_at: None,
            warnings,
        }
    }

    /// Attach the upload time of the selected release (builder pattern)
    pub fn with_released_at(mut self, time: Option<DateTime<Utc>>) -> Self {
        if let UpdateDecision::Update { released_at, .. } = &mut self {
            *released_at = time;
        }
        self
    }

    pub fn skip(specifier: DependencySpecifier, reason: SkipReason) -> Self {
        UpdateDecision::Skip { specifier, reason }
    }

    pub fn is_update(&self) -> bool {
        matches!(self, UpdateDecision::Update { .. })
    }

    pub fn specifier(&self) -> &DependencySpecifier {
        match self {
            UpdateDecision::Update { specifier, .. } => specifier,
            UpdateDecision::Skip { specifier, .. } => specifier,
        }
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            UpdateDecision::Skip { reason, .. } => Some(reason),
            UpdateDecision::Update { .. } => None,
        }
    }

    pub fn new_constraint(&self) -> Option<&VersionConstraint> {
        match self {
            UpdateDecision::Update { new_constraint, .. } => Some(new_constraint),
            UpdateDecision::Skip { .. } => None,
        }
    }

    /// Replacement entry text, for updates
    pub fn new_text(&self) -> Option<String> {
        match self {
            UpdateDecision::Update {
                specifier,
                new_constraint,
                ..
            } => Some(specifier.render_with(new_constraint)),
            UpdateDecision::Skip { .. } => None,
        }
    }
}
