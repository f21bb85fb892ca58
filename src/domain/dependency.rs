//! Dependency specifier structures

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

use super::{ConstraintStyle, VersionConstraint};

static NAME_SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-_.]+").unwrap());

/// PEP 503 normalized form of a distribution name
pub fn normalize_name(name: &str) -> String {
    NAME_SEPARATORS
        .replace_all(&name.to_ascii_lowercase(), "-")
        .into_owned()
}

/// Inline `# bumpdeps:` instruction attached to an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "until", rename_all = "kebab-case")]
pub enum Directive {
    /// `# bumpdeps: ignore`
    Ignore,
    /// `# bumpdeps: ignore-until=YYYY-MM-DD`
    IgnoreUntil(NaiveDate),
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Ignore => write!(f, "ignore"),
            Directive::IgnoreUntil(date) => write!(f, "ignore-until={}", date.format("%Y-%m-%d")),
        }
    }
}

/// A parsed dependency entry such as `requests[socks]>=2.31; python_version>"3.8"`
///
/// Equality compares what the entry means, not how it was written.
#[derive(Debug, Clone, Serialize)]
pub struct DependencySpecifier {
    /// Distribution name as written
    pub name: String,
    /// Requested extras
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub extras: BTreeSet<String>,
    /// Version clauses
    pub constraint: VersionConstraint,
    /// Environment marker text after `;`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
    /// Direct reference after `@`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Inline directive from the entry's trailing comment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directive: Option<Directive>,
    /// Entry text as found in the manifest
    #[serde(skip)]
    pub raw: String,
    /// Byte range of the constraint inside `raw`
    #[serde(skip)]
    pub constraint_span: Range<usize>,
    #[serde(skip)]
    pub style: ConstraintStyle,
}

impl DependencySpecifier {
    /// Creates a specifier with no extras, marker or directive
    pub fn new(name: impl Into<String>, constraint: VersionConstraint) -> Self {
        let name = name.into();
        let constraint_text = constraint.to_string();
        let raw = format!("{}{}", name, constraint_text);
        let constraint_span = name.len()..raw.len();
        Self {
            name,
            extras: BTreeSet::new(),
            constraint,
            marker: None,
            url: None,
            directive: None,
            raw,
            constraint_span,
            style: ConstraintStyle::default(),
        }
    }

    /// Sets the directive (builder pattern)
    pub fn with_directive(mut self, directive: Directive) -> Self {
        self.directive = Some(directive);
        self
    }

    /// Name used for index lookups and filters
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    /// True when there is nothing to bump
    pub fn is_unconstrained(&self) -> bool {
        self.url.is_some() || self.constraint.is_empty()
    }

    /// Entry text with the constraint replaced, everything else kept as written
    pub fn render_with(&self, constraint: &VersionConstraint) -> String {
        let text = constraint.render(&self.style);
        format!(
            "{}{}{}",
            &self.raw[..self.constraint_span.start],
            text,
            &self.raw[self.constraint_span.end..]
        )
    }
}

impl PartialEq for DependencySpecifier {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.extras == other.extras
            && self.constraint == other.constraint
            && self.marker == other.marker
            && self.url == other.url
            && self.directive == other.directive
    }
}

impl Eq for DependencySpecifier {}

/// Canonical PEP 508 form
impl fmt::Display for DependencySpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.extras.is_empty() {
            let extras: Vec<&str> = self.extras.iter().map(String::as_str).collect();
            write!(f, "[{}]", extras.join(","))?;
        }
        if let Some(url) = &self.url {
            write!(f, " @ {}", url)?;
            if self.marker.is_some() {
                write!(f, " ")?;
            }
        } else {
            write!(f, "{}", self.constraint)?;
        }
        if let Some(marker) = &self.marker {
            write!(f, "; {}", marker)?;
        }
        Ok(())
    }
}
