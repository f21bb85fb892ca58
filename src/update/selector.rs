//! Target version selection and constraint re-synthesis

use crate::domain::{DependencySpecifier, Operator, Specifier, Version, VersionConstraint};
use crate::registry::Release;
use regex::Regex;
use std::sync::LazyLock;

static MARKER_PYTHON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"python(?:_full)?_version\s*(?P<op>>=|>|==|~=|===)\s*['"](?P<version>[^'"]+)['"]"#)
        .unwrap()
});

/// What to do with declared `<` / `<=` clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpperBoundPolicy {
    /// Never select past a declared ceiling
    #[default]
    Respect,
    /// Ignore ceilings during selection and move them above the new version
    Replace,
}

/// Result of selecting a version for one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A newer constraint was built
    Update {
        version: Version,
        constraint: VersionConstraint,
        warnings: Vec<String>,
    },
    /// The best candidate is already allowed
    UpToDate { version: Version },
    /// Nothing passed the candidate filters
    NoMatchingVersion,
}

/// Picks the newest eligible release and rebuilds the constraint around it
#[derive(Debug, Clone, Default)]
pub struct VersionSelector {
    policy: UpperBoundPolicy,
    /// Lowest Python the project supports (`requires-python`)
    project_python: Option<Version>,
}

impl VersionSelector {
    pub fn new(policy: UpperBoundPolicy) -> Self {
        Self {
            policy,
            project_python: None,
        }
    }

    /// Sets the project's `requires-python` (builder pattern)
    pub fn with_requires_python(mut self, requires_python: Option<&str>) -> Self {
        self.project_python = requires_python
            .and_then(|text| text.parse::<VersionConstraint>().ok())
            .and_then(|constraint| constraint.floor().map(Version::public));
        self
    }

    /// Lowest Python the entry has to install on
    fn python_floor(&self, spec: &DependencySpecifier) -> Option<Version> {
        let marker_floor = spec.marker.as_deref().and_then(marker_python_floor);
        match (marker_floor, self.project_python.clone()) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn select(&self, spec: &DependencySpecifier, releases: &[Release]) -> Selection {
        let constraint = &spec.constraint;
        let anchor = constraint.anchor();
        let allow_prerelease = anchor.is_some_and(Version::is_prerelease);
        let python = self.python_floor(spec);

        let best = releases
            .iter()
            .filter(|r| !r.yanked)
            .filter(|r| allow_prerelease || !r.version.is_prerelease())
            .filter(|r| python.as_ref().map_or(true, |p| r.supports_python(p)))
            .filter(|r| constraint.passes_exclusions(&r.version))
            .filter(|r| {
                self.policy == UpperBoundPolicy::Replace || constraint.below_ceilings(&r.version)
            })
            .map(|r| &r.version)
            .max();

        let Some(best) = best else {
            return Selection::NoMatchingVersion;
        };

        if anchor.is_some_and(|a| best <= a) || constraint.contains(best) {
            return Selection::UpToDate {
                version: best.clone(),
            };
        }

        let (new_constraint, warnings) = self.resynthesize(constraint, best);
        if new_constraint == *constraint || new_constraint.is_empty() {
            return Selection::UpToDate {
                version: best.clone(),
            };
        }

        Selection::Update {
            version: best.clone(),
            constraint: new_constraint,
            warnings,
        }
    }

    /// Rebuild every clause around `target`, keeping clause order
    fn resynthesize(
        &self,
        constraint: &VersionConstraint,
        target: &Version,
    ) -> (VersionConstraint, Vec<String>) {
        let target = target.public();
        let mut clauses = Vec::with_capacity(constraint.clauses().len());
        let mut warnings = Vec::new();

        for clause in constraint.clauses() {
            match clause.operator {
                Operator::Equal | Operator::NotEqual if clause.wildcard => {
                    if clause.operator == Operator::Equal {
                        clauses.push(Specifier::wildcard(
                            Operator::Equal,
                            target.truncated(clause.version.release.len()),
                        ));
                    } else {
                        clauses.push(clause.clone());
                    }
                }
                Operator::Equal | Operator::ArbitraryEqual => {
                    clauses.push(Specifier::new(clause.operator, target.clone()));
                }
                Operator::Compatible => {
                    clauses.push(Specifier::new(
                        Operator::Compatible,
                        compatible_anchor(&clause.version, &target),
                    ));
                }
                Operator::NotEqual | Operator::Greater | Operator::GreaterEqual => {
                    if clause.contains(&target) {
                        clauses.push(clause.clone());
                    } else {
                        let warning = format!("dropped '{}' which excludes {}", clause, target);
                        log::warn!("{}", warning);
                        warnings.push(warning);
                    }
                }
                Operator::Less | Operator::LessEqual => match self.policy {
                    UpperBoundPolicy::Respect => clauses.push(clause.clone()),
                    UpperBoundPolicy::Replace if clause.contains(&target) => {
                        clauses.push(clause.clone())
                    }
                    UpperBoundPolicy::Replace => clauses.push(raise_ceiling(clause, &target)),
                },
            }
        }

        (VersionConstraint::new(clauses), warnings)
    }
}

/// `~=` keeps two segments when it had fewer than three and the target has
/// at least three (`~=5.3` with 6.1.2 gives `~=6.1`), otherwise the full target
fn compatible_anchor(original: &Version, target: &Version) -> Version {
    if original.release.len() < 3 && target.release.len() >= 3 {
        return target.truncated(2);
    }
    let mut anchor = target.clone();
    if anchor.release.len() < 2 {
        anchor.release.resize(2, 0);
    }
    anchor
}

/// Move a ceiling above `target` at the precision of its last non-zero segment
///
/// `<1.16` with 1.19.1 gives `<1.20`, `<2.0.0` with 2.5.0 gives `<3.0.0`.
fn raise_ceiling(clause: &Specifier, target: &Version) -> Specifier {
    if clause.operator == Operator::LessEqual {
        return Specifier::new(Operator::LessEqual, target.clone());
    }

    let old = &clause.version.release;
    let precision = old.iter().rposition(|&s| s != 0).unwrap_or(0);
    let mut release: Vec<u64> = (0..=precision).map(|i| target.segment(i)).collect();
    release[precision] += 1;
    release.resize(old.len().max(precision + 1), 0);

    Specifier::new(
        Operator::Less,
        Version {
            epoch: target.epoch,
            release,
            ..Version::default()
        },
    )
}

/// Highest lower bound on `python_version` / `python_full_version` in a marker
fn marker_python_floor(marker: &str) -> Option<Version> {
    MARKER_PYTHON_RE
        .captures_iter(marker)
        .filter_map(|caps| caps["version"].trim_end_matches(".*").parse::<Version>().ok())
        .max()
}
