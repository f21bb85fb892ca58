//! Update judgment logic for dependencies
//!
//! This module provides:
//! - Include/exclude name filters
//! - Directive and filter rule evaluation
//! - Version selection and constraint re-synthesis
//! - The judgment engine that combines them into an [`UpdateDecision`]

mod filter;
mod rules;
mod selector;

pub use filter::UpdateFilter;
pub use rules::RuleEvaluator;
pub use selector::{Selection, UpperBoundPolicy, VersionSelector};

use crate::domain::{DependencySpecifier, SkipReason, UpdateDecision};
use crate::registry::Release;

/// Update judgment engine that decides whether to update a dependency
pub struct UpdateJudge {
    rules: RuleEvaluator,
    selector: VersionSelector,
}

impl UpdateJudge {
    pub fn new(rules: RuleEvaluator, selector: VersionSelector) -> Self {
        Self { rules, selector }
    }

    /// Check if a dependency should be looked up at all
    /// Returns Some(SkipReason) if it should be skipped, None if it should be processed
    pub fn should_skip(&self, spec: &DependencySpecifier) -> Option<SkipReason> {
        self.rules.evaluate(spec).or_else(|| {
            spec.is_unconstrained()
                .then_some(SkipReason::Unconstrained)
        })
    }

    /// Judge whether to update a dependency given its releases
    pub fn judge(&self, spec: &DependencySpecifier, releases: &[Release]) -> UpdateDecision {
        if let Some(reason) = self.should_skip(spec) {
            return UpdateDecision::skip(spec.clone(), reason);
        }

        match self.selector.select(spec, releases) {
            Selection::Update {
                version,
                constraint,
                warnings,
            } => {
                let released_at = releases
                    .iter()
                    .find(|r| r.version == version)
                    .and_then(|r| r.released_at);
                UpdateDecision::update(spec.clone(), version, constraint, warnings)
                    .with_released_at(released_at)
            }
            Selection::UpToDate { .. } => UpdateDecision::skip(spec.clone(), SkipReason::UpToDate),
            Selection::NoMatchingVersion => {
                UpdateDecision::skip(spec.clone(), SkipReason::NoMatchingVersion)
            }
        }
    }
}
