//! Eligibility rules: directives first, then name filters

use super::UpdateFilter;
use crate::domain::{DependencySpecifier, Directive, SkipReason};
use chrono::{Local, NaiveDate};

/// Decides whether an entry may be updated at all
pub struct RuleEvaluator {
    filter: UpdateFilter,
    today: NaiveDate,
}

impl RuleEvaluator {
    /// Create an evaluator using the local calendar date
    pub fn new(filter: UpdateFilter) -> Self {
        Self::with_today(filter, Local::now().date_naive())
    }

    /// Create an evaluator with a fixed "today" (for testing)
    pub fn with_today(filter: UpdateFilter, today: NaiveDate) -> Self {
        Self { filter, today }
    }

    /// First matching rule wins; `None` means eligible
    pub fn evaluate(&self, spec: &DependencySpecifier) -> Option<SkipReason> {
        match spec.directive {
            Some(Directive::Ignore) => return Some(SkipReason::Ignored),
            Some(Directive::IgnoreUntil(until)) if until > self.today => {
                return Some(SkipReason::IgnoredUntilFuture { until });
            }
            Some(Directive::IgnoreUntil(until)) => {
                log::debug!("{}: ignore-until {} has passed", spec.name, until);
            }
            None => {}
        }

        if !self.filter.should_process_package(&spec.normalized_name()) {
            return Some(SkipReason::FilteredOut);
        }

        None
    }
}
