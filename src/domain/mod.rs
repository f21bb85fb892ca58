//! Core domain models for bumpdeps
//!
//! This module contains the fundamental types used throughout the application:
//! - PEP 440 versions and version constraint clauses
//! - Dependency specifiers with their inline directives
//! - Update decisions and skip reasons
//! - Per-group and per-run reports

mod dependency;
mod specifier;
mod summary;
mod update_result;
mod version;

pub use dependency::{normalize_name, DependencySpecifier, Directive};
pub use specifier::{ConstraintStyle, Operator, Specifier, VersionConstraint};
pub use summary::{DependencyGroup, EntryOutcome, EntryReport, GroupReport, RunReport};
pub use update_result::{SkipReason, UpdateDecision};
pub use version::{LocalSegment, PreRelease, Version};
