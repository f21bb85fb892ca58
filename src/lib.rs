//! bumpdeps - dependency constraint bumper for pyproject.toml
//!
//! This library provides the core functionality for bumping the version
//! constraints of a PEP 621 project:
//! - PEP 508 specifier and PEP 440 version parsing
//! - `# bumpdeps:` ignore directives in trailing comments
//! - Release lookups against a PyPI-compatible JSON API
//! - Layout-preserving rewrites of the manifest

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod parser;
pub mod progress;
pub mod registry;
pub mod update;
