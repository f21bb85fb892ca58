//! CLI argument parsing module for bumpdeps

use crate::manifest::DEFAULT_MANIFEST;
use crate::registry::PYPI_API_URL;
use clap::Parser;
use std::path::PathBuf;

/// Bump dependency constraints in pyproject.toml to the latest releases
#[derive(Parser, Debug, Clone)]
#[command(
    name = "bumpdeps",
    version,
    about = "Bump dependency constraints in pyproject.toml to the latest releases"
)]
pub struct CliArgs {
    /// Extras groups to update (from [project.optional-dependencies])
    #[arg(value_name = "EXTRAS")]
    pub extras: Vec<String>,

    // Group selection
    /// Update every declared extras group
    #[arg(short, long)]
    pub all: bool,

    /// Update base dependencies even when extras are named
    #[arg(short, long)]
    pub base: bool,

    /// Do not update base dependencies
    #[arg(short = 'n', long, conflicts_with = "base")]
    pub no_base: bool,

    // Package filters
    /// Only update packages whose normalized name starts with a match of this regex
    #[arg(short, long, value_name = "REGEX")]
    pub include: Option<String>,

    /// Skip packages whose normalized name starts with a match of this regex
    #[arg(short, long, value_name = "REGEX")]
    pub exclude: Option<String>,

    // Manifest and index
    /// Path to the manifest
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_MANIFEST)]
    pub file: PathBuf,

    /// Base URL of a package index serving the PyPI JSON API
    #[arg(long, value_name = "URL", default_value = PYPI_API_URL)]
    pub index_url: String,

    /// Package index host; the JSON API is expected under `<URL>/pypi`
    #[arg(long, value_name = "URL", conflicts_with = "index_url")]
    pub pkg_index: Option<String>,

    /// Raise upper bounds instead of staying below them
    #[arg(long)]
    pub replace_upper: bool,

    // Output options
    /// Dry run mode - show what would be updated without making changes
    #[arg(long)]
    pub dry_run: bool,

    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Enable quiet mode - no progress display
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}

impl CliArgs {
    /// Log level used when RUST_LOG is not set
    pub fn log_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "warn"
        }
    }

    /// Whether the progress spinner should be drawn
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.json
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = CliArgs::parse_from(["bumpdeps"]);
        assert!(args.extras.is_empty());
        assert!(!args.all);
        assert!(!args.base);
        assert!(!args.no_base);
        assert!(args.include.is_none());
        assert!(args.exclude.is_none());
        assert!(args.pkg_index.is_none());
        assert_eq!(args.file, PathBuf::from("pyproject.toml"));
        assert_eq!(args.index_url, "https://pypi.org/pypi");
        assert!(!args.replace_upper);
        assert!(!args.dry_run);
        assert!(!args.json);
        assert!(!args.quiet);
        assert!(!args.debug);
    }

    #[test]
    fn test_positional_extras() {
        let args = CliArgs::parse_from(["bumpdeps", "dev", "docs"]);
        assert_eq!(args.extras, vec!["dev", "docs"]);
    }

    #[test]
    fn test_group_flags() {
        let args = CliArgs::parse_from(["bumpdeps", "-a", "-b"]);
        assert!(args.all);
        assert!(args.base);

        let args = CliArgs::parse_from(["bumpdeps", "--no-base", "dev"]);
        assert!(args.no_base);
    }

    #[test]
    fn test_base_conflicts_with_no_base() {
        let result = CliArgs::try_parse_from(["bumpdeps", "--base", "--no-base"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_filter_flags() {
        let args = CliArgs::parse_from(["bumpdeps", "-i", "^foo", "-e", "bar$"]);
        assert_eq!(args.include.as_deref(), Some("^foo"));
        assert_eq!(args.exclude.as_deref(), Some("bar$"));
    }

    #[test]
    fn test_file_flag() {
        let args = CliArgs::parse_from(["bumpdeps", "-f", "sub/pyproject.toml"]);
        assert_eq!(args.file, PathBuf::from("sub/pyproject.toml"));
    }

    #[test]
    fn test_pkg_index_flag() {
        let args = CliArgs::parse_from(["bumpdeps", "--pkg-index", "https://test.pypi.org"]);
        assert_eq!(args.pkg_index.as_deref(), Some("https://test.pypi.org"));
        assert_eq!(args.index_url, "https://pypi.org/pypi");
    }

    #[test]
    fn test_pkg_index_conflicts_with_index_url() {
        let result = CliArgs::try_parse_from([
            "bumpdeps",
            "--pkg-index",
            "https://test.pypi.org",
            "--index-url",
            "https://test.pypi.org/pypi",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_log_level() {
        assert_eq!(CliArgs::parse_from(["bumpdeps"]).log_level(), "warn");
        assert_eq!(CliArgs::parse_from(["bumpdeps", "-d"]).log_level(), "debug");
    }

    #[test]
    fn test_show_progress() {
        assert!(CliArgs::parse_from(["bumpdeps"]).show_progress());
        assert!(!CliArgs::parse_from(["bumpdeps", "-q"]).show_progress());
        assert!(!CliArgs::parse_from(["bumpdeps", "--json"]).show_progress());
    }
}
