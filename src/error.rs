//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ParseError: a single dependency entry could not be parsed (recoverable)
//! - RegistryError: package index lookup failed (recoverable per package)
//! - ManifestError: the manifest could not be read, parsed or written (fatal)
//! - ConfigError: invalid flags or configuration (fatal)

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Manifest file related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// HTTP client could not be set up
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Every index lookup of the run failed to connect
    #[error("package index {index_url} is unreachable ({failures} lookups failed)")]
    IndexUnreachable { index_url: String, failures: usize },
}

impl AppError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) => 2,
            AppError::Manifest(_)
            | AppError::Registry(_)
            | AppError::IndexUnreachable { .. } => 1,
        }
    }
}

/// Errors raised while parsing a single dependency entry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Entry does not start with a valid distribution name
    #[error("expected a package name in '{input}'")]
    MissingName { input: String },

    /// Extras list is missing its closing bracket
    #[error("unbalanced brackets in '{input}'")]
    UnbalancedBrackets { input: String },

    /// Parenthesized constraint is missing its closing parenthesis
    #[error("unbalanced parentheses in '{input}'")]
    UnbalancedParentheses { input: String },

    /// Invalid extra name
    #[error("invalid extra name '{name}'")]
    InvalidExtra { name: String },

    /// Clause does not start with a known comparison operator
    #[error("invalid operator in version clause '{clause}'")]
    InvalidOperator { clause: String },

    /// Version text is not a valid PEP 440 version
    #[error("invalid version '{version}'")]
    InvalidVersion { version: String },

    /// Operator and version cannot be combined (e.g. `>=1.*`)
    #[error("operator '{operator}' cannot be used with version '{version}'")]
    UnsupportedClause { operator: String, version: String },

    /// Environment marker is empty or malformed
    #[error("invalid environment marker '{marker}'")]
    InvalidMarker { marker: String },

    /// Nothing follows `@`
    #[error("missing URL after '@' in '{input}'")]
    MissingUrl { input: String },

    /// Trailing text after a complete specifier
    #[error("unexpected text '{text}'")]
    UnexpectedText { text: String },

    /// Array element is not a string
    #[error("dependency entry is not a string: {value}")]
    NotAString { value: String },

    /// `ignore-until` directive without a `=YYYY-MM-DD` value
    #[error("invalid format for ignore-until: '{directive}'")]
    InvalidIgnoreUntil { directive: String },

    /// `ignore-until` date that is not a real calendar date
    #[error("invalid date provided for ignore-until: '{date}'")]
    InvalidDate { date: String },

    /// `bumpdeps:` comment with an unknown body
    #[error("unknown bumpdeps directive '{directive}'")]
    UnknownDirective { directive: String },
}

impl ParseError {
    /// Creates a new InvalidVersion error
    pub fn invalid_version(version: impl Into<String>) -> Self {
        ParseError::InvalidVersion {
            version: version.into(),
        }
    }

    /// Creates a new InvalidOperator error
    pub fn invalid_operator(clause: impl Into<String>) -> Self {
        ParseError::InvalidOperator {
            clause: clause.into(),
        }
    }

    /// Creates a new UnsupportedClause error
    pub fn unsupported_clause(operator: impl Into<String>, version: impl Into<String>) -> Self {
        ParseError::UnsupportedClause {
            operator: operator.into(),
            version: version.into(),
        }
    }
}

/// Errors related to manifest file operations
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest file not found
    #[error("manifest file not found: {path}")]
    NotFound { path: PathBuf },

    /// Failed to read manifest file
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write manifest file
    #[error("failed to write manifest file {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML syntax error
    #[error("failed to parse TOML in {path}: {message}")]
    TomlParseError { path: PathBuf, message: String },

    /// No `[project]` table in the manifest
    #[error("no [project] table found in {path}")]
    MissingProject { path: PathBuf },

    /// A dependency key exists but is not an array
    #[error("'{key}' in {path} is not an array")]
    MalformedDependencies { path: PathBuf, key: String },
}

impl ManifestError {
    /// Creates a new NotFound error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        ManifestError::NotFound { path: path.into() }
    }

    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new WriteError
    pub fn write_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::WriteError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new TomlParseError
    pub fn toml_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::TomlParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new MissingProject error
    pub fn missing_project(path: impl Into<PathBuf>) -> Self {
        ManifestError::MissingProject { path: path.into() }
    }

    /// Creates a new MalformedDependencies error
    pub fn malformed(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        ManifestError::MalformedDependencies {
            path: path.into(),
            key: key.into(),
        }
    }
}

/// Errors related to package index lookups
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Package not found in the index
    #[error("package '{package}' not found in {registry}")]
    PackageNotFound { package: String, registry: String },

    /// Network request failed
    #[error("failed to fetch package '{package}' from {registry}: {message}")]
    NetworkError {
        package: String,
        registry: String,
        message: String,
    },

    /// Rate limit exceeded
    #[error("rate limit exceeded for {registry}")]
    RateLimitExceeded { registry: String },

    /// Invalid response from the index
    #[error("invalid response from {registry} for '{package}': {message}")]
    InvalidResponse {
        package: String,
        registry: String,
        message: String,
    },

    /// Timeout
    #[error("timeout while fetching '{package}' from {registry}")]
    Timeout { package: String, registry: String },
}

impl RegistryError {
    /// Creates a new PackageNotFound error
    pub fn package_not_found(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::PackageNotFound {
            package: package.into(),
            registry: registry.into(),
        }
    }

    /// Creates a new NetworkError
    pub fn network_error(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::NetworkError {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new RateLimitExceeded error
    pub fn rate_limit_exceeded(registry: impl Into<String>) -> Self {
        RegistryError::RateLimitExceeded {
            registry: registry.into(),
        }
    }

    /// Creates a new InvalidResponse error
    pub fn invalid_response(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::InvalidResponse {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::Timeout {
            package: package.into(),
            registry: registry.into(),
        }
    }

    /// True when the index could not be reached at all
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            RegistryError::NetworkError { .. } | RegistryError::Timeout { .. }
        )
    }
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Include/exclude pattern does not compile
    #[error("invalid {option} pattern '{pattern}': {message}")]
    InvalidRegex {
        option: &'static str,
        pattern: String,
        message: String,
    },

    /// Requested extras group is not declared in the manifest
    #[error("optional dependency group '{name}' not found in {path}")]
    UnknownExtra { name: String, path: PathBuf },

    /// Index URL is not an absolute http(s) URL
    #[error("invalid index URL '{url}': {message}")]
    InvalidIndexUrl { url: String, message: String },

    /// `[tool.bumpdeps]` table has the wrong shape
    #[error("invalid [tool.bumpdeps] settings in {path}: {message}")]
    InvalidSettings { path: PathBuf, message: String },

    /// Conflicting options
    #[error("conflicting options: {message}")]
    ConflictingOptions { message: String },
}

impl ConfigError {
    /// Creates a new InvalidRegex error
    pub fn invalid_regex(
        option: &'static str,
        pattern: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ConfigError::InvalidRegex {
            option,
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Creates a new UnknownExtra error
    pub fn unknown_extra(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        ConfigError::UnknownExtra {
            name: name.into(),
            path: path.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_error_not_found() {
        let err = ManifestError::not_found("/path/to/pyproject.toml");
        let msg = format!("{}", err);
        assert!(msg.contains("manifest file not found"));
        assert!(msg.contains("pyproject.toml"));
    }

    #[test]
    fn test_manifest_error_toml_parse() {
        let err = ManifestError::toml_parse_error("/path/to/pyproject.toml", "invalid key");
        let msg = format!("{}", err);
        assert!(msg.contains("failed to parse TOML"));
        assert!(msg.contains("invalid key"));
    }

    #[test]
    fn test_manifest_error_missing_project() {
        let err = ManifestError::missing_project("pyproject.toml");
        assert!(format!("{}", err).contains("no [project] table"));
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::invalid_operator("!! 1.2.3");
        let msg = format!("{}", err);
        assert!(msg.contains("invalid operator"));
        assert!(msg.contains("!! 1.2.3"));

        let err = ParseError::InvalidDate {
            date: "2023-02-30".to_string(),
        };
        assert!(format!("{}", err).contains("2023-02-30"));
    }

    #[test]
    fn test_registry_error_package_not_found() {
        let err = RegistryError::package_not_found("nonexistent-package", "PyPI");
        let msg = format!("{}", err);
        assert!(msg.contains("package 'nonexistent-package' not found"));
        assert!(msg.contains("PyPI"));
    }

    #[test]
    fn test_registry_error_network() {
        let err = RegistryError::network_error("requests", "PyPI", "connection refused");
        let msg = format!("{}", err);
        assert!(msg.contains("failed to fetch"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_registry_error_connectivity() {
        assert!(RegistryError::network_error("a", "PyPI", "refused").is_connectivity());
        assert!(RegistryError::timeout("a", "PyPI").is_connectivity());
        assert!(!RegistryError::package_not_found("a", "PyPI").is_connectivity());
        assert!(!RegistryError::rate_limit_exceeded("PyPI").is_connectivity());
        assert!(!RegistryError::invalid_response("a", "PyPI", "bad json").is_connectivity());
    }

    #[test]
    fn test_config_error_invalid_regex() {
        let err = ConfigError::invalid_regex("include", "foo(", "unclosed group");
        let msg = format!("{}", err);
        assert!(msg.contains("invalid include pattern"));
        assert!(msg.contains("foo("));
    }

    #[test]
    fn test_config_error_unknown_extra() {
        let err = ConfigError::unknown_extra("docs", "pyproject.toml");
        let msg = format!("{}", err);
        assert!(msg.contains("'docs' not found"));
    }

    #[test]
    fn test_app_error_from_manifest_error() {
        let app_err: AppError = ManifestError::not_found("/path").into();
        assert!(format!("{}", app_err).contains("manifest file not found"));
        assert_eq!(app_err.exit_code(), 1);
    }

    #[test]
    fn test_app_error_exit_codes() {
        let config: AppError = ConfigError::unknown_extra("x", "pyproject.toml").into();
        assert_eq!(config.exit_code(), 2);

        let unreachable = AppError::IndexUnreachable {
            index_url: "http://127.0.0.1:9".to_string(),
            failures: 3,
        };
        assert_eq!(unreachable.exit_code(), 1);
        assert!(format!("{}", unreachable).contains("unreachable"));
    }
}
