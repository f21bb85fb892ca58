//! Run configuration
//!
//! Resolves CLI arguments and the optional `[tool.bumpdeps]` table of the
//! manifest into a single [`RunConfig`]. CLI values take precedence:
//!
//! ```toml
//! [tool.bumpdeps]
//! include = "^(django|celery)"
//! exclude = ".*-stubs$"
//! replace-upper-bounds = false
//! ```

use crate::cli::CliArgs;
use crate::error::ConfigError;
use crate::manifest::DEFAULT_MANIFEST;
use crate::registry::PYPI_API_URL;
use crate::update::{UpdateFilter, UpperBoundPolicy};
use reqwest::Url;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings read from `[tool.bumpdeps]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ToolSettings {
    pub include: Option<String>,
    pub exclude: Option<String>,
    pub replace_upper_bounds: Option<bool>,
}

#[derive(Deserialize, Default)]
struct PyprojectTool {
    #[serde(default)]
    tool: ToolTable,
}

#[derive(Deserialize, Default)]
struct ToolTable {
    bumpdeps: Option<ToolSettings>,
}

impl ToolSettings {
    /// Read settings from manifest content; a missing table gives defaults
    pub fn from_manifest(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let parsed: PyprojectTool =
            toml::from_str(content).map_err(|e| ConfigError::InvalidSettings {
                path: path.to_path_buf(),
                message: e.message().to_string(),
            })?;
        Ok(parsed.tool.bumpdeps.unwrap_or_default())
    }
}

/// Which dependency arrays to process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupSelection {
    /// Extras named on the command line
    pub extras: Vec<String>,
    /// Every declared extra
    pub all: bool,
    /// Force the base group
    pub base: bool,
    /// Suppress the base group
    pub no_base: bool,
}

impl GroupSelection {
    /// Base is on unless suppressed; naming extras alone turns it off
    pub fn includes_base(&self) -> bool {
        !self.no_base && (self.base || self.all || self.extras.is_empty())
    }
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub file_path: PathBuf,
    pub groups: GroupSelection,
    pub include: Option<String>,
    pub exclude: Option<String>,
    pub index_url: String,
    pub dry_run: bool,
    pub upper_bounds: UpperBoundPolicy,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            file_path: PathBuf::from(DEFAULT_MANIFEST),
            groups: GroupSelection::default(),
            include: None,
            exclude: None,
            index_url: PYPI_API_URL.to_string(),
            dry_run: false,
            upper_bounds: UpperBoundPolicy::default(),
        }
    }
}

impl RunConfig {
    /// Configuration for a manifest path with every other option defaulted
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            ..Self::default()
        }
    }

    /// Resolve CLI arguments, validating what can be checked up front
    pub fn from_args(args: &CliArgs) -> Result<Self, ConfigError> {
        if args.base && args.no_base {
            return Err(ConfigError::ConflictingOptions {
                message: "--base and --no-base cannot be used together".to_string(),
            });
        }

        let config = Self {
            file_path: args.file.clone(),
            groups: GroupSelection {
                extras: args.extras.clone(),
                all: args.all,
                base: args.base,
                no_base: args.no_base,
            },
            include: args.include.clone(),
            exclude: args.exclude.clone(),
            index_url: match &args.pkg_index {
                Some(host) => validate_index_url(&pkg_index_api(host))?,
                None => validate_index_url(&args.index_url)?,
            },
            dry_run: args.dry_run,
            upper_bounds: if args.replace_upper {
                UpperBoundPolicy::Replace
            } else {
                UpperBoundPolicy::Respect
            },
        };
        config.filter()?;
        Ok(config)
    }

    /// Fill options the CLI left unset from `[tool.bumpdeps]`
    pub fn merge_settings(mut self, settings: &ToolSettings) -> Self {
        if self.include.is_none() {
            self.include = settings.include.clone();
        }
        if self.exclude.is_none() {
            self.exclude = settings.exclude.clone();
        }
        if self.upper_bounds == UpperBoundPolicy::Respect
            && settings.replace_upper_bounds == Some(true)
        {
            self.upper_bounds = UpperBoundPolicy::Replace;
        }
        self
    }

    /// Compile the include/exclude patterns
    pub fn filter(&self) -> Result<UpdateFilter, ConfigError> {
        let mut filter = UpdateFilter::new();
        if let Some(pattern) = &self.include {
            filter = filter.with_include(pattern)?;
        }
        if let Some(pattern) = &self.exclude {
            filter = filter.with_exclude(pattern)?;
        }
        Ok(filter)
    }

    pub fn with_extras<I, S>(mut self, extras: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.extras = extras.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_all(mut self) -> Self {
        self.groups.all = true;
        self
    }

    pub fn with_base(mut self) -> Self {
        self.groups.base = true;
        self
    }

    pub fn without_base(mut self) -> Self {
        self.groups.no_base = true;
        self
    }

    pub fn with_include(mut self, pattern: impl Into<String>) -> Self {
        self.include = Some(pattern.into());
        self
    }

    pub fn with_exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude = Some(pattern.into());
        self
    }

    pub fn with_index_url(mut self, url: impl Into<String>) -> Self {
        self.index_url = url.into();
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_upper_bounds(mut self, policy: UpperBoundPolicy) -> Self {
        self.upper_bounds = policy;
        self
    }
}

/// JSON API root under a package index host (`https://test.pypi.org` gives
/// `https://test.pypi.org/pypi`)
fn pkg_index_api(host: &str) -> String {
    format!("{}/pypi", host.trim_end_matches('/'))
}

fn validate_index_url(raw: &str) -> Result<String, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidIndexUrl {
        url: raw.to_string(),
        message,
    };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(raw.trim_end_matches('/').to_string()),
        other => Err(invalid(format!("unsupported scheme '{}'", other))),
    }
}
