use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::codepage::CodePage;
use crate::error::ConfigError;
use crate::license::ResolutionStrategy;
use crate::output::OutputFormat;
use crate::policy::PolicyList;
use crate::report::OrderBy;

/// Section of `pyproject.toml` holding defaults for every option.
pub const CONFIG_SECTION: &str = "pip-license-audit";

/// Option defaults from `[tool.pip-license-audit]`. Keys mirror the long
/// command-line option names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub python: Option<String>,
    pub from: Option<String>,
    pub order: Option<String>,
    pub format: Option<String>,
    pub summary: Option<bool>,
    pub output_file: Option<PathBuf>,
    pub ignore_packages: Option<Vec<String>>,
    pub packages: Option<Vec<String>>,
    pub with_system: Option<bool>,
    pub with_authors: Option<bool>,
    pub with_maintainers: Option<bool>,
    pub with_urls: Option<bool>,
    pub with_description: Option<bool>,
    pub no_version: Option<bool>,
    pub with_license_file: Option<bool>,
    pub no_license_path: Option<bool>,
    pub with_notice_file: Option<bool>,
    pub filter_strings: Option<bool>,
    pub filter_code_page: Option<String>,
    pub fail_on: Option<String>,
    pub allow_only: Option<String>,
    pub partial_match: Option<bool>,
}

/// Load configuration from `pyproject.toml` in the current directory.
pub fn load_config() -> Result<Config, ConfigError> {
    let pyproject_path = std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("pyproject.toml");
    load_config_from(&pyproject_path)
}

/// A missing file, or one without our section, yields the defaults.
pub fn load_config_from(pyproject_path: &Path) -> Result<Config, ConfigError> {
    if !pyproject_path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(pyproject_path).map_err(|source| ConfigError::Read {
        path: pyproject_path.to_path_buf(),
        source,
    })?;

    let pyproject: toml::Value = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: pyproject_path.to_path_buf(),
        source,
    })?;

    // Extract [tool.pip-license-audit] section
    if let Some(section) = pyproject.get("tool").and_then(|tool| tool.get(CONFIG_SECTION)) {
        return section.clone().try_into().map_err(|source| ConfigError::Parse {
            path: pyproject_path.to_path_buf(),
            source,
        });
    }

    Ok(Config::default())
}

/// Fully resolved options for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    /// Site-packages directories or virtualenvs to scan.
    pub paths: Vec<PathBuf>,
    pub python: Option<String>,
    pub from: ResolutionStrategy,
    pub order: OrderBy,
    pub format: OutputFormat,
    pub summary: bool,
    pub output_file: Option<PathBuf>,
    pub ignore_packages: Vec<String>,
    pub packages: Vec<String>,
    pub with_system: bool,
    pub with_authors: bool,
    pub with_maintainers: bool,
    pub with_urls: bool,
    pub with_description: bool,
    pub no_version: bool,
    pub with_license_file: bool,
    pub no_license_path: bool,
    pub with_notice_file: bool,
    pub filter_strings: bool,
    pub filter_code_page: CodePage,
    pub fail_on: Option<PolicyList>,
    pub allow_only: Option<PolicyList>,
    pub partial_match: bool,
}

impl Settings {
    /// Defaults taken from a config file. Choice values are parsed here so a
    /// bad alias fails before anything is scanned.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            paths: Vec::new(),
            python: config.python.clone(),
            from: parse_or_default(config.from.as_deref())?,
            order: parse_or_default(config.order.as_deref())?,
            format: parse_or_default(config.format.as_deref())?,
            summary: config.summary.unwrap_or(false),
            output_file: config.output_file.clone(),
            ignore_packages: config.ignore_packages.clone().unwrap_or_default(),
            packages: config.packages.clone().unwrap_or_default(),
            with_system: config.with_system.unwrap_or(false),
            with_authors: config.with_authors.unwrap_or(false),
            with_maintainers: config.with_maintainers.unwrap_or(false),
            with_urls: config.with_urls.unwrap_or(false),
            with_description: config.with_description.unwrap_or(false),
            no_version: config.no_version.unwrap_or(false),
            with_license_file: config.with_license_file.unwrap_or(false),
            no_license_path: config.no_license_path.unwrap_or(false),
            with_notice_file: config.with_notice_file.unwrap_or(false),
            filter_strings: config.filter_strings.unwrap_or(false),
            filter_code_page: parse_or_default(config.filter_code_page.as_deref())?,
            fail_on: config
                .fail_on
                .as_deref()
                .map(|value| PolicyList::parse("fail-on", value))
                .transpose()?,
            allow_only: config
                .allow_only
                .as_deref()
                .map(|value| PolicyList::parse("allow-only", value))
                .transpose()?,
            partial_match: config.partial_match.unwrap_or(false),
        })
    }

    /// Reject option combinations that have no defined meaning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.with_license_file && (self.no_license_path || self.with_notice_file) {
            return Err(ConfigError::LicenseFileRequired);
        }
        if !self.filter_strings && self.filter_code_page != CodePage::default() {
            return Err(ConfigError::FilterStringsRequired);
        }
        if self.from == ResolutionStrategy::All && (self.fail_on.is_some() || self.allow_only.is_some()) {
            return Err(ConfigError::PolicyWithAllSources);
        }
        Ok(())
    }
}

fn parse_or_default<T>(value: Option<&str>) -> Result<T, ConfigError>
where
    T: std::str::FromStr<Err = ConfigError> + Default,
{
    value.map(str::parse).transpose().map(Option::unwrap_or_default)
}
