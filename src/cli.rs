use clap::Parser;
use std::path::PathBuf;

use pip_license_audit::codepage::CodePage;
use pip_license_audit::config::{Config, Settings};
use pip_license_audit::error::ConfigError;
use pip_license_audit::license::ResolutionStrategy;
use pip_license_audit::output::OutputFormat;
use pip_license_audit::policy::PolicyList;
use pip_license_audit::report::OrderBy;

#[derive(Parser, Debug)]
#[command(name = "pip-license-audit")]
#[command(about = "Dump the software license list of Python packages installed with pip")]
#[command(version)]
pub struct Cli {
    /// Site-packages directory or virtual environment to scan (repeatable)
    #[arg(long = "path", value_name = "PATH", help_heading = "Common options")]
    pub paths: Vec<PathBuf>,

    /// Python executable whose sys.path is searched for distributions
    #[arg(long, value_name = "PYTHON_EXEC", help_heading = "Common options")]
    pub python: Option<String>,

    /// Where to find license information: meta, classifier, mixed, all [default: mixed]
    #[arg(long, value_name = "SOURCE", help_heading = "Common options")]
    pub from: Option<ResolutionStrategy>,

    /// Order by column: count, license, name, author, maintainer, url [default: name]
    #[arg(short, long, value_name = "COL", help_heading = "Common options")]
    pub order: Option<OrderBy>,

    /// Output style: plain, plain-vertical, markdown, rst, confluence, html, json,
    /// json-license-finder, csv [default: plain]
    #[arg(short, long, value_name = "STYLE", help_heading = "Common options")]
    pub format: Option<OutputFormat>,

    /// Dump summary of each license
    #[arg(long, help_heading = "Common options")]
    pub summary: bool,

    /// Save license list to file
    #[arg(long, value_name = "FILE", help_heading = "Common options")]
    pub output_file: Option<PathBuf>,

    /// Ignore package name in dumped list (NAME or NAME:VERSION)
    #[arg(short, long, value_name = "PKG", num_args = 1.., help_heading = "Common options")]
    pub ignore_packages: Vec<String>,

    /// Only include selected packages in output
    #[arg(short, long, value_name = "PKG", num_args = 1.., help_heading = "Common options")]
    pub packages: Vec<String>,

    /// Dump with system packages
    #[arg(short = 's', long, help_heading = "Format options")]
    pub with_system: bool,

    /// Dump with package authors
    #[arg(short = 'a', long, help_heading = "Format options")]
    pub with_authors: bool,

    /// Dump with package maintainers
    #[arg(long, help_heading = "Format options")]
    pub with_maintainers: bool,

    /// Dump with package urls
    #[arg(short = 'u', long, help_heading = "Format options")]
    pub with_urls: bool,

    /// Dump with short package description
    #[arg(short = 'd', long, help_heading = "Format options")]
    pub with_description: bool,

    /// Dump without package version
    #[arg(long, help_heading = "Format options")]
    pub no_version: bool,

    /// Dump with location of license file and contents, most useful with JSON output
    #[arg(short = 'l', long, help_heading = "Format options")]
    pub with_license_file: bool,

    /// With --with-license-file, suppress location of license file output
    #[arg(long, help_heading = "Format options")]
    pub no_license_path: bool,

    /// With --with-license-file, dump with location of notice file and contents
    #[arg(long, help_heading = "Format options")]
    pub with_notice_file: bool,

    /// Filter input according to code page
    #[arg(long, help_heading = "Format options")]
    pub filter_strings: bool,

    /// Code page for --filter-strings [default: latin1]
    #[arg(long, value_name = "CODE", help_heading = "Format options")]
    pub filter_code_page: Option<CodePage>,

    /// Fail (exit with code 1) on the first occurrence of the licenses of the semicolon-separated list
    #[arg(long, value_name = "LICENSES", help_heading = "Verify options")]
    pub fail_on: Option<String>,

    /// Fail (exit with code 1) on the first occurrence of the licenses not in the semicolon-separated list
    #[arg(long, value_name = "LICENSES", help_heading = "Verify options")]
    pub allow_only: Option<String>,

    /// Enables partial matching for --allow-only/--fail-on
    #[arg(long, help_heading = "Verify options")]
    pub partial_match: bool,

    /// Enable debug logging on stderr
    #[arg(long)]
    pub verbose: bool,
}

impl Cli {
    /// Layer command-line values over the config-file defaults and validate
    /// the result.
    pub fn into_settings(self, config: &Config) -> Result<Settings, ConfigError> {
        let mut settings = Settings::from_config(config)?;

        settings.paths = self.paths;
        if self.python.is_some() {
            settings.python = self.python;
        }
        if let Some(from) = self.from {
            settings.from = from;
        }
        if let Some(order) = self.order {
            settings.order = order;
        }
        if let Some(format) = self.format {
            settings.format = format;
        }
        if self.output_file.is_some() {
            settings.output_file = self.output_file;
        }
        if !self.ignore_packages.is_empty() {
            settings.ignore_packages = self.ignore_packages;
        }
        if !self.packages.is_empty() {
            settings.packages = self.packages;
        }
        if let Some(code_page) = self.filter_code_page {
            settings.filter_code_page = code_page;
        }
        if let Some(fail_on) = self.fail_on.as_deref() {
            settings.fail_on = Some(PolicyList::parse("fail-on", fail_on)?);
        }
        if let Some(allow_only) = self.allow_only.as_deref() {
            settings.allow_only = Some(PolicyList::parse("allow-only", allow_only)?);
        }

        // CLI flags can only switch things on
        settings.summary |= self.summary;
        settings.with_system |= self.with_system;
        settings.with_authors |= self.with_authors;
        settings.with_maintainers |= self.with_maintainers;
        settings.with_urls |= self.with_urls;
        settings.with_description |= self.with_description;
        settings.no_version |= self.no_version;
        settings.with_license_file |= self.with_license_file;
        settings.no_license_path |= self.no_license_path;
        settings.with_notice_file |= self.with_notice_file;
        settings.filter_strings |= self.filter_strings;
        settings.partial_match |= self.partial_match;

        settings.validate()?;
        Ok(settings)
    }
}
