//! The per-package pipeline: filter, resolve, enforce, emit.
//!
//! Packages are processed one at a time in the order the source yields them.
//! A policy rejection stops the run before the offending package (or any
//! later one) reaches the sink.

use anyhow::Result;
use thiserror::Error;
use tracing::debug;

use crate::codepage::CodePage;
use crate::config::Settings;
use crate::filter::PackageFilter;
use crate::license::{join_licenses, select_licenses, LicenseSet, PackageInfo, ResolutionStrategy};
use crate::policy::{MatchMode, Outcome, PolicyEnforcer, PolicyViolation};
use crate::report::{Field, Row};

/// Supplies installed package metadata.
pub trait PackageSource {
    fn packages(&self) -> Result<Vec<PackageInfo>>;
}

impl PackageSource for Vec<PackageInfo> {
    fn packages(&self) -> Result<Vec<PackageInfo>> {
        Ok(self.clone())
    }
}

/// Receives every package that passed filtering and policy.
pub trait RowSink {
    fn accept(&mut self, package: ResolvedPackage);
}

/// A package together with its resolved license set.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPackage {
    pub info: PackageInfo,
    pub licenses: LicenseSet,
}

impl ResolvedPackage {
    /// Flat field mapping handed to the presentation layer.
    pub fn to_row(&self) -> Row {
        let info = &self.info;
        Row::new()
            .with(Field::Name, info.name.as_str())
            .with(Field::Version, info.version.as_str())
            .with(Field::License, join_licenses(&self.licenses))
            .with(Field::LicenseMetadata, info.license.as_str())
            .with(Field::LicenseClassifier, info.classifier_display())
            .with(Field::Author, info.author.as_str())
            .with(Field::Maintainer, info.maintainer.as_str())
            .with(Field::Url, info.home_page.as_str())
            .with(Field::Description, info.summary.as_str())
            .with(Field::LicenseFile, info.license_file.as_str())
            .with(Field::LicenseText, info.license_text.as_str())
            .with(Field::NoticeFile, info.notice_file.as_str())
            .with(Field::NoticeText, info.notice_text.as_str())
    }
}

#[derive(Debug, Error)]
pub enum AuditError {
    #[error(transparent)]
    Policy(#[from] PolicyViolation),

    #[error("failed to collect installed packages")]
    Source(#[source] anyhow::Error),
}

#[derive(Debug, Clone, Default)]
pub struct Auditor {
    strategy: ResolutionStrategy,
    filter: PackageFilter,
    enforcer: PolicyEnforcer,
    code_page: Option<CodePage>,
}

impl Auditor {
    pub fn new(strategy: ResolutionStrategy, filter: PackageFilter, enforcer: PolicyEnforcer) -> Self {
        Self {
            strategy,
            filter,
            enforcer,
            code_page: None,
        }
    }

    /// Strip characters outside `code_page` from every field before resolving.
    pub fn with_string_filter(mut self, code_page: CodePage) -> Self {
        self.code_page = Some(code_page);
        self
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let filter = PackageFilter::new(&settings.packages, &settings.ignore_packages, settings.with_system);
        let enforcer = PolicyEnforcer::new(
            settings.fail_on.clone().unwrap_or_default(),
            settings.allow_only.clone().unwrap_or_default(),
            MatchMode::from_partial_flag(settings.partial_match),
        );

        let auditor = Self::new(settings.from, filter, enforcer);
        if settings.filter_strings {
            auditor.with_string_filter(settings.filter_code_page)
        } else {
            auditor
        }
    }

    /// Resolve one package and check it against the policy. `None` means the
    /// filter dropped it.
    pub fn process(&self, package: PackageInfo) -> Result<Option<ResolvedPackage>, PolicyViolation> {
        if !self.filter.should_include(&package.name, &package.version) {
            return Ok(None);
        }

        let package = match self.code_page {
            Some(code_page) => package.map_strings(|s| code_page.filter(s)),
            None => package,
        };

        let licenses = select_licenses(self.strategy, &package.license_classifiers, &package.license);
        debug!(package = %package.name, licenses = %join_licenses(&licenses), "resolved");

        // Policy lists are never combined with `--from all`.
        if self.strategy != ResolutionStrategy::All {
            if let Outcome::Reject { kind, offending } = self.enforcer.enforce(&licenses) {
                return Err(PolicyViolation::new(kind, &package.name, &package.version, offending));
            }
        }

        Ok(Some(ResolvedPackage {
            info: package,
            licenses,
        }))
    }

    /// Feed every accepted package from `source` into `sink`. Returns the
    /// number of packages accepted.
    pub fn run(&self, source: &dyn PackageSource, sink: &mut dyn RowSink) -> Result<usize, AuditError> {
        let packages = source.packages().map_err(AuditError::Source)?;
        let mut accepted = 0;

        for package in packages {
            if let Some(resolved) = self.process(package)? {
                sink.accept(resolved);
                accepted += 1;
            }
        }

        Ok(accepted)
    }
}
