use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

pub mod classifier;
pub mod extractor;

pub use classifier::find_license_from_classifier;
pub use extractor::{find_site_packages_path, python_search_paths, resolve_search_paths, SitePackages};

/// Placeholder used for every metadata field the package does not declare.
pub const LICENSE_UNKNOWN: &str = "UNKNOWN";

/// License names resolved for one package. Ordered so that joining is
/// deterministic.
pub type LicenseSet = BTreeSet<String>;

/// Everything the collector knows about one installed distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageInfo {
    pub name: String,
    pub version: String,
    /// `License-Expression` or `License`; never empty.
    pub license: String,
    /// License labels from `License ::` classifiers, in declaration order.
    pub license_classifiers: Vec<String>,
    pub author: String,
    pub maintainer: String,
    pub home_page: String,
    pub summary: String,
    pub license_file: String,
    pub license_text: String,
    pub notice_file: String,
    pub notice_text: String,
}

impl PackageInfo {
    /// A record with only name and version known; all other fields hold the
    /// `UNKNOWN` placeholder.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        let unknown = || LICENSE_UNKNOWN.to_string();
        Self {
            name: name.into(),
            version: version.into(),
            license: unknown(),
            license_classifiers: Vec::new(),
            author: unknown(),
            maintainer: unknown(),
            home_page: unknown(),
            summary: unknown(),
            license_file: unknown(),
            license_text: unknown(),
            notice_file: unknown(),
            notice_text: unknown(),
        }
    }

    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        let license = license.into();
        self.license = if license.trim().is_empty() {
            LICENSE_UNKNOWN.to_string()
        } else {
            license
        };
        self
    }

    pub fn with_classifiers<I, S>(mut self, classifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.license_classifiers = classifiers.into_iter().map(Into::into).collect();
        self
    }

    /// Apply `f` to every text field, classifiers included.
    pub fn map_strings(mut self, f: impl Fn(&str) -> String) -> Self {
        for field in [
            &mut self.name,
            &mut self.version,
            &mut self.license,
            &mut self.author,
            &mut self.maintainer,
            &mut self.home_page,
            &mut self.summary,
            &mut self.license_file,
            &mut self.license_text,
            &mut self.notice_file,
            &mut self.notice_text,
        ] {
            *field = f(field.as_str());
        }
        self.license_classifiers = self.license_classifiers.iter().map(|c| f(c)).collect();
        self
    }

    /// Classifier licenses rendered for display, or `UNKNOWN` when there are none.
    pub fn classifier_display(&self) -> String {
        let set: LicenseSet = self.license_classifiers.iter().cloned().collect();
        if set.is_empty() {
            LICENSE_UNKNOWN.to_string()
        } else {
            join_licenses(&set)
        }
    }
}

/// Where the license of a package is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionStrategy {
    /// Always the declared `License` metadata.
    Meta,
    /// Always the trove classifiers.
    Classifier,
    /// Classifiers when present, the declared license otherwise.
    #[default]
    Mixed,
    /// Both sources side by side. Only meaningful for display.
    All,
}

impl ResolutionStrategy {
    pub const CHOICES: &'static str = "meta, classifier, mixed, all";
}

impl FromStr for ResolutionStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "meta" | "m" => Ok(Self::Meta),
            "classifier" | "c" => Ok(Self::Classifier),
            "mixed" | "mix" => Ok(Self::Mixed),
            "all" => Ok(Self::All),
            _ => Err(ConfigError::UnknownChoice {
                option: "from",
                value: s.to_string(),
                choices: Self::CHOICES,
            }),
        }
    }
}

impl fmt::Display for ResolutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Meta => "meta",
            Self::Classifier => "classifier",
            Self::Mixed => "mixed",
            Self::All => "all",
        };
        f.write_str(name)
    }
}

/// Pick the authoritative license set for one package.
///
/// `All` has no single authoritative source and falls through to the
/// declared license; callers wanting both columns read them from the
/// [`PackageInfo`] directly.
pub fn select_licenses(
    strategy: ResolutionStrategy,
    classifier_licenses: &[String],
    declared_license: &str,
) -> LicenseSet {
    let use_classifiers = match strategy {
        ResolutionStrategy::Classifier => true,
        ResolutionStrategy::Mixed => !classifier_licenses.is_empty(),
        ResolutionStrategy::Meta | ResolutionStrategy::All => false,
    };

    if use_classifiers {
        let set: LicenseSet = classifier_licenses.iter().cloned().collect();
        if set.is_empty() {
            LicenseSet::from([LICENSE_UNKNOWN.to_string()])
        } else {
            set
        }
    } else {
        LicenseSet::from([declared_license.to_string()])
    }
}

/// Canonical single-string rendering of a license set.
pub fn join_licenses(licenses: &LicenseSet) -> String {
    licenses.iter().map(String::as_str).collect::<Vec<_>>().join("; ")
}
