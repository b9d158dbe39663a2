use std::fmt;

use super::config::PolicyList;
use super::matcher::MatchMode;
use crate::license::{join_licenses, LicenseSet};

/// Which list rejected a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    FailOn,
    AllowOnly,
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::FailOn => f.write_str("fail-on"),
            PolicyKind::AllowOnly => f.write_str("allow-only"),
        }
    }
}

/// Result of checking one package's licenses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    /// Stop the run. `offending` holds the licenses that matched the deny
    /// list, or the ones not covered by the allow list.
    Reject { kind: PolicyKind, offending: LicenseSet },
}

/// The fail-on and allow-only lists of one run.
#[derive(Debug, Clone, Default)]
pub struct PolicyEnforcer {
    fail_on: PolicyList,
    allow_only: PolicyList,
    mode: MatchMode,
}

impl PolicyEnforcer {
    pub fn new(fail_on: PolicyList, allow_only: PolicyList, mode: MatchMode) -> Self {
        Self {
            fail_on,
            allow_only,
            mode,
        }
    }

    /// Check a resolved license set against both lists.
    ///
    /// Any license on the fail-on list rejects. The allow-only list rejects
    /// only when none of the licenses is allowed, so a dual-licensed package
    /// passes as soon as one of its licenses is acceptable.
    pub fn enforce(&self, licenses: &LicenseSet) -> Outcome {
        if !self.fail_on.is_empty() {
            let failed = self.mode.intersect(licenses, self.fail_on.licenses());
            if !failed.is_empty() {
                return Outcome::Reject {
                    kind: PolicyKind::FailOn,
                    offending: failed,
                };
            }
        }

        if !self.allow_only.is_empty() {
            let uncovered = self.mode.difference(licenses, self.allow_only.licenses());
            if uncovered.len() == licenses.len() {
                return Outcome::Reject {
                    kind: PolicyKind::AllowOnly,
                    offending: uncovered,
                };
            }
        }

        Outcome::Continue
    }
}

/// A package that stopped the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyViolation {
    pub kind: PolicyKind,
    pub package_name: String,
    pub package_version: String,
    /// Sorted.
    pub offending_licenses: Vec<String>,
}

impl PolicyViolation {
    pub fn new(kind: PolicyKind, package_name: &str, package_version: &str, offending: LicenseSet) -> Self {
        Self {
            kind,
            package_name: package_name.to_string(),
            package_version: package_version.to_string(),
            offending_licenses: offending.into_iter().collect(),
        }
    }
}

impl fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let licenses = join_licenses(&self.offending_licenses.iter().cloned().collect());
        match self.kind {
            PolicyKind::FailOn => write!(
                f,
                "fail-on license {} was found for package {}:{}",
                licenses, self.package_name, self.package_version
            ),
            PolicyKind::AllowOnly => write!(
                f,
                "license {} not in allow-only licenses was found for package {}:{}",
                licenses, self.package_name, self.package_version
            ),
        }
    }
}

impl std::error::Error for PolicyViolation {}
