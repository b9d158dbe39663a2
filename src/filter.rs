use tracing::debug;

/// Packages that belong to the packaging toolchain itself and are hidden
/// unless `--with-system` is given.
pub const SYSTEM_PACKAGES: &[&str] = &["pip-license-audit", "pip", "setuptools", "wheel"];

/// Normalize a package name the way PEP 503 does: every run of `-`, `_` or
/// `.` becomes a single `-`, and the result is lower-cased.
pub fn normalize_pkg_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut in_delimiter = false;

    for ch in name.chars() {
        if matches!(ch, '-' | '_' | '.') {
            if !in_delimiter {
                normalized.push('-');
                in_delimiter = true;
            }
        } else {
            normalized.extend(ch.to_lowercase());
            in_delimiter = false;
        }
    }

    normalized
}

pub fn is_system_package(name: &str) -> bool {
    let name = normalize_pkg_name(name);
    SYSTEM_PACKAGES.iter().any(|system| *system == name)
}

/// Name-based include/exclude selection applied before licenses are resolved.
#[derive(Debug, Clone, Default)]
pub struct PackageFilter {
    include: Vec<String>,
    exclude: Vec<String>,
    with_system: bool,
}

impl PackageFilter {
    /// `exclude` entries are either bare names or `name:version` keys.
    pub fn new<I, E>(include: I, exclude: E, with_system: bool) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Self {
            include: include.into_iter().map(|n| normalize_pkg_name(n.as_ref())).collect(),
            exclude: exclude.into_iter().map(|n| normalize_pkg_name(n.as_ref())).collect(),
            with_system,
        }
    }

    /// Exclusion wins over inclusion; the system-package rule applies last.
    pub fn should_include(&self, name: &str, version: &str) -> bool {
        let normalized = normalize_pkg_name(name);
        let versioned = normalize_pkg_name(&format!("{}:{}", name, version));

        if self.exclude.iter().any(|e| *e == normalized || *e == versioned) {
            debug!(package = name, version, "excluded by ignore list");
            return false;
        }

        if !self.include.is_empty() && !self.include.contains(&normalized) {
            debug!(package = name, "not in package selection");
            return false;
        }

        if !self.with_system && is_system_package(name) {
            debug!(package = name, "system package skipped");
            return false;
        }

        true
    }
}
