use crate::license::LicenseSet;

/// How a license name is compared with a policy entry. Both modes ignore case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Whole-name equality.
    #[default]
    Exact,
    /// The policy entry appears anywhere inside the license name.
    Partial,
}

impl MatchMode {
    pub fn from_partial_flag(partial: bool) -> Self {
        if partial {
            MatchMode::Partial
        } else {
            MatchMode::Exact
        }
    }

    /// Does `license` match any entry of `terms`?
    pub fn matches_any<'a, I>(self, license: &str, terms: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        let license = license.to_lowercase();
        terms.into_iter().any(|term| {
            let term = term.to_lowercase();
            match self {
                MatchMode::Exact => license == term,
                MatchMode::Partial => license.contains(&term),
            }
        })
    }

    /// Elements of `a` that match some element of `b`, in `a`'s casing.
    pub fn intersect(self, a: &LicenseSet, b: &LicenseSet) -> LicenseSet {
        a.iter().filter(|license| self.matches_any(license, b)).cloned().collect()
    }

    /// Elements of `a` that match no element of `b`, in `a`'s casing.
    pub fn difference(self, a: &LicenseSet, b: &LicenseSet) -> LicenseSet {
        a.iter().filter(|license| !self.matches_any(license, b)).cloned().collect()
    }
}

pub fn exact_intersect(a: &LicenseSet, b: &LicenseSet) -> LicenseSet {
    MatchMode::Exact.intersect(a, b)
}

pub fn exact_difference(a: &LicenseSet, b: &LicenseSet) -> LicenseSet {
    MatchMode::Exact.difference(a, b)
}

pub fn partial_intersect(a: &LicenseSet, b: &LicenseSet) -> LicenseSet {
    MatchMode::Partial.intersect(a, b)
}

pub fn partial_difference(a: &LicenseSet, b: &LicenseSet) -> LicenseSet {
    MatchMode::Partial.difference(a, b)
}
