use crate::error::ConfigError;
use crate::license::LicenseSet;

/// A set of license names given as a semicolon-separated string.
///
/// Entries keep the casing they were written with; every comparison against
/// them is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PolicyList {
    licenses: LicenseSet,
}

impl PolicyList {
    pub fn is_empty(&self) -> bool {
        self.licenses.is_empty()
    }

    pub fn licenses(&self) -> &LicenseSet {
        &self.licenses
    }

    /// Parse the value of `--{option}`. Blank entries are dropped, and a list
    /// with no entries at all is rejected.
    pub fn parse(option: &'static str, value: &str) -> Result<Self, ConfigError> {
        let licenses: LicenseSet = value
            .split(';')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect();

        if licenses.is_empty() {
            return Err(ConfigError::EmptyPolicyList { option });
        }
        Ok(Self { licenses })
    }
}
