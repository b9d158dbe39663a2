pub mod audit;
pub mod codepage;
pub mod config;
pub mod error;
pub mod filter;
pub mod license;
pub mod output;
pub mod policy;
pub mod report;

// Re-export main types for easy access
pub use audit::{AuditError, Auditor, PackageSource, ResolvedPackage, RowSink};
pub use config::{Config, Settings};
pub use error::ConfigError;
pub use filter::{normalize_pkg_name, PackageFilter};
pub use license::{select_licenses, LicenseSet, PackageInfo, ResolutionStrategy, LICENSE_UNKNOWN};
pub use policy::{MatchMode, Outcome, PolicyEnforcer, PolicyKind, PolicyList, PolicyViolation};
pub use report::LicenseCounter;
