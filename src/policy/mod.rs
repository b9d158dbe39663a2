pub mod config;
pub mod matcher;
pub mod checker;

// Re-export main types
pub use config::PolicyList;
pub use matcher::{exact_difference, exact_intersect, partial_difference, partial_intersect, MatchMode};
pub use checker::{Outcome, PolicyEnforcer, PolicyKind, PolicyViolation};
