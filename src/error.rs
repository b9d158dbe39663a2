use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building a run configuration, before any package is
/// looked at.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid choice '{value}' for --{option} (choose from {choices})")]
    UnknownChoice {
        option: &'static str,
        value: String,
        choices: &'static str,
    },

    #[error("invalid code page '{0}' given for --filter-code-page")]
    UnknownCodePage(String),

    #[error("'--no-license-path' and '--with-notice-file' require the '--with-license-file' option to be set")]
    LicenseFileRequired,

    #[error("'--filter-code-page' requires the '--filter-strings' option to be set")]
    FilterStringsRequired,

    #[error("'--fail-on' and '--allow-only' cannot be combined with '--from all'")]
    PolicyWithAllSources,

    #[error("--{option} was given but lists no licenses")]
    EmptyPolicyList { option: &'static str },

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
