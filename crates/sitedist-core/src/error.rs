use thiserror::Error;

/// Errors raised while reading configuration from the environment. Every
/// variable has a default, so only malformed values fail.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Validation failures on domain values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("address is missing a {0}")]
    IncompleteAddress(&'static str),

    #[error("unknown result tag: {0}")]
    UnknownTag(String),
}
