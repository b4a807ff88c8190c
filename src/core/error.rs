//! Fatal configuration errors

use thiserror::Error;

/// Errors that abort the hook before any tool is invoked
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The install prefix variable is not set in the environment
    #[error("{var} is not set; run this hook from `meson install` or pass --prefix")]
    MissingPrefix { var: &'static str },
}
