//! Install configuration
//!
//! The hook reads the process environment exactly once, at entry, and
//! carries the result in an [`InstallConfig`]. Everything downstream works
//! from that struct, so tests can build one from a fake environment.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::error::ConfigError;
use crate::core::paths::TargetDirs;

/// Environment variable Meson sets to the configured install prefix
pub const PREFIX_VAR: &str = "MESON_INSTALL_PREFIX";

/// Environment variable marking a staged install
pub const DESTDIR_VAR: &str = "DESTDIR";

/// Configuration for one hook invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallConfig {
    /// Root under which `share/...` is resolved
    pub prefix: PathBuf,

    /// Raw staged-install marker, if present
    pub destdir: Option<OsString>,

    /// Per-tool timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl InstallConfig {
    /// Build from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let prefix = lookup(PREFIX_VAR)
            .map(PathBuf::from)
            .ok_or(ConfigError::MissingPrefix { var: PREFIX_VAR })?;

        Ok(Self {
            prefix,
            destdir: lookup(DESTDIR_VAR),
            timeout: None,
        })
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// A staged install has a non-empty marker. An empty value counts as
    /// unset; whitespace-only values count as set.
    pub fn is_staged(&self) -> bool {
        self.destdir.as_ref().is_some_and(|v| !v.is_empty())
    }

    pub fn target_dirs(&self) -> TargetDirs {
        TargetDirs::under(&self.prefix)
    }
}
