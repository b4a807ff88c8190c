//! Refresh - the fixed four-step cache refresh sequence
//!
//! Steps always run in this order:
//!
//! 1. `glib-compile-schemas <schemas>`
//! 2. `gtk-update-icon-cache -t -f <icons>`
//! 3. `update-mime-database <mime>`
//! 4. `update-desktop-database <applications>`
//!
//! Each step prints a progress line before its tool runs. A tool that is
//! missing, exits non-zero or times out never stops the sequence and never
//! fails the hook; it is only reported through the warning callback and the
//! returned [`RefreshReport`].

use anyhow::{Context, Result};
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::backends::runner::{display_command, CommandRunner, RunStatus};
use crate::core::config::InstallConfig;
use crate::core::paths::TargetDirs;

/// One cache maintenance operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    CompileSchemas,
    UpdateIconCache,
    UpdateMimeDatabase,
    UpdateDesktopDatabase,
}

/// Execution order
pub const STEPS: [Step; 4] = [
    Step::CompileSchemas,
    Step::UpdateIconCache,
    Step::UpdateMimeDatabase,
    Step::UpdateDesktopDatabase,
];

impl Step {
    /// External tool invoked for this step
    pub fn program(self) -> &'static str {
        match self {
            Step::CompileSchemas => "glib-compile-schemas",
            Step::UpdateIconCache => "gtk-update-icon-cache",
            Step::UpdateMimeDatabase => "update-mime-database",
            Step::UpdateDesktopDatabase => "update-desktop-database",
        }
    }

    /// Line printed right before the tool runs
    pub fn progress_message(self) -> &'static str {
        match self {
            Step::CompileSchemas => "Compiling gsettings schemas…",
            Step::UpdateIconCache => "Updating icon cache…",
            Step::UpdateMimeDatabase => "Updating mimetype database…",
            Step::UpdateDesktopDatabase => "Updating desktop database…",
        }
    }

    /// Tool arguments for the given target directories
    pub fn args(self, dirs: &TargetDirs) -> Vec<OsString> {
        match self {
            Step::CompileSchemas => vec![dirs.schemas.clone().into_os_string()],
            // -t: skip the index.theme check, -f: rebuild even if up to date
            Step::UpdateIconCache => vec![
                OsString::from("-t"),
                OsString::from("-f"),
                dirs.icons.clone().into_os_string(),
            ],
            Step::UpdateMimeDatabase => vec![dirs.mime.clone().into_os_string()],
            Step::UpdateDesktopDatabase => vec![dirs.applications.clone().into_os_string()],
        }
    }
}

/// Result of one step as seen by the hook
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    Succeeded,
    Failed { code: Option<i32> },
    TimedOut { after_ms: u64 },
    NotLaunched { reason: String },
    Planned,
}

impl StepOutcome {
    pub fn is_failure(&self) -> bool {
        !matches!(self, StepOutcome::Succeeded | StepOutcome::Planned)
    }
}

impl From<RunStatus> for StepOutcome {
    fn from(status: RunStatus) -> Self {
        match status {
            RunStatus::Success => StepOutcome::Succeeded,
            RunStatus::Failed { code } => StepOutcome::Failed { code },
            RunStatus::TimedOut { after_ms } => StepOutcome::TimedOut { after_ms },
            RunStatus::Planned => StepOutcome::Planned,
        }
    }
}

/// A tolerated step failure, handed to the warning callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepWarning {
    pub step: Step,
    pub command: String,
    pub outcome: StepOutcome,
}

impl std::fmt::Display for StepWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.outcome {
            StepOutcome::Failed { code: Some(code) } => {
                write!(f, "`{}` exited with status {}", self.command, code)
            }
            StepOutcome::Failed { code: None } => {
                write!(f, "`{}` was terminated by a signal", self.command)
            }
            StepOutcome::TimedOut { after_ms } => {
                write!(f, "`{}` killed after {}ms", self.command, after_ms)
            }
            StepOutcome::NotLaunched { reason } => {
                write!(f, "`{}` could not be started: {}", self.command, reason)
            }
            StepOutcome::Succeeded | StepOutcome::Planned => {
                write!(f, "`{}` finished", self.command)
            }
        }
    }
}

/// Per-step entry of the report
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: Step,
    pub command: String,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

/// Everything one hook invocation did
#[derive(Debug, Clone, Serialize)]
pub struct RefreshReport {
    pub prefix: String,
    pub staged: bool,
    pub steps: Vec<StepReport>,
}

impl RefreshReport {
    pub fn failures(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|s| s.outcome.is_failure())
    }

    /// Write the report as pretty JSON
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json + "\n")
            .with_context(|| format!("Failed to write report: {}", path.display()))
    }
}

/// Refresh the desktop caches under the configured prefix.
///
/// Returns `Err` only when progress output cannot be written. Tool
/// failures are recorded in the report and passed to `on_warning`.
pub fn refresh(
    config: &InstallConfig,
    runner: &mut dyn CommandRunner,
    out: &mut dyn Write,
    mut on_warning: Option<&mut dyn FnMut(&StepWarning)>,
) -> Result<RefreshReport> {
    let dirs = config.target_dirs();
    let mut report = RefreshReport {
        prefix: config.prefix.to_string_lossy().into_owned(),
        staged: config.is_staged(),
        steps: Vec::new(),
    };

    if report.staged {
        log::debug!("staged install detected, leaving system caches untouched");
        return Ok(report);
    }

    for step in STEPS {
        writeln!(out, "{}", step.progress_message()).context("Failed to write progress")?;
        out.flush().context("Failed to write progress")?;

        let program = step.program();
        let args = step.args(&dirs);
        let command = display_command(program, &args);
        log::debug!("running {}", command);

        let outcome = match runner.run(program, &args) {
            Ok(status) => StepOutcome::from(status),
            Err(e) => StepOutcome::NotLaunched {
                reason: e.to_string(),
            },
        };

        if outcome.is_failure() {
            if let Some(callback) = on_warning.as_mut() {
                callback(&StepWarning {
                    step,
                    command: command.clone(),
                    outcome: outcome.clone(),
                });
            }
        }

        report.steps.push(StepReport {
            step,
            command,
            outcome,
        });
    }

    Ok(report)
}
