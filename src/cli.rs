//! CLI module - Command-line interface definitions and handlers

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::Duration;

use crate::backends::refresh::{refresh, StepWarning};
use crate::backends::runner::{CommandRunner, DryRunRunner, SystemRunner};
use crate::core::config::{InstallConfig, PREFIX_VAR};

/// desktop-postinstall - refresh desktop caches after `meson install`.
#[derive(Parser, Debug)]
#[command(name = "desktop-postinstall")]
#[command(
    author,
    version,
    about,
    long_about = r#"Meson post-install hook that refreshes desktop-environment caches so a
freshly installed application shows up in the running session.

With no command it runs `refresh`, which is what Meson calls:

    meson.add_install_script('desktop-postinstall')

Environment:
- MESON_INSTALL_PREFIX (required): install prefix, e.g. /usr
- DESTDIR (optional): when set and non-empty the install is staged and
  nothing is refreshed
- RUST_LOG (optional): log filter, e.g. RUST_LOG=warn to see failed tools

Examples:
    MESON_INSTALL_PREFIX=/usr desktop-postinstall
    desktop-postinstall --prefix /usr/local --dry-run
    desktop-postinstall --timeout 60 --report refresh.json
    desktop-postinstall doctor
"#
)]
pub struct Cli {
    /// Install prefix (overrides MESON_INSTALL_PREFIX).
    #[arg(
        long,
        global = true,
        value_name = "DIR",
        long_help = "Install prefix under which share/... is resolved.\n\n\
Overrides MESON_INSTALL_PREFIX. One of the two must be present; the value is\n\
used as-is, without normalization or existence checks."
    )]
    pub prefix: Option<PathBuf>,

    /// Per-tool timeout in seconds.
    #[arg(
        long,
        global = true,
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..),
        long_help = "Kill a cache tool that runs longer than SECS seconds and continue with\n\
the next one. A timed-out tool never fails the hook. SECS must be at least 1.\n\n\
If omitted, each tool is waited on indefinitely."
    )]
    pub timeout: Option<u64>,

    /// Print the planned invocations instead of running them.
    #[arg(
        long,
        global = true,
        long_help = "Print progress lines and a `would run: ...` line per tool without\n\
spawning anything. Staged installs still print nothing."
    )]
    pub dry_run: bool,

    /// Write a JSON report of every step to FILE.
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        long_help = "Write a JSON report with the prefix, the staged flag and the outcome of\n\
each step (succeeded, failed, timed_out, not_launched, planned)."
    )]
    pub report: Option<PathBuf>,

    /// Disable colored output (when applicable).
    #[arg(
        long,
        global = true,
        long_help = "Disable colored output. This is useful when piping to files or when your\n\
terminal does not support ANSI colors."
    )]
    pub no_color: bool,

    /// Verbose mode (debug logging).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Log each invocation and every tolerated tool failure to stderr.\n\n\
RUST_LOG, when set, takes precedence."
    )]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Refresh the desktop caches (default).
    #[command(
        long_about = "Refresh, in order:\n\
  1. glib-compile-schemas <prefix>/share/glib-2.0/schemas\n\
  2. gtk-update-icon-cache -t -f <prefix>/share/icons/hicolor\n\
  3. update-mime-database <prefix>/share/mime\n\
  4. update-desktop-database <prefix>/share/applications\n\n\
Missing or failing tools are tolerated; the command exits 0 unless the\n\
install prefix is unknown."
    )]
    Refresh,

    /// Check which cache tools are installed.
    #[command(
        long_about = "Look up each cache tool on PATH and report where it was found.\n\n\
Examples:\n\
  desktop-postinstall doctor\n\
  desktop-postinstall doctor --json\n"
    )]
    Doctor {
        /// Print a JSON array instead of text.
        #[arg(long)]
        json: bool,
    },
}

/// Initialize env_logger; RUST_LOG wins over --verbose
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "error" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

/// Build the install configuration from flags and the process environment
fn install_config(cli: &Cli) -> Result<InstallConfig> {
    let prefix_flag = cli.prefix.clone().map(OsString::from);
    let config = InstallConfig::from_lookup(|name| {
        if name == PREFIX_VAR {
            prefix_flag.clone().or_else(|| std::env::var_os(name))
        } else {
            std::env::var_os(name)
        }
    })?;

    Ok(config.with_timeout(cli.timeout.map(Duration::from_secs)))
}

fn run_refresh(cli: &Cli) -> Result<()> {
    let config = install_config(cli)?;
    log::debug!("install prefix: {}", config.prefix.display());

    let mut runner: Box<dyn CommandRunner> = if cli.dry_run {
        Box::new(DryRunRunner::new(io::stdout()))
    } else {
        Box::new(SystemRunner::new(config.timeout))
    };

    let mut log_warning =
        |warning: &StepWarning| log::warn!("{:?} step failed: {}", warning.step, warning);
    let mut stdout = io::stdout();
    let report = refresh(
        &config,
        runner.as_mut(),
        &mut stdout,
        Some(&mut log_warning),
    )?;

    let failed = report.failures().count();
    if failed > 0 {
        log::debug!("{} of {} steps did not succeed", failed, report.steps.len());
    }

    if let Some(path) = &cli.report {
        report.write_json(path)?;
    }

    Ok(())
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    let color = !cli.no_color && io::stdout().is_terminal();

    match &cli.command {
        None | Some(Commands::Refresh) => run_refresh(&cli),
        Some(Commands::Doctor { json }) => crate::backends::doctor::run_doctor(*json, color),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_args_defaults_to_refresh() {
        let cli = Cli::try_parse_from(["desktop-postinstall"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.dry_run);
        assert_eq!(cli.timeout, None);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "desktop-postinstall",
            "refresh",
            "--prefix",
            "/usr/local",
            "--timeout",
            "30",
            "--dry-run",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Commands::Refresh)));
        assert_eq!(cli.prefix, Some(PathBuf::from("/usr/local")));
        assert_eq!(cli.timeout, Some(30));
        assert!(cli.dry_run);
    }

    #[test]
    fn test_prefix_flag_builds_config() {
        let cli = Cli::try_parse_from([
            "desktop-postinstall",
            "--prefix",
            "/opt/app",
            "--timeout",
            "5",
        ])
        .unwrap();
        let config = install_config(&cli).unwrap();
        assert_eq!(config.prefix, PathBuf::from("/opt/app"));
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_doctor_json_flag() {
        let cli = Cli::try_parse_from(["desktop-postinstall", "doctor", "--json"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Doctor { json: true })));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = Cli::try_parse_from(["desktop-postinstall", "--timeout", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_accepts_one_second_timeout() {
        let cli = Cli::try_parse_from(["desktop-postinstall", "--timeout", "1"]).unwrap();
        assert_eq!(cli.timeout, Some(1));
    }

    #[test]
    fn test_rejects_non_numeric_timeout() {
        assert!(Cli::try_parse_from(["desktop-postinstall", "--timeout", "soon"]).is_err());
    }
}
