//! desktop-postinstall - Meson post-install hook for desktop integration
//!
//! After `meson install` stages an application, this hook refreshes:
//! - the compiled GSettings schema cache
//! - the hicolor icon theme cache
//! - the shared MIME-info database
//! - the desktop-entry database
//!
//! Staged installs (`DESTDIR` set) are skipped so packaging never touches
//! the live system caches.

use anyhow::Result;
use clap::Parser;

mod backends;
mod cli;
mod core;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbose);
    cli::run(cli)
}
