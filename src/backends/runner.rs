//! Command runner - how the hook launches external tools
//!
//! The refresh sequence never spawns processes itself. It asks a
//! [`CommandRunner`] to run `program args...` and gets back a [`RunStatus`].
//! Two runners ship with the binary:
//!
//! - [`SystemRunner`]: spawns the tool with inherited stdio, optionally
//!   killing it after a timeout
//! - [`DryRunRunner`]: prints what would run and spawns nothing

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// How a single invocation ended (launch failures are `Err`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Exited with status 0
    Success,

    /// Exited non-zero, or was killed by a signal (`code` is `None`)
    Failed { code: Option<i32> },

    /// Killed after exceeding the timeout
    TimedOut { after_ms: u64 },

    /// Not executed (dry run)
    Planned,
}

/// Capability to run an external program to completion
pub trait CommandRunner {
    fn run(&mut self, program: &str, args: &[OsString]) -> io::Result<RunStatus>;
}

/// Runs tools as real child processes
#[derive(Debug, Clone)]
pub struct SystemRunner {
    timeout: Option<Duration>,
    poll_interval: Duration,
}

impl SystemRunner {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&mut self, program: &str, args: &[OsString]) -> io::Result<RunStatus> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .spawn()?;

        let Some(timeout) = self.timeout else {
            let status = child.wait()?;
            return Ok(exit_status(status));
        };

        let start = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(exit_status(status));
            }
            if start.elapsed() > timeout {
                // Only the direct child is signalled; grandchildren of a
                // wrapper script are left running.
                if let Err(e) = child.kill() {
                    log::debug!("failed to kill {}: {}", program, e);
                }
                if let Err(e) = child.wait() {
                    log::debug!("failed to reap {}: {}", program, e);
                }
                return Ok(RunStatus::TimedOut {
                    after_ms: saturating_ms(timeout),
                });
            }
            thread::sleep(self.poll_interval);
        }
    }
}

/// Milliseconds in `d`, clamped to `u64::MAX`
fn saturating_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

fn exit_status(status: std::process::ExitStatus) -> RunStatus {
    if status.success() {
        RunStatus::Success
    } else {
        RunStatus::Failed {
            code: status.code(),
        }
    }
}

/// Prints `would run: <program> <args...>` instead of running anything
pub struct DryRunRunner<W: Write> {
    out: W,
}

impl<W: Write> DryRunRunner<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> CommandRunner for DryRunRunner<W> {
    fn run(&mut self, program: &str, args: &[OsString]) -> io::Result<RunStatus> {
        writeln!(self.out, "would run: {}", display_command(program, args))?;
        Ok(RunStatus::Planned)
    }
}

/// Render a command line for messages (lossy for non-UTF-8 arguments)
pub fn display_command(program: &str, args: &[OsString]) -> String {
    std::iter::once(program.to_string())
        .chain(args.iter().map(|a| a.to_string_lossy().into_owned()))
        .collect::<Vec<_>>()
        .join(" ")
}
