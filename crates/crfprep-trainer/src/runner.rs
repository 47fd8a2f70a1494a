//! # External Command Runner
//!
//! Blocking invocation of the external trainer/tagger. Output is captured so
//! that failures can be reported with the process's own diagnostics.

use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use tracing::{debug, info, trace};

use crfprep_core::{CrfPrepError, Result};

/// Captured output of a successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs an external program to completion.
pub trait CommandRunner {
    /// Run `program` with `args`, blocking until it exits.
    ///
    /// # Errors
    ///
    /// Returns `CrfPrepError::ExternalProcess` if the program cannot be
    /// launched or exits non-zero.
    fn run(&self, program: &Path, args: &[OsString]) -> Result<CommandOutput>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, program: &Path, args: &[OsString]) -> Result<CommandOutput> {
        (**self).run(program, args)
    }
}

/// [`CommandRunner`] backed by `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner {
    verbose: bool,
}

impl ProcessRunner {
    /// With `verbose`, the program's stderr is logged at info level.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    fn log_stderr(&self, stderr: &str) {
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            if self.verbose {
                info!("{line}");
            } else {
                debug!("{line}");
            }
        }
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, program: &Path, args: &[OsString]) -> Result<CommandOutput> {
        let command = describe(program, args);
        debug!(command = %command, "running external command");

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| CrfPrepError::ExternalProcess {
                command: command.clone(),
                code: None,
                output: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        self.log_stderr(&stderr);
        trace!(bytes = stdout.len(), "captured stdout");

        if !output.status.success() {
            return Err(CrfPrepError::ExternalProcess {
                command,
                code: output.status.code(),
                output: format!("{stdout}{stderr}").trim().to_string(),
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
}

/// Human-readable command line for logs and errors.
pub fn describe(program: &Path, args: &[OsString]) -> String {
    std::iter::once(program.as_os_str())
        .chain(args.iter().map(OsString::as_os_str))
        .map(|s| s.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}
