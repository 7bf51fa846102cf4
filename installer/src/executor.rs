//! Uniform execution of external commands.
//!
//! Every call to git, CMake or a binary-patching tool goes through
//! [`run_step`]: it prints the stage banner, runs the command through a
//! [`CommandExecutor`], and turns anything other than a zero exit status into
//! the [`InstallerError`] variant for that stage.

use crate::error::{InstallerError, Result, StepFailure};
use crate::output::Progress;
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fmt;
use std::io;
use std::process::{Command, ExitStatus};
use std::time::Duration;
use wait_timeout::ChildExt;

/// An external command together with the label shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    purpose: String,
    program: String,
    args: Vec<String>,
    cwd: Option<Utf8PathBuf>,
}

impl ExternalCommand {
    /// Creates a command running `program` with no arguments.
    ///
    /// # Examples
    ///
    /// ```
    /// use shadercross_installer::executor::ExternalCommand;
    ///
    /// let command = ExternalCommand::new("Building shadercross", "cmake")
    ///     .args(["--build", "build"])
    ///     .current_dir("SDL_shadercross");
    ///
    /// assert_eq!(command.command_line(), "cmake --build build");
    /// assert_eq!(
    ///     command.to_string(),
    ///     "Building shadercross: cmake --build build"
    /// );
    /// ```
    #[must_use]
    pub fn new(purpose: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            purpose: purpose.into(),
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Runs the command inside `dir` instead of the current directory.
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Label describing what the command is for.
    #[must_use]
    pub fn purpose(&self) -> &str {
        &self.purpose
    }

    /// Program name or path.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed to the program.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Directory the command runs in, if not the current one.
    #[must_use]
    pub fn working_dir(&self) -> Option<&Utf8Path> {
        self.cwd.as_deref()
    }

    /// Program and arguments joined by spaces.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for ExternalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.purpose, self.command_line())
    }
}

/// Abstraction for running external commands.
#[cfg_attr(test, mockall::automock)]
pub trait CommandExecutor {
    /// Runs `command` to completion and returns its exit status.
    ///
    /// # Errors
    ///
    /// Returns any I/O error encountered while spawning or waiting for the
    /// command. A timeout is reported with [`io::ErrorKind::TimedOut`].
    fn run(&self, command: &ExternalCommand) -> io::Result<ExitStatus>;
}

/// Executes commands on the host system, streaming their output to the
/// terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor {
    timeout: Option<Duration>,
}

impl SystemCommandExecutor {
    /// Creates an executor that kills commands running longer than `timeout`.
    /// `None` waits indefinitely.
    #[must_use]
    pub const fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, command: &ExternalCommand) -> io::Result<ExitStatus> {
        let mut cmd = Command::new(command.program());
        cmd.args(command.arguments());
        if let Some(dir) = command.working_dir() {
            cmd.current_dir(dir.as_std_path());
        }

        let mut child = cmd.spawn()?;
        let Some(limit) = self.timeout else {
            return child.wait();
        };

        match child.wait_timeout(limit)? {
            Some(status) => Ok(status),
            None => {
                // The child is being abandoned; kill and reap failures change nothing.
                let _ = child.kill();
                let _ = child.wait();
                Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("timed out after {} seconds", limit.as_secs()),
                ))
            }
        }
    }
}

/// Workflow stage an external command belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// `git clone`.
    Clone,
    /// `git fetch` and `git reset`.
    Sync,
    /// Build generator invocation.
    Configure,
    /// Build tool invocation.
    Compile,
    /// Library search path rewrite.
    RpathPatch,
}

impl StepKind {
    /// Wraps `failure` in the error variant for this stage.
    #[must_use]
    pub fn error(self, failure: StepFailure) -> InstallerError {
        match self {
            Self::Clone => InstallerError::CloneFailed(failure),
            Self::Sync => InstallerError::SyncFailed(failure),
            Self::Configure => InstallerError::ConfigureFailed(failure),
            Self::Compile => InstallerError::CompileFailed(failure),
            Self::RpathPatch => InstallerError::RpathPatchFailed(failure),
        }
    }
}

/// Prints the banner for `command`, runs it, and checks the exit status.
///
/// # Errors
///
/// Returns the `kind` error variant if the command cannot be started, times
/// out, or exits unsuccessfully.
pub fn run_step(
    executor: &dyn CommandExecutor,
    command: &ExternalCommand,
    kind: StepKind,
    progress: &mut Progress<'_>,
) -> Result<()> {
    progress.line(command);
    if let Some(dir) = command.working_dir() {
        debug!("running in {dir}");
    }

    let outcome = match executor.run(command) {
        Ok(status) if status.success() => return Ok(()),
        Ok(status) => format!("exited with {status}"),
        Err(e) if e.kind() == io::ErrorKind::TimedOut => e.to_string(),
        Err(e) => format!("could not be started: {e}"),
    };

    Err(kind.error(StepFailure {
        purpose: command.purpose().to_owned(),
        command_line: command.command_line(),
        outcome,
    }))
}
