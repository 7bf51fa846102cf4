//! Shared test utilities for the installer crate.

use crate::error::InstallerError;
use crate::executor::{CommandExecutor, ExternalCommand};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::io;
use std::process::ExitStatus;

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(unix)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(windows)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code.cast_unsigned())
}

/// Filesystem change simulated when an expected call runs.
pub type SideEffect = Box<dyn Fn() -> io::Result<()>>;

/// Represents an expected command invocation for testing.
pub struct ExpectedCall {
    /// The program to execute (e.g., "git").
    pub program: String,
    /// The arguments passed to the program.
    pub args: Vec<String>,
    /// Exit code reported back to the caller.
    pub exit_code: i32,
    /// Optional side effect run before the exit code is returned.
    pub effect: Option<SideEffect>,
}

impl ExpectedCall {
    /// Expects `program` with `args`, exiting successfully.
    #[must_use]
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_owned(),
            args: args.into_iter().map(Into::into).collect(),
            exit_code: 0,
            effect: None,
        }
    }

    /// Expects exactly `command`, exiting successfully.
    #[must_use]
    pub fn matching(command: &ExternalCommand) -> Self {
        Self::new(command.program(), command.arguments().iter().cloned())
    }

    /// Reports `code` instead of success.
    #[must_use]
    pub fn exiting_with(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    /// Runs `effect` when the call is made, e.g. to drop fake build outputs.
    #[must_use]
    pub fn with_effect(mut self, effect: impl Fn() -> io::Result<()> + 'static) -> Self {
        self.effect = Some(Box::new(effect));
        self
    }

    fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Debug for ExpectedCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpectedCall")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("exit_code", &self.exit_code)
            .field("effect", &self.effect.is_some())
            .finish()
    }
}

/// A stub implementation of `CommandExecutor` for testing.
///
/// Checks each invocation against a scripted list of expected calls and
/// returns the scripted exit status. A mismatch is reported as an I/O error
/// wrapping [`InstallerError::StubMismatch`], so the workflow under test
/// fails the way it would if the command could not be started.
#[derive(Debug, Default)]
pub struct StubExecutor {
    expected: RefCell<VecDeque<ExpectedCall>>,
    invoked: RefCell<Vec<String>>,
}

impl StubExecutor {
    /// Creates a new `StubExecutor` with the given expected calls.
    #[must_use]
    pub fn new(expected: Vec<ExpectedCall>) -> Self {
        Self {
            expected: RefCell::new(expected.into()),
            invoked: RefCell::new(Vec::new()),
        }
    }

    /// Command lines received so far, in order.
    #[must_use]
    pub fn invoked(&self) -> Vec<String> {
        self.invoked.borrow().clone()
    }

    /// Asserts that all expected command invocations have been consumed.
    ///
    /// # Panics
    ///
    /// Panics if there are remaining expected calls that were not invoked.
    pub fn assert_finished(&self) {
        let remaining = self.expected.borrow();
        assert!(
            remaining.is_empty(),
            "expected no further command invocations, {} left: {:?}",
            remaining.len(),
            remaining.front()
        );
    }
}

impl CommandExecutor for StubExecutor {
    fn run(&self, command: &ExternalCommand) -> io::Result<ExitStatus> {
        let received = command.command_line();
        self.invoked.borrow_mut().push(received.clone());

        let Some(call) = self.expected.borrow_mut().pop_front() else {
            return Err(mismatch(format!("unexpected command `{received}`")));
        };

        if call.program != command.program() || call.args.as_slice() != command.arguments() {
            return Err(mismatch(format!(
                "expected `{}`, received `{received}`",
                call.command_line()
            )));
        }

        if let Some(effect) = &call.effect {
            effect()?;
        }
        Ok(exit_status(call.exit_code))
    }
}

fn mismatch(message: String) -> io::Error {
    io::Error::other(InstallerError::StubMismatch { message })
}
