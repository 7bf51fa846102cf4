//! Error types for the shadercross installer.
//!
//! Every stage of the workflow fails with its own variant so the user can tell
//! which step broke. Variants wrapping an external command carry a
//! [`StepFailure`] holding the purpose label, the full command line and the
//! exit status (or the reason the command never ran to completion).

use camino::Utf8PathBuf;
use std::fmt;
use thiserror::Error;

/// Details of an external command that did not complete successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    /// Human-readable label of the step, e.g. "Configuring shadercross".
    pub purpose: String,
    /// The command line that was executed, space separated.
    pub command_line: String,
    /// What went wrong: a non-zero exit status, a spawn failure or a timeout.
    pub outcome: String,
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: `{}` {}",
            self.purpose, self.command_line, self.outcome
        )
    }
}

/// Errors that can occur while building and installing shadercross.
#[derive(Debug, Error)]
pub enum InstallerError {
    /// The host platform is not macOS, Windows or Linux.
    #[error("unsupported platform: {identifier}")]
    UnsupportedPlatform {
        /// The platform identifier that was not recognised.
        identifier: String,
    },

    /// A required install directory does not exist.
    #[error("install directory {path} does not exist")]
    MissingInstallDirectory {
        /// The missing directory.
        path: Utf8PathBuf,
    },

    /// Cloning a source repository failed.
    #[error("clone failed: {0}")]
    CloneFailed(StepFailure),

    /// Fetching or resetting an existing clone failed.
    #[error("sync failed: {0}")]
    SyncFailed(StepFailure),

    /// The build generator could not configure the project.
    #[error("configure failed: {0}")]
    ConfigureFailed(StepFailure),

    /// The build tool could not compile the project.
    #[error("compile failed: {0}")]
    CompileFailed(StepFailure),

    /// A file expected in the build output is absent.
    #[error("build artefact {path} is missing")]
    ArtifactMissing {
        /// Path where the artefact was expected.
        path: Utf8PathBuf,
    },

    /// Rewriting the installed executable's library search path failed.
    #[error("rpath patch failed: {0}")]
    RpathPatchFailed(StepFailure),

    /// A build output directory could not be removed after installation.
    #[error("failed to remove build directory {path}: {source}")]
    CleanupFailed {
        /// The directory that could not be removed.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration override file could not be read or parsed.
    #[error("invalid configuration file {path}: {reason}")]
    InvalidConfig {
        /// Path to the configuration file.
        path: Utf8PathBuf,
        /// Description of the read or parse error.
        reason: String,
    },

    /// A configured path starts with `~` but no home directory is known.
    #[error("cannot expand {path}: home directory could not be determined")]
    HomeDirectoryUnavailable {
        /// The path that needed expansion.
        path: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Test stub received an unexpected or mismatched command invocation.
    #[cfg(any(test, feature = "test-support"))]
    #[error("stub mismatch: {message}")]
    StubMismatch {
        /// Description of what was expected versus what was received.
        message: String,
    },
}

impl InstallerError {
    /// Returns true for errors that must abort the workflow.
    ///
    /// Only [`InstallerError::CleanupFailed`] is non-fatal: by the time it can
    /// occur the binaries are already installed.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::CleanupFailed { .. })
    }
}

/// Result type alias using [`InstallerError`].
pub type Result<T> = std::result::Result<T, InstallerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn failure() -> StepFailure {
        StepFailure {
            purpose: "Building shadercross".to_owned(),
            command_line: "cmake --build build".to_owned(),
            outcome: "exited with exit status: 2".to_owned(),
        }
    }

    #[test]
    fn step_failure_names_purpose_command_and_status() {
        let msg = failure().to_string();
        assert!(msg.contains("Building shadercross"));
        assert!(msg.contains("`cmake --build build`"));
        assert!(msg.contains("exit status: 2"));
    }

    #[rstest]
    #[case::clone(InstallerError::CloneFailed(failure()), "clone failed")]
    #[case::sync(InstallerError::SyncFailed(failure()), "sync failed")]
    #[case::configure(InstallerError::ConfigureFailed(failure()), "configure failed")]
    #[case::compile(InstallerError::CompileFailed(failure()), "compile failed")]
    #[case::rpath(InstallerError::RpathPatchFailed(failure()), "rpath patch failed")]
    fn step_errors_include_stage_and_command(#[case] err: InstallerError, #[case] stage: &str) {
        let msg = err.to_string();
        assert!(msg.starts_with(stage));
        assert!(msg.contains("cmake --build build"));
    }

    #[test]
    fn missing_install_directory_names_path() {
        let err = InstallerError::MissingInstallDirectory {
            path: Utf8PathBuf::from("/opt/lib"),
        };
        assert_eq!(err.to_string(), "install directory /opt/lib does not exist");
    }

    #[test]
    fn unsupported_platform_names_identifier() {
        let err = InstallerError::UnsupportedPlatform {
            identifier: "freebsd".to_owned(),
        };
        assert!(err.to_string().contains("freebsd"));
    }

    #[test]
    fn only_cleanup_failure_is_non_fatal() {
        let cleanup = InstallerError::CleanupFailed {
            path: Utf8PathBuf::from("/tmp/build"),
            source: std::io::Error::other("permission denied"),
        };
        assert!(!cleanup.is_fatal());
        assert!(std::error::Error::source(&cleanup).is_some());

        let missing = InstallerError::ArtifactMissing {
            path: Utf8PathBuf::from("/tmp/build/shadercross"),
        };
        assert!(missing.is_fatal());
    }
}
