//! Host platform detection.
//!
//! The installer supports exactly three platforms. The platform is resolved
//! once at start-up and then drives path defaults, artefact naming and the
//! choice of [`ArtifactInstaller`](crate::artefact::ArtifactInstaller).

use crate::error::{InstallerError, Result};
use std::fmt;
use std::str::FromStr;

/// Operating system the installer is running on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Apple macOS.
    MacOs,
    /// Microsoft Windows.
    Windows,
    /// Linux distributions.
    Linux,
}

impl Platform {
    /// Detects the host platform.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::UnsupportedPlatform`] on any other OS.
    pub fn detect() -> Result<Self> {
        Self::from_identifier(std::env::consts::OS)
    }

    /// Parses a platform identifier.
    ///
    /// Accepts the Rust target OS names (`macos`, `windows`, `linux`) as well
    /// as the aliases `darwin` and `win32`.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::UnsupportedPlatform`] for any other value.
    ///
    /// # Examples
    ///
    /// ```
    /// use shadercross_installer::platform::Platform;
    ///
    /// assert_eq!(Platform::from_identifier("darwin")?, Platform::MacOs);
    /// assert!(Platform::from_identifier("freebsd").is_err());
    /// # Ok::<(), shadercross_installer::error::InstallerError>(())
    /// ```
    pub fn from_identifier(identifier: &str) -> Result<Self> {
        match identifier {
            "macos" | "darwin" => Ok(Self::MacOs),
            "windows" | "win32" => Ok(Self::Windows),
            "linux" => Ok(Self::Linux),
            other => Err(InstallerError::UnsupportedPlatform {
                identifier: other.to_owned(),
            }),
        }
    }

    /// Returns the canonical lowercase identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MacOs => "macos",
            Self::Windows => "windows",
            Self::Linux => "linux",
        }
    }

    /// Returns the executable file suffix (including the dot, if any).
    #[must_use]
    pub const fn executable_suffix(self) -> &'static str {
        match self {
            Self::Windows => ".exe",
            Self::MacOs | Self::Linux => "",
        }
    }

    /// Returns the file name of an executable called `stem`.
    #[must_use]
    pub fn executable_name(self, stem: &str) -> String {
        format!("{stem}{}", self.executable_suffix())
    }
}

impl FromStr for Platform {
    type Err = InstallerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_identifier(s)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::macos("macos", Platform::MacOs)]
    #[case::darwin("darwin", Platform::MacOs)]
    #[case::windows("windows", Platform::Windows)]
    #[case::win32("win32", Platform::Windows)]
    #[case::linux("linux", Platform::Linux)]
    fn parses_supported_identifiers(#[case] identifier: &str, #[case] expected: Platform) {
        assert_eq!(Platform::from_identifier(identifier).ok(), Some(expected));
    }

    #[rstest]
    #[case::freebsd("freebsd")]
    #[case::empty("")]
    #[case::uppercase("Linux")]
    fn rejects_unknown_identifiers(#[case] identifier: &str) {
        let err = Platform::from_identifier(identifier).expect_err("expected rejection");
        assert!(matches!(
            err,
            InstallerError::UnsupportedPlatform { identifier: ref id } if id == identifier
        ));
    }

    #[rstest]
    #[case::macos(Platform::MacOs, "shadercross")]
    #[case::windows(Platform::Windows, "shadercross.exe")]
    #[case::linux(Platform::Linux, "shadercross")]
    fn executable_name_applies_suffix(#[case] platform: Platform, #[case] expected: &str) {
        assert_eq!(platform.executable_name("shadercross"), expected);
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for platform in [Platform::MacOs, Platform::Windows, Platform::Linux] {
            let parsed: Platform = platform.to_string().parse().expect("parse failed");
            assert_eq!(parsed, platform);
        }
    }
}
