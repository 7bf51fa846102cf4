//! Directory resolution abstraction.
//!
//! Configured paths may start with `~`. Expansion goes through the
//! [`BaseDirs`] trait so tests can supply a fake home directory.

use crate::error::{InstallerError, Result};
use camino::Utf8PathBuf;

/// Source of well-known per-user directories.
pub trait BaseDirs {
    /// Returns the current user's home directory, if known.
    fn home_dir(&self) -> Option<Utf8PathBuf>;
}

/// [`BaseDirs`] backed by the operating system via `directories-next`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBaseDirs;

impl BaseDirs for SystemBaseDirs {
    fn home_dir(&self) -> Option<Utf8PathBuf> {
        directories_next::BaseDirs::new()
            .and_then(|dirs| Utf8PathBuf::from_path_buf(dirs.home_dir().to_path_buf()).ok())
    }
}

/// Expands a leading `~` (alone or followed by a separator) to the home
/// directory. Other paths are returned unchanged.
///
/// # Errors
///
/// Returns [`InstallerError::HomeDirectoryUnavailable`] when expansion is
/// needed but `dirs` cannot supply a home directory.
///
/// # Examples
///
/// ```
/// use camino::Utf8PathBuf;
/// use shadercross_installer::dirs::{BaseDirs, expand_home};
///
/// struct FixedHome;
///
/// impl BaseDirs for FixedHome {
///     fn home_dir(&self) -> Option<Utf8PathBuf> {
///         Some(Utf8PathBuf::from("/home/dev"))
///     }
/// }
///
/// let path = expand_home("~/source/SDL3", &FixedHome)?;
/// assert_eq!(path, Utf8PathBuf::from("/home/dev/source/SDL3"));
/// # Ok::<(), shadercross_installer::error::InstallerError>(())
/// ```
pub fn expand_home(path: &str, dirs: &dyn BaseDirs) -> Result<Utf8PathBuf> {
    let rest = if path == "~" {
        ""
    } else if let Some(rest) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        rest
    } else {
        return Ok(Utf8PathBuf::from(path));
    };

    let home = dirs
        .home_dir()
        .ok_or_else(|| InstallerError::HomeDirectoryUnavailable {
            path: path.to_owned(),
        })?;

    if rest.is_empty() {
        Ok(home)
    } else {
        Ok(home.join(rest))
    }
}
