//! Working and install directory resolution.
//!
//! The install directories are never created here: they must already exist,
//! and the check happens before any clone or build work starts.

use crate::config::InstallerConfig;
use crate::error::{InstallerError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fs;

/// The three directories the workflow operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPaths {
    /// Directory holding the source clones.
    pub working_dir: Utf8PathBuf,
    /// Directory receiving the executable.
    pub bin_install_dir: Utf8PathBuf,
    /// Directory receiving the shared libraries.
    pub lib_install_dir: Utf8PathBuf,
}

impl InstallPaths {
    /// Derives the paths from `config`. This has no side effects.
    #[must_use]
    pub fn resolve(config: &InstallerConfig) -> Self {
        Self {
            working_dir: config.working_dir.clone(),
            bin_install_dir: config.bin_install_dir.clone(),
            lib_install_dir: config.lib_install_dir.clone(),
        }
    }

    /// Location of the SDL_shadercross clone.
    #[must_use]
    pub fn shadercross_dir(&self) -> Utf8PathBuf {
        self.working_dir.join("SDL_shadercross")
    }

    /// Location of the SDL clone.
    #[must_use]
    pub fn sdl_dir(&self) -> Utf8PathBuf {
        self.working_dir.join("SDL")
    }

    /// Build output directory of SDL_shadercross.
    #[must_use]
    pub fn shadercross_build_dir(&self) -> Utf8PathBuf {
        self.shadercross_dir().join(BUILD_DIR_NAME)
    }

    /// Build output directory of SDL.
    #[must_use]
    pub fn sdl_build_dir(&self) -> Utf8PathBuf {
        self.sdl_dir().join(BUILD_DIR_NAME)
    }
}

/// Name of the build output directory inside each clone.
pub const BUILD_DIR_NAME: &str = "build";

/// Creates the working directory and checks that both install directories
/// exist.
///
/// Creating the working directory is idempotent.
///
/// # Errors
///
/// Returns [`InstallerError::MissingInstallDirectory`] naming the first
/// install directory that does not exist, or an I/O error if the working
/// directory cannot be created.
pub fn prepare_environment(paths: &InstallPaths) -> Result<()> {
    fs::create_dir_all(&paths.working_dir)?;
    debug!("working directory ready at {}", paths.working_dir);

    require_directory(&paths.bin_install_dir)?;
    require_directory(&paths.lib_install_dir)
}

fn require_directory(path: &Utf8Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(InstallerError::MissingInstallDirectory {
            path: path.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dirs::BaseDirs;
    use crate::platform::Platform;
    use rstest::rstest;
    use tempfile::TempDir;

    struct FakeDirs;

    impl BaseDirs for FakeDirs {
        fn home_dir(&self) -> Option<Utf8PathBuf> {
            Some(Utf8PathBuf::from("/home/dev"))
        }
    }

    fn utf8_root(temp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("non-UTF-8 temp path")
    }

    fn paths_under(root: &Utf8Path) -> InstallPaths {
        InstallPaths {
            working_dir: root.join("work").join("nested"),
            bin_install_dir: root.join("bin"),
            lib_install_dir: root.join("lib"),
        }
    }

    #[rstest]
    #[case::macos(Platform::MacOs)]
    #[case::windows(Platform::Windows)]
    #[case::linux(Platform::Linux)]
    fn resolution_is_deterministic(#[case] platform: Platform) {
        let config = InstallerConfig::defaults(platform, &FakeDirs).expect("defaults failed");
        assert_eq!(InstallPaths::resolve(&config), InstallPaths::resolve(&config));
    }

    #[test]
    fn clone_and_build_dirs_live_under_working_dir() {
        let paths = paths_under(Utf8Path::new("/src"));
        assert_eq!(
            paths.shadercross_build_dir(),
            Utf8PathBuf::from("/src/work/nested/SDL_shadercross/build")
        );
        assert_eq!(
            paths.sdl_build_dir(),
            Utf8PathBuf::from("/src/work/nested/SDL/build")
        );
    }

    #[test]
    fn prepare_creates_working_dir_idempotently() {
        let temp = TempDir::new().expect("temp dir");
        let root = utf8_root(&temp);
        let paths = paths_under(&root);
        fs::create_dir_all(&paths.bin_install_dir).expect("mkdir bin");
        fs::create_dir_all(&paths.lib_install_dir).expect("mkdir lib");

        prepare_environment(&paths).expect("first prepare failed");
        prepare_environment(&paths).expect("second prepare failed");

        assert!(paths.working_dir.is_dir());
    }

    #[rstest]
    #[case::bin_missing(false, true, "bin")]
    #[case::lib_missing(true, false, "lib")]
    fn prepare_names_missing_install_dir(
        #[case] create_bin: bool,
        #[case] create_lib: bool,
        #[case] missing: &str,
    ) {
        let temp = TempDir::new().expect("temp dir");
        let root = utf8_root(&temp);
        let paths = paths_under(&root);
        if create_bin {
            fs::create_dir_all(&paths.bin_install_dir).expect("mkdir bin");
        }
        if create_lib {
            fs::create_dir_all(&paths.lib_install_dir).expect("mkdir lib");
        }

        let err = prepare_environment(&paths).expect_err("expected failure");
        assert!(matches!(
            err,
            InstallerError::MissingInstallDirectory { ref path } if *path == root.join(missing)
        ));
    }
}
