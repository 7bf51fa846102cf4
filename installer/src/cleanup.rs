//! Removal of transient build output after installation.

use crate::environment::InstallPaths;
use crate::error::{InstallerError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fs;
use std::io;

/// Build directories removed after a successful install: SDL first, then
/// shadercross.
#[must_use]
pub fn build_dirs(paths: &InstallPaths) -> [Utf8PathBuf; 2] {
    [paths.sdl_build_dir(), paths.shadercross_build_dir()]
}

/// Removes both build output directories.
///
/// Directories that are already absent are skipped. Every directory is
/// attempted even if an earlier removal fails; installed files are never
/// touched.
///
/// # Errors
///
/// Returns [`InstallerError::CleanupFailed`] for the first directory that
/// could not be removed.
pub fn remove_build_dirs(paths: &InstallPaths) -> Result<()> {
    let mut first_error = None;
    for dir in build_dirs(paths) {
        if let Err(err) = remove_dir(&dir) {
            first_error.get_or_insert(err);
        }
    }
    first_error.map_or(Ok(()), Err)
}

fn remove_dir(dir: &Utf8Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("{dir} already absent");
            Ok(())
        }
        Err(source) => Err(InstallerError::CleanupFailed {
            path: dir.to_owned(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn paths_in(temp: &TempDir) -> InstallPaths {
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("UTF-8 path");
        InstallPaths {
            working_dir: root.clone(),
            bin_install_dir: root.join("bin"),
            lib_install_dir: root.join("lib"),
        }
    }

    #[test]
    fn removes_both_build_dirs() {
        let temp = TempDir::new().expect("temp dir");
        let paths = paths_in(&temp);
        for dir in build_dirs(&paths) {
            fs::create_dir_all(dir.join("nested")).expect("mkdir");
        }

        remove_build_dirs(&paths).expect("cleanup failed");

        for dir in build_dirs(&paths) {
            assert!(!dir.exists(), "{dir} still exists");
        }
        assert!(paths.shadercross_dir().exists(), "clone must survive");
    }

    #[test]
    fn absent_dirs_are_not_an_error() {
        let temp = TempDir::new().expect("temp dir");
        remove_build_dirs(&paths_in(&temp)).expect("cleanup failed");
    }

    #[test]
    fn installed_files_are_left_alone() {
        let temp = TempDir::new().expect("temp dir");
        let paths = paths_in(&temp);
        fs::create_dir_all(&paths.bin_install_dir).expect("mkdir");
        let installed = paths.bin_install_dir.join("shadercross");
        fs::write(&installed, b"binary").expect("write");
        fs::create_dir_all(paths.shadercross_build_dir()).expect("mkdir");

        remove_build_dirs(&paths).expect("cleanup failed");
        assert_eq!(fs::read(&installed).expect("read"), b"binary");
    }

    #[cfg(unix)]
    #[test]
    fn unremovable_dir_reports_cleanup_failure() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().expect("temp dir");
        let paths = paths_in(&temp);
        let build = paths.shadercross_build_dir();
        fs::create_dir_all(build.join("obj")).expect("mkdir");
        fs::write(build.join("obj").join("a.o"), b"x").expect("write");
        fs::set_permissions(&build, fs::Permissions::from_mode(0o500)).expect("chmod");

        if fs::write(build.join(".writable"), b"").is_ok() {
            // Running with privileges that ignore permission bits.
            fs::set_permissions(&build, fs::Permissions::from_mode(0o755)).expect("chmod back");
            return;
        }
        let result = remove_build_dirs(&paths);
        fs::set_permissions(&build, fs::Permissions::from_mode(0o755)).expect("chmod back");

        let err = result.expect_err("expected failure");
        assert!(!err.is_fatal());
        assert!(matches!(err, InstallerError::CleanupFailed { ref path, .. } if *path == build));
    }
}
