//! Test support utilities for installer integration tests.
//!
//! Provides a throwaway Linux-style workspace on disk and a scripted command
//! sequence that lets the full workflow run without git, CMake or patchelf.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use camino::{Utf8Path, Utf8PathBuf};
use shadercross_installer::artefact::{ArtifactInstaller, LinuxInstaller};
use shadercross_installer::config::InstallerConfig;
use shadercross_installer::dirs::BaseDirs;
use shadercross_installer::environment::InstallPaths;
use shadercross_installer::pipeline::plan;
use shadercross_installer::platform::Platform;
use shadercross_installer::test_utils::ExpectedCall;
use std::fs;
use std::io;
use tempfile::TempDir;

/// Base directories with no home directory.
pub struct NoHome;

impl BaseDirs for NoHome {
    fn home_dir(&self) -> Option<Utf8PathBuf> {
        None
    }
}

/// Temporary directory tree laid out like a Linux install.
pub struct LinuxWorkspace {
    temp: TempDir,
    /// Configuration pointing at the temporary tree.
    pub config: InstallerConfig,
}

impl LinuxWorkspace {
    /// Creates both install directories and seeds the prebuilt SDL library.
    pub fn new() -> Self {
        let workspace = Self::bare();
        fs::create_dir_all(&workspace.config.bin_install_dir).expect("mkdir bin");
        fs::create_dir_all(&workspace.config.lib_install_dir).expect("mkdir lib");
        write_file(&workspace.paths().sdl_build_dir().join("libSDL3.so.0")).expect("seed SDL");
        workspace
    }

    /// Creates nothing on disk beyond the temporary root.
    pub fn bare() -> Self {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("UTF-8 path");
        let mut config = InstallerConfig::defaults(Platform::Linux, &NoHome).expect("defaults");
        config.working_dir = root.join("work");
        config.bin_install_dir = root.join("install").join("bin");
        config.lib_install_dir = root.join("install").join("lib");
        Self { temp, config }
    }

    /// Root of the temporary tree.
    pub fn root(&self) -> &Utf8Path {
        Utf8Path::from_path(self.temp.path()).expect("UTF-8 path")
    }

    /// Paths derived from the configuration.
    pub fn paths(&self) -> InstallPaths {
        InstallPaths::resolve(&self.config)
    }
}

/// Writes a small file, creating parent directories.
pub fn write_file(path: &Utf8Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, path.as_str())
}

/// Every file and directory below `root`, sorted.
pub fn snapshot(root: &Utf8Path) -> Vec<Utf8PathBuf> {
    let mut entries = Vec::new();
    let mut pending = vec![root.to_owned()];
    while let Some(dir) = pending.pop() {
        for entry in dir.read_dir_utf8().expect("read dir") {
            let path = entry.expect("dir entry").into_path();
            if path.is_dir() {
                pending.push(path.clone());
            }
            entries.push(path);
        }
    }
    entries.sort();
    entries
}

/// Scripts every planned command to succeed. The shadercross compile step
/// writes the artefacts the build would produce; `after_patch` runs once the
/// runtime path fix-up has been invoked.
pub fn scripted_install_calls(
    config: &InstallerConfig,
    after_patch: Option<Box<dyn Fn() -> io::Result<()>>>,
) -> Vec<ExpectedCall> {
    let paths = InstallPaths::resolve(config);
    let sdl_build = paths.sdl_build_dir();
    let outputs: Vec<Utf8PathBuf> = LinuxInstaller
        .artifact_set(&paths)
        .iter()
        .map(|artifact| artifact.source.clone())
        .filter(|source| !source.starts_with(&sdl_build))
        .collect();

    let mut after_patch = after_patch;
    plan(config)
        .iter()
        .map(|command| {
            let call = ExpectedCall::matching(command);
            match command.program() {
                "cmake" if command.purpose() == "Building shadercross" => {
                    let outputs = outputs.clone();
                    call.with_effect(move || outputs.iter().try_for_each(|p| write_file(p)))
                }
                "patchelf" => match after_patch.take() {
                    Some(effect) => call.with_effect(effect),
                    None => call,
                },
                _ => call,
            }
        })
        .collect()
}
