//! Artefact installation with per-platform conventions.
//!
//! Each supported platform has its own [`ArtifactInstaller`]: it knows which
//! files the build produces, where they go, and how to make the installed
//! executable find its co-installed libraries once the build tree is gone.

use crate::environment::InstallPaths;
use crate::error::{InstallerError, Result};
use crate::executor::{CommandExecutor, ExternalCommand, StepKind, run_step};
use crate::output::{Progress, install_banner};
use crate::platform::Platform;
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fs;

/// Stem of the shadercross executable.
pub const EXECUTABLE_STEM: &str = "shadercross";

/// One file to copy out of the build tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Path inside the build output.
    pub source: Utf8PathBuf,
    /// Directory the file is copied into, keeping its file name.
    pub destination_dir: Utf8PathBuf,
}

impl Artifact {
    fn new(source: Utf8PathBuf, destination_dir: &Utf8Path) -> Self {
        Self {
            source,
            destination_dir: destination_dir.to_owned(),
        }
    }

    /// Full path of the installed copy.
    #[must_use]
    pub fn destination(&self) -> Utf8PathBuf {
        match self.source.file_name() {
            Some(name) => self.destination_dir.join(name),
            None => self.destination_dir.clone(),
        }
    }
}

/// The executable and shared libraries a successful build yields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArtifactSet {
    /// The shadercross executable.
    pub executable: Artifact,
    /// Shared libraries the executable loads at runtime.
    pub libraries: Vec<Artifact>,
}

impl BuildArtifactSet {
    /// Iterates the executable first, then the libraries.
    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        std::iter::once(&self.executable).chain(&self.libraries)
    }

    /// Installed location of the executable.
    #[must_use]
    pub fn installed_executable(&self) -> Utf8PathBuf {
        self.executable.destination()
    }
}

/// Build-tree directories holding shadercross and its dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLayout {
    /// shadercross build output.
    pub shadercross_build_dir: Utf8PathBuf,
    /// SPIRV-Cross output, vendored under shadercross.
    pub spirv_cross_dir: Utf8PathBuf,
    /// DirectXShaderCompiler library output.
    pub dxc_dir: Utf8PathBuf,
    /// SDL build output.
    pub sdl_build_dir: Utf8PathBuf,
}

impl BuildLayout {
    /// Computes the layout for `platform`. DirectXShaderCompiler places its
    /// DLL under `bin` on Windows and its shared object under `lib` elsewhere.
    #[must_use]
    pub fn new(platform: Platform, paths: &InstallPaths) -> Self {
        let shadercross_build_dir = paths.shadercross_build_dir();
        let external = shadercross_build_dir.join("external");
        let dxc_subdir = match platform {
            Platform::Windows => "bin",
            Platform::MacOs | Platform::Linux => "lib",
        };

        Self {
            spirv_cross_dir: external.join("SPIRV-Cross"),
            dxc_dir: external.join("DirectXShaderCompiler").join(dxc_subdir),
            sdl_build_dir: paths.sdl_build_dir(),
            shadercross_build_dir,
        }
    }
}

/// Copies build artefacts into place and fixes up runtime library lookup.
pub trait ArtifactInstaller {
    /// Platform this installer targets.
    fn platform(&self) -> Platform;

    /// Files to install, with their source and destination.
    fn artifact_set(&self, paths: &InstallPaths) -> BuildArtifactSet;

    /// Commands that rewrite the installed executable's library search path,
    /// in order. Empty when the platform needs no fix-up.
    fn runtime_path_commands(&self, paths: &InstallPaths) -> Vec<ExternalCommand>;

    /// Rewrites the installed executable's library search path.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::RpathPatchFailed`] if the patching tool fails.
    /// Later commands are not attempted.
    fn patch_runtime_paths(
        &self,
        executor: &dyn CommandExecutor,
        paths: &InstallPaths,
        progress: &mut Progress<'_>,
    ) -> Result<()> {
        let commands = self.runtime_path_commands(paths);
        if commands.is_empty() {
            debug!("{} needs no runtime path fix-up", self.platform());
        }
        for command in &commands {
            run_step(executor, command, StepKind::RpathPatch, progress)?;
        }
        Ok(())
    }

    /// Checks that the SDL runtime library is already built when the SDL
    /// stage is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::ArtifactMissing`] naming the absent library.
    fn require_prebuilt_sdl(&self, paths: &InstallPaths) -> Result<()> {
        let sdl_build_dir = paths.sdl_build_dir();
        let missing = self
            .artifact_set(paths)
            .libraries
            .into_iter()
            .filter(|artifact| artifact.source.starts_with(&sdl_build_dir))
            .find(|artifact| !artifact.source.is_file());
        match missing {
            Some(artifact) => Err(InstallerError::ArtifactMissing {
                path: artifact.source,
            }),
            None => Ok(()),
        }
    }

    /// Copies every artefact, returning the installed paths.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::ArtifactMissing`] before copying anything if
    /// any source file is absent.
    fn copy_artifacts(&self, paths: &InstallPaths) -> Result<Vec<Utf8PathBuf>> {
        copy_artifact_set(&self.artifact_set(paths))
    }

    /// Copies the artefacts and patches the executable.
    ///
    /// # Errors
    ///
    /// Propagates failures from [`copy_artifacts`](Self::copy_artifacts) and
    /// [`patch_runtime_paths`](Self::patch_runtime_paths).
    fn install(
        &self,
        executor: &dyn CommandExecutor,
        paths: &InstallPaths,
        progress: &mut Progress<'_>,
    ) -> Result<Vec<Utf8PathBuf>> {
        progress.line(install_banner(&paths.bin_install_dir, &paths.lib_install_dir));
        let installed = self.copy_artifacts(paths)?;
        self.patch_runtime_paths(executor, paths, progress)?;
        Ok(installed)
    }
}

/// Installer for macOS: `.dylib` libraries, rpaths fixed with
/// `install_name_tool`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MacOsInstaller;

/// Installer for Windows: DLLs, no path fix-up.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsInstaller;

/// Installer for Linux: versioned shared objects, rpath set with `patchelf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinuxInstaller;

impl ArtifactInstaller for MacOsInstaller {
    fn platform(&self) -> Platform {
        Platform::MacOs
    }

    fn artifact_set(&self, paths: &InstallPaths) -> BuildArtifactSet {
        let layout = BuildLayout::new(Platform::MacOs, paths);
        let lib = &paths.lib_install_dir;
        BuildArtifactSet {
            executable: Artifact::new(
                layout.shadercross_build_dir.join(EXECUTABLE_STEM),
                &paths.bin_install_dir,
            ),
            libraries: vec![
                Artifact::new(layout.spirv_cross_dir.join("libspirv-cross-c-shared.0.dylib"), lib),
                Artifact::new(layout.dxc_dir.join("libdxcompiler.dylib"), lib),
                Artifact::new(layout.sdl_build_dir.join("libSDL3.0.dylib"), lib),
            ],
        }
    }

    /// Drops the SDL and SPIRV-Cross build-tree entries and retargets the
    /// DirectXShaderCompiler entry at the library install directory.
    fn runtime_path_commands(&self, paths: &InstallPaths) -> Vec<ExternalCommand> {
        let layout = BuildLayout::new(Platform::MacOs, paths);
        let executable = self.artifact_set(paths).installed_executable();

        vec![
            ExternalCommand::new("Fixing shadercross rpath #1", "install_name_tool")
                .arg("-delete_rpath")
                .args([layout.sdl_build_dir.as_str(), executable.as_str()]),
            ExternalCommand::new("Fixing shadercross rpath #2", "install_name_tool")
                .arg("-delete_rpath")
                .args([layout.spirv_cross_dir.as_str(), executable.as_str()]),
            ExternalCommand::new("Fixing shadercross rpath #3", "install_name_tool")
                .arg("-rpath")
                .args([
                    layout.dxc_dir.as_str(),
                    paths.lib_install_dir.as_str(),
                    executable.as_str(),
                ]),
        ]
    }
}

impl ArtifactInstaller for WindowsInstaller {
    fn platform(&self) -> Platform {
        Platform::Windows
    }

    fn artifact_set(&self, paths: &InstallPaths) -> BuildArtifactSet {
        let layout = BuildLayout::new(Platform::Windows, paths);
        let lib = &paths.lib_install_dir;
        BuildArtifactSet {
            executable: Artifact::new(
                layout
                    .shadercross_build_dir
                    .join(Platform::Windows.executable_name(EXECUTABLE_STEM)),
                &paths.bin_install_dir,
            ),
            libraries: vec![
                Artifact::new(layout.spirv_cross_dir.join("spirv-cross-c-shared.dll"), lib),
                Artifact::new(layout.dxc_dir.join("dxcompiler.dll"), lib),
                Artifact::new(layout.sdl_build_dir.join("SDL3.dll"), lib),
            ],
        }
    }

    /// Windows resolves DLLs from the executable's directory.
    fn runtime_path_commands(&self, _paths: &InstallPaths) -> Vec<ExternalCommand> {
        Vec::new()
    }
}

impl ArtifactInstaller for LinuxInstaller {
    fn platform(&self) -> Platform {
        Platform::Linux
    }

    fn artifact_set(&self, paths: &InstallPaths) -> BuildArtifactSet {
        let layout = BuildLayout::new(Platform::Linux, paths);
        let lib = &paths.lib_install_dir;
        BuildArtifactSet {
            executable: Artifact::new(
                layout.shadercross_build_dir.join(EXECUTABLE_STEM),
                &paths.bin_install_dir,
            ),
            libraries: vec![
                Artifact::new(layout.spirv_cross_dir.join("libspirv-cross-c-shared.so.0"), lib),
                Artifact::new(layout.dxc_dir.join("libdxcompiler.so"), lib),
                Artifact::new(layout.sdl_build_dir.join("libSDL3.so.0"), lib),
            ],
        }
    }

    fn runtime_path_commands(&self, paths: &InstallPaths) -> Vec<ExternalCommand> {
        let executable = self.artifact_set(paths).installed_executable();
        vec![
            ExternalCommand::new("Fixing shadercross rpath", "patchelf")
                .arg("--set-rpath")
                .args([paths.lib_install_dir.as_str(), executable.as_str()]),
        ]
    }
}

/// Returns the installer for `platform`.
#[must_use]
pub fn installer_for(platform: Platform) -> &'static dyn ArtifactInstaller {
    match platform {
        Platform::MacOs => &MacOsInstaller,
        Platform::Windows => &WindowsInstaller,
        Platform::Linux => &LinuxInstaller,
    }
}

/// Copies every artefact in `set` to its destination.
///
/// All sources are checked before the first copy so a missing file never
/// leaves a partial installation behind. Existing files at the destinations
/// are overwritten.
///
/// # Errors
///
/// Returns [`InstallerError::ArtifactMissing`] naming the first absent
/// source, or an I/O error if a copy fails.
pub fn copy_artifact_set(set: &BuildArtifactSet) -> Result<Vec<Utf8PathBuf>> {
    if let Some(missing) = set.iter().find(|artifact| !artifact.source.is_file()) {
        return Err(InstallerError::ArtifactMissing {
            path: missing.source.clone(),
        });
    }

    set.iter()
        .map(|artifact| {
            let destination = artifact.destination();
            debug!("copying {} to {destination}", artifact.source);
            fs::copy(&artifact.source, &destination)?;
            Ok(destination)
        })
        .collect()
}

#[cfg(test)]
#[path = "artefact_tests.rs"]
mod tests;
