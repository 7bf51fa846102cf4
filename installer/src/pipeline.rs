//! Installation workflow orchestration.
//!
//! [`run_install`] drives the stages strictly in order: environment
//! preparation, the optional SDL source and build stage, the shadercross
//! source and build stage, artefact installation and cleanup. Every stage's
//! success is a precondition for the next; the first fatal error aborts the
//! run. Only cleanup failure is downgraded to a warning carried in the
//! [`InstallReport`].

use crate::artefact::installer_for;
use crate::build::CmakeProject;
use crate::cleanup::remove_build_dirs;
use crate::config::InstallerConfig;
use crate::environment::{InstallPaths, prepare_environment};
use crate::error::{InstallerError, Result};
use crate::executor::{CommandExecutor, ExternalCommand};
use crate::output::{Progress, windows_toolchain_notice};
use crate::platform::Platform;
use crate::source::{RepositorySpec, remove_stale_build, sync_repository};
use camino::Utf8PathBuf;
use log::{debug, info, warn};

/// Outcome of a completed installation.
#[derive(Debug)]
pub struct InstallReport {
    /// Installed files, executable first.
    pub installed: Vec<Utf8PathBuf>,
    /// Set when the build directories could not be removed. The install
    /// itself still succeeded.
    pub cleanup_error: Option<InstallerError>,
}

/// Runs the whole workflow for `config`.
///
/// # Errors
///
/// Returns the first fatal error. Nothing after the failing stage runs; in
/// particular a missing install directory, or a missing prebuilt SDL library
/// when the SDL stage is off, is reported before any external command is
/// invoked.
pub fn run_install(
    config: &InstallerConfig,
    executor: &dyn CommandExecutor,
    progress: &mut Progress<'_>,
) -> Result<InstallReport> {
    let paths = InstallPaths::resolve(config);
    if config.platform == Platform::Windows {
        progress.line(windows_toolchain_notice());
    }
    prepare_environment(&paths)?;
    let installer = installer_for(config.platform);

    if config.build_sdl {
        fetch_and_build(
            executor,
            &RepositorySpec::sdl(config, &paths),
            &CmakeProject::sdl(&paths),
            progress,
        )?;
    } else {
        debug!("SDL stage disabled; expecting SDL output in {}", paths.sdl_build_dir());
        installer.require_prebuilt_sdl(&paths)?;
    }

    fetch_and_build(
        executor,
        &RepositorySpec::shadercross(config, &paths),
        &CmakeProject::shadercross(config, &paths),
        progress,
    )?;

    let installed = installer.install(executor, &paths, progress)?;
    info!("installed {} files", installed.len());

    progress.line("Cleaning-up");
    let cleanup_error = match remove_build_dirs(&paths) {
        Ok(()) => None,
        Err(err) => {
            warn!("cleanup failed: {err}");
            progress.always(format!("Warning: {err}"));
            Some(err)
        }
    };

    Ok(InstallReport {
        installed,
        cleanup_error,
    })
}

/// Synchronises `spec`, clears its previous build output and builds it.
///
/// # Errors
///
/// Propagates source synchronisation and build failures.
pub fn fetch_and_build(
    executor: &dyn CommandExecutor,
    spec: &RepositorySpec,
    project: &CmakeProject,
    progress: &mut Progress<'_>,
) -> Result<()> {
    sync_repository(executor, spec, progress)?;
    remove_stale_build(&spec.build_dir())?;
    project.build(executor, progress)
}

/// External commands a run with `config` would invoke, in order.
///
/// Clone commands appear only for repositories not yet present on disk.
/// Nothing is executed or modified.
#[must_use]
pub fn plan(config: &InstallerConfig) -> Vec<ExternalCommand> {
    let paths = InstallPaths::resolve(config);
    let mut commands = Vec::new();

    if config.build_sdl {
        plan_project(
            &mut commands,
            &RepositorySpec::sdl(config, &paths),
            &CmakeProject::sdl(&paths),
        );
    }
    plan_project(
        &mut commands,
        &RepositorySpec::shadercross(config, &paths),
        &CmakeProject::shadercross(config, &paths),
    );

    commands.extend(installer_for(config.platform).runtime_path_commands(&paths));
    commands
}

fn plan_project(commands: &mut Vec<ExternalCommand>, spec: &RepositorySpec, project: &CmakeProject) {
    if !spec.local_path.exists() {
        commands.push(spec.clone_command());
    }
    commands.extend(spec.sync_commands());
    commands.push(project.configure_command());
    commands.push(project.compile_command());
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
