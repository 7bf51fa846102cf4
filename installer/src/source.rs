//! Source repository cloning and synchronisation.
//!
//! Synchronisation is destructive: an existing clone is hard-reset to the
//! target revision on every run, so local edits inside the clone (and its
//! submodules, when recursive) are discarded without warning.

use crate::config::{InstallerConfig, SDL_REPO_URL, SHADERCROSS_REPO_URL};
use crate::environment::{BUILD_DIR_NAME, InstallPaths};
use crate::error::Result;
use crate::executor::{CommandExecutor, ExternalCommand, StepKind, run_step};
use crate::output::Progress;
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fs;

/// One source dependency to fetch and synchronise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySpec {
    /// Short name used in progress labels.
    pub name: String,
    /// Remote URL to clone from.
    pub remote_url: String,
    /// Where the clone lives.
    pub local_path: Utf8PathBuf,
    /// Tag, branch or remote ref to reset to.
    pub target_revision: String,
    /// Whether submodules are cloned and reset too.
    pub recursive_submodules: bool,
}

impl RepositorySpec {
    /// The SDL_shadercross repository, with submodules.
    #[must_use]
    pub fn shadercross(config: &InstallerConfig, paths: &InstallPaths) -> Self {
        Self {
            name: "shadercross".to_owned(),
            remote_url: SHADERCROSS_REPO_URL.to_owned(),
            local_path: paths.shadercross_dir(),
            target_revision: config.shadercross_revision.clone(),
            recursive_submodules: true,
        }
    }

    /// The upstream SDL repository.
    #[must_use]
    pub fn sdl(config: &InstallerConfig, paths: &InstallPaths) -> Self {
        Self {
            name: "SDL".to_owned(),
            remote_url: SDL_REPO_URL.to_owned(),
            local_path: paths.sdl_dir(),
            target_revision: config.sdl_revision.clone(),
            recursive_submodules: false,
        }
    }

    /// Build output directory inside the clone.
    #[must_use]
    pub fn build_dir(&self) -> Utf8PathBuf {
        self.local_path.join(BUILD_DIR_NAME)
    }

    /// The `git clone` command for this repository.
    #[must_use]
    pub fn clone_command(&self) -> ExternalCommand {
        let mut command = ExternalCommand::new(format!("Cloning {}", self.name), "git").arg("clone");
        if self.recursive_submodules {
            command = command.arg("--recursive");
        }
        command.args([self.remote_url.as_str(), self.local_path.as_str()])
    }

    /// The `git fetch` and `git reset` commands, in order.
    #[must_use]
    pub fn sync_commands(&self) -> [ExternalCommand; 2] {
        let fetch = ExternalCommand::new(format!("Fetching {} origin", self.name), "git")
            .args(["fetch", "origin"])
            .current_dir(&self.local_path);

        let mut reset = ExternalCommand::new(
            format!("Resetting {} to {}", self.name, self.target_revision),
            "git",
        )
        .args(["reset", "--hard"]);
        if self.recursive_submodules {
            reset = reset.arg("--recurse-submodules");
        }
        let reset = reset
            .arg(self.target_revision.as_str())
            .current_dir(&self.local_path);

        [fetch, reset]
    }
}

/// Ensures a clone of `spec` exists and matches its target revision.
///
/// Clones when `spec.local_path` is absent, then always fetches and
/// hard-resets.
///
/// # Errors
///
/// Returns [`CloneFailed`](crate::error::InstallerError::CloneFailed) if the
/// clone fails and [`SyncFailed`](crate::error::InstallerError::SyncFailed) if
/// the fetch or reset fails.
pub fn sync_repository(
    executor: &dyn CommandExecutor,
    spec: &RepositorySpec,
    progress: &mut Progress<'_>,
) -> Result<()> {
    if spec.local_path.exists() {
        debug!("reusing existing clone at {}", spec.local_path);
    } else {
        run_step(executor, &spec.clone_command(), StepKind::Clone, progress)?;
    }

    for command in spec.sync_commands() {
        run_step(executor, &command, StepKind::Sync, progress)?;
    }

    Ok(())
}

/// Deletes a previous build output directory so the next build starts clean.
///
/// # Errors
///
/// Returns an I/O error if the directory exists but cannot be removed.
pub fn remove_stale_build(build_dir: &Utf8Path) -> Result<()> {
    if build_dir.exists() {
        debug!("removing stale build directory {build_dir}");
        fs::remove_dir_all(build_dir)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InstallerError;
    use crate::executor::MockCommandExecutor;
    use crate::test_utils::exit_status;
    use mockall::Sequence;
    use tempfile::TempDir;

    fn spec_at(local_path: Utf8PathBuf, recursive: bool) -> RepositorySpec {
        RepositorySpec {
            name: "shadercross".to_owned(),
            remote_url: SHADERCROSS_REPO_URL.to_owned(),
            local_path,
            target_revision: "origin/main".to_owned(),
            recursive_submodules: recursive,
        }
    }

    fn temp_root() -> (TempDir, Utf8PathBuf) {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("UTF-8 path");
        (temp, root)
    }

    fn expect_command(
        executor: &mut MockCommandExecutor,
        seq: &mut Sequence,
        line: impl Into<String>,
        code: i32,
    ) {
        let line = line.into();
        executor
            .expect_run()
            .withf(move |cmd| cmd.command_line() == line)
            .times(1)
            .in_sequence(seq)
            .returning(move |_| Ok(exit_status(code)));
    }

    #[test]
    fn recursive_spec_uses_submodule_flags() {
        let spec = spec_at(Utf8PathBuf::from("/w/SDL_shadercross"), true);
        assert_eq!(
            spec.clone_command().command_line(),
            "git clone --recursive https://github.com/libsdl-org/SDL_shadercross /w/SDL_shadercross"
        );
        let [fetch, reset] = spec.sync_commands();
        assert_eq!(fetch.command_line(), "git fetch origin");
        assert_eq!(
            reset.command_line(),
            "git reset --hard --recurse-submodules origin/main"
        );
        assert_eq!(reset.working_dir(), Some(Utf8Path::new("/w/SDL_shadercross")));
    }

    #[test]
    fn plain_spec_omits_submodule_flags() {
        let spec = spec_at(Utf8PathBuf::from("/w/SDL"), false);
        assert!(!spec.clone_command().command_line().contains("--recursive"));
        let [_, reset] = spec.sync_commands();
        assert_eq!(reset.command_line(), "git reset --hard origin/main");
    }

    #[test]
    fn missing_clone_is_cloned_then_synced() {
        let (_temp, root) = temp_root();
        let spec = spec_at(root.join("SDL_shadercross"), true);
        let clone_line = spec.clone_command().command_line();

        let mut executor = MockCommandExecutor::new();
        let mut seq = Sequence::new();
        expect_command(&mut executor, &mut seq, clone_line, 0);
        expect_command(&mut executor, &mut seq, "git fetch origin", 0);
        expect_command(
            &mut executor,
            &mut seq,
            "git reset --hard --recurse-submodules origin/main",
            0,
        );

        let mut sink = Vec::new();
        let mut progress = Progress::new(&mut sink, false);
        sync_repository(&executor, &spec, &mut progress).expect("sync failed");

        let text = String::from_utf8(sink).expect("UTF-8");
        assert!(text.contains("Cloning shadercross: git clone --recursive"));
        assert!(text.contains("Resetting shadercross to origin/main"));
    }

    #[test]
    fn existing_clone_skips_clone() {
        let (_temp, root) = temp_root();
        let spec = spec_at(root.join("SDL_shadercross"), true);
        fs::create_dir_all(&spec.local_path).expect("mkdir");

        let mut executor = MockCommandExecutor::new();
        let mut seq = Sequence::new();
        expect_command(&mut executor, &mut seq, "git fetch origin", 0);
        expect_command(
            &mut executor,
            &mut seq,
            "git reset --hard --recurse-submodules origin/main",
            0,
        );

        let mut sink = Vec::new();
        let mut progress = Progress::new(&mut sink, true);
        sync_repository(&executor, &spec, &mut progress).expect("sync failed");
    }

    #[test]
    fn clone_failure_stops_before_sync() {
        let (_temp, root) = temp_root();
        let spec = spec_at(root.join("SDL_shadercross"), false);

        let mut executor = MockCommandExecutor::new();
        executor
            .expect_run()
            .times(1)
            .returning(|_| Ok(exit_status(128)));

        let mut sink = Vec::new();
        let mut progress = Progress::new(&mut sink, true);
        let err = sync_repository(&executor, &spec, &mut progress).expect_err("expected failure");
        assert!(matches!(err, InstallerError::CloneFailed(_)));
    }

    #[test]
    fn fetch_failure_is_sync_failure() {
        let (_temp, root) = temp_root();
        let spec = spec_at(root.clone(), false);

        let mut executor = MockCommandExecutor::new();
        executor
            .expect_run()
            .times(1)
            .returning(|_| Ok(exit_status(1)));

        let mut sink = Vec::new();
        let mut progress = Progress::new(&mut sink, true);
        let err = sync_repository(&executor, &spec, &mut progress).expect_err("expected failure");
        assert!(matches!(
            err,
            InstallerError::SyncFailed(ref f) if f.command_line == "git fetch origin"
        ));
    }

    #[test]
    fn build_dirs_match_cleanup_targets() {
        let paths = InstallPaths {
            working_dir: Utf8PathBuf::from("/w"),
            bin_install_dir: Utf8PathBuf::from("/w/bin"),
            lib_install_dir: Utf8PathBuf::from("/w/lib"),
        };
        let shadercross = spec_at(paths.shadercross_dir(), true);
        let sdl = spec_at(paths.sdl_dir(), false);

        assert_eq!(shadercross.build_dir(), paths.shadercross_build_dir());
        assert_eq!(sdl.build_dir(), Utf8PathBuf::from("/w/SDL/build"));
    }

    #[test]
    fn stale_build_dir_is_removed() {
        let (_temp, root) = temp_root();
        let build = root.join("build");
        fs::create_dir_all(build.join("external")).expect("mkdir");
        fs::write(build.join("external").join("stale.o"), b"x").expect("write");

        remove_stale_build(&build).expect("remove failed");
        assert!(!build.exists());

        remove_stale_build(&build).expect("absent build dir should be fine");
    }
}
