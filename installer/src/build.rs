//! CMake build orchestration.
//!
//! Each project is configured into a freshly deleted `build` directory with
//! the Ninja generator in Release mode, then compiled with `cmake --build`.
//! There is no incremental state kept between runs.

use crate::config::InstallerConfig;
use crate::environment::{BUILD_DIR_NAME, InstallPaths};
use crate::error::Result;
use crate::executor::{CommandExecutor, ExternalCommand, StepKind, run_step};
use crate::output::Progress;
use camino::Utf8PathBuf;

/// Build generator executable.
pub const CMAKE: &str = "cmake";

/// Generator backend passed to CMake.
pub const GENERATOR: &str = "Ninja";

/// A CMake project to configure and build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmakeProject {
    /// Short name used in progress labels.
    pub name: String,
    /// Source tree root; commands run from here.
    pub source_dir: Utf8PathBuf,
    /// Cache definitions passed as `-D{key}={value}`, in order.
    pub definitions: Vec<(String, String)>,
}

impl CmakeProject {
    /// The upstream SDL project with default options.
    #[must_use]
    pub fn sdl(paths: &InstallPaths) -> Self {
        Self {
            name: "SDL".to_owned(),
            source_dir: paths.sdl_dir(),
            definitions: vec![release_build_type()],
        }
    }

    /// The SDL_shadercross project in vendored mode.
    ///
    /// `SDL3_DIR` points at the SDL build directory when the SDL stage is
    /// active, otherwise at the configured `sdl3_dir` if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use shadercross_installer::build::CmakeProject;
    /// use shadercross_installer::config::InstallerConfig;
    /// use shadercross_installer::dirs::SystemBaseDirs;
    /// use shadercross_installer::environment::InstallPaths;
    /// use shadercross_installer::platform::Platform;
    ///
    /// let config = InstallerConfig::defaults(Platform::Linux, &SystemBaseDirs)?;
    /// let paths = InstallPaths::resolve(&config);
    /// let project = CmakeProject::shadercross(&config, &paths);
    ///
    /// assert_eq!(
    ///     project.configure_command().command_line(),
    ///     "cmake -Bbuild -S. -GNinja -DCMAKE_BUILD_TYPE=Release \
    ///      -DSDLSHADERCROSS_DXC=ON -DSDLSHADERCROSS_VENDORED=ON"
    /// );
    /// # Ok::<(), shadercross_installer::error::InstallerError>(())
    /// ```
    #[must_use]
    pub fn shadercross(config: &InstallerConfig, paths: &InstallPaths) -> Self {
        let mut definitions = vec![
            release_build_type(),
            (
                "SDLSHADERCROSS_DXC".to_owned(),
                on_off(config.enable_dxc).to_owned(),
            ),
            ("SDLSHADERCROSS_VENDORED".to_owned(), "ON".to_owned()),
        ];

        let sdl3_dir = if config.build_sdl {
            Some(paths.sdl_build_dir())
        } else {
            config.sdl3_dir.clone()
        };
        if let Some(dir) = sdl3_dir {
            definitions.push(("SDL3_DIR".to_owned(), dir.into_string()));
        }

        Self {
            name: "shadercross".to_owned(),
            source_dir: paths.shadercross_dir(),
            definitions,
        }
    }

    /// The build generator invocation.
    #[must_use]
    pub fn configure_command(&self) -> ExternalCommand {
        ExternalCommand::new(format!("Configuring {}", self.name), CMAKE)
            .arg(format!("-B{BUILD_DIR_NAME}"))
            .arg("-S.")
            .arg(format!("-G{GENERATOR}"))
            .args(
                self.definitions
                    .iter()
                    .map(|(key, value)| format!("-D{key}={value}")),
            )
            .current_dir(&self.source_dir)
    }

    /// The build tool invocation.
    #[must_use]
    pub fn compile_command(&self) -> ExternalCommand {
        ExternalCommand::new(format!("Building {}", self.name), CMAKE)
            .args(["--build", BUILD_DIR_NAME])
            .current_dir(&self.source_dir)
    }

    /// Configures and compiles the project.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigureFailed`](crate::error::InstallerError::ConfigureFailed)
    /// or [`CompileFailed`](crate::error::InstallerError::CompileFailed). The
    /// compile step is not attempted if configuration fails.
    pub fn build(&self, executor: &dyn CommandExecutor, progress: &mut Progress<'_>) -> Result<()> {
        run_step(
            executor,
            &self.configure_command(),
            StepKind::Configure,
            progress,
        )?;
        run_step(executor, &self.compile_command(), StepKind::Compile, progress)
    }
}

fn release_build_type() -> (String, String) {
    ("CMAKE_BUILD_TYPE".to_owned(), "Release".to_owned())
}

const fn on_off(enabled: bool) -> &'static str {
    if enabled { "ON" } else { "OFF" }
}
