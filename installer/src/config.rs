//! Installer configuration.
//!
//! [`InstallerConfig`] is built once at start-up from per-platform defaults,
//! optionally overridden by a TOML file, and then passed by reference to
//! every stage. Nothing reads configuration from ambient global state.

use crate::dirs::{BaseDirs, expand_home};
use crate::error::{InstallerError, Result};
use crate::platform::Platform;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::time::Duration;

/// Repository URL for SDL_shadercross.
pub const SHADERCROSS_REPO_URL: &str = "https://github.com/libsdl-org/SDL_shadercross";

/// Repository URL for SDL.
pub const SDL_REPO_URL: &str = "https://github.com/libsdl-org/SDL";

/// Revision SDL_shadercross is reset to.
pub const DEFAULT_SHADERCROSS_REVISION: &str = "origin/main";

/// Revision SDL is reset to when the SDL stage is active.
pub const DEFAULT_SDL_REVISION: &str = "release-3.2.6";

/// Immutable configuration shared by every stage of the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallerConfig {
    /// Host platform.
    pub platform: Platform,
    /// Directory holding the source clones.
    pub working_dir: Utf8PathBuf,
    /// Directory receiving the shadercross executable.
    pub bin_install_dir: Utf8PathBuf,
    /// Directory receiving the shared libraries.
    pub lib_install_dir: Utf8PathBuf,
    /// Revision (tag, branch or remote ref) shadercross is reset to.
    pub shadercross_revision: String,
    /// Revision SDL is reset to.
    pub sdl_revision: String,
    /// Whether SDL is cloned and built before shadercross.
    pub build_sdl: bool,
    /// Whether shadercross is configured with DirectXShaderCompiler support.
    pub enable_dxc: bool,
    /// Explicit `SDL3_DIR` passed to the shadercross configure step.
    pub sdl3_dir: Option<Utf8PathBuf>,
    /// Upper bound on each external step; `None` waits indefinitely.
    pub step_timeout: Option<Duration>,
}

/// Optional overrides read from a TOML configuration file.
///
/// Every key is optional; absent keys keep the platform default.
///
/// # Examples
///
/// ```
/// use shadercross_installer::config::ConfigOverrides;
///
/// let overrides = ConfigOverrides::parse("build_sdl = true\nstep_timeout_secs = 600\n")?;
/// assert_eq!(overrides.build_sdl, Some(true));
/// assert_eq!(overrides.step_timeout_secs, Some(600));
/// # Ok::<(), toml::de::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    /// Replacement working directory.
    pub working_dir: Option<String>,
    /// Replacement binary install directory.
    pub bin_install_dir: Option<String>,
    /// Replacement library install directory.
    pub lib_install_dir: Option<String>,
    /// Replacement shadercross revision.
    pub shadercross_revision: Option<String>,
    /// Replacement SDL revision.
    pub sdl_revision: Option<String>,
    /// Enables or disables the SDL stage.
    pub build_sdl: Option<bool>,
    /// Enables or disables DirectXShaderCompiler support.
    pub enable_dxc: Option<bool>,
    /// Explicit `SDL3_DIR` for the shadercross configure step.
    pub sdl3_dir: Option<String>,
    /// Per-step timeout in seconds.
    pub step_timeout_secs: Option<u64>,
}

impl ConfigOverrides {
    /// Parses overrides from TOML text.
    ///
    /// # Errors
    ///
    /// Returns the TOML error for malformed input or unknown keys.
    pub fn parse(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Reads and parses an override file.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::InvalidConfig`] if the file cannot be read or
    /// parsed.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| InstallerError::InvalidConfig {
                path: path.to_owned(),
                reason: e.to_string(),
            })?;
        Self::parse(&contents).map_err(|e| InstallerError::InvalidConfig {
            path: path.to_owned(),
            reason: e.message().to_owned(),
        })
    }
}

impl InstallerConfig {
    /// Builds the default configuration for `platform`.
    ///
    /// - macOS and Linux: clones live in `.`, binaries go to
    ///   `./build/bin/Darwin` and libraries to `./build/lib/Darwin`.
    /// - Windows: clones live in `~/source/SDL3`; binaries and libraries both
    ///   go to `~/AppData/Local/Programs`.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::HomeDirectoryUnavailable`] if a default path
    /// needs `~` expansion and no home directory is known.
    pub fn defaults(platform: Platform, dirs: &dyn BaseDirs) -> Result<Self> {
        let (working_dir, bin_install_dir, lib_install_dir) = match platform {
            Platform::MacOs | Platform::Linux => (".", "./build/bin/Darwin", "./build/lib/Darwin"),
            Platform::Windows => (
                "~/source/SDL3",
                "~/AppData/Local/Programs",
                "~/AppData/Local/Programs",
            ),
        };

        Ok(Self {
            platform,
            working_dir: expand_home(working_dir, dirs)?,
            bin_install_dir: expand_home(bin_install_dir, dirs)?,
            lib_install_dir: expand_home(lib_install_dir, dirs)?,
            shadercross_revision: DEFAULT_SHADERCROSS_REVISION.to_owned(),
            sdl_revision: DEFAULT_SDL_REVISION.to_owned(),
            build_sdl: false,
            enable_dxc: true,
            sdl3_dir: None,
            step_timeout: None,
        })
    }

    /// Builds the configuration for `platform`, applying the override file at
    /// `config_path` when one is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the override file is invalid or a path cannot be
    /// expanded.
    pub fn load(
        platform: Platform,
        config_path: Option<&Utf8Path>,
        dirs: &dyn BaseDirs,
    ) -> Result<Self> {
        let defaults = Self::defaults(platform, dirs)?;
        match config_path {
            Some(path) => defaults.with_overrides(ConfigOverrides::load(path)?, dirs),
            None => Ok(defaults),
        }
    }

    /// Resolves the full configuration for the host identified by
    /// `platform_identifier`: platform defaults, the optional override file,
    /// the SDL stage flag, then anchoring at `cwd`.
    ///
    /// The platform is checked first, so an unsupported host fails before the
    /// override file is read.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::UnsupportedPlatform`] for an unknown host,
    /// or any error from [`load`](Self::load).
    pub fn resolve(
        platform_identifier: &str,
        config_path: Option<&Utf8Path>,
        with_sdl: bool,
        cwd: &Utf8Path,
        dirs: &dyn BaseDirs,
    ) -> Result<Self> {
        let platform = Platform::from_identifier(platform_identifier)?;
        Ok(Self::load(platform, config_path, dirs)?
            .with_sdl_stage(with_sdl)
            .anchored(cwd))
    }

    /// Applies `overrides` on top of this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::HomeDirectoryUnavailable`] if an overriding
    /// path needs `~` expansion and no home directory is known.
    pub fn with_overrides(self, overrides: ConfigOverrides, dirs: &dyn BaseDirs) -> Result<Self> {
        let expand = |value: Option<String>, fallback: Utf8PathBuf| -> Result<Utf8PathBuf> {
            value.map_or(Ok(fallback), |path| expand_home(&path, dirs))
        };

        Ok(Self {
            platform: self.platform,
            working_dir: expand(overrides.working_dir, self.working_dir)?,
            bin_install_dir: expand(overrides.bin_install_dir, self.bin_install_dir)?,
            lib_install_dir: expand(overrides.lib_install_dir, self.lib_install_dir)?,
            shadercross_revision: overrides
                .shadercross_revision
                .unwrap_or(self.shadercross_revision),
            sdl_revision: overrides.sdl_revision.unwrap_or(self.sdl_revision),
            build_sdl: overrides.build_sdl.unwrap_or(self.build_sdl),
            enable_dxc: overrides.enable_dxc.unwrap_or(self.enable_dxc),
            sdl3_dir: match overrides.sdl3_dir {
                Some(path) => Some(expand_home(&path, dirs)?),
                None => self.sdl3_dir,
            },
            step_timeout: overrides
                .step_timeout_secs
                .map(Duration::from_secs)
                .or(self.step_timeout),
        })
    }

    /// Resolves relative directories against `base`.
    ///
    /// The installed executable's runtime search path must be absolute, so
    /// the binary resolves this against the current directory at start-up.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::{Utf8Path, Utf8PathBuf};
    /// use shadercross_installer::config::InstallerConfig;
    /// use shadercross_installer::dirs::SystemBaseDirs;
    /// use shadercross_installer::platform::Platform;
    ///
    /// let config = InstallerConfig::defaults(Platform::Linux, &SystemBaseDirs)?
    ///     .anchored(Utf8Path::new("/src"));
    /// assert_eq!(config.working_dir, Utf8PathBuf::from("/src"));
    /// assert_eq!(config.lib_install_dir, Utf8PathBuf::from("/src/build/lib/Darwin"));
    /// # Ok::<(), shadercross_installer::error::InstallerError>(())
    /// ```
    #[must_use]
    pub fn anchored(self, base: &Utf8Path) -> Self {
        Self {
            working_dir: anchor(base, &self.working_dir),
            bin_install_dir: anchor(base, &self.bin_install_dir),
            lib_install_dir: anchor(base, &self.lib_install_dir),
            sdl3_dir: self.sdl3_dir.as_deref().map(|dir| anchor(base, dir)),
            ..self
        }
    }

    /// Returns a copy with the SDL stage forced on.
    #[must_use]
    pub fn with_sdl_stage(mut self, enabled: bool) -> Self {
        self.build_sdl = self.build_sdl || enabled;
        self
    }
}

fn anchor(base: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    if path.is_absolute() {
        return path.to_owned();
    }
    let mut anchored = base.to_owned();
    for component in path.components() {
        if component != Utf8Component::CurDir {
            anchored.push(component);
        }
    }
    anchored
}
