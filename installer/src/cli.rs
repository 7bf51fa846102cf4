//! CLI argument definitions for the shadercross installer.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use camino::Utf8PathBuf;
use clap::Parser;

/// Build SDL_shadercross from source and install it.
#[derive(Parser, Debug, Clone)]
#[command(name = "shadercross-installer")]
#[command(version, about)]
#[command(long_about = concat!(
    "Build SDL_shadercross from source and install it.\n\n",
    "The installer clones (or hard-resets an existing clone of) SDL_shadercross, ",
    "builds it with CMake and Ninja in vendored mode, copies the executable and ",
    "its shared libraries into the install directories, rewrites the ",
    "executable's runtime library search path, and removes the build output.\n\n",
    "Both install directories must already exist. Local changes inside the ",
    "source clones are discarded on every run.",
))]
#[command(after_help = concat!(
    "CONFIGURATION FILE KEYS (all optional):\n",
    "  working_dir, bin_install_dir, lib_install_dir,\n",
    "  shadercross_revision, sdl_revision, build_sdl, enable_dxc,\n",
    "  sdl3_dir, step_timeout_secs\n\n",
    "EXAMPLES:\n",
    "  Build and install with platform defaults:\n",
    "    $ shadercross-installer\n\n",
    "  Also clone and build SDL first:\n",
    "    $ shadercross-installer --with-sdl\n\n",
    "  Preview the commands without running them:\n",
    "    $ shadercross-installer --dry-run\n",
))]
pub struct Cli {
    /// TOML file overriding the platform defaults.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Show configuration and planned commands, then exit without changes.
    #[arg(long)]
    pub dry_run: bool,

    /// Clone and build SDL before shadercross.
    #[arg(long)]
    pub with_sdl: bool,

    /// Increase log verbosity (repeatable: -v, -vv, -vvv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors and warnings still shown).
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl Cli {
    /// Log filter used when `RUST_LOG` is unset.
    ///
    /// # Examples
    ///
    /// ```
    /// use clap::Parser;
    /// use shadercross_installer::cli::Cli;
    ///
    /// assert_eq!(Cli::parse_from(["shadercross-installer"]).default_log_filter(), "warn");
    /// assert_eq!(Cli::parse_from(["shadercross-installer", "-vv"]).default_log_filter(), "debug");
    /// ```
    #[must_use]
    pub const fn default_log_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

impl Default for Cli {
    /// Creates a `Cli` equivalent to running with no arguments.
    ///
    /// # Examples
    ///
    /// ```
    /// use shadercross_installer::cli::Cli;
    ///
    /// let cli = Cli::default();
    /// assert!(!cli.dry_run);
    /// assert!(cli.config.is_none());
    /// ```
    fn default() -> Self {
        Self {
            config: None,
            dry_run: false,
            with_sdl: false,
            verbosity: 0,
            quiet: false,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
