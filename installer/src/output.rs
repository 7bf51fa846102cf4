//! Progress and summary output for the installer CLI.
//!
//! Everything the user sees goes to stderr, one line at a time. Progress
//! lines respect `--quiet`; errors are always printed by the caller.

use crate::config::InstallerConfig;
use crate::executor::ExternalCommand;
use camino::Utf8Path;
use std::fmt::Display;
use std::io::Write;

/// Writes one line to `stderr`, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// Progress sink shared by the workflow stages.
pub struct Progress<'a> {
    sink: &'a mut dyn Write,
    quiet: bool,
}

impl<'a> Progress<'a> {
    /// Creates a progress sink writing to `sink` unless `quiet` is set.
    pub fn new(sink: &'a mut dyn Write, quiet: bool) -> Self {
        Self { sink, quiet }
    }

    /// Writes a progress line unless quiet.
    pub fn line(&mut self, message: impl Display) {
        if !self.quiet {
            write_stderr_line(&mut *self.sink, message);
        }
    }

    /// Writes a line even in quiet mode. Used for warnings.
    pub fn always(&mut self, message: impl Display) {
        write_stderr_line(&mut *self.sink, message);
    }
}

/// Notice shown on Windows before any work starts.
#[must_use]
pub fn windows_toolchain_notice() -> String {
    let rule = "!".repeat(83);
    format!(
        concat!(
            "{rule}\n",
            "If you get the error:\n",
            "    No CMAKE_C_COMPILER could be found.\n",
            "then you need to run this tool from a Developer Command Prompt for Visual Studio.\n",
            "{rule}"
        ),
        rule = rule
    )
}

/// Banner printed before artefacts are copied.
#[must_use]
pub fn install_banner(bin_dir: &Utf8Path, lib_dir: &Utf8Path) -> String {
    format!("Installing binaries to {bin_dir} and libraries to {lib_dir}")
}

/// Summary printed after a successful installation.
#[must_use]
pub fn success_message(count: usize, bin_dir: &Utf8Path) -> String {
    let plural = if count == 1 { "file" } else { "files" };
    format!("Successfully installed shadercross ({count} {plural}); run it from {bin_dir}")
}

/// Describes what a run would do, for `--dry-run`.
///
/// # Example
///
/// ```
/// use shadercross_installer::config::InstallerConfig;
/// use shadercross_installer::dirs::SystemBaseDirs;
/// use shadercross_installer::output::DryRunInfo;
/// use shadercross_installer::platform::Platform;
///
/// let config = InstallerConfig::defaults(Platform::Linux, &SystemBaseDirs)?;
/// let info = DryRunInfo { config: &config, plan: &[] };
///
/// let text = info.display_text();
/// assert!(text.contains("Dry run"));
/// assert!(text.contains("origin/main"));
/// # Ok::<(), shadercross_installer::error::InstallerError>(())
/// ```
#[derive(Debug)]
pub struct DryRunInfo<'a> {
    /// Resolved configuration.
    pub config: &'a InstallerConfig,
    /// External commands the run would invoke, in order.
    pub plan: &'a [ExternalCommand],
}

impl DryRunInfo<'_> {
    /// Format the dry-run information for display.
    #[must_use]
    pub fn display_text(&self) -> String {
        let config = self.config;
        let mut lines = vec![
            "Dry run - no files will be modified".to_owned(),
            String::new(),
            format!("Platform: {}", config.platform),
            format!("Working directory: {}", config.working_dir),
            format!("Binary install directory: {}", config.bin_install_dir),
            format!("Library install directory: {}", config.lib_install_dir),
            format!("shadercross revision: {}", config.shadercross_revision),
            format!("Build SDL: {}", config.build_sdl),
        ];

        if config.build_sdl {
            lines.push(format!("SDL revision: {}", config.sdl_revision));
        }
        lines.push(format!("DXC support: {}", config.enable_dxc));
        if let Some(timeout) = config.step_timeout {
            lines.push(format!("Step timeout: {}s", timeout.as_secs()));
        }

        lines.push(String::new());
        lines.push("Commands:".to_owned());
        for command in self.plan {
            lines.push(format!("  {command}"));
        }

        lines.join("\n")
    }
}
