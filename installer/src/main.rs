//! shadercross installer CLI entrypoint.
//!
//! This binary builds SDL_shadercross from source and installs the executable
//! together with the shared libraries it needs, then removes the build
//! output.

use camino::Utf8PathBuf;
use clap::Parser;
use shadercross_installer::cli::Cli;
use shadercross_installer::config::InstallerConfig;
use shadercross_installer::dirs::SystemBaseDirs;
use shadercross_installer::error::{InstallerError, Result};
use shadercross_installer::executor::SystemCommandExecutor;
use shadercross_installer::output::{DryRunInfo, Progress, success_message, write_stderr_line};
use shadercross_installer::pipeline::{plan, run_install};
use std::io::Write;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

/// Routes `log` records to stderr. `RUST_LOG` wins over `-v`.
fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.default_log_filter()));
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init()
        .is_err()
    {
        // A subscriber is already installed; keep it.
    }
}

fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<()> {
    let config = resolve_config(cli)?;

    // Dry-run mode: show what would be done without side effects
    if cli.dry_run {
        let plan = plan(&config);
        let info = DryRunInfo {
            config: &config,
            plan: &plan,
        };
        write_stderr_line(stderr, info.display_text());
        return Ok(());
    }

    let executor = SystemCommandExecutor::new(config.step_timeout);
    let mut progress = Progress::new(stderr, cli.quiet);
    let report = run_install(&config, &executor, &mut progress)?;

    progress.line("");
    progress.line(success_message(
        report.installed.len(),
        &config.bin_install_dir,
    ));
    Ok(())
}

/// Builds the configuration once for the host platform, anchored at the
/// current directory.
fn resolve_config(cli: &Cli) -> Result<InstallerConfig> {
    let cwd = Utf8PathBuf::try_from(std::env::current_dir()?)
        .map_err(|e| InstallerError::Io(e.into_io_error()))?;

    InstallerConfig::resolve(
        std::env::consts::OS,
        cli.config.as_deref(),
        cli.with_sdl,
        &cwd,
        &SystemBaseDirs,
    )
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            1
        }
    }
}
