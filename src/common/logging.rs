//! Logging and tracing configuration
//!
//! Progress goes to stdout through a compact fmt layer. Full runs also
//! write a detailed trace to `run.log` in the results directory.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::paths::RUN_LOG_FILE;

fn default_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("bmc_runner=debug,warn")
        } else {
            EnvFilter::new("bmc_runner=info,warn")
        }
    })
}

/// Initialize tracing for one-shot commands (stdout logging)
///
/// Logs are controlled by the `RUST_LOG` environment variable.
/// Default level is INFO for this crate, WARN for dependencies.
pub fn init_cli(verbose: bool) {
    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// Initialize tracing for a full run (stdout + `run.log`)
///
/// The returned guard must be held until the run ends so buffered lines
/// are flushed. Falls back to stdout only if the results directory cannot
/// be created.
pub fn init_run(results_dir: &Path, verbose: bool) -> Option<WorkerGuard> {
    if let Err(e) = std::fs::create_dir_all(results_dir) {
        eprintln!("Warning: Could not create {}: {}", results_dir.display(), e);
        init_cli(verbose);
        return None;
    }

    let appender = tracing_appender::rolling::never(results_dir, RUN_LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    // File logging with full details
    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    let stdout_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .compact();

    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Some(guard)
}
