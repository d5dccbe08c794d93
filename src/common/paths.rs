//! Configuration and artifact paths
//!
//! The config file lives in the platform config directory. Run artifacts
//! go to a results directory relative to the working directory unless
//! configured otherwise.

use std::io;
use std::path::{Path, PathBuf};

/// Application name used for platform directories
const APP_NAME: &str = "bmc-runner";

/// Default directory for run artifacts
pub const DEFAULT_RESULTS_DIR: &str = "test-results";

/// Load test statistics file name
pub const LOAD_RESULTS_FILE: &str = "load-test-results.json";

/// Run report file name
pub const REPORT_FILE: &str = "test-execution-report.json";

/// Trace log of a full run
pub const RUN_LOG_FILE: &str = "run.log";

/// Get the configuration directory path
///
/// Uses the directories crate for platform-appropriate locations:
/// - Linux: `~/.config/bmc-runner/`
/// - macOS: `~/Library/Application Support/bmc-runner/`
/// - Windows: `%APPDATA%\bmc-runner\`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Ensure the results directory exists, returning it
pub fn ensure_results_dir(dir: &Path) -> io::Result<PathBuf> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
    }
    Ok(dir.to_path_buf())
}
