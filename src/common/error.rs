//! Error types for the BMC runner
//!
//! Errors never abort a run once the target is ready: suites convert them
//! into failed results. Messages should still say what to check next.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the BMC runner
#[derive(Error, Debug)]
pub enum Error {
    // === Target Errors ===
    #[error("BMC at {url} did not become ready within {} seconds", .waited.as_secs())]
    TargetNotReady { url: String, waited: Duration },

    #[error("HTTP request to {path} failed: {source}")]
    Http {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected status {status} from {path}")]
    UnexpectedStatus { path: String, status: u16 },

    #[error("Invalid Redfish payload from {path}: {message}")]
    InvalidPayload { path: String, message: String },

    #[error("Session login failed: {0}")]
    SessionLogin(String),

    // === External Tool Errors ===
    #[error("Failed to start '{program}': {error}")]
    ProcessSpawn { program: String, error: String },

    #[error("'{program}' timed out after {} seconds", .after.as_secs())]
    ProcessTimeout { program: String, after: Duration },

    #[error("No headless browser found. Searched: {searched}. Set [webui] browser in config.toml")]
    BrowserUnavailable { searched: String },

    #[error("Test runner '{0}' not found on PATH")]
    RunnerNotFound(String),

    // === Suite Errors ===
    #[error("Unknown suite '{0}'. Use 'bmc-runner list' to see registered suites")]
    UnknownSuite(String),

    #[error("Suite panicked: {0}")]
    SuitePanicked(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    #[error("Failed to write '{path}': {error}")]
    FileWrite { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Wrap a transport error with the request path it belongs to
    pub fn http(path: &str, source: reqwest::Error) -> Self {
        Self::Http {
            path: path.to_string(),
            source,
        }
    }

    /// Create an unexpected status error
    pub fn unexpected_status(path: &str, status: u16) -> Self {
        Self::UnexpectedStatus {
            path: path.to_string(),
            status,
        }
    }

    /// Create a browser unavailable error with the names that were searched
    pub fn browser_unavailable<S: AsRef<str>>(searched: &[S]) -> Self {
        Self::BrowserUnavailable {
            searched: searched.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join(", "),
        }
    }

    /// Create a process spawn error
    pub fn process_spawn(program: &str, error: impl ToString) -> Self {
        Self::ProcessSpawn {
            program: program.to_string(),
            error: error.to_string(),
        }
    }
}
