//! Configuration file handling
//!
//! Settings are layered: built-in defaults, then `config.toml`, then the
//! `BMC_*` environment variables, then command-line flags.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::paths::{config_path, DEFAULT_RESULTS_DIR};
use super::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Target BMC and credentials
    #[serde(default)]
    pub target: TargetConfig,

    /// Readiness polling settings
    #[serde(default)]
    pub readiness: ReadinessConfig,

    /// Artifact output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// External pytest runner settings
    #[serde(default)]
    pub pytest: PytestConfig,

    /// Headless browser settings
    #[serde(default)]
    pub webui: WebUiConfig,

    /// Load test settings
    #[serde(default)]
    pub load: LoadConfig,

    /// Security heuristic settings
    #[serde(default)]
    pub security: SecurityConfig,
}

/// How requests authenticate against the BMC
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// HTTP Basic credentials on every request
    #[default]
    Basic,
    /// Redfish session token from SessionService
    Session,
}

/// Target BMC settings
#[derive(Debug, Deserialize, Clone)]
pub struct TargetConfig {
    /// Base URL of the BMC, without the `/redfish/v1` suffix
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default = "default_password")]
    pub password: String,

    #[serde(default)]
    pub auth: AuthMode,

    /// Per-request timeout for suite requests
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            username: default_username(),
            password: default_password(),
            auth: AuthMode::default(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_url() -> String {
    "https://localhost:2443".to_string()
}
fn default_username() -> String {
    "root".to_string()
}
fn default_password() -> String {
    "0penBmc".to_string()
}
fn default_request_timeout() -> u64 {
    30
}

/// Readiness polling settings in seconds
#[derive(Debug, Deserialize, Clone)]
pub struct ReadinessConfig {
    /// Total wait budget
    #[serde(default = "default_ready_timeout")]
    pub timeout_secs: u64,

    /// Constant delay between probes
    #[serde(default = "default_ready_interval")]
    pub interval_secs: u64,

    /// Timeout of a single probe request
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_ready_timeout(),
            interval_secs: default_ready_interval(),
            probe_timeout_secs: default_probe_timeout(),
        }
    }
}

fn default_ready_timeout() -> u64 {
    300
}
fn default_ready_interval() -> u64 {
    10
}
fn default_probe_timeout() -> u64 {
    10
}

/// Artifact output settings
#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
        }
    }
}

fn default_results_dir() -> PathBuf {
    PathBuf::from(DEFAULT_RESULTS_DIR)
}

/// External pytest runner settings
#[derive(Debug, Deserialize, Clone)]
pub struct PytestConfig {
    /// Python interpreter used as `<python> -m pytest`
    #[serde(default = "default_python")]
    pub python: String,

    #[serde(default = "default_unit_timeout")]
    pub unit_timeout_secs: u64,

    #[serde(default = "default_api_timeout")]
    pub api_timeout_secs: u64,

    /// Ask pytest-html for a self-contained HTML report
    #[serde(default = "default_true")]
    pub html_report: bool,
}

impl Default for PytestConfig {
    fn default() -> Self {
        Self {
            python: default_python(),
            unit_timeout_secs: default_unit_timeout(),
            api_timeout_secs: default_api_timeout(),
            html_report: true,
        }
    }
}

fn default_python() -> String {
    "python3".to_string()
}
fn default_unit_timeout() -> u64 {
    60
}
fn default_api_timeout() -> u64 {
    120
}
fn default_true() -> bool {
    true
}

/// Headless browser settings
#[derive(Debug, Deserialize, Clone)]
pub struct WebUiConfig {
    /// Explicit browser executable; PATH is searched when unset
    #[serde(default)]
    pub browser: Option<PathBuf>,

    /// Virtual time the browser waits for a page to settle
    #[serde(default = "default_page_wait")]
    pub page_wait_secs: u64,

    /// Hard limit for one browser invocation
    #[serde(default = "default_browser_timeout")]
    pub timeout_secs: u64,
}

impl Default for WebUiConfig {
    fn default() -> Self {
        Self {
            browser: None,
            page_wait_secs: default_page_wait(),
            timeout_secs: default_browser_timeout(),
        }
    }
}

fn default_page_wait() -> u64 {
    3
}
fn default_browser_timeout() -> u64 {
    30
}

/// Load test settings
#[derive(Debug, Deserialize, Clone)]
pub struct LoadConfig {
    #[serde(default = "default_load_requests")]
    pub requests: usize,

    /// Minimum success rate in percent
    #[serde(default = "default_load_threshold")]
    pub success_threshold: f64,

    #[serde(default = "default_load_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            requests: default_load_requests(),
            success_threshold: default_load_threshold(),
            request_timeout_secs: default_load_request_timeout(),
        }
    }
}

fn default_load_requests() -> usize {
    20
}
fn default_load_threshold() -> f64 {
    70.0
}
fn default_load_request_timeout() -> u64 {
    10
}

/// Security heuristic settings
#[derive(Debug, Deserialize, Clone)]
pub struct SecurityConfig {
    /// Minimum score in percent
    #[serde(default = "default_security_threshold")]
    pub pass_threshold: f64,

    /// Count a failed strict certificate check as acceptable
    #[serde(default = "default_true")]
    pub allow_self_signed: bool,

    #[serde(default = "default_tls_timeout")]
    pub tls_probe_timeout_secs: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            pass_threshold: default_security_threshold(),
            allow_self_signed: true,
            tls_probe_timeout_secs: default_tls_timeout(),
        }
    }
}

fn default_security_threshold() -> f64 {
    50.0
}
fn default_tls_timeout() -> u64 {
    5
}

impl Config {
    /// Load configuration from an explicit path or the default config file,
    /// then apply `BMC_*` environment overrides
    ///
    /// Returns default configuration if no file exists
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| super::Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| super::Error::ConfigParse(e.to_string()))
    }

    /// Override target settings from environment-style lookups
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("BMC_URL").filter(|v| !v.is_empty()) {
            self.target.url = url;
        }
        if let Some(username) = lookup("BMC_USERNAME").filter(|v| !v.is_empty()) {
            self.target.username = username;
        }
        if let Some(password) = lookup("BMC_PASSWORD") {
            self.target.password = password;
        }
    }

    /// Base URL with any trailing slash removed
    pub fn base_url(&self) -> &str {
        self.target.url.trim_end_matches('/')
    }
}
