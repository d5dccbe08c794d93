//! CLI command definitions
//!
//! Defines the clap commands for the BMC runner.

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::common::config::{AuthMode, Config};

#[derive(Subcommand)]
pub enum Commands {
    /// Wait for the BMC, run every suite and write the report
    Run {
        #[command(flatten)]
        target: TargetArgs,

        /// Directory for reports and artifacts (default: test-results)
        #[arg(long)]
        results_dir: Option<PathBuf>,

        /// Seconds to wait for the BMC before giving up
        #[arg(long)]
        ready_timeout: Option<u64>,
    },

    /// Only wait for the BMC to become ready
    Wait {
        #[command(flatten)]
        target: TargetArgs,

        /// Seconds to wait before giving up
        #[arg(long)]
        timeout: Option<u64>,

        /// Seconds between probes
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Run a single suite, skipping the readiness wait
    Suite {
        /// Suite name, e.g. "load-tests" or "Security Checks"
        name: String,

        #[command(flatten)]
        target: TargetArgs,

        /// Directory for artifacts (default: test-results)
        #[arg(long)]
        results_dir: Option<PathBuf>,
    },

    /// List registered suites in run order
    List,
}

/// Target overrides, applied after config file and environment
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// BMC base URL (overrides BMC_URL)
    #[arg(long)]
    pub url: Option<String>,

    /// BMC user (overrides BMC_USERNAME)
    #[arg(long)]
    pub username: Option<String>,

    /// BMC password (overrides BMC_PASSWORD)
    #[arg(long)]
    pub password: Option<String>,

    /// Authenticate with a Redfish session token instead of Basic auth
    #[arg(long)]
    pub session_auth: bool,
}

impl TargetArgs {
    pub fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.url {
            config.target.url = url.clone();
        }
        if let Some(username) = &self.username {
            config.target.username = username.clone();
        }
        if let Some(password) = &self.password {
            config.target.password = password.clone();
        }
        if self.session_auth {
            config.target.auth = AuthMode::Session;
        }
    }
}
