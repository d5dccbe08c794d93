//! BMC runner - readiness polling and test suite orchestration
//!
//! This library waits for a Redfish BMC to become ready, runs a fixed
//! sequence of suites against it and reports the aggregate outcome.

pub mod cli;
pub mod commands;
pub mod common;
pub mod orchestrator;
pub mod redfish;
pub mod suites;

// Re-export commonly used types for tests
pub use common::config::Config;
pub use common::{Error, Result};
pub use orchestrator::{Orchestrator, RunReport, RunStatus, SuiteResult, SuiteRunner};
pub use redfish::RedfishSession;
