//! Test suites
//!
//! Each suite is an independent best-effort probe of the BMC that yields a
//! single pass/fail outcome. Suites share the run's configuration, Redfish
//! session and results directory through [`SuiteContext`].

pub mod connectivity;
pub mod load;
pub mod process;
pub mod pytest;
pub mod security;
pub mod webui;

use std::path::Path;

use async_trait::async_trait;

use crate::common::config::Config;
use crate::common::Result;
use crate::redfish::RedfishSession;

pub use connectivity::BasicConnectionSuite;
pub use load::LoadSuite;
pub use pytest::{PytestKind, PytestSuite};
pub use security::SecuritySuite;
pub use webui::WebUiSuite;

/// Everything a suite may use during a run
pub struct SuiteContext<'a> {
    pub config: &'a Config,
    pub session: &'a RedfishSession,
    pub results_dir: &'a Path,
}

impl<'a> SuiteContext<'a> {
    pub fn new(config: &'a Config, session: &'a RedfishSession, results_dir: &'a Path) -> Self {
        Self {
            config,
            session,
            results_dir,
        }
    }
}

/// One independently graded probe
#[async_trait]
pub trait Suite: Send + Sync {
    /// Display name, also used in the report
    fn name(&self) -> &'static str;

    /// Run the suite
    ///
    /// `Ok(false)` and `Err` are both failures; errors are logged by the
    /// runner.
    async fn run(&self, ctx: &SuiteContext<'_>) -> Result<bool>;
}

/// The standard suites in run order
pub fn standard_suites() -> Vec<Box<dyn Suite>> {
    vec![
        Box::new(BasicConnectionSuite),
        Box::new(PytestSuite::new(PytestKind::Unit)),
        Box::new(PytestSuite::new(PytestKind::Api)),
        Box::new(WebUiSuite),
        Box::new(LoadSuite),
        Box::new(SecuritySuite),
    ]
}

/// `passed / total` as a percentage, 0 for an empty total
pub(crate) fn percent(passed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        passed as f64 / total as f64 * 100.0
    }
}
