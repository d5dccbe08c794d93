//! Suite orchestration
//!
//! Waits for the BMC, runs the registered suites in order, then builds,
//! prints and persists the run report.

pub mod poller;
pub mod report;
pub mod runner;

use std::time::Duration;

use chrono::Local;
use colored::Colorize;

use crate::common::config::Config;
use crate::common::paths::{ensure_results_dir, REPORT_FILE};
use crate::common::Result;
use crate::redfish::RedfishSession;
use crate::suites::SuiteContext;

pub use poller::{wait_until_ready, PollOutcome, ReadinessProbe, ServiceRootProbe};
pub use report::{RunReport, RunStatus, SuiteResult};
pub use runner::{RunOutcome, SuiteRunner};

/// What a full run produced
#[derive(Debug)]
pub struct RunSummary {
    pub poll: PollOutcome,
    /// None when the target never became ready
    pub report: Option<RunReport>,
    pub success: bool,
}

impl RunSummary {
    pub fn results(&self) -> &[SuiteResult] {
        self.report
            .as_ref()
            .map(|r| r.test_results.as_slice())
            .unwrap_or(&[])
    }
}

/// Drives a complete run against one target
pub struct Orchestrator<'a> {
    config: &'a Config,
    runner: SuiteRunner,
}

impl<'a> Orchestrator<'a> {
    pub fn new(config: &'a Config, runner: SuiteRunner) -> Self {
        Self { config, runner }
    }

    pub fn runner(&self) -> &SuiteRunner {
        &self.runner
    }

    /// Run against the configured target using the service root as probe
    pub async fn run(&self) -> Result<RunSummary> {
        let mut session = RedfishSession::from_config(self.config)?;
        let probe = ServiceRootProbe {
            session: session.clone(),
            timeout: Duration::from_secs(self.config.readiness.probe_timeout_secs),
        };
        self.execute(&mut session, &probe).await
    }

    /// Run with an explicit session and readiness probe
    pub async fn execute(
        &self,
        session: &mut RedfishSession,
        probe: &dyn ReadinessProbe,
    ) -> Result<RunSummary> {
        let results_dir = ensure_results_dir(&self.config.output.results_dir)?;

        println!("{}", "Starting BMC Test Suite".blue().bold());
        println!("BMC URL: {}", self.config.base_url());
        println!("Start time: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
        println!("{}", "=".repeat(60));

        let poll = wait_until_ready(
            probe,
            Duration::from_secs(self.config.readiness.timeout_secs),
            Duration::from_secs(self.config.readiness.interval_secs),
        )
        .await;

        if !poll.ready {
            println!("{}", "Cannot proceed - BMC is not ready".red().bold());
            return Ok(RunSummary {
                poll,
                report: None,
                success: false,
            });
        }

        if let Err(e) = session.authenticate(self.config.target.auth).await {
            tracing::warn!(error = %e, "Session login failed, continuing with Basic credentials");
        }

        let ctx = SuiteContext::new(self.config, session, &results_dir);
        let outcome = self.runner.run_all(&ctx).await;

        if let Err(e) = session.logout().await {
            tracing::warn!(error = %e, "Failed to delete Redfish session");
        }

        println!("\n{}", "GENERATING FINAL TEST REPORT".blue().bold());
        let report = RunReport::new(self.config.base_url(), outcome.results);
        report.print_table();

        let report_path = results_dir.join(REPORT_FILE);
        match report.write_json(&report_path) {
            Ok(()) => tracing::info!(path = %report_path.display(), "Report written"),
            Err(e) => tracing::error!(error = %e, "Failed to write report"),
        }

        println!(
            "\nTest execution completed at: {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        println!("Test results saved in: {}", results_dir.display());

        let success = report.all_passed() && outcome.all_passed;
        Ok(RunSummary {
            poll,
            report: Some(report),
            success,
        })
    }
}
