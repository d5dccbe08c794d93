//! CLI command handling
//!
//! Loads configuration, sets up logging and dispatches to the
//! orchestrator. Returns whether the command succeeded.

use std::path::{Path, PathBuf};
use std::time::Duration;

use colored::Colorize;

use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::paths::ensure_results_dir;
use crate::common::{logging, Error, Result};
use crate::orchestrator::{
    runner::run_contained, wait_until_ready, Orchestrator, ServiceRootProbe, SuiteRunner,
};
use crate::redfish::RedfishSession;
use crate::suites::SuiteContext;

/// Dispatch a CLI command
pub async fn dispatch(command: Commands, config_path: Option<&Path>, verbose: bool) -> Result<bool> {
    match command {
        Commands::Run {
            target,
            results_dir,
            ready_timeout,
        } => {
            let mut config = Config::load(config_path)?;
            target.apply(&mut config);
            apply_results_dir(&mut config, results_dir);
            if let Some(secs) = ready_timeout {
                config.readiness.timeout_secs = secs;
            }

            let _guard = logging::init_run(&config.output.results_dir, verbose);
            let orchestrator = Orchestrator::new(&config, SuiteRunner::standard());
            let summary = orchestrator.run().await?;
            Ok(summary.success)
        }

        Commands::Wait {
            target,
            timeout,
            interval,
        } => {
            logging::init_cli(verbose);
            let mut config = Config::load(config_path)?;
            target.apply(&mut config);
            if let Some(secs) = timeout {
                config.readiness.timeout_secs = secs;
            }
            if let Some(secs) = interval {
                config.readiness.interval_secs = secs;
            }

            let probe = ServiceRootProbe {
                session: RedfishSession::from_config(&config)?,
                timeout: Duration::from_secs(config.readiness.probe_timeout_secs),
            };
            let outcome = wait_until_ready(
                &probe,
                Duration::from_secs(config.readiness.timeout_secs),
                Duration::from_secs(config.readiness.interval_secs),
            )
            .await;

            if !outcome.ready {
                return Err(Error::TargetNotReady {
                    url: config.base_url().to_string(),
                    waited: outcome.elapsed,
                });
            }
            println!(
                "BMC ready after {} attempt(s) ({}s)",
                outcome.attempts,
                outcome.elapsed.as_secs()
            );
            Ok(true)
        }

        Commands::Suite {
            name,
            target,
            results_dir,
        } => {
            logging::init_cli(verbose);
            let mut config = Config::load(config_path)?;
            target.apply(&mut config);
            apply_results_dir(&mut config, results_dir);

            let runner = SuiteRunner::standard();
            let suite = runner.find(&name)?;
            let results_dir = ensure_results_dir(&config.output.results_dir)?;

            let mut session = RedfishSession::from_config(&config)?;
            if let Err(e) = session.authenticate(config.target.auth).await {
                tracing::warn!(error = %e, "Session login failed, continuing with Basic credentials");
            }
            let passed = {
                let ctx = SuiteContext::new(&config, &session, &results_dir);
                run_contained(suite, &ctx).await
            };
            if let Err(e) = session.logout().await {
                tracing::warn!(error = %e, "Failed to delete Redfish session");
            }

            if passed {
                println!("{} {}", "✓".green(), format!("{} PASSED", suite.name()).as_str().green());
            } else {
                println!("{} {}", "✗".red(), format!("{} FAILED", suite.name()).as_str().red());
            }
            Ok(passed)
        }

        Commands::List => {
            for (i, name) in SuiteRunner::standard().names().iter().enumerate() {
                println!("  {}. {}", i + 1, name);
            }
            Ok(true)
        }
    }
}

fn apply_results_dir(config: &mut Config, results_dir: Option<PathBuf>) {
    if let Some(dir) = results_dir {
        config.output.results_dir = dir;
    }
}
