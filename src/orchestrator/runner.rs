//! Suite runner
//!
//! Runs every registered suite in declaration order. A failing, erroring
//! or panicking suite is recorded as failed and the next one still runs.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use colored::Colorize;
use futures_util::FutureExt;

use crate::common::{Error, Result};
use crate::suites::{self, Suite, SuiteContext};

use super::report::SuiteResult;

/// Results of running every suite
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub results: Vec<SuiteResult>,
    pub all_passed: bool,
}

/// Ordered, fixed list of suites
pub struct SuiteRunner {
    suites: Vec<Box<dyn Suite>>,
}

impl SuiteRunner {
    pub fn new(suites: Vec<Box<dyn Suite>>) -> Self {
        Self { suites }
    }

    /// The six standard suites in their run order
    pub fn standard() -> Self {
        Self::new(suites::standard_suites())
    }

    pub fn len(&self) -> usize {
        self.suites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.suites.iter().map(|s| s.name()).collect()
    }

    /// Look up a suite by name, ignoring case and separators
    pub fn find(&self, name: &str) -> Result<&dyn Suite> {
        let wanted = normalize(name);
        self.suites
            .iter()
            .find(|s| normalize(s.name()) == wanted)
            .map(|s| &**s)
            .ok_or_else(|| Error::UnknownSuite(name.to_string()))
    }

    /// Run all suites; the AND of outcomes is computed after the last one
    pub async fn run_all(&self, ctx: &SuiteContext<'_>) -> RunOutcome {
        let mut results = Vec::with_capacity(self.suites.len());

        for suite in &self.suites {
            let name = suite.name();
            println!("\n{} {}", "EXECUTING:".blue().bold(), name.white().bold());
            println!("{}", "-".repeat(40));

            let passed = run_contained(suite.as_ref(), ctx).await;
            if passed {
                println!("{} {}", "✓".green(), format!("{} PASSED", name).as_str().green());
            } else {
                println!("{} {}", "✗".red(), format!("{} FAILED", name).as_str().red());
            }
            results.push(SuiteResult::new(name, passed));
        }

        let all_passed = results.iter().all(|r| r.passed);
        RunOutcome {
            results,
            all_passed,
        }
    }
}

/// Run one suite, turning errors and panics into a failed outcome
pub async fn run_contained(suite: &dyn Suite, ctx: &SuiteContext<'_>) -> bool {
    let outcome = AssertUnwindSafe(suite.run(ctx))
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| Err(Error::SuitePanicked(panic_message(&*panic))));

    match outcome {
        Ok(passed) => passed,
        Err(e) => {
            tracing::error!(suite = suite.name(), error = %e, "Suite error");
            false
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::Config;
    use crate::redfish::RedfishSession;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    enum Behavior {
        Pass,
        Fail,
        Error,
        Panic,
    }

    struct FakeSuite {
        name: &'static str,
        behavior: Behavior,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Suite for FakeSuite {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn run(&self, _ctx: &SuiteContext<'_>) -> Result<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Pass => Ok(true),
                Behavior::Fail => Ok(false),
                Behavior::Error => Err(Error::Internal("boom".to_string())),
                Behavior::Panic => panic!("suite exploded"),
            }
        }
    }

    fn fake(name: &'static str, behavior: Behavior, calls: &Arc<AtomicUsize>) -> Box<dyn Suite> {
        Box::new(FakeSuite {
            name,
            behavior,
            calls: calls.clone(),
        })
    }

    fn fixture() -> (Config, RedfishSession, tempfile::TempDir) {
        let config = Config::default();
        let session =
            RedfishSession::new("https://127.0.0.1:9", "root", "0penBmc", Duration::from_secs(1))
                .unwrap();
        (config, session, tempfile::tempdir().unwrap())
    }

    #[tokio::test]
    async fn test_every_suite_is_recorded_in_order() {
        let calls = Arc::new(AtomicUsize::new(0));
        let runner = SuiteRunner::new(vec![
            fake("A", Behavior::Pass, &calls),
            fake("B", Behavior::Error, &calls),
            fake("C", Behavior::Fail, &calls),
            fake("D", Behavior::Panic, &calls),
            fake("E", Behavior::Pass, &calls),
        ]);
        let (config, session, dir) = fixture();
        let ctx = SuiteContext::new(&config, &session, dir.path());

        let outcome = runner.run_all(&ctx).await;

        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(outcome.results.len(), runner.len());
        let names: Vec<_> = outcome.results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C", "D", "E"]);
        let passed: Vec<_> = outcome.results.iter().map(|r| r.passed).collect();
        assert_eq!(passed, [true, false, false, false, true]);
        assert!(!outcome.all_passed);
    }

    #[tokio::test]
    async fn test_all_passing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let runner = SuiteRunner::new(vec![
            fake("A", Behavior::Pass, &calls),
            fake("B", Behavior::Pass, &calls),
        ]);
        let (config, session, dir) = fixture();
        let ctx = SuiteContext::new(&config, &session, dir.path());

        assert!(runner.run_all(&ctx).await.all_passed);
    }

    #[test]
    fn test_standard_order_and_lookup() {
        let runner = SuiteRunner::standard();
        assert_eq!(
            runner.names(),
            [
                "Basic Connection",
                "Unit Tests",
                "API Tests",
                "WebUI Tests",
                "Load Tests",
                "Security Checks"
            ]
        );
        assert_eq!(runner.find("load-tests").unwrap().name(), "Load Tests");
        assert_eq!(runner.find("webui_tests").unwrap().name(), "WebUI Tests");
        assert!(matches!(runner.find("fuzz"), Err(Error::UnknownSuite(_))));
    }
}
