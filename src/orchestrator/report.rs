//! Run report
//!
//! Aggregates suite results into a success rate and a coarse status,
//! prints the summary table and persists the JSON report.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Local};
use colored::Colorize;
use serde::Serialize;

use crate::common::{Error, Result};

/// Outcome of one suite
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteResult {
    pub name: String,
    pub passed: bool,
}

impl SuiteResult {
    pub fn new(name: impl Into<String>, passed: bool) -> Self {
        Self {
            name: name.into(),
            passed,
        }
    }
}

/// Overall classification of a run, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Success,
    Acceptable,
    Unstable,
    Failure,
}

impl RunStatus {
    /// Map a success rate in percent to a status
    pub fn from_rate(rate: f64) -> Self {
        if rate >= 100.0 {
            RunStatus::Success
        } else if rate >= 80.0 {
            RunStatus::Acceptable
        } else if rate >= 60.0 {
            RunStatus::Unstable
        } else {
            RunStatus::Failure
        }
    }

    fn verdict(&self) -> &'static str {
        match self {
            RunStatus::Success => "EXCELLENT: All tests passed!",
            RunStatus::Acceptable => "GOOD: Most tests passed",
            RunStatus::Unstable => "FAIR: Some tests failed",
            RunStatus::Failure => "POOR: Many tests failed",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Success => "SUCCESS",
            RunStatus::Acceptable => "ACCEPTABLE",
            RunStatus::Unstable => "UNSTABLE",
            RunStatus::Failure => "FAILURE",
        };
        f.write_str(s)
    }
}

/// Where the run executed
#[derive(Debug, Clone, Serialize)]
pub struct HostInfo {
    pub os: String,
    pub os_version: String,
    pub runner_version: String,
}

impl HostInfo {
    pub fn current() -> Self {
        let info = os_info::get();
        Self {
            os: info.os_type().to_string(),
            os_version: info.version().to_string(),
            runner_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Immutable summary of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub timestamp: DateTime<Local>,
    pub bmc_url: String,
    pub total_tests: usize,
    pub passed_tests: usize,
    pub success_rate: f64,
    pub overall_status: RunStatus,
    pub test_results: Vec<SuiteResult>,
    pub host: HostInfo,
}

impl RunReport {
    /// Build the report from the ordered suite results
    ///
    /// An empty run has a rate of 0 and is a FAILURE.
    pub fn new(bmc_url: &str, results: Vec<SuiteResult>) -> Self {
        let total_tests = results.len();
        let passed_tests = results.iter().filter(|r| r.passed).count();
        let success_rate = if total_tests == 0 {
            0.0
        } else {
            passed_tests as f64 / total_tests as f64 * 100.0
        };
        let overall_status = if total_tests > 0 && passed_tests == total_tests {
            RunStatus::Success
        } else {
            // Below 100% even when float rounding says otherwise
            RunStatus::from_rate(success_rate.min(99.99))
        };

        Self {
            timestamp: Local::now(),
            bmc_url: bmc_url.to_string(),
            total_tests,
            passed_tests,
            success_rate,
            overall_status,
            test_results: results,
            host: HostInfo::current(),
        }
    }

    /// Every registered suite passed
    pub fn all_passed(&self) -> bool {
        self.total_tests > 0 && self.passed_tests == self.total_tests
    }

    /// Print the summary table to stdout
    pub fn print_table(&self) {
        let rule = "=".repeat(60);
        println!("\n{}", rule);
        println!("{}", " TEST EXECUTION REPORT".bold());
        println!("{}", rule);
        println!("{:<25} {:<10} DETAILS", "TEST CATEGORY", "STATUS");
        println!("{}", "-".repeat(60));

        for result in &self.test_results {
            let (status, details) = if result.passed {
                (format!("{:<10}", "PASS").as_str().green(), "All checks passed")
            } else {
                (format!("{:<10}", "FAIL").as_str().red(), "Some checks failed")
            };
            println!("{:<25} {} {}", result.name, status, details);
        }

        println!("{}", rule);
        println!(
            "TOTAL: {}/{} tests passed ({:.1}%)",
            self.passed_tests, self.total_tests, self.success_rate
        );
        let verdict = match self.overall_status {
            RunStatus::Success => self.overall_status.verdict().green(),
            RunStatus::Acceptable => self.overall_status.verdict().cyan(),
            RunStatus::Unstable => self.overall_status.verdict().yellow(),
            RunStatus::Failure => self.overall_status.verdict().red(),
        };
        println!("{}", verdict);
        println!("OVERALL STATUS: {}", self.overall_status.to_string().as_str().bold());
        println!("{}", rule);
    }

    /// Serialize the report as pretty JSON
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| Error::FileWrite {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(outcomes: &[bool]) -> Vec<SuiteResult> {
        outcomes
            .iter()
            .enumerate()
            .map(|(i, passed)| SuiteResult::new(format!("suite {}", i), *passed))
            .collect()
    }

    #[test]
    fn test_status_thresholds() {
        assert_eq!(RunStatus::from_rate(100.0), RunStatus::Success);
        assert_eq!(RunStatus::from_rate(99.9), RunStatus::Acceptable);
        assert_eq!(RunStatus::from_rate(80.0), RunStatus::Acceptable);
        assert_eq!(RunStatus::from_rate(79.9), RunStatus::Unstable);
        assert_eq!(RunStatus::from_rate(60.0), RunStatus::Unstable);
        assert_eq!(RunStatus::from_rate(59.9), RunStatus::Failure);
        assert_eq!(RunStatus::from_rate(0.0), RunStatus::Failure);
    }

    #[test]
    fn test_five_of_six_is_acceptable() {
        let report = RunReport::new("https://bmc", results(&[true, true, false, true, true, true]));
        assert_eq!(report.total_tests, 6);
        assert_eq!(report.passed_tests, 5);
        assert!((report.success_rate - 83.3).abs() < 0.05);
        assert_eq!(report.overall_status, RunStatus::Acceptable);
        assert!(!report.all_passed());
    }

    #[test]
    fn test_all_passed_is_success() {
        let report = RunReport::new("https://bmc", results(&[true; 6]));
        assert_eq!(report.success_rate, 100.0);
        assert_eq!(report.overall_status, RunStatus::Success);
        assert!(report.all_passed());
    }

    #[test]
    fn test_empty_run_is_failure() {
        let report = RunReport::new("https://bmc", Vec::new());
        assert_eq!(report.success_rate, 0.0);
        assert_eq!(report.overall_status, RunStatus::Failure);
        assert!(!report.all_passed());
    }

    #[test]
    fn test_rate_stays_in_bounds() {
        for passed in 0..=7usize {
            let outcomes: Vec<bool> = (0..7).map(|i| i < passed).collect();
            let report = RunReport::new("https://bmc", results(&outcomes));
            assert!(report.passed_tests <= report.total_tests);
            assert!((0.0..=100.0).contains(&report.success_rate));
            assert_eq!(report.success_rate == 100.0, report.all_passed());
        }
    }

    #[test]
    fn test_json_shape() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("report.json");
        let report = RunReport::new("https://bmc", results(&[true, false]));
        report.write_json(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["bmc_url"], "https://bmc");
        assert_eq!(value["total_tests"], 2);
        assert_eq!(value["passed_tests"], 1);
        assert_eq!(value["overall_status"], "FAILURE");
        assert_eq!(value["test_results"][1]["name"], "suite 1");
        assert_eq!(value["test_results"][1]["passed"], false);
        // ISO-8601 with offset
        assert!(value["timestamp"].as_str().unwrap().contains('T'));
    }
}
