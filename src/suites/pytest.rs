//! Unit and API suites delegated to pytest
//!
//! The pytest module is embedded in the binary, written to a temporary
//! file for the duration of the run and removed when the handle drops.

use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::process::Command;

use crate::common::config::PytestConfig;
use crate::common::{Error, Result};

use super::process::{output_with_timeout, tail};
use super::{Suite, SuiteContext};

const UNIT_MODULE: &str = include_str!("../../assets/pytest/unit_checks.py");
const API_MODULE: &str = include_str!("../../assets/pytest/api_checks.py");

/// Which embedded module to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PytestKind {
    Unit,
    Api,
}

impl PytestKind {
    fn suite_name(&self) -> &'static str {
        match self {
            PytestKind::Unit => "Unit Tests",
            PytestKind::Api => "API Tests",
        }
    }

    /// Prefix for artifact and temp file names
    pub fn slug(&self) -> &'static str {
        match self {
            PytestKind::Unit => "unit",
            PytestKind::Api => "api",
        }
    }

    fn module(&self) -> &'static str {
        match self {
            PytestKind::Unit => UNIT_MODULE,
            PytestKind::Api => API_MODULE,
        }
    }

    fn timeout(&self, config: &PytestConfig) -> Duration {
        Duration::from_secs(match self {
            PytestKind::Unit => config.unit_timeout_secs,
            PytestKind::Api => config.api_timeout_secs,
        })
    }
}

pub struct PytestSuite {
    kind: PytestKind,
}

impl PytestSuite {
    pub fn new(kind: PytestKind) -> Self {
        Self { kind }
    }
}

/// Write the embedded module into `dir` as `bmc_<kind>_*.py`
pub fn materialize(kind: PytestKind, dir: &Path) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix(&format!("bmc_{}_", kind.slug()))
        .suffix(".py")
        .tempfile_in(dir)?;
    std::io::Write::write_all(&mut file, kind.module().as_bytes())?;
    Ok(file)
}

/// Arguments after the interpreter
pub fn pytest_args(
    kind: PytestKind,
    module: &Path,
    results_dir: &Path,
    html_report: bool,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-m".into(),
        "pytest".into(),
        module.as_os_str().to_owned(),
        "-v".into(),
        "-p".into(),
        "no:cacheprovider".into(),
    ];

    let mut junit = OsString::from("--junitxml=");
    junit.push(results_dir.join(format!("{}-tests.xml", kind.slug())));
    args.push(junit);

    if html_report {
        let mut html = OsString::from("--html=");
        html.push(results_dir.join(format!("{}-report.html", kind.slug())));
        args.push(html);
        args.push("--self-contained-html".into());
    }
    args
}

#[async_trait]
impl Suite for PytestSuite {
    fn name(&self) -> &'static str {
        self.kind.suite_name()
    }

    async fn run(&self, ctx: &SuiteContext<'_>) -> Result<bool> {
        let config = &ctx.config.pytest;
        let python =
            which::which(&config.python).map_err(|_| Error::RunnerNotFound(config.python.clone()))?;

        let module = materialize(self.kind, ctx.results_dir)?;
        tracing::debug!(module = %module.path().display(), "Materialized pytest module");

        let mut cmd = Command::new(&python);
        cmd.args(pytest_args(
            self.kind,
            module.path(),
            ctx.results_dir,
            config.html_report,
        ))
        .env("BMC_URL", ctx.config.base_url())
        .env("BMC_USERNAME", &ctx.config.target.username)
        .env("BMC_PASSWORD", &ctx.config.target.password);

        let timeout = self.kind.timeout(config);
        tracing::info!(timeout_secs = timeout.as_secs(), "Running {} with pytest", self.name());
        let output = output_with_timeout(cmd, &config.python, timeout).await?;
        drop(module);

        tracing::debug!("pytest output:\n{}", String::from_utf8_lossy(&output.stdout));
        if output.status.success() {
            tracing::info!("{} passed", self.name());
            Ok(true)
        } else {
            tracing::error!(
                code = ?output.status.code(),
                "{} failed:\n{}\n{}",
                self.name(),
                tail(&output.stdout, 20),
                tail(&output.stderr, 20)
            );
            Ok(false)
        }
    }
}
