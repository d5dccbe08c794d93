//! Web UI suite
//!
//! Drives a headless Chromium-family browser from its command line:
//! `--dump-dom` for page content and `--screenshot` for evidence. All four
//! checks are best effort; two passing is enough.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::common::config::WebUiConfig;
use crate::common::{join_url, Error, Result};
use crate::redfish::SERVICE_ROOT;

use super::process::{output_with_timeout, tail};
use super::{Suite, SuiteContext};

/// Executables tried on PATH when no browser is configured
pub const BROWSER_CANDIDATES: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
];

/// Words whose presence suggests a BMC web interface
pub const BMC_INDICATORS: &[&str] = &["redfish", "bmc", "login", "password", "username", "manager"];

pub const HOMEPAGE_SCREENSHOT: &str = "webui-homepage.png";
pub const LOGIN_SCREENSHOT: &str = "webui-login-page.png";
/// Taken of the first page that could not be loaded
pub const ERROR_SCREENSHOT: &str = "webui-error.png";

const REQUIRED: usize = 2;
const TOTAL: usize = 4;

/// A located headless browser executable
#[derive(Debug, Clone)]
pub struct HeadlessBrowser {
    path: PathBuf,
    page_wait: Duration,
    timeout: Duration,
}

impl HeadlessBrowser {
    /// Use the configured browser, else the first candidate on PATH
    pub fn locate(config: &WebUiConfig) -> Result<Self> {
        let path = match &config.browser {
            Some(path) => which::which(path)
                .map_err(|_| Error::browser_unavailable(&[path.display().to_string()]))?,
            None => BROWSER_CANDIDATES
                .iter()
                .find_map(|name| which::which(name).ok())
                .ok_or_else(|| Error::browser_unavailable(BROWSER_CANDIDATES))?,
        };
        tracing::debug!(browser = %path.display(), "Using headless browser");

        Ok(Self {
            path,
            page_wait: Duration::from_secs(config.page_wait_secs),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.path);
        cmd.args([
            "--headless",
            "--no-sandbox",
            "--disable-gpu",
            "--disable-dev-shm-usage",
            "--ignore-certificate-errors",
            "--window-size=1920,1080",
        ])
        .arg(format!(
            "--virtual-time-budget={}",
            self.page_wait.as_millis()
        ));
        cmd
    }

    fn program(&self) -> String {
        self.path.display().to_string()
    }

    /// Load `url` and return the serialized DOM
    pub async fn dump_dom(&self, url: &str) -> Result<String> {
        let mut cmd = self.command();
        cmd.arg("--dump-dom").arg(url);
        let output = output_with_timeout(cmd, &self.program(), self.timeout).await?;
        if !output.status.success() {
            return Err(Error::Internal(format!(
                "browser exited with {:?}: {}",
                output.status.code(),
                tail(&output.stderr, 5)
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Load `url` and save a PNG screenshot to `dest`
    pub async fn screenshot(&self, url: &str, dest: &Path) -> Result<()> {
        let mut cmd = self.command();
        cmd.arg(format!("--screenshot={}", dest.display())).arg(url);
        let output = output_with_timeout(cmd, &self.program(), self.timeout).await?;
        if !output.status.success() {
            return Err(Error::Internal(format!(
                "screenshot of {} failed: {}",
                url,
                tail(&output.stderr, 5)
            )));
        }
        Ok(())
    }
}

/// Text of the first `<title>` element, if non-empty
pub fn page_title(dom: &str) -> Option<String> {
    let lower = dom.to_ascii_lowercase();
    let open = lower.find("<title")?;
    let start = open + lower[open..].find('>')? + 1;
    let end = start + lower[start..].find("</title>")?;
    let title = dom[start..end].trim();
    (!title.is_empty()).then(|| title.to_string())
}

/// Indicator words present anywhere in the page, case-insensitively
pub fn found_indicators(dom: &str) -> Vec<&'static str> {
    let lower = dom.to_ascii_lowercase();
    BMC_INDICATORS
        .iter()
        .copied()
        .filter(|word| lower.contains(word))
        .collect()
}

/// Whether a rendered page shows Redfish JSON
pub fn shows_redfish(dom: &str) -> bool {
    let lower = dom.to_ascii_lowercase();
    lower.contains("odata") || lower.contains("redfish") || lower.contains("json")
}

/// Number of `<input` elements
pub fn count_inputs(dom: &str) -> usize {
    dom.to_ascii_lowercase().matches("<input").count()
}

pub struct WebUiSuite;

impl WebUiSuite {
    async fn capture(browser: &HeadlessBrowser, url: &str, dest: PathBuf) {
        if let Err(e) = browser.screenshot(url, &dest).await {
            tracing::warn!(error = %e, "Screenshot failed");
        }
    }
}

#[async_trait]
impl Suite for WebUiSuite {
    fn name(&self) -> &'static str {
        "WebUI Tests"
    }

    async fn run(&self, ctx: &SuiteContext<'_>) -> Result<bool> {
        let browser = HeadlessBrowser::locate(&ctx.config.webui)?;
        let base = ctx.config.base_url();
        let mut passed = 0;
        let mut first_failure: Option<String> = None;

        tracing::info!("Testing landing page");
        match browser.dump_dom(base).await {
            Ok(dom) => {
                match page_title(&dom) {
                    Some(title) => {
                        tracing::info!(%title, "Page title present");
                        passed += 1;
                    }
                    None => tracing::warn!("Landing page has no title"),
                }
                let found = found_indicators(&dom);
                if found.len() >= 2 {
                    tracing::info!(?found, "BMC indicators found");
                    passed += 1;
                } else {
                    tracing::warn!(?found, "Few BMC indicators found");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Landing page failed");
                first_failure.get_or_insert_with(|| base.to_string());
            }
        }
        Self::capture(&browser, base, ctx.results_dir.join(HOMEPAGE_SCREENSHOT)).await;

        tracing::info!("Testing Redfish endpoint via browser");
        let redfish = join_url(base, SERVICE_ROOT);
        match browser.dump_dom(&redfish).await {
            Ok(dom) if shows_redfish(&dom) => {
                tracing::info!("Redfish endpoint renders");
                passed += 1;
            }
            Ok(_) => tracing::warn!("Redfish endpoint shows no Redfish content"),
            Err(e) => {
                tracing::warn!(error = %e, "Redfish endpoint failed");
                first_failure.get_or_insert(redfish);
            }
        }

        tracing::info!("Testing login page");
        let login = join_url(base, "/login");
        match browser.dump_dom(&login).await {
            Ok(dom) => {
                let inputs = count_inputs(&dom);
                if inputs > 0 {
                    tracing::info!(inputs, "Login form found");
                    passed += 1;
                } else {
                    tracing::warn!("Login page has no input fields");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Login page failed");
                first_failure.get_or_insert_with(|| login.clone());
            }
        }
        Self::capture(&browser, &login, ctx.results_dir.join(LOGIN_SCREENSHOT)).await;

        if let Some(url) = &first_failure {
            Self::capture(&browser, url, ctx.results_dir.join(ERROR_SCREENSHOT)).await;
        }

        tracing::info!("WebUI tests: {}/{} passed", passed, TOTAL);
        Ok(passed >= REQUIRED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGIN_PAGE: &str = r#"<html><head><TITLE> OpenBMC Web UI </TITLE></head>
<body><form><label>Username</label><input id="username"><INPUT type="password"></form></body></html>"#;

    #[test]
    fn test_page_title() {
        assert_eq!(page_title(LOGIN_PAGE).as_deref(), Some("OpenBMC Web UI"));
        assert_eq!(page_title("<title lang=\"en\">BMC</title>").as_deref(), Some("BMC"));
        assert_eq!(page_title("<title>  </title>"), None);
        assert_eq!(page_title("<html></html>"), None);
    }

    #[test]
    fn test_indicators_and_inputs() {
        assert_eq!(
            found_indicators(LOGIN_PAGE),
            vec!["bmc", "password", "username"]
        );
        assert_eq!(count_inputs(LOGIN_PAGE), 2);
        assert_eq!(count_inputs("<p>nothing</p>"), 0);
    }

    #[test]
    fn test_redfish_rendering() {
        assert!(shows_redfish(r#"<pre>{"@odata.id": "/redfish/v1/"}</pre>"#));
        assert!(!shows_redfish("<h1>Not Found</h1>"));
    }

    #[cfg(unix)]
    mod with_stub_browser {
        use super::*;
        use crate::common::config::Config;
        use crate::redfish::RedfishSession;
        use crate::suites::process::write_script;

        /// Answers `--screenshot` by touching the file and `--dump-dom`
        /// with a page chosen by URL
        const BROWSER: &str = r#"shot=""
url=""
for arg in "$@"; do
  case "$arg" in
    --screenshot=*) shot="${arg#--screenshot=}" ;;
  esac
  url="$arg"
done
if [ -n "$shot" ]; then
  : > "$shot"
  exit 0
fi
case "$url" in
  */redfish/v1/) echo '<pre>{"@odata.id": "/redfish/v1/"}</pre>' ;;
  */login) echo '<html><body><p>Moved</p></body></html>' ;;
  *) echo '<html><head><title>OpenBMC</title></head><body>Welcome</body></html>' ;;
esac"#;

        async fn run_webui(script: &str, results: &Path) -> Result<bool> {
            let bin = tempfile::tempdir().unwrap();
            let mut config = Config::default();
            config.webui.browser = Some(write_script(bin.path(), "chromium", script));
            config.webui.page_wait_secs = 0;
            config.webui.timeout_secs = 10;
            let session = RedfishSession::from_config(&config).unwrap();
            let ctx = SuiteContext::new(&config, &session, results);
            WebUiSuite.run(&ctx).await
        }

        #[tokio::test]
        async fn test_two_of_four_passes_with_screenshots() {
            // title and Redfish rendering pass; one indicator, no inputs
            let results = tempfile::tempdir().unwrap();
            assert!(run_webui(BROWSER, results.path()).await.unwrap());
            assert!(results.path().join(HOMEPAGE_SCREENSHOT).exists());
            assert!(results.path().join(LOGIN_SCREENSHOT).exists());
            assert!(!results.path().join(ERROR_SCREENSHOT).exists());
        }

        #[tokio::test]
        async fn test_one_of_four_fails() {
            let script = BROWSER.replace(
                r#"echo '<pre>{"@odata.id": "/redfish/v1/"}</pre>'"#,
                "echo '<h1>Not Found</h1>'",
            );
            let results = tempfile::tempdir().unwrap();
            assert!(!run_webui(&script, results.path()).await.unwrap());
        }

        #[tokio::test]
        async fn test_failed_page_leaves_error_screenshot() {
            let script = BROWSER.replace(
                "*/login) echo '<html><body><p>Moved</p></body></html>' ;;",
                "*/login) echo 'net::ERR_CONNECTION_REFUSED' >&2; exit 1 ;;",
            );
            let results = tempfile::tempdir().unwrap();
            assert!(run_webui(&script, results.path()).await.unwrap());
            assert!(results.path().join(ERROR_SCREENSHOT).exists());
        }
    }

    #[test]
    fn test_configured_browser_must_exist() {
        let config = WebUiConfig {
            browser: Some(PathBuf::from("/nonexistent/chromium")),
            ..WebUiConfig::default()
        };
        assert!(matches!(
            HeadlessBrowser::locate(&config),
            Err(Error::BrowserUnavailable { .. })
        ));
    }
}
