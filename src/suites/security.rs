//! Security posture heuristics
//!
//! Four independent checks scored as a percentage. If any check cannot be
//! carried out the suite passes: it is a heuristic and must not block a
//! pipeline on its own.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};

use crate::common::{Error, Result};
use crate::redfish::client::decode_json;
use crate::redfish::types::exposed_fields;
use crate::redfish::SYSTEM;

use super::{percent, Suite, SuiteContext};

const TOTAL_CHECKS: usize = 4;
const MIN_PASSWORD_LEN: usize = 8;

/// Whether the target is addressed over HTTPS
pub fn uses_https(base_url: &str) -> Result<bool> {
    let url = Url::parse(base_url)
        .map_err(|e| Error::Config(format!("Invalid BMC URL '{}': {}", base_url, e)))?;
    Ok(url.scheme() == "https")
}

pub fn password_adequate(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

/// What the strict TLS request saw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsProbe {
    /// Answered over plain HTTP, so there was no certificate to validate
    PlainHttp,
    Valid,
    Rejected,
}

impl TlsProbe {
    pub fn passes(self, allow_self_signed: bool) -> bool {
        match self {
            TlsProbe::PlainHttp | TlsProbe::Valid => true,
            TlsProbe::Rejected => allow_self_signed,
        }
    }
}

/// Pass/fail from the number of passed checks, failing open on errors
pub fn verdict(checks: Result<usize>, threshold: f64) -> bool {
    match checks {
        Ok(passed) => {
            let score = percent(passed, TOTAL_CHECKS);
            tracing::info!("Security score: {}/{} ({:.1}%)", passed, TOTAL_CHECKS, score);
            score >= threshold
        }
        Err(e) => {
            tracing::warn!(error = %e, "Security check had issues, not blocking the run");
            true
        }
    }
}

pub struct SecuritySuite;

impl SecuritySuite {
    /// Unauthenticated access is refused or reveals no identifying fields
    async fn unauthenticated_access_limited(ctx: &SuiteContext<'_>) -> Result<bool> {
        let response = ctx.session.anonymous().get(SYSTEM).await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            tracing::info!("Authentication required for system data");
            return Ok(true);
        }
        if status != StatusCode::OK {
            tracing::info!(status = status.as_u16(), "Unexpected status without auth");
            return Ok(true);
        }

        let body: serde_json::Value = decode_json(SYSTEM, response).await?;
        let exposed = exposed_fields(&body);
        if exposed.is_empty() {
            tracing::info!("Limited data without authentication");
            Ok(true)
        } else {
            tracing::warn!(?exposed, "Sensitive data exposed without authentication");
            Ok(false)
        }
    }

    /// GET the base URL with certificate validation on
    async fn certificate_check(ctx: &SuiteContext<'_>) -> Result<bool> {
        let config = &ctx.config.security;
        let base_url = ctx.config.base_url();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.tls_probe_timeout_secs))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;

        let probe = match client.get(base_url).send().await {
            Ok(_) if uses_https(base_url)? => TlsProbe::Valid,
            Ok(_) => TlsProbe::PlainHttp,
            Err(e) => {
                tracing::debug!(error = %e, "Strict TLS request failed");
                TlsProbe::Rejected
            }
        };

        match probe {
            TlsProbe::PlainHttp => tracing::warn!("Plain HTTP, no certificate to validate"),
            TlsProbe::Valid => tracing::info!("Valid TLS certificate"),
            TlsProbe::Rejected if config.allow_self_signed => {
                tracing::info!("Certificate validation failed (expected for test environments)")
            }
            TlsProbe::Rejected => tracing::warn!("Certificate validation failed"),
        }
        Ok(probe.passes(config.allow_self_signed))
    }

    async fn passed_checks(ctx: &SuiteContext<'_>) -> Result<usize> {
        let mut passed = 0;

        if uses_https(ctx.config.base_url())? {
            tracing::info!("Using HTTPS");
            passed += 1;
        } else {
            tracing::warn!("Not using HTTPS");
        }

        if Self::unauthenticated_access_limited(ctx).await? {
            passed += 1;
        }

        if password_adequate(&ctx.config.target.password) {
            tracing::info!("Password length adequate");
            passed += 1;
        } else {
            tracing::warn!("Password may be too short");
        }

        if Self::certificate_check(ctx).await? {
            passed += 1;
        }

        Ok(passed)
    }
}

#[async_trait]
impl Suite for SecuritySuite {
    fn name(&self) -> &'static str {
        "Security Checks"
    }

    async fn run(&self, ctx: &SuiteContext<'_>) -> Result<bool> {
        let checks = Self::passed_checks(ctx).await;
        Ok(verdict(checks, ctx.config.security.pass_threshold))
    }
}
