//! Readiness polling
//!
//! Blocks the run until the target answers its probe or the deadline
//! passes. Constant interval, no backoff.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, Instant};

use crate::common::Result;
use crate::redfish::{RedfishSession, SERVICE_ROOT};

/// A lightweight check of whether the target accepts requests
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    /// Ok(true) when the target answered with a success status
    async fn probe(&self) -> Result<bool>;
}

/// Probes `GET /redfish/v1/` with the session's credentials
pub struct ServiceRootProbe {
    pub session: RedfishSession,
    pub timeout: Duration,
}

#[async_trait]
impl ReadinessProbe for ServiceRootProbe {
    async fn probe(&self) -> Result<bool> {
        let response = self
            .session
            .get_with_timeout(SERVICE_ROOT, self.timeout)
            .await?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "Probe answered without success");
        }
        Ok(status.is_success())
    }
}

/// Result of a readiness wait
#[derive(Debug, Clone, Copy)]
pub struct PollOutcome {
    pub ready: bool,
    /// Probes issued, including the successful one
    pub attempts: u32,
    pub elapsed: Duration,
}

/// Poll `probe` every `interval` until it succeeds or `timeout` elapses
///
/// Probe errors are logged and treated as "not ready yet".
pub async fn wait_until_ready(
    probe: &dyn ReadinessProbe,
    timeout: Duration,
    interval: Duration,
) -> PollOutcome {
    tracing::info!(
        timeout_secs = timeout.as_secs(),
        interval_secs = interval.as_secs(),
        "Waiting for BMC to be ready"
    );
    let start = Instant::now();
    let mut attempts = 0;

    while start.elapsed() < timeout {
        attempts += 1;
        match probe.probe().await {
            Ok(true) => {
                let elapsed = start.elapsed();
                tracing::info!(attempts, elapsed_secs = elapsed.as_secs(), "BMC is ready");
                return PollOutcome {
                    ready: true,
                    attempts,
                    elapsed,
                };
            }
            Ok(false) => {
                tracing::info!(attempt = attempts, "BMC not ready yet, waiting");
            }
            Err(e) => {
                tracing::warn!(attempt = attempts, error = %e, "BMC not ready yet, waiting");
            }
        }
        sleep(interval).await;
    }

    let elapsed = start.elapsed();
    tracing::error!(attempts, elapsed_secs = elapsed.as_secs(), "Timeout waiting for BMC");
    PollOutcome {
        ready: false,
        attempts,
        elapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails until the given attempt, then succeeds
    struct ScriptedProbe {
        calls: AtomicU32,
        ready_on: Option<u32>,
        error_until: u32,
    }

    impl ScriptedProbe {
        fn new(ready_on: Option<u32>, error_until: u32) -> Self {
            Self {
                calls: AtomicU32::new(0),
                ready_on,
                error_until,
            }
        }
    }

    #[async_trait]
    impl ReadinessProbe for ScriptedProbe {
        async fn probe(&self) -> Result<bool> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.error_until {
                return Err(Error::Internal("connection refused".to_string()));
            }
            Ok(self.ready_on.is_some_and(|n| call >= n))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_ready_times_out_after_five_attempts() {
        let probe = ScriptedProbe::new(None, 0);
        let outcome =
            wait_until_ready(&probe, Duration::from_secs(10), Duration::from_secs(2)).await;

        assert!(!outcome.ready);
        assert_eq!(outcome.attempts, 5);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 5);
        assert!(outcome.elapsed >= Duration::from_secs(10));
        assert!(outcome.elapsed < Duration::from_secs(11));
    }

    #[tokio::test(start_paused = true)]
    async fn test_errors_are_swallowed_until_ready() {
        let probe = ScriptedProbe::new(Some(3), 2);
        let outcome =
            wait_until_ready(&probe, Duration::from_secs(60), Duration::from_secs(5)).await;

        assert!(outcome.ready);
        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.elapsed, Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_on_first_probe_does_not_sleep() {
        let probe = ScriptedProbe::new(Some(1), 0);
        let outcome =
            wait_until_ready(&probe, Duration::from_secs(60), Duration::from_secs(10)).await;

        assert!(outcome.ready);
        assert_eq!(outcome.attempts, 1);
        assert_eq!(outcome.elapsed, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_never_probes() {
        let probe = ScriptedProbe::new(Some(1), 0);
        let outcome = wait_until_ready(&probe, Duration::ZERO, Duration::from_secs(1)).await;

        assert!(!outcome.ready);
        assert_eq!(outcome.attempts, 0);
    }
}
