//! Load suite
//!
//! A fixed number of sequential GETs round-robined over a few Redfish
//! resources. Passes when enough of them return 200.

use std::path::Path;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::StatusCode;
use serde::Serialize;

use crate::common::paths::LOAD_RESULTS_FILE;
use crate::common::{Error, Result};
use crate::redfish::{CHASSIS, MANAGERS, SERVICE_ROOT, SYSTEM};

use super::{percent, Suite, SuiteContext};

/// Resources cycled through, in order
pub const LOAD_ENDPOINTS: &[&str] = &[SERVICE_ROOT, SYSTEM, MANAGERS, CHASSIS];

/// Counts and timings of one load run, persisted as JSON
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadStats {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    /// Seconds per answered request; transport failures have no entry
    pub response_times: Vec<f64>,
    pub average_response_time: f64,
    pub min_response_time: f64,
    pub max_response_time: f64,
    pub p95_response_time: f64,
    pub requests_per_second: f64,
    pub total_time: f64,
    pub success_rate: f64,
}

impl LoadStats {
    /// Record one issued request
    pub fn record(&mut self, ok: bool, response_time: Option<Duration>) {
        self.total_requests += 1;
        if ok {
            self.successful_requests += 1;
        } else {
            self.failed_requests += 1;
        }
        if let Some(t) = response_time {
            self.response_times.push(t.as_secs_f64());
        }
    }

    /// Fill in the aggregates once all requests are done
    pub fn finish(&mut self, wall_clock: Duration) {
        self.total_time = wall_clock.as_secs_f64();
        self.success_rate = percent(self.successful_requests, self.total_requests);
        self.requests_per_second = if self.total_time > 0.0 {
            self.total_requests as f64 / self.total_time
        } else {
            0.0
        };

        if self.response_times.is_empty() {
            return;
        }
        let mut sorted = self.response_times.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        self.average_response_time = sorted.iter().sum::<f64>() / sorted.len() as f64;
        self.min_response_time = sorted[0];
        self.max_response_time = sorted[sorted.len() - 1];
        // nearest-rank
        let rank = ((0.95 * sorted.len() as f64).ceil() as usize).clamp(1, sorted.len());
        self.p95_response_time = sorted[rank - 1];
    }

    pub fn passes(&self, threshold: f64) -> bool {
        self.total_requests > 0 && self.success_rate >= threshold
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| Error::FileWrite {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }
}

pub struct LoadSuite;

#[async_trait]
impl Suite for LoadSuite {
    fn name(&self) -> &'static str {
        "Load Tests"
    }

    async fn run(&self, ctx: &SuiteContext<'_>) -> Result<bool> {
        let config = &ctx.config.load;
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let mut stats = LoadStats::default();

        tracing::info!(requests = config.requests, "Starting load test");
        let pb = ProgressBar::new(config.requests as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  [{bar:40.cyan/blue}] {pos}/{len} requests ({elapsed})")
                .map_err(|e| Error::Internal(e.to_string()))?
                .progress_chars("=> "),
        );

        let start = Instant::now();
        for (i, endpoint) in LOAD_ENDPOINTS.iter().cycle().take(config.requests).enumerate() {
            let request_start = Instant::now();
            match ctx.session.get_with_timeout(endpoint, timeout).await {
                Ok(response) => {
                    stats.record(
                        response.status() == StatusCode::OK,
                        Some(request_start.elapsed()),
                    );
                }
                Err(e) => {
                    tracing::warn!(request = i + 1, error = %e, "Request failed");
                    stats.record(false, None);
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();
        stats.finish(start.elapsed());

        tracing::info!(
            "Requests: {}/{} successful ({:.1}%)",
            stats.successful_requests,
            stats.total_requests,
            stats.success_rate
        );
        tracing::info!(
            "Average response time: {:.2}s, p95: {:.2}s, throughput: {:.1} req/sec, total: {:.2}s",
            stats.average_response_time,
            stats.p95_response_time,
            stats.requests_per_second,
            stats.total_time
        );

        stats.write_json(&ctx.results_dir.join(LOAD_RESULTS_FILE))?;
        Ok(stats.passes(config.success_threshold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats_with(successes: usize, failures: usize) -> LoadStats {
        let mut stats = LoadStats::default();
        for i in 0..successes {
            stats.record(true, Some(Duration::from_millis(10 * (i as u64 + 1))));
        }
        for _ in 0..failures {
            stats.record(false, None);
        }
        stats.finish(Duration::from_secs(2));
        stats
    }

    #[test]
    fn test_fifteen_of_twenty_passes() {
        let stats = stats_with(15, 5);
        assert_eq!(stats.total_requests, 20);
        assert_eq!(stats.success_rate, 75.0);
        assert!(stats.passes(70.0));
        assert_eq!(stats.requests_per_second, 10.0);
    }

    #[test]
    fn test_below_threshold_fails() {
        let stats = stats_with(13, 7);
        assert_eq!(stats.success_rate, 65.0);
        assert!(!stats.passes(70.0));
    }

    #[test]
    fn test_timing_aggregates() {
        let stats = stats_with(20, 0);
        assert!((stats.min_response_time - 0.01).abs() < 1e-9);
        assert!((stats.max_response_time - 0.2).abs() < 1e-9);
        assert!((stats.average_response_time - 0.105).abs() < 1e-9);
        // 19th of 20
        assert!((stats.p95_response_time - 0.19).abs() < 1e-9);
    }

    #[test]
    fn test_no_requests_never_passes() {
        let stats = stats_with(0, 0);
        assert_eq!(stats.success_rate, 0.0);
        assert!(!stats.passes(0.0));
    }

    #[test]
    fn test_round_robin_order() {
        let picked: Vec<_> = LOAD_ENDPOINTS.iter().cycle().take(6).copied().collect();
        assert_eq!(picked[4], SERVICE_ROOT);
        assert_eq!(picked[5], SYSTEM);
    }
}
