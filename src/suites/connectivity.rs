//! Basic connectivity suite
//!
//! Three Redfish GETs. The service root must answer; the system and
//! manager resources only count toward the 2-of-3 threshold.

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::common::{Error, Result};
use crate::redfish::client::decode_json;
use crate::redfish::types::{Collection, ComputerSystem, ServiceRoot};
use crate::redfish::{MANAGERS, SERVICE_ROOT, SYSTEM};

use super::{Suite, SuiteContext};

const REQUIRED: usize = 2;
const TOTAL: usize = 3;

pub struct BasicConnectionSuite;

#[async_trait]
impl Suite for BasicConnectionSuite {
    fn name(&self) -> &'static str {
        "Basic Connection"
    }

    async fn run(&self, ctx: &SuiteContext<'_>) -> Result<bool> {
        let session = ctx.session;
        let mut passed = 0;

        match session.get_json::<ServiceRoot>(SERVICE_ROOT).await {
            Ok(root) => {
                tracing::info!(
                    redfish_version = root.redfish_version.as_deref().unwrap_or("?"),
                    odata = root.has_odata_identity(),
                    "Service root: connected"
                );
            }
            Err(Error::UnexpectedStatus { status, .. }) => {
                tracing::error!(status, "Service root failed");
                return Ok(false);
            }
            // answered 200, just not with a service root document
            Err(e @ Error::InvalidPayload { .. }) => {
                tracing::warn!(error = %e, "Service root: connected, payload unreadable")
            }
            Err(e) => return Err(e),
        }
        passed += 1;

        match session.get(SYSTEM).await {
            Ok(response) if response.status() == StatusCode::OK => {
                passed += 1;
                match decode_json::<ComputerSystem>(SYSTEM, response).await {
                    Ok(system) => {
                        let power = system
                            .power_state
                            .map(|p| p.to_string())
                            .unwrap_or_else(|| "Unknown".to_string());
                        tracing::info!(power_state = %power, "System info");
                    }
                    Err(e) => tracing::warn!(error = %e, "System info unreadable"),
                }
            }
            Ok(response) => {
                tracing::warn!(status = response.status().as_u16(), "System info failed")
            }
            Err(e) => tracing::warn!(error = %e, "System info failed"),
        }

        match session.get(MANAGERS).await {
            Ok(response) if response.status() == StatusCode::OK => {
                passed += 1;
                let managers = decode_json::<Collection>(MANAGERS, response)
                    .await
                    .map(|c| c.len())
                    .unwrap_or(0);
                tracing::info!(managers, "Managers: accessible");
            }
            Ok(response) => tracing::warn!(status = response.status().as_u16(), "Managers failed"),
            Err(e) => tracing::warn!(error = %e, "Managers failed"),
        }

        tracing::info!("Basic connection: {}/{} checks passed", passed, TOTAL);
        Ok(passed >= REQUIRED)
    }
}
