//! Redfish client pieces used by the suites
//!
//! A session object with explicit credentials plus typed records for the
//! handful of resources the suites read.

pub mod client;
pub mod types;

pub use client::RedfishSession;

/// Service root
pub const SERVICE_ROOT: &str = "/redfish/v1/";
/// Default computer system on OpenBMC
pub const SYSTEM: &str = "/redfish/v1/Systems/system";
pub const MANAGERS: &str = "/redfish/v1/Managers";
pub const CHASSIS: &str = "/redfish/v1/Chassis";
pub const SESSIONS: &str = "/redfish/v1/SessionService/Sessions";
