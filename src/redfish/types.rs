//! Redfish resource records
//!
//! Only the fields the suites inspect are modelled. Everything is optional
//! because BMC implementations differ in what they populate.
//! See: https://www.dmtf.org/standards/redfish

use serde::{Deserialize, Serialize};

/// `{"@odata.id": "..."}` navigation link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ODataLink {
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
}

/// Common `Status` object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Status {
    pub state: Option<String>,
    pub health: Option<String>,
}

/// `ComputerSystem.PowerState`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerState {
    On,
    Off,
    PoweringOn,
    PoweringOff,
    Paused,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for PowerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PowerState::On => "On",
            PowerState::Off => "Off",
            PowerState::PoweringOn => "PoweringOn",
            PowerState::PoweringOff => "PoweringOff",
            PowerState::Paused => "Paused",
            PowerState::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// `/redfish/v1/`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceRoot {
    #[serde(rename = "@odata.id")]
    pub odata_id: Option<String>,
    #[serde(rename = "@odata.context")]
    pub odata_context: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub redfish_version: Option<String>,
    #[serde(rename = "UUID")]
    pub uuid: Option<String>,
    pub systems: Option<ODataLink>,
    pub managers: Option<ODataLink>,
    pub chassis: Option<ODataLink>,
    pub session_service: Option<ODataLink>,
}

impl ServiceRoot {
    /// Whether the payload carries OData identity annotations
    pub fn has_odata_identity(&self) -> bool {
        self.odata_id.is_some() || self.odata_context.is_some()
    }
}

/// `/redfish/v1/Systems/{id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ComputerSystem {
    #[serde(rename = "@odata.id")]
    pub odata_id: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub power_state: Option<PowerState>,
    pub status: Option<Status>,
}

/// System properties that identify the host
pub const SENSITIVE_FIELDS: &[&str] = &["SerialNumber", "UUID", "HostName"];

/// Identifying keys present in a raw system payload
///
/// Presence is what counts: a key holding `null` or a value of an
/// unexpected type is still reported.
pub fn exposed_fields(body: &serde_json::Value) -> Vec<&'static str> {
    let Some(object) = body.as_object() else {
        return Vec::new();
    };
    SENSITIVE_FIELDS
        .iter()
        .copied()
        .filter(|field| object.contains_key(*field))
        .collect()
}

/// Any resource collection (`Systems`, `Managers`, `Chassis`, ...)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Collection {
    #[serde(rename = "Members", default)]
    pub members: Vec<ODataLink>,
    #[serde(rename = "Members@odata.count")]
    pub members_count: Option<u64>,
}

impl Collection {
    /// Declared member count, falling back to the listed members
    pub fn len(&self) -> usize {
        self.members_count
            .map(|c| c as usize)
            .unwrap_or(self.members.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Credentials body for `SessionService/Sessions`
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SessionRequest<'a> {
    pub user_name: &'a str,
    pub password: &'a str,
}

/// Response body of a created session
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionInfo {
    #[serde(rename = "@odata.id")]
    pub odata_id: Option<String>,
    #[serde(rename = "Id")]
    pub id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_service_root_links() {
        let root: ServiceRoot = serde_json::from_value(json!({
            "@odata.id": "/redfish/v1/",
            "@odata.type": "#ServiceRoot.v1_5_0.ServiceRoot",
            "Id": "RootService",
            "RedfishVersion": "1.6.0",
            "Systems": {"@odata.id": "/redfish/v1/Systems"},
            "Managers": {"@odata.id": "/redfish/v1/Managers"}
        }))
        .unwrap();

        assert!(root.has_odata_identity());
        assert_eq!(root.redfish_version.as_deref(), Some("1.6.0"));
        assert_eq!(root.systems.unwrap().odata_id, "/redfish/v1/Systems");
        assert!(root.chassis.is_none());
    }

    #[test]
    fn test_system_unknown_power_state() {
        let system: ComputerSystem = serde_json::from_value(json!({
            "Id": "system",
            "PowerState": "Standby"
        }))
        .unwrap();
        assert_eq!(system.power_state, Some(PowerState::Unknown));
    }

    #[test]
    fn test_system_status() {
        let system: ComputerSystem = serde_json::from_value(json!({
            "Id": "system",
            "PowerState": "On",
            "SerialNumber": "SN123",
            "Status": {"State": "Enabled", "Health": "OK"}
        }))
        .unwrap();
        assert_eq!(system.power_state, Some(PowerState::On));
        assert_eq!(system.status.unwrap().health.as_deref(), Some("OK"));
    }

    #[test]
    fn test_exposed_fields_by_key_presence() {
        let body = json!({"Id": "system", "SerialNumber": "SN123", "HostName": "bmc-host"});
        assert_eq!(exposed_fields(&body), vec!["SerialNumber", "HostName"]);

        let null_valued = json!({"Id": "system", "SerialNumber": null});
        assert_eq!(exposed_fields(&null_valued), vec!["SerialNumber"]);

        let odd_types = json!({"UUID": 42, "Status": "OK", "PowerState": 7});
        assert_eq!(exposed_fields(&odd_types), vec!["UUID"]);

        assert!(exposed_fields(&json!({"Id": "system"})).is_empty());
        assert!(exposed_fields(&json!(["SerialNumber"])).is_empty());
    }

    #[test]
    fn test_collection_count_fallback() {
        let declared: Collection = serde_json::from_value(json!({
            "Members": [{"@odata.id": "/redfish/v1/Managers/bmc"}],
            "Members@odata.count": 1
        }))
        .unwrap();
        assert_eq!(declared.len(), 1);

        let listed: Collection = serde_json::from_value(json!({})).unwrap();
        assert!(listed.is_empty());
    }
}
