//! Normalised records emitted by the collector.

use serde::{Deserialize, Serialize};

/// A geocoded device, produced by the reconciler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Display name.
    pub name: String,
    /// Hardware model.
    pub model: Option<String>,
    /// Device type or role.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Operational state as reported by the controller.
    pub state: Option<String>,
    /// Latitude in decimal degrees.
    #[serde(rename = "lat")]
    pub latitude: f64,
    /// Longitude in decimal degrees.
    #[serde(rename = "lon")]
    pub longitude: f64,
}

/// Descriptive fields shared by every vendor's device records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceSummary {
    /// Display name.
    pub name: String,
    /// Hardware model.
    pub model: Option<String>,
    /// Device type or role.
    pub kind: Option<String>,
    /// Operational state.
    pub state: Option<String>,
}

impl DeviceSummary {
    /// Attach a coordinate, producing a [`DeviceRecord`].
    pub fn at(self, latitude: f64, longitude: f64) -> DeviceRecord {
        DeviceRecord {
            name: self.name,
            model: self.model,
            kind: self.kind,
            state: self.state,
            latitude,
            longitude,
        }
    }
}

/// A UniFi device as emitted in the combined document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiDeviceSummary {
    /// Device name, or its MAC when unnamed.
    pub name: Option<String>,
    /// Device type (`uap`, `usw`, `ugw`, ...).
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Hardware model.
    pub model: Option<String>,
    /// Management IP address.
    pub ip: Option<String>,
    /// MAC address.
    pub mac: Option<String>,
    /// 1 = online, 0 = offline.
    pub state: Option<i64>,
    /// Connected client count.
    pub clients: u64,
    /// Controller satisfaction score.
    pub satisfaction: i64,
    /// Floor-plan X position, when placed.
    pub x: Option<f64>,
    /// Floor-plan Y position, when placed.
    pub y: Option<f64>,
}

/// An edge between two named devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// Name of one endpoint.
    pub from: String,
    /// Name of the other endpoint.
    pub to: String,
    /// Link medium or kind (`wire`, `wireless`, ...).
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Link state when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Signal strength in dBm when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_device_record_field_names() {
        let record = DeviceSummary {
            name: "Tower-1".to_string(),
            model: Some("LAP-120".to_string()),
            kind: Some("airMax".to_string()),
            state: Some("active".to_string()),
        }
        .at(40.0, -74.0);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "Tower-1",
                "model": "LAP-120",
                "type": "airMax",
                "state": "active",
                "lat": 40.0,
                "lon": -74.0
            })
        );
    }

    #[test]
    fn test_link_omits_missing_optionals() {
        let link = LinkRecord {
            from: "a".to_string(),
            to: "b".to_string(),
            kind: Some("wireless".to_string()),
            state: None,
            signal: None,
        };
        let value = serde_json::to_value(&link).unwrap();
        assert_eq!(value, json!({"from": "a", "to": "b", "type": "wireless"}));
    }
}
