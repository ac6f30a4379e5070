//! Typed views of raw controller records.
//!
//! Controllers return loosely typed JSON: coordinates arrive as numbers,
//! numeric strings, `null` or garbage, and nested objects may be absent or
//! `null`. Every nested object is therefore optional and every numeric field
//! is parsed leniently; a value that does not parse is simply `None`.

use crate::model::{DeviceSummary, UnifiDeviceSummary};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Parse a number or numeric string, rejecting non-finite values.
pub fn coordinate_from_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coordinate_from_value))
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse().ok(),
        Some(Value::Bool(b)) => Some(i64::from(b)),
        _ => None,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Latitude/longitude pair where either half may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct PartialCoordinate {
    /// Latitude in decimal degrees.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub longitude: Option<f64>,
}

impl PartialCoordinate {
    /// A coordinate with both halves present.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }

    /// `(lat, lon)` when both halves are present.
    pub fn complete(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

/// The coordinate-bearing fields of a device, independent of vendor schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordinateFields {
    /// Device attribute-level coordinate.
    pub attributes: PartialCoordinate,
    /// Device location-block coordinate.
    pub location: PartialCoordinate,
    /// Identifier of the site the device belongs to.
    pub site_id: Option<String>,
}

/// A raw device record the reconciler can geocode.
pub trait GeoDevice {
    /// Descriptive fields carried through to the output record.
    fn summary(&self) -> DeviceSummary;

    /// Candidate coordinate sources.
    fn coordinate_fields(&self) -> CoordinateFields;
}

// ============================================================================
// UISP
// ============================================================================

/// Reference from a device to its site.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UispSiteRef {
    /// Site identifier.
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    /// Site name.
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
}

/// `identification` block of a UISP device.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UispIdentification {
    /// Device identifier.
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    /// Device name.
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    /// Device hostname.
    #[serde(default, deserialize_with = "lenient_string")]
    pub hostname: Option<String>,
    /// MAC address.
    #[serde(default, deserialize_with = "lenient_string")]
    pub mac: Option<String>,
    /// Hardware model.
    #[serde(default, deserialize_with = "lenient_string")]
    pub model: Option<String>,
    /// Device family (`airMax`, `olt`, ...).
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: Option<String>,
    /// Device role (`station`, `ap`, ...).
    #[serde(default, deserialize_with = "lenient_string")]
    pub role: Option<String>,
    /// Site the device belongs to.
    #[serde(default)]
    pub site: Option<UispSiteRef>,
}

/// `overview` block of a UISP device.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UispOverview {
    /// Device status (`active`, `disconnected`, ...).
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    /// Wireless signal in dBm.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub signal: Option<f64>,
}

/// A device from UISP `/devices`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UispDevice {
    /// Identity fields.
    #[serde(default)]
    pub identification: Option<UispIdentification>,
    /// Status fields.
    #[serde(default)]
    pub overview: Option<UispOverview>,
    /// Attribute-level coordinate.
    #[serde(default)]
    pub attributes: Option<PartialCoordinate>,
    /// Location-block coordinate.
    #[serde(default)]
    pub location: Option<PartialCoordinate>,
}

impl UispDevice {
    /// Device identifier.
    pub fn id(&self) -> Option<&str> {
        self.identification.as_ref()?.id.as_deref()
    }

    /// Best available display name: name, hostname, MAC, then identifier.
    pub fn display_name(&self) -> Option<String> {
        let ident = self.identification.as_ref()?;
        ident
            .name
            .clone()
            .or_else(|| ident.hostname.clone())
            .or_else(|| ident.mac.clone())
            .or_else(|| ident.id.clone())
    }
}

impl GeoDevice for UispDevice {
    fn summary(&self) -> DeviceSummary {
        let ident = self.identification.clone().unwrap_or_default();
        DeviceSummary {
            name: self.display_name().unwrap_or_else(|| "unnamed".to_string()),
            model: ident.model,
            kind: ident.kind.or(ident.role),
            state: self.overview.as_ref().and_then(|o| o.status.clone()),
        }
    }

    fn coordinate_fields(&self) -> CoordinateFields {
        CoordinateFields {
            attributes: self.attributes.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            site_id: self
                .identification
                .as_ref()
                .and_then(|i| i.site.as_ref())
                .and_then(|s| s.id.clone()),
        }
    }
}

/// `identification` block of a UISP site.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UispSiteIdentification {
    /// Site identifier.
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    /// Site name.
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
}

/// `description` block of a UISP site.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UispSiteDescription {
    /// Site coordinate.
    #[serde(default)]
    pub location: Option<PartialCoordinate>,
}

/// A site from UISP `/sites`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UispSite {
    /// Top-level identifier.
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    /// Identity fields.
    #[serde(default)]
    pub identification: Option<UispSiteIdentification>,
    /// Top-level coordinate.
    #[serde(default)]
    pub location: Option<PartialCoordinate>,
    /// Description block, which carries the coordinate in newer releases.
    #[serde(default)]
    pub description: Option<UispSiteDescription>,
}

impl UispSite {
    /// Site identifier, top-level first.
    pub fn site_id(&self) -> Option<&str> {
        self.id
            .as_deref()
            .or_else(|| self.identification.as_ref()?.id.as_deref())
    }

    /// Site coordinate: top-level `location` if complete, else `description.location`.
    pub fn coordinate(&self) -> PartialCoordinate {
        let top = self.location.unwrap_or_default();
        if top.complete().is_some() {
            return top;
        }
        self.description
            .as_ref()
            .and_then(|d| d.location)
            .unwrap_or(top)
    }
}

/// The device half of a data-link endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UispLinkDevice {
    /// Identity fields.
    #[serde(default)]
    pub identification: Option<UispIdentification>,
    /// Flat identifier used by some releases.
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    /// Flat name used by some releases.
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    /// Status fields.
    #[serde(default)]
    pub overview: Option<UispOverview>,
}

/// The site half of a data-link endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UispLinkSite {
    /// Identity fields.
    #[serde(default)]
    pub identification: Option<UispSiteIdentification>,
}

/// One end of a data link.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UispLinkEnd {
    /// Device at this end.
    #[serde(default)]
    pub device: Option<UispLinkDevice>,
    /// Site at this end.
    #[serde(default)]
    pub site: Option<UispLinkSite>,
}

/// A link from UISP `/data-links`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UispDataLink {
    /// Link identifier.
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    /// First endpoint.
    #[serde(default)]
    pub from: Option<UispLinkEnd>,
    /// Second endpoint.
    #[serde(default)]
    pub to: Option<UispLinkEnd>,
    /// Link kind (`wireless`, `ethernet`, ...).
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: Option<String>,
    /// Link state.
    #[serde(default, deserialize_with = "lenient_string")]
    pub state: Option<String>,
    /// Link signal in dBm.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub signal: Option<f64>,
}

// ============================================================================
// UniFi
// ============================================================================

/// Uplink block of a UniFi device.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UnifiUplink {
    /// MAC of the upstream device.
    #[serde(default, deserialize_with = "lenient_string")]
    pub uplink_mac: Option<String>,
    /// Name of the upstream device, when the controller provides it.
    #[serde(default, deserialize_with = "lenient_string")]
    pub uplink_device_name: Option<String>,
    /// Uplink medium (`wire`, `wireless`).
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: Option<String>,
}

/// A device from UniFi `stat/device`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UnifiDevice {
    /// Device name.
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    /// MAC address.
    #[serde(default, deserialize_with = "lenient_string")]
    pub mac: Option<String>,
    /// Hardware model.
    #[serde(default, deserialize_with = "lenient_string")]
    pub model: Option<String>,
    /// Device type.
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: Option<String>,
    /// Management IP.
    #[serde(default, deserialize_with = "lenient_string")]
    pub ip: Option<String>,
    /// 1 = online, 0 = offline.
    #[serde(default, deserialize_with = "lenient_i64")]
    pub state: Option<i64>,
    /// Connected clients.
    #[serde(default, deserialize_with = "lenient_i64")]
    pub num_sta: Option<i64>,
    /// Satisfaction score.
    #[serde(default, deserialize_with = "lenient_i64")]
    pub satisfaction: Option<i64>,
    /// Floor-plan X position.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub x: Option<f64>,
    /// Floor-plan Y position.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub y: Option<f64>,
    /// Upstream connection.
    #[serde(default)]
    pub uplink: Option<UnifiUplink>,
}

impl UnifiDevice {
    /// Name, falling back to the MAC address.
    pub fn display_name(&self) -> Option<String> {
        self.name.clone().or_else(|| self.mac.clone())
    }

    /// Summary emitted in the combined document.
    pub fn to_summary(&self) -> UnifiDeviceSummary {
        UnifiDeviceSummary {
            name: self.display_name(),
            kind: self.kind.clone(),
            model: self.model.clone(),
            ip: self.ip.clone(),
            mac: self.mac.clone(),
            state: self.state,
            clients: self.num_sta.unwrap_or(0).max(0) as u64,
            satisfaction: self.satisfaction.unwrap_or(0),
            x: self.x,
            y: self.y,
        }
    }
}
