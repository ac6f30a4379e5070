//! Link extraction from UniFi uplinks and UISP data-links.

use crate::model::LinkRecord;
use crate::raw::{UispDataLink, UispDevice, UispLinkEnd, UnifiDevice};
use std::collections::HashMap;
use tracing::debug;

fn normalize_mac(mac: &str) -> String {
    mac.trim().to_ascii_lowercase()
}

/// Uplink edges between UniFi devices.
///
/// The upstream name comes from the MAC → name map of the same device list,
/// then from the controller-supplied uplink name. Uplinks that resolve to
/// neither are skipped.
pub fn unifi_links(devices: &[UnifiDevice]) -> Vec<LinkRecord> {
    let names: HashMap<String, String> = devices
        .iter()
        .filter_map(|d| Some((normalize_mac(d.mac.as_deref()?), d.display_name()?)))
        .collect();

    let mut links = Vec::new();
    for device in devices {
        let (Some(uplink), Some(from)) = (device.uplink.as_ref(), device.display_name()) else {
            continue;
        };
        let to = uplink
            .uplink_mac
            .as_deref()
            .and_then(|mac| names.get(&normalize_mac(mac)).cloned())
            .or_else(|| uplink.uplink_device_name.clone());
        match to {
            Some(to) => links.push(LinkRecord {
                from,
                to,
                kind: uplink.kind.clone(),
                state: None,
                signal: None,
            }),
            None => debug!(device = %from, uplink_mac = ?uplink.uplink_mac, "Unresolved uplink"),
        }
    }
    links
}

/// Resolves UISP data-link endpoints to device or site names.
#[derive(Debug, Clone, Default)]
pub struct UispLinkResolver {
    device_names: HashMap<String, String>,
}

impl UispLinkResolver {
    /// Index devices by identifier.
    pub fn new(devices: &[UispDevice]) -> Self {
        let device_names = devices
            .iter()
            .filter_map(|d| Some((d.id()?.to_string(), d.display_name()?)))
            .collect();
        Self { device_names }
    }

    /// Name of one endpoint.
    ///
    /// Tries the embedded device name, the flat device name, the device map by
    /// identifier, then the site name.
    pub fn endpoint_name(&self, end: &UispLinkEnd) -> Option<String> {
        let device = end.device.as_ref();
        let ident = device.and_then(|d| d.identification.as_ref());

        ident
            .and_then(|i| i.name.clone())
            .or_else(|| device.and_then(|d| d.name.clone()))
            .or_else(|| {
                let id = ident
                    .and_then(|i| i.id.as_deref())
                    .or_else(|| device.and_then(|d| d.id.as_deref()))?;
                self.device_names.get(id).cloned()
            })
            .or_else(|| {
                end.site
                    .as_ref()?
                    .identification
                    .as_ref()?
                    .name
                    .clone()
            })
    }

    /// Convert a data-link, or `None` if either endpoint is unresolved.
    pub fn resolve(&self, link: &UispDataLink) -> Option<LinkRecord> {
        let from = self.endpoint_name(link.from.as_ref()?)?;
        let to = self.endpoint_name(link.to.as_ref()?)?;
        let signal = link.signal.or_else(|| {
            link.from
                .as_ref()?
                .device
                .as_ref()?
                .overview
                .as_ref()?
                .signal
        });
        Some(LinkRecord {
            from,
            to,
            kind: link.kind.clone(),
            state: link.state.clone(),
            signal,
        })
    }

    /// Convert every resolvable data-link.
    pub fn resolve_all(&self, links: &[UispDataLink]) -> Vec<LinkRecord> {
        links
            .iter()
            .filter_map(|link| {
                let resolved = self.resolve(link);
                if resolved.is_none() {
                    debug!(link = ?link.id, "Dropping data-link with unresolved endpoint");
                }
                resolved
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unifi(value: serde_json::Value) -> UnifiDevice {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_unifi_uplinks_resolve_by_mac() {
        let devices = vec![
            unifi(json!({"name": "Gateway", "mac": "AA:AA:AA:00:00:01"})),
            unifi(json!({
                "name": "Switch",
                "mac": "aa:aa:aa:00:00:02",
                "uplink": {"uplink_mac": "aa:aa:aa:00:00:01", "type": "wire"}
            })),
            unifi(json!({
                "mac": "aa:aa:aa:00:00:03",
                "uplink": {"uplink_mac": "aa:aa:aa:00:00:02", "type": "wireless"}
            })),
            unifi(json!({
                "name": "Orphan",
                "uplink": {"uplink_mac": "ff:ff:ff:ff:ff:ff", "type": "wire"}
            })),
        ];

        let links = unifi_links(&devices);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].from, "Switch");
        assert_eq!(links[0].to, "Gateway");
        assert_eq!(links[0].kind.as_deref(), Some("wire"));
        assert_eq!(links[1].from, "aa:aa:aa:00:00:03");
        assert_eq!(links[1].to, "Switch");
    }

    #[test]
    fn test_unifi_uplink_name_fallback() {
        let devices = vec![unifi(json!({
            "name": "AP",
            "uplink": {"uplink_mac": "00:00:00:00:00:09", "uplink_device_name": "Core", "type": "wire"}
        }))];
        let links = unifi_links(&devices);
        assert_eq!(links[0].to, "Core");
    }

    #[test]
    fn test_uisp_endpoint_priority() {
        let devices: Vec<UispDevice> = serde_json::from_value(json!([
            {"identification": {"id": "d1", "name": "Tower AP"}}
        ]))
        .unwrap();
        let resolver = UispLinkResolver::new(&devices);

        let end = |value: serde_json::Value| -> UispLinkEnd { serde_json::from_value(value).unwrap() };

        assert_eq!(
            resolver.endpoint_name(&end(json!({
                "device": {"identification": {"id": "d1", "name": "Embedded"}, "name": "Flat"}
            }))),
            Some("Embedded".to_string())
        );
        assert_eq!(
            resolver.endpoint_name(&end(json!({"device": {"id": "d1", "name": "Flat"}}))),
            Some("Flat".to_string())
        );
        assert_eq!(
            resolver.endpoint_name(&end(json!({"device": {"identification": {"id": "d1"}}}))),
            Some("Tower AP".to_string())
        );
        assert_eq!(
            resolver.endpoint_name(&end(json!({
                "device": {"id": "unknown"},
                "site": {"identification": {"name": "Hilltop"}}
            }))),
            Some("Hilltop".to_string())
        );
        assert_eq!(resolver.endpoint_name(&end(json!({}))), None);
    }

    #[test]
    fn test_uisp_links_drop_unresolved() {
        let resolver = UispLinkResolver::new(&[]);
        let links: Vec<UispDataLink> = serde_json::from_value(json!([
            {
                "id": "l1",
                "type": "wireless",
                "state": "active",
                "from": {"device": {"identification": {"name": "A"}, "overview": {"signal": -58}}},
                "to": {"device": {"identification": {"name": "B"}}}
            },
            {
                "id": "l2",
                "from": {"device": {"identification": {"name": "A"}}},
                "to": {"device": {"id": "ghost"}}
            }
        ]))
        .unwrap();

        let resolved = resolver.resolve_all(&links);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].from, "A");
        assert_eq!(resolved[0].to, "B");
        assert_eq!(resolved[0].state.as_deref(), Some("active"));
        assert_eq!(resolved[0].signal, Some(-58.0));
    }
}
