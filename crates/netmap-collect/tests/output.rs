//! Combined document and listing written to disk.

use netmap_collect::{
    parse_records, unifi_links, write_tsv_file, CombinedDocument, MapMetadata, Reconciler,
    SiteCoordinates, UispDevice, UnifiDevice, DOCUMENT_FILE_NAME,
};
use serde_json::{json, Value};
use tempfile::TempDir;

#[test]
fn test_document_and_tsv_round_trip_through_disk() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let unifi: Vec<UnifiDevice> = parse_records(
        vec![
            json!({"name": "Gateway", "mac": "aa:01", "type": "ugw", "state": 1, "num_sta": 12}),
            json!({"name": "AP", "mac": "aa:02", "type": "uap", "state": 0,
                   "uplink": {"uplink_mac": "aa:01", "type": "wire"}}),
        ],
        "unifi",
    );
    let uisp: Vec<UispDevice> = parse_records(
        vec![json!({
            "identification": {"id": "d1", "name": "Tower", "model": "LAP-120", "type": "airMax"},
            "overview": {"status": "active"},
            "attributes": {"latitude": 40.0, "longitude": -74.0}
        })],
        "uisp",
    );

    let reconciled = Reconciler::default().reconcile(&uisp, &SiteCoordinates::new());
    let styles = vec!["satellite".to_string(), "roadmap".to_string()];
    let document = CombinedDocument {
        unifi: unifi.iter().map(UnifiDevice::to_summary).collect(),
        uisp: reconciled.devices.clone(),
        links: unifi_links(&unifi),
        map_metadata: reconciled.bbox.map(|b| MapMetadata::new(b, 4, &styles)),
    };

    let path = document.write_to_dir(temp_dir.path()).unwrap();
    assert_eq!(path, temp_dir.path().join(DOCUMENT_FILE_NAME));

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains('\n'), "document should be pretty-printed");
    let value: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["unifi"][0]["clients"], 12);
    assert_eq!(value["unifi"][1]["satisfaction"], 0);
    assert_eq!(value["uisp"][0]["lat"], 40.0);
    assert_eq!(value["uisp"][0]["type"], "airMax");
    assert_eq!(value["links"][0], json!({"from": "AP", "to": "Gateway", "type": "wire"}));
    assert_eq!(value["map_metadata"]["grid"], "4x4");

    let parsed: CombinedDocument = serde_json::from_value(value).unwrap();
    assert_eq!(parsed, document);

    let tsv_path = write_tsv_file(temp_dir.path(), &document.uisp, &document.unifi).unwrap();
    let tsv = std::fs::read_to_string(tsv_path).unwrap();
    let lines: Vec<&str> = tsv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1], "Tower\tLAP-120\tairMax\tactive\t40\t-74");
    assert_eq!(lines[2], "Gateway\t\tugw\t1\t\t");
}

#[test]
fn test_no_geocoded_devices_gives_null_metadata() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let document = CombinedDocument::default();
    let path = document.write_to_dir(temp_dir.path()).unwrap();
    let value: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert!(value["map_metadata"].is_null());
}
