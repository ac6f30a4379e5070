//! End-to-end runs over canned controller records.

use image::{ImageFormat, Rgba, RgbaImage};
use netmap_collect::{parse_records, SourceOutcome};
use netmap_geo::{GeoError, TileProvider, TileRequest};
use netmap_runner::{process, CollectorConfig, SourceData};
use serde_json::{json, Value};
use std::io::Cursor;
use tempfile::TempDir;

struct SolidTiles {
    fail_style: Option<&'static str>,
}

impl TileProvider for SolidTiles {
    fn fetch_tile(&self, request: &TileRequest<'_>) -> netmap_geo::Result<Vec<u8>> {
        if self.fail_style == Some(request.style) {
            return Err(GeoError::HttpStatus(500));
        }
        let tile = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        tile.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

fn config(temp_dir: &TempDir) -> CollectorConfig {
    let mut config = CollectorConfig::default();
    config.output_dir = temp_dir.path().to_path_buf();
    config.map.grid_size = 2;
    config
}

fn sources() -> SourceData {
    SourceData {
        unifi_devices: SourceOutcome::Fetched(parse_records(
            vec![
                json!({"name": "Gateway", "mac": "aa:01", "type": "ugw", "state": 1}),
                json!({"name": "AP", "mac": "aa:02", "type": "uap", "state": 1,
                       "uplink": {"uplink_mac": "aa:01", "type": "wire"}}),
            ],
            "unifi",
        )),
        uisp_devices: SourceOutcome::Fetched(parse_records(
            vec![
                json!({"identification": {"id": "d1", "name": "Tower"},
                       "attributes": {"latitude": 40.0, "longitude": -74.0}}),
                json!({"identification": {"id": "d2", "name": "CPE", "site": {"id": "s1"}}}),
                json!({"identification": {"id": "d3", "name": "Stale"},
                       "location": {"latitude": 55.0, "longitude": 10.0}}),
            ],
            "uisp",
        )),
        uisp_sites: SourceOutcome::Fetched(parse_records(
            vec![json!({"id": "s1", "location": {"latitude": 40.001, "longitude": -74.001}})],
            "sites",
        )),
        uisp_links: SourceOutcome::Fetched(parse_records(
            vec![json!({
                "type": "wireless",
                "from": {"device": {"identification": {"id": "d1"}}},
                "to": {"device": {"identification": {"id": "d2"}}},
                "signal": -60
            })],
            "data-links",
        )),
    }
}

fn read_document(temp_dir: &TempDir) -> Value {
    let text = std::fs::read_to_string(temp_dir.path().join("network_data.json")).unwrap();
    serde_json::from_str(&text).unwrap()
}

#[test]
fn test_full_run_with_maps() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = config(&temp_dir);

    let report = process(&config, sources(), Some(SolidTiles { fail_style: None })).unwrap();

    assert_eq!(report.unifi_devices, 2);
    assert_eq!(report.uisp_devices, 2);
    assert_eq!(report.reconcile.outliers, 1);
    assert_eq!(report.links, 2);
    assert!(report.failed_sources.is_empty());
    assert_eq!(report.stitched().len(), 2);
    assert!(report.refused_styles().is_empty());

    let document = read_document(&temp_dir);
    let names: Vec<&str> = document["uisp"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Tower", "CPE"]);
    assert_eq!(document["links"][1]["from"], "Tower");
    assert_eq!(document["links"][1]["to"], "CPE");
    assert_eq!(document["links"][1]["signal"], -60.0);

    let metadata = &document["map_metadata"];
    assert_eq!(metadata["grid"], "2x2");
    assert!(metadata["zoom"].is_u64());
    assert!(metadata["lat_max"].as_f64().unwrap() < 41.0);
    assert!(metadata["lon_max"].as_f64().unwrap() < -73.0);

    for style in ["satellite", "roadmap"] {
        let composite = temp_dir.path().join(format!("map_{}_stitched.png", style));
        let image = image::open(composite).unwrap();
        assert_eq!((image.width(), image.height()), (8, 8));
    }

    let tsv = std::fs::read_to_string(temp_dir.path().join("devices.tsv")).unwrap();
    assert_eq!(tsv.lines().count(), 5);
}

#[test]
fn test_refused_style_is_reported() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = config(&temp_dir);

    let provider = SolidTiles {
        fail_style: Some("roadmap"),
    };
    let report = process(&config, sources(), Some(provider)).unwrap();

    let refused = report.refused_styles();
    assert_eq!(refused.len(), 1);
    assert_eq!(refused[0].0, "roadmap");
    assert!(temp_dir.path().join("map_satellite_stitched.png").exists());
    assert!(!temp_dir.path().join("map_roadmap_stitched.png").exists());
    assert!(temp_dir.path().join("network_data.json").exists());
}

#[test]
fn test_missing_provider_still_writes_outputs() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = config(&temp_dir);

    let report = process::<SolidTiles>(&config, sources(), None).unwrap();
    assert!(report.render.is_none());

    let document = read_document(&temp_dir);
    assert_eq!(document["map_metadata"]["grid"], "2x2");
    assert!(document["map_metadata"].get("zoom").is_none());
    assert!(!temp_dir.path().join("map_satellite_stitched.png").exists());
}

#[test]
fn test_unavailable_sources_give_empty_outputs() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = config(&temp_dir);

    let sources = SourceData {
        unifi_devices: SourceOutcome::Failed("connection refused".into()),
        uisp_devices: SourceOutcome::Failed("HTTP 401".into()),
        ..SourceData::default()
    };
    let report = process(&config, sources, Some(SolidTiles { fail_style: None })).unwrap();

    assert_eq!(report.failed_sources, vec!["unifi", "uisp.devices"]);
    assert_eq!(report.uisp_devices, 0);
    assert!(report.render.is_none());

    let document = read_document(&temp_dir);
    assert!(document["map_metadata"].is_null());
    assert_eq!(document["unifi"], json!([]));
    let tsv = std::fs::read_to_string(temp_dir.path().join("devices.tsv")).unwrap();
    assert_eq!(tsv, "name\tmodel\ttype\tstate\tlat\tlon\n");
}
