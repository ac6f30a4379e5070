//! The combined JSON document consumed by the visualization.

use crate::model::{DeviceRecord, LinkRecord, UnifiDeviceSummary};
use crate::Result;
use netmap_geo::BoundingBox;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name of the combined document inside the output directory.
pub const DOCUMENT_FILE_NAME: &str = "network_data.json";

/// Geographic extent and rendering parameters of the map images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMetadata {
    /// Southern edge.
    pub lat_min: f64,
    /// Northern edge.
    pub lat_max: f64,
    /// Western edge.
    pub lon_min: f64,
    /// Eastern edge.
    pub lon_max: f64,
    /// Grid dimension, e.g. `"4x4"`.
    pub grid: String,
    /// Shared tile zoom, when maps were rendered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<u8>,
    /// Styles requested.
    #[serde(default)]
    pub styles: Vec<String>,
}

impl MapMetadata {
    /// Metadata for a reconciled bounding box.
    pub fn new(bbox: BoundingBox, grid_size: u32, styles: &[String]) -> Self {
        Self {
            lat_min: bbox.lat_min,
            lat_max: bbox.lat_max,
            lon_min: bbox.lon_min,
            lon_max: bbox.lon_max,
            grid: format!("{}x{}", grid_size, grid_size),
            zoom: None,
            styles: styles.to_vec(),
        }
    }

    /// Record the zoom the tiles were fetched at.
    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = Some(zoom);
        self
    }

    /// The bounding box described by this metadata.
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(self.lat_min, self.lat_max, self.lon_min, self.lon_max)
    }
}

/// Everything collected in one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombinedDocument {
    /// UniFi device summaries.
    pub unifi: Vec<UnifiDeviceSummary>,
    /// Reconciled UISP devices.
    pub uisp: Vec<DeviceRecord>,
    /// Device-to-device edges.
    pub links: Vec<LinkRecord>,
    /// Map extent; `null` when nothing was geocoded.
    pub map_metadata: Option<MapMetadata>,
}

impl CombinedDocument {
    /// Write pretty-printed JSON to `path`.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Write to `<output_dir>/network_data.json` and return the path.
    pub fn write_to_dir(&self, output_dir: &Path) -> Result<PathBuf> {
        let path = output_dir.join(DOCUMENT_FILE_NAME);
        self.write_json(&path)?;
        info!(
            path = %path.display(),
            unifi = self.unifi.len(),
            uisp = self.uisp.len(),
            links = self.links.len(),
            "Wrote combined document"
        );
        Ok(path)
    }
}
