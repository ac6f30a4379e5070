//! # netmap-collect
//!
//! Pulls device, site and link records from UniFi and UISP controllers,
//! reconciles device coordinates into a single geographic cluster, and writes
//! the combined JSON document and tab-separated listing.
//!
//! Controller failures never abort a run: every fetch returns a
//! [`SourceOutcome`], and a failed source contributes an empty list.

pub mod client;
mod document;
mod error;
mod export;
mod links;
mod model;
mod raw;
mod reconcile;

pub use client::{
    parse_records, ControllerFlavor, SourceOutcome, UispClient, UispConfig, UnifiClient,
    UnifiConfig, CONTROLLER_TIMEOUT,
};
pub use document::{CombinedDocument, MapMetadata, DOCUMENT_FILE_NAME};
pub use error::CollectError;
pub use export::{write_tsv, write_tsv_file, TSV_FILE_NAME, TSV_HEADER};
pub use links::{unifi_links, UispLinkResolver};
pub use model::{DeviceRecord, DeviceSummary, LinkRecord, UnifiDeviceSummary};
pub use raw::{
    coordinate_from_value, CoordinateFields, GeoDevice, PartialCoordinate, UispDataLink,
    UispDevice, UispSite, UnifiDevice,
};
pub use reconcile::{
    median, median_filter, CoordinateSource, ReconcileStats, Reconciler, ReconcilerConfig,
    Reconciliation, SiteCoordinates, DEFAULT_MEDIAN_TOLERANCE_DEG, DEFAULT_MIN_ABS_LATITUDE,
};

/// Result type for collect operations.
pub type Result<T> = std::result::Result<T, CollectError>;
