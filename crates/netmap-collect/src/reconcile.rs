//! Device coordinate reconciliation.
//!
//! Each device's coordinate is resolved through an ordered list of sources
//! (attributes, then location, then the device's site). A candidate is used
//! only if both halves parse, lie in the valid range and are not degenerate;
//! otherwise resolution falls through to the next source. The resolved set is
//! then run through a single-pass median-box filter that drops devices far
//! from the cluster, and the survivors define a padded bounding box.

use crate::model::DeviceRecord;
use crate::raw::{CoordinateFields, GeoDevice, PartialCoordinate, UispSite};
use netmap_geo::{BoundingBox, DEFAULT_PADDING_FLOOR_DEG, DEFAULT_PADDING_FRACTION};
use netmap_metrics::metric_defs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Latitudes with absolute value at or below this are treated as "unknown".
pub const DEFAULT_MIN_ABS_LATITUDE: f64 = 0.1;

/// Maximum distance in degrees from the median on each axis.
pub const DEFAULT_MEDIAN_TOLERANCE_DEG: f64 = 0.03;

/// Where a device's coordinate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoordinateSource {
    /// Device attribute-level coordinate.
    Attributes,
    /// Device location block.
    Location,
    /// Coordinate of the device's site.
    Site,
}

impl CoordinateSource {
    /// Resolution order.
    pub const PRIORITY: [CoordinateSource; 3] = [
        CoordinateSource::Attributes,
        CoordinateSource::Location,
        CoordinateSource::Site,
    ];
}

/// Site identifier to coordinate lookup, built once per run.
#[derive(Debug, Clone, Default)]
pub struct SiteCoordinates {
    sites: HashMap<String, PartialCoordinate>,
}

impl SiteCoordinates {
    /// Empty lookup.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the lookup from site records; sites without an identifier are skipped.
    pub fn from_sites<'a, I>(sites: I) -> Self
    where
        I: IntoIterator<Item = &'a UispSite>,
    {
        let mut lookup = Self::new();
        for site in sites {
            if let Some(id) = site.site_id() {
                lookup.insert(id, site.coordinate());
            }
        }
        lookup
    }

    /// Add or replace a site.
    pub fn insert(&mut self, site_id: impl Into<String>, coordinate: PartialCoordinate) {
        self.sites.insert(site_id.into(), coordinate);
    }

    /// Look up a site.
    pub fn get(&self, site_id: &str) -> Option<&PartialCoordinate> {
        self.sites.get(site_id)
    }

    /// Number of sites.
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Whether the lookup is empty.
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

/// Reconciler settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Degenerate-coordinate threshold on `|latitude|`.
    pub min_abs_latitude: f64,
    /// Median-box tolerance in degrees.
    pub median_tolerance_deg: f64,
    /// Bounding-box padding as a fraction of span.
    pub padding_fraction: f64,
    /// Minimum padding in degrees.
    pub padding_floor_deg: f64,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            min_abs_latitude: DEFAULT_MIN_ABS_LATITUDE,
            median_tolerance_deg: DEFAULT_MEDIAN_TOLERANCE_DEG,
            padding_fraction: DEFAULT_PADDING_FRACTION,
            padding_floor_deg: DEFAULT_PADDING_FLOOR_DEG,
        }
    }
}

/// Per-run reconciliation counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Devices presented.
    pub seen: usize,
    /// Devices with no usable coordinate in any source.
    pub unresolved: usize,
    /// Devices whose only coordinates were degenerate.
    pub degenerate: usize,
    /// Devices dropped by the median filter.
    pub outliers: usize,
    /// Devices in the output.
    pub geocoded: usize,
}

/// Reconciler output.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// Geocoded devices, in input order.
    pub devices: Vec<DeviceRecord>,
    /// Padded box around `devices`; `None` when nothing was geocoded.
    pub bbox: Option<BoundingBox>,
    /// Counts.
    pub stats: ReconcileStats,
}

enum Resolution {
    Resolved(f64, f64, CoordinateSource),
    Degenerate,
    Unresolved,
}

/// Resolves, filters and bounds device coordinates.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    config: ReconcilerConfig,
}

impl Reconciler {
    /// Create a reconciler.
    pub fn new(config: ReconcilerConfig) -> Self {
        Self { config }
    }

    /// Settings in use.
    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Resolve the first usable coordinate for a device, if any.
    pub fn resolve(
        &self,
        fields: &CoordinateFields,
        sites: &SiteCoordinates,
    ) -> Option<(f64, f64, CoordinateSource)> {
        match self.resolve_inner(fields, sites) {
            Resolution::Resolved(lat, lon, source) => Some((lat, lon, source)),
            _ => None,
        }
    }

    fn resolve_inner(&self, fields: &CoordinateFields, sites: &SiteCoordinates) -> Resolution {
        let mut saw_degenerate = false;
        for source in CoordinateSource::PRIORITY {
            let candidate = match source {
                CoordinateSource::Attributes => Some(fields.attributes),
                CoordinateSource::Location => Some(fields.location),
                CoordinateSource::Site => fields
                    .site_id
                    .as_deref()
                    .and_then(|id| sites.get(id))
                    .copied(),
            };
            let Some((lat, lon)) = candidate.and_then(|c| c.complete()) else {
                continue;
            };
            if !in_range(lat, lon) {
                continue;
            }
            if lat.abs() <= self.config.min_abs_latitude {
                saw_degenerate = true;
                continue;
            }
            return Resolution::Resolved(lat, lon, source);
        }
        if saw_degenerate {
            Resolution::Degenerate
        } else {
            Resolution::Unresolved
        }
    }

    /// Reconcile a batch of devices against a site lookup.
    ///
    /// Empty input yields an empty result with no bounding box.
    pub fn reconcile<D: GeoDevice>(&self, devices: &[D], sites: &SiteCoordinates) -> Reconciliation {
        let mut stats = ReconcileStats {
            seen: devices.len(),
            ..Default::default()
        };

        let mut candidates = Vec::with_capacity(devices.len());
        for device in devices {
            let summary = device.summary();
            match self.resolve_inner(&device.coordinate_fields(), sites) {
                Resolution::Resolved(lat, lon, source) => {
                    debug!(device = %summary.name, lat, lon, ?source, "Resolved coordinate");
                    candidates.push(summary.at(lat, lon));
                }
                Resolution::Degenerate => {
                    debug!(device = %summary.name, "Dropping degenerate coordinate");
                    stats.degenerate += 1;
                }
                Resolution::Unresolved => {
                    debug!(device = %summary.name, "No coordinate");
                    stats.unresolved += 1;
                }
            }
        }

        let resolved = candidates.len();
        let devices = median_filter(candidates, self.config.median_tolerance_deg);
        stats.outliers = resolved - devices.len();
        stats.geocoded = devices.len();

        let bbox = BoundingBox::from_points(devices.iter().map(|d| (d.latitude, d.longitude)))
            .map(|b| b.padded(self.config.padding_fraction, self.config.padding_floor_deg));

        info!(
            seen = stats.seen,
            geocoded = stats.geocoded,
            unresolved = stats.unresolved,
            degenerate = stats.degenerate,
            outliers = stats.outliers,
            "Reconciled device coordinates"
        );
        emit_metrics(&stats);

        Reconciliation {
            devices,
            bbox,
            stats,
        }
    }
}

fn in_range(lat: f64, lon: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}

fn emit_metrics(stats: &ReconcileStats) {
    metrics::counter!(metric_defs::DEVICES_SEEN.name).increment(stats.seen as u64);
    metrics::counter!(metric_defs::DEVICES_UNRESOLVED.name).increment(stats.unresolved as u64);
    metrics::counter!(metric_defs::DEVICES_DEGENERATE.name).increment(stats.degenerate as u64);
    metrics::counter!(metric_defs::DEVICES_OUTLIERS.name).increment(stats.outliers as u64);
    metrics::gauge!(metric_defs::DEVICES_GEOCODED.name).set(stats.geocoded as f64);
}

/// Upper median of `values` (`sorted[len / 2]`), or `None` when empty.
pub fn median(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut sorted: Vec<f64> = values.into_iter().collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    Some(sorted[sorted.len() / 2])
}

/// Keep records within `tolerance_deg` of the per-axis median on both axes.
///
/// Latitude and longitude medians are computed independently and only once.
pub fn median_filter(records: Vec<DeviceRecord>, tolerance_deg: f64) -> Vec<DeviceRecord> {
    let (Some(lat_median), Some(lon_median)) = (
        median(records.iter().map(|r| r.latitude)),
        median(records.iter().map(|r| r.longitude)),
    ) else {
        return records;
    };

    records
        .into_iter()
        .filter(|r| {
            let keep = (r.latitude - lat_median).abs() <= tolerance_deg
                && (r.longitude - lon_median).abs() <= tolerance_deg;
            if !keep {
                debug!(
                    device = %r.name,
                    lat = r.latitude,
                    lon = r.longitude,
                    lat_median,
                    lon_median,
                    "Dropping outlier"
                );
            }
            keep
        })
        .collect()
}
