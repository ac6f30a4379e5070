//! Metric declarations for the network map collector.
//!
//! Every counter and gauge emitted during a collection run is declared here as
//! a const [`Metric`], so names are spelled in one place and descriptions can
//! be registered with whatever recorder the binary installs.
//!
//! # Example
//!
//! ```rust
//! use netmap_metrics::metric_defs;
//!
//! netmap_metrics::metrics::counter!(metric_defs::TILES_FETCHED.name, "style" => "satellite").increment(1);
//! ```

pub use metrics;

use metrics::{describe_counter, describe_gauge, Unit};

/// The kind of metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// A monotonically increasing counter.
    Counter,
    /// A gauge holding the latest value.
    Gauge,
}

impl MetricKind {
    /// Returns the kind as a lowercase string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric declaration with its metadata.
#[derive(Debug, Clone)]
pub struct Metric {
    /// The metric name (e.g., "netmap.tiles.fetched").
    pub name: &'static str,
    /// Counter or gauge.
    pub kind: MetricKind,
    /// Human-readable description.
    pub description: &'static str,
    /// Unit of measurement.
    pub unit: Unit,
    /// Expected label keys.
    pub labels: &'static [&'static str],
}

impl Metric {
    /// Declare a counter counted in [`Unit::Count`].
    pub const fn counter(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Counter,
            description,
            unit: Unit::Count,
            labels: &[],
        }
    }

    /// Declare a gauge counted in [`Unit::Count`].
    pub const fn gauge(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Gauge,
            description,
            unit: Unit::Count,
            labels: &[],
        }
    }

    /// Override the unit.
    pub const fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    /// Set the expected label keys.
    pub const fn with_labels(mut self, labels: &'static [&'static str]) -> Self {
        self.labels = labels;
        self
    }

    /// Register this metric's description with the installed recorder.
    pub fn describe(&self) {
        match self.kind {
            MetricKind::Counter => describe_counter!(self.name, self.unit, self.description),
            MetricKind::Gauge => describe_gauge!(self.name, self.unit, self.description),
        }
    }
}

/// All metric definitions for a collection run.
pub mod metric_defs {
    use super::{Metric, Unit};

    // ========================================================================
    // Sources
    // ========================================================================

    /// Controller endpoints that failed (transport error or non-success status).
    ///
    /// Labels: source
    pub const SOURCE_FAILURES: Metric =
        Metric::counter("netmap.source.failures", "Controller requests that failed")
            .with_labels(&["source"]);

    /// Records returned by a controller endpoint.
    ///
    /// Labels: source
    pub const SOURCE_RECORDS: Metric =
        Metric::counter("netmap.source.records", "Records returned by controller endpoints")
            .with_labels(&["source"]);

    // ========================================================================
    // Reconciliation
    // ========================================================================

    /// Devices considered for geocoding.
    pub const DEVICES_SEEN: Metric =
        Metric::counter("netmap.reconcile.devices_seen", "Devices considered for geocoding");

    /// Devices without a coordinate from any fallback source.
    pub const DEVICES_UNRESOLVED: Metric = Metric::counter(
        "netmap.reconcile.devices_unresolved",
        "Devices with no usable coordinate",
    );

    /// Devices dropped for a near-zero (sentinel) latitude.
    pub const DEVICES_DEGENERATE: Metric = Metric::counter(
        "netmap.reconcile.devices_degenerate",
        "Devices dropped for a sentinel coordinate",
    );

    /// Devices dropped by the median-box outlier filter.
    pub const DEVICES_OUTLIERS: Metric = Metric::counter(
        "netmap.reconcile.devices_outliers",
        "Devices dropped as geographic outliers",
    );

    /// Devices emitted with a coordinate.
    pub const DEVICES_GEOCODED: Metric =
        Metric::gauge("netmap.reconcile.devices_geocoded", "Devices emitted with a coordinate");

    // ========================================================================
    // Tiles
    // ========================================================================

    /// Tiles fetched and written to disk.
    ///
    /// Labels: style
    pub const TILES_FETCHED: Metric =
        Metric::counter("netmap.tiles.fetched", "Tiles fetched successfully").with_labels(&["style"]);

    /// Tiles that could not be fetched.
    ///
    /// Labels: style
    pub const TILES_FAILED: Metric =
        Metric::counter("netmap.tiles.failed", "Tiles that failed to fetch").with_labels(&["style"]);

    /// Bytes of tile imagery downloaded.
    pub const TILE_BYTES: Metric = Metric::counter("netmap.tiles.bytes", "Tile bytes downloaded")
        .with_unit(Unit::Bytes);

    /// Composite images written.
    ///
    /// Labels: style
    pub const STITCH_COMPLETED: Metric =
        Metric::counter("netmap.stitch.completed", "Composite images written").with_labels(&["style"]);

    /// Stitches refused because the grid was incomplete or inconsistent.
    ///
    /// Labels: style
    pub const STITCH_REFUSED: Metric =
        Metric::counter("netmap.stitch.refused", "Stitches refused").with_labels(&["style"]);

    /// Returns a slice of all defined metrics.
    pub const ALL: &[&Metric] = &[
        &SOURCE_FAILURES,
        &SOURCE_RECORDS,
        &DEVICES_SEEN,
        &DEVICES_UNRESOLVED,
        &DEVICES_DEGENERATE,
        &DEVICES_OUTLIERS,
        &DEVICES_GEOCODED,
        &TILES_FETCHED,
        &TILES_FAILED,
        &TILE_BYTES,
        &STITCH_COMPLETED,
        &STITCH_REFUSED,
    ];
}

/// Register descriptions for every metric in [`metric_defs::ALL`].
///
/// Call once at startup, after installing a recorder.
pub fn describe_metrics() {
    for metric in metric_defs::ALL {
        metric.describe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_metric_names_unique() {
        let names: HashSet<&str> = metric_defs::ALL.iter().map(|m| m.name).collect();
        assert_eq!(names.len(), metric_defs::ALL.len());
    }

    #[test]
    fn test_metric_names_prefixed() {
        for metric in metric_defs::ALL {
            assert!(metric.name.starts_with("netmap."), "{}", metric.name);
            assert!(!metric.description.is_empty(), "{}", metric.name);
        }
    }

    #[test]
    fn test_metric_builder() {
        const TEST: Metric = Metric::counter("test.counter", "A test counter")
            .with_unit(Unit::Bytes)
            .with_labels(&["style"]);

        assert_eq!(TEST.kind, MetricKind::Counter);
        assert_eq!(TEST.unit, Unit::Bytes);
        assert_eq!(TEST.labels, &["style"]);
        assert_eq!(TEST.kind.to_string(), "counter");
    }

    #[test]
    fn test_definitions() {
        assert_eq!(metric_defs::TILES_FETCHED.labels, &["style"]);
        assert_eq!(metric_defs::DEVICES_GEOCODED.kind, MetricKind::Gauge);
        assert_eq!(metric_defs::TILE_BYTES.unit, Unit::Bytes);
    }

    #[test]
    fn test_describe_without_recorder() {
        // No recorder installed: describing is a no-op.
        describe_metrics();
    }
}
