//! Geographic bounding boxes.

use crate::{GeoError, Result};
use serde::{Deserialize, Serialize};

/// Default proportional padding applied around a set of points.
pub const DEFAULT_PADDING_FRACTION: f64 = 0.05;

/// Minimum padding in degrees, so a single point still yields a visible box.
pub const DEFAULT_PADDING_FLOOR_DEG: f64 = 0.001;

/// Rectangular extent in decimal degrees.
///
/// Invariant: `lat_min <= lat_max` and `lon_min <= lon_max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Southern edge.
    pub lat_min: f64,
    /// Northern edge.
    pub lat_max: f64,
    /// Western edge.
    pub lon_min: f64,
    /// Eastern edge.
    pub lon_max: f64,
}

impl BoundingBox {
    /// Create a bounding box from two latitudes and two longitudes in any order.
    pub fn new(lat_a: f64, lat_b: f64, lon_a: f64, lon_b: f64) -> Self {
        Self {
            lat_min: lat_a.min(lat_b),
            lat_max: lat_a.max(lat_b),
            lon_min: lon_a.min(lon_b),
            lon_max: lon_a.max(lon_b),
        }
    }

    /// Smallest box containing every `(lat, lon)` point, or `None` for no points.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut points = points.into_iter();
        let (lat, lon) = points.next()?;
        let mut bbox = Self {
            lat_min: lat,
            lat_max: lat,
            lon_min: lon,
            lon_max: lon,
        };
        for (lat, lon) in points {
            bbox.lat_min = bbox.lat_min.min(lat);
            bbox.lat_max = bbox.lat_max.max(lat);
            bbox.lon_min = bbox.lon_min.min(lon);
            bbox.lon_max = bbox.lon_max.max(lon);
        }
        Some(bbox)
    }

    /// Grow each axis by `fraction` of its span, but never by less than `floor_deg`.
    ///
    /// The result is clamped to valid latitude/longitude ranges.
    pub fn padded(&self, fraction: f64, floor_deg: f64) -> Self {
        let lat_pad = (self.lat_span() * fraction).max(floor_deg);
        let lon_pad = (self.lon_span() * fraction).max(floor_deg);
        Self {
            lat_min: (self.lat_min - lat_pad).max(-90.0),
            lat_max: (self.lat_max + lat_pad).min(90.0),
            lon_min: (self.lon_min - lon_pad).max(-180.0),
            lon_max: (self.lon_max + lon_pad).min(180.0),
        }
    }

    /// Latitude extent in degrees.
    pub fn lat_span(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    /// Longitude extent in degrees.
    pub fn lon_span(&self) -> f64 {
        self.lon_max - self.lon_min
    }

    /// Center point as `(lat, lon)`.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.lat_min + self.lat_max) / 2.0,
            (self.lon_min + self.lon_max) / 2.0,
        )
    }

    /// Whether the point lies inside or on the edge of the box.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.lat_min && lat <= self.lat_max && lon >= self.lon_min && lon <= self.lon_max
    }

    /// Whether either axis has zero (or non-finite) span.
    pub fn is_degenerate(&self) -> bool {
        !(self.lat_span() > 0.0 && self.lon_span() > 0.0)
    }

    /// Return an error if the box cannot be divided into tiles.
    pub fn validate(&self) -> Result<()> {
        if self.is_degenerate() {
            return Err(GeoError::DegenerateBoundingBox {
                lat_min: self.lat_min,
                lat_max: self.lat_max,
                lon_min: self.lon_min,
                lon_max: self.lon_max,
            });
        }
        Ok(())
    }
}
