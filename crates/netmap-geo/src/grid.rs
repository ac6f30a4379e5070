//! Partition of a bounding box into an N×N grid of tile windows.
//!
//! ## Grid Coordinate System
//!
//! - `row` runs from 0 (southernmost strip) to N-1 (northernmost strip)
//! - `col` runs from 0 (westernmost strip) to N-1 (easternmost strip)
//!
//! Raster images use a top-left origin, so the stitcher flips rows when it
//! places tiles on the canvas.

use crate::zoom::calculate_zoom_level;
use crate::{BoundingBox, GeoError, Result};

/// One cell of a tile grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileWindow {
    /// Grid row, 0 = south.
    pub row: u32,
    /// Grid column, 0 = west.
    pub col: u32,
    /// Geographic extent covered by this cell.
    pub bounds: BoundingBox,
}

impl TileWindow {
    /// Center coordinate as `(lat, lon)`; tiles are requested by this point.
    pub fn center(&self) -> (f64, f64) {
        self.bounds.center()
    }
}

/// An N×N grid over a bounding box with a single shared zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileGrid {
    bbox: BoundingBox,
    grid_size: u32,
    zoom: u8,
}

impl TileGrid {
    /// Build a grid and compute its shared zoom level.
    pub fn new(bbox: BoundingBox, grid_size: u32, tile_pixel_size: u32) -> Result<Self> {
        if grid_size == 0 {
            return Err(GeoError::InvalidGridSize(grid_size));
        }
        bbox.validate()?;
        let zoom = calculate_zoom_level(&bbox, grid_size, tile_pixel_size);
        Ok(Self {
            bbox,
            grid_size,
            zoom,
        })
    }

    /// The box being tiled.
    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Number of tiles per row and per column.
    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    /// Zoom level shared by every tile.
    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    /// Total number of tiles (`grid_size`²).
    pub fn tile_count(&self) -> usize {
        (self.grid_size as usize) * (self.grid_size as usize)
    }

    /// Grid dimension label such as `"4x4"`.
    pub fn label(&self) -> String {
        format!("{}x{}", self.grid_size, self.grid_size)
    }

    /// Latitude of the southern edge of `row`; `row == grid_size` yields `lat_max`.
    fn lat_edge(&self, row: u32) -> f64 {
        if row >= self.grid_size {
            self.bbox.lat_max
        } else {
            self.bbox.lat_min + row as f64 * (self.bbox.lat_span() / self.grid_size as f64)
        }
    }

    /// Longitude of the western edge of `col`; `col == grid_size` yields `lon_max`.
    fn lon_edge(&self, col: u32) -> f64 {
        if col >= self.grid_size {
            self.bbox.lon_max
        } else {
            self.bbox.lon_min + col as f64 * (self.bbox.lon_span() / self.grid_size as f64)
        }
    }

    /// The window at `(row, col)`, or `None` if outside the grid.
    pub fn window(&self, row: u32, col: u32) -> Option<TileWindow> {
        if row >= self.grid_size || col >= self.grid_size {
            return None;
        }
        Some(TileWindow {
            row,
            col,
            bounds: BoundingBox {
                lat_min: self.lat_edge(row),
                lat_max: self.lat_edge(row + 1),
                lon_min: self.lon_edge(col),
                lon_max: self.lon_edge(col + 1),
            },
        })
    }

    /// All windows in row-major order, starting at the south-west corner.
    pub fn windows(&self) -> impl Iterator<Item = TileWindow> + '_ {
        (0..self.grid_size).flat_map(move |row| {
            (0..self.grid_size).filter_map(move |col| self.window(row, col))
        })
    }
}
