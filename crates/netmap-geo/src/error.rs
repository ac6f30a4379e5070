//! Error types for the geo crate.

use thiserror::Error;

/// Errors that can occur while computing, fetching or stitching map tiles.
#[derive(Debug, Error)]
pub enum GeoError {
    /// I/O error reading or writing a tile file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decode or encode error.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// HTTP request error when fetching tiles.
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Tile server responded with a non-success status.
    #[error("Tile server responded with HTTP {0}")]
    HttpStatus(u16),

    /// Tile request URL could not be built.
    #[error("Invalid tile URL: {0}")]
    InvalidUrl(String),

    /// The provider refused or failed to serve a tile.
    #[error("Failed to fetch tile {style} row={row} col={col}: {reason}")]
    TileFetchFailed {
        /// Map style of the tile.
        style: String,
        /// Grid row (0 = southernmost).
        row: u32,
        /// Grid column (0 = westernmost).
        col: u32,
        /// Reason for failure.
        reason: String,
    },

    /// Stitching was attempted with tiles missing from the grid.
    #[error("Incomplete grid for style {style}: {} of {expected} tiles missing", missing.len())]
    IncompleteGrid {
        /// Map style being stitched.
        style: String,
        /// Number of tiles the grid requires.
        expected: usize,
        /// (row, col) of every missing tile.
        missing: Vec<(u32, u32)>,
    },

    /// A tile's pixel dimensions differ from the first tile in the grid.
    #[error("Tile row={row} col={col} is {actual_width}x{actual_height}, expected {width}x{height}")]
    TileSizeMismatch {
        /// Grid row of the offending tile.
        row: u32,
        /// Grid column of the offending tile.
        col: u32,
        /// Expected width in pixels.
        width: u32,
        /// Expected height in pixels.
        height: u32,
        /// Actual width in pixels.
        actual_width: u32,
        /// Actual height in pixels.
        actual_height: u32,
    },

    /// Grid size must be at least 1.
    #[error("Invalid grid size {0} (must be at least 1)")]
    InvalidGridSize(u32),

    /// Bounding box has zero or negative span on some axis.
    #[error("Degenerate bounding box: lat {lat_min}..{lat_max}, lon {lon_min}..{lon_max}")]
    DegenerateBoundingBox {
        /// Minimum latitude.
        lat_min: f64,
        /// Maximum latitude.
        lat_max: f64,
        /// Minimum longitude.
        lon_min: f64,
        /// Maximum longitude.
        lon_max: f64,
    },
}
