//! # netmap-geo
//!
//! Geographic helpers for rendering a network map basemap from static-map tiles.
//!
//! ## Overview
//!
//! A static-map provider serves one image per request, centered on a
//! coordinate at an integer zoom level. To cover an arbitrary bounding box at
//! useful detail the box is split into an N×N grid:
//!
//! 1. [`calculate_zoom_level`] picks one zoom at which a single tile spans
//!    `1/N` of the box on each axis.
//! 2. [`TileGrid`] divides the box into equal [`TileWindow`]s that share edges
//!    exactly.
//! 3. [`TileGridRenderer`] requests every window by its center at the shared
//!    zoom and writes `map_<style>_<row>_<col>.png`.
//! 4. [`stitch_tiles`] composes the N² tiles into one raster, refusing grids
//!    with missing tiles.
//!
//! Row 0 of the grid is the southernmost strip; the stitcher places it at the
//! bottom of the image.
//!
//! ## Example
//!
//! ```no_run
//! use netmap_geo::{BoundingBox, RenderConfig, StaticMapProvider, TileGridRenderer};
//! use std::time::Duration;
//!
//! let bbox = BoundingBox::new(39.98, 40.02, -74.02, -73.98);
//! let provider = StaticMapProvider::new("api-key", Duration::from_secs(15))?;
//! let mut renderer = TileGridRenderer::new(provider, RenderConfig::new("output", 4))?;
//!
//! let report = renderer.render(bbox, &["satellite", "roadmap"])?;
//! println!("{} composites at zoom {}", report.stitched_count(), report.zoom);
//! # Ok::<(), netmap_geo::GeoError>(())
//! ```

mod bbox;
mod error;
mod grid;
mod provider;
mod render;
mod stitch;
mod zoom;

pub use bbox::{BoundingBox, DEFAULT_PADDING_FLOOR_DEG, DEFAULT_PADDING_FRACTION};
pub use error::GeoError;
pub use grid::{TileGrid, TileWindow};
pub use provider::{
    StaticMapProvider, TileProvider, TileRequest, DEFAULT_REQUEST_SIZE, DEFAULT_SCALE,
    DEFAULT_TIMEOUT, STATIC_MAP_BASE_URL,
};
pub use render::{
    stitched_file_name, tile_file_name, DownloadStats, GridFetch, RenderConfig, RenderReport,
    StyleOutcome, TileGridRenderer, TileSet, DEFAULT_IMAGE_EXTENSION,
};
pub use stitch::{stitch_tiles, stitch_to_file};
pub use zoom::{calculate_zoom_level, DEFAULT_TILE_PIXEL_SIZE, MAX_ZOOM, MIN_ZOOM, WORLD_TILE_PIXELS};

/// Result type for geo operations.
pub type Result<T> = std::result::Result<T, GeoError>;
