//! Tile grid fetching and per-style rendering.
//!
//! The renderer walks an N×N [`TileGrid`] once per map style, requesting each
//! tile by its center coordinate at the grid's shared zoom. Tiles are written
//! to the output directory as `map_<style>_<row>_<col>.<ext>`; a failed tile
//! is logged and skipped so the rest of the grid still downloads. Stitching
//! then refuses any style whose grid has gaps. Outputs from an earlier run
//! are removed before they are regenerated, so a failed tile or a refused
//! composite never leaves a stale file behind.

use crate::provider::{TileProvider, TileRequest, DEFAULT_REQUEST_SIZE, DEFAULT_SCALE};
use crate::stitch::stitch_to_file;
use crate::{BoundingBox, GeoError, Result, TileGrid};
use netmap_metrics::metric_defs;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default tile image extension.
pub const DEFAULT_IMAGE_EXTENSION: &str = "png";

/// File name of one tile, e.g. `map_satellite_0_3.png`.
pub fn tile_file_name(style: &str, row: u32, col: u32, extension: &str) -> String {
    format!("map_{}_{}_{}.{}", style, row, col, extension)
}

/// File name of a stitched composite, e.g. `map_satellite_stitched.png`.
pub fn stitched_file_name(style: &str, extension: &str) -> String {
    format!("map_{}_stitched.{}", style, extension)
}

/// Delete an output left by an earlier run. A missing file is not an error.
fn remove_stale(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "Removed previous output");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Renderer settings.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Tiles per row and per column.
    pub grid_size: u32,
    /// Square request size in CSS pixels.
    pub request_size: u32,
    /// Device-pixel scale factor.
    pub scale: u32,
    /// Directory receiving tile and composite images.
    pub output_dir: PathBuf,
    /// Image file extension.
    pub image_extension: String,
}

impl RenderConfig {
    /// Settings with the default request size, scale and extension.
    pub fn new(output_dir: impl Into<PathBuf>, grid_size: u32) -> Self {
        Self {
            grid_size,
            request_size: DEFAULT_REQUEST_SIZE,
            scale: DEFAULT_SCALE,
            output_dir: output_dir.into(),
            image_extension: DEFAULT_IMAGE_EXTENSION.to_string(),
        }
    }

    /// Edge length of one tile in device pixels.
    pub fn tile_pixel_size(&self) -> u32 {
        self.request_size * self.scale
    }
}

/// Tile files available for one style, keyed by `(row, col)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TileSet {
    style: String,
    grid_size: u32,
    tiles: BTreeMap<(u32, u32), PathBuf>,
}

impl TileSet {
    /// An empty set expecting `grid_size`² tiles.
    pub fn new(style: impl Into<String>, grid_size: u32) -> Self {
        Self {
            style: style.into(),
            grid_size,
            tiles: BTreeMap::new(),
        }
    }

    /// Collect whichever tile files for `style` already exist in `dir`.
    pub fn from_dir(dir: &Path, style: &str, grid_size: u32, extension: &str) -> Self {
        let mut set = Self::new(style, grid_size);
        for row in 0..grid_size {
            for col in 0..grid_size {
                let path = dir.join(tile_file_name(style, row, col, extension));
                if path.is_file() {
                    set.insert(row, col, path);
                }
            }
        }
        set
    }

    /// Record the file for a tile; coordinates outside the grid are ignored.
    pub fn insert(&mut self, row: u32, col: u32, path: PathBuf) {
        if row < self.grid_size && col < self.grid_size {
            self.tiles.insert((row, col), path);
        }
    }

    /// Map style of the set.
    pub fn style(&self) -> &str {
        &self.style
    }

    /// Tiles per row and per column.
    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    /// Path of the tile at `(row, col)`.
    pub fn get(&self, row: u32, col: u32) -> Option<&Path> {
        self.tiles.get(&(row, col)).map(PathBuf::as_path)
    }

    /// Number of tiles present.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether no tiles are present.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Number of tiles the grid requires.
    pub fn expected(&self) -> usize {
        (self.grid_size as usize) * (self.grid_size as usize)
    }

    /// `(row, col)` of every absent tile, in row-major order.
    pub fn missing(&self) -> Vec<(u32, u32)> {
        (0..self.grid_size)
            .flat_map(|row| (0..self.grid_size).map(move |col| (row, col)))
            .filter(|key| !self.tiles.contains_key(key))
            .collect()
    }

    /// Whether every tile of the grid is present.
    pub fn is_complete(&self) -> bool {
        self.grid_size > 0 && self.tiles.len() == self.expected()
    }
}

/// Result of fetching one style's grid.
#[derive(Debug)]
pub struct GridFetch {
    /// Tiles that were written to disk.
    pub tiles: TileSet,
    /// One [`GeoError::TileFetchFailed`] per tile that could not be fetched.
    pub failures: Vec<GeoError>,
}

/// Outcome of rendering one style.
#[derive(Debug)]
pub enum StyleOutcome {
    /// Composite written to this path.
    Stitched(PathBuf),
    /// Stitching was refused or failed; no composite was written.
    Failed(GeoError),
}

/// Per-style results of a render pass.
#[derive(Debug)]
pub struct RenderReport {
    /// Zoom level shared by every tile.
    pub zoom: u8,
    /// Grid dimension label such as `"4x4"`.
    pub grid_label: String,
    /// Outcome per style, in request order.
    pub styles: Vec<(String, StyleOutcome)>,
    /// Tiles that could not be fetched across all styles.
    pub tile_failures: usize,
}

impl RenderReport {
    /// Number of styles whose composite was written.
    pub fn stitched_count(&self) -> usize {
        self.styles
            .iter()
            .filter(|(_, outcome)| matches!(outcome, StyleOutcome::Stitched(_)))
            .count()
    }
}

/// Download statistics for the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadStats {
    /// Number of tiles downloaded.
    pub tiles_downloaded: usize,
    /// Total bytes downloaded.
    pub bytes_downloaded: u64,
}

/// Fetches tile grids through a [`TileProvider`] and stitches them per style.
pub struct TileGridRenderer<P> {
    provider: P,
    config: RenderConfig,
    stats: DownloadStats,
}

impl<P: TileProvider> TileGridRenderer<P> {
    /// Create a renderer, creating the output directory if needed.
    pub fn new(provider: P, config: RenderConfig) -> Result<Self> {
        if config.grid_size == 0 {
            return Err(GeoError::InvalidGridSize(config.grid_size));
        }
        fs::create_dir_all(&config.output_dir)?;
        Ok(Self {
            provider,
            config,
            stats: DownloadStats::default(),
        })
    }

    /// Renderer settings.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Download statistics since construction.
    pub fn download_stats(&self) -> DownloadStats {
        self.stats
    }

    /// Build the grid this renderer would use for `bbox`.
    pub fn grid_for(&self, bbox: BoundingBox) -> Result<TileGrid> {
        TileGrid::new(bbox, self.config.grid_size, self.config.tile_pixel_size())
    }

    /// Fetch every tile of `grid` for one style.
    ///
    /// Failures are logged and collected; they never stop the loop.
    pub fn fetch_grid(&mut self, grid: &TileGrid, style: &str) -> GridFetch {
        let mut tiles = TileSet::new(style, grid.grid_size());
        let mut failures = Vec::new();

        for window in grid.windows() {
            match self.fetch_window(grid.zoom(), window.row, window.col, window.center(), style) {
                Ok(path) => tiles.insert(window.row, window.col, path),
                Err(e) => {
                    warn!(style, row = window.row, col = window.col, "Tile fetch failed: {}", e);
                    metrics::counter!(metric_defs::TILES_FAILED.name, "style" => style.to_string())
                        .increment(1);
                    failures.push(GeoError::TileFetchFailed {
                        style: style.to_string(),
                        row: window.row,
                        col: window.col,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            style,
            fetched = tiles.len(),
            failed = failures.len(),
            "Fetched {} grid at zoom {}",
            grid.label(),
            grid.zoom()
        );

        GridFetch { tiles, failures }
    }

    fn fetch_window(
        &mut self,
        zoom: u8,
        row: u32,
        col: u32,
        (center_lat, center_lon): (f64, f64),
        style: &str,
    ) -> Result<PathBuf> {
        let request = TileRequest {
            center_lat,
            center_lon,
            zoom,
            size: self.config.request_size,
            scale: self.config.scale,
            style,
        };
        let path = self
            .config
            .output_dir
            .join(tile_file_name(style, row, col, &self.config.image_extension));
        remove_stale(&path)?;

        let bytes = self.provider.fetch_tile(&request)?;
        fs::write(&path, &bytes)?;

        self.stats.tiles_downloaded += 1;
        self.stats.bytes_downloaded += bytes.len() as u64;
        metrics::counter!(metric_defs::TILES_FETCHED.name, "style" => style.to_string()).increment(1);
        metrics::counter!(metric_defs::TILE_BYTES.name).increment(bytes.len() as u64);

        debug!(style, row, col, bytes = bytes.len(), "Saved tile {}", path.display());
        Ok(path)
    }

    /// Fetch and stitch one composite per style over `bbox`.
    ///
    /// Only an invalid box or grid fails the whole call; per-style problems
    /// are reported in [`RenderReport::styles`].
    pub fn render<S: AsRef<str>>(&mut self, bbox: BoundingBox, styles: &[S]) -> Result<RenderReport> {
        let grid = self.grid_for(bbox)?;
        info!(
            "Rendering {} style(s) on a {} grid at zoom {}",
            styles.len(),
            grid.label(),
            grid.zoom()
        );

        let mut outcomes = Vec::with_capacity(styles.len());
        let mut tile_failures = 0;

        for style in styles {
            let style = style.as_ref();
            let fetch = self.fetch_grid(&grid, style);
            tile_failures += fetch.failures.len();

            remove_stale(
                &self
                    .config
                    .output_dir
                    .join(stitched_file_name(style, &self.config.image_extension)),
            )?;
            let outcome = match stitch_to_file(
                &fetch.tiles,
                &self.config.output_dir,
                &self.config.image_extension,
            ) {
                Ok(path) => {
                    metrics::counter!(metric_defs::STITCH_COMPLETED.name, "style" => style.to_string())
                        .increment(1);
                    info!(style, "Stitched map written to {}", path.display());
                    StyleOutcome::Stitched(path)
                }
                Err(e) => {
                    metrics::counter!(metric_defs::STITCH_REFUSED.name, "style" => style.to_string())
                        .increment(1);
                    warn!(style, "Stitching refused: {}", e);
                    StyleOutcome::Failed(e)
                }
            };
            outcomes.push((style.to_string(), outcome));
        }

        Ok(RenderReport {
            zoom: grid.zoom(),
            grid_label: grid.label(),
            styles: outcomes,
            tile_failures,
        })
    }
}

impl<P> std::fmt::Debug for TileGridRenderer<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileGridRenderer")
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        assert_eq!(tile_file_name("satellite", 0, 3, "png"), "map_satellite_0_3.png");
        assert_eq!(stitched_file_name("roadmap", "png"), "map_roadmap_stitched.png");
    }

    #[test]
    fn test_render_config_pixel_size() {
        let config = RenderConfig::new("out", 4);
        assert_eq!(config.tile_pixel_size(), 1280);
        assert_eq!(config.image_extension, "png");
    }

    #[test]
    fn test_tile_set_missing() {
        let mut set = TileSet::new("satellite", 2);
        assert!(set.is_empty());
        assert_eq!(set.expected(), 4);

        set.insert(0, 0, PathBuf::from("a"));
        set.insert(1, 1, PathBuf::from("d"));
        set.insert(2, 0, PathBuf::from("ignored"));

        assert_eq!(set.len(), 2);
        assert!(!set.is_complete());
        assert_eq!(set.missing(), vec![(0, 1), (1, 0)]);

        set.insert(0, 1, PathBuf::from("b"));
        set.insert(1, 0, PathBuf::from("c"));
        assert!(set.is_complete());
        assert!(set.missing().is_empty());
        assert_eq!(set.get(1, 0), Some(Path::new("c")));
    }

    #[test]
    fn test_remove_stale() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("map_roadmap_stitched.png");
        remove_stale(&path).unwrap();

        fs::write(&path, b"old").unwrap();
        remove_stale(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_empty_grid_is_never_complete() {
        assert!(!TileSet::new("satellite", 0).is_complete());
    }
}
