//! Compositing a complete tile grid into one raster.

use crate::render::{stitched_file_name, TileSet};
use crate::{GeoError, Result};
use image::{GenericImage, RgbaImage};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Compose every tile of `tiles` into one canvas.
///
/// Tile `(row, col)` lands at `x = col * width`, `y = (N - 1 - row) * height`,
/// so row 0 (south) ends up at the bottom. All tiles must be present and
/// share the dimensions of the first tile loaded.
pub fn stitch_tiles(tiles: &TileSet) -> Result<RgbaImage> {
    let n = tiles.grid_size();
    if !tiles.is_complete() {
        return Err(GeoError::IncompleteGrid {
            style: tiles.style().to_string(),
            expected: tiles.expected(),
            missing: tiles.missing(),
        });
    }

    let mut canvas: Option<RgbaImage> = None;
    let (mut width, mut height) = (0, 0);

    for row in 0..n {
        for col in 0..n {
            let path = tiles.get(row, col).ok_or_else(|| GeoError::IncompleteGrid {
                style: tiles.style().to_string(),
                expected: tiles.expected(),
                missing: vec![(row, col)],
            })?;
            let tile = image::open(path)?.into_rgba8();

            if canvas.is_none() {
                (width, height) = tile.dimensions();
                debug!(
                    style = tiles.style(),
                    "Allocating {}x{} canvas",
                    width * n,
                    height * n
                );
                canvas = Some(RgbaImage::new(width * n, height * n));
            } else if tile.dimensions() != (width, height) {
                return Err(GeoError::TileSizeMismatch {
                    row,
                    col,
                    width,
                    height,
                    actual_width: tile.width(),
                    actual_height: tile.height(),
                });
            }

            if let Some(canvas) = canvas.as_mut() {
                canvas.copy_from(&tile, col * width, (n - 1 - row) * height)?;
            }
        }
    }

    canvas.ok_or(GeoError::InvalidGridSize(n))
}

/// Stitch `tiles` and save the composite as `map_<style>_stitched.<ext>` in `output_dir`.
///
/// Nothing is written when stitching is refused.
pub fn stitch_to_file(tiles: &TileSet, output_dir: &Path, extension: &str) -> Result<PathBuf> {
    let canvas = stitch_tiles(tiles)?;
    let path = output_dir.join(stitched_file_name(tiles.style(), extension));
    canvas.save(&path)?;
    Ok(path)
}
