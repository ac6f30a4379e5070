//! Shared zoom-level selection for a tile grid.
//!
//! Uses the standard web-map convention: at zoom `z` the full 360° of longitude
//! maps to `256 * 2^z` pixels. The grid fetches every tile at one zoom level so
//! that neighbouring tiles line up edge to edge.
//!
//! The latitude correction uses the center latitude of the whole box for every
//! tile row. That approximation only holds for small (neighbourhood-scale)
//! boxes.

use crate::BoundingBox;

/// Lowest zoom level supported by the tile provider (whole world).
pub const MIN_ZOOM: u8 = 0;

/// Highest zoom level supported by the tile provider.
pub const MAX_ZOOM: u8 = 21;

/// Width in pixels of the world at zoom 0.
pub const WORLD_TILE_PIXELS: f64 = 256.0;

/// Edge length of a requested tile in device pixels (640 px at 2x scale).
pub const DEFAULT_TILE_PIXEL_SIZE: u32 = 1280;

/// Pick the zoom at which one of `grid_size`² tiles covers `1/grid_size` of the box.
///
/// The smaller of the longitude- and latitude-derived candidates is used and
/// then floored, so a tile never covers less than its share of the box.
/// The result is clamped to [`MIN_ZOOM`]..=[`MAX_ZOOM`].
pub fn calculate_zoom_level(bbox: &BoundingBox, grid_size: u32, tile_pixel_size: u32) -> u8 {
    let n = grid_size.max(1) as f64;
    let pixels = tile_pixel_size.max(1) as f64;

    let lon_deg_per_px = bbox.lon_span() / n / pixels;
    let lat_deg_per_px = bbox.lat_span() / n / pixels;

    let (center_lat, _) = bbox.center();
    let cos_lat = center_lat.to_radians().cos();

    let zoom_lon = (360.0 / (WORLD_TILE_PIXELS * lon_deg_per_px)).log2();
    let zoom_lat = (360.0 / (WORLD_TILE_PIXELS * lat_deg_per_px * cos_lat)).log2();

    let zoom = zoom_lon.min(zoom_lat).floor();
    if zoom.is_nan() {
        return MIN_ZOOM;
    }
    zoom.clamp(MIN_ZOOM as f64, MAX_ZOOM as f64) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nyc_box() -> BoundingBox {
        BoundingBox::new(39.98, 40.02, -74.02, -73.98)
    }

    #[test]
    fn test_neighbourhood_zoom() {
        // 0.04° box, 4x4 grid: 0.01° per 1280 px tile -> log2(180000) ≈ 17.46
        assert_eq!(calculate_zoom_level(&nyc_box(), 4, DEFAULT_TILE_PIXEL_SIZE), 17);
    }

    #[test]
    fn test_whole_world_is_low_zoom() {
        let world = BoundingBox::new(-85.0, 85.0, -180.0, 180.0);
        assert_eq!(calculate_zoom_level(&world, 1, DEFAULT_TILE_PIXEL_SIZE), 2);
    }

    #[test]
    fn test_zoom_in_range() {
        let boxes = [
            BoundingBox::new(-85.0, 85.0, -180.0, 180.0),
            nyc_box(),
            BoundingBox::new(51.5, 51.500001, -0.1, -0.099999),
            BoundingBox::new(-33.9, -33.8, 151.1, 151.3),
        ];
        for bbox in boxes {
            for n in [1, 2, 4, 8, 16] {
                let z = calculate_zoom_level(&bbox, n, DEFAULT_TILE_PIXEL_SIZE);
                assert!(z <= MAX_ZOOM, "zoom {} out of range for {:?}", z, bbox);
            }
        }
    }

    #[test]
    fn test_tiny_box_clamps_to_max() {
        let bbox = BoundingBox::new(51.5, 51.5000001, -0.1, -0.0999999);
        assert_eq!(calculate_zoom_level(&bbox, 4, DEFAULT_TILE_PIXEL_SIZE), MAX_ZOOM);
    }

    #[test]
    fn test_monotonic_in_grid_size() {
        let bbox = nyc_box();
        let mut previous = calculate_zoom_level(&bbox, 1, DEFAULT_TILE_PIXEL_SIZE);
        for n in [2, 4, 8, 16, 32] {
            let z = calculate_zoom_level(&bbox, n, DEFAULT_TILE_PIXEL_SIZE);
            assert!(z >= previous, "zoom decreased from {} to {} at n={}", previous, z, n);
            previous = z;
        }
    }

    #[test]
    fn test_doubling_grid_adds_one_level() {
        let bbox = nyc_box();
        let z4 = calculate_zoom_level(&bbox, 4, DEFAULT_TILE_PIXEL_SIZE);
        let z8 = calculate_zoom_level(&bbox, 8, DEFAULT_TILE_PIXEL_SIZE);
        assert_eq!(z8, z4 + 1);
    }

    #[test]
    fn test_zero_grid_size_treated_as_one() {
        let bbox = nyc_box();
        assert_eq!(
            calculate_zoom_level(&bbox, 0, DEFAULT_TILE_PIXEL_SIZE),
            calculate_zoom_level(&bbox, 1, DEFAULT_TILE_PIXEL_SIZE)
        );
    }
}
