//! Static-map tile providers.
//!
//! A provider turns a center coordinate, zoom level, pixel size and map style
//! into raster bytes. [`StaticMapProvider`] talks to the Google Static Maps
//! HTTP API; tests substitute in-memory implementations of [`TileProvider`].

use crate::{GeoError, Result};
use std::time::Duration;

/// Default Static Maps endpoint.
pub const STATIC_MAP_BASE_URL: &str = "https://maps.googleapis.com/maps/api/staticmap";

/// Edge length in CSS pixels of a single static-map request.
pub const DEFAULT_REQUEST_SIZE: u32 = 640;

/// Device-pixel scale factor; `DEFAULT_REQUEST_SIZE * DEFAULT_SCALE` pixels per tile edge.
pub const DEFAULT_SCALE: u32 = 2;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Parameters of one tile request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileRequest<'a> {
    /// Latitude of the tile center.
    pub center_lat: f64,
    /// Longitude of the tile center.
    pub center_lon: f64,
    /// Zoom level shared by the whole grid.
    pub zoom: u8,
    /// Square request size in CSS pixels.
    pub size: u32,
    /// Device-pixel scale factor.
    pub scale: u32,
    /// Provider-defined map style, e.g. `satellite` or `roadmap`.
    pub style: &'a str,
}

/// Capability to fetch a raster image for a tile request.
pub trait TileProvider {
    /// Fetch the encoded image bytes for `request`.
    fn fetch_tile(&self, request: &TileRequest<'_>) -> Result<Vec<u8>>;
}

impl<T: TileProvider + ?Sized> TileProvider for &T {
    fn fetch_tile(&self, request: &TileRequest<'_>) -> Result<Vec<u8>> {
        (**self).fetch_tile(request)
    }
}

/// HTTP static-map provider.
pub struct StaticMapProvider {
    base_url: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl std::fmt::Debug for StaticMapProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticMapProvider")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl StaticMapProvider {
    /// Create a provider for the default endpoint.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Self::with_base_url(STATIC_MAP_BASE_URL, api_key, timeout)
    }

    /// Create a provider targeting a custom endpoint.
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Build the request URL for a tile.
    pub fn request_url(&self, request: &TileRequest<'_>) -> Result<reqwest::Url> {
        let center = format!("{:.7},{:.7}", request.center_lat, request.center_lon);
        let size = format!("{}x{}", request.size, request.size);
        let params = [
            ("center", center),
            ("zoom", request.zoom.to_string()),
            ("size", size),
            ("scale", request.scale.to_string()),
            ("maptype", request.style.to_string()),
            ("key", self.api_key.clone()),
        ];
        reqwest::Url::parse_with_params(&self.base_url, &params)
            .map_err(|e| GeoError::InvalidUrl(e.to_string()))
    }
}

impl TileProvider for StaticMapProvider {
    fn fetch_tile(&self, request: &TileRequest<'_>) -> Result<Vec<u8>> {
        let url = self.request_url(request)?;
        let response = self.client.get(url).send()?;

        if !response.status().is_success() {
            return Err(GeoError::HttpStatus(response.status().as_u16()));
        }

        Ok(response.bytes()?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(style: &str) -> TileRequest<'_> {
        TileRequest {
            center_lat: 40.0,
            center_lon: -74.0,
            zoom: 17,
            size: DEFAULT_REQUEST_SIZE,
            scale: DEFAULT_SCALE,
            style,
        }
    }

    #[test]
    fn test_request_url() {
        let provider = StaticMapProvider::new("secret", DEFAULT_TIMEOUT).unwrap();
        let url = provider.request_url(&request("satellite")).unwrap();

        assert_eq!(url.host_str(), Some("maps.googleapis.com"));
        assert_eq!(url.path(), "/maps/api/staticmap");

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("center"), Some("40.0000000,-74.0000000"));
        assert_eq!(get("zoom"), Some("17"));
        assert_eq!(get("size"), Some("640x640"));
        assert_eq!(get("scale"), Some("2"));
        assert_eq!(get("maptype"), Some("satellite"));
        assert_eq!(get("key"), Some("secret"));
    }

    #[test]
    fn test_custom_base_url() {
        let provider =
            StaticMapProvider::with_base_url("http://localhost:8080/static", "k", DEFAULT_TIMEOUT)
                .unwrap();
        let url = provider.request_url(&request("roadmap")).unwrap();
        assert_eq!(url.host_str(), Some("localhost"));
        assert_eq!(url.port(), Some(8080));
    }

    #[test]
    fn test_invalid_base_url() {
        let provider = StaticMapProvider::with_base_url("not a url", "k", DEFAULT_TIMEOUT).unwrap();
        assert!(matches!(
            provider.request_url(&request("roadmap")),
            Err(GeoError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_debug_hides_key() {
        let provider = StaticMapProvider::new("secret", DEFAULT_TIMEOUT).unwrap();
        assert!(!format!("{:?}", provider).contains("secret"));
    }
}
