//! Collector configuration.
//!
//! Loaded from YAML; every section has defaults so an empty file is valid.
//! Command-line overrides and the map API key environment variable are
//! applied on top by the binary.

use crate::{Result, RunnerError};
use netmap_collect::{ReconcilerConfig, UispConfig, UnifiConfig};
use netmap_geo::DEFAULT_IMAGE_EXTENSION;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable consulted for the map API key.
pub const API_KEY_ENV: &str = "NETMAP_MAP_API_KEY";

/// Default tiles per row and column.
pub const DEFAULT_GRID_SIZE: u32 = 4;

/// Default per-request timeout for map tiles, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Map rendering settings.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Render basemap images when an API key is available.
    pub render_maps: bool,
    /// Tiles per row and column.
    pub grid_size: u32,
    /// Map styles to render.
    pub styles: Vec<String>,
    /// Static-map API key.
    pub api_key: Option<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Image file format of tiles and composites.
    pub image_format: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            render_maps: true,
            grid_size: DEFAULT_GRID_SIZE,
            styles: vec!["satellite".to_string(), "roadmap".to_string()],
            api_key: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            image_format: DEFAULT_IMAGE_EXTENSION.to_string(),
        }
    }
}

impl std::fmt::Debug for MapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapConfig")
            .field("render_maps", &self.render_maps)
            .field("grid_size", &self.grid_size)
            .field("styles", &self.styles)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("image_format", &self.image_format)
            .finish()
    }
}

impl MapConfig {
    /// The API key, if set and non-empty.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Directory receiving the document, listing and map images.
    pub output_dir: PathBuf,
    /// UniFi controller, if any.
    pub unifi: Option<UnifiConfig>,
    /// UISP instance, if any.
    pub uisp: Option<UispConfig>,
    /// Map rendering.
    pub map: MapConfig,
    /// Coordinate reconciliation.
    pub reconcile: ReconcilerConfig,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            unifi: None,
            uisp: None,
            map: MapConfig::default(),
            reconcile: ReconcilerConfig::default(),
        }
    }
}

impl CollectorConfig {
    /// Parse a YAML document; blank input yields the defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Fill the API key from `value` when the file did not set one.
    pub fn apply_env_api_key(&mut self, value: Option<String>) {
        if self.map.api_key().is_none() {
            if let Some(key) = value.filter(|k| !k.trim().is_empty()) {
                self.map.api_key = Some(key);
            }
        }
    }

    /// Fill the API key from [`API_KEY_ENV`].
    pub fn apply_env(&mut self) {
        self.apply_env_api_key(std::env::var(API_KEY_ENV).ok());
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.map.grid_size == 0 {
            return Err(RunnerError::Config("map.grid_size must be at least 1".into()));
        }
        if self.map.image_format != DEFAULT_IMAGE_EXTENSION {
            return Err(RunnerError::Config(format!(
                "map.image_format '{}' is not supported (use '{}')",
                self.map.image_format, DEFAULT_IMAGE_EXTENSION
            )));
        }
        if self.map.request_timeout_secs == 0 {
            return Err(RunnerError::Config(
                "map.request_timeout_secs must be positive".into(),
            ));
        }
        // NaN fails both comparisons, so finiteness is checked first.
        let positive = |x: f64| x.is_finite() && x > 0.0;
        let non_negative = |x: f64| x.is_finite() && x >= 0.0;
        let r = &self.reconcile;
        if !positive(r.median_tolerance_deg)
            || !non_negative(r.padding_fraction)
            || !positive(r.padding_floor_deg)
            || !non_negative(r.min_abs_latitude)
        {
            return Err(RunnerError::Config(
                "reconcile tolerances and padding must be finite and positive".into(),
            ));
        }
        Ok(())
    }
}

/// Values supplied on the command line, each overriding the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    /// `--output-dir`.
    pub output_dir: Option<PathBuf>,
    /// `--grid-size`.
    pub grid_size: Option<u32>,
    /// `--render-maps` / `--no-render-maps`.
    pub render_maps: Option<bool>,
    /// `--map-api-key`.
    pub map_api_key: Option<String>,
}

impl Overrides {
    /// Apply to `config`.
    pub fn apply(self, config: &mut CollectorConfig) {
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(grid_size) = self.grid_size {
            config.map.grid_size = grid_size;
        }
        if let Some(render) = self.render_maps {
            config.map.render_maps = render;
        }
        if let Some(key) = self.map_api_key {
            config.map.api_key = Some(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_defaults() {
        let config = CollectorConfig::from_yaml_str("").unwrap();
        assert_eq!(config, CollectorConfig::default());
        assert_eq!(config.map.grid_size, 4);
        assert_eq!(config.map.styles, vec!["satellite", "roadmap"]);
        assert_eq!(config.map.request_timeout_secs, 15);
        assert!(config.map.render_maps);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_sections() {
        let yaml = r#"
output_dir: /tmp/netmap
uisp:
  url: https://uisp.example.net
  api_token: abc
map:
  grid_size: 3
  styles: [terrain]
reconcile:
  median_tolerance_deg: 0.05
"#;
        let config = CollectorConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/tmp/netmap"));
        assert!(config.unifi.is_none());
        let uisp = config.uisp.as_ref().unwrap();
        assert!(uisp.verify_tls);
        assert_eq!(config.map.grid_size, 3);
        assert_eq!(config.map.styles, vec!["terrain"]);
        assert_eq!(config.map.image_format, "png");
        assert_eq!(config.reconcile.median_tolerance_deg, 0.05);
        assert_eq!(config.reconcile.min_abs_latitude, 0.1);
    }

    #[test]
    fn test_unknown_yaml_is_error() {
        assert!(matches!(
            CollectorConfig::from_yaml_str("map: [1, 2"),
            Err(RunnerError::Yaml(_))
        ));
    }

    #[test]
    fn test_env_key_does_not_replace_file_key() {
        let mut config = CollectorConfig::default();
        config.apply_env_api_key(Some("from-env".into()));
        assert_eq!(config.map.api_key(), Some("from-env"));

        config.map.api_key = Some("from-file".into());
        config.apply_env_api_key(Some("other".into()));
        assert_eq!(config.map.api_key(), Some("from-file"));

        let mut config = CollectorConfig::default();
        config.apply_env_api_key(Some("  ".into()));
        assert_eq!(config.map.api_key(), None);
    }

    #[test]
    fn test_overrides_win() {
        let mut config = CollectorConfig::default();
        config.map.api_key = Some("file".into());
        Overrides {
            output_dir: Some(PathBuf::from("out")),
            grid_size: Some(2),
            render_maps: Some(false),
            map_api_key: Some("cli".into()),
        }
        .apply(&mut config);

        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.map.grid_size, 2);
        assert!(!config.map.render_maps);
        assert_eq!(config.map.api_key(), Some("cli"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = CollectorConfig::default();
        config.map.grid_size = 0;
        assert!(matches!(config.validate(), Err(RunnerError::Config(_))));

        let mut config = CollectorConfig::default();
        config.map.image_format = "jpg".into();
        assert!(matches!(config.validate(), Err(RunnerError::Config(_))));

        let mut config = CollectorConfig::default();
        config.reconcile.median_tolerance_deg = 0.0;
        assert!(matches!(config.validate(), Err(RunnerError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_nan_reconcile_values() {
        let setters: [fn(&mut ReconcilerConfig); 4] = [
            |r| r.median_tolerance_deg = f64::NAN,
            |r| r.padding_fraction = f64::NAN,
            |r| r.padding_floor_deg = f64::NAN,
            |r| r.min_abs_latitude = f64::NAN,
        ];
        for set in setters {
            let mut config = CollectorConfig::default();
            set(&mut config.reconcile);
            assert!(matches!(config.validate(), Err(RunnerError::Config(_))));
        }

        let yaml = "reconcile:\n  padding_floor_deg: .nan\n";
        let config = CollectorConfig::from_yaml_str(yaml).unwrap();
        assert!(config.reconcile.padding_floor_deg.is_nan());
        assert!(matches!(config.validate(), Err(RunnerError::Config(_))));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let mut config = CollectorConfig::default();
        config.map.api_key = Some("secret-key".into());
        assert!(!format!("{:?}", config).contains("secret-key"));
    }
}
