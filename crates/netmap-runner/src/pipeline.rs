//! One collection run.
//!
//! Sources are fetched first ([`collect_sources`]); [`process`] then
//! reconciles, resolves links, optionally renders the basemap and writes the
//! outputs. Splitting the two lets tests drive `process` with canned records
//! and an in-memory tile provider.

use crate::config::CollectorConfig;
use crate::Result;
use netmap_collect::{
    unifi_links, write_tsv_file, CombinedDocument, MapMetadata, ReconcileStats, Reconciler,
    SiteCoordinates, SourceOutcome, UispClient, UispDataLink, UispDevice, UispLinkResolver,
    UispSite, UnifiClient, UnifiDevice,
};
use netmap_geo::{
    RenderConfig, RenderReport, StaticMapProvider, StyleOutcome, TileGridRenderer, TileProvider,
};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Raw records from every configured controller.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceData {
    /// UniFi devices.
    pub unifi_devices: SourceOutcome<Vec<UnifiDevice>>,
    /// UISP devices.
    pub uisp_devices: SourceOutcome<Vec<UispDevice>>,
    /// UISP sites.
    pub uisp_sites: SourceOutcome<Vec<UispSite>>,
    /// UISP data-links.
    pub uisp_links: SourceOutcome<Vec<UispDataLink>>,
}

impl Default for SourceData {
    fn default() -> Self {
        Self {
            unifi_devices: SourceOutcome::Empty,
            uisp_devices: SourceOutcome::Empty,
            uisp_sites: SourceOutcome::Empty,
            uisp_links: SourceOutcome::Empty,
        }
    }
}

impl SourceData {
    /// Names of sources whose fetch failed.
    pub fn failed_sources(&self) -> Vec<&'static str> {
        [
            ("unifi", self.unifi_devices.is_failed()),
            ("uisp.devices", self.uisp_devices.is_failed()),
            ("uisp.sites", self.uisp_sites.is_failed()),
            ("uisp.data_links", self.uisp_links.is_failed()),
        ]
        .into_iter()
        .filter_map(|(name, failed)| failed.then_some(name))
        .collect()
    }
}

/// Fetch from every configured controller. Never fails: unreachable
/// controllers are recorded as [`SourceOutcome::Failed`].
pub fn collect_sources(config: &CollectorConfig) -> SourceData {
    let mut data = SourceData::default();

    match &config.unifi {
        Some(unifi) => {
            data.unifi_devices = match UnifiClient::new(unifi.clone()) {
                Ok(mut client) => client.collect_devices(),
                Err(e) => SourceOutcome::Failed(e.to_string()),
            }
            .observe("unifi");
        }
        None => debug!("UniFi controller not configured"),
    }

    match &config.uisp {
        Some(uisp) => match UispClient::new(uisp.clone()) {
            Ok(client) => {
                data.uisp_devices = client.devices().observe("uisp.devices");
                data.uisp_sites = client.sites().observe("uisp.sites");
                data.uisp_links = client.data_links().observe("uisp.data_links");
            }
            Err(e) => {
                data.uisp_devices = SourceOutcome::Failed(e.to_string()).observe("uisp.devices");
            }
        },
        None => debug!("UISP not configured"),
    }

    data
}

/// Build the HTTP tile provider, or `None` when rendering is off or no key is set.
pub fn map_provider(config: &CollectorConfig) -> Result<Option<StaticMapProvider>> {
    if !config.map.render_maps {
        info!("Map rendering disabled by configuration");
        return Ok(None);
    }
    match config.map.api_key() {
        Some(key) => Ok(Some(StaticMapProvider::new(
            key,
            config.map.request_timeout(),
        )?)),
        None => {
            info!("No map API key configured; map rendering disabled");
            Ok(None)
        }
    }
}

/// Summary of a run.
#[derive(Debug)]
pub struct RunReport {
    /// UniFi devices written.
    pub unifi_devices: usize,
    /// UISP devices geocoded and written.
    pub uisp_devices: usize,
    /// Links written.
    pub links: usize,
    /// Reconciliation counts.
    pub reconcile: ReconcileStats,
    /// Sources that could not be fetched.
    pub failed_sources: Vec<&'static str>,
    /// Map rendering results, when maps were rendered.
    pub render: Option<RenderReport>,
    /// Combined document path.
    pub document_path: PathBuf,
    /// Device listing path.
    pub tsv_path: PathBuf,
}

impl RunReport {
    /// Styles whose composite was refused or failed, with the reason.
    pub fn refused_styles(&self) -> Vec<(&str, String)> {
        self.render
            .iter()
            .flat_map(|r| r.styles.iter())
            .filter_map(|(style, outcome)| match outcome {
                StyleOutcome::Failed(e) => Some((style.as_str(), e.to_string())),
                StyleOutcome::Stitched(_) => None,
            })
            .collect()
    }

    /// Composite images written.
    pub fn stitched(&self) -> Vec<&PathBuf> {
        self.render
            .iter()
            .flat_map(|r| r.styles.iter())
            .filter_map(|(_, outcome)| match outcome {
                StyleOutcome::Stitched(path) => Some(path),
                StyleOutcome::Failed(_) => None,
            })
            .collect()
    }

    /// Log the summary.
    pub fn log(&self) {
        info!(
            unifi = self.unifi_devices,
            uisp = self.uisp_devices,
            links = self.links,
            unresolved = self.reconcile.unresolved,
            degenerate = self.reconcile.degenerate,
            outliers = self.reconcile.outliers,
            document = %self.document_path.display(),
            "Collection finished"
        );
        for source in &self.failed_sources {
            warn!(source, "Source was unavailable for this run");
        }
        if let Some(render) = &self.render {
            info!(
                zoom = render.zoom,
                grid = %render.grid_label,
                stitched = render.stitched_count(),
                tile_failures = render.tile_failures,
                "Map rendering finished"
            );
        }
        for (style, reason) in self.refused_styles() {
            warn!(style, %reason, "No composite for style");
        }
    }
}

/// Reconcile, render and write outputs for already-fetched records.
pub fn process<P: TileProvider>(
    config: &CollectorConfig,
    sources: SourceData,
    provider: Option<P>,
) -> Result<RunReport> {
    std::fs::create_dir_all(&config.output_dir)?;
    let failed_sources = sources.failed_sources();

    let unifi_devices = sources.unifi_devices.into_inner_or_default();
    let uisp_devices = sources.uisp_devices.into_inner_or_default();
    let uisp_sites = sources.uisp_sites.into_inner_or_default();
    let uisp_links = sources.uisp_links.into_inner_or_default();

    let site_lookup = SiteCoordinates::from_sites(&uisp_sites);
    let reconciliation = Reconciler::new(config.reconcile).reconcile(&uisp_devices, &site_lookup);

    let mut links = unifi_links(&unifi_devices);
    links.extend(UispLinkResolver::new(&uisp_devices).resolve_all(&uisp_links));

    let mut map_metadata = reconciliation
        .bbox
        .map(|bbox| MapMetadata::new(bbox, config.map.grid_size, &config.map.styles));

    let render = match (provider, reconciliation.bbox) {
        (Some(provider), Some(bbox)) => {
            let mut render_config = RenderConfig::new(&config.output_dir, config.map.grid_size);
            render_config.image_extension = config.map.image_format.clone();
            let mut renderer = TileGridRenderer::new(provider, render_config)?;
            let report = renderer.render(bbox, config.map.styles.as_slice())?;
            map_metadata = map_metadata.map(|m| m.with_zoom(report.zoom));
            Some(report)
        }
        (Some(_), None) => {
            info!("No geocoded devices; skipping map rendering");
            None
        }
        (None, _) => None,
    };

    let document = CombinedDocument {
        unifi: unifi_devices.iter().map(UnifiDevice::to_summary).collect(),
        uisp: reconciliation.devices,
        links,
        map_metadata,
    };
    let document_path = document.write_to_dir(&config.output_dir)?;
    let tsv_path = write_tsv_file(&config.output_dir, &document.uisp, &document.unifi)?;

    Ok(RunReport {
        unifi_devices: document.unifi.len(),
        uisp_devices: document.uisp.len(),
        links: document.links.len(),
        reconcile: reconciliation.stats,
        failed_sources,
        render,
        document_path,
        tsv_path,
    })
}

/// Fetch, process and write everything for one run.
pub fn run(config: &CollectorConfig) -> Result<RunReport> {
    config.validate()?;
    let sources = collect_sources(config);
    let provider = map_provider(config)?;
    process(config, sources, provider)
}
