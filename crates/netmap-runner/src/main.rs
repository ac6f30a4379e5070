//! `netmap`: collect controller inventories into a network map document.

use clap::Parser;
use netmap_runner::{run, CollectorConfig, Overrides};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "netmap",
    version,
    about = "Collect UniFi/UISP inventories, geocode devices and render a basemap"
)]
struct Cli {
    /// YAML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory receiving the document, listing and map images.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Tiles per row and column of the basemap grid.
    #[arg(long)]
    grid_size: Option<u32>,

    /// Render basemap images (requires an API key).
    #[arg(long, overrides_with = "no_render_maps")]
    render_maps: bool,

    /// Skip basemap rendering.
    #[arg(long, overrides_with = "render_maps")]
    no_render_maps: bool,

    /// Static-map API key (also read from NETMAP_MAP_API_KEY).
    #[arg(long)]
    map_api_key: Option<String>,

    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        let render_maps = match (self.render_maps, self.no_render_maps) {
            (true, _) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        };
        Overrides {
            output_dir: self.output_dir.clone(),
            grid_size: self.grid_size,
            render_maps,
            map_api_key: self.map_api_key.clone(),
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    netmap_metrics::describe_metrics();

    let mut config = match &cli.config {
        Some(path) => match CollectorConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to load configuration");
                return ExitCode::FAILURE;
            }
        },
        None => CollectorConfig::default(),
    };
    config.apply_env();
    cli.overrides().apply(&mut config);

    match run(&config) {
        Ok(report) => {
            report.log();
            if report.refused_styles().is_empty() {
                ExitCode::SUCCESS
            } else {
                warn!("Some map styles could not be stitched");
                ExitCode::from(2)
            }
        }
        Err(e) => {
            error!(error = %e, "Collection failed");
            ExitCode::FAILURE
        }
    }
}
