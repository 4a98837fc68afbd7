use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;

use bus_for_you_core::prelude::*;

mod output;

use output::write_page_geojson;

#[derive(Parser, Debug)]
#[command(
    name = "route-probe",
    author,
    version,
    about = "Replay a bus finder page visit from the command line",
    long_about = "Loads the bus details from a page URL, places the device at --lat/--lng, \
                  renders the map with its synthetic bus stops and, when --stop is given, \
                  fetches the driving route to that stop.\n\n\
                  Without a position the run behaves like a browser that refused \
                  geolocation: the status text is shown and nothing else."
)]
struct Args {
    /// Page URL, optionally carrying a `busInfo` query parameter
    #[arg(short, long, default_value = "http://localhost:3000/Pages2")]
    page_url: String,

    /// Device latitude
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Device longitude
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lng: Option<f64>,

    /// Route to bus stop N (1, 2 or 3)
    #[arg(short, long)]
    stop: Option<usize>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directions service root
    #[arg(long, env = "BUS_FOR_YOU_DIRECTIONS_URL")]
    directions_url: Option<String>,

    /// Directions profile
    #[arg(long, env = "BUS_FOR_YOU_DIRECTIONS_PROFILE")]
    profile: Option<String>,

    /// Directions API key
    #[arg(long, env = "ORS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Write the markers and the route as a GeoJSON FeatureCollection
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbose output (show debug messages)
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                Config::from_json(&json).context("Failed to parse configuration")?
            }
            None => Config::default(),
        };

        if let Some(base_url) = &self.directions_url {
            config.directions.base_url = base_url.clone();
        }
        if let Some(profile) = &self.profile {
            config.directions.profile = profile.clone();
        }
        if let Some(api_key) = &self.api_key {
            config.directions.api_key = Some(api_key.clone());
        }

        Ok(config)
    }

    fn geolocator(&self) -> FixedGeolocator {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => FixedGeolocator::at(LatLng::new(lat, lng)),
            _ => FixedGeolocator::failing(GeolocationError::new(
                GeolocationErrorCode::PositionUnavailable,
                "no --lat/--lng given",
            )),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "info" }),
    )
    .format_timestamp(None)
    .init();

    let config = args.load_config()?;
    log::debug!("Directions: {:?}", config.directions);

    let directions = OpenRouteService::new(config.directions.clone());
    let mut page = PageState::new(SceneSurface::new(), &config);

    log::info!("=== Bus finder ===");
    log::info!("Page: {}", args.page_url);
    page.activate(&args.page_url, &args.geolocator()).await;
    log::info!("Status: {}", page.status_text());

    let Some(map) = page.map() else {
        log::warn!("No position, the map is not shown");
        return Ok(());
    };

    let tile = map.center_tile();
    log::info!("");
    log::info!("Map centred on {} at zoom {}", map.center(), map.zoom());
    log::info!(
        "  Centre tile: {}",
        tile.url(&config.map.tile_url, &config.map.subdomains)
    );
    for marker in map.markers() {
        log::info!("  {} {} at {}", marker.id, marker.popup, marker.location);
    }

    let mut route_error = None;
    if let Some(n) = args.stop {
        log::info!("");
        log::info!("Fetching route to bus stop {n}...");
        let marker = MarkerIdentifier::new(format!("bus-stop-{n}"));

        match page.click_marker(&marker, &directions).await {
            Ok(overlay) => log::info!(
                "  {} points, {:.0} m",
                overlay.path.len(),
                overlay.length_meters()
            ),
            Err(error) => route_error = Some(error),
        }
    }

    if let Some(path) = &args.output {
        write_page_geojson(&page, path).context("Failed to write page GeoJSON")?;
        log::info!("Wrote {}", path.display());
    }

    if let Some(error) = route_error {
        bail!("No route drawn: {error}");
    }

    Ok(())
}
