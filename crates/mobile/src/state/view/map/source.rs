use bus_for_you_core::{config::MapConfig, map::tile::tile_templates};

/// Where the base map's raster tiles come from.
pub struct MapSource {
    pub(crate) tiles: Vec<String>,
}

impl MapSource {
    pub(crate) fn from_config(config: &MapConfig) -> Self {
        MapSource {
            tiles: tile_templates(&config.tile_url, &config.subdomains),
        }
    }
}
