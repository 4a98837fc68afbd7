use std::f64::consts::PI;

use crate::coordinates::LatLng;

/// A Web Mercator tile, with its extent in normalized map space.
///
/// x grows east and y grows south, both in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    pub zoom: u8,
    pub tile_x: u32,
    pub tile_y: u32,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Tile {
    pub const WORLD: Tile = Tile {
        zoom: 0,
        tile_x: 0,
        tile_y: 0,
        x0: 0.0,
        y0: 0.0,
        x1: 1.0,
        y1: 1.0,
    };

    pub fn children(&self) -> [Tile; 4] {
        let new_tile_x = self.tile_x * 2;
        let new_tile_y = self.tile_y * 2;
        let mx = (self.x0 + self.x1) / 2.0;
        let my = (self.y0 + self.y1) / 2.0;

        [
            // Top-left
            Tile {
                zoom: self.zoom + 1,
                tile_x: new_tile_x,
                tile_y: new_tile_y,
                x0: self.x0,
                y0: self.y0,
                x1: mx,
                y1: my,
            },
            // Top-right
            Tile {
                zoom: self.zoom + 1,
                tile_x: new_tile_x + 1,
                tile_y: new_tile_y,
                x0: mx,
                y0: self.y0,
                x1: self.x1,
                y1: my,
            },
            // Bottom-left
            Tile {
                zoom: self.zoom + 1,
                tile_x: new_tile_x,
                tile_y: new_tile_y + 1,
                x0: self.x0,
                y0: my,
                x1: mx,
                y1: self.y1,
            },
            // Bottom-right
            Tile {
                zoom: self.zoom + 1,
                tile_x: new_tile_x + 1,
                tile_y: new_tile_y + 1,
                x0: mx,
                y0: my,
                x1: self.x1,
                y1: self.y1,
            },
        ]
    }

    /// The tile at `zoom` that contains `position`, found by walking down from [`Tile::WORLD`].
    pub fn containing(position: LatLng, zoom: u8) -> Tile {
        let (x, y) = project(position);
        let mut tile = Tile::WORLD;

        for _ in 0..zoom {
            let mx = (tile.x0 + tile.x1) / 2.0;
            let my = (tile.y0 + tile.y1) / 2.0;
            let index = usize::from(x >= mx) + 2 * usize::from(y >= my);
            tile = tile.children()[index];
        }

        tile
    }

    /// Geographic extent as (south-west, north-east).
    pub fn bounds(&self) -> (LatLng, LatLng) {
        // In Web Mercator y=0 is north (max latitude), y=1 is south (min latitude)
        let lat = |y: f64| (PI - 2.0 * PI * y).sinh().atan().to_degrees();
        let lng = |x: f64| x * 360.0 - 180.0;

        (
            LatLng::new(lat(self.y1), lng(self.x0)),
            LatLng::new(lat(self.y0), lng(self.x1)),
        )
    }

    /// Fill a `{s}/{z}/{x}/{y}` template, spreading tiles over the subdomains.
    pub fn url(&self, template: &str, subdomains: &[String]) -> String {
        let subdomain = if subdomains.is_empty() {
            ""
        } else {
            let index = (self.tile_x as usize + self.tile_y as usize) % subdomains.len();
            subdomains[index].as_str()
        };

        template
            .replace("{s}", subdomain)
            .replace("{z}", &self.zoom.to_string())
            .replace("{x}", &self.tile_x.to_string())
            .replace("{y}", &self.tile_y.to_string())
    }
}

/// One `{z}/{x}/{y}` template per subdomain, for renderers that take a tile list.
pub fn tile_templates(template: &str, subdomains: &[String]) -> Vec<String> {
    if !template.contains("{s}") || subdomains.is_empty() {
        return vec![template.replace("{s}", "")];
    }

    subdomains
        .iter()
        .map(|subdomain| template.replace("{s}", subdomain))
        .collect()
}

/// Web Mercator projection into normalized map space.
fn project(position: LatLng) -> (f64, f64) {
    // Beyond this the projection diverges
    const MAX_LAT: f64 = 85.051_128_78;

    let lat = position.lat.clamp(-MAX_LAT, MAX_LAT).to_radians();
    let x = (position.lng + 180.0) / 360.0;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0;

    (x.clamp(0.0, 1.0 - f64::EPSILON), y.clamp(0.0, 1.0 - f64::EPSILON))
}
