//! Latitude/longitude pairs in the order the page displays them.
//!
//! `geo` and GeoJSON keep coordinates as (x = longitude, y = latitude). The page
//! works in (latitude, longitude), so every crossing between the two goes
//! through the conversions here.

use std::fmt;

use geo::{Distance, Haversine};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Shift by a fixed number of degrees on each axis.
    pub fn offset(self, d_lat: f64, d_lng: f64) -> Self {
        Self::new(self.lat + d_lat, self.lng + d_lng)
    }

    /// `lng,lat`, the pair format directions services take in query strings.
    pub fn to_lng_lat_param(self) -> String {
        format!("{},{}", self.lng, self.lat)
    }

    /// Build from a GeoJSON position (`[lng, lat, ...]`).
    pub fn from_geojson_position(position: &[f64]) -> Option<Self> {
        match position {
            [lng, lat, ..] => Some(Self::new(*lat, *lng)),
            _ => None,
        }
    }

    pub fn to_geojson_position(self) -> Vec<f64> {
        vec![self.lng, self.lat]
    }

    pub fn haversine_distance(self, other: LatLng) -> f64 {
        Haversine.distance(geo::Point::from(self), geo::Point::from(other))
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lng)
    }
}

impl From<LatLng> for geo::Point {
    fn from(value: LatLng) -> Self {
        geo::Point::new(value.lng, value.lat)
    }
}

impl From<geo::Point> for LatLng {
    fn from(value: geo::Point) -> Self {
        Self::new(value.y(), value.x())
    }
}

/// Length of a path in meters along the Earth's surface.
pub fn path_length(path: &[LatLng]) -> f64 {
    path.windows(2)
        .map(|pair| pair[0].haversine_distance(pair[1]))
        .sum()
}
