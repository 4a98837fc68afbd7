//! Synthetic bus stops placed around the device position.
//!
//! There is no stop data source: the stops are fixed offsets from wherever the
//! device happens to be, so the map always has something to route to.

use crate::{coordinates::LatLng, identifiers::StopIdentifier};

/// Offsets in degrees (latitude, longitude), in display order.
pub const STOP_OFFSETS: [(f64, f64); 3] = [(0.01, 0.01), (-0.02, 0.02), (0.03, -0.03)];

#[derive(Clone, Debug, PartialEq)]
pub struct BusStop {
    pub id: StopIdentifier,
    pub label: String,
    pub location: LatLng,
}

/// Derive the stop set for a position.
///
/// Always returns exactly one stop per entry of [`STOP_OFFSETS`], numbered from 1.
pub fn synthetic_stops(position: LatLng) -> Vec<BusStop> {
    STOP_OFFSETS
        .iter()
        .enumerate()
        .map(|(index, (d_lat, d_lng))| {
            let number = index + 1;
            BusStop {
                id: StopIdentifier::new(format!("bus-stop-{number}")),
                label: format!("Bus Stop {number}"),
                location: position.offset(*d_lat, *d_lng),
            }
        })
        .collect()
}
