pub mod overlay;
pub mod style;
pub mod surface;
pub mod tile;

use crate::{
    assets::{Icon, PageAssets},
    coordinates::LatLng,
    identifiers::{MarkerIdentifier, StopIdentifier},
    map::{surface::MapSurface, tile::Tile},
    stops::BusStop,
};

#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub id: MarkerIdentifier,
    pub location: LatLng,
    pub icon: Icon,
    pub popup: String,
    /// The stop a click on this marker routes to; `None` for non-interactive markers
    pub stop: Option<StopIdentifier>,
}

/// A map centred on the device, with a marker for it and one per bus stop.
#[derive(Clone, Debug)]
pub struct MapView {
    center: LatLng,
    zoom: u8,
    markers: Vec<Marker>,
}

impl MapView {
    pub fn new(position: LatLng, stops: &[BusStop], zoom: u8, assets: &PageAssets) -> Self {
        let you_are_here = Marker {
            id: MarkerIdentifier::you_are_here(),
            location: position,
            icon: assets.you_are_here.clone(),
            popup: "You are here!".to_owned(),
            stop: None,
        };

        let stop_markers = stops.iter().map(|stop| Marker {
            id: MarkerIdentifier::from(&stop.id),
            location: stop.location,
            icon: assets.bus_stop.clone(),
            popup: stop.label.clone(),
            stop: Some(stop.id.clone()),
        });

        Self {
            center: position,
            zoom,
            markers: std::iter::once(you_are_here).chain(stop_markers).collect(),
        }
    }

    pub fn center(&self) -> LatLng {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn marker(&self, id: &MarkerIdentifier) -> Option<&Marker> {
        self.markers.iter().find(|marker| &marker.id == id)
    }

    /// The tile under the centre at the current zoom.
    pub fn center_tile(&self) -> Tile {
        Tile::containing(self.center, self.zoom)
    }

    pub fn render<S: MapSurface + ?Sized>(&self, surface: &mut S) {
        surface.set_view(self.center, self.zoom);
        for marker in &self.markers {
            surface.add_marker(marker);
        }
    }

    /// Move the view and the self marker to a new position.
    pub fn recenter<S: MapSurface + ?Sized>(&mut self, position: LatLng, surface: &mut S) {
        self.center = position;
        surface.set_view(position, self.zoom);

        let you_are_here = MarkerIdentifier::you_are_here();
        if let Some(marker) = self.markers.iter_mut().find(|m| m.id == you_are_here) {
            marker.location = position;
            surface.add_marker(marker);
        }
    }
}
