use crate::{
    coordinates::{LatLng, path_length},
    identifiers::StopIdentifier,
    map::{
        style::LineStyle,
        surface::{LayerHandle, MapSurface},
    },
};

/// The route line currently drawn on the map.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteOverlay {
    pub handle: LayerHandle,
    pub stop: StopIdentifier,
    pub path: Vec<LatLng>,
}

impl RouteOverlay {
    pub fn length_meters(&self) -> f64 {
        path_length(&self.path)
    }

    /// The overlay as a GeoJSON `LineString` feature in (lng, lat) order.
    pub fn to_geojson(&self) -> geojson::Feature {
        let coordinates = self.path.iter().map(|p| p.to_geojson_position()).collect();
        let mut feature = geojson::Feature::from(geojson::Geometry::new(
            geojson::Value::LineString(coordinates),
        ));
        feature.set_property("stop", self.stop.as_str());
        feature.set_property("length_m", self.length_meters().round());
        feature
    }
}

/// Holds at most one [`RouteOverlay`].
#[derive(Debug, Default)]
pub struct OverlaySlot {
    current: Option<RouteOverlay>,
}

impl OverlaySlot {
    pub fn current(&self) -> Option<&RouteOverlay> {
        self.current.as_ref()
    }

    /// Remove the current line from the surface, if any, and attach `path` in its place.
    pub fn replace<S: MapSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        stop: StopIdentifier,
        path: Vec<LatLng>,
        style: &LineStyle,
    ) -> &RouteOverlay {
        if let Some(previous) = self.current.take() {
            if !surface.remove_layer(previous.handle) {
                tracing::warn!("route layer {} was already gone", previous.handle.id());
            }
        }

        let handle = surface.add_line(&path, style);
        self.current.insert(RouteOverlay { handle, stop, path })
    }
}
