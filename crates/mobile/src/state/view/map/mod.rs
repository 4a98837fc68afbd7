use bus_for_you_core::{
    coordinates::LatLng,
    map::{MapView, overlay::RouteOverlay, style::LineStyle},
};

use crate::state::view::map::source::MapSource;

pub mod source;

const DEFAULT_STYLE: &str = include_str!("../../../../assets/raster-style.json");

/// A marker as the native map view draws it
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct HostMarker {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub icon_url: String,
    pub icon_width: u32,
    pub icon_height: u32,
    pub popup: String,
    pub interactive: bool,
}

/// The route overlay as the native map view draws it
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct HostRoute {
    pub stop_id: String,
    /// GeoJSON `Feature` with a `LineString` geometry
    pub geojson: String,
    pub color: String,
    pub width: f32,
    pub length_meters: f64,
}

/// Camera placement for the native map view
#[derive(Debug, Clone, Copy, PartialEq, uniffi::Record)]
pub struct HostCamera {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: u8,
}

pub(crate) fn markers(view: &MapView) -> Vec<HostMarker> {
    view.markers()
        .iter()
        .map(|marker| HostMarker {
            id: marker.id.to_string(),
            latitude: marker.location.lat,
            longitude: marker.location.lng,
            icon_url: marker.icon.url.clone(),
            icon_width: marker.icon.size[0],
            icon_height: marker.icon.size[1],
            popup: marker.popup.clone(),
            interactive: marker.stop.is_some(),
        })
        .collect()
}

pub(crate) fn camera(center: LatLng, zoom: u8) -> HostCamera {
    HostCamera {
        latitude: center.lat,
        longitude: center.lng,
        zoom,
    }
}

pub(crate) fn route(overlay: &RouteOverlay, style: &LineStyle) -> HostRoute {
    HostRoute {
        stop_id: overlay.stop.to_string(),
        geojson: overlay.to_geojson().to_string(),
        color: style.css_color(),
        width: style.weight_pixels,
        length_meters: overlay.length_meters(),
    }
}

/// MapLibre style for the base map, with raster sources pointed at `source`.
pub(crate) fn style_json(source: &MapSource) -> Result<String, serde_json::Error> {
    rewrite_style_sources(DEFAULT_STYLE, &source.tiles)
}

fn rewrite_style_sources(base_style: &str, tiles: &[String]) -> Result<String, serde_json::Error> {
    let mut style: serde_json::Value = serde_json::from_str(base_style)?;

    if let Some(sources) = style.get_mut("sources").and_then(|s| s.as_object_mut()) {
        for (_name, source) in sources.iter_mut() {
            if let Some(obj) = source.as_object_mut() {
                let source_type = obj.get("type").and_then(|t| t.as_str()).unwrap_or("");

                if source_type == "raster" {
                    obj.remove("url");
                    obj.insert("tiles".to_string(), serde_json::json!(tiles));
                }
            }
        }
    }

    serde_json::to_string(&style)
}
