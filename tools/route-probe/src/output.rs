use anyhow::{Context, Result};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};
use std::path::Path;

use bus_for_you_core::{
    map::{Marker, surface::MapSurface},
    page::PageState,
};

fn marker_to_feature(marker: &Marker) -> Feature {
    let mut properties = serde_json::Map::new();
    properties.insert("id".to_string(), serde_json::json!(marker.id.to_string()));
    properties.insert("popup".to_string(), serde_json::json!(marker.popup));
    properties.insert("icon".to_string(), serde_json::json!(marker.icon.url));
    if let Some(stop) = &marker.stop {
        properties.insert("stop".to_string(), serde_json::json!(stop.to_string()));
    }

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(
            marker.location.to_geojson_position(),
        ))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Markers first, then the route overlay if one is drawn.
pub fn page_features<S: MapSurface>(page: &PageState<S>) -> FeatureCollection {
    let mut features: Vec<Feature> = page
        .map()
        .map(|map| map.markers().iter().map(marker_to_feature).collect())
        .unwrap_or_default();

    if let Some(overlay) = page.overlay() {
        features.push(overlay.to_geojson());
    }

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

pub fn write_page_geojson<S: MapSurface>(page: &PageState<S>, path: &Path) -> Result<()> {
    let geojson = GeoJson::FeatureCollection(page_features(page));
    let json = serde_json::to_string_pretty(&geojson).context("Failed to serialize GeoJSON")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
