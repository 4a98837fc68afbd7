//! The drawing surface a map view is rendered onto.

use std::collections::BTreeMap;

use crate::{coordinates::LatLng, identifiers::MarkerIdentifier, map::Marker, map::style::LineStyle};

/// Handle to a layer attached to a surface
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerHandle(u64);

impl LayerHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

pub trait MapSurface {
    fn set_view(&mut self, center: LatLng, zoom: u8);

    fn add_marker(&mut self, marker: &Marker);

    fn add_line(&mut self, path: &[LatLng], style: &LineStyle) -> LayerHandle;

    /// Returns false if the layer was not attached.
    fn remove_layer(&mut self, handle: LayerHandle) -> bool;
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneLine {
    pub path: Vec<LatLng>,
    pub style: LineStyle,
}

/// In-memory surface that keeps what has been drawn.
///
/// Hosts that draw natively read the scene back out of it.
#[derive(Debug, Default)]
pub struct SceneSurface {
    view: Option<(LatLng, u8)>,
    markers: Vec<Marker>,
    lines: BTreeMap<LayerHandle, SceneLine>,
    next_layer: u64,
    lines_added: usize,
    lines_removed: usize,
}

impl SceneSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> Option<(LatLng, u8)> {
        self.view
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn marker(&self, id: &MarkerIdentifier) -> Option<&Marker> {
        self.markers.iter().find(|marker| &marker.id == id)
    }

    pub fn line(&self, handle: LayerHandle) -> Option<&SceneLine> {
        self.lines.get(&handle)
    }

    pub fn lines(&self) -> impl Iterator<Item = (LayerHandle, &SceneLine)> {
        self.lines.iter().map(|(handle, line)| (*handle, line))
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn lines_added(&self) -> usize {
        self.lines_added
    }

    pub fn lines_removed(&self) -> usize {
        self.lines_removed
    }
}

impl MapSurface for SceneSurface {
    fn set_view(&mut self, center: LatLng, zoom: u8) {
        self.view = Some((center, zoom));
    }

    fn add_marker(&mut self, marker: &Marker) {
        match self.markers.iter_mut().find(|m| m.id == marker.id) {
            Some(existing) => *existing = marker.clone(),
            None => self.markers.push(marker.clone()),
        }
    }

    fn add_line(&mut self, path: &[LatLng], style: &LineStyle) -> LayerHandle {
        let handle = LayerHandle(self.next_layer);
        self.next_layer += 1;
        self.lines_added += 1;
        self.lines.insert(
            handle,
            SceneLine {
                path: path.to_vec(),
                style: *style,
            },
        );
        handle
    }

    fn remove_layer(&mut self, handle: LayerHandle) -> bool {
        let removed = self.lines.remove(&handle).is_some();
        if removed {
            self.lines_removed += 1;
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_get_fresh_handles() {
        let mut surface = SceneSurface::new();
        let path = [LatLng::new(0.0, 0.0), LatLng::new(1.0, 1.0)];

        let first = surface.add_line(&path, &LineStyle::default());
        let second = surface.add_line(&path[..1], &LineStyle::default());

        assert_ne!(first, second);
        assert_eq!(surface.line_count(), 2);
        assert_eq!(surface.line(second).unwrap().path, path[..1]);

        assert!(surface.remove_layer(first));
        assert!(!surface.remove_layer(first));
        assert_eq!(surface.line_count(), 1);
        assert_eq!(surface.lines_added(), 2);
        assert_eq!(surface.lines_removed(), 1);
    }
}
