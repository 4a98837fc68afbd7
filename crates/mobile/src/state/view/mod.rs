use std::sync::Arc;

use tokio::sync::Mutex;

use bus_for_you_core::{
    config::Config,
    directions::{DirectionsService, OpenRouteService},
    geolocation::{FixedGeolocator, GeolocationError, GeolocationErrorCode},
    coordinates::LatLng,
    identifiers::MarkerIdentifier,
    map::surface::SceneSurface,
    page::{PageState, RouteError},
};

use crate::state::view::map::{HostCamera, HostMarker, HostRoute, source::MapSource};

pub mod map;

#[derive(Debug, thiserror::Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum PageSessionError {
    #[error("{0}")]
    Config(String),
    #[error("{0}")]
    Route(String),
    #[error("{0}")]
    Style(String),
}

impl From<RouteError> for PageSessionError {
    fn from(error: RouteError) -> Self {
        Self::Route(error.to_string())
    }
}

/// Why the host could not read the device position
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum HostGeolocationError {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
}

impl From<HostGeolocationError> for GeolocationErrorCode {
    fn from(value: HostGeolocationError) -> Self {
        match value {
            HostGeolocationError::PermissionDenied => Self::PermissionDenied,
            HostGeolocationError::PositionUnavailable => Self::PositionUnavailable,
            HostGeolocationError::Timeout => Self::Timeout,
        }
    }
}

/// Static images and the way back home
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct HostAssets {
    pub background: String,
    pub logo: String,
    pub bus_badge: String,
    pub home_label: String,
    pub home_href: String,
    pub home_icon: String,
}

/// One open bus finder page, driven by the native host.
///
/// The host reads the device position itself and reports it; everything else
/// (status text, markers, the route overlay) is read back from here.
#[derive(uniffi::Object)]
pub struct PageSession {
    config: Config,
    directions: Arc<dyn DirectionsService>,
    page: Mutex<PageState<SceneSurface>>,
}

#[uniffi::export(async_runtime = "tokio")]
impl PageSession {
    /// `config_json` follows the core `Config` layout; `None` uses the defaults.
    #[uniffi::constructor]
    pub fn new(config_json: Option<String>) -> Result<Self, PageSessionError> {
        let config = match config_json {
            Some(json) => {
                Config::from_json(&json).map_err(|e| PageSessionError::Config(e.to_string()))?
            }
            None => Config::default(),
        };

        let directions = Arc::new(OpenRouteService::new(config.directions.clone()));
        Ok(Self::with_directions(config, directions))
    }

    /// Read `busInfo` from the page URL and return the status panel text.
    pub async fn load_bus_info(&self, page_url: String) -> String {
        let mut page = self.page.lock().await;
        // A bad parameter leaves the placeholder in place
        let _ = page.load_bus_info(&page_url);
        page.status_text()
    }

    pub async fn status_text(&self) -> String {
        self.page.lock().await.status_text()
    }

    /// The device reported a position. Returns where the camera should go.
    pub async fn position_acquired(&self, latitude: f64, longitude: f64) -> Option<HostCamera> {
        let geolocator = FixedGeolocator::at(LatLng::new(latitude, longitude));
        let mut page = self.page.lock().await;
        page.acquire_position(&geolocator).await.ok()?;

        page.map().map(|view| map::camera(view.center(), view.zoom()))
    }

    /// The device could not produce a position; the map stays hidden.
    pub async fn position_failed(&self, error: HostGeolocationError, message: String) {
        let geolocator = FixedGeolocator::failing(GeolocationError::new(error.into(), message));
        // The failure is logged by the page
        let _ = self.page.lock().await.acquire_position(&geolocator).await;
    }

    pub async fn camera(&self) -> Option<HostCamera> {
        let page = self.page.lock().await;
        page.map().map(|view| map::camera(view.center(), view.zoom()))
    }

    /// MapLibre style for the base map, or `None` while there is no map to show.
    pub async fn map_style(&self) -> Result<Option<String>, PageSessionError> {
        if self.page.lock().await.map().is_none() {
            return Ok(None);
        }

        map::style_json(&MapSource::from_config(&self.config.map))
            .map(Some)
            .map_err(|e| PageSessionError::Style(e.to_string()))
    }

    pub async fn markers(&self) -> Vec<HostMarker> {
        let page = self.page.lock().await;
        page.map().map(map::markers).unwrap_or_default()
    }

    /// Fetch and draw the route to the stop behind `marker_id`.
    ///
    /// The page is not locked while the request is in flight, so a second tap
    /// can start before the first finishes; the last one to finish is drawn.
    pub async fn tap_marker(&self, marker_id: String) -> Result<HostRoute, PageSessionError> {
        let request = {
            let mut page = self.page.lock().await;
            let stop = page.stop_for_marker(&MarkerIdentifier::new(marker_id))?;
            page.begin_route(&stop)?
        };

        let response = request.send(self.directions.as_ref()).await;

        let mut page = self.page.lock().await;
        page.finish_route(response)?;
        page.overlay()
            .map(|overlay| map::route(overlay, page.route_style()))
            .ok_or_else(|| PageSessionError::Route("route was not drawn".to_owned()))
    }

    pub async fn route_overlay(&self) -> Option<HostRoute> {
        let page = self.page.lock().await;
        page.overlay()
            .map(|overlay| map::route(overlay, page.route_style()))
    }

    /// `idle`, `requesting`, `drawn` or `failed`
    pub async fn route_state(&self) -> String {
        self.page.lock().await.route_state().to_string()
    }

    pub fn assets(&self) -> HostAssets {
        let assets = &self.config.assets;
        HostAssets {
            background: assets.background.clone(),
            logo: assets.logo.clone(),
            bus_badge: assets.bus_badge.clone(),
            home_label: assets.home.label.clone(),
            home_href: assets.home.href.clone(),
            home_icon: assets.home.icon.clone(),
        }
    }
}

impl PageSession {
    /// A session that routes through `directions` instead of openrouteservice.
    pub fn with_directions(config: Config, directions: Arc<dyn DirectionsService>) -> Self {
        Self {
            directions,
            page: Mutex::new(PageState::new(SceneSurface::new(), &config)),
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use bus_for_you_core::directions::DirectionsError;
    use tokio::sync::Notify;

    use super::*;

    /// Straight-line routes. The first request waits until a later one has
    /// been answered, so two taps finish in the opposite order they started.
    #[derive(Default)]
    struct HeldFirstRoute {
        calls: AtomicUsize,
        release: Notify,
    }

    impl DirectionsService for HeldFirstRoute {
        fn route<'a>(
            &'a self,
            start: LatLng,
            end: LatLng,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<LatLng>, DirectionsError>> + Send + 'a>>
        {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                if call == 0 {
                    self.release.notified().await;
                } else {
                    self.release.notify_one();
                }
                Ok(vec![start, end])
            })
        }
    }

    async fn located_session(directions: Arc<HeldFirstRoute>) -> PageSession {
        let session = PageSession::with_directions(Config::default(), directions);
        session.position_acquired(48.85, 2.35).await.unwrap();
        session
    }

    #[tokio::test]
    async fn test_tap_marker_draws_route() {
        let directions = Arc::new(HeldFirstRoute::default());
        // Let the first request through straight away
        directions.release.notify_one();
        let session = located_session(directions.clone()).await;

        let route = session.tap_marker("bus-stop-2".to_owned()).await.unwrap();

        assert_eq!(route.stop_id, "bus-stop-2");
        assert_eq!(route.color, "#0000ff");
        assert!(route.length_meters > 0.0);
        assert_eq!(session.route_overlay().await, Some(route));
        assert_eq!(session.route_state().await, "drawn");
        assert_eq!(directions.calls.load(Ordering::SeqCst), 1);

        assert!(matches!(
            session.tap_marker("you-are-here".to_owned()).await,
            Err(PageSessionError::Route(_))
        ));
    }

    #[tokio::test]
    async fn test_overlapping_taps_last_finish_wins() {
        let directions = Arc::new(HeldFirstRoute::default());
        let session = located_session(directions.clone()).await;

        // The first tap is still waiting on its route while the second one
        // takes the page lock, draws, and releases it.
        let (first, second) = tokio::join!(
            session.tap_marker("bus-stop-1".to_owned()),
            session.tap_marker("bus-stop-3".to_owned()),
        );

        assert_eq!(second.unwrap().stop_id, "bus-stop-3");
        assert_eq!(first.unwrap().stop_id, "bus-stop-1");
        assert_eq!(directions.calls.load(Ordering::SeqCst), 2);

        let overlay = session.route_overlay().await.unwrap();
        assert_eq!(overlay.stop_id, "bus-stop-1");
        assert_eq!(session.page.lock().await.surface().line_count(), 1);
    }

    #[tokio::test]
    async fn test_session_before_position() {
        let session = PageSession::new(None).unwrap();

        assert_eq!(session.status_text().await, "Loading...");
        assert_eq!(session.map_style().await.unwrap(), None);
        assert!(session.markers().await.is_empty());
        assert_eq!(session.camera().await, None);

        let result = session.tap_marker("bus-stop-1".to_owned()).await;
        assert!(matches!(result, Err(PageSessionError::Route(_))));
        assert_eq!(session.route_state().await, "idle");
    }

    #[tokio::test]
    async fn test_session_flow() {
        let session = PageSession::new(Some(r#"{"map":{"zoom":15}}"#.to_owned())).unwrap();

        let status = session
            .load_bus_info(
                "http://localhost/Pages2?busInfo=%7B%22nbr%22%3A%2212%22%2C%22places_vacantes%22%3A%225%22%7D"
                    .to_owned(),
            )
            .await;
        assert_eq!(status, "Bus nunmero : 12, Places vacantes: 5");

        let camera = session.position_acquired(48.85, 2.35).await.unwrap();
        assert_eq!(camera.zoom, 15);
        assert_eq!(session.markers().await.len(), 4);
        assert!(session.map_style().await.unwrap().is_some());
        assert_eq!(session.route_overlay().await, None);
    }

    #[tokio::test]
    async fn test_session_geolocation_denied() {
        let session = PageSession::new(None).unwrap();
        session
            .position_failed(HostGeolocationError::PermissionDenied, "denied".to_owned())
            .await;

        assert_eq!(session.camera().await, None);
        assert!(session.markers().await.is_empty());
    }

    #[test]
    fn test_bad_config() {
        assert!(matches!(
            PageSession::new(Some(r#"{"map":{"route_color":"nope"}}"#.to_owned())),
            Err(PageSessionError::Config(_))
        ));
    }

    #[test]
    fn test_assets() {
        let assets = PageSession::new(None).unwrap().assets();
        assert_eq!(assets.home_href, "./");
        assert_eq!(assets.home_label, "Home");
        assert_eq!(assets.logo, "/logoo.png");
    }
}
