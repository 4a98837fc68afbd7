//! Page-level state and the flows that mutate it.
//!
//! Activation runs the query-param loader and the geolocation acquirer once.
//! A successful reading renders the map; clicks on stop markers fetch a route
//! and swap it in as the single overlay.
//!
//! A route fetch is split in three so that the page is not borrowed while the
//! request is in flight: [`PageState::begin_route`] captures the endpoints,
//! [`RouteRequest::send`] talks to the service, and [`PageState::finish_route`]
//! applies the outcome. Overlapping requests are not sequenced; whichever
//! finishes last owns the overlay.

use crate::{
    assets::PageAssets,
    bus_info::{BusInfo, BusInfoError, status_text},
    config::{Config, MAX_ZOOM},
    coordinates::LatLng,
    directions::{DirectionsError, DirectionsService},
    geolocation::{GeolocationError, Geolocator},
    identifiers::{MarkerIdentifier, StopIdentifier},
    map::{
        MapView,
        overlay::{OverlaySlot, RouteOverlay},
        style::LineStyle,
        surface::MapSurface,
    },
    stops::{BusStop, synthetic_stops},
};

/// Lifecycle of the most recent route fetch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum RouteState {
    #[default]
    Idle,
    Requesting,
    Drawn,
    Failed,
}

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("no position has been acquired yet")]
    PositionUnavailable,

    #[error("the map has not been rendered")]
    MapNotRendered,

    #[error("unknown bus stop: {0}")]
    UnknownStop(StopIdentifier),

    #[error("unknown marker: {0}")]
    UnknownMarker(MarkerIdentifier),

    #[error("marker {0} does not lead anywhere")]
    MarkerNotInteractive(MarkerIdentifier),

    #[error("error fetching directions: {0}")]
    Directions(#[from] DirectionsError),
}

/// A route fetch that has been started but not applied.
#[derive(Clone, Debug)]
pub struct RouteRequest {
    pub sequence: u64,
    pub stop: StopIdentifier,
    pub start: LatLng,
    pub end: LatLng,
}

impl RouteRequest {
    pub async fn send(self, directions: &dyn DirectionsService) -> RouteResponse {
        let result = directions.route(self.start, self.end).await;
        RouteResponse {
            sequence: self.sequence,
            stop: self.stop,
            result,
        }
    }
}

#[derive(Debug)]
pub struct RouteResponse {
    pub sequence: u64,
    pub stop: StopIdentifier,
    pub result: Result<Vec<LatLng>, DirectionsError>,
}

pub struct PageState<S: MapSurface> {
    surface: S,
    assets: PageAssets,
    zoom: u8,
    route_style: LineStyle,

    bus_info: Option<BusInfo>,
    position: Option<LatLng>,
    stops: Vec<BusStop>,
    map: Option<MapView>,
    overlay: OverlaySlot,
    route_state: RouteState,
    requests_started: u64,
}

impl<S: MapSurface> PageState<S> {
    pub fn new(surface: S, config: &Config) -> Self {
        let route_style = config.map.route_style().unwrap_or_else(|error| {
            tracing::warn!("{error}; drawing routes in the default style");
            LineStyle::default()
        });
        let zoom = if config.map.zoom > MAX_ZOOM {
            tracing::warn!("zoom {} is too deep; using {MAX_ZOOM}", config.map.zoom);
            MAX_ZOOM
        } else {
            config.map.zoom
        };

        Self {
            surface,
            assets: config.assets.clone(),
            zoom,
            route_style,
            bus_info: None,
            position: None,
            stops: Vec::new(),
            map: None,
            overlay: OverlaySlot::default(),
            route_state: RouteState::Idle,
            requests_started: 0,
        }
    }

    /// Run both activation steps: read the URL, then ask for a position.
    ///
    /// Each step fails on its own; a bad URL never keeps the map from rendering.
    pub async fn activate(&mut self, page_url: &str, geolocator: &dyn Geolocator) {
        // Failures are logged inside each step
        let _ = self.load_bus_info(page_url);
        let _ = self.acquire_position(geolocator).await;
    }

    pub fn load_bus_info(&mut self, page_url: &str) -> Result<(), BusInfoError> {
        match BusInfo::from_page_url(page_url) {
            Ok(Some(info)) => {
                tracing::info!("bus info loaded: {}", status_text(Some(&info)));
                self.bus_info = Some(info);
                Ok(())
            }
            Ok(None) => {
                tracing::debug!("page url carries no bus info");
                Ok(())
            }
            Err(error) => {
                tracing::error!("Error parsing busInfo: {error}");
                Err(error)
            }
        }
    }

    pub async fn acquire_position(
        &mut self,
        geolocator: &dyn Geolocator,
    ) -> Result<LatLng, GeolocationError> {
        match geolocator.current_position().await {
            Ok(position) => {
                self.apply_position(position);
                Ok(position)
            }
            Err(error) => {
                tracing::error!("{error}");
                Err(error)
            }
        }
    }

    fn apply_position(&mut self, position: LatLng) {
        tracing::info!("position acquired at {position}");
        self.position = Some(position);

        if let Some(map) = self.map.as_mut() {
            map.recenter(position, &mut self.surface);
            return;
        }

        // Stops are placed once, around the first reading
        self.stops = synthetic_stops(position);
        let map = MapView::new(position, &self.stops, self.zoom, &self.assets);
        map.render(&mut self.surface);
        self.map = Some(map);
    }

    /// Route to the stop behind a clicked marker.
    pub async fn click_marker(
        &mut self,
        marker: &MarkerIdentifier,
        directions: &dyn DirectionsService,
    ) -> Result<&RouteOverlay, RouteError> {
        let stop = self.stop_for_marker(marker)?;
        self.select_stop(&stop, directions).await
    }

    pub fn stop_for_marker(&self, marker: &MarkerIdentifier) -> Result<StopIdentifier, RouteError> {
        let map = self.map.as_ref().ok_or(RouteError::MapNotRendered)?;
        let marker = map
            .marker(marker)
            .ok_or_else(|| RouteError::UnknownMarker(marker.clone()))?;

        marker
            .stop
            .clone()
            .ok_or_else(|| RouteError::MarkerNotInteractive(marker.id.clone()))
    }

    /// Fetch a route to `stop` and draw it, replacing the previous one.
    pub async fn select_stop(
        &mut self,
        stop: &StopIdentifier,
        directions: &dyn DirectionsService,
    ) -> Result<&RouteOverlay, RouteError> {
        let request = self.begin_route(stop)?;
        let response = request.send(directions).await;
        self.finish_route(response)
    }

    pub fn begin_route(&mut self, stop: &StopIdentifier) -> Result<RouteRequest, RouteError> {
        let start = self.position.ok_or(RouteError::PositionUnavailable)?;
        if self.map.is_none() {
            return Err(RouteError::MapNotRendered);
        }
        let end = self
            .stop(stop)
            .map(|s| s.location)
            .ok_or_else(|| RouteError::UnknownStop(stop.clone()))?;

        self.requests_started += 1;
        self.route_state = RouteState::Requesting;
        tracing::debug!("route request {} to {stop} started", self.requests_started);

        Ok(RouteRequest {
            sequence: self.requests_started,
            stop: stop.clone(),
            start,
            end,
        })
    }

    pub fn finish_route(&mut self, response: RouteResponse) -> Result<&RouteOverlay, RouteError> {
        if response.sequence < self.requests_started {
            tracing::debug!(
                "route request {} finished after newer request {}",
                response.sequence,
                self.requests_started
            );
        }

        match response.result {
            Ok(path) => {
                self.route_state = RouteState::Drawn;
                tracing::info!("drawing route to {} ({} points)", response.stop, path.len());
                Ok(self
                    .overlay
                    .replace(&mut self.surface, response.stop, path, &self.route_style))
            }
            Err(error) => {
                self.route_state = RouteState::Failed;
                tracing::error!("Error fetching directions: {error}");
                Err(error.into())
            }
        }
    }

    pub fn status_text(&self) -> String {
        status_text(self.bus_info.as_ref())
    }

    pub fn bus_info(&self) -> Option<&BusInfo> {
        self.bus_info.as_ref()
    }

    pub fn position(&self) -> Option<LatLng> {
        self.position
    }

    pub fn stops(&self) -> &[BusStop] {
        &self.stops
    }

    pub fn stop(&self, id: &StopIdentifier) -> Option<&BusStop> {
        self.stops.iter().find(|stop| &stop.id == id)
    }

    pub fn map(&self) -> Option<&MapView> {
        self.map.as_ref()
    }

    pub fn overlay(&self) -> Option<&RouteOverlay> {
        self.overlay.current()
    }

    pub fn route_state(&self) -> RouteState {
        self.route_state
    }

    pub fn route_style(&self) -> &LineStyle {
        &self.route_style
    }

    pub fn assets(&self) -> &PageAssets {
        &self.assets
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{
        geolocation::{FixedGeolocator, GeolocationErrorCode},
        map::surface::SceneSurface,
    };

    const PAGE_URL: &str =
        r#"http://localhost:3000/Pages2?busInfo={"nbr":"12","places_vacantes":"5"}"#;

    /// Answers with a straight line, or with the queued failures first.
    #[derive(Default)]
    struct StraightLine {
        failures: Mutex<Vec<DirectionsError>>,
        calls: Mutex<Vec<(LatLng, LatLng)>>,
    }

    impl StraightLine {
        fn failing_next(&self, error: DirectionsError) {
            self.failures.lock().unwrap().push(error);
        }
    }

    impl DirectionsService for StraightLine {
        fn route<'a>(
            &'a self,
            start: LatLng,
            end: LatLng,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<LatLng>, DirectionsError>> + Send + 'a>>
        {
            self.calls.lock().unwrap().push((start, end));
            let result = match self.failures.lock().unwrap().pop() {
                Some(error) => Err(error),
                None => Ok(vec![start, end]),
            };
            Box::pin(async move { result })
        }
    }

    async fn activated_page(position: LatLng) -> PageState<SceneSurface> {
        let mut page = PageState::new(SceneSurface::new(), &Config::default());
        page.activate(PAGE_URL, &FixedGeolocator::at(position)).await;
        page
    }

    fn stop_id(n: usize) -> StopIdentifier {
        StopIdentifier::new(format!("bus-stop-{n}"))
    }

    #[tokio::test]
    async fn test_activation_scenario() {
        let page = activated_page(LatLng::new(48.85, 2.35)).await;

        assert_eq!(page.status_text(), "Bus nunmero : 12, Places vacantes: 5");
        assert_eq!(page.position(), Some(LatLng::new(48.85, 2.35)));
        assert_eq!(page.route_state(), RouteState::Idle);

        let expected = [(48.86, 2.36), (48.83, 2.37), (48.88, 2.32)];
        for (stop, (lat, lng)) in page.stops().iter().zip(expected) {
            assert_abs_diff_eq!(stop.location.lat, lat, epsilon = 1e-9);
            assert_abs_diff_eq!(stop.location.lng, lng, epsilon = 1e-9);
        }

        let surface = page.surface();
        assert_eq!(surface.view(), Some((LatLng::new(48.85, 2.35), 13)));
        assert_eq!(surface.markers().len(), 4);
        assert_eq!(surface.line_count(), 0);
    }

    #[tokio::test]
    async fn test_bad_bus_info_does_not_block_map() {
        let mut page = PageState::new(SceneSurface::new(), &Config::default());
        page.activate(
            "http://localhost/Pages2?busInfo={broken",
            &FixedGeolocator::at(LatLng::new(1.0, 1.0)),
        )
        .await;

        assert_eq!(page.status_text(), "Loading...");
        assert!(page.bus_info().is_none());
        assert!(page.map().is_some());
    }

    #[tokio::test]
    async fn test_geolocation_failure_renders_nothing() {
        let mut page = PageState::new(SceneSurface::new(), &Config::default());
        let denied = GeolocationError::new(GeolocationErrorCode::PermissionDenied, "denied");
        page.activate(PAGE_URL, &FixedGeolocator::failing(denied)).await;

        assert_eq!(page.status_text(), "Bus nunmero : 12, Places vacantes: 5");
        assert!(page.position().is_none());
        assert!(page.map().is_none());
        assert!(page.stops().is_empty());
        assert_eq!(page.surface().view(), None);
        assert!(page.surface().markers().is_empty());

        let directions = StraightLine::default();
        let result = page.select_stop(&stop_id(1), &directions).await;
        assert!(matches!(result, Err(RouteError::PositionUnavailable)));
        let result = page.click_marker(&MarkerIdentifier::new("bus-stop-1"), &directions).await;
        assert!(matches!(result, Err(RouteError::MapNotRendered)));

        assert!(directions.calls.lock().unwrap().is_empty());
        assert_eq!(page.route_state(), RouteState::Idle);
    }

    #[tokio::test]
    async fn test_n_fetches_leave_one_overlay() {
        let mut page = activated_page(LatLng::new(48.85, 2.35)).await;
        let directions = StraightLine::default();

        for n in [1, 2, 3, 1, 2] {
            page.select_stop(&stop_id(n), &directions).await.unwrap();
        }

        let overlay = page.overlay().unwrap();
        assert_eq!(overlay.stop, stop_id(2));
        assert_eq!(page.route_state(), RouteState::Drawn);
        assert_eq!(page.surface().line_count(), 1);
        assert_eq!(page.surface().lines_added(), 5);
        assert_eq!(page.surface().lines_removed(), 4);
        assert_eq!(page.surface().line(overlay.handle).unwrap().path, overlay.path);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_overlay() {
        let mut page = activated_page(LatLng::new(48.85, 2.35)).await;
        let directions = StraightLine::default();

        let drawn = page.select_stop(&stop_id(1), &directions).await.unwrap().clone();

        directions.failing_next(DirectionsError::Network("connection reset".to_owned()));
        let result = page.select_stop(&stop_id(3), &directions).await;

        assert!(matches!(result, Err(RouteError::Directions(DirectionsError::Network(_)))));
        assert_eq!(page.route_state(), RouteState::Failed);
        assert_eq!(page.overlay(), Some(&drawn));
        assert_eq!(page.surface().line_count(), 1);
        assert_eq!(page.surface().lines_removed(), 0);

        // The next success moves straight back to drawn
        page.select_stop(&stop_id(3), &directions).await.unwrap();
        assert_eq!(page.route_state(), RouteState::Drawn);
        assert_eq!(page.overlay().unwrap().stop, stop_id(3));
    }

    #[tokio::test]
    async fn test_failure_before_any_overlay() {
        let mut page = activated_page(LatLng::new(0.0, 0.0)).await;
        let directions = StraightLine::default();
        directions.failing_next(DirectionsError::NoRoute);

        assert!(page.select_stop(&stop_id(2), &directions).await.is_err());
        assert!(page.overlay().is_none());
        assert_eq!(page.surface().line_count(), 0);
    }

    #[tokio::test]
    async fn test_click_marker() {
        let mut page = activated_page(LatLng::new(48.85, 2.35)).await;
        let directions = StraightLine::default();

        let overlay = page
            .click_marker(&MarkerIdentifier::new("bus-stop-2"), &directions)
            .await
            .unwrap();
        assert_eq!(overlay.stop, stop_id(2));

        let calls = directions.calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, LatLng::new(48.85, 2.35));
        assert_abs_diff_eq!(calls[0].1.lat, 48.83, epsilon = 1e-9);
        assert_abs_diff_eq!(calls[0].1.lng, 2.37, epsilon = 1e-9);

        assert!(matches!(
            page.click_marker(&MarkerIdentifier::you_are_here(), &directions).await,
            Err(RouteError::MarkerNotInteractive(_))
        ));
        assert!(matches!(
            page.click_marker(&MarkerIdentifier::new("bus-stop-9"), &directions).await,
            Err(RouteError::UnknownMarker(_))
        ));
        assert!(matches!(
            page.select_stop(&stop_id(9), &directions).await,
            Err(RouteError::UnknownStop(_))
        ));
    }

    #[tokio::test]
    async fn test_overlapping_requests_last_finish_wins() {
        let mut page = activated_page(LatLng::new(48.85, 2.35)).await;
        let directions = StraightLine::default();

        let first = page.begin_route(&stop_id(1)).unwrap();
        let second = page.begin_route(&stop_id(2)).unwrap();
        assert_eq!((first.sequence, second.sequence), (1, 2));
        assert_eq!(page.route_state(), RouteState::Requesting);

        let second = second.send(&directions).await;
        let first = first.send(&directions).await;

        page.finish_route(second).unwrap();
        page.finish_route(first).unwrap();

        // The older request finished last and owns the overlay
        assert_eq!(page.overlay().unwrap().stop, stop_id(1));
        assert_eq!(page.surface().line_count(), 1);
        assert_eq!(page.surface().lines_removed(), 1);
    }

    #[tokio::test]
    async fn test_reacquisition_recenters() {
        let mut page = activated_page(LatLng::new(48.85, 2.35)).await;
        let stops = page.stops().to_vec();

        page.acquire_position(&FixedGeolocator::at(LatLng::new(45.76, 4.84)))
            .await
            .unwrap();

        assert_eq!(page.position(), Some(LatLng::new(45.76, 4.84)));
        assert_eq!(page.map().unwrap().center(), LatLng::new(45.76, 4.84));
        assert_eq!(page.surface().view(), Some((LatLng::new(45.76, 4.84), 13)));
        assert_eq!(page.stops(), stops.as_slice());
    }

    #[tokio::test]
    async fn test_unvalidated_zoom_is_clamped() {
        let mut config = Config::default();
        config.map.zoom = 40;
        let mut page = PageState::new(SceneSurface::new(), &config);
        page.activate(PAGE_URL, &FixedGeolocator::at(LatLng::new(48.85, 2.35)))
            .await;

        let map = page.map().unwrap();
        assert_eq!(map.zoom(), MAX_ZOOM);
        assert_eq!(map.center_tile().zoom, MAX_ZOOM);
        assert_eq!(page.surface().view(), Some((LatLng::new(48.85, 2.35), MAX_ZOOM)));
    }

    #[test]
    fn test_route_state_display() {
        assert_eq!(RouteState::Requesting.to_string(), "requesting");
        assert_eq!(RouteState::default(), RouteState::Idle);
    }
}
