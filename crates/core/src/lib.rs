//! # bus-for-you-core
//!
//! The bus finder page: where the device is, which stops are nearby, and how
//! to drive to one of them.
//!
//! ## Flow
//!
//! - **Bus info**: a JSON summary is read from the `busInfo` URL parameter
//!   and shown in the status panel.
//! - **Position**: one geolocation reading places three synthetic stops
//!   around the device and renders the map.
//! - **Directions**: clicking a stop marker fetches a driving route and draws
//!   it as the single route overlay.
//!
//! ## Example
//!
//! ```
//! use bus_for_you_core::prelude::*;
//!
//! # tokio_test();
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn tokio_test() {
//! let mut page = PageState::new(SceneSurface::new(), &Config::default());
//! page.activate(
//!     r#"http://localhost/Pages2?busInfo={"nbr":"12","places_vacantes":"5"}"#,
//!     &FixedGeolocator::at(LatLng::new(48.85, 2.35)),
//! )
//! .await;
//!
//! assert_eq!(page.status_text(), "Bus nunmero : 12, Places vacantes: 5");
//! assert_eq!(page.stops().len(), 3);
//! assert_eq!(page.surface().markers().len(), 4);
//! # }
//! ```

pub mod assets;
pub mod bus_info;
pub mod config;
pub mod coordinates;
pub mod directions;
pub mod geolocation;
pub mod identifiers;
pub mod map;
pub mod page;
pub mod stops;

// Re-exports for convenience
pub mod prelude {
    pub use crate::assets::{Icon, Link, PageAssets};
    pub use crate::bus_info::{BusInfo, BusInfoError, status_text};
    pub use crate::config::{Config, ConfigError, DirectionsConfig, MapConfig};
    pub use crate::coordinates::LatLng;
    pub use crate::directions::{DirectionsError, DirectionsService, OpenRouteService};
    pub use crate::geolocation::{
        FixedGeolocator, GeolocationError, GeolocationErrorCode, Geolocator,
    };
    pub use crate::identifiers::*;
    pub use crate::map::{
        MapView, Marker,
        overlay::RouteOverlay,
        style::LineStyle,
        surface::{LayerHandle, MapSurface, SceneSurface},
        tile::Tile,
    };
    pub use crate::page::{PageState, RouteError, RouteRequest, RouteResponse, RouteState};
    pub use crate::stops::{BusStop, synthetic_stops};
}

pub use prelude::*;
