//! Driving directions from an external routing service.

use std::future::Future;
use std::pin::Pin;

use geojson::GeoJson;
use reqwest::Url;

use crate::{config::DirectionsConfig, coordinates::LatLng};

#[derive(Debug, thiserror::Error)]
pub enum DirectionsError {
    #[error("invalid directions endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("directions service answered HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid directions response: {0}")]
    InvalidData(String),

    #[error("directions response contained no route")]
    NoRoute,
}

/// Computes a route between two positions
pub trait DirectionsService: Send + Sync {
    fn route<'a>(
        &'a self,
        start: LatLng,
        end: LatLng,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<LatLng>, DirectionsError>> + Send + 'a>>;
}

/// Client for the openrouteservice directions API.
pub struct OpenRouteService {
    config: DirectionsConfig,
    client: reqwest::Client,
}

impl OpenRouteService {
    pub fn new(config: DirectionsConfig) -> Self {
        if config.api_key.is_none() && config.base_url.contains("api.openrouteservice.org") {
            tracing::warn!("no directions API key configured; requests will be rejected");
        }

        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &DirectionsConfig {
        &self.config
    }

    /// `GET {base}/v2/directions/{profile}?api_key=..&start=lng,lat&end=lng,lat`
    pub fn endpoint(&self, start: LatLng, end: LatLng) -> Result<Url, DirectionsError> {
        let base = self.config.base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}/v2/directions/{}", self.config.profile))
            .map_err(|e| DirectionsError::InvalidEndpoint(e.to_string()))?;

        {
            let mut query = url.query_pairs_mut();
            if let Some(api_key) = &self.config.api_key {
                query.append_pair("api_key", api_key);
            }
            query
                .append_pair("start", &start.to_lng_lat_param())
                .append_pair("end", &end.to_lng_lat_param());
        }

        Ok(url)
    }

    async fn fetch_route(&self, start: LatLng, end: LatLng) -> Result<Vec<LatLng>, DirectionsError> {
        let url = self.endpoint(start, end)?;
        tracing::debug!("requesting directions {start} -> {end}");

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/geo+json, application/json")
            .send()
            .await
            .map_err(|e| DirectionsError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DirectionsError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(DirectionsError::Status {
                status: status.as_u16(),
                body,
            });
        }

        decode_route(&body)
    }
}

impl DirectionsService for OpenRouteService {
    fn route<'a>(
        &'a self,
        start: LatLng,
        end: LatLng,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<LatLng>, DirectionsError>> + Send + 'a>> {
        Box::pin(self.fetch_route(start, end))
    }
}

/// Decode the first route of a GeoJSON directions response.
///
/// Coordinates arrive as (lng, lat) and come back as [`LatLng`].
pub fn decode_route(body: &str) -> Result<Vec<LatLng>, DirectionsError> {
    let geojson: GeoJson = body
        .parse()
        .map_err(|e: geojson::Error| DirectionsError::InvalidData(e.to_string()))?;

    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(DirectionsError::InvalidData(
            "expected a FeatureCollection".to_owned(),
        ));
    };

    let feature = collection.features.first().ok_or(DirectionsError::NoRoute)?;
    let geometry = feature
        .geometry
        .as_ref()
        .ok_or_else(|| DirectionsError::InvalidData("route has no geometry".to_owned()))?;

    let geojson::Value::LineString(coordinates) = &geometry.value else {
        return Err(DirectionsError::InvalidData(
            "route geometry is not a LineString".to_owned(),
        ));
    };

    coordinates
        .iter()
        .map(|position| {
            LatLng::from_geojson_position(position).ok_or_else(|| {
                DirectionsError::InvalidData(format!("malformed position {position:?}"))
            })
        })
        .collect()
}
