//! Page configuration.
//!
//! Every field has a default, so an empty JSON object is a valid configuration.
//! The directions API key is never compiled in; it comes from the host
//! configuration or the environment.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::assets::PageAssets;

pub const DEFAULT_DIRECTIONS_URL: &str = "https://api.openrouteservice.org";
pub const DEFAULT_PROFILE: &str = "driving-car";
pub const DEFAULT_ZOOM: u8 = 13;
pub const MAX_ZOOM: u8 = 22;
pub const DEFAULT_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

pub const API_KEY_ENV: &str = "ORS_API_KEY";
pub const DIRECTIONS_URL_ENV: &str = "BUS_FOR_YOU_DIRECTIONS_URL";
pub const PROFILE_ENV: &str = "BUS_FOR_YOU_DIRECTIONS_PROFILE";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid route color: {0}")]
    InvalidColor(String),

    #[error("zoom level {0} is outside 0..=22")]
    InvalidZoom(u8),
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub directions: DirectionsConfig,
    pub map: MapConfig,
    pub assets: PageAssets,
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.map.zoom > MAX_ZOOM {
            return Err(ConfigError::InvalidZoom(self.map.zoom));
        }
        self.map.route_style()?;
        Ok(())
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionsConfig {
    /// Directions service root, or a proxy that adds the key itself
    pub base_url: String,
    pub profile: String,
    pub api_key: Option<String>,
}

impl Default for DirectionsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_DIRECTIONS_URL.to_owned(),
            profile: DEFAULT_PROFILE.to_owned(),
            api_key: None,
        }
    }
}

impl DirectionsConfig {
    /// Defaults overridden by `ORS_API_KEY`, `BUS_FOR_YOU_DIRECTIONS_URL` and
    /// `BUS_FOR_YOU_DIRECTIONS_PROFILE`.
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// Apply the same environment overrides on top of `self`.
    pub fn with_env(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(base_url) = lookup(DIRECTIONS_URL_ENV) {
            self.base_url = base_url;
        }
        if let Some(profile) = lookup(PROFILE_ENV) {
            self.profile = profile;
        }
        if let Some(api_key) = lookup(API_KEY_ENV) {
            self.api_key = Some(api_key);
        }
        self
    }
}

impl fmt::Debug for DirectionsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectionsConfig")
            .field("base_url", &self.base_url)
            .field("profile", &self.profile)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub zoom: u8,
    pub tile_url: String,
    pub subdomains: Vec<String>,
    /// CSS color name or `#rrggbb`
    pub route_color: String,
    pub route_weight: f32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            tile_url: DEFAULT_TILE_URL.to_owned(),
            subdomains: vec!["a".to_owned(), "b".to_owned(), "c".to_owned()],
            route_color: "blue".to_owned(),
            route_weight: 3.0,
        }
    }
}
