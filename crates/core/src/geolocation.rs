//! One-shot device position.
//!
//! The device API lives in the host (browser, Android, iOS). The page only asks
//! for a single reading through [`Geolocator`] and never retries.

use std::future::Future;
use std::pin::Pin;

use crate::coordinates::LatLng;

/// Failure codes reported by device geolocation APIs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum GeolocationErrorCode {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("geolocation failed ({code}): {message}")]
pub struct GeolocationError {
    pub code: GeolocationErrorCode,
    pub message: String,
}

impl GeolocationError {
    pub fn new(code: GeolocationErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Source of a single position reading
pub trait Geolocator: Send + Sync {
    fn current_position<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<LatLng, GeolocationError>> + Send + 'a>>;
}

/// A reading that was taken elsewhere and handed to the page.
///
/// Mobile hosts read the device API themselves and report the outcome; the
/// command line takes it from flags.
#[derive(Clone, Debug)]
pub struct FixedGeolocator {
    reading: Result<LatLng, GeolocationError>,
}

impl FixedGeolocator {
    pub fn at(position: LatLng) -> Self {
        Self {
            reading: Ok(position),
        }
    }

    pub fn failing(error: GeolocationError) -> Self {
        Self {
            reading: Err(error),
        }
    }
}

impl Geolocator for FixedGeolocator {
    fn current_position<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<LatLng, GeolocationError>> + Send + 'a>> {
        let reading = self.reading.clone();
        Box::pin(async move { reading })
    }
}
