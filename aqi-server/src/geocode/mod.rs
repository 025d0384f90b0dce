//! Reverse geocoding of user coordinates.
//!
//! The label produced here ("Suburb, City, State") serves two purposes: it
//! is shown to the user as their location, and its city component is the
//! hint the locator uses to prefer a station in the user's own city.

mod client;
mod error;

use std::future::Future;

pub use client::{Address, DEFAULT_GEOCODER_URL, NominatimClient, NominatimConfig, build_label};
pub use error::GeocodeError;

/// Turns coordinates into a human-readable place label.
pub trait ReverseGeocoder: Send + Sync {
    fn reverse(&self, lat: f64, lon: f64)
    -> impl Future<Output = Result<String, GeocodeError>> + Send;
}

/// The geocoder selected at startup.
#[derive(Debug, Clone)]
pub enum GeocoderBackend {
    Nominatim(NominatimClient),
    /// Never resolves a place; coordinate queries use distance alone.
    Disabled,
}

impl ReverseGeocoder for GeocoderBackend {
    async fn reverse(&self, lat: f64, lon: f64) -> Result<String, GeocodeError> {
        match self {
            GeocoderBackend::Nominatim(client) => client.reverse(lat, lon).await,
            GeocoderBackend::Disabled => Err(GeocodeError::NoPlace { lat, lon }),
        }
    }
}
