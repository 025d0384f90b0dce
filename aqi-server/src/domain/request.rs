//! Location requests: how a caller tells us where they are.

use std::fmt;

use crate::geo::is_valid_coordinate;

/// Where the user wants an AQI reading for.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationRequest {
    /// GPS or IP-derived coordinates.
    ByCoordinates { lat: f64, lon: f64 },

    /// Manual state → city → station selection.
    ByPath {
        state_id: String,
        city_id: String,
        station_id: String,
    },

    /// Free-text city name, e.g. `new_delhi` or `New Delhi`.
    ByCityName { name: String },
}

impl LocationRequest {
    pub fn coordinates(lat: f64, lon: f64) -> Self {
        LocationRequest::ByCoordinates { lat, lon }
    }

    pub fn path(
        state_id: impl Into<String>,
        city_id: impl Into<String>,
        station_id: impl Into<String>,
    ) -> Self {
        LocationRequest::ByPath {
            state_id: state_id.into(),
            city_id: city_id.into(),
            station_id: station_id.into(),
        }
    }

    pub fn city(name: impl Into<String>) -> Self {
        LocationRequest::ByCityName { name: name.into() }
    }

    /// Check the request is well-formed before touching the feed.
    ///
    /// Returns a description of the problem on failure.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            LocationRequest::ByCoordinates { lat, lon } => {
                if is_valid_coordinate(*lat, *lon) {
                    Ok(())
                } else {
                    Err(format!("coordinates out of range: {lat}, {lon}"))
                }
            }
            LocationRequest::ByPath {
                state_id,
                city_id,
                station_id,
            } => {
                if state_id.trim().is_empty()
                    || city_id.trim().is_empty()
                    || station_id.trim().is_empty()
                {
                    Err("state, city and station must all be provided".to_string())
                } else {
                    Ok(())
                }
            }
            LocationRequest::ByCityName { name } => {
                if name.trim().is_empty() {
                    Err("city name must not be empty".to_string())
                } else {
                    Ok(())
                }
            }
        }
    }

    pub fn is_coordinate_based(&self) -> bool {
        matches!(self, LocationRequest::ByCoordinates { .. })
    }
}

impl fmt::Display for LocationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationRequest::ByCoordinates { lat, lon } => write!(f, "({lat}, {lon})"),
            LocationRequest::ByPath {
                state_id,
                city_id,
                station_id,
            } => write!(f, "{state_id}/{city_id}/{station_id}"),
            LocationRequest::ByCityName { name } => write!(f, "city '{name}'"),
        }
    }
}
