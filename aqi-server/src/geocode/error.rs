//! Reverse geocoder error types.

/// Errors from the reverse geocoder.
///
/// These never reach the caller of an AQI query: a failed lookup only
/// means the station is picked by distance alone.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// Request did not complete within the configured timeout
    #[error("geocoder request timed out")]
    Timeout,

    /// Geocoder returned an error status
    #[error("geocoder returned status {status}")]
    Api { status: u16 },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// The response had no usable address components
    #[error("no place found at {lat}, {lon}")]
    NoPlace { lat: f64, lon: f64 },
}

impl From<reqwest::Error> for GeocodeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GeocodeError::Timeout
        } else {
            GeocodeError::Http(err)
        }
    }
}
