//! Nominatim reverse geocoding client.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use super::ReverseGeocoder;
use super::error::GeocodeError;

/// Default base URL of the public Nominatim instance.
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";

const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Configuration for the Nominatim client.
#[derive(Debug, Clone)]
pub struct NominatimConfig {
    /// Base URL (the `/reverse` path is appended)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header; Nominatim's usage policy requires one
    pub user_agent: String,
}

impl NominatimConfig {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_GEOCODER_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: user_agent.into(),
        }
    }

    /// Set a custom base URL (self-hosted instance or tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// The `address` object of a Nominatim response.
///
/// Only the components used in labels are kept.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Address {
    pub suburb: Option<String>,
    pub neighbourhood: Option<String>,
    pub residential: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub municipality: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: Option<Address>,
}

/// Build a "Neighbourhood, City, State" label, skipping absent parts.
///
/// Returns `None` when no component is present.
pub fn build_label(address: &Address) -> Option<String> {
    fn first<'a>(options: &[&'a Option<String>]) -> Option<&'a str> {
        options
            .iter()
            .filter_map(|o| o.as_deref())
            .map(str::trim)
            .find(|s| !s.is_empty())
    }

    let neighbourhood = first(&[&address.suburb, &address.neighbourhood, &address.residential]);
    let city = first(&[
        &address.city,
        &address.town,
        &address.village,
        &address.municipality,
    ]);
    let state = first(&[&address.state]);

    let parts: Vec<&str> = [neighbourhood, city, state].into_iter().flatten().collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

/// Nominatim reverse geocoder.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    http: reqwest::Client,
    base_url: String,
}

impl NominatimClient {
    pub fn new(config: NominatimConfig) -> Result<Self, GeocodeError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Look up the address components at a point.
    pub async fn lookup(&self, lat: f64, lon: f64) -> Result<Address, GeocodeError> {
        let url = format!("{}/reverse", self.base_url);
        debug!(lat, lon, "reverse geocoding");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("format", "json".to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Api {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let parsed: ReverseResponse =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Json {
                message: e.to_string(),
            })?;

        parsed.address.ok_or(GeocodeError::NoPlace { lat, lon })
    }
}

impl ReverseGeocoder for NominatimClient {
    async fn reverse(&self, lat: f64, lon: f64) -> Result<String, GeocodeError> {
        let address = self.lookup(lat, lon).await?;
        build_label(&address).ok_or(GeocodeError::NoPlace { lat, lon })
    }
}
