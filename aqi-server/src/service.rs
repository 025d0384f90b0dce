//! AQI query service.
//!
//! Orchestrates one query end to end: validate the request, take the current
//! feed snapshot, reverse geocode (coordinate queries only), pick a station,
//! narrate the reading and assemble the result. Any failing step aborts the
//! query with an [`AqiError`]; the only step allowed to fail quietly is
//! reverse geocoding, which merely loses the place hint.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::time::timeout;
use tracing::{info, warn};

use crate::cache::FeedCache;
use crate::domain::{
    AqiCategory, AqiResult, DirectoryEntry, FeedSnapshot, LocationRequest, NearbyStation,
};
use crate::feed::{FeedError, FeedSource};
use crate::geo::is_valid_coordinate;
use crate::geocode::ReverseGeocoder;
use crate::locator::{DEFAULT_NEARBY_COUNT, k_nearest, locate};
use crate::narrator::{ImpactNarrator, NarrationError};

/// Indian Standard Time, UTC+05:30.
const IST_OFFSET_SECS: i64 = 5 * 3600 + 30 * 60;

/// Error from an AQI query.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AqiError {
    /// The feed could not be fetched and no usable snapshot exists
    #[error("air quality feed unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The feed was fetched but is not a station document
    #[error("air quality feed is malformed: {0}")]
    MalformedFeed(String),

    /// No station matches the request
    #[error("no station found for {0}")]
    StationNotFound(String),

    /// The matched station has no current reading
    #[error("station {station_id} has no current AQI reading")]
    AqiUnavailable { station_id: String },

    /// Impact examples could not be produced
    #[error("could not generate impact examples: {0}")]
    NarrationFailed(String),

    /// The request itself is invalid
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl AqiError {
    /// Stable tag for API clients.
    pub fn kind(&self) -> &'static str {
        match self {
            AqiError::UpstreamUnavailable(_) => "upstream_unavailable",
            AqiError::MalformedFeed(_) => "malformed_feed",
            AqiError::StationNotFound(_) => "station_not_found",
            AqiError::AqiUnavailable { .. } => "aqi_unavailable",
            AqiError::NarrationFailed(_) => "narration_failed",
            AqiError::InvalidRequest(_) => "invalid_request",
        }
    }
}

impl From<FeedError> for AqiError {
    fn from(e: FeedError) -> Self {
        if e.is_malformed() {
            AqiError::MalformedFeed(e.to_string())
        } else {
            AqiError::UpstreamUnavailable(e.to_string())
        }
    }
}

impl From<NarrationError> for AqiError {
    fn from(e: NarrationError) -> Self {
        AqiError::NarrationFailed(e.to_string())
    }
}

/// Configuration for the query service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Upper bound on reverse geocoding; past it the query goes on without
    /// a place hint.
    pub geocode_timeout: Duration,

    /// Upper bound on narration; past it the query fails.
    pub narration_timeout: Duration,

    /// Length of the "stations near you" list.
    pub nearby_count: usize,
}

impl ServiceConfig {
    pub fn with_geocode_timeout(mut self, timeout: Duration) -> Self {
        self.geocode_timeout = timeout;
        self
    }

    pub fn with_narration_timeout(mut self, timeout: Duration) -> Self {
        self.narration_timeout = timeout;
        self
    }

    pub fn with_nearby_count(mut self, n: usize) -> Self {
        self.nearby_count = n;
        self
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            geocode_timeout: Duration::from_secs(5),
            narration_timeout: Duration::from_secs(10),
            nearby_count: DEFAULT_NEARBY_COUNT,
        }
    }
}

/// Format a fetch time as IST wall-clock time, e.g. `03:45 PM`.
pub fn ist_label(at: DateTime<Utc>) -> String {
    (at.naive_utc() + TimeDelta::seconds(IST_OFFSET_SECS))
        .format("%I:%M %p")
        .to_string()
}

/// The public query surface.
pub struct AqiService<S, G, N> {
    cache: FeedCache<S>,
    geocoder: G,
    narrator: N,
    config: ServiceConfig,
}

impl<S, G, N> AqiService<S, G, N>
where
    S: FeedSource,
    G: ReverseGeocoder,
    N: ImpactNarrator,
{
    pub fn new(cache: FeedCache<S>, geocoder: G, narrator: N, config: ServiceConfig) -> Self {
        Self {
            cache,
            geocoder,
            narrator,
            config,
        }
    }

    pub fn cache(&self) -> &FeedCache<S> {
        &self.cache
    }

    async fn snapshot(&self) -> Result<Arc<FeedSnapshot>, AqiError> {
        Ok(self.cache.snapshot().await?)
    }

    /// All states in the feed, sorted by name.
    pub async fn get_states(&self) -> Result<Vec<DirectoryEntry>, AqiError> {
        Ok(self.snapshot().await?.states())
    }

    /// Cities of a state. Empty for an unknown state.
    pub async fn get_cities(&self, state_id: &str) -> Result<Vec<DirectoryEntry>, AqiError> {
        Ok(self.snapshot().await?.cities(state_id))
    }

    /// Stations of a city, including those without a current reading.
    pub async fn get_stations(
        &self,
        state_id: &str,
        city_id: &str,
    ) -> Result<Vec<DirectoryEntry>, AqiError> {
        Ok(self.snapshot().await?.stations_in(state_id, city_id))
    }

    /// The closest stations with readings, nearest first.
    pub async fn get_nearest_stations(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<Vec<NearbyStation>, AqiError> {
        if !is_valid_coordinate(lat, lon) {
            return Err(AqiError::InvalidRequest(format!(
                "coordinates out of range: {lat}, {lon}"
            )));
        }

        let snapshot = self.snapshot().await?;
        Ok(k_nearest(&snapshot, lat, lon, self.config.nearby_count))
    }

    /// Answer an AQI query.
    pub async fn get_aqi_data(&self, request: &LocationRequest) -> Result<AqiResult, AqiError> {
        request.validate().map_err(AqiError::InvalidRequest)?;

        let snapshot = self.snapshot().await?;

        let place = match request {
            LocationRequest::ByCoordinates { lat, lon } => self.place_label(*lat, *lon).await,
            _ => None,
        };

        let found = locate(&snapshot, request, place.as_deref())
            .ok_or_else(|| AqiError::StationNotFound(request.to_string()))?;
        let station = found.station;

        let aqi = station.aqi.ok_or_else(|| AqiError::AqiUnavailable {
            station_id: station.id.clone(),
        })?;

        let city_name = station.city_name();
        let location = place.clone().unwrap_or_else(|| city_name.clone());
        let impact_examples = self.narrate(aqi, &location).await?;

        info!(
            station = %station.id,
            city = %station.city_id,
            aqi,
            method = ?found.method,
            "aqi query answered"
        );

        Ok(AqiResult {
            aqi,
            category: AqiCategory::from_aqi(aqi),
            station_id: station.id.clone(),
            state_id: station.state_id.clone(),
            city_id: station.city_id.clone(),
            city_name,
            user_location_label: place,
            distance_km: found.distance_km,
            impact_examples,
            fetched_at_label: ist_label(snapshot.fetched_at),
            predominant_parameter: station.predominant_parameter.clone(),
            station_updated_at: station.last_update.clone(),
        })
    }

    /// Reverse geocode, treating failure and timeout as "no hint".
    async fn place_label(&self, lat: f64, lon: f64) -> Option<String> {
        match timeout(self.config.geocode_timeout, self.geocoder.reverse(lat, lon)).await {
            Ok(Ok(label)) => Some(label),
            Ok(Err(e)) => {
                warn!(error = %e, lat, lon, "reverse geocoding failed");
                None
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.config.geocode_timeout.as_millis() as u64,
                    "reverse geocoding timed out"
                );
                None
            }
        }
    }

    async fn narrate(&self, aqi: u32, location: &str) -> Result<Vec<String>, AqiError> {
        let result = timeout(
            self.config.narration_timeout,
            self.narrator.generate_impact_examples(aqi, location),
        )
        .await
        .unwrap_or(Err(NarrationError::Timeout));

        result.map_err(|e| {
            warn!(error = %e, aqi, location, "impact narration failed");
            AqiError::from(e)
        })
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
