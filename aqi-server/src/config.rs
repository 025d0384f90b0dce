//! Server configuration from environment.
//!
//! Every setting has a default, so the server starts with no environment at
//! all (live CPCB feed, public Nominatim, offline narrator). Unparseable
//! values are logged and replaced by the default.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::cache::{CacheConfig, StalePolicy};
use crate::feed::{DEFAULT_FEED_URL, FeedBackend, FeedClient, FeedClientConfig, FeedError, FileFeedSource};
use crate::geocode::{DEFAULT_GEOCODER_URL, GeocodeError, GeocoderBackend, NominatimClient, NominatimConfig};
use crate::narrator::{
    DEFAULT_NARRATOR_MODEL, DEFAULT_NARRATOR_URL, GenerativeConfig, GenerativeNarrator,
    HeuristicNarrator, NarrationError, NarratorBackend, PromptStyle,
};
use crate::service::ServiceConfig;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,

    pub feed_url: String,
    /// Serve this saved document instead of the live feed.
    pub feed_file: Option<PathBuf>,
    pub feed_timeout_secs: u64,
    pub cache_ttl: Duration,
    pub stale_policy: StalePolicy,

    pub geocoder_enabled: bool,
    pub geocoder_url: String,
    pub geocoder_timeout_secs: u64,

    /// Sent to the feed and the geocoder.
    pub user_agent: String,

    /// Without a key the offline narrator is used.
    pub gemini_api_key: Option<String>,
    pub narrator_url: String,
    pub narrator_model: String,
    pub narrator_style: PromptStyle,
    pub narrator_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let stale_policy = if parse_or(&get, "AQI_SERVE_STALE", false, parse_flag) {
            StalePolicy::ServeStale
        } else {
            StalePolicy::SurfaceError
        };

        let default_bind = SocketAddr::from(([127, 0, 0, 1], 3000));

        Self {
            bind_addr: parse_or(&get, "AQI_BIND_ADDR", default_bind, |s| s.parse().ok()),
            feed_url: get("AQI_FEED_URL").unwrap_or_else(|| DEFAULT_FEED_URL.to_string()),
            feed_file: get("AQI_FEED_FILE").map(PathBuf::from),
            feed_timeout_secs: parse_or(&get, "AQI_FEED_TIMEOUT_SECS", 10, parse_from_str),
            cache_ttl: Duration::from_secs(parse_or(
                &get,
                "AQI_CACHE_TTL_SECS",
                3600,
                parse_from_str,
            )),
            stale_policy,
            geocoder_enabled: parse_or(&get, "AQI_GEOCODER_ENABLED", true, parse_flag),
            geocoder_url: get("AQI_GEOCODER_URL").unwrap_or_else(|| DEFAULT_GEOCODER_URL.to_string()),
            geocoder_timeout_secs: parse_or(&get, "AQI_GEOCODER_TIMEOUT_SECS", 5, parse_from_str),
            user_agent: get("AQI_USER_AGENT")
                .unwrap_or_else(|| format!("aqi-server/{}", env!("CARGO_PKG_VERSION"))),
            gemini_api_key: get("GEMINI_API_KEY"),
            narrator_url: get("AQI_NARRATOR_URL").unwrap_or_else(|| DEFAULT_NARRATOR_URL.to_string()),
            narrator_model: get("AQI_NARRATOR_MODEL")
                .unwrap_or_else(|| DEFAULT_NARRATOR_MODEL.to_string()),
            narrator_style: parse_or(&get, "AQI_NARRATOR_STYLE", PromptStyle::default(), |s| {
                s.parse().ok()
            }),
            narrator_timeout_secs: parse_or(&get, "AQI_NARRATOR_TIMEOUT_SECS", 10, parse_from_str),
        }
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::default()
            .with_ttl(self.cache_ttl)
            .with_stale_policy(self.stale_policy)
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig::default()
            .with_geocode_timeout(Duration::from_secs(self.geocoder_timeout_secs))
            .with_narration_timeout(Duration::from_secs(self.narrator_timeout_secs))
    }

    pub fn feed_backend(&self) -> Result<FeedBackend, FeedError> {
        if let Some(path) = &self.feed_file {
            return Ok(FeedBackend::File(FileFeedSource::new(path)));
        }

        let config = FeedClientConfig::new(&self.user_agent)
            .with_url(&self.feed_url)
            .with_timeout(self.feed_timeout_secs);
        Ok(FeedBackend::Http(FeedClient::new(config)?))
    }

    pub fn geocoder_backend(&self) -> Result<GeocoderBackend, GeocodeError> {
        if !self.geocoder_enabled {
            return Ok(GeocoderBackend::Disabled);
        }

        let config = NominatimConfig::new(&self.user_agent)
            .with_base_url(&self.geocoder_url)
            .with_timeout(self.geocoder_timeout_secs);
        Ok(GeocoderBackend::Nominatim(NominatimClient::new(config)?))
    }

    pub fn narrator_backend(&self) -> Result<NarratorBackend, NarrationError> {
        let Some(api_key) = &self.gemini_api_key else {
            return Ok(NarratorBackend::Heuristic(HeuristicNarrator::new()));
        };

        let config = GenerativeConfig::new(api_key)
            .with_base_url(&self.narrator_url)
            .with_model(&self.narrator_model)
            .with_style(self.narrator_style)
            .with_timeout(self.narrator_timeout_secs);
        Ok(NarratorBackend::Generative(GenerativeNarrator::new(config)?))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse_from_str<T: FromStr>(s: &str) -> Option<T> {
    s.parse().ok()
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_or<T>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
    parse: impl Fn(&str) -> Option<T>,
) -> T {
    let Some(raw) = get(key) else {
        return default;
    };
    parse(&raw).unwrap_or_else(|| {
        warn!(key, value = %raw, "ignoring invalid setting, using default");
        default
    })
}
