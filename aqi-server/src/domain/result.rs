//! Query results.

use super::category::AqiCategory;
use super::station::StationRecord;

/// A complete answer to an AQI query.
///
/// Built fresh per query; there is no partially-filled variant.
#[derive(Debug, Clone, PartialEq)]
pub struct AqiResult {
    pub aqi: u32,
    pub category: AqiCategory,
    pub station_id: String,
    pub state_id: String,
    pub city_id: String,

    /// City id with underscores replaced by spaces.
    pub city_name: String,

    /// Reverse-geocoded place label, for coordinate queries where the
    /// geocoder answered.
    pub user_location_label: Option<String>,

    /// Distance to the station (1 decimal place), for coordinate queries.
    pub distance_km: Option<f64>,

    pub impact_examples: Vec<String>,

    /// Snapshot fetch time in IST, e.g. `03:45 PM`.
    pub fetched_at_label: String,

    pub predominant_parameter: Option<String>,

    /// Upstream "last updated" stamp for the station.
    pub station_updated_at: Option<String>,
}

/// A nearby station for the "stations near you" list.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyStation {
    pub state_id: String,
    pub city_id: String,
    pub station_id: String,
    pub city_name: String,
    pub aqi: u32,
    pub distance_km: f64,
}

impl NearbyStation {
    /// Build from a complete station and its distance from the query point.
    ///
    /// Returns `None` if the station has no AQI.
    pub fn from_station(station: &StationRecord, distance_km: f64) -> Option<Self> {
        Some(Self {
            state_id: station.state_id.clone(),
            city_id: station.city_id.clone(),
            station_id: station.id.clone(),
            city_name: station.city_name(),
            aqi: station.aqi?,
            distance_km,
        })
    }
}
