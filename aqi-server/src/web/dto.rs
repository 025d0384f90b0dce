//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{AqiCategory, AqiResult, DirectoryEntry, LocationRequest, NearbyStation};

/// Query string of `GET /api/aqi`.
///
/// Forms, in precedence order: `lat`+`lon`, `state`+`city`+`station`, then
/// any query carrying `city`, which becomes a city-name search. Numbers are
/// taken as strings so that bad input produces the same JSON error as every
/// other invalid request.
#[derive(Debug, Default, Deserialize)]
pub struct AqiQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub station: Option<String>,
}

impl AqiQuery {
    /// Interpret the query as a location request.
    pub fn into_request(self) -> Result<LocationRequest, String> {
        if self.lat.is_some() || self.lon.is_some() {
            let (lat, lon) = parse_lat_lon(self.lat.as_deref(), self.lon.as_deref())?;
            return Ok(LocationRequest::coordinates(lat, lon));
        }

        match (self.state, self.city, self.station) {
            (Some(state), Some(city), Some(station)) => {
                Ok(LocationRequest::path(state, city, station))
            }
            (_, Some(city), _) => Ok(LocationRequest::city(city)),
            (None, None, None) => {
                Err("provide lat and lon, state, city and station, or city".to_string())
            }
            _ => Err("a station lookup needs state, city and station".to_string()),
        }
    }
}

/// Query string of `GET /api/stations/nearest`.
#[derive(Debug, Default, Deserialize)]
pub struct NearestQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

impl NearestQuery {
    pub fn coordinates(&self) -> Result<(f64, f64), String> {
        parse_lat_lon(self.lat.as_deref(), self.lon.as_deref())
    }
}

fn parse_lat_lon(lat: Option<&str>, lon: Option<&str>) -> Result<(f64, f64), String> {
    let (Some(lat), Some(lon)) = (lat, lon) else {
        return Err("lat and lon must be given together".to_string());
    };
    let parse = |name: &str, value: &str| {
        value
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("{name} is not a number: {value}"))
    };
    Ok((parse("lat", lat)?, parse("lon", lon)?))
}

/// AQI band with display colours.
#[derive(Debug, Serialize)]
pub struct CategoryDto {
    pub key: AqiCategory,
    pub label: &'static str,
    pub color: &'static str,
    pub text_color: &'static str,
}

impl From<AqiCategory> for CategoryDto {
    fn from(category: AqiCategory) -> Self {
        Self {
            key: category,
            label: category.label(),
            color: category.color(),
            text_color: category.text_color(),
        }
    }
}

/// Response of `GET /api/aqi`.
#[derive(Debug, Serialize)]
pub struct AqiResponse {
    pub aqi: u32,
    pub category: CategoryDto,
    pub station_id: String,
    pub state_id: String,
    pub city_id: String,
    pub city_name: String,
    pub user_location_label: Option<String>,
    pub distance_km: Option<f64>,
    pub impact_examples: Vec<String>,

    /// Feed fetch time in IST
    pub fetched_at: String,

    pub predominant_parameter: Option<String>,
    pub station_updated_at: Option<String>,
}

impl From<AqiResult> for AqiResponse {
    fn from(r: AqiResult) -> Self {
        Self {
            aqi: r.aqi,
            category: r.category.into(),
            station_id: r.station_id,
            state_id: r.state_id,
            city_id: r.city_id,
            city_name: r.city_name,
            user_location_label: r.user_location_label,
            distance_km: r.distance_km,
            impact_examples: r.impact_examples,
            fetched_at: r.fetched_at_label,
            predominant_parameter: r.predominant_parameter,
            station_updated_at: r.station_updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NearbyStationDto {
    pub state_id: String,
    pub city_id: String,
    pub station_id: String,
    pub city_name: String,
    pub aqi: u32,
    pub category: CategoryDto,
    pub distance_km: f64,
}

impl From<NearbyStation> for NearbyStationDto {
    fn from(n: NearbyStation) -> Self {
        Self {
            category: AqiCategory::from_aqi(n.aqi).into(),
            state_id: n.state_id,
            city_id: n.city_id,
            station_id: n.station_id,
            city_name: n.city_name,
            aqi: n.aqi,
            distance_km: n.distance_km,
        }
    }
}

/// Response of `GET /api/stations/nearest`.
#[derive(Debug, Serialize)]
pub struct NearbyResponse {
    pub stations: Vec<NearbyStationDto>,
}

/// Response of `GET /api/states`.
#[derive(Debug, Serialize)]
pub struct StatesResponse {
    pub states: Vec<DirectoryEntry>,
}

/// Response of `GET /api/states/{state}/cities`.
#[derive(Debug, Serialize)]
pub struct CitiesResponse {
    pub state: String,
    pub cities: Vec<DirectoryEntry>,
}

/// Response of `GET /api/states/{state}/cities/{city}/stations`.
#[derive(Debug, Serialize)]
pub struct StationsResponse {
    pub state: String,
    pub city: String,
    pub stations: Vec<DirectoryEntry>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
}
