//! Station matching.
//!
//! Picks exactly one station for a location request:
//!
//! - **Path** requests match `(state, city, station)` exactly, including
//!   stations whose readings are missing.
//! - **City name** requests match the city case- and underscore-
//!   insensitively; the first station in feed order with a reading wins.
//! - **Coordinate** requests first try the city named by the reverse-geocoded
//!   place (within [`CITY_MATCH_RADIUS_KM`]), then fall back to the nearest
//!   station with a reading.
//!
//! The city-name phase exists because the nearest station is sometimes filed
//! under a neighbouring district even when a same-city station is only a
//! little farther away. It is a heuristic: substring matching on names.
//!
//! Feed order is controlled upstream, so which of several equally good
//! stations wins can change between refreshes, but is stable for a given
//! snapshot.

use tracing::debug;

use crate::domain::{FeedSnapshot, LocationRequest, NearbyStation, StationRecord, normalize_place};
use crate::geo::{distance_km, round_km};

/// Maximum distance for a city-name match to be accepted.
pub const CITY_MATCH_RADIUS_KM: f64 = 50.0;

/// Number of stations in the "stations near you" list.
pub const DEFAULT_NEARBY_COUNT: usize = 3;

/// A located station.
#[derive(Debug, Clone, PartialEq)]
pub struct StationMatch<'a> {
    pub station: &'a StationRecord,

    /// Distance from the query point, rounded to 0.1 km. Only set for
    /// coordinate requests.
    pub distance_km: Option<f64>,

    pub method: MatchMethod,
}

/// Which rule selected the station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMethod {
    Path,
    CityName,
    /// Coordinate request resolved by the reverse-geocoded city.
    PlaceCity,
    /// Coordinate request resolved by straight distance.
    Nearest,
}

/// Find the best station for `request`.
///
/// `place_hint` is the reverse-geocoded label for coordinate requests; it
/// is ignored for the other kinds. Returns `None` when nothing matches.
pub fn locate<'a>(
    snapshot: &'a FeedSnapshot,
    request: &LocationRequest,
    place_hint: Option<&str>,
) -> Option<StationMatch<'a>> {
    match request {
        LocationRequest::ByPath {
            state_id,
            city_id,
            station_id,
        } => find_by_path(snapshot, state_id, city_id, station_id).map(|station| StationMatch {
            station,
            distance_km: None,
            method: MatchMethod::Path,
        }),
        LocationRequest::ByCityName { name } => {
            find_by_city_name(snapshot, name).map(|station| StationMatch {
                station,
                distance_km: None,
                method: MatchMethod::CityName,
            })
        }
        LocationRequest::ByCoordinates { lat, lon } => {
            let by_place = place_hint
                .and_then(city_token)
                .and_then(|token| find_in_place_city(snapshot, *lat, *lon, &token));

            if let Some((station, distance)) = by_place {
                debug!(station = %station.id, distance, "matched by place city");
                return Some(StationMatch {
                    station,
                    distance_km: Some(round_km(distance)),
                    method: MatchMethod::PlaceCity,
                });
            }

            let (station, distance) = find_nearest(snapshot, *lat, *lon)?;
            debug!(station = %station.id, distance, "matched by distance");
            Some(StationMatch {
                station,
                distance_km: Some(round_km(distance)),
                method: MatchMethod::Nearest,
            })
        }
    }
}

/// Exact identity lookup. Stations with missing readings are included.
pub fn find_by_path<'a>(
    snapshot: &'a FeedSnapshot,
    state_id: &str,
    city_id: &str,
    station_id: &str,
) -> Option<&'a StationRecord> {
    snapshot
        .stations
        .iter()
        .find(|s| s.has_path(state_id, city_id, station_id))
}

/// First station of the named city, preferring ones with a reading.
///
/// If the city exists but none of its stations has a reading, its first
/// station is returned so the caller can report the reading as unavailable
/// rather than the city as unknown.
pub fn find_by_city_name<'a>(snapshot: &'a FeedSnapshot, name: &str) -> Option<&'a StationRecord> {
    let wanted = normalize_place(name);
    if wanted.is_empty() {
        return None;
    }

    let mut in_city = snapshot
        .stations
        .iter()
        .filter(|s| normalize_place(&s.city_id) == wanted);

    let first = in_city.next()?;
    if first.aqi.is_some() {
        return Some(first);
    }
    Some(in_city.find(|s| s.aqi.is_some()).unwrap_or(first))
}

/// First complete station, in feed order, whose city name contains or is
/// contained by `token` and which lies within [`CITY_MATCH_RADIUS_KM`].
fn find_in_place_city<'a>(
    snapshot: &'a FeedSnapshot,
    lat: f64,
    lon: f64,
    token: &str,
) -> Option<(&'a StationRecord, f64)> {
    let token = normalize_place(token);
    if token.is_empty() {
        return None;
    }

    snapshot.complete_stations().find_map(|station| {
        let city = normalize_place(&station.city_id);
        if city.is_empty() || !(city.contains(&token) || token.contains(&city)) {
            return None;
        }
        let (slat, slon) = station.coordinates()?;
        let distance = distance_km(lat, lon, slat, slon);
        (distance <= CITY_MATCH_RADIUS_KM).then_some((station, distance))
    })
}

/// Closest complete station. Ties go to the first in feed order.
pub fn find_nearest(snapshot: &FeedSnapshot, lat: f64, lon: f64) -> Option<(&StationRecord, f64)> {
    let mut best: Option<(&StationRecord, f64)> = None;

    for station in snapshot.complete_stations() {
        let Some((slat, slon)) = station.coordinates() else {
            continue;
        };
        let distance = distance_km(lat, lon, slat, slon);
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((station, distance));
        }
    }

    best
}

/// The `k` closest complete stations, nearest first.
///
/// Ties keep feed order. Distances are rounded to 0.1 km.
pub fn k_nearest(snapshot: &FeedSnapshot, lat: f64, lon: f64, k: usize) -> Vec<NearbyStation> {
    let mut candidates: Vec<(&StationRecord, f64)> = snapshot
        .complete_stations()
        .filter_map(|s| {
            let (slat, slon) = s.coordinates()?;
            Some((s, distance_km(lat, lon, slat, slon)))
        })
        .collect();

    // Stable sort: equal distances stay in feed order
    candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

    candidates
        .into_iter()
        .take(k)
        .filter_map(|(s, d)| NearbyStation::from_station(s, round_km(d)))
        .collect()
}

/// Extract the city part of a place label.
///
/// Labels are built as `neighbourhood, city, state` with absent parts
/// skipped, so the city is the second-to-last part of a three-part label
/// and the first part of a two-part one.
///
/// ```
/// use aqi_server::locator::city_token;
///
/// assert_eq!(city_token("Connaught Place, New Delhi, Delhi").as_deref(), Some("New Delhi"));
/// assert_eq!(city_token("Pune, Maharashtra").as_deref(), Some("Pune"));
/// assert_eq!(city_token("Kochi").as_deref(), Some("Kochi"));
/// assert_eq!(city_token(" , ").as_deref(), None);
/// ```
pub fn city_token(label: &str) -> Option<String> {
    let parts: Vec<&str> = label
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let token = match parts.len() {
        0 => return None,
        1 | 2 => parts[0],
        n => parts[n - 2],
    };
    Some(token.to_string())
}
