//! Station records and feed snapshots.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Human-readable form of a feed identifier.
///
/// The feed uses underscores in place of spaces for state and city ids.
///
/// # Examples
///
/// ```
/// use aqi_server::domain::display_name;
///
/// assert_eq!(display_name("Uttar_Pradesh"), "Uttar Pradesh");
/// assert_eq!(display_name("Delhi"), "Delhi");
/// ```
pub fn display_name(id: &str) -> String {
    id.replace('_', " ")
}

/// Normalize a place name for comparison: underscores become spaces,
/// surrounding whitespace is trimmed and the result is lowercased.
pub fn normalize_place(name: &str) -> String {
    name.replace('_', " ").trim().to_lowercase()
}

/// A single monitoring station parsed from one feed `<Station>` node.
///
/// Numeric fields that failed to parse are `None`. Such stations are still
/// reachable by exact path lookup but never take part in distance matching.
#[derive(Debug, Clone, PartialEq)]
pub struct StationRecord {
    /// Station id (the feed uses the full station name as its id).
    pub id: String,

    /// Owning state id, e.g. `Uttar_Pradesh`.
    pub state_id: String,

    /// Owning city id, e.g. `New_Delhi`.
    pub city_id: String,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    /// Current AQI value.
    pub aqi: Option<u32>,

    /// Pollutant driving the AQI (e.g. `PM2.5`).
    pub predominant_parameter: Option<String>,

    /// Upstream "last updated" stamp, verbatim.
    pub last_update: Option<String>,
}

impl StationRecord {
    /// Create a record with only its identity set.
    pub fn new(
        state_id: impl Into<String>,
        city_id: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            state_id: state_id.into(),
            city_id: city_id.into(),
            latitude: None,
            longitude: None,
            aqi: None,
            predominant_parameter: None,
            last_update: None,
        }
    }

    /// Returns `(latitude, longitude)` if both parsed.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }

    pub fn has_coordinates(&self) -> bool {
        self.coordinates().is_some()
    }

    /// Whether the station can take part in distance-based matching:
    /// it has coordinates and a valid AQI.
    pub fn is_complete(&self) -> bool {
        self.has_coordinates() && self.aqi.is_some()
    }

    /// Whether this station has the given `(state, city, station)` identity.
    pub fn has_path(&self, state_id: &str, city_id: &str, station_id: &str) -> bool {
        self.state_id == state_id && self.city_id == city_id && self.id == station_id
    }

    /// City id with underscores replaced by spaces.
    pub fn city_name(&self) -> String {
        display_name(&self.city_id)
    }
}

/// An id/name pair for the manual state → city → station picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    pub id: String,
    pub name: String,
}

impl DirectoryEntry {
    fn from_id(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: display_name(id),
        }
    }
}

/// State and city ids as they appear in the feed tree, in feed order.
///
/// Unlike the station list, this keeps states and cities that currently
/// carry no stations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Places {
    pub states: Vec<String>,
    /// `(state_id, city_id)` pairs.
    pub cities: Vec<(String, String)>,
}

impl Places {
    /// Places derived from station owners alone.
    pub fn from_stations(stations: &[StationRecord]) -> Self {
        let mut places = Self::default();
        for s in stations {
            places.add_state(&s.state_id);
            places.add_city(&s.state_id, &s.city_id);
        }
        places
    }

    pub fn add_state(&mut self, state_id: &str) {
        if !self.states.iter().any(|s| s == state_id) {
            self.states.push(state_id.to_string());
        }
    }

    pub fn add_city(&mut self, state_id: &str, city_id: &str) {
        if !self
            .cities
            .iter()
            .any(|(s, c)| s == state_id && c == city_id)
        {
            self.cities.push((state_id.to_string(), city_id.to_string()));
        }
    }
}

/// All stations from one successful feed fetch.
///
/// Snapshots are never mutated; a refresh replaces the whole snapshot.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    /// Stations in upstream feed order.
    pub stations: Vec<StationRecord>,

    /// Every state and city in the feed, for the picker lists.
    pub places: Places,

    /// When the feed was fetched.
    pub fetched_at: DateTime<Utc>,
}

impl FeedSnapshot {
    pub fn new(stations: Vec<StationRecord>, fetched_at: DateTime<Utc>) -> Self {
        let places = Places::from_stations(&stations);
        Self {
            stations,
            places,
            fetched_at,
        }
    }

    /// Replace the picker places, e.g. with ones read from the full feed tree.
    pub fn with_places(mut self, places: Places) -> Self {
        self.places = places;
        self
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Stations usable for distance matching, in feed order.
    pub fn complete_stations(&self) -> impl Iterator<Item = &StationRecord> {
        self.stations.iter().filter(|s| s.is_complete())
    }

    /// States present in the feed, sorted by display name.
    pub fn states(&self) -> Vec<DirectoryEntry> {
        sorted_entries(self.places.states.iter().map(String::as_str))
    }

    /// Cities of a state, sorted by display name. Empty for unknown states.
    pub fn cities(&self, state_id: &str) -> Vec<DirectoryEntry> {
        sorted_entries(
            self.places
                .cities
                .iter()
                .filter(|(s, _)| s == state_id)
                .map(|(_, c)| c.as_str()),
        )
    }

    /// Stations of a city, sorted by name. Includes stations with missing
    /// readings so they can still be picked by path.
    pub fn stations_in(&self, state_id: &str, city_id: &str) -> Vec<DirectoryEntry> {
        let mut entries: Vec<DirectoryEntry> = self
            .stations
            .iter()
            .filter(|s| s.state_id == state_id && s.city_id == city_id)
            .map(|s| DirectoryEntry {
                id: s.id.clone(),
                name: s.id.clone(),
            })
            .collect();
        sort_entries(&mut entries);
        entries
    }
}

/// Deduplicate ids (first occurrence wins) and sort them by display name.
fn sorted_entries<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<DirectoryEntry> {
    let mut seen = HashSet::new();
    let mut entries: Vec<DirectoryEntry> = ids
        .filter(|id| seen.insert(*id))
        .map(DirectoryEntry::from_id)
        .collect();
    sort_entries(&mut entries);
    entries
}

fn sort_entries(entries: &mut [DirectoryEntry]) {
    entries.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(state: &str, city: &str, id: &str) -> StationRecord {
        StationRecord::new(state, city, id)
    }

    fn snapshot(stations: Vec<StationRecord>) -> FeedSnapshot {
        FeedSnapshot::new(stations, Utc::now())
    }

    #[test]
    fn normalize_place_handles_case_and_underscores() {
        assert_eq!(normalize_place("New_Delhi"), "new delhi");
        assert_eq!(normalize_place("  NEW delhi "), "new delhi");
        assert_eq!(normalize_place("new_delhi"), normalize_place("New_Delhi"));
    }

    #[test]
    fn completeness() {
        let mut s = station("Delhi", "Delhi", "ITO");
        assert!(!s.has_coordinates());
        assert!(!s.is_complete());

        s.latitude = Some(28.6);
        s.longitude = Some(77.2);
        assert!(s.has_coordinates());
        assert!(!s.is_complete());

        s.aqi = Some(180);
        assert!(s.is_complete());
        assert_eq!(s.coordinates(), Some((28.6, 77.2)));
    }

    #[test]
    fn has_path_requires_all_three() {
        let s = station("Delhi", "Delhi", "ITO");
        assert!(s.has_path("Delhi", "Delhi", "ITO"));
        assert!(!s.has_path("Haryana", "Delhi", "ITO"));
        assert!(!s.has_path("Delhi", "Gurugram", "ITO"));
        assert!(!s.has_path("Delhi", "Delhi", "Anand Vihar"));
    }

    #[test]
    fn states_are_unique_and_sorted() {
        let snap = snapshot(vec![
            station("Uttar_Pradesh", "Noida", "A"),
            station("Delhi", "Delhi", "B"),
            station("Uttar_Pradesh", "Agra", "C"),
            station("bihar", "Patna", "D"),
        ]);

        let states = snap.states();
        let names: Vec<&str> = states.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["bihar", "Delhi", "Uttar Pradesh"]);
        assert_eq!(states[2].id, "Uttar_Pradesh");
    }

    #[test]
    fn cities_filtered_by_state() {
        let snap = snapshot(vec![
            station("Uttar_Pradesh", "Noida", "A"),
            station("Delhi", "Delhi", "B"),
            station("Uttar_Pradesh", "Agra", "C"),
            station("Uttar_Pradesh", "Noida", "E"),
        ]);

        let cities = snap.cities("Uttar_Pradesh");
        let ids: Vec<&str> = cities.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["Agra", "Noida"]);
        assert!(snap.cities("Kerala").is_empty());
    }

    #[test]
    fn stations_in_city_include_incomplete() {
        let mut complete = station("Delhi", "Delhi", "Wazirpur");
        complete.latitude = Some(28.7);
        complete.longitude = Some(77.1);
        complete.aqi = Some(200);

        let snap = snapshot(vec![
            complete,
            station("Delhi", "Delhi", "Anand Vihar"),
            station("Haryana", "Delhi", "Elsewhere"),
        ]);

        let stations = snap.stations_in("Delhi", "Delhi");
        let ids: Vec<&str> = stations.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["Anand Vihar", "Wazirpur"]);
        assert_eq!(snap.complete_stations().count(), 1);
    }

    #[test]
    fn places_without_stations_are_listed() {
        let mut places = Places::from_stations(&[station("Delhi", "Delhi", "B")]);
        places.add_state("Goa");
        places.add_city("Delhi", "New_Delhi");
        places.add_city("Goa", "Panaji");
        places.add_city("Delhi", "Delhi");

        let snap = snapshot(vec![station("Delhi", "Delhi", "B")]).with_places(places);

        let states: Vec<String> = snap.states().into_iter().map(|e| e.id).collect();
        assert_eq!(states, vec!["Delhi", "Goa"]);
        let cities: Vec<String> = snap.cities("Delhi").into_iter().map(|e| e.id).collect();
        assert_eq!(cities, vec!["Delhi", "New_Delhi"]);
        assert_eq!(snap.cities("Goa")[0].name, "Panaji");
        assert!(snap.stations_in("Goa", "Panaji").is_empty());
    }
}
