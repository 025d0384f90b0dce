//! Conversion from feed DTOs to station records.
//!
//! Flattens the state → city → station tree into a list in feed order.
//! Stations whose numeric fields do not parse are kept with those fields
//! unset, so a manual path lookup can still find them and report the
//! reading as unavailable rather than the station as missing.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::domain::{FeedSnapshot, Places, StationRecord};

use super::error::FeedError;
use super::types::{AqIndex, StationNode};

/// Parse a raw feed document into a snapshot stamped with `fetched_at`.
pub fn parse_feed(xml: &str, fetched_at: DateTime<Utc>) -> Result<FeedSnapshot, FeedError> {
    let doc: AqIndex = serde_xml_rs::from_str(xml)
        .map_err(|e| FeedError::malformed(format!("invalid XML: {e}")))?;

    let (stations, places) = flatten(&doc)?;
    let complete = stations.iter().filter(|s| s.is_complete()).count();
    debug!(
        stations = stations.len(),
        complete, "parsed station feed"
    );

    Ok(FeedSnapshot::new(stations, fetched_at).with_places(places))
}

/// Flatten a parsed document into station records, plus every state and
/// city seen in the tree (including ones without stations).
///
/// Fails if the document has no `Country` or no `State` entries.
pub fn flatten(doc: &AqIndex) -> Result<(Vec<StationRecord>, Places), FeedError> {
    let country = doc
        .country
        .as_ref()
        .ok_or_else(|| FeedError::malformed("missing Country element"))?;

    if country.states.is_empty() {
        return Err(FeedError::malformed("missing State collection"));
    }

    let mut records = Vec::new();
    let mut places = Places::default();

    for state in &country.states {
        if state.id.is_empty() {
            warn!("skipping state without id");
            continue;
        }
        places.add_state(&state.id);
        for city in &state.cities {
            if city.id.is_empty() {
                warn!(state = %state.id, "skipping city without id");
                continue;
            }
            places.add_city(&state.id, &city.id);
            for station in &city.stations {
                if station.id.is_empty() {
                    warn!(state = %state.id, city = %city.id, "skipping station without id");
                    continue;
                }
                records.push(convert_station(station, &state.id, &city.id));
            }
        }
    }

    Ok((records, places))
}

/// Convert a single station node, tagging it with its owning state and city.
pub fn convert_station(node: &StationNode, state_id: &str, city_id: &str) -> StationRecord {
    let aqi_node = node.air_quality_index.as_ref();

    let latitude = parse_coordinate(node.latitude.as_deref()).filter(|v| v.abs() <= 90.0);
    let longitude = parse_coordinate(node.longitude.as_deref()).filter(|v| v.abs() <= 180.0);
    let aqi = parse_aqi(aqi_node.and_then(|n| n.value.as_deref()));

    if aqi.is_none() {
        debug!(station = %node.id, "station has no usable AQI value");
    }

    StationRecord {
        id: node.id.clone(),
        state_id: state_id.to_string(),
        city_id: city_id.to_string(),
        latitude,
        longitude,
        aqi,
        predominant_parameter: aqi_node
            .and_then(|n| n.predominant_parameter.as_deref())
            .map(str::trim)
            .filter(|p| !p.is_empty() && !p.eq_ignore_ascii_case("NA"))
            .map(str::to_string),
        last_update: node
            .lastupdate
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    }
}

/// Parse a decimal-degree coordinate. Non-finite values are rejected.
fn parse_coordinate(raw: Option<&str>) -> Option<f64> {
    raw?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse an AQI value using its leading integer digits.
///
/// `"180"`, `" 180 "` and `"180.6"` all give 180. Values with no leading
/// digits (`"NA"`, `""`, `"-5"`) are rejected.
fn parse_aqi(raw: Option<&str>) -> Option<u32> {
    let trimmed = raw?.trim();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    trimmed[..digits_end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> Result<FeedSnapshot, FeedError> {
        parse_feed(xml, Utc::now())
    }

    const SINGLE_STATION_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<AqIndex>
  <Country id="India">
    <State id="Bihar">
      <City id="Patna">
        <Station id="Rajbansi Nagar, Patna - BSPCB" lastupdate="16-10-2026 14:00:00" latitude="25.592" longitude="85.110">
          <Pollutant_Index id="PM2.5" Min="90" Max="210" Avg="160" Hourly_sub_index="160"/>
          <Pollutant_Index id="PM10" Min="100" Max="190" Avg="140" Hourly_sub_index="120"/>
          <Air_Quality_Index Value="160" Predominant_Parameter="PM2.5"/>
        </Station>
      </City>
    </State>
  </Country>
</AqIndex>"#;

    const MIXED_FEED: &str = r#"<AqIndex>
  <Country id="India">
    <State id="Delhi">
      <City id="Delhi">
        <Station id="A" latitude="28.6" longitude="77.2">
          <Air_Quality_Index Value="180" Predominant_Parameter="PM10"/>
        </Station>
        <Station id="B" latitude="28.7" longitude="77.3">
          <Air_Quality_Index Value="N/A" Predominant_Parameter="NA"/>
        </Station>
        <Station id="C" latitude="NA" longitude="77.3">
          <Air_Quality_Index Value="95"/>
        </Station>
      </City>
      <City id="New_Delhi">
        <Station id="D" latitude="28.61" longitude="77.23"/>
      </City>
    </State>
    <State id="Uttar_Pradesh">
      <City id="Noida">
        <Station id="E" latitude="28.57" longitude="77.32">
          <Air_Quality_Index Value="210.7"/>
        </Station>
      </City>
    </State>
  </Country>
</AqIndex>"#;

    #[test]
    fn single_child_at_every_level_gives_one_record() {
        let snapshot = parse(SINGLE_STATION_FEED).unwrap();
        assert_eq!(snapshot.len(), 1);

        let station = &snapshot.stations[0];
        assert_eq!(station.id, "Rajbansi Nagar, Patna - BSPCB");
        assert_eq!(station.state_id, "Bihar");
        assert_eq!(station.city_id, "Patna");
        assert_eq!(station.latitude, Some(25.592));
        assert_eq!(station.longitude, Some(85.110));
        assert_eq!(station.aqi, Some(160));
        assert_eq!(station.predominant_parameter.as_deref(), Some("PM2.5"));
        assert_eq!(station.last_update.as_deref(), Some("16-10-2026 14:00:00"));
    }

    #[test]
    fn flattens_in_feed_order_with_owners() {
        let snapshot = parse(MIXED_FEED).unwrap();
        let ids: Vec<&str> = snapshot.stations.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C", "D", "E"]);

        assert_eq!(snapshot.stations[3].city_id, "New_Delhi");
        assert_eq!(snapshot.stations[4].state_id, "Uttar_Pradesh");
        assert_eq!(snapshot.stations[4].city_id, "Noida");
    }

    #[test]
    fn incomplete_stations_are_kept() {
        let snapshot = parse(MIXED_FEED).unwrap();

        let b = &snapshot.stations[1];
        assert_eq!(b.aqi, None);
        assert!(b.has_coordinates());
        assert!(!b.is_complete());
        assert_eq!(b.predominant_parameter, None);

        let c = &snapshot.stations[2];
        assert_eq!(c.latitude, None);
        assert_eq!(c.aqi, Some(95));
        assert!(!c.is_complete());

        let d = &snapshot.stations[3];
        assert_eq!(d.aqi, None);

        assert_eq!(snapshot.complete_stations().count(), 2);
    }

    #[test]
    fn states_and_cities_without_stations_are_listed() {
        let xml = r#"<AqIndex>
  <Country id="India">
    <State id="Goa">
      <City id="Panaji"></City>
    </State>
    <State id="Delhi">
      <City id="Delhi">
        <Station id="A" latitude="28.6" longitude="77.2">
          <Air_Quality_Index Value="180"/>
        </Station>
      </City>
      <City id="New_Delhi"></City>
    </State>
    <State id="Sikkim"></State>
  </Country>
</AqIndex>"#;
        let snapshot = parse(xml).unwrap();
        assert_eq!(snapshot.len(), 1);

        let states: Vec<String> = snapshot.states().into_iter().map(|e| e.id).collect();
        assert_eq!(states, vec!["Delhi", "Goa", "Sikkim"]);
        let cities: Vec<String> = snapshot.cities("Delhi").into_iter().map(|e| e.id).collect();
        assert_eq!(cities, vec!["Delhi", "New_Delhi"]);
        assert_eq!(snapshot.cities("Goa").len(), 1);
        assert!(snapshot.cities("Sikkim").is_empty());
    }

    #[test]
    fn fractional_aqi_truncates() {
        let snapshot = parse(MIXED_FEED).unwrap();
        assert_eq!(snapshot.stations[4].aqi, Some(210));
    }

    #[test]
    fn missing_states_is_malformed() {
        let err = parse(r#"<AqIndex><Country id="India"></Country></AqIndex>"#).unwrap_err();
        assert!(err.is_malformed());

        let err = parse("<AqIndex></AqIndex>").unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn invalid_xml_is_malformed() {
        let err = parse("<AqIndex><Country>").unwrap_err();
        assert!(err.is_malformed());

        let err = parse("not xml at all").unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn parse_aqi_values() {
        assert_eq!(parse_aqi(Some("180")), Some(180));
        assert_eq!(parse_aqi(Some(" 42 ")), Some(42));
        assert_eq!(parse_aqi(Some("180.6")), Some(180));
        assert_eq!(parse_aqi(Some("+7")), Some(7));
        assert_eq!(parse_aqi(Some("NA")), None);
        assert_eq!(parse_aqi(Some("N/A")), None);
        assert_eq!(parse_aqi(Some("")), None);
        assert_eq!(parse_aqi(Some("-5")), None);
        assert_eq!(parse_aqi(None), None);
    }

    #[test]
    fn parse_coordinate_values() {
        assert_eq!(parse_coordinate(Some("28.6139")), Some(28.6139));
        assert_eq!(parse_coordinate(Some(" 77.2 ")), Some(77.2));
        assert_eq!(parse_coordinate(Some("NA")), None);
        assert_eq!(parse_coordinate(Some("inf")), None);
        assert_eq!(parse_coordinate(None), None);
    }

    #[test]
    fn out_of_range_coordinates_are_dropped() {
        let node = StationNode {
            id: "X".into(),
            lastupdate: None,
            latitude: Some("128.0".into()),
            longitude: Some("77.0".into()),
            air_quality_index: None,
        };
        let record = convert_station(&node, "S", "C");
        assert_eq!(record.latitude, None);
        assert_eq!(record.longitude, Some(77.0));
    }
}
