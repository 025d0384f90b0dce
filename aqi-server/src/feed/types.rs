//! CPCB feed DTOs.
//!
//! These types map directly onto the `AqIndex/Country/State/City/Station`
//! XML document. Attributes and child elements are both plain fields.
//! Every repeated level is a `Vec`, so a parent with a single child reads
//! as a one-element list and a parent with none reads as empty; nothing
//! above the parser ever sees the single-vs-many distinction.
//!
//! Numeric attributes stay as strings here: the feed uses values like
//! `NA` for missing readings, and the parser decides what is usable.

use serde::Deserialize;

/// Document root (`<AqIndex>`).
#[derive(Debug, Clone, Deserialize)]
pub struct AqIndex {
    #[serde(rename = "Country", default)]
    pub country: Option<CountryNode>,
}

/// `<Country id="India">`
#[derive(Debug, Clone, Deserialize)]
pub struct CountryNode {
    #[serde(rename = "State", default)]
    pub states: Vec<StateNode>,
}

/// `<State id="Uttar_Pradesh">`
#[derive(Debug, Clone, Deserialize)]
pub struct StateNode {
    #[serde(default)]
    pub id: String,

    #[serde(rename = "City", default)]
    pub cities: Vec<CityNode>,
}

/// `<City id="Noida">`
#[derive(Debug, Clone, Deserialize)]
pub struct CityNode {
    #[serde(default)]
    pub id: String,

    #[serde(rename = "Station", default)]
    pub stations: Vec<StationNode>,
}

/// `<Station id="..." lastupdate="..." latitude="..." longitude="...">`
#[derive(Debug, Clone, Deserialize)]
pub struct StationNode {
    #[serde(default)]
    pub id: String,

    /// e.g. `16-10-2026 14:00:00`
    #[serde(default)]
    pub lastupdate: Option<String>,

    #[serde(default)]
    pub latitude: Option<String>,

    #[serde(default)]
    pub longitude: Option<String>,

    #[serde(rename = "Air_Quality_Index", default)]
    pub air_quality_index: Option<AirQualityIndexNode>,
}

/// `<Air_Quality_Index Value="180" Predominant_Parameter="PM2.5"/>`
#[derive(Debug, Clone, Deserialize)]
pub struct AirQualityIndexNode {
    #[serde(rename = "Value", default)]
    pub value: Option<String>,

    #[serde(rename = "Predominant_Parameter", default)]
    pub predominant_parameter: Option<String>,
}
