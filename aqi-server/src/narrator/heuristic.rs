//! Offline narrator built from fixed health rules of thumb.
//!
//! The PM2.5 estimate inverts the Indian National AQI breakpoints for
//! 24-hour PM2.5, and the cigarette figure uses the Berkeley Earth rule
//! that 22 µg/m³ of PM2.5 for a day is about one cigarette.

use crate::domain::AqiCategory;

use super::ImpactNarrator;
use super::error::NarrationError;

/// PM2.5 concentration (µg/m³) equivalent to one cigarette per day.
const PM25_PER_CIGARETTE: f64 = 22.0;

/// `(aqi_lo, aqi_hi, pm_lo, pm_hi)` for 24-hour PM2.5.
const PM25_BREAKPOINTS: [(f64, f64, f64, f64); 6] = [
    (0.0, 50.0, 0.0, 30.0),
    (50.0, 100.0, 30.0, 60.0),
    (100.0, 200.0, 60.0, 90.0),
    (200.0, 300.0, 90.0, 120.0),
    (300.0, 400.0, 120.0, 250.0),
    (400.0, 500.0, 250.0, 380.0),
];

/// Estimate the PM2.5 concentration behind an AQI value.
///
/// Values above 500 are extrapolated along the top segment.
pub fn estimate_pm25(aqi: u32) -> f64 {
    let aqi = f64::from(aqi);
    let (a_lo, a_hi, p_lo, p_hi) = PM25_BREAKPOINTS
        .iter()
        .copied()
        .find(|&(_, hi, _, _)| aqi <= hi)
        .unwrap_or(PM25_BREAKPOINTS[PM25_BREAKPOINTS.len() - 1]);

    p_lo + (aqi - a_lo) * (p_hi - p_lo) / (a_hi - a_lo)
}

/// Cigarettes per day equivalent to breathing air at this AQI, one decimal.
pub fn cigarette_equivalent(aqi: u32) -> f64 {
    (estimate_pm25(aqi) / PM25_PER_CIGARETTE * 10.0).round() / 10.0
}

fn outdoor_guideline(category: AqiCategory) -> &'static str {
    match category {
        AqiCategory::Good => "Outdoor time: no limits, open the windows",
        AqiCategory::Moderate => "Outdoor time: fine for most, sensitive people take breaks",
        AqiCategory::UnhealthyForSensitiveGroups => {
            "Outdoor time: under an hour for kids, elders and asthmatics"
        }
        AqiCategory::Unhealthy => "Outdoor time: keep strenuous exercise under 30 minutes",
        AqiCategory::VeryUnhealthy => "Outdoor time: avoid it, wear an N95 if you must go out",
        AqiCategory::Hazardous => "Outdoor time: none, stay in with the windows shut",
    }
}

fn comparison(category: AqiCategory) -> &'static str {
    match category {
        AqiCategory::Good => "Equivalent to: a walk in a hill-station forest",
        AqiCategory::Moderate => "Equivalent to: an afternoon beside a quiet city road",
        AqiCategory::UnhealthyForSensitiveGroups => {
            "Equivalent to: living next to a busy highway"
        }
        AqiCategory::Unhealthy => "Equivalent to: standing behind an idling bus for an hour",
        AqiCategory::VeryUnhealthy => "Equivalent to: burning incense all day in a closed room",
        AqiCategory::Hazardous => "Equivalent to: sitting beside a burning crop field",
    }
}

/// Deterministic narrator that needs no network access.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicNarrator;

impl HeuristicNarrator {
    pub fn new() -> Self {
        Self
    }

    /// The examples for an AQI value.
    pub fn examples(&self, aqi: u32) -> Vec<String> {
        let category = AqiCategory::from_aqi(aqi);
        let cigarettes = cigarette_equivalent(aqi);
        let unit = if cigarettes == 1.0 { "cigarette" } else { "cigarettes" };

        vec![
            format!("Cigarettes smoked (24hrs): {cigarettes:.1} {unit}"),
            outdoor_guideline(category).to_string(),
            comparison(category).to_string(),
        ]
    }
}

impl ImpactNarrator for HeuristicNarrator {
    async fn generate_impact_examples(
        &self,
        aqi: u32,
        _location: &str,
    ) -> Result<Vec<String>, NarrationError> {
        Ok(self.examples(aqi))
    }
}
