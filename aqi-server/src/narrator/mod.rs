//! Relatable impact examples for an AQI reading.
//!
//! A raw index like 262 means little to most people, so each result carries
//! a few short lines such as "Cigarettes smoked (24hrs): 6.1 cigarettes".
//! Two backends produce them: a generative model behind an HTTP API, and an
//! offline heuristic that needs no network.

mod error;
mod generative;
mod heuristic;

use std::future::Future;

pub use error::NarrationError;
pub use generative::{
    DEFAULT_NARRATOR_MODEL, DEFAULT_NARRATOR_URL, GenerativeConfig, GenerativeNarrator,
    PromptStyle, extract_examples,
};
pub use heuristic::{HeuristicNarrator, cigarette_equivalent, estimate_pm25};

/// Produces impact examples for an AQI value at a named place.
pub trait ImpactNarrator: Send + Sync {
    fn generate_impact_examples(
        &self,
        aqi: u32,
        location: &str,
    ) -> impl Future<Output = Result<Vec<String>, NarrationError>> + Send;
}

/// The narrator selected at startup.
#[derive(Debug, Clone)]
pub enum NarratorBackend {
    Generative(GenerativeNarrator),
    Heuristic(HeuristicNarrator),
}

impl ImpactNarrator for NarratorBackend {
    async fn generate_impact_examples(
        &self,
        aqi: u32,
        location: &str,
    ) -> Result<Vec<String>, NarrationError> {
        match self {
            NarratorBackend::Generative(n) => n.generate_impact_examples(aqi, location).await,
            NarratorBackend::Heuristic(n) => n.generate_impact_examples(aqi, location).await,
        }
    }
}
