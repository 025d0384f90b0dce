//! Application state for the web layer.

use std::sync::Arc;

use crate::feed::FeedBackend;
use crate::geocode::GeocoderBackend;
use crate::narrator::NarratorBackend;
use crate::service::AqiService;

/// The query service with the backends chosen at startup.
pub type LiveService = AqiService<FeedBackend, GeocoderBackend, NarratorBackend>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<LiveService>,
}

impl AppState {
    pub fn new(service: LiveService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}
