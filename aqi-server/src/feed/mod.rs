//! CPCB station feed: fetching and parsing.
//!
//! The Central Pollution Control Board publishes the latest readings of
//! every continuous monitoring station as one XML document, nested as
//! `AqIndex/Country/State/City/Station`. This module fetches that
//! document (over HTTP, or from a saved file for offline use) and
//! flattens it into [`StationRecord`](crate::domain::StationRecord)s.

mod client;
mod error;
mod file;
mod parse;
mod types;

use std::future::Future;

pub use client::{DEFAULT_FEED_URL, FeedClient, FeedClientConfig};
pub use error::FeedError;
pub use file::FileFeedSource;
pub use parse::{convert_station, flatten, parse_feed};
pub use types::{AirQualityIndexNode, AqIndex, CityNode, CountryNode, StateNode, StationNode};

/// Something that can produce the raw feed document.
///
/// This abstraction lets the cache be tested with counting stubs.
pub trait FeedSource: Send + Sync {
    /// Fetch the raw XML document.
    fn fetch(&self) -> impl Future<Output = Result<String, FeedError>> + Send;
}

/// The feed source selected at startup.
#[derive(Debug, Clone)]
pub enum FeedBackend {
    Http(FeedClient),
    File(FileFeedSource),
}

impl FeedSource for FeedBackend {
    async fn fetch(&self) -> Result<String, FeedError> {
        match self {
            FeedBackend::Http(client) => client.fetch().await,
            FeedBackend::File(file) => file.fetch().await,
        }
    }
}
