//! Domain types for the AQI lookup service.
//!
//! Stations and snapshots are produced by the feed parser and never
//! mutated afterwards; queries borrow them to build fresh results.

mod category;
mod request;
mod result;
mod station;

pub use category::AqiCategory;
pub use request::LocationRequest;
pub use result::{AqiResult, NearbyStation};
pub use station::{DirectoryEntry, FeedSnapshot, Places, StationRecord, display_name, normalize_place};
