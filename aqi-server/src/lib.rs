//! Indian air-quality lookup server.
//!
//! Answers "how bad is the air where I am?" from the CPCB station feed:
//! picks the monitoring station that best matches a location and frames
//! its reading with a few relatable impact examples.

pub mod cache;
pub mod config;
pub mod domain;
pub mod feed;
pub mod geo;
pub mod geocode;
pub mod locator;
pub mod narrator;
pub mod service;
pub mod web;
