//! Preset-driven filtering and highlight detection for party recruitment
//! listings.
//!
//! A [`Preset`](filter::Preset) is a user-authored predicate over listing
//! attributes. [`evaluate`](filter::evaluate()) decides whether one listing
//! is shown under the active preset and which highlight terms it matches.
//! [`PresetStore`](store::PresetStore) holds the presets and settings, and
//! [`ListingFeed`](feed::ListingFeed) applies the active preset to a live
//! stream of listings.

pub mod command;
pub mod domain;
pub mod feed;
pub mod filter;
pub mod gamedata;
pub mod metrics;
pub mod model;
pub mod notify;
pub mod store;
