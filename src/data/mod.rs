//! Everything that talks to the imagery provider.
//!
//! - `google`: HTTP client and the `MapsApi` seam
//! - `geocode`: address → coordinate
//! - `planner`: which samples to request
//! - `fetch`: per-sample image download + decode

pub mod fetch;
pub mod geocode;
pub mod google;
pub mod planner;

pub use fetch::{FetchError, FetchFailure, fetch_all, fetch_frame, partition_frames};
pub use geocode::{GeocodeError, geocode};
pub use google::{GoogleMapsClient, MapsApi, ProviderError};
pub use planner::{Plan, plan};
