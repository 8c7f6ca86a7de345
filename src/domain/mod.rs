//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the geometry of a request (`Coordinate`, `Sample`)
//! - decoded frames (`Frame`)
//! - configuration enums (`SweepKind`, `LoopMode`, `StaleOutputPolicy`, `ProbeCheck`)

pub mod types;

pub use types::*;
