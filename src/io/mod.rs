//! Filesystem helpers.
//!
//! - per-frame scratch files (`scratch`)
//! - stale output handling (`output`)
//! - run manifest JSON (`manifest`)

pub mod manifest;
pub mod output;
pub mod scratch;

pub use manifest::*;
pub use output::*;
pub use scratch::*;
