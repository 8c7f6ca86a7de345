//! Frame post-processing and animation output.

pub mod annotate;
pub mod encode;

pub use annotate::{Annotator, LabelOutcome};
pub use encode::{EncodeError, encode_animation};
