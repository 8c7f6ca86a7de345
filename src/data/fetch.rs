//! Per-sample imagery fetch and decode.
//!
//! Every sample is independent: a failed request or an undecodable payload produces a
//! `FetchError` for that sample only. `partition_frames` then splits the results so the drop is
//! explicit (and countable) instead of hidden in a loop body.

use crate::config::ImageSize;
use crate::data::google::{ImageRequest, MapsApi, ProviderError};
use crate::domain::{Frame, Sample};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("could not decode image: {0}")]
    Decode(String),
}

/// A sample that produced no frame, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchFailure {
    pub sample_index: usize,
    pub nominal_year: Option<i32>,
    pub reason: FetchError,
}

pub fn image_request(sample: &Sample, size: ImageSize) -> ImageRequest {
    ImageRequest {
        location: sample.location,
        size,
        heading: Some(sample.heading),
        pitch: Some(sample.pitch),
        timestamp: sample.timestamp_hint,
    }
}

/// Fetch and decode the imagery for one sample.
pub fn fetch_frame(
    api: &dyn MapsApi,
    sample_index: usize,
    sample: &Sample,
    size: ImageSize,
) -> Result<Frame, FetchError> {
    let bytes = api.street_view_image(&image_request(sample, size))?;
    let decoded = image::load_from_memory(&bytes).map_err(|e| FetchError::Decode(e.to_string()))?;
    Ok(Frame {
        sample_index,
        nominal_year: sample.nominal_year,
        image: decoded.to_rgba8(),
    })
}

/// One result per sample, in plan order. Never short-circuits.
pub fn fetch_all(
    api: &dyn MapsApi,
    samples: &[Sample],
    size: ImageSize,
) -> Vec<Result<Frame, FetchError>> {
    samples
        .iter()
        .enumerate()
        .map(|(idx, sample)| fetch_frame(api, idx, sample, size))
        .collect()
}

/// Split fetch results into usable frames (order preserved) and dropped samples.
pub fn partition_frames(
    samples: &[Sample],
    results: Vec<Result<Frame, FetchError>>,
) -> (Vec<Frame>, Vec<FetchFailure>) {
    let mut frames = Vec::with_capacity(results.len());
    let mut failures = Vec::new();

    for (idx, result) in results.into_iter().enumerate() {
        match result {
            Ok(frame) => frames.push(frame),
            Err(reason) => {
                let nominal_year = samples.get(idx).and_then(|s| s.nominal_year);
                tracing::warn!(sample = idx, year = ?nominal_year, error = %reason, "dropping sample");
                failures.push(FetchFailure {
                    sample_index: idx,
                    nominal_year,
                    reason,
                });
            }
        }
    }

    (frames, failures)
}
