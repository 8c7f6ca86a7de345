//! Read/write run manifest JSON files.
//!
//! A manifest records what a run asked for and what it got:
//! - the address and the coordinate it resolved to
//! - every planned sample, with whether it produced a frame
//! - the final outcome and output path

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{Coordinate, Sample, SweepKind};
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub tool: String,
    pub generated_at: String,
    pub address: String,
    pub coordinate: Option<Coordinate>,
    pub sweep: SweepKind,
    pub samples: Vec<SampleRecord>,
    pub outcome: ManifestOutcome,
    pub output: Option<PathBuf>,
    pub frames: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleRecord {
    pub index: usize,
    #[serde(flatten)]
    pub sample: Sample,
    pub fetched: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManifestOutcome {
    Generated,
    GeocodeFailed,
    NoImagery,
}

pub fn write_manifest_json(path: &Path, manifest: &RunManifest) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::io(format!("Failed to create manifest JSON '{}': {e}", path.display()))
    })?;
    serde_json::to_writer_pretty(file, manifest)
        .map_err(|e| AppError::io(format!("Failed to write manifest JSON: {e}")))?;
    Ok(())
}

pub fn read_manifest_json(path: &Path) -> Result<RunManifest, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::io(format!("Failed to open manifest JSON '{}': {e}", path.display()))
    })?;
    serde_json::from_reader(file).map_err(|e| AppError::io(format!("Invalid manifest JSON: {e}")))
}
