//! Scratch storage for individual frames.
//!
//! Frames are written as PNG under the scratch directory and read back for encoding. Names are
//! derived from the sample position (and year, if any), so a later run overwrites an earlier
//! one's files instead of accumulating them.

use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::domain::Frame;
use crate::error::AppError;

pub fn frame_file_name(frame: &Frame) -> String {
    match frame.nominal_year {
        Some(year) => format!("street_{:02}_{year}.png", frame.sample_index),
        None => format!("street_{:02}.png", frame.sample_index),
    }
}

/// Write every frame to `dir` (created if missing) and return the paths in frame order.
pub fn save_frames(dir: &Path, frames: &[Frame]) -> Result<Vec<PathBuf>, AppError> {
    std::fs::create_dir_all(dir).map_err(|e| {
        AppError::io(format!("Failed to create scratch dir '{}': {e}", dir.display()))
    })?;

    let mut paths = Vec::with_capacity(frames.len());
    for frame in frames {
        let path = dir.join(frame_file_name(frame));
        frame
            .image
            .save_with_format(&path, image::ImageFormat::Png)
            .map_err(|e| AppError::io(format!("Failed to write frame '{}': {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "frame saved");
        paths.push(path);
    }
    Ok(paths)
}

pub fn load_frames(paths: &[PathBuf]) -> Result<Vec<RgbaImage>, AppError> {
    paths
        .iter()
        .map(|path| {
            image::open(path)
                .map(|img| img.to_rgba8())
                .map_err(|e| AppError::io(format!("Failed to read frame '{}': {e}", path.display())))
        })
        .collect()
}
