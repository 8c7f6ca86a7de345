//! Shared domain types.
//!
//! These types flow through every stage of a run:
//!
//! - `Coordinate` is produced once by the geocoder
//! - `Sample`s are produced by the planner, in frame order
//! - `Frame`s are produced by the fetcher and consumed by the encoder

use std::fmt;

use clap::ValueEnum;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// A WGS84 latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Shift the coordinate by a delta in degrees on each axis.
    pub fn offset(self, d_lat: f64, d_lng: f64) -> Self {
        Self {
            lat: self.lat + d_lat,
            lng: self.lng + d_lng,
        }
    }

    /// `lat,lng` as the provider expects it in a `location` query parameter.
    pub fn to_query_value(self) -> String {
        format!("{},{}", self.lat, self.lng)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

/// One planned imagery request.
///
/// `nominal_year` is only a display label. `timestamp_hint` is what gets sent to the provider;
/// the jitter sweep labels frames without ever hinting a date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub location: Coordinate,
    /// Compass heading in whole degrees, `0..360`.
    pub heading: u16,
    pub pitch: i16,
    pub nominal_year: Option<i32>,
    pub timestamp_hint: Option<i32>,
}

impl Sample {
    /// A sample that faces north and requests imagery for `year`.
    pub fn for_year(location: Coordinate, year: i32, pitch: i16) -> Self {
        Self {
            location,
            heading: 0,
            pitch,
            nominal_year: Some(year),
            timestamp_hint: Some(year),
        }
    }
}

/// A decoded raster plus the label it was requested for.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Position of the originating sample in the plan.
    pub sample_index: usize,
    pub nominal_year: Option<i32>,
    pub image: RgbaImage,
}

/// Which planning policy to use for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SweepKind {
    /// Probe each year in range with a timestamp hint and keep real-looking responses.
    Calendar,
    /// Keep the years in range that match the capture date reported by the metadata endpoint.
    Metadata,
    /// Rotate the heading and perturb the location randomly; years are synthetic labels.
    Jitter,
}

impl SweepKind {
    pub fn display_name(self) -> &'static str {
        match self {
            SweepKind::Calendar => "calendar",
            SweepKind::Metadata => "metadata",
            SweepKind::Jitter => "jitter",
        }
    }
}

/// How many times the output animation plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LoopMode {
    Once,
    Forever,
}

/// What to do with a previous output file when a run produces no frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StaleOutputPolicy {
    /// Delete the previous animation so the output path never shows stale imagery.
    Remove,
    /// Leave whatever is at the output path untouched.
    Keep,
}

/// How calendar-sweep probe responses are judged to be real photos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProbeCheck {
    /// Accept payloads strictly larger than `--probe-min-bytes`.
    Bytes,
    /// Accept payloads that decode as an image.
    Decode,
}
