//! Run configuration.
//!
//! Everything a run needs is collected into a `Settings` value up front (API key, endpoints,
//! output locations, planner knobs) and handed to the pipeline. Components never look at the
//! environment themselves.

use std::path::PathBuf;
use std::time::Duration;

use crate::domain::{LoopMode, ProbeCheck, StaleOutputPolicy, SweepKind};
use crate::error::AppError;

pub const API_KEY_VAR: &str = "MAPS_API_KEY";
pub const API_KEY_FALLBACK_VAR: &str = "GOOGLE_API_KEY";

pub const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
pub const STREET_VIEW_URL: &str = "https://maps.googleapis.com/maps/api/streetview";
pub const STREET_VIEW_METADATA_URL: &str = "https://maps.googleapis.com/maps/api/streetview/metadata";

pub const DEFAULT_OUTPUT: &str = "chronografy.gif";
pub const DEFAULT_SCRATCH_DIR: &str = "streetview_images";
pub const DEFAULT_FRAME_DELAY_MS: u64 = 1500;
pub const DEFAULT_FIRST_YEAR: i32 = 2007;
pub const DEFAULT_LAST_YEAR: i32 = 2023;
/// Provider placeholders ("no imagery here") are small; real photos at 640x480 are not.
pub const DEFAULT_PROBE_MIN_BYTES: usize = 10_000;
pub const DEFAULT_JITTER_STEPS: usize = 8;
pub const DEFAULT_JITTER_BOUND_DEG: f64 = 0.00005;
/// Upper limit for the jitter bound; anything larger is no longer "the same spot".
pub const MAX_JITTER_BOUND_DEG: f64 = 1.0;

/// Provider endpoints. Overridable so a proxy or a local stub can stand in for Google.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub geocode: String,
    pub street_view: String,
    pub street_view_metadata: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            geocode: GEOCODE_URL.to_string(),
            street_view: STREET_VIEW_URL.to_string(),
            street_view_metadata: STREET_VIEW_METADATA_URL.to_string(),
        }
    }
}

/// Requested image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn to_query_value(self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

impl Default for ImageSize {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

/// Sample planner knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanSettings {
    pub sweep: SweepKind,
    pub first_year: i32,
    pub last_year: i32,
    pub probe_check: ProbeCheck,
    pub probe_min_bytes: usize,
    pub jitter_steps: usize,
    pub jitter_bound_deg: f64,
    /// Seed for the jitter RNG. `None` draws from OS entropy.
    pub jitter_seed: Option<u64>,
    /// First synthetic year label for jitter frames (`start + i`). `None` leaves frames unlabeled.
    pub jitter_label_start: Option<i32>,
    pub pitch: i16,
}

impl Default for PlanSettings {
    fn default() -> Self {
        Self {
            sweep: SweepKind::Calendar,
            first_year: DEFAULT_FIRST_YEAR,
            last_year: DEFAULT_LAST_YEAR,
            probe_check: ProbeCheck::Bytes,
            probe_min_bytes: DEFAULT_PROBE_MIN_BYTES,
            jitter_steps: DEFAULT_JITTER_STEPS,
            jitter_bound_deg: DEFAULT_JITTER_BOUND_DEG,
            jitter_seed: None,
            jitter_label_start: None,
            pitch: 0,
        }
    }
}

/// A full run's configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub endpoints: Endpoints,
    pub image_size: ImageSize,
    pub plan: PlanSettings,
    pub annotate: bool,
    pub output_path: PathBuf,
    pub scratch_dir: PathBuf,
    pub frame_delay: Duration,
    pub loop_mode: LoopMode,
    pub stale_output: StaleOutputPolicy,
    pub manifest_path: Option<PathBuf>,
}

impl Settings {
    /// Defaults for everything except the key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoints: Endpoints::default(),
            image_size: ImageSize::default(),
            plan: PlanSettings::default(),
            annotate: true,
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            scratch_dir: PathBuf::from(DEFAULT_SCRATCH_DIR),
            frame_delay: Duration::from_millis(DEFAULT_FRAME_DELAY_MS),
            loop_mode: LoopMode::Forever,
            stale_output: StaleOutputPolicy::Remove,
            manifest_path: None,
        }
    }

    /// Load `.env` (if any) and read the API key from the environment.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_key = read_api_key(|name| std::env::var(name).ok())?;
        Ok(Self::with_api_key(api_key))
    }

    /// Reject settings that would make a run meaningless before any request is sent.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.plan.first_year > self.plan.last_year {
            return Err(AppError::config(format!(
                "Invalid year range {}..{}.",
                self.plan.first_year, self.plan.last_year
            )));
        }
        if !(1..=360).contains(&self.plan.jitter_steps) {
            return Err(AppError::config("Jitter steps must be between 1 and 360."));
        }
        if !(0.0..=MAX_JITTER_BOUND_DEG).contains(&self.plan.jitter_bound_deg) {
            return Err(AppError::config(format!(
                "Jitter bound must be between 0 and {MAX_JITTER_BOUND_DEG} degrees."
            )));
        }
        if !(-90..=90).contains(&self.plan.pitch) {
            return Err(AppError::config("Pitch must be between -90 and 90 degrees."));
        }
        if self.image_size.width == 0 || self.image_size.height == 0 {
            return Err(AppError::config("Image size must be non-zero."));
        }
        if self.frame_delay.is_zero() {
            return Err(AppError::config("Frame duration must be > 0."));
        }
        Ok(())
    }
}

fn read_api_key(lookup: impl Fn(&str) -> Option<String>) -> Result<String, AppError> {
    [API_KEY_VAR, API_KEY_FALLBACK_VAR]
        .iter()
        .filter_map(|name| lookup(name))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
        .ok_or_else(|| {
            AppError::config(format!(
                "Missing {API_KEY_VAR} (or {API_KEY_FALLBACK_VAR}) in environment (.env)."
            ))
        })
}
