//! Command-line parsing for the street-level timeline generator.
//!
//! The goal of this module is to keep **argument parsing** separate from the pipeline: every
//! flag here lands in a `config::Settings` field before a run starts.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::config::{
    DEFAULT_FIRST_YEAR, DEFAULT_FRAME_DELAY_MS, DEFAULT_JITTER_BOUND_DEG, DEFAULT_JITTER_STEPS,
    DEFAULT_LAST_YEAR, DEFAULT_OUTPUT, DEFAULT_PROBE_MIN_BYTES, DEFAULT_SCRATCH_DIR, Settings,
};
use crate::domain::{LoopMode, ProbeCheck, StaleOutputPolicy, SweepKind};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "chronografy",
    version,
    about = "Turn street-level imagery of an address into an animated GIF"
)]
pub struct Cli {
    /// More log output (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Geocode, plan, fetch and encode the animation.
    Generate(RunArgs),
    /// Geocode and print the sample plan without fetching frames.
    Plan(RunArgs),
    /// Resolve an address and print its coordinate.
    Geocode(GeocodeArgs),
}

#[derive(Debug, Args, Clone)]
pub struct GeocodeArgs {
    /// Free-text address (quote it, or pass it as several words).
    #[arg(required = true, num_args = 1..)]
    pub address: Vec<String>,

    /// Geocoding endpoint.
    #[arg(long, value_name = "URL")]
    pub geocode_url: Option<String>,
}

impl GeocodeArgs {
    pub fn address(&self) -> String {
        self.address.join(" ")
    }
}

/// Options shared by `generate` and `plan`.
#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// Free-text address (quote it, or pass it as several words).
    #[arg(required = true, num_args = 1..)]
    pub address: Vec<String>,

    /// Sample planning policy.
    #[arg(short, long, value_enum, default_value_t = SweepKind::Calendar)]
    pub sweep: SweepKind,

    /// First candidate year (calendar/metadata sweeps).
    #[arg(long = "from", default_value_t = DEFAULT_FIRST_YEAR)]
    pub first_year: i32,

    /// Last candidate year, inclusive (calendar/metadata sweeps).
    #[arg(long = "to", default_value_t = DEFAULT_LAST_YEAR)]
    pub last_year: i32,

    /// How calendar probes are judged to be real photos.
    #[arg(long, value_enum, default_value_t = ProbeCheck::Bytes)]
    pub probe_check: ProbeCheck,

    /// Minimum probe payload size for `--probe-check bytes` (exclusive).
    #[arg(long, default_value_t = DEFAULT_PROBE_MIN_BYTES)]
    pub probe_min_bytes: usize,

    /// Number of jitter samples (1-360).
    #[arg(long, default_value_t = DEFAULT_JITTER_STEPS)]
    pub steps: usize,

    /// Maximum jitter offset per axis, in degrees.
    #[arg(long, default_value_t = DEFAULT_JITTER_BOUND_DEG)]
    pub jitter_bound: f64,

    /// Seed for the jitter sweep (omit for a different plan every run).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Label jitter frames with sequential years starting here.
    #[arg(long, value_name = "YEAR")]
    pub label_start: Option<i32>,

    /// Camera pitch in degrees (-90..90).
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub pitch: i16,

    /// Output animation path (overwritten every run).
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Directory for per-frame scratch images.
    #[arg(long, default_value = DEFAULT_SCRATCH_DIR)]
    pub scratch_dir: PathBuf,

    /// Display time per frame, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_FRAME_DELAY_MS)]
    pub frame_ms: u64,

    /// Play the animation once or loop forever.
    #[arg(long = "loop", value_enum, default_value_t = LoopMode::Forever)]
    pub loop_mode: LoopMode,

    /// What to do with an earlier animation when this run yields no frames.
    #[arg(long, value_enum, default_value_t = StaleOutputPolicy::Remove)]
    pub stale_output: StaleOutputPolicy,

    /// Do not draw year labels on frames.
    #[arg(long)]
    pub no_labels: bool,

    /// Write a JSON manifest of the run.
    #[arg(long, value_name = "JSON")]
    pub manifest: Option<PathBuf>,

    /// Geocoding endpoint.
    #[arg(long, value_name = "URL")]
    pub geocode_url: Option<String>,

    /// Street View Static endpoint.
    #[arg(long, value_name = "URL")]
    pub street_view_url: Option<String>,

    /// Street View metadata endpoint.
    #[arg(long, value_name = "URL")]
    pub metadata_url: Option<String>,
}

impl RunArgs {
    pub fn address(&self) -> String {
        self.address.join(" ")
    }

    /// Overlay these flags onto `settings` (which already carries the API key).
    pub fn apply(&self, settings: &mut Settings) {
        let plan = &mut settings.plan;
        plan.sweep = self.sweep;
        plan.first_year = self.first_year;
        plan.last_year = self.last_year;
        plan.probe_check = self.probe_check;
        plan.probe_min_bytes = self.probe_min_bytes;
        plan.jitter_steps = self.steps;
        plan.jitter_bound_deg = self.jitter_bound;
        plan.jitter_seed = self.seed;
        plan.jitter_label_start = self.label_start;
        plan.pitch = self.pitch;

        settings.annotate = !self.no_labels;
        settings.output_path = self.output.clone();
        settings.scratch_dir = self.scratch_dir.clone();
        settings.frame_delay = Duration::from_millis(self.frame_ms);
        settings.loop_mode = self.loop_mode;
        settings.stale_output = self.stale_output;
        settings.manifest_path = self.manifest.clone();

        if let Some(url) = &self.geocode_url {
            settings.endpoints.geocode = url.clone();
        }
        if let Some(url) = &self.street_view_url {
            settings.endpoints.street_view = url.clone();
        }
        if let Some(url) = &self.metadata_url {
            settings.endpoints.street_view_metadata = url.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(argv: &[&str]) -> RunArgs {
        match Cli::parse_from(argv).command {
            Command::Generate(args) | Command::Plan(args) => args,
            Command::Geocode(_) => panic!("expected a run subcommand"),
        }
    }

    #[test]
    fn multi_word_address_is_joined() {
        let args = run_args(&["chronografy", "generate", "Avenida", "Paulista,", "1000"]);
        assert_eq!(args.address(), "Avenida Paulista, 1000");
    }

    #[test]
    fn defaults_match_settings_defaults() {
        let args = run_args(&["chronografy", "generate", "x"]);
        let mut settings = Settings::with_api_key("k");
        let before = settings.clone();
        args.apply(&mut settings);
        assert_eq!(settings.plan, before.plan);
        assert_eq!(settings.output_path, before.output_path);
        assert_eq!(settings.frame_delay, before.frame_delay);
        assert_eq!(settings.endpoints, before.endpoints);
        assert!(settings.annotate);
    }

    #[test]
    fn flags_override_settings() {
        let args = run_args(&[
            "chronografy", "plan", "x", "--sweep", "jitter", "--steps", "10", "--seed", "7",
            "--label-start", "2015", "--pitch", "-5", "--loop", "once", "--stale-output", "keep",
            "--no-labels", "--frame-ms", "800",
        ]);
        let mut settings = Settings::with_api_key("k");
        args.apply(&mut settings);
        assert_eq!(settings.plan.sweep, SweepKind::Jitter);
        assert_eq!(settings.plan.jitter_steps, 10);
        assert_eq!(settings.plan.jitter_seed, Some(7));
        assert_eq!(settings.plan.jitter_label_start, Some(2015));
        assert_eq!(settings.plan.pitch, -5);
        assert_eq!(settings.loop_mode, LoopMode::Once);
        assert_eq!(settings.stale_output, StaleOutputPolicy::Keep);
        assert!(!settings.annotate);
        assert_eq!(settings.frame_delay, Duration::from_millis(800));
    }
}
