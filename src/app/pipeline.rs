//! Shared run logic used by the CLI subcommands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! geocode -> plan -> fetch (+ annotate) -> encode
//!
//! A run moves through `Idle → Geocoding → Planning → Fetching(n) → Encoding → Done`, or ends
//! in `Aborted` from `Geocoding` (address did not resolve) or `Fetching` (no usable frames).
//! Nothing carries over between runs.

use std::path::PathBuf;

use crate::app::notify::{Notice, Notifier};
use crate::config::Settings;
use crate::data::fetch::{FetchFailure, fetch_all, partition_frames};
use crate::data::geocode::{GeocodeError, geocode};
use crate::data::google::MapsApi;
use crate::data::planner::{Plan, plan};
use crate::domain::{Coordinate, Frame};
use crate::error::AppError;
use crate::io::{
    ManifestOutcome, RunManifest, SampleRecord, clear_stale_output, load_frames, save_frames,
    write_manifest_json,
};
use crate::render::{Annotator, EncodeError, encode_animation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Geocoding,
    Planning,
    /// Fetching the given number of planned samples.
    Fetching(usize),
    Encoding,
    Done,
    Aborted,
}

/// The finished animation.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub path: PathBuf,
    pub frames: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AbortReason {
    Geocode(GeocodeError),
    /// The plan was empty, or every planned sample failed.
    NoImagery { planned: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Generated(Animation),
    Aborted(AbortReason),
}

/// Everything a run produced, for reporting and manifests.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub address: String,
    pub coordinate: Option<Coordinate>,
    pub plan: Option<Plan>,
    pub failures: Vec<FetchFailure>,
    pub outcome: RunOutcome,
}

impl RunReport {
    pub fn animation(&self) -> Option<&Animation> {
        match &self.outcome {
            RunOutcome::Generated(anim) => Some(anim),
            RunOutcome::Aborted(_) => None,
        }
    }
}

pub struct Pipeline<'a> {
    api: &'a dyn MapsApi,
    settings: &'a Settings,
    annotator: Annotator,
    stage: Stage,
}

impl<'a> Pipeline<'a> {
    pub fn new(api: &'a dyn MapsApi, settings: &'a Settings, annotator: Annotator) -> Self {
        Self {
            api,
            settings,
            annotator,
            stage: Stage::Idle,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn enter(&mut self, stage: Stage) {
        tracing::info!(from = ?self.stage, to = ?stage, "stage");
        self.stage = stage;
    }

    /// Geocode and plan only; no frames are fetched.
    pub fn plan_for(
        &mut self,
        address: &str,
        notifier: &dyn Notifier,
    ) -> Result<(Coordinate, Plan), GeocodeError> {
        self.stage = Stage::Idle;
        let location = self.resolve(address, notifier)?;
        self.enter(Stage::Planning);
        let plan = plan(self.api, location, &self.settings.plan, self.settings.image_size);
        self.enter(Stage::Done);
        Ok((location, plan))
    }

    /// Execute a full run for `address`.
    ///
    /// Aborted runs are reported through `notifier` and returned as `RunOutcome::Aborted`;
    /// only filesystem and encoding failures come back as `Err`.
    pub fn run(&mut self, address: &str, notifier: &dyn Notifier) -> Result<RunReport, AppError> {
        self.stage = Stage::Idle;

        let location = match self.resolve(address, notifier) {
            Ok(location) => location,
            Err(e) => {
                let report = RunReport {
                    address: address.to_string(),
                    coordinate: None,
                    plan: None,
                    failures: Vec::new(),
                    outcome: RunOutcome::Aborted(AbortReason::Geocode(e)),
                };
                self.write_manifest(&report)?;
                return Ok(report);
            }
        };

        self.enter(Stage::Planning);
        let plan = plan(self.api, location, &self.settings.plan, self.settings.image_size);

        self.enter(Stage::Fetching(plan.len()));
        let results = fetch_all(self.api, &plan.samples, self.settings.image_size);
        let (mut frames, failures) = partition_frames(&plan.samples, results);

        if frames.is_empty() {
            self.enter(Stage::Aborted);
            clear_stale_output(&self.settings.output_path, self.settings.stale_output)?;
            notifier.notify(Notice::Warning(
                "No imagery available to build an animation.".to_string(),
            ));
            let report = RunReport {
                address: address.to_string(),
                coordinate: Some(location),
                outcome: RunOutcome::Aborted(AbortReason::NoImagery {
                    planned: plan.len(),
                }),
                plan: Some(plan),
                failures,
            };
            self.write_manifest(&report)?;
            return Ok(report);
        }

        if self.settings.annotate {
            for frame in &mut frames {
                self.annotator.annotate(&mut frame.image, frame.nominal_year);
            }
        }

        self.enter(Stage::Encoding);
        let animation = self.encode(&frames)?;

        self.enter(Stage::Done);
        notifier.notify(Notice::Success(format!(
            "Animation with {} frame(s) written to {}.",
            animation.frames,
            animation.path.display()
        )));
        notifier.show_animation(&animation.path);

        let report = RunReport {
            address: address.to_string(),
            coordinate: Some(location),
            plan: Some(plan),
            failures,
            outcome: RunOutcome::Generated(animation),
        };
        self.write_manifest(&report)?;
        Ok(report)
    }

    fn resolve(&mut self, address: &str, notifier: &dyn Notifier) -> Result<Coordinate, GeocodeError> {
        self.enter(Stage::Geocoding);
        geocode(self.api, address).inspect_err(|e| {
            self.stage = Stage::Aborted;
            tracing::warn!(error = %e, "geocoding failed");
            notifier.notify(Notice::Error(format!("Could not resolve address: {e}.")));
        })
    }

    fn encode(&self, frames: &[Frame]) -> Result<Animation, AppError> {
        let paths = save_frames(&self.settings.scratch_dir, frames)?;
        let images = load_frames(&paths)?;
        let path = self.settings.output_path.clone();
        let count = encode_animation(
            &images,
            &path,
            self.settings.frame_delay,
            self.settings.loop_mode,
        )
        .map_err(|e| match e {
            EncodeError::Empty => AppError::no_output("No frames to encode."),
            other => AppError::io(format!("Failed to encode animation: {other}")),
        })?;
        Ok(Animation {
            path,
            frames: count,
        })
    }

    fn write_manifest(&self, report: &RunReport) -> Result<(), AppError> {
        let Some(path) = &self.settings.manifest_path else {
            return Ok(());
        };
        write_manifest_json(path, &build_manifest(report, self.settings))
    }
}

pub fn build_manifest(report: &RunReport, settings: &Settings) -> RunManifest {
    let samples = report
        .plan
        .as_ref()
        .map(|plan| {
            plan.samples
                .iter()
                .enumerate()
                .map(|(index, sample)| {
                    let failure = report.failures.iter().find(|f| f.sample_index == index);
                    SampleRecord {
                        index,
                        sample: *sample,
                        fetched: failure.is_none(),
                        error: failure.map(|f| f.reason.to_string()),
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    let (outcome, output, frames) = match &report.outcome {
        RunOutcome::Generated(anim) => (ManifestOutcome::Generated, Some(anim.path.clone()), anim.frames),
        RunOutcome::Aborted(AbortReason::Geocode(_)) => (ManifestOutcome::GeocodeFailed, None, 0),
        RunOutcome::Aborted(AbortReason::NoImagery { .. }) => (ManifestOutcome::NoImagery, None, 0),
    };

    RunManifest {
        tool: "chronografy".to_string(),
        generated_at: chrono::Local::now().to_rfc3339(),
        address: report.address.clone(),
        coordinate: report.coordinate,
        sweep: report
            .plan
            .as_ref()
            .map(|p| p.sweep)
            .unwrap_or(settings.plan.sweep),
        samples,
        outcome,
        output,
        frames,
    }
}
