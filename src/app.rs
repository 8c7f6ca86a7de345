//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - loads the API key and builds `Settings`
//! - runs the pipeline (or one of its stages)
//! - prints the outcome

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::app::notify::ConsoleNotifier;
use crate::app::pipeline::{Pipeline, RunOutcome};
use crate::cli::{Command, GeocodeArgs, RunArgs};
use crate::config::Settings;
use crate::data::google::GoogleMapsClient;
use crate::error::AppError;
use crate::render::Annotator;
use crate::render::annotate::PREFERRED_FAMILY;

pub mod notify;
pub mod pipeline;

/// Entry point for the `chronografy` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Generate(args) => handle_generate(args),
        Command::Plan(args) => handle_plan(args),
        Command::Geocode(args) => handle_geocode(args),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "chronografy=info",
        1 => "chronografy=debug",
        _ => "chronografy=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn settings_for(args: &RunArgs) -> Result<Settings, AppError> {
    let mut settings = Settings::from_env()?;
    args.apply(&mut settings);
    settings.validate()?;
    Ok(settings)
}

fn handle_generate(args: RunArgs) -> Result<(), AppError> {
    let settings = settings_for(&args)?;
    let client = GoogleMapsClient::from_settings(&settings);
    let annotator = if settings.annotate {
        Annotator::new(PREFERRED_FAMILY)
    } else {
        Annotator::builtin()
    };

    let notifier = ConsoleNotifier;
    let mut pipeline = Pipeline::new(&client, &settings, annotator);
    let report = pipeline.run(&args.address(), &notifier)?;

    eprint!("{}", crate::report::format_run_summary(&report));
    exit_status(&report.outcome)
}

/// The pipeline has already notified the user about an abort; only the exit code is left.
fn exit_status(outcome: &RunOutcome) -> Result<(), AppError> {
    match outcome {
        RunOutcome::Generated(_) => Ok(()),
        RunOutcome::Aborted(_) => Err(AppError::silent(3)),
    }
}

fn handle_plan(args: RunArgs) -> Result<(), AppError> {
    let settings = settings_for(&args)?;
    let client = GoogleMapsClient::from_settings(&settings);

    let notifier = ConsoleNotifier;
    let mut pipeline = Pipeline::new(&client, &settings, Annotator::builtin());
    let (location, plan) = pipeline
        .plan_for(&args.address(), &notifier)
        .map_err(|_| AppError::silent(3))?;

    println!("{}", crate::report::format_plan(location, &plan));
    Ok(())
}

fn handle_geocode(args: GeocodeArgs) -> Result<(), AppError> {
    let mut settings = Settings::from_env()?;
    if let Some(url) = &args.geocode_url {
        settings.endpoints.geocode = url.clone();
    }
    let client = GoogleMapsClient::from_settings(&settings);
    let coordinate = crate::data::geocode(&client, &args.address())
        .map_err(|e| AppError::no_output(format!("Could not resolve address: {e}.")))?;
    println!("{},{}", coordinate.lat, coordinate.lng);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::app::pipeline::{AbortReason, Animation};
    use crate::data::GeocodeError;

    #[test]
    fn aborted_runs_exit_with_code_3_and_nothing_more_to_print() {
        for outcome in [
            RunOutcome::Aborted(AbortReason::Geocode(GeocodeError::NoResults)),
            RunOutcome::Aborted(AbortReason::NoImagery { planned: 17 }),
        ] {
            let err = exit_status(&outcome).unwrap_err();
            assert_eq!(err.exit_code(), 3);
            assert!(err.is_silent());
        }

        let generated = RunOutcome::Generated(Animation {
            path: PathBuf::from("out.gif"),
            frames: 3,
        });
        assert!(exit_status(&generated).is_ok());
    }
}
