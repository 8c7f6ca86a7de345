//! Formatted terminal output for plans and finished runs.
//!
//! We keep formatting code in one place so the pipeline stays free of presentation details and
//! output changes are localized.

use crate::app::pipeline::{AbortReason, RunOutcome, RunReport};
use crate::data::planner::Plan;
use crate::domain::{Coordinate, Sample};

/// Format a plan as a table, one row per sample.
pub fn format_plan(location: Coordinate, plan: &Plan) -> String {
    let mut out = String::new();

    out.push_str("=== chronografy - sample plan ===\n");
    out.push_str(&format!("Location: {location}\n"));
    out.push_str(&format!(
        "Sweep: {} | samples={}\n",
        plan.sweep.display_name(),
        plan.len()
    ));

    if plan.is_empty() {
        out.push_str("\nNo samples planned: no imagery available for this location.\n");
        return out;
    }

    out.push_str(&format!(
        "\n{:>3}  {:>6}  {:>7}  {:>5}  {:>12}  {:>12}\n",
        "#", "year", "heading", "pitch", "lat", "lng"
    ));
    for (idx, sample) in plan.samples.iter().enumerate() {
        out.push_str(&format_sample_row(idx, sample));
        out.push('\n');
    }
    out
}

fn format_sample_row(idx: usize, s: &Sample) -> String {
    let year = s
        .nominal_year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:>3}  {:>6}  {:>7}  {:>5}  {:>12.7}  {:>12.7}",
        idx, year, s.heading, s.pitch, s.location.lat, s.location.lng
    )
}

/// One-paragraph summary of a finished run.
pub fn format_run_summary(report: &RunReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("Address: {}\n", report.address));
    if let Some(c) = report.coordinate {
        out.push_str(&format!("Location: {c}\n"));
    }
    if let Some(plan) = &report.plan {
        out.push_str(&format!(
            "Plan: {} sweep, {} sample(s), {} dropped\n",
            plan.sweep.display_name(),
            plan.len(),
            report.failures.len()
        ));
    }
    for f in &report.failures {
        let year = f
            .nominal_year
            .map(|y| format!(" ({y})"))
            .unwrap_or_default();
        out.push_str(&format!("  - sample {}{}: {}\n", f.sample_index, year, f.reason));
    }

    match &report.outcome {
        RunOutcome::Generated(anim) => out.push_str(&format!(
            "Output: {} ({} frame(s))\n",
            anim.path.display(),
            anim.frames
        )),
        RunOutcome::Aborted(AbortReason::Geocode(e)) => {
            out.push_str(&format!("Aborted: address not resolved ({e})\n"))
        }
        RunOutcome::Aborted(AbortReason::NoImagery { planned }) => out.push_str(&format!(
            "Aborted: no usable imagery ({planned} sample(s) planned)\n"
        )),
    }
    out
}
