//! Sample planning: which (location, heading, year) tuples to request.
//!
//! Three interchangeable policies, one per run:
//!
//! - calendar sweep: one probe per candidate year, kept if the response looks like a real photo
//! - metadata sweep: candidate years that match the capture date reported by the metadata endpoint
//! - jitter sweep: a rotating heading over randomly perturbed locations, with synthetic labels
//!
//! Plan order is frame order.

use chrono::{Datelike, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Uniform;

use crate::config::{ImageSize, MAX_JITTER_BOUND_DEG, PlanSettings};
use crate::data::google::{ImageRequest, MapsApi};
use crate::domain::{Coordinate, ProbeCheck, Sample, SweepKind};

/// Decides whether a probe payload is real imagery rather than a provider placeholder.
pub trait ProbeValidator {
    fn accept(&self, bytes: &[u8]) -> bool;

    fn describe(&self) -> String;
}

/// Accept payloads strictly larger than the given number of bytes.
#[derive(Debug, Clone, Copy)]
pub struct MinByteSize(pub usize);

impl ProbeValidator for MinByteSize {
    fn accept(&self, bytes: &[u8]) -> bool {
        bytes.len() > self.0
    }

    fn describe(&self) -> String {
        format!("payload > {} bytes", self.0)
    }
}

/// Accept payloads that decode as an image of any format the crate reads.
#[derive(Debug, Clone, Copy)]
pub struct DecodesToImage;

impl ProbeValidator for DecodesToImage {
    fn accept(&self, bytes: &[u8]) -> bool {
        image::load_from_memory(bytes).is_ok()
    }

    fn describe(&self) -> String {
        "payload decodes as an image".to_string()
    }
}

pub fn validator_for(settings: &PlanSettings) -> Box<dyn ProbeValidator> {
    match settings.probe_check {
        ProbeCheck::Bytes => Box::new(MinByteSize(settings.probe_min_bytes)),
        ProbeCheck::Decode => Box::new(DecodesToImage),
    }
}

/// The ordered output of a planner.
#[derive(Debug, Clone)]
pub struct Plan {
    pub sweep: SweepKind,
    pub samples: Vec<Sample>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }
}

/// Run the policy selected in `settings`.
pub fn plan(
    api: &dyn MapsApi,
    location: Coordinate,
    settings: &PlanSettings,
    size: ImageSize,
) -> Plan {
    let samples = match settings.sweep {
        SweepKind::Calendar => {
            let validator = validator_for(settings);
            plan_calendar(api, location, settings, size, validator.as_ref())
        }
        SweepKind::Metadata => plan_metadata(api, location, settings),
        SweepKind::Jitter => {
            let mut rng = match settings.jitter_seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            plan_jitter(location, settings, &mut rng)
        }
    };

    tracing::info!(
        sweep = settings.sweep.display_name(),
        samples = samples.len(),
        "plan ready"
    );
    Plan {
        sweep: settings.sweep,
        samples,
    }
}

/// Probe every year in `first_year..=last_year` and keep the ones `validator` accepts.
pub fn plan_calendar(
    api: &dyn MapsApi,
    location: Coordinate,
    settings: &PlanSettings,
    size: ImageSize,
    validator: &dyn ProbeValidator,
) -> Vec<Sample> {
    let mut samples = Vec::new();
    for year in settings.first_year..=settings.last_year {
        let probe = ImageRequest {
            location,
            size,
            heading: None,
            pitch: None,
            timestamp: Some(year),
        };
        match api.street_view_image(&probe) {
            Ok(bytes) if validator.accept(&bytes) => {
                tracing::debug!(year, bytes = bytes.len(), "probe accepted");
                samples.push(Sample::for_year(location, year, settings.pitch));
            }
            Ok(bytes) => {
                tracing::debug!(
                    year,
                    bytes = bytes.len(),
                    check = %validator.describe(),
                    "probe rejected"
                );
            }
            Err(e) => tracing::debug!(year, error = %e, "probe failed"),
        }
    }
    samples
}

/// Keep the candidate years equal to the capture year reported by the metadata endpoint.
///
/// The metadata answer does not depend on the candidate year, so it is fetched once.
pub fn plan_metadata(api: &dyn MapsApi, location: Coordinate, settings: &PlanSettings) -> Vec<Sample> {
    let meta = match api.street_view_metadata(location) {
        Ok(meta) => meta,
        Err(e) => {
            tracing::warn!(error = %e, "metadata request failed");
            return Vec::new();
        }
    };
    if meta.status != "OK" {
        tracing::info!(status = %meta.status, "no street view metadata for location");
        return Vec::new();
    }
    let Some(captured) = meta.date.as_deref().and_then(capture_year) else {
        tracing::info!(date = ?meta.date, "metadata has no usable capture date");
        return Vec::new();
    };

    (settings.first_year..=settings.last_year)
        .filter(|&year| year == captured)
        .map(|year| Sample::for_year(location, year, settings.pitch))
        .collect()
}

/// Parse the year out of a metadata `date` (`YYYY-MM`, tolerating a full `YYYY-MM-DD`).
pub fn capture_year(date: &str) -> Option<i32> {
    let date = date.trim();
    NaiveDate::parse_from_str(&format!("{date}-01"), "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date, "%Y-%m-%d"))
        .ok()
        .map(|d| d.year())
}

/// `jitter_steps` samples with headings `floor(i * 360 / n)` and locations offset by a uniform
/// random delta within `±jitter_bound_deg` on each axis.
pub fn plan_jitter<R: Rng + ?Sized>(
    location: Coordinate,
    settings: &PlanSettings,
    rng: &mut R,
) -> Vec<Sample> {
    let n = settings.jitter_steps.clamp(1, 360);
    // `f64::min` drops NaN, so the range below is always finite.
    let bound = settings.jitter_bound_deg.abs().min(MAX_JITTER_BOUND_DEG);
    let delta = Uniform::new_inclusive(-bound, bound);

    (0..n)
        .map(|i| {
            let heading = ((i * 360) / n) as u16;
            let nominal_year = settings
                .jitter_label_start
                .map(|start| start + i as i32);
            Sample {
                location: location.offset(delta.sample(rng), delta.sample(rng)),
                heading,
                pitch: settings.pitch,
                nominal_year,
                timestamp_hint: None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::data::google::ProviderError;
    use crate::testing::{FakeMaps, flat_png, noisy_png};

    fn base() -> Coordinate {
        Coordinate::new(-23.5613, -46.6563)
    }

    #[test]
    fn calendar_sweep_keeps_only_real_photos_in_year_order() {
        let api = FakeMaps::new().with_images(|req| match req.timestamp {
            Some(2011) | Some(2015) | Some(2020) => Ok(noisy_png(160, 120, 7)),
            Some(2013) => Err(ProviderError::Status(500)),
            _ => Ok(flat_png(64, 48, [200, 200, 200])),
        });
        let settings = PlanSettings::default();
        let samples = plan_calendar(
            &api,
            base(),
            &settings,
            ImageSize::default(),
            &MinByteSize(10_000),
        );

        let years: Vec<Option<i32>> = samples.iter().map(|s| s.nominal_year).collect();
        assert_eq!(years, vec![Some(2011), Some(2015), Some(2020)]);
        assert!(samples.iter().all(|s| s.timestamp_hint == s.nominal_year));
        // One probe per candidate year, 2007..=2023.
        assert_eq!(api.image_calls().len(), 17);
    }

    #[test]
    fn min_byte_size_is_strict() {
        let v = MinByteSize(4);
        assert!(!v.accept(&[0; 4]));
        assert!(v.accept(&[0; 5]));
    }

    #[test]
    fn decode_validator_accepts_small_valid_images() {
        assert!(DecodesToImage.accept(&flat_png(8, 8, [1, 2, 3])));
        assert!(!DecodesToImage.accept(b"<html>quota exceeded</html>"));
    }

    #[test]
    fn metadata_sweep_matches_capture_year() {
        let api = FakeMaps::new().with_metadata_date("2015-06");
        let samples = plan_metadata(&api, base(), &PlanSettings::default());
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].nominal_year, Some(2015));
        assert_eq!(api.metadata_calls(), 1);
    }

    #[test]
    fn metadata_sweep_out_of_range_or_failed_is_empty() {
        let api = FakeMaps::new().with_metadata_date("2024-02");
        assert!(plan_metadata(&api, base(), &PlanSettings::default()).is_empty());

        let api = FakeMaps::new();
        assert!(plan_metadata(&api, base(), &PlanSettings::default()).is_empty());

        let api = FakeMaps::new().with_metadata_error(ProviderError::Status(403));
        assert!(plan_metadata(&api, base(), &PlanSettings::default()).is_empty());
    }

    #[test]
    fn capture_year_parses_month_dates() {
        assert_eq!(capture_year("2015-06"), Some(2015));
        assert_eq!(capture_year("2019-11-03"), Some(2019));
        assert_eq!(capture_year("June 2015"), None);
    }

    #[test]
    fn jitter_headings_are_distinct_multiples_and_deltas_bounded() {
        for n in [8usize, 10, 12] {
            let settings = PlanSettings {
                sweep: SweepKind::Jitter,
                jitter_steps: n,
                ..PlanSettings::default()
            };
            let mut rng = StdRng::seed_from_u64(42);
            let samples = plan_jitter(base(), &settings, &mut rng);
            assert_eq!(samples.len(), n);

            let step = 360 / n as u16;
            let headings: HashSet<u16> = samples.iter().map(|s| s.heading).collect();
            assert_eq!(headings.len(), n);
            for s in &samples {
                assert!(s.heading < 360);
                assert_eq!(s.heading % step, 0);
                assert!((s.location.lat - base().lat).abs() <= settings.jitter_bound_deg + 1e-12);
                assert!((s.location.lng - base().lng).abs() <= settings.jitter_bound_deg + 1e-12);
                assert_eq!(s.timestamp_hint, None);
            }
        }
    }

    #[test]
    fn jitter_headings_stay_within_a_degree_when_steps_do_not_divide_360() {
        for n in [7usize, 11, 359] {
            let settings = PlanSettings {
                jitter_steps: n,
                ..PlanSettings::default()
            };
            let mut rng = StdRng::seed_from_u64(3);
            let samples = plan_jitter(base(), &settings, &mut rng);

            let headings: HashSet<u16> = samples.iter().map(|s| s.heading).collect();
            assert_eq!(headings.len(), n);
            for (i, s) in samples.iter().enumerate() {
                let exact = i as f64 * 360.0 / n as f64;
                assert!((f64::from(s.heading) - exact).abs() < 1.0, "step {i} of {n}");
            }
        }
    }

    #[test]
    fn oversized_jitter_bound_is_capped_instead_of_panicking() {
        for bound in [1e308, f64::INFINITY, f64::NAN] {
            let settings = PlanSettings {
                jitter_bound_deg: bound,
                ..PlanSettings::default()
            };
            let mut rng = StdRng::seed_from_u64(5);
            for s in plan_jitter(base(), &settings, &mut rng) {
                assert!((s.location.lat - base().lat).abs() <= MAX_JITTER_BOUND_DEG + 1e-9);
                assert!((s.location.lng - base().lng).abs() <= MAX_JITTER_BOUND_DEG + 1e-9);
            }
        }
    }

    #[test]
    fn jitter_labels_are_sequential_when_requested() {
        let settings = PlanSettings {
            jitter_steps: 3,
            jitter_label_start: Some(2015),
            ..PlanSettings::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let years: Vec<Option<i32>> = plan_jitter(base(), &settings, &mut rng)
            .iter()
            .map(|s| s.nominal_year)
            .collect();
        assert_eq!(years, vec![Some(2015), Some(2016), Some(2017)]);
    }

    #[test]
    fn seeded_jitter_plan_is_reproducible() {
        let settings = PlanSettings {
            sweep: SweepKind::Jitter,
            jitter_seed: Some(9),
            ..PlanSettings::default()
        };
        let api = FakeMaps::new();
        let a = plan(&api, base(), &settings, ImageSize::default());
        let b = plan(&api, base(), &settings, ImageSize::default());
        assert_eq!(a.samples, b.samples);
        assert!(api.image_calls().is_empty());
    }
}
