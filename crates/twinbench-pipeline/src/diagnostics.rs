//! Pipeline diagnostics: timing and per-stage metrics.
//!
//! The harness compares the same pipeline run natively and in the
//! browser, so timing goes through the [`Clock`] trait: native callers
//! pass a clock backed by `std::time::Instant`, the WebAssembly build
//! uses [`WebClock`] (the `web-time` crate, `performance.now()` on
//! WASM).
//!
//! Stage metrics are computed outside each stage's timed region (the
//! total duration does include them). Durations are
//! serialized as fractional seconds (`f64`) for JSON compatibility,
//! since `std::time::Duration` does not implement serde traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::pipeline::Pipeline;
use crate::types::{Dimensions, PipelineError, RgbaImage};

/// Source of monotonic timestamps.
pub trait Clock {
    /// Opaque timestamp.
    type Instant;

    /// Current timestamp.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// [`Clock`] backed by [`web_time::Instant`], usable on native targets
/// and inside the browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebClock;

impl Clock for WebClock {
    type Instant = web_time::Instant;

    fn now(&self) -> web_time::Instant {
        web_time::Instant::now()
    }

    fn elapsed(&self, since: &web_time::Instant) -> Duration {
        since.elapsed()
    }
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Box blur followed by Gaussian blur.
    pub blur: StageDiagnostics,
    /// In-place luma conversion.
    pub grayscale: StageDiagnostics,
    /// Half-resolution round trip.
    pub resample: StageDiagnostics,
    /// Wave warp.
    pub warp: StageDiagnostics,
    /// One entry per edge reinforcement pass, in order.
    pub edge_passes: Vec<StageDiagnostics>,
    /// Hash-keyed intensity modulation.
    pub intensity: StageDiagnostics,
    /// Blend with the post-warp snapshot.
    pub final_blend: StageDiagnostics,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Run-level summary.
    pub summary: PipelineSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Blur metrics.
    Blur {
        /// Number of 3x3 convolutions applied.
        convolutions: usize,
    },
    /// Luma conversion metrics.
    Grayscale {
        /// Mean of the luma written to R and G.
        mean_luma: f64,
    },
    /// Resampling metrics.
    Resample {
        /// Intermediate low-resolution size.
        via: Dimensions,
        /// Pixels that differ from the stage input.
        changed_pixel_count: u64,
    },
    /// Wave warp metrics.
    Warp {
        /// Largest absolute row offset applied, in pixels.
        max_offset: u64,
    },
    /// Edge reinforcement pass metrics.
    EdgePass {
        /// Zero-based pass index.
        pass: usize,
        /// Pixels whose red channel saturated at 255 after blending.
        saturated_pixel_count: u64,
    },
    /// Intensity modulation metrics.
    Intensity {
        /// Distinct colour seeds (`0..1000`) encountered.
        distinct_seeds: usize,
    },
    /// Final blend metrics.
    FinalBlend {
        /// Pixels that differ from the post-warp snapshot.
        changed_pixel_count: u64,
    },
}

/// High-level summary for the entire run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Image dimensions.
    pub dimensions: Dimensions,
    /// Total pixel count.
    pub pixel_count: u64,
    /// Wrapping sum of every output byte. Equal sums across runtimes are
    /// a cheap check that both produced the same image.
    pub output_checksum: u64,
}

/// Run the full pipeline, timing every stage with `clock`.
///
/// Produces exactly the same output as [`crate::process`].
///
/// # Errors
///
/// Same preconditions as [`crate::process`].
pub fn process_with_diagnostics<C: Clock>(
    dimensions: Dimensions,
    data: Vec<u8>,
    clock: &C,
) -> Result<(Vec<u8>, PipelineDiagnostics), PipelineError> {
    let pending = Pipeline::new(dimensions, data)?;
    let total_start = clock.now();

    let start = clock.now();
    let blurred = pending.blur();
    let blur = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Blur { convolutions: 2 },
    };

    let start = clock.now();
    let gray = blurred.grayscale();
    let grayscale = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Grayscale {
            mean_luma: mean_red(gray.image()),
        },
    };

    let before = gray.image().clone();
    let start = clock.now();
    let resampled = gray.resample();
    let resample = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Resample {
            via: dimensions.halved(),
            changed_pixel_count: count_changed(&before, resampled.image()),
        },
    };
    drop(before);

    let start = clock.now();
    let warped = resampled.warp();
    let warp = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Warp {
            max_offset: max_offset(dimensions.height),
        },
    };

    let mut edge_passes = Vec::with_capacity(crate::edge::EDGE_PASSES);
    let mut pass_start = clock.now();
    let reinforced = warped.reinforce_edges_with(|pass, image| {
        let duration = clock.elapsed(&pass_start);
        edge_passes.push(StageDiagnostics {
            duration,
            metrics: StageMetrics::EdgePass {
                pass,
                saturated_pixel_count: count_saturated(image),
            },
        });
        pass_start = clock.now();
    });

    let seeds = distinct_seeds(reinforced.image());
    let start = clock.now();
    let modulated = reinforced.modulate();
    let intensity = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Intensity {
            distinct_seeds: seeds,
        },
    };
    let base = modulated.base().clone();

    let start = clock.now();
    let finished = modulated.finish();
    let final_blend = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::FinalBlend {
            changed_pixel_count: count_changed(&base, finished.image()),
        },
    };
    let total_duration = clock.elapsed(&total_start);

    let output = finished.into_raw();
    let summary = PipelineSummary {
        dimensions,
        pixel_count: dimensions.pixel_count(),
        output_checksum: checksum(&output),
    };

    tracing::debug!(?total_duration, "pipeline finished");

    Ok((
        output,
        PipelineDiagnostics {
            blur,
            grayscale,
            resample,
            warp,
            edge_passes,
            intensity,
            final_blend,
            total_duration,
            summary,
        },
    ))
}

impl PipelineDiagnostics {
    /// Stages in pipeline order with display names.
    #[must_use]
    pub fn stages(&self) -> Vec<(String, &StageDiagnostics)> {
        let mut stages = vec![
            ("Blur".to_string(), &self.blur),
            ("Grayscale".to_string(), &self.grayscale),
            ("Resample".to_string(), &self.resample),
            ("Warp".to_string(), &self.warp),
        ];
        for (i, pass) in self.edge_passes.iter().enumerate() {
            stages.push((format!("Edge Pass {}", i + 1), pass));
        }
        stages.push(("Intensity".to_string(), &self.intensity));
        stages.push(("Final Blend".to_string(), &self.final_blend));
        stages
    }

    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {} ({} pixels)",
            self.summary.dimensions, self.summary.pixel_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        for (name, diag) in self.stages() {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!("Output checksum: {}", self.summary.output_checksum));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
pub fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Blur { convolutions } => format!("{convolutions} convolutions"),
        StageMetrics::Grayscale { mean_luma } => format!("mean luma={mean_luma:.1}"),
        StageMetrics::Resample {
            via,
            changed_pixel_count,
        } => format!("via {via}, {changed_pixel_count} px changed"),
        StageMetrics::Warp { max_offset } => format!("max offset={max_offset}px"),
        StageMetrics::EdgePass {
            saturated_pixel_count,
            ..
        } => format!("{saturated_pixel_count} px saturated"),
        StageMetrics::Intensity { distinct_seeds } => format!("{distinct_seeds} distinct seeds"),
        StageMetrics::FinalBlend {
            changed_pixel_count,
        } => format!("{changed_pixel_count} px differ from base"),
    }
}

/// Mean of the red channel.
#[allow(clippy::cast_precision_loss)]
fn mean_red(image: &RgbaImage) -> f64 {
    let count = u64::from(image.width()) * u64::from(image.height());
    if count == 0 {
        return 0.0;
    }
    let sum: u64 = image.pixels().map(|p| u64::from(p.0[0])).sum();
    sum as f64 / count as f64
}

/// Pixels whose RGBA differs between two equally sized images.
fn count_changed(a: &RgbaImage, b: &RgbaImage) -> u64 {
    a.pixels().zip(b.pixels()).map(|(p, q)| u64::from(p != q)).sum()
}

/// Pixels whose red channel is 255.
fn count_saturated(image: &RgbaImage) -> u64 {
    image.pixels().map(|p| u64::from(p.0[0] == 255)).sum()
}

/// Largest absolute warp offset over `height` rows.
fn max_offset(height: u32) -> u64 {
    (0..height)
        .map(|y| crate::warp::row_offset(y).unsigned_abs())
        .max()
        .unwrap_or(0)
}

/// Distinct colour seeds across the image.
fn distinct_seeds(image: &RgbaImage) -> usize {
    let mut seen = [false; crate::hash::SEED_SPACE as usize];
    for p in image.pixels() {
        seen[crate::hash::colour_seed(p.0) as usize] = true;
    }
    seen.iter().filter(|&&s| s).count()
}

/// Wrapping sum of every byte.
fn checksum(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(0u64, |acc, &b| acc.wrapping_add(u64::from(b)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Clock that advances one millisecond per reading.
    struct StepClock(std::cell::Cell<u64>);

    impl Clock for StepClock {
        type Instant = u64;

        fn now(&self) -> u64 {
            let t = self.0.get();
            self.0.set(t + 1);
            t
        }

        fn elapsed(&self, since: &u64) -> Duration {
            Duration::from_millis(self.now() - since)
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn gradient(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            image::Rgba([(x * 20) as u8, (y * 30) as u8, ((x + y) * 7) as u8, 255])
        })
    }

    #[test]
    fn duration_ms_converts_correctly() {
        let d = Duration::from_millis(1234);
        let ms = duration_ms(d);
        assert!((ms - 1234.0).abs() < 0.01);
    }

    #[test]
    fn output_matches_plain_process() {
        let img = gradient(9, 7);
        let dims = Dimensions::of(&img);
        let plain = crate::process(dims.width, dims.height, img.as_raw()).unwrap();
        let (timed, diag) = process_with_diagnostics(dims, img.into_raw(), &WebClock).unwrap();
        assert_eq!(plain, timed);
        assert_eq!(diag.summary.output_checksum, checksum(&plain));
    }

    #[test]
    fn records_every_edge_pass() {
        let img = gradient(8, 8);
        let clock = StepClock(std::cell::Cell::new(0));
        let (_, diag) =
            process_with_diagnostics(Dimensions::of(&img), img.into_raw(), &clock).unwrap();
        assert_eq!(diag.edge_passes.len(), crate::edge::EDGE_PASSES);
        for (i, stage) in diag.edge_passes.iter().enumerate() {
            assert!(matches!(stage.metrics, StageMetrics::EdgePass { pass, .. } if pass == i));
            assert!(stage.duration > Duration::ZERO);
        }
        assert!(diag.total_duration >= diag.blur.duration + diag.final_blend.duration);
    }

    #[test]
    fn rejects_invalid_input() {
        let result = process_with_diagnostics(Dimensions::new(3, 3), vec![0; 4], &WebClock);
        assert!(matches!(result, Err(PipelineError::BufferLength { .. })));
    }

    #[test]
    fn warp_metric_reports_peak() {
        assert_eq!(max_offset(1), 0);
        assert!(max_offset(80) >= 9);
    }

    #[test]
    fn distinct_seeds_counts_colours() {
        let img = RgbaImage::from_fn(4, 1, |x, _| {
            if x < 2 {
                image::Rgba([1, 0, 0, 255])
            } else {
                image::Rgba([2, 0, 0, 255])
            }
        });
        assert_eq!(distinct_seeds(&img), 2);
    }

    #[test]
    fn report_lists_every_stage() {
        let img = gradient(6, 6);
        let (_, diag) =
            process_with_diagnostics(Dimensions::of(&img), img.into_raw(), &WebClock).unwrap();
        let report = diag.report();
        assert!(report.contains("Pipeline Diagnostics Report"));
        for name in ["Blur", "Grayscale", "Resample", "Warp", "Edge Pass 4", "Final Blend"] {
            assert!(report.contains(name), "missing {name} in report");
        }
    }

    #[test]
    fn diagnostics_round_trip_through_json() {
        let img = gradient(5, 5);
        let (_, diag) =
            process_with_diagnostics(Dimensions::of(&img), img.into_raw(), &WebClock).unwrap();
        let json = serde_json::to_string(&diag).unwrap();
        let back: PipelineDiagnostics = serde_json::from_str(&json).unwrap();
        assert_eq!(back.edge_passes.len(), diag.edge_passes.len());
        assert_eq!(back.summary.output_checksum, diag.summary.output_checksum);
    }
}
