//! Aggregation across repeated runs.

use std::time::Duration;

use twinbench_pipeline::PipelineDiagnostics;
use twinbench_pipeline::diagnostics::duration_ms;

use crate::workload::Kernel;

/// Minimum, mean and maximum of a set of samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spread {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

impl Spread {
    /// `None` for an empty sample set.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn of(samples: &[f64]) -> Option<Self> {
        let min = samples.iter().copied().reduce(f64::min)?;
        let max = samples.iter().copied().reduce(f64::max)?;
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        Some(Self { min, mean, max })
    }
}

/// Mean duration (ms) of every stage, in pipeline order.
///
/// Stage names come from the first run; all runs have the same stages.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn stage_means(all_diagnostics: &[PipelineDiagnostics]) -> Vec<(String, f64)> {
    let Some(first) = all_diagnostics.first() else {
        return Vec::new();
    };
    let mut sums: Vec<(String, f64)> = first
        .stages()
        .into_iter()
        .map(|(name, _)| (name, 0.0))
        .collect();
    for diagnostics in all_diagnostics {
        for (slot, (_, stage)) in sums.iter_mut().zip(diagnostics.stages()) {
            slot.1 += duration_ms(stage.duration);
        }
    }
    let runs = all_diagnostics.len() as f64;
    for slot in &mut sums {
        slot.1 /= runs;
    }
    sums
}

/// Print aggregated statistics for repeated image pipeline runs.
pub fn print_image_summary(all_diagnostics: &[PipelineDiagnostics]) {
    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    let totals: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| duration_ms(d.total_duration))
        .collect();
    let Some(spread) = Spread::of(&totals) else {
        println!("Warning: no diagnostics to summarize");
        return;
    };
    println!(
        "Total duration: min={:.3}ms  mean={:.3}ms  max={:.3}ms",
        spread.min, spread.mean, spread.max,
    );

    println!();
    println!("{:<24} {:>12}", "Stage", "Mean (ms)");
    println!("{}", "-".repeat(40));
    for (name, mean) in stage_means(all_diagnostics) {
        println!("{name:<24} {mean:>10.3}ms");
    }
}

/// Print aggregated statistics for repeated runs of a scalar kernel.
pub fn print_kernel_summary(kernel: Kernel, durations: &[Duration]) {
    let samples: Vec<f64> = durations.iter().copied().map(duration_ms).collect();
    let Some(spread) = Spread::of(&samples) else {
        return;
    };
    println!();
    println!("Summary: {kernel} ({} runs)\n{}", samples.len(), "=".repeat(60));
    println!(
        "Duration: min={:.3}ms  mean={:.3}ms  max={:.3}ms",
        spread.min, spread.mean, spread.max,
    );
}
