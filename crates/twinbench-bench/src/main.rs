//! twinbench-bench: native timings for the twinbench kernels.
//!
//! Runs the same kernels the WebAssembly build exports, timed with
//! `std::time::Instant`, so the numbers can be set against the browser
//! run of the identical code:
//!
//! - `image`: the RGBA pipeline with per-stage diagnostics, on a decoded
//!   file or a synthetic gradient
//! - `factorial`, `matmul`, `particles`: the scalar kernels
//!
//! Reports go to stdout; logs go to stderr and follow `RUST_LOG`.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin twinbench-bench -- [OPTIONS] <COMMAND>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod config;
mod error;
mod summary;
mod workload;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use twinbench_pipeline::diagnostics::duration_ms;
use twinbench_pipeline::types::image_from_raw;
use twinbench_pipeline::{Clock, Dimensions, RgbaImage, process_with_diagnostics};

use crate::config::BenchConfig;
use crate::error::BenchError;
use crate::workload::Kernel;

/// Native timings for the twinbench kernels.
///
/// Runs a kernel a number of times and prints per-run timing, plus a
/// min/mean/max summary when more than one run is requested.
#[derive(Parser)]
#[command(name = "twinbench-bench", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Number of runs for averaging.
    #[arg(long, global = true, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output each run as JSON instead of a human-readable report.
    #[arg(long, global = true)]
    json: bool,

    /// Full workload config as a JSON string.
    ///
    /// When provided, all workload size flags are ignored. Missing
    /// fields take their defaults.
    #[arg(long, global = true)]
    config_json: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Time the RGBA image pipeline.
    Image(ImageArgs),
    /// Time `factorial_mod`.
    Factorial {
        /// Factorial argument.
        #[arg(long, default_value_t = BenchConfig::DEFAULT_FACTORIAL_N)]
        n: u32,
    },
    /// Time `matmul_sum`.
    Matmul {
        /// Matrix side.
        #[arg(long, default_value_t = BenchConfig::DEFAULT_MATMUL_N)]
        n: u32,
    },
    /// Time `simulate_particles`.
    Particles(ParticleArgs),
}

#[derive(Args)]
struct ImageArgs {
    /// Input image (PNG, JPEG, BMP, WebP). A synthetic gradient is used
    /// when omitted.
    path: Option<PathBuf>,

    /// Width of the synthetic gradient.
    #[arg(long, default_value_t = BenchConfig::DEFAULT_WIDTH)]
    width: u32,

    /// Height of the synthetic gradient.
    #[arg(long, default_value_t = BenchConfig::DEFAULT_HEIGHT)]
    height: u32,

    /// Write the first run's output to this PNG file.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct ParticleArgs {
    /// Number of particles.
    #[arg(long, default_value_t = BenchConfig::DEFAULT_PARTICLE_COUNT)]
    count: usize,

    /// Simulation steps.
    #[arg(long, default_value_t = BenchConfig::DEFAULT_PARTICLE_STEPS)]
    steps: u32,

    /// Time step.
    #[arg(long, default_value_t = BenchConfig::DEFAULT_PARTICLE_DT)]
    dt: f32,

    /// Width of the box.
    #[arg(long, default_value_t = BenchConfig::DEFAULT_FIELD_WIDTH)]
    field_width: f32,

    /// Height of the box.
    #[arg(long, default_value_t = BenchConfig::DEFAULT_FIELD_HEIGHT)]
    field_height: f32,
}

/// Build a [`BenchConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and the
/// subcommand's size flags are ignored. Otherwise the defaults are
/// overridden by the flags of the chosen subcommand.
fn config_from_cli(cli: &Cli) -> Result<BenchConfig, BenchError> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(BenchError::Config);
    }

    let defaults = BenchConfig::default();
    Ok(match &cli.command {
        Command::Image(args) => BenchConfig {
            width: args.width,
            height: args.height,
            ..defaults
        },
        Command::Factorial { n } => BenchConfig {
            factorial_n: *n,
            ..defaults
        },
        Command::Matmul { n } => BenchConfig {
            matmul_n: *n,
            ..defaults
        },
        Command::Particles(args) => BenchConfig {
            particle_count: args.count,
            particle_steps: args.steps,
            particle_dt: args.dt,
            field_width: args.field_width,
            field_height: args.field_height,
            ..defaults
        },
    })
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Install a stderr `fmt` subscriber filtered by `RUST_LOG` (default
/// `info`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: &Cli) -> Result<(), BenchError> {
    let config = config_from_cli(cli)?;
    tracing::info!(?config, runs = cli.runs, "bench config");

    match &cli.command {
        Command::Image(args) => run_image(cli, args, &config),
        Command::Factorial { .. } => run_kernel(cli, Kernel::Factorial, &config),
        Command::Matmul { .. } => run_kernel(cli, Kernel::Matmul, &config),
        Command::Particles(_) => run_kernel(cli, Kernel::Particles, &config),
    }
}

fn run_image(cli: &Cli, args: &ImageArgs, config: &BenchConfig) -> Result<(), BenchError> {
    let image = match args.path {
        Some(ref path) => load_image(path)?,
        None => workload::synthetic_gradient(config.width, config.height),
    };
    let dimensions = Dimensions::of(&image);
    let source = args
        .path
        .as_deref()
        .map_or_else(|| "synthetic gradient".to_string(), |p| p.display().to_string());
    tracing::info!(%dimensions, %source, "image ready");
    let raw = image.into_raw();

    let mut all_diagnostics = Vec::with_capacity(cli.runs);
    for run in 0..cli.runs {
        if cli.runs > 1 {
            tracing::info!("run {}/{}", run + 1, cli.runs);
        }

        let (output, diagnostics) = process_with_diagnostics(dimensions, raw.clone(), &StdClock)?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&diagnostics)?);
        } else {
            println!("{}", diagnostics.report());
        }

        // Write the output on the first run only.
        if run == 0
            && let Some(ref output_path) = args.output
        {
            write_png(output_path, image_from_raw(dimensions, output)?)?;
        }

        all_diagnostics.push(diagnostics);
    }

    if cli.runs > 1 && !cli.json {
        summary::print_image_summary(&all_diagnostics);
    }
    Ok(())
}

/// Timing of one scalar kernel run.
#[derive(Serialize)]
struct KernelRun {
    kernel: Kernel,
    run: usize,
    duration_ms: f64,
    result: f64,
}

fn run_kernel(cli: &Cli, kernel: Kernel, config: &BenchConfig) -> Result<(), BenchError> {
    let mut durations = Vec::with_capacity(cli.runs);
    for run in 0..cli.runs {
        let start = StdClock.now();
        let result = kernel.run(config)?;
        let duration = StdClock.elapsed(&start);

        let record = KernelRun {
            kernel,
            run,
            duration_ms: duration_ms(duration),
            result,
        };
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&record)?);
        } else {
            println!(
                "{kernel}: result={} in {:.3}ms",
                record.result, record.duration_ms,
            );
        }
        durations.push(duration);
    }

    if cli.runs > 1 && !cli.json {
        summary::print_kernel_summary(kernel, &durations);
    }
    Ok(())
}

fn load_image(path: &Path) -> Result<RgbaImage, BenchError> {
    let bytes = std::fs::read(path).map_err(|source| BenchError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), len = bytes.len(), "decoding image");
    Ok(image::load_from_memory(&bytes)?.to_rgba8())
}

fn write_png(path: &Path, image: RgbaImage) -> Result<(), BenchError> {
    image
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|source| BenchError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::info!(path = %path.display(), "output written");
    Ok(())
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}
