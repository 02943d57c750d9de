//! Errors surfaced by the bench CLI.

use std::path::PathBuf;

use twinbench_numeric::ParticleError;
use twinbench_pipeline::PipelineError;

/// Anything that stops a bench run.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    /// `--config-json` did not parse as a `BenchConfig`.
    #[error("error parsing --config-json: {0}")]
    Config(#[source] serde_json::Error),

    /// The input image could not be read from disk.
    #[error("error reading {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input image could not be decoded.
    #[error("error decoding image: {0}")]
    Decode(#[from] image::ImageError),

    /// The output image could not be written.
    #[error("error writing {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A report could not be serialized.
    #[error("error serializing report: {0}")]
    Json(#[from] serde_json::Error),

    /// The image pipeline rejected its input.
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// The particle kernel rejected its state.
    #[error("particle error: {0}")]
    Particles(#[from] ParticleError),
}
