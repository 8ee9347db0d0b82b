//! Recording of per-generation statistics and sample diversity.
//!
//! Recorders observe the population after each generation; nothing is
//! persisted by the library itself.

pub mod diversity;
mod recorder;
pub mod types;

pub use diversity::GameteSample;
pub use recorder::{
    DEFAULT_SAMPLE_SIZE, GenerationStats, RecordNothing, Recorder, Sampling, StatsRecorder,
};
pub use types::RecordingStrategy;
