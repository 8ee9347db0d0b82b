use serde::{Deserialize, Serialize};

/// Recording strategy for when to collect statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingStrategy {
    /// Record every N generations.
    EveryN(u32),

    /// Record at specific generations.
    Specific(Vec<u32>),

    /// Record all generations.
    All,

    /// No recording.
    None,
}

impl RecordingStrategy {
    /// Strategy for a "record every" setting where zero means never.
    pub fn every(n: u32) -> Self {
        match n {
            0 => Self::None,
            1 => Self::All,
            n => Self::EveryN(n),
        }
    }

    /// Check if generation should be recorded
    pub fn should_record(&self, generation: u32) -> bool {
        match self {
            Self::EveryN(0) => false,
            Self::EveryN(n) => generation.is_multiple_of(*n),
            Self::Specific(gens) => gens.contains(&generation),
            Self::All => true,
            Self::None => false,
        }
    }
}
