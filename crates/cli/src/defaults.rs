//! Shared default values for the command-line interface.
//! Used by clap for `init` and as fallbacks when reading configurations.

pub const CONFIG_FILE: &str = "clonevo.json";
pub const RESULTS_FILE: &str = "results.json";

pub const POPULATION_SIZE: u32 = 1000;
pub const GENERATIONS: usize = 1000;

// Mutation
pub const MU_NEUTRAL: f64 = 0.011;
pub const MU_SELECTED: f64 = 0.001;
pub const MEAN_S: f64 = -0.05;
pub const GAMMA_SHAPE: f64 = 0.3;
pub const DOMINANCE: f64 = 1.0;

// Selection
pub const FITNESS_SCALING: f64 = 2.0;

pub const RECORD_EVERY: u32 = 100;
pub const SAMPLE_SIZE: usize = clonevo_sim::storage::DEFAULT_SAMPLE_SIZE;

pub const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {per_sec}";
