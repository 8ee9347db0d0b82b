use clap::{Args, ValueEnum};
use std::path::PathBuf;

use crate::defaults;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Output configuration file
    #[arg(short, long, default_value = defaults::CONFIG_FILE)]
    pub output: PathBuf,

    /// Overwrite an existing configuration file
    #[arg(long)]
    pub force: bool,

    /// Population size (diploids)
    #[arg(short = 'n', long, default_value_t = defaults::POPULATION_SIZE)]
    pub population_size: u32,

    /// Number of generations at constant size
    #[arg(short = 'g', long, default_value_t = defaults::GENERATIONS)]
    pub generations: usize,

    /// Final population size, for a changing population
    ///
    /// The size moves from --population-size to this value over the run
    /// following --growth.
    #[arg(long)]
    pub final_size: Option<u32>,

    /// How the size changes when --final-size is given
    #[arg(long, value_enum, default_value_t = Growth::Exponential, requires = "final_size")]
    pub growth: Growth,

    /// Neutral mutation rate (per gamete per generation)
    #[arg(long, default_value_t = defaults::MU_NEUTRAL)]
    pub mu_neutral: f64,

    /// Selected mutation rate (per gamete per generation)
    #[arg(long, default_value_t = defaults::MU_SELECTED)]
    pub mu_selected: f64,

    /// Mean selection coefficient of new selected mutations
    ///
    /// Negative values give deleterious mutations.
    #[arg(long, default_value_t = defaults::MEAN_S, allow_negative_numbers = true)]
    pub mean_s: f64,

    /// Gamma shape of the selection coefficient distribution
    ///
    /// A shape of 1 gives exponentially distributed coefficients.
    #[arg(long, default_value_t = defaults::GAMMA_SHAPE)]
    pub shape: f64,

    /// Dominance of new selected mutations
    #[arg(long, default_value_t = defaults::DOMINANCE)]
    pub dominance: f64,

    /// Recombination rate (kept in the configuration, not used by clonal reproduction)
    #[arg(long, default_value_t = 0.0)]
    pub recomb_rate: f64,

    /// Fitness model
    #[arg(long, value_enum, default_value_t = FitnessArg::Multiplicative)]
    pub fitness: FitnessArg,

    /// Fitness of homozygotes is 1 + scaling * s
    #[arg(long, default_value_t = defaults::FITNESS_SCALING)]
    pub scaling: f64,

    /// Keep fixed selected mutations in the population
    #[arg(long)]
    pub keep_selected_fixations: bool,

    /// Default recording interval (record every N generations, 0 disables)
    #[arg(long, default_value_t = defaults::RECORD_EVERY)]
    pub record_every: u32,

    /// Gametes sampled for diversity statistics (0 disables sampling)
    #[arg(long, default_value_t = defaults::SAMPLE_SIZE)]
    pub sample_size: usize,

    /// Random seed
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Configuration file (see `clonevo init`)
    #[arg(short, long, default_value = defaults::CONFIG_FILE)]
    pub config: PathBuf,

    /// Results file
    #[arg(short, long, default_value = defaults::RESULTS_FILE)]
    pub output: PathBuf,

    /// Override random seed (default: use configured seed)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override recording interval (default: use configured interval)
    #[arg(long)]
    pub record_every: Option<u32>,

    /// Continue from the final population of an earlier results file
    ///
    /// The configured schedule runs on from the saved generation with the
    /// saved random state. Statistics and fixations of the earlier run are
    /// kept. --seed is ignored.
    #[arg(long)]
    pub resume: Option<PathBuf>,

    /// Do not show a progress bar
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Results file written by `clonevo run`
    #[arg(short, long, default_value = defaults::RESULTS_FILE)]
    pub input: PathBuf,

    /// What to export
    #[arg(short, long, value_enum, default_value_t = ExportData::Stats)]
    pub data: ExportData,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
    pub format: ExportFormat,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Growth {
    Linear,
    Exponential,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FitnessArg {
    Multiplicative,
    Additive,
    Neutral,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportData {
    /// Per-generation statistics
    Stats,
    /// Recorded fixations
    Fixations,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}
