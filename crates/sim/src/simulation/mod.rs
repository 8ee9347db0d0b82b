//! Population state, the clonal reproduction step and the generation driver.
//!
//! - `Population`: diploids, gametes, mutations and fixation record.
//! - `reproduce`: one generation of clonal Wright-Fisher reproduction.
//! - `update_mutations`: fixation and loss bookkeeping after each generation.
//! - `evolve`: runs the step over a demographic schedule.
//! - `Simulation`: a seeded, configured run that can be advanced step by step.

pub mod configs;
pub mod demography;
pub mod engine;
pub mod fixation;
pub mod parameters;
pub mod population;
pub mod reproduction;

pub use configs::{Configuration, EvolutionConfig, ExecutionConfig};
pub use demography::Demography;
pub use engine::{SimRng, Simulation, evolve};
pub use fixation::{FixationSummary, RemovalPolicy, update_mutations};
pub use parameters::{EvolveParams, MutationConfig, RecombinationConfig};
pub use population::{Fixation, MAX_POPULATION_SIZE, Population};
pub use reproduction::{gamete_cleaner, process_gametes, reproduce};
