//! Commonly used imports for convenience.
//!
//! # Example
//!
//! ```
//! use clonevo_sim::prelude::*;
//! use rand::SeedableRng;
//!
//! let mut rng = SimRng::seed_from_u64(42);
//! let mut pop = Population::new(100).unwrap();
//! let params = EvolveParams::new(vec![100; 10]).with_mutation_rates(0.01, 0.0);
//! let model = RegionMutationModel::neutral(0.01).unwrap();
//! let mut rules = WrightFisherRules::new(Neutral);
//!
//! evolve(&mut rng, &mut pop, &params, &model, &NoRecombination, &mut rules, &mut RecordNothing)
//!     .unwrap();
//! assert_eq!(pop.generation(), 10);
//! ```

pub use crate::errors::{self, ConfigError, SelectionError, SimulationError};
pub use crate::evolution::{
    Additive, EffectDistribution, FitnessKind, FitnessModel, Multiplicative, MutationModel,
    Neutral, NoRecombination, RecombinationModel, Region, RegionMutationModel,
    RegionRecombinationModel, SelectedRegion, SelectionPolicy, WrightFisherRules,
};
pub use crate::genome::{Diploid, Gamete, Mutation};
pub use crate::simulation::{
    Configuration, Demography, EvolveParams, Fixation, Population, RemovalPolicy, SimRng,
    Simulation, evolve, reproduce, update_mutations,
};
pub use crate::storage::{GenerationStats, RecordNothing, Recorder, RecordingStrategy, StatsRecorder};
