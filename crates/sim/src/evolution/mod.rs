//! Evolutionary operators used by the reproduction step.
//!
//! - **Mutation**: infinite-sites mutation over weighted regions
//! - **Recombination**: crossover breakpoints (not used by clonal reproduction)
//! - **Selection**: site-based fitness models and Wright-Fisher parent sampling

pub mod mutation;
pub mod recombination;
pub mod selection;

pub use mutation::{
    EffectDistribution, MutationContext, MutationModel, Region, RegionMutationModel,
    SelectedRegion, mutate_gamete,
};
pub use recombination::{NoRecombination, RecombinationModel, RegionRecombinationModel};
pub use selection::{
    Additive, FitnessKind, FitnessModel, Multiplicative, Neutral, SelectionPolicy,
    WrightFisherRules,
};
