//! Genome tables: mutations, gametes (haplotypes) and diploid individuals.

mod diploid;
mod gamete;
mod mutation;

pub use diploid::Diploid;
pub use gamete::Gamete;
pub use mutation::{Mutation, MutationLookup};
