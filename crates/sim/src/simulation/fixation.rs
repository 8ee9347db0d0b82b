//! Fixation and loss bookkeeping.
//!
//! After each generation, mutations at count `2N` are candidates for removal
//! and mutations at count zero are lost. The [`RemovalPolicy`] decides which
//! fixed mutations leave the population. The same policy is applied by the
//! reproduction step when it strips fixed keys from gametes, so the counts
//! zeroed here always match the gametes.

use crate::genome::Mutation;
use crate::simulation::population::{Fixation, Population};
use serde::{Deserialize, Serialize};

/// Which fixed mutations are removed and recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalPolicy {
    /// Every fixed mutation.
    #[default]
    All,
    /// Only neutral fixations. Fixed selected mutations stay in the gametes,
    /// keep contributing to fitness and are not recorded.
    NeutralOnly,
}

impl RemovalPolicy {
    /// Policy matching a "prune selected fixations" flag.
    pub fn from_prune_selected(prune_selected: bool) -> Self {
        if prune_selected {
            Self::All
        } else {
            Self::NeutralOnly
        }
    }

    /// Whether a fixed `mutation` is removed under this policy.
    #[inline]
    pub fn prunes(self, mutation: &Mutation) -> bool {
        match self {
            Self::All => true,
            Self::NeutralOnly => mutation.neutral,
        }
    }
}

/// What one call to [`update_mutations`] changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixationSummary {
    /// Mutations appended to the fixation record.
    pub fixed: usize,
    /// Mutations whose count dropped to zero since the last call.
    pub lost: usize,
}

/// Record fixations and release the positions of fixed and lost mutations.
///
/// Uses `2 * population.size()` as the fixation count, so the caller must set
/// the new size before calling. A population of size zero records nothing.
pub fn update_mutations(population: &mut Population, policy: RemovalPolicy) -> FixationSummary {
    let two_n = 2 * population.n;
    let generation = population.generation;
    let mut summary = FixationSummary::default();

    let Population {
        mutations,
        mcounts,
        mut_lookup,
        fixations,
        ..
    } = population;

    for (key, count) in mcounts.iter_mut().enumerate() {
        let mutation = &mutations[key];
        if *count == 0 {
            if mut_lookup.remove(mutation.pos, key) {
                summary.lost += 1;
            }
        } else if two_n > 0 && *count == two_n && policy.prunes(mutation) {
            fixations.push(Fixation {
                mutation: *mutation,
                generation,
            });
            *count = 0;
            mut_lookup.remove(mutation.pos, key);
            summary.fixed += 1;
        }
    }

    summary
}
