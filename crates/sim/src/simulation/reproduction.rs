//! One generation of clonal Wright-Fisher reproduction.
//!
//! Each offspring copies both gametes of a single parent drawn by the selection
//! policy, then each gamete slot independently acquires a Poisson number of new
//! mutations. Gamete and mutation slots freed in earlier generations are reused
//! before any table grows.
//!
//! The random stream is consumed in a fixed order: for each offspring in index
//! order, the parent draw, then the mutation draws for the first slot, then for
//! the second slot.

use crate::base::{gamete_queue, mutation_queue};
use crate::errors::{ConfigError, SelectionError, SimulationError};
use crate::evolution::{
    MutationContext, MutationModel, RecombinationModel, SelectionPolicy, mutate_gamete,
};
use crate::genome::{Diploid, Gamete, Mutation};
use crate::simulation::fixation::RemovalPolicy;
use crate::simulation::population::{MAX_POPULATION_SIZE, Population};
use rand::Rng;
use rand_distr::Poisson;

/// Recount every mutation from the live gametes.
///
/// `mcounts` is resized to match `mutations`.
pub fn process_gametes(gametes: &[Gamete], mutations: &[Mutation], mcounts: &mut Vec<u32>) {
    mcounts.clear();
    mcounts.resize(mutations.len(), 0);
    for g in gametes.iter().filter(|g| g.n > 0) {
        for key in g.keys() {
            mcounts[key] += g.n;
        }
    }
}

/// Strip fixed mutations from live gametes and empty dead gametes.
///
/// A mutation is stripped when its count equals `two_n` and `policy` prunes
/// it. Dead gametes lose all keys so that no gamete refers to a mutation slot
/// that may be recycled.
pub fn gamete_cleaner(
    gametes: &mut [Gamete],
    mutations: &[Mutation],
    mcounts: &[u32],
    two_n: u32,
    policy: RemovalPolicy,
) {
    let prunes = |key: usize| mcounts[key] == two_n && policy.prunes(&mutations[key]);
    let any_fixed = two_n > 0 && (0..mcounts.len()).any(prunes);

    for g in gametes.iter_mut() {
        if g.n == 0 {
            g.clear();
        } else if any_fixed {
            g.retain_keys(|k| !prunes(k));
        }
    }
}

/// Replace the diploids of `population` with `n_next` clonal offspring.
///
/// `mu` is the total mutation rate per gamete per generation. The
/// recombination model and `selfing_rate` are part of the signature shared
/// with sexual models but have no effect on clonal reproduction.
///
/// The caller sets `population` size to `n_next` afterwards; until then the
/// recorded size refers to the parents.
///
/// Returns the mean fitness of the parents.
///
/// # Errors
/// - [`ConfigError`] if `mu` is negative or `n_next` is too large
/// - [`SelectionError`] if offspring are requested from an empty population, or
///   parent fitness cannot be used as weights
/// - [`InvariantViolation`](crate::errors::InvariantViolation) if bookkeeping
///   is inconsistent before or after the step
///
/// Configuration and selection errors leave `population` unchanged.
#[allow(clippy::too_many_arguments)]
pub fn reproduce<R, M, C, S>(
    rng: &mut R,
    population: &mut Population,
    n_next: u32,
    mu: f64,
    mutation_model: &M,
    _recombination_model: &C,
    selection: &mut S,
    _selfing_rate: f64,
    policy: RemovalPolicy,
) -> Result<f64, SimulationError>
where
    R: Rng + ?Sized,
    M: MutationModel,
    C: RecombinationModel,
    S: SelectionPolicy,
{
    if !(mu.is_finite() && mu >= 0.0) {
        return Err(ConfigError::NegativeRate {
            name: "mutation",
            value: mu,
        }
        .into());
    }
    if n_next > MAX_POPULATION_SIZE {
        return Err(ConfigError::InvalidParameter(format!(
            "population size {n_next} exceeds {MAX_POPULATION_SIZE}"
        ))
        .into());
    }
    population.check_size()?;
    if n_next > 0 && population.diploids.is_empty() {
        return Err(SelectionError::EmptyPopulation.into());
    }
    let poisson = if mu > 0.0 {
        Some(
            Poisson::new(mu)
                .map_err(|e| ConfigError::InvalidParameter(format!("mutation rate {mu}: {e}")))?,
        )
    } else {
        None
    };

    // Free slots must be collected before any count changes.
    let mut gamete_bin = gamete_queue(&population.gametes);
    let mut mutation_bin = mutation_queue(&population.mcounts);
    log::trace!(
        "generation {}: {} free gamete slots, {} free mutation slots",
        population.generation,
        gamete_bin.len(),
        mutation_bin.len()
    );

    selection.refresh(
        &mut population.diploids,
        &population.gametes,
        &population.mutations,
    )?;

    for g in &mut population.gametes {
        g.n = 0;
    }

    let parents = std::mem::replace(
        &mut population.diploids,
        vec![Diploid::default(); n_next as usize],
    );

    {
        let mut ctx = MutationContext {
            gametes: &mut population.gametes,
            mutations: &mut population.mutations,
            lookup: &mut population.mut_lookup,
            gamete_bin: &mut gamete_bin,
            mutation_bin: &mut mutation_bin,
            generation: population.generation,
        };

        for slot in population.diploids.iter_mut() {
            let parent = parents[selection.pick1(rng)];
            ctx.gametes[parent.first].n += 1;
            ctx.gametes[parent.second].n += 1;

            let (first, _) =
                mutate_gamete(rng, poisson.as_ref(), mutation_model, &mut ctx, parent.first);
            let (second, _) =
                mutate_gamete(rng, poisson.as_ref(), mutation_model, &mut ctx, parent.second);

            *slot = Diploid::new(first, second);
            selection.record_offspring(rng, slot, &parent, &parent);
        }
    }

    process_gametes(
        &population.gametes,
        &population.mutations,
        &mut population.mcounts,
    );

    population.check_gamete_sum()?;
    #[cfg(debug_assertions)]
    {
        population.check_diploid_keys()?;
        population.check_mutation_counts()?;
    }

    gamete_cleaner(
        &mut population.gametes,
        &population.mutations,
        &population.mcounts,
        2 * n_next,
        policy,
    );

    Ok(selection.mean_fitness())
}
