//! Generation driver.
//!
//! [`evolve`] runs the clonal reproduction step once per entry of a
//! demographic schedule, tracks fixations and losses, and hands the population
//! to a recorder after every generation. [`Simulation`] bundles a population,
//! its models and a seeded RNG for step-by-step runs built from a
//! [`Configuration`].

use crate::errors::{ConfigError, SimulationError};
use crate::evolution::{
    FitnessKind, MutationModel, RecombinationModel, RegionMutationModel,
    RegionRecombinationModel, SelectionPolicy, WrightFisherRules,
};
use crate::simulation::configs::Configuration;
use crate::simulation::fixation::update_mutations;
use crate::simulation::parameters::EvolveParams;
use crate::simulation::population::Population;
use crate::simulation::reproduction::reproduce;
use crate::storage::Recorder;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Random number generator used by [`Simulation`].
pub type SimRng = Xoshiro256PlusPlus;

/// Rough number of mutation slots a population of `n` will need:
/// `ceil(ln(2N) * (θ + 0.667θ))` with `θ = 4Nμ`.
fn expected_mutations(n: u32, mu: f64) -> usize {
    let theta = 4.0 * f64::from(n) * mu;
    let estimate = ((2.0 * f64::from(n)).ln() * (theta + 0.667 * theta)).ceil();
    if estimate.is_finite() && estimate > 0.0 {
        estimate as usize
    } else {
        0
    }
}

/// Evolve `population` through every size in `params.demography`.
///
/// Parameters are validated before the population is touched. The generation
/// counter advances by one per schedule entry; fixations and recorder calls
/// see the generation just produced. The recombination model and selfing rate
/// are accepted but have no effect on clonal reproduction.
///
/// # Errors
/// Returns the first configuration, selection or consistency error. After a
/// selection error the population holds the state of the last completed
/// generation. An invariant violation means the population is corrupt and
/// must not be evolved further.
pub fn evolve<R, M, C, S, Rec>(
    rng: &mut R,
    population: &mut Population,
    params: &EvolveParams,
    mutation_model: &M,
    recombination_model: &C,
    selection: &mut S,
    recorder: &mut Rec,
) -> Result<(), SimulationError>
where
    R: Rng + ?Sized,
    M: MutationModel,
    C: RecombinationModel,
    S: SelectionPolicy,
    Rec: Recorder,
{
    params.validate()?;
    let policy = params.removal_policy();
    let mu = params.total_mutation_rate();

    population.reserve_mutations(expected_mutations(population.n, mu));

    log::info!(
        "Evolving {} generations from generation {} (N = {}, mu = {mu})",
        params.demography.len(),
        population.generation,
        population.n
    );

    for &n_next in &params.demography {
        population.generation += 1;
        selection.update(population);
        let wbar = match reproduce(
            rng,
            population,
            n_next,
            mu,
            mutation_model,
            recombination_model,
            selection,
            params.selfing_rate,
            policy,
        ) {
            Ok(wbar) => wbar,
            Err(e) => {
                population.generation -= 1;
                return Err(e);
            }
        };
        population.n = n_next;
        let summary = update_mutations(population, policy);
        log::debug!(
            "generation {}: N = {n_next}, wbar = {wbar:.6}, fixed = {}, lost = {}",
            population.generation,
            summary.fixed,
            summary.lost
        );
        recorder.record(population);
    }

    log::info!(
        "Finished at generation {} with {} fixations recorded",
        population.generation,
        population.fixations.len()
    );
    Ok(())
}

/// A configured run advanced one generation at a time.
#[derive(Debug)]
pub struct Simulation {
    population: Population,
    params: EvolveParams,
    mutation_model: RegionMutationModel,
    recombination_model: RegionRecombinationModel,
    selection: WrightFisherRules<FitnessKind>,
    rng: SimRng,
    seed: u64,
    cursor: usize,
}

impl Simulation {
    /// Build a run from a configuration.
    ///
    /// `seed` overrides the configured seed; without either a random seed is
    /// drawn and can be read back with [`seed`](Self::seed).
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn from_config(
        config: &Configuration,
        seed: Option<u64>,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        let population = Population::new(config.execution.population_size)
            .map_err(|e| ConfigError::InvalidParameter(e.to_string()))?;
        let seed = seed
            .or(config.execution.seed)
            .unwrap_or_else(|| rand::rng().random());

        Self::resume(config, population, SimRng::seed_from_u64(seed), seed)
    }

    /// Continue a saved population under `config`.
    ///
    /// The configured schedule runs from the population's current generation,
    /// drawing from `rng` where the earlier run left off. Together with
    /// [`population`](Self::population) and [`rng`](Self::rng) of a finished
    /// run, this splits one long run into pieces with identical results.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the population is
    /// inconsistent.
    pub fn resume(
        config: &Configuration,
        population: Population,
        rng: SimRng,
        seed: u64,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        population.check_all()?;
        Ok(Self {
            population,
            params: config.to_params()?,
            mutation_model: config.mutation_model()?,
            recombination_model: config.recombination_model()?,
            selection: config.selection(),
            rng,
            seed,
            cursor: 0,
        })
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn generation(&self) -> u32 {
        self.population.generation()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Current generator state; pass it to [`resume`](Self::resume) to continue.
    pub fn rng(&self) -> &SimRng {
        &self.rng
    }

    pub fn params(&self) -> &EvolveParams {
        &self.params
    }

    /// Total number of generations in the schedule.
    pub fn total_generations(&self) -> usize {
        self.params.demography.len()
    }

    /// Generations still to run.
    pub fn remaining(&self) -> usize {
        self.total_generations() - self.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.remaining() == 0
    }

    fn params_for(&self, demography: Vec<u32>) -> EvolveParams {
        EvolveParams {
            demography,
            mu_neutral: self.params.mu_neutral,
            mu_selected: self.params.mu_selected,
            recombination_rate: self.params.recombination_rate,
            selfing_rate: self.params.selfing_rate,
            prune_selected: self.params.prune_selected,
        }
    }

    /// Advance by one generation. Returns `false` once the schedule is exhausted.
    ///
    /// # Errors
    /// See [`evolve`].
    pub fn step<Rec: Recorder>(&mut self, recorder: &mut Rec) -> Result<bool, SimulationError> {
        let Some(&n_next) = self.params.demography.get(self.cursor) else {
            return Ok(false);
        };
        let params = self.params_for(vec![n_next]);
        evolve(
            &mut self.rng,
            &mut self.population,
            &params,
            &self.mutation_model,
            &self.recombination_model,
            &mut self.selection,
            recorder,
        )?;
        self.cursor += 1;
        Ok(true)
    }

    /// Run the rest of the schedule.
    ///
    /// # Errors
    /// See [`evolve`]. Generations completed before the error are counted as
    /// run, so [`remaining`](Self::remaining) stays in step with the population.
    pub fn run<Rec: Recorder>(&mut self, recorder: &mut Rec) -> Result<(), SimulationError> {
        let params = self.params_for(self.params.demography[self.cursor..].to_vec());
        if params.demography.is_empty() {
            return Ok(());
        }
        let start = self.population.generation();
        let result = evolve(
            &mut self.rng,
            &mut self.population,
            &params,
            &self.mutation_model,
            &self.recombination_model,
            &mut self.selection,
            recorder,
        );
        self.cursor += (self.population.generation() - start) as usize;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SelectionError;
    use crate::evolution::{Neutral, NoRecombination};
    use crate::genome::{Diploid, Gamete, Mutation};
    use crate::simulation::Demography;
    use crate::storage::RecordNothing;

    /// Every diploid homozygous for a mutation that drops fitness to zero.
    fn lethal_population(n: usize) -> Population {
        let mutations = vec![Mutation::selected(0.5, -0.5, 0.5, 0)];
        let gametes = vec![Gamete::with_mutations(0, vec![], vec![0])];
        let diploids = vec![Diploid::new(0, 0); n];
        Population::from_parts(diploids, gametes, mutations).unwrap()
    }

    fn test_config() -> Configuration {
        let mut config = Configuration::default();
        config.execution.population_size = 20;
        config.execution.seed = Some(42);
        config.demography = Demography::constant(20, 5);
        config
    }

    #[test]
    fn test_expected_mutations() {
        assert_eq!(expected_mutations(0, 0.1), 0);
        assert_eq!(expected_mutations(100, 0.0), 0);
        assert!(expected_mutations(100, 0.01) > 0);
        // θ = 4, ln(200) * 4 * 1.667 = 35.33
        assert_eq!(expected_mutations(100, 0.01), 36);
    }

    #[test]
    fn test_evolve_advances_generation_per_entry() {
        let mut rng = SimRng::seed_from_u64(42);
        let mut pop = Population::new(10).unwrap();
        pop.set_generation(7);
        let model = RegionMutationModel::neutral(0.1).unwrap();
        let mut rules = WrightFisherRules::new(Neutral);
        let mut seen = Vec::new();
        let mut recorder = |p: &Population| seen.push((p.generation(), p.size()));

        let params = EvolveParams::new(vec![10, 12, 8]).with_mutation_rates(0.1, 0.0);
        evolve(
            &mut rng,
            &mut pop,
            &params,
            &model,
            &NoRecombination,
            &mut rules,
            &mut recorder,
        )
        .unwrap();

        assert_eq!(pop.generation(), 10);
        assert_eq!(seen, vec![(8, 10), (9, 12), (10, 8)]);
    }

    #[test]
    fn test_evolve_rejects_invalid_params_without_side_effects() {
        let mut rng = SimRng::seed_from_u64(42);
        let mut pop = Population::new(10).unwrap();
        let before = pop.clone();
        let model = RegionMutationModel::neutral(0.0).unwrap();
        let mut rules = WrightFisherRules::new(Neutral);

        let err = evolve(
            &mut rng,
            &mut pop,
            &EvolveParams::new(vec![]),
            &model,
            &NoRecombination,
            &mut rules,
            &mut RecordNothing,
        );
        assert_eq!(
            err,
            Err(SimulationError::Config(ConfigError::EmptyDemography))
        );
        assert_eq!(pop, before);
    }

    #[test]
    fn test_failed_generation_leaves_population_untouched() {
        let mut rng = SimRng::seed_from_u64(42);
        let mut pop = lethal_population(10);
        pop.set_generation(5);
        let before = pop.clone();
        let model = RegionMutationModel::neutral(0.1).unwrap();
        let mut rules = WrightFisherRules::new(FitnessKind::default());
        let mut calls = 0;
        let mut recorder = |_: &Population| calls += 1;

        let err = evolve(
            &mut rng,
            &mut pop,
            &EvolveParams::new(vec![10, 10]).with_mutation_rates(0.1, 0.0),
            &model,
            &NoRecombination,
            &mut rules,
            &mut recorder,
        );
        assert!(matches!(
            err,
            Err(SimulationError::Selection(SelectionError::InvalidWeights(_)))
        ));
        assert_eq!(calls, 0);
        assert_eq!(pop, before);
        assert_eq!(pop.generation(), 5);
    }

    #[test]
    fn test_failed_run_keeps_schedule_in_step() {
        let mut sim = Simulation::from_config(&test_config(), None).unwrap();
        assert!(sim.step(&mut RecordNothing).unwrap());
        assert!(sim.step(&mut RecordNothing).unwrap());

        let mut lethal = lethal_population(20);
        lethal.set_generation(sim.generation());
        sim.population = lethal.clone();

        assert!(sim.run(&mut RecordNothing).is_err());
        assert_eq!(sim.population(), &lethal);
        assert_eq!(sim.generation(), 2);
        assert_eq!(sim.remaining(), 3);
        assert!(sim.step(&mut RecordNothing).is_err());
        assert_eq!(sim.remaining(), 3);
    }

    #[test]
    fn test_resume_continues_the_same_run() {
        let mut config = test_config();
        config.demography = Demography::constant(20, 6);
        let mut whole = Simulation::from_config(&config, None).unwrap();
        whole.run(&mut RecordNothing).unwrap();

        config.demography = Demography::constant(20, 3);
        let mut first = Simulation::from_config(&config, None).unwrap();
        first.run(&mut RecordNothing).unwrap();
        let mut second = Simulation::resume(
            &config,
            first.population().clone(),
            first.rng().clone(),
            first.seed(),
        )
        .unwrap();
        assert_eq!(second.generation(), 3);
        assert_eq!(second.remaining(), 3);
        second.run(&mut RecordNothing).unwrap();

        assert_eq!(second.population(), whole.population());
        assert_eq!(second.rng(), whole.rng());
    }

    #[test]
    fn test_simulation_step_and_run() {
        let mut sim = Simulation::from_config(&test_config(), None).unwrap();
        assert_eq!(sim.seed(), 42);
        assert_eq!(sim.generation(), 0);
        assert_eq!(sim.total_generations(), 5);

        assert!(sim.step(&mut RecordNothing).unwrap());
        assert_eq!(sim.generation(), 1);
        assert_eq!(sim.remaining(), 4);

        sim.run(&mut RecordNothing).unwrap();
        assert_eq!(sim.generation(), 5);
        assert!(sim.is_finished());
        assert!(!sim.step(&mut RecordNothing).unwrap());
        sim.population().check_all().unwrap();
    }

    #[test]
    fn test_stepping_matches_single_run() {
        let config = test_config();
        let mut stepped = Simulation::from_config(&config, None).unwrap();
        while stepped.step(&mut RecordNothing).unwrap() {}

        let mut whole = Simulation::from_config(&config, None).unwrap();
        whole.run(&mut RecordNothing).unwrap();

        assert_eq!(stepped.population(), whole.population());
    }

    #[test]
    fn test_seed_override() {
        let sim = Simulation::from_config(&test_config(), Some(7)).unwrap();
        assert_eq!(sim.seed(), 7);
    }
}
