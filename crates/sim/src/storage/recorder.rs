//! Per-generation observers.
//!
//! The driver hands the population to a [`Recorder`] after every generation,
//! once fixations have been processed. Any `FnMut(&Population)` closure is a
//! recorder. [`StatsRecorder`] collects [`GenerationStats`] on the generations
//! its [`RecordingStrategy`] selects, optionally with diversity statistics on a
//! random sample of gametes.

use crate::evolution::FitnessModel;
use crate::genome::Mutation;
use crate::simulation::{Population, SimRng};
use crate::storage::RecordingStrategy;
use crate::storage::diversity::{
    GameteSample, normalized_fay_wu_h, nucleotide_diversity, tajimas_d,
};
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Gametes sampled for diversity statistics unless configured otherwise.
pub const DEFAULT_SAMPLE_SIZE: usize = 100;

/// Observes the population after each generation.
pub trait Recorder {
    fn record(&mut self, population: &Population);
}

impl<F: FnMut(&Population)> Recorder for F {
    fn record(&mut self, population: &Population) {
        self(population)
    }
}

/// Records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordNothing;

impl Recorder for RecordNothing {
    fn record(&mut self, _population: &Population) {}
}

/// Summary of one generation.
///
/// Loads are measured against fitness 1: `segregating_load = 1 - w̄`,
/// `relative_load = 1 - w̄ / max(w)`, and `fixed_load = 1 - w_fixed`, where
/// `w_fixed` is the fitness the model gives a genotype homozygous for every
/// recorded selected fixation (`Π(1 + 2s)` under the default multiplicative
/// model).
///
/// The diversity fields are computed on a sample of `sample_size` gametes and
/// stay at zero when no sample was taken. `neutral_*` use neutral sites only,
/// `total_*` use every site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: u32,
    pub n: u32,
    pub mean_fitness: f64,
    pub relative_load: f64,
    pub segregating_load: f64,
    pub fixed_load: f64,
    pub fixed_selected: usize,
    pub fixed_neutral: usize,
    pub mean_selected_per_diploid: f64,
    pub mean_neutral_per_diploid: f64,
    /// Sum of the frequencies of active selected mutations.
    pub cumulative_selected_frequency: f64,
    /// Sum of the frequencies of active neutral mutations.
    pub cumulative_neutral_frequency: f64,
    pub segregating_neutral: usize,
    pub segregating_selected: usize,
    #[serde(default)]
    pub sample_size: usize,
    #[serde(default)]
    pub neutral_pi: f64,
    #[serde(default)]
    pub total_pi: f64,
    #[serde(default)]
    pub neutral_tajimas_d: f64,
    #[serde(default)]
    pub total_tajimas_d: f64,
    #[serde(default)]
    pub neutral_hprime: f64,
    #[serde(default)]
    pub total_hprime: f64,
}

impl GenerationStats {
    /// Compute statistics for `population`, scoring diploids with `model`.
    pub fn compute<F: FitnessModel>(population: &Population, model: &F) -> Self {
        let diploids = population.diploids();
        let gametes = population.gametes();
        let mutations = population.mutations();
        let n = diploids.len();

        let w: Vec<f64> = diploids
            .par_iter()
            .map(|d| model.fitness(d, gametes, mutations))
            .collect();
        let (mean_fitness, max_fitness) = if n == 0 {
            (0.0, 0.0)
        } else {
            (
                w.iter().sum::<f64>() / n as f64,
                w.iter().copied().fold(f64::MIN, f64::max),
            )
        };
        let relative_load = if max_fitness > 0.0 {
            1.0 - mean_fitness / max_fitness
        } else {
            0.0
        };

        let fixations = population.fixations();
        let fixed_neutral = fixations.iter().filter(|f| f.mutation.neutral).count();
        let fixed_selected: Vec<&Mutation> = fixations
            .iter()
            .filter(|f| !f.mutation.neutral)
            .map(|f| &f.mutation)
            .collect();
        let fixed_load = 1.0 - model.fixed_fitness(&fixed_selected);

        let (mut n_selected, mut n_neutral) = (0usize, 0usize);
        for d in diploids {
            for g in [&gametes[d.first], &gametes[d.second]] {
                n_selected += g.smutations.len();
                n_neutral += g.mutations.len();
            }
        }
        let per_diploid = |total: usize| if n == 0 { 0.0 } else { total as f64 / n as f64 };

        let two_n = 2 * population.size();
        let mut stats = Self {
            generation: population.generation(),
            n: population.size(),
            mean_fitness,
            relative_load,
            segregating_load: 1.0 - mean_fitness,
            fixed_load,
            fixed_selected: fixed_selected.len(),
            fixed_neutral,
            mean_selected_per_diploid: per_diploid(n_selected),
            mean_neutral_per_diploid: per_diploid(n_neutral),
            cumulative_selected_frequency: 0.0,
            cumulative_neutral_frequency: 0.0,
            segregating_neutral: 0,
            segregating_selected: 0,
            sample_size: 0,
            neutral_pi: 0.0,
            total_pi: 0.0,
            neutral_tajimas_d: 0.0,
            total_tajimas_d: 0.0,
            neutral_hprime: 0.0,
            total_hprime: 0.0,
        };
        if two_n == 0 {
            return stats;
        }

        for (m, &c) in mutations.iter().zip(population.mcounts()) {
            if c == 0 {
                continue;
            }
            let freq = f64::from(c) / f64::from(two_n);
            let segregating = usize::from(c < two_n);
            if m.neutral {
                stats.cumulative_neutral_frequency += freq;
                stats.segregating_neutral += segregating;
            } else {
                stats.cumulative_selected_frequency += freq;
                stats.segregating_selected += segregating;
            }
        }
        stats
    }

    /// Fill in the diversity statistics from `sample`.
    pub fn with_diversity(mut self, sample: &GameteSample) -> Self {
        let n = sample.size;
        let total = sample.combined();
        self.sample_size = n;
        self.neutral_pi = nucleotide_diversity(&sample.neutral, n);
        self.total_pi = nucleotide_diversity(&total, n);
        self.neutral_tajimas_d = tajimas_d(&sample.neutral, n);
        self.total_tajimas_d = tajimas_d(&total, n);
        self.neutral_hprime = normalized_fay_wu_h(&sample.neutral, n);
        self.total_hprime = normalized_fay_wu_h(&total, n);
        self
    }
}

/// Size and seed of the gamete sample taken on each recorded generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sampling {
    pub size: usize,
    pub seed: u64,
}

impl Sampling {
    /// Generator for the sample of `generation`. Each generation has its own
    /// stream, so a sample does not depend on which generations came before.
    fn rng(&self, generation: u32) -> SimRng {
        SimRng::seed_from_u64(self.seed.wrapping_add(u64::from(generation)))
    }
}

/// Collects [`GenerationStats`] on selected generations.
#[derive(Debug, Clone)]
pub struct StatsRecorder<F> {
    model: F,
    strategy: RecordingStrategy,
    sampling: Option<Sampling>,
    stats: Vec<GenerationStats>,
}

impl<F: FitnessModel> StatsRecorder<F> {
    pub fn new(model: F, strategy: RecordingStrategy) -> Self {
        Self {
            model,
            strategy,
            sampling: None,
            stats: Vec::new(),
        }
    }

    /// Also compute diversity statistics on `size` gametes per recorded
    /// generation. A size of zero turns sampling off.
    pub fn with_sampling(mut self, size: usize, seed: u64) -> Self {
        self.sampling = (size > 0).then_some(Sampling { size, seed });
        self
    }

    pub fn stats(&self) -> &[GenerationStats] {
        &self.stats
    }

    pub fn last(&self) -> Option<&GenerationStats> {
        self.stats.last()
    }

    pub fn into_stats(self) -> Vec<GenerationStats> {
        self.stats
    }
}

impl<F: FitnessModel> Recorder for StatsRecorder<F> {
    fn record(&mut self, population: &Population) {
        let generation = population.generation();
        if !self.strategy.should_record(generation) {
            return;
        }
        let mut stats = GenerationStats::compute(population, &self.model);
        if let Some(sampling) = self.sampling {
            let mut rng = sampling.rng(generation);
            let sample = GameteSample::draw(&mut rng, population, sampling.size);
            stats = stats.with_diversity(&sample);
        }
        self.stats.push(stats);
    }
}
