//! Fitness models and parent sampling.
//!
//! A [`FitnessModel`] scores one diploid from the selected mutations carried on
//! its two gametes. A [`SelectionPolicy`] turns those scores into a sampling
//! distribution over the current parents; [`WrightFisherRules`] is the standard
//! policy, sampling parents with replacement in proportion to fitness.
//!
//! ## Site-based models
//!
//! Both built-in non-trivial models walk the two sorted selected-mutation lists
//! of a diploid in parallel. A mutation present on both gametes is homozygous
//! and contributes `scaling * s`; a mutation on one gamete contributes `h * s`.
//! - **Multiplicative**: `w = Π (1 + contribution)`
//! - **Additive**: `w = 1 + Σ contribution`
//!
//! Negative fitness is clamped to zero.

use crate::errors::SelectionError;
use crate::genome::{Diploid, Gamete, Mutation};
use crate::simulation::Population;
use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Scores the fitness of a diploid.
///
/// Implementations must be pure: fitness is evaluated in parallel, so the
/// result may depend only on the arguments.
pub trait FitnessModel: Sync {
    fn fitness(&self, diploid: &Diploid, gametes: &[Gamete], mutations: &[Mutation]) -> f64;

    /// Fitness of a genotype homozygous for every mutation in `fixed` and
    /// carrying nothing else. Used to express the load of recorded fixations.
    /// The default treats fixations as having no effect.
    fn fixed_fitness(&self, _fixed: &[&Mutation]) -> f64 {
        1.0
    }

    /// Hook for models with population-level state. Called once per generation
    /// before any fitness is evaluated. The default does nothing.
    fn update(&mut self, _population: &Population) {}
}

/// Fold the selected mutations of a diploid.
///
/// `hom` is applied to mutations carried by both gametes and `het` to the rest.
fn fold_selected<T>(
    diploid: &Diploid,
    gametes: &[Gamete],
    mutations: &[Mutation],
    init: T,
    mut hom: impl FnMut(T, &Mutation) -> T,
    mut het: impl FnMut(T, &Mutation) -> T,
) -> T {
    let a = &gametes[diploid.first].smutations;
    let b = &gametes[diploid.second].smutations;
    let mut acc = init;
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        let (ka, kb) = (a[i], b[j]);
        if ka == kb {
            acc = hom(acc, &mutations[ka]);
            i += 1;
            j += 1;
        } else if mutations[ka].pos < mutations[kb].pos {
            acc = het(acc, &mutations[ka]);
            i += 1;
        } else {
            acc = het(acc, &mutations[kb]);
            j += 1;
        }
    }
    for &k in &a[i..] {
        acc = het(acc, &mutations[k]);
    }
    for &k in &b[j..] {
        acc = het(acc, &mutations[k]);
    }
    acc
}

/// Multiplicative fitness across sites.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Multiplicative {
    /// Multiplier of `s` in homozygotes. `2.0` gives fitnesses `1`, `1 + hs`, `1 + 2s`.
    pub scaling: f64,
}

impl Default for Multiplicative {
    fn default() -> Self {
        Self { scaling: 2.0 }
    }
}

impl FitnessModel for Multiplicative {
    fn fitness(&self, diploid: &Diploid, gametes: &[Gamete], mutations: &[Mutation]) -> f64 {
        let w = fold_selected(
            diploid,
            gametes,
            mutations,
            1.0,
            |w, m| w * (1.0 + self.scaling * m.s),
            |w, m| w * (1.0 + m.h * m.s),
        );
        w.max(0.0)
    }

    fn fixed_fitness(&self, fixed: &[&Mutation]) -> f64 {
        fixed
            .iter()
            .map(|m| 1.0 + self.scaling * m.s)
            .product::<f64>()
            .max(0.0)
    }
}

/// Additive fitness across sites.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Additive {
    pub scaling: f64,
}

impl Default for Additive {
    fn default() -> Self {
        Self { scaling: 2.0 }
    }
}

impl FitnessModel for Additive {
    fn fitness(&self, diploid: &Diploid, gametes: &[Gamete], mutations: &[Mutation]) -> f64 {
        let sum = fold_selected(
            diploid,
            gametes,
            mutations,
            0.0,
            |acc, m| acc + self.scaling * m.s,
            |acc, m| acc + m.h * m.s,
        );
        (1.0 + sum).max(0.0)
    }

    fn fixed_fitness(&self, fixed: &[&Mutation]) -> f64 {
        (1.0 + fixed.iter().map(|m| self.scaling * m.s).sum::<f64>()).max(0.0)
    }
}

/// Every diploid has fitness 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Neutral;

impl FitnessModel for Neutral {
    fn fitness(&self, _diploid: &Diploid, _gametes: &[Gamete], _mutations: &[Mutation]) -> f64 {
        1.0
    }
}

/// Fitness model chosen at run time, e.g. from a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FitnessKind {
    Multiplicative { scaling: f64 },
    Additive { scaling: f64 },
    Neutral,
}

impl Default for FitnessKind {
    fn default() -> Self {
        Self::Multiplicative { scaling: 2.0 }
    }
}

impl FitnessModel for FitnessKind {
    fn fitness(&self, diploid: &Diploid, gametes: &[Gamete], mutations: &[Mutation]) -> f64 {
        match *self {
            Self::Multiplicative { scaling } => {
                Multiplicative { scaling }.fitness(diploid, gametes, mutations)
            }
            Self::Additive { scaling } => Additive { scaling }.fitness(diploid, gametes, mutations),
            Self::Neutral => 1.0,
        }
    }

    fn fixed_fitness(&self, fixed: &[&Mutation]) -> f64 {
        match *self {
            Self::Multiplicative { scaling } => Multiplicative { scaling }.fixed_fitness(fixed),
            Self::Additive { scaling } => Additive { scaling }.fixed_fitness(fixed),
            Self::Neutral => Neutral.fixed_fitness(fixed),
        }
    }
}

/// Parent sampling for one generation.
///
/// The reproduction step calls [`refresh`](Self::refresh) once with the
/// current parents, then [`pick1`](Self::pick1) once per offspring, then
/// [`mean_fitness`](Self::mean_fitness).
pub trait SelectionPolicy {
    /// Model-level hook, called by the driver before each generation.
    fn update(&mut self, _population: &Population) {}

    /// Recompute fitness for every parent and rebuild the sampler.
    ///
    /// Writes each diploid's fitness into `w`. An empty parent set is accepted;
    /// the caller must not sample from it.
    ///
    /// # Errors
    /// Returns an error if the fitness values cannot be used as weights. The
    /// diploids are left unchanged in that case.
    fn refresh(
        &mut self,
        diploids: &mut [Diploid],
        gametes: &[Gamete],
        mutations: &[Mutation],
    ) -> Result<(), SelectionError>;

    /// Index of one parent, drawn with replacement.
    fn pick1<R: Rng + ?Sized>(&self, rng: &mut R) -> usize;

    /// Per-offspring hook. The default does nothing.
    fn record_offspring<R: Rng + ?Sized>(
        &mut self,
        _rng: &mut R,
        _offspring: &Diploid,
        _parent1: &Diploid,
        _parent2: &Diploid,
    ) {
    }

    /// Mean fitness of the parents seen by the last refresh.
    fn mean_fitness(&self) -> f64;
}

/// Fitness-proportional sampling with replacement.
#[derive(Debug, Clone)]
pub struct WrightFisherRules<F> {
    model: F,
    fitnesses: Vec<f64>,
    wbar: f64,
    sampler: Option<WeightedIndex<f64>>,
}

impl<F: FitnessModel> WrightFisherRules<F> {
    pub fn new(model: F) -> Self {
        Self {
            model,
            fitnesses: Vec::new(),
            wbar: 0.0,
            sampler: None,
        }
    }

    pub fn model(&self) -> &F {
        &self.model
    }

    /// Fitness of each parent from the last refresh.
    pub fn fitnesses(&self) -> &[f64] {
        &self.fitnesses
    }
}

impl<F: FitnessModel> SelectionPolicy for WrightFisherRules<F> {
    fn update(&mut self, population: &Population) {
        self.model.update(population);
    }

    fn refresh(
        &mut self,
        diploids: &mut [Diploid],
        gametes: &[Gamete],
        mutations: &[Mutation],
    ) -> Result<(), SelectionError> {
        let model = &self.model;
        self.sampler = None;
        diploids
            .par_iter()
            .map(|d| model.fitness(d, gametes, mutations))
            .collect_into_vec(&mut self.fitnesses);

        if self.fitnesses.is_empty() {
            self.wbar = 0.0;
            return Ok(());
        }

        if let Some((i, w)) = self
            .fitnesses
            .iter()
            .enumerate()
            .find(|&(_, w)| !w.is_finite() || *w < 0.0)
        {
            return Err(SelectionError::InvalidWeights(format!(
                "diploid {i} has fitness {w}"
            )));
        }

        let sampler = WeightedIndex::new(&self.fitnesses)
            .map_err(|e| SelectionError::InvalidWeights(e.to_string()))?;

        // Parents are only touched once the sampler is usable.
        for (d, &w) in diploids.iter_mut().zip(&self.fitnesses) {
            d.w = w;
        }
        let total: f64 = self.fitnesses.iter().sum();
        self.wbar = total / self.fitnesses.len() as f64;
        self.sampler = Some(sampler);
        Ok(())
    }

    fn pick1<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        self.sampler.as_ref().map_or(0, |s| s.sample(rng))
    }

    fn mean_fitness(&self) -> f64 {
        self.wbar
    }
}
