//! Mutation policies.
//!
//! New mutations follow the infinite-sites model: every event lands on a
//! position not currently occupied by another active mutation. Each event is
//! either neutral or selected, with probability proportional to the neutral
//! and selected rates. The position is drawn uniformly within a region chosen
//! by weight, and selected mutations draw their effect size from the region's
//! [`EffectDistribution`].
//!
//! The per-gamete adapter [`mutate_gamete`] draws a Poisson number of events
//! for one haplotype slot and, when that number is positive, replaces the slot
//! with a recycled copy of the gamete that carries the new mutations.

use crate::base::{RecyclingBin, recycle};
use crate::errors::ConfigError;
use crate::genome::{Gamete, Mutation, MutationLookup};
use rand::Rng;
use rand::distr::weighted::WeightedIndex;
use rand_distr::{Distribution, Exp, Gamma, Normal, Poisson};
use serde::{Deserialize, Serialize};

/// A half-open interval `[beg, end)` with a relative weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub beg: f64,
    pub end: f64,
    pub weight: f64,
}

impl Region {
    /// # Errors
    /// Returns an error if the interval is empty or not finite, or the weight
    /// is not positive.
    pub fn new(beg: f64, end: f64, weight: f64) -> Result<Self, ConfigError> {
        let region = Self { beg, end, weight };
        region.validate()?;
        Ok(region)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.beg.is_finite() && self.end.is_finite()) || self.beg >= self.end {
            return Err(ConfigError::InvalidRegion(format!(
                "[{}, {}) is not a valid interval",
                self.beg, self.end
            )));
        }
        if !(self.weight.is_finite() && self.weight > 0.0) {
            return Err(ConfigError::InvalidRegion(format!(
                "weight {} must be positive",
                self.weight
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn sample_position<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.random_range(self.beg..self.end)
    }
}

impl Default for Region {
    fn default() -> Self {
        Self {
            beg: 0.0,
            end: 1.0,
            weight: 1.0,
        }
    }
}

/// Distribution of effect sizes for selected mutations.
///
/// Negative means produce deleterious mutations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectDistribution {
    /// Every mutation has effect `s`.
    Constant { s: f64 },
    /// Exponential with the given mean (sign of the mean gives the sign of `s`).
    Exponential { mean: f64 },
    /// Gamma with the given mean and shape (sign of the mean gives the sign of `s`).
    Gamma { mean: f64, shape: f64 },
    /// Uniform on `[lo, hi)`.
    Uniform { lo: f64, hi: f64 },
    /// Normal with mean zero.
    Gaussian { sd: f64 },
}

impl EffectDistribution {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ok = match *self {
            Self::Constant { s } => s.is_finite(),
            Self::Exponential { mean } => mean.is_finite() && mean != 0.0,
            Self::Gamma { mean, shape } => {
                mean.is_finite() && mean != 0.0 && shape.is_finite() && shape > 0.0
            }
            Self::Uniform { lo, hi } => lo.is_finite() && hi.is_finite() && lo < hi,
            Self::Gaussian { sd } => sd.is_finite() && sd > 0.0,
        };
        if ok {
            Ok(())
        } else {
            Err(ConfigError::InvalidParameter(format!(
                "invalid effect size distribution {self:?}"
            )))
        }
    }

    /// Draw one effect size. Call [`validate`](Self::validate) first; invalid
    /// parameters yield `NaN`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            Self::Constant { s } => s,
            Self::Exponential { mean } => Exp::new(1.0 / mean.abs())
                .map(|d| mean.signum() * d.sample(rng))
                .unwrap_or(f64::NAN),
            Self::Gamma { mean, shape } => Gamma::new(shape, mean.abs() / shape)
                .map(|d| mean.signum() * d.sample(rng))
                .unwrap_or(f64::NAN),
            Self::Uniform { lo, hi } => rng.random_range(lo..hi),
            Self::Gaussian { sd } => Normal::new(0.0, sd)
                .map(|d| d.sample(rng))
                .unwrap_or(f64::NAN),
        }
    }
}

/// A region accepting selected mutations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectedRegion {
    pub region: Region,
    pub effect: EffectDistribution,
    /// Dominance assigned to every mutation arising here.
    pub h: f64,
}

impl SelectedRegion {
    pub fn new(region: Region, effect: EffectDistribution, h: f64) -> Result<Self, ConfigError> {
        region.validate()?;
        effect.validate()?;
        if !h.is_finite() {
            return Err(ConfigError::InvalidParameter(format!(
                "dominance must be finite, got {h}"
            )));
        }
        Ok(Self { region, effect, h })
    }
}

/// A source of new mutations.
///
/// Implementations create one mutation, store it in the lowest free slot of
/// `mutations` (or append), mark its position in `lookup` and return its key.
pub trait MutationModel {
    fn new_mutation<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        bin: &mut RecyclingBin,
        mutations: &mut Vec<Mutation>,
        lookup: &mut MutationLookup,
        generation: u32,
    ) -> usize;
}

/// Mutation model over weighted neutral and selected regions.
#[derive(Debug, Clone)]
pub struct RegionMutationModel {
    mu_neutral: f64,
    mu_selected: f64,
    neutral: Vec<Region>,
    selected: Vec<SelectedRegion>,
    neutral_index: Option<WeightedIndex<f64>>,
    selected_index: Option<WeightedIndex<f64>>,
}

impl RegionMutationModel {
    /// Build the model.
    ///
    /// # Errors
    /// Returns an error if a rate is negative, a region or effect distribution
    /// is invalid, or a positive rate has no region to land in.
    pub fn new(
        mu_neutral: f64,
        mu_selected: f64,
        neutral: Vec<Region>,
        selected: Vec<SelectedRegion>,
    ) -> Result<Self, ConfigError> {
        check_rate("neutral mutation", mu_neutral)?;
        check_rate("selected mutation", mu_selected)?;
        for r in &neutral {
            r.validate()?;
        }
        for r in &selected {
            r.region.validate()?;
            r.effect.validate()?;
        }
        if mu_neutral > 0.0 && neutral.is_empty() {
            return Err(ConfigError::InvalidParameter(
                "neutral mutation rate is positive but no neutral regions were given".into(),
            ));
        }
        if mu_selected > 0.0 && selected.is_empty() {
            return Err(ConfigError::InvalidParameter(
                "selected mutation rate is positive but no selected regions were given".into(),
            ));
        }

        let neutral_index = weighted(neutral.iter().map(|r| r.weight))?;
        let selected_index = weighted(selected.iter().map(|r| r.region.weight))?;

        Ok(Self {
            mu_neutral,
            mu_selected,
            neutral,
            selected,
            neutral_index,
            selected_index,
        })
    }

    /// Neutral mutations only, uniform on `[0, 1)`.
    pub fn neutral(mu: f64) -> Result<Self, ConfigError> {
        Self::new(mu, 0.0, vec![Region::default()], Vec::new())
    }

    pub fn mu_neutral(&self) -> f64 {
        self.mu_neutral
    }

    pub fn mu_selected(&self) -> f64 {
        self.mu_selected
    }

    /// Total rate per gamete per generation.
    pub fn total_rate(&self) -> f64 {
        self.mu_neutral + self.mu_selected
    }

    /// Probability that an event is neutral.
    fn neutral_probability(&self) -> f64 {
        let total = self.total_rate();
        if total > 0.0 {
            self.mu_neutral / total
        } else if self.neutral.is_empty() {
            0.0
        } else {
            1.0
        }
    }

    /// Draw a position in `region` that no active mutation occupies.
    fn free_position<R: Rng + ?Sized>(
        rng: &mut R,
        region: &Region,
        lookup: &MutationLookup,
    ) -> f64 {
        loop {
            let pos = region.sample_position(rng);
            if !lookup.contains(pos) {
                return pos;
            }
        }
    }
}

impl MutationModel for RegionMutationModel {
    fn new_mutation<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        bin: &mut RecyclingBin,
        mutations: &mut Vec<Mutation>,
        lookup: &mut MutationLookup,
        generation: u32,
    ) -> usize {
        let p_neutral = self.neutral_probability();
        let is_neutral = p_neutral >= 1.0 || (p_neutral > 0.0 && rng.random::<f64>() < p_neutral);

        let mutation = match (&self.neutral_index, &self.selected_index) {
            (Some(idx), _) if is_neutral => {
                let region = &self.neutral[idx.sample(rng)];
                let pos = Self::free_position(rng, region, lookup);
                Mutation::neutral(pos, generation)
            }
            (_, Some(idx)) => {
                let sregion = &self.selected[idx.sample(rng)];
                let pos = Self::free_position(rng, &sregion.region, lookup);
                let s = sregion.effect.sample(rng);
                Mutation::selected(pos, s, sregion.h, generation)
            }
            (Some(idx), None) => {
                let region = &self.neutral[idx.sample(rng)];
                let pos = Self::free_position(rng, region, lookup);
                Mutation::neutral(pos, generation)
            }
            // Unreachable for a model built through `new`: it always has a region.
            (None, None) => Mutation::neutral(f64::NAN, generation),
        };

        let pos = mutation.pos;
        let key = recycle(bin, mutations, mutation);
        lookup.insert(pos, key);
        key
    }
}

pub(crate) fn check_rate(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NegativeRate { name, value })
    }
}

fn weighted(
    weights: impl Iterator<Item = f64>,
) -> Result<Option<WeightedIndex<f64>>, ConfigError> {
    let weights: Vec<f64> = weights.collect();
    if weights.is_empty() {
        return Ok(None);
    }
    WeightedIndex::new(&weights)
        .map(Some)
        .map_err(|e| ConfigError::InvalidRegion(format!("region weights: {e}")))
}

/// Mutable views of the population tables needed to add mutations.
pub struct MutationContext<'a> {
    pub gametes: &'a mut Vec<Gamete>,
    pub mutations: &'a mut Vec<Mutation>,
    pub lookup: &'a mut MutationLookup,
    pub gamete_bin: &'a mut RecyclingBin,
    pub mutation_bin: &'a mut RecyclingBin,
    pub generation: u32,
}

/// Apply new mutations to the gamete in one offspring slot.
///
/// Draws the number of events from `poisson` (no draw at all when `poisson`
/// is `None`, i.e. a zero rate). With no events the slot keeps `key`.
/// Otherwise the count of `key` is decremented and a recycled copy carrying
/// every new mutation is returned with `n == 1`.
///
/// Returns the key now occupying the slot and the number of mutations added.
pub fn mutate_gamete<R, M>(
    rng: &mut R,
    poisson: Option<&Poisson<f64>>,
    model: &M,
    ctx: &mut MutationContext<'_>,
    key: usize,
) -> (usize, usize)
where
    R: Rng + ?Sized,
    M: MutationModel,
{
    let Some(poisson) = poisson else {
        return (key, 0);
    };
    let nm = poisson.sample(rng) as usize;
    if nm == 0 {
        return (key, 0);
    }

    debug_assert!(ctx.gametes[key].n > 0);
    ctx.gametes[key].n -= 1;

    let parent = &ctx.gametes[key];
    let mut offspring =
        Gamete::with_mutations(1, parent.mutations.clone(), parent.smutations.clone());
    for _ in 0..nm {
        let mkey = model.new_mutation(
            rng,
            ctx.mutation_bin,
            ctx.mutations,
            ctx.lookup,
            ctx.generation,
        );
        offspring.insert(mkey, ctx.mutations);
    }

    (recycle(ctx.gamete_bin, ctx.gametes, offspring), nm)
}
