//! Crossover breakpoint policies.
//!
//! Reproduction in this crate is clonal, so no policy here is ever invoked by
//! [`reproduce`](crate::simulation::reproduce). The trait exists so callers can
//! keep a single configuration shape and so that breakpoint generation can be
//! tested on its own.

use crate::errors::ConfigError;
use crate::evolution::mutation::Region;
use crate::genome::{Gamete, Mutation};
use rand::Rng;
use rand::distr::weighted::WeightedIndex;
use rand_distr::{Distribution, Poisson};

/// A source of crossover positions between two gametes.
///
/// Returned positions are sorted and terminated by `f64::MAX`. An empty vector
/// means no crossover.
pub trait RecombinationModel {
    fn breakpoints<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        first: &Gamete,
        second: &Gamete,
        mutations: &[Mutation],
    ) -> Vec<f64>;
}

/// Never recombines.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRecombination;

impl RecombinationModel for NoRecombination {
    fn breakpoints<R: Rng + ?Sized>(
        &self,
        _rng: &mut R,
        _first: &Gamete,
        _second: &Gamete,
        _mutations: &[Mutation],
    ) -> Vec<f64> {
        Vec::new()
    }
}

/// Poisson number of crossovers per meiosis, placed by weighted regions.
#[derive(Debug, Clone)]
pub struct RegionRecombinationModel {
    rate: f64,
    regions: Vec<Region>,
    index: Option<WeightedIndex<f64>>,
    poisson: Option<Poisson<f64>>,
}

impl RegionRecombinationModel {
    /// # Errors
    /// Returns an error if `rate` is negative or not finite, a region is
    /// invalid, or a positive rate has no regions.
    pub fn new(rate: f64, regions: Vec<Region>) -> Result<Self, ConfigError> {
        if !(rate.is_finite() && rate >= 0.0) {
            return Err(ConfigError::NegativeRate {
                name: "recombination",
                value: rate,
            });
        }
        for r in &regions {
            r.validate()?;
        }
        if rate > 0.0 && regions.is_empty() {
            return Err(ConfigError::InvalidParameter(
                "recombination rate is positive but no regions were given".into(),
            ));
        }

        let index = if regions.is_empty() {
            None
        } else {
            let weights: Vec<f64> = regions.iter().map(|r| r.weight).collect();
            Some(
                WeightedIndex::new(&weights)
                    .map_err(|e| ConfigError::InvalidRegion(format!("region weights: {e}")))?,
            )
        };
        let poisson = if rate > 0.0 {
            Some(
                Poisson::new(rate)
                    .map_err(|e| ConfigError::InvalidParameter(format!("recombination: {e}")))?,
            )
        } else {
            None
        };

        Ok(Self {
            rate,
            regions,
            index,
            poisson,
        })
    }

    /// Uniform crossovers on `[0, 1)`.
    pub fn uniform(rate: f64) -> Result<Self, ConfigError> {
        Self::new(rate, vec![Region::default()])
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl RecombinationModel for RegionRecombinationModel {
    fn breakpoints<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        _first: &Gamete,
        _second: &Gamete,
        _mutations: &[Mutation],
    ) -> Vec<f64> {
        let (Some(poisson), Some(index)) = (&self.poisson, &self.index) else {
            return Vec::new();
        };
        let n = poisson.sample(rng) as usize;
        if n == 0 {
            return Vec::new();
        }

        let mut positions: Vec<f64> = (0..n)
            .map(|_| self.regions[index.sample(rng)].sample_position(rng))
            .collect();
        positions.sort_by(f64::total_cmp);
        positions.push(f64::MAX);
        positions
    }
}
