//! Run parameters.
//!
//! [`EvolveParams`] is what the generation driver consumes. The mutation and
//! recombination configs are the serializable form of the region-based models
//! and are turned into models with `build`.

use crate::errors::ConfigError;
use crate::evolution::mutation::check_rate;
use crate::evolution::{
    EffectDistribution, Region, RegionMutationModel, RegionRecombinationModel, SelectedRegion,
};
use crate::simulation::fixation::RemovalPolicy;
use crate::simulation::population::MAX_POPULATION_SIZE;
use serde::{Deserialize, Serialize};

/// Parameters for one call to [`evolve`](crate::simulation::evolve).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolveParams {
    /// Target size for each generation to simulate.
    pub demography: Vec<u32>,
    /// Neutral mutation rate per gamete per generation.
    pub mu_neutral: f64,
    /// Selected mutation rate per gamete per generation.
    pub mu_selected: f64,
    /// Recombination rate. Accepted for compatibility; clonal reproduction never recombines.
    pub recombination_rate: f64,
    /// Selfing rate. Accepted for compatibility; has no effect.
    pub selfing_rate: f64,
    /// Remove and record fixed selected mutations as well as neutral ones.
    pub prune_selected: bool,
}

impl EvolveParams {
    /// Neutral drift over `demography`: zero rates, pruning every fixation.
    pub fn new(demography: Vec<u32>) -> Self {
        Self {
            demography,
            mu_neutral: 0.0,
            mu_selected: 0.0,
            recombination_rate: 0.0,
            selfing_rate: 0.0,
            prune_selected: true,
        }
    }

    pub fn with_mutation_rates(mut self, mu_neutral: f64, mu_selected: f64) -> Self {
        self.mu_neutral = mu_neutral;
        self.mu_selected = mu_selected;
        self
    }

    pub fn with_recombination_rate(mut self, rate: f64) -> Self {
        self.recombination_rate = rate;
        self
    }

    pub fn with_prune_selected(mut self, prune_selected: bool) -> Self {
        self.prune_selected = prune_selected;
        self
    }

    /// Total mutation rate per gamete per generation.
    pub fn total_mutation_rate(&self) -> f64 {
        self.mu_neutral + self.mu_selected
    }

    /// Fixation policy implied by `prune_selected`.
    pub fn removal_policy(&self) -> RemovalPolicy {
        RemovalPolicy::from_prune_selected(self.prune_selected)
    }

    /// # Errors
    /// Returns an error for an empty schedule, a negative or non-finite rate,
    /// a selfing rate outside `[0, 1]` or an oversized generation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.demography.is_empty() {
            return Err(ConfigError::EmptyDemography);
        }
        check_rate("neutral mutation", self.mu_neutral)?;
        check_rate("selected mutation", self.mu_selected)?;
        check_rate("recombination", self.recombination_rate)?;
        if !(0.0..=1.0).contains(&self.selfing_rate) {
            return Err(ConfigError::InvalidParameter(format!(
                "selfing rate must be in [0, 1], got {}",
                self.selfing_rate
            )));
        }
        if let Some(&n) = self.demography.iter().find(|&&n| n > MAX_POPULATION_SIZE) {
            return Err(ConfigError::InvalidParameter(format!(
                "population size {n} exceeds {MAX_POPULATION_SIZE}"
            )));
        }
        Ok(())
    }
}

/// Serializable mutation model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationConfig {
    pub mu_neutral: f64,
    pub mu_selected: f64,
    #[serde(default)]
    pub neutral_regions: Vec<Region>,
    #[serde(default)]
    pub selected_regions: Vec<SelectedRegion>,
}

impl MutationConfig {
    /// Neutral mutations only, uniform on `[0, 1)`.
    pub fn neutral(mu: f64) -> Self {
        Self {
            mu_neutral: mu,
            mu_selected: 0.0,
            neutral_regions: vec![Region::default()],
            selected_regions: Vec::new(),
        }
    }

    pub fn build(&self) -> Result<RegionMutationModel, ConfigError> {
        RegionMutationModel::new(
            self.mu_neutral,
            self.mu_selected,
            self.neutral_regions.clone(),
            self.selected_regions.clone(),
        )
    }
}

impl Default for MutationConfig {
    /// One twelfth of new mutations are deleterious, with gamma-distributed
    /// effects and additive dominance.
    fn default() -> Self {
        Self {
            mu_neutral: 0.011,
            mu_selected: 0.001,
            neutral_regions: vec![Region::default()],
            selected_regions: vec![SelectedRegion {
                region: Region::default(),
                effect: EffectDistribution::Gamma {
                    mean: -0.05,
                    shape: 0.3,
                },
                h: 1.0,
            }],
        }
    }
}

/// Serializable recombination model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecombinationConfig {
    pub rate: f64,
    #[serde(default)]
    pub regions: Vec<Region>,
}

impl RecombinationConfig {
    pub fn none() -> Self {
        Self {
            rate: 0.0,
            regions: Vec::new(),
        }
    }

    pub fn build(&self) -> Result<RegionRecombinationModel, ConfigError> {
        RegionRecombinationModel::new(self.rate, self.regions.clone())
    }
}

impl Default for RecombinationConfig {
    fn default() -> Self {
        Self {
            rate: 0.002,
            regions: vec![Region::default()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evolve_params_defaults() {
        let p = EvolveParams::new(vec![10; 5]).with_mutation_rates(0.01, 0.002);
        assert!((p.total_mutation_rate() - 0.012).abs() < 1e-15);
        assert_eq!(p.removal_policy(), RemovalPolicy::All);
        assert_eq!(
            p.with_prune_selected(false).removal_policy(),
            RemovalPolicy::NeutralOnly
        );
    }

    #[test]
    fn test_validate_rejects_empty_demography() {
        assert_eq!(
            EvolveParams::new(vec![]).validate(),
            Err(ConfigError::EmptyDemography)
        );
    }

    #[test]
    fn test_validate_rejects_negative_rates() {
        let base = EvolveParams::new(vec![10]);

        let err = base.clone().with_mutation_rates(-0.1, 0.0).validate();
        assert!(
            matches!(err, Err(ConfigError::NegativeRate { name, .. }) if name == "neutral mutation")
        );

        let err = base.clone().with_mutation_rates(0.0, -1.0).validate();
        assert!(
            matches!(err, Err(ConfigError::NegativeRate { name, .. }) if name == "selected mutation")
        );

        let err = base.clone().with_recombination_rate(-2.0).validate();
        assert!(
            matches!(err, Err(ConfigError::NegativeRate { name, .. }) if name == "recombination")
        );

        let err = base.with_mutation_rates(f64::NAN, 0.0).validate();
        assert!(err.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_selfing_and_sizes() {
        let mut p = EvolveParams::new(vec![10]);
        p.selfing_rate = 1.5;
        assert!(matches!(p.validate(), Err(ConfigError::InvalidParameter(_))));

        let p = EvolveParams::new(vec![10, u32::MAX]);
        assert!(matches!(p.validate(), Err(ConfigError::InvalidParameter(_))));
    }

    #[test]
    fn test_configs_build_models() {
        let m = MutationConfig::default().build().unwrap();
        assert!((m.total_rate() - 0.012).abs() < 1e-15);
        assert!(MutationConfig::neutral(0.1).build().is_ok());
        assert!(RecombinationConfig::default().build().is_ok());
        assert!(RecombinationConfig::none().build().is_ok());

        let bad = RecombinationConfig {
            rate: 1.0,
            regions: vec![],
        };
        assert!(bad.build().is_err());
    }
}
