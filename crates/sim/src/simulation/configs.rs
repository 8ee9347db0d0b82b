//! Configuration tree for complete runs.
//!
//! A [`Configuration`] can be written to and read from JSON and carries
//! everything needed to reproduce a run: starting size, seed, models, and
//! the demographic schedule.

use crate::errors::ConfigError;
use crate::evolution::{
    FitnessKind, RegionMutationModel, RegionRecombinationModel, WrightFisherRules,
};
use crate::simulation::demography::Demography;
use crate::simulation::parameters::{EvolveParams, MutationConfig, RecombinationConfig};
use crate::simulation::population::MAX_POPULATION_SIZE;
use crate::storage::DEFAULT_SAMPLE_SIZE;
use serde::{Deserialize, Serialize};

/// The master configuration struct.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Configuration {
    pub execution: ExecutionConfig,
    pub evolution: EvolutionConfig,
    pub demography: Demography,
}

/// How the run is started and observed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Number of diploids in the founding population.
    pub population_size: u32,
    /// RNG seed. A random seed is drawn when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Record statistics every this many generations. Zero disables recording.
    #[serde(default = "default_record_every")]
    pub record_every: u32,
    /// Gametes sampled for diversity statistics on each recorded generation.
    /// Zero disables sampling.
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
}

fn default_record_every() -> u32 {
    100
}

fn default_sample_size() -> usize {
    DEFAULT_SAMPLE_SIZE
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            population_size: 1000,
            seed: None,
            record_every: default_record_every(),
            sample_size: default_sample_size(),
        }
    }
}

/// Grouped evolutionary parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionConfig {
    pub mutation: MutationConfig,
    #[serde(default = "RecombinationConfig::none")]
    pub recombination: RecombinationConfig,
    #[serde(default)]
    pub fitness: FitnessKind,
    #[serde(default)]
    pub selfing_rate: f64,
    #[serde(default = "default_prune_selected")]
    pub prune_selected: bool,
}

fn default_prune_selected() -> bool {
    true
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            mutation: MutationConfig::default(),
            recombination: RecombinationConfig::default(),
            fitness: FitnessKind::default(),
            selfing_rate: 0.0,
            prune_selected: default_prune_selected(),
        }
    }
}

impl Configuration {
    /// Check every part of the configuration without building anything that
    /// is not needed for the check.
    ///
    /// # Errors
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.execution.population_size > MAX_POPULATION_SIZE {
            return Err(ConfigError::InvalidParameter(format!(
                "population size {} exceeds {MAX_POPULATION_SIZE}",
                self.execution.population_size
            )));
        }
        self.to_params()?.validate()?;
        self.mutation_model()?;
        self.recombination_model()?;
        if let FitnessKind::Multiplicative { scaling } | FitnessKind::Additive { scaling } =
            self.evolution.fitness
        {
            if !scaling.is_finite() {
                return Err(ConfigError::InvalidParameter(format!(
                    "fitness scaling must be finite, got {scaling}"
                )));
            }
        }
        Ok(())
    }

    /// Driver parameters for this configuration.
    ///
    /// # Errors
    /// Returns an error if the demographic schedule cannot be expanded.
    pub fn to_params(&self) -> Result<EvolveParams, ConfigError> {
        Ok(EvolveParams {
            demography: self.demography.sizes()?,
            mu_neutral: self.evolution.mutation.mu_neutral,
            mu_selected: self.evolution.mutation.mu_selected,
            recombination_rate: self.evolution.recombination.rate,
            selfing_rate: self.evolution.selfing_rate,
            prune_selected: self.evolution.prune_selected,
        })
    }

    pub fn mutation_model(&self) -> Result<RegionMutationModel, ConfigError> {
        self.evolution.mutation.build()
    }

    pub fn recombination_model(&self) -> Result<RegionRecombinationModel, ConfigError> {
        self.evolution.recombination.build()
    }

    pub fn selection(&self) -> WrightFisherRules<FitnessKind> {
        WrightFisherRules::new(self.evolution.fitness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configuration_is_valid() {
        let config = Configuration::default();
        config.validate().unwrap();
        let params = config.to_params().unwrap();
        assert_eq!(params.demography.len(), 1000);
        assert!(params.prune_selected);
    }

    #[test]
    fn test_json_round_trip() {
        let config = Configuration::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let back: Configuration = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_minimal_json_uses_defaults() {
        let json = r#"{
            "execution": { "population_size": 50 },
            "evolution": {
                "mutation": { "mu_neutral": 0.01, "mu_selected": 0.0,
                              "neutral_regions": [{ "beg": 0.0, "end": 1.0, "weight": 1.0 }] }
            },
            "demography": { "type": "constant", "size": 50, "generations": 10 }
        }"#;
        let config: Configuration = serde_json::from_str(json).unwrap();
        assert_eq!(config.execution.seed, None);
        assert_eq!(config.execution.record_every, 100);
        assert_eq!(config.execution.sample_size, DEFAULT_SAMPLE_SIZE);
        assert_eq!(config.evolution.recombination.rate, 0.0);
        assert_eq!(config.evolution.fitness, FitnessKind::default());
        assert!(config.evolution.prune_selected);
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_reports_bad_parts() {
        let mut config = Configuration::default();
        config.evolution.mutation.mu_selected = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NegativeRate { .. })
        ));

        let mut config = Configuration::default();
        config.demography = Demography::Explicit { sizes: vec![] };
        assert_eq!(config.validate(), Err(ConfigError::EmptyDemography));

        let mut config = Configuration::default();
        config.evolution.mutation.neutral_regions.clear();
        assert!(config.validate().is_err());
    }
}
