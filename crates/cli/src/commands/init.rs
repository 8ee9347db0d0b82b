use anyhow::{Context, Result};
use clonevo_sim::evolution::{EffectDistribution, FitnessKind, Region, SelectedRegion};
use clonevo_sim::simulation::{
    Configuration, Demography, EvolutionConfig, ExecutionConfig, MutationConfig,
    RecombinationConfig,
};
use std::fs;
use std::path::Path;

use crate::args::{FitnessArg, Growth, InitArgs};
use crate::printing::print_parameters;

pub fn init_simulation(args: &InitArgs) -> Result<()> {
    println!("🧬 Clonevo - Clonal Wright-Fisher Simulator");
    println!("============================================\n");

    if args.output.exists() && !args.force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite it.",
            args.output.display()
        );
    }

    let config = build_config(args)?;
    config.validate().context("Invalid configuration")?;

    print_parameters(&config);
    write_config(&config, &args.output)?;

    println!("✓ Configuration written: {}", args.output.display());
    println!("\nSimulation initialized successfully!");
    println!("  Population size: {}", config.execution.population_size);
    println!("  Generations: {}", config.demography.generations());
    println!(
        "\n💡 Use 'clonevo run -c {}' to start the simulation",
        args.output.display()
    );

    Ok(())
}

pub fn build_config(args: &InitArgs) -> Result<Configuration> {
    let execution = ExecutionConfig {
        population_size: args.population_size,
        seed: args.seed,
        record_every: args.record_every,
        sample_size: args.sample_size,
    };

    let demography = match args.final_size {
        None => Demography::constant(args.population_size, args.generations),
        Some(to) => match args.growth {
            Growth::Linear => Demography::Linear {
                from: args.population_size,
                to,
                generations: args.generations,
            },
            Growth::Exponential => Demography::Exponential {
                from: args.population_size,
                to,
                generations: args.generations,
            },
        },
    };

    let effect = if args.shape == 1.0 {
        EffectDistribution::Exponential { mean: args.mean_s }
    } else {
        EffectDistribution::Gamma {
            mean: args.mean_s,
            shape: args.shape,
        }
    };
    let selected_regions = if args.mu_selected > 0.0 {
        vec![
            SelectedRegion::new(Region::default(), effect, args.dominance)
                .context("Invalid selected mutation parameters")?,
        ]
    } else {
        Vec::new()
    };
    let mutation = MutationConfig {
        mu_neutral: args.mu_neutral,
        mu_selected: args.mu_selected,
        neutral_regions: vec![Region::default()],
        selected_regions,
    };

    let recombination = if args.recomb_rate > 0.0 {
        RecombinationConfig {
            rate: args.recomb_rate,
            regions: vec![Region::default()],
        }
    } else {
        RecombinationConfig::none()
    };

    let fitness = match args.fitness {
        FitnessArg::Multiplicative => FitnessKind::Multiplicative {
            scaling: args.scaling,
        },
        FitnessArg::Additive => FitnessKind::Additive {
            scaling: args.scaling,
        },
        FitnessArg::Neutral => FitnessKind::Neutral,
    };

    Ok(Configuration {
        execution,
        evolution: EvolutionConfig {
            mutation,
            recombination,
            fitness,
            selfing_rate: 0.0,
            prune_selected: !args.keep_selected_fixations,
        },
        demography,
    })
}

pub fn write_config(config: &Configuration, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

pub fn read_config(path: &Path) -> Result<Configuration> {
    let text = fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read {}. Did you run 'clonevo init' first?",
            path.display()
        )
    })?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults;
    use std::path::PathBuf;

    fn default_args() -> InitArgs {
        InitArgs {
            output: PathBuf::from("clonevo.json"),
            force: false,
            population_size: 100,
            generations: 50,
            final_size: None,
            growth: Growth::Exponential,
            mu_neutral: defaults::MU_NEUTRAL,
            mu_selected: defaults::MU_SELECTED,
            mean_s: defaults::MEAN_S,
            shape: defaults::GAMMA_SHAPE,
            dominance: defaults::DOMINANCE,
            recomb_rate: 0.0,
            fitness: FitnessArg::Multiplicative,
            scaling: defaults::FITNESS_SCALING,
            keep_selected_fixations: false,
            record_every: 10,
            sample_size: defaults::SAMPLE_SIZE,
            seed: Some(1),
        }
    }

    #[test]
    fn test_build_config_defaults() {
        let config = build_config(&default_args()).unwrap();
        config.validate().unwrap();

        assert_eq!(config.execution.population_size, 100);
        assert_eq!(config.execution.seed, Some(1));
        assert_eq!(config.demography, Demography::constant(100, 50));
        assert_eq!(config.evolution.mutation.selected_regions.len(), 1);
        assert_eq!(
            config.evolution.mutation.selected_regions[0].effect,
            EffectDistribution::Gamma {
                mean: -0.05,
                shape: 0.3
            }
        );
        assert_eq!(config.evolution.recombination.rate, 0.0);
        assert!(config.evolution.prune_selected);
    }

    #[test]
    fn test_build_config_growth() {
        let mut args = default_args();
        args.final_size = Some(400);
        args.growth = Growth::Linear;
        let config = build_config(&args).unwrap();
        let sizes = config.demography.sizes().unwrap();
        assert_eq!(sizes.len(), 50);
        assert_eq!(sizes[0], 100);
        assert_eq!(sizes[49], 400);
    }

    #[test]
    fn test_build_config_neutral_only() {
        let mut args = default_args();
        args.mu_selected = 0.0;
        args.fitness = FitnessArg::Neutral;
        args.keep_selected_fixations = true;
        let config = build_config(&args).unwrap();
        assert!(config.evolution.mutation.selected_regions.is_empty());
        assert_eq!(config.evolution.fitness, FitnessKind::Neutral);
        assert!(!config.evolution.prune_selected);
        config.validate().unwrap();
    }

    #[test]
    fn test_build_config_exponential_effects() {
        let mut args = default_args();
        args.shape = 1.0;
        let config = build_config(&args).unwrap();
        assert_eq!(
            config.evolution.mutation.selected_regions[0].effect,
            EffectDistribution::Exponential { mean: -0.05 }
        );
    }

    #[test]
    fn test_build_config_rejects_bad_effects() {
        let mut args = default_args();
        args.shape = -1.0;
        assert!(build_config(&args).is_err());
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = build_config(&default_args()).unwrap();
        write_config(&config, &path).unwrap();
        assert_eq!(read_config(&path).unwrap(), config);
    }

    #[test]
    fn test_read_config_missing_file() {
        let err = read_config(Path::new("/nonexistent/clonevo.json")).unwrap_err();
        assert!(err.to_string().contains("clonevo init"));
    }
}
