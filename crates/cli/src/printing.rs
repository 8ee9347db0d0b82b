use clonevo_sim::evolution::{EffectDistribution, FitnessKind};
use clonevo_sim::simulation::{Configuration, Demography};

use crate::commands::run::RunResults;

pub fn print_parameters(config: &Configuration) {
    let execution = &config.execution;
    let mutation = &config.evolution.mutation;
    let recombination = &config.evolution.recombination;

    println!("\n📋 Simulation Configuration");
    println!(
        "  • Population Size: {} [-n, --population-size]",
        execution.population_size
    );
    println!("  • Generations: {}", config.demography.generations());
    println!("  • Demography: {}", describe_demography(&config.demography));
    if let Some(seed) = execution.seed {
        println!("  • Random Seed: {seed} [--seed]");
    } else {
        println!("  • Random Seed: Random [--seed]");
    }
    if execution.record_every == 0 {
        println!("  • Recording: Disabled [--record-every]");
    } else {
        println!(
            "  • Recording: Every {} generations [--record-every]",
            execution.record_every
        );
    }
    if execution.sample_size > 0 {
        println!(
            "  • Diversity Sample: {} gametes [--sample-size]",
            execution.sample_size
        );
    }

    println!("\n⚡ Mutation Parameters");
    println!(
        "  • Neutral Rate: {:.2e} /gamete/gen [--mu-neutral]",
        mutation.mu_neutral
    );
    println!(
        "  • Selected Rate: {:.2e} /gamete/gen [--mu-selected]",
        mutation.mu_selected
    );
    println!("  • Neutral Regions: {}", mutation.neutral_regions.len());
    for r in &mutation.selected_regions {
        println!(
            "    - Selected [{}, {}) weight {}: {}, h = {}",
            r.region.beg,
            r.region.end,
            r.region.weight,
            describe_effect(&r.effect),
            r.h
        );
    }

    println!("\n🔀 Recombination Parameters");
    println!(
        "  • Rate: {:.2e} /gen (not used by clonal reproduction)",
        recombination.rate
    );

    println!("\n🎯 Fitness & Selection");
    match config.evolution.fitness {
        FitnessKind::Neutral => println!("  • Regime: Neutral Evolution (No Selection)"),
        FitnessKind::Multiplicative { scaling } => {
            println!("  • Regime: Multiplicative (homozygote 1 + {scaling}s)")
        }
        FitnessKind::Additive { scaling } => {
            println!("  • Regime: Additive (homozygote 1 + {scaling}s)")
        }
    }
    if config.evolution.prune_selected {
        println!("  • Fixed Selected Mutations: Removed");
    } else {
        println!("  • Fixed Selected Mutations: Kept [--keep-selected-fixations]");
    }
    println!();
}

pub fn print_summary(results: &RunResults) {
    println!("\n📊 Final State");
    println!("  • Generation: {}", results.generation);
    println!("  • Population Size: {}", results.population_size);
    println!(
        "  • Segregating Mutations: {} neutral, {} selected",
        results.segregating_neutral, results.segregating_selected
    );
    let neutral = results.fixations.iter().filter(|f| f.mutation.neutral).count();
    println!(
        "  • Fixations: {} neutral, {} selected",
        neutral,
        results.fixations.len() - neutral
    );
    if let Some(last) = results.stats.last() {
        println!("  • Mean Fitness: {:.6}", last.mean_fitness);
        println!("  • Segregating Load: {:.6}", last.segregating_load);
        if last.sample_size > 0 {
            println!(
                "  • Neutral π: {:.4}, Tajima's D: {:.4}, H': {:.4} (n = {})",
                last.neutral_pi, last.neutral_tajimas_d, last.neutral_hprime, last.sample_size
            );
        }
    }
    println!("  • Recorded Generations: {}", results.stats.len());
}

fn describe_demography(demography: &Demography) -> String {
    match demography {
        Demography::Constant { size, generations } => {
            format!("constant N = {size} for {generations} generations")
        }
        Demography::Linear {
            from,
            to,
            generations,
        } => format!("linear {from} → {to} over {generations} generations"),
        Demography::Exponential {
            from,
            to,
            generations,
        } => format!("exponential {from} → {to} over {generations} generations"),
        Demography::Explicit { sizes } => format!("explicit ({} sizes)", sizes.len()),
        Demography::Sequence { phases } => {
            let parts: Vec<String> = phases.iter().map(describe_demography).collect();
            parts.join(", then ")
        }
    }
}

fn describe_effect(effect: &EffectDistribution) -> String {
    match *effect {
        EffectDistribution::Constant { s } => format!("s = {s}"),
        EffectDistribution::Exponential { mean } => format!("s ~ Exp(mean {mean})"),
        EffectDistribution::Gamma { mean, shape } => {
            format!("s ~ Gamma(mean {mean}, shape {shape})")
        }
        EffectDistribution::Uniform { lo, hi } => format!("s ~ U({lo}, {hi})"),
        EffectDistribution::Gaussian { sd } => format!("s ~ N(0, {sd})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_demography_sequence() {
        let d = Demography::Sequence {
            phases: vec![
                Demography::constant(100, 10),
                Demography::Linear {
                    from: 100,
                    to: 50,
                    generations: 5,
                },
            ],
        };
        assert_eq!(
            describe_demography(&d),
            "constant N = 100 for 10 generations, then linear 100 → 50 over 5 generations"
        );
    }

    #[test]
    fn test_describe_effect() {
        assert_eq!(
            describe_effect(&EffectDistribution::Gamma {
                mean: -0.05,
                shape: 0.3
            }),
            "s ~ Gamma(mean -0.05, shape 0.3)"
        );
    }
}
