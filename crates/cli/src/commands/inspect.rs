use anyhow::Result;
use std::path::Path;

use crate::commands::init::read_config;
use crate::commands::run::read_results;
use crate::printing::{print_parameters, print_summary};

pub fn show_info(config: &Path) -> Result<()> {
    let config = read_config(config)?;

    println!("\n📊 Simulation Information");
    println!("{}", "=".repeat(50));
    print_parameters(&config);

    let sizes = config.demography.sizes()?;
    if let (Some(first), Some(last)) = (sizes.first(), sizes.last()) {
        let max = sizes.iter().max().copied().unwrap_or(0);
        let min = sizes.iter().min().copied().unwrap_or(0);
        println!("Schedule: N = {first} → {last} (min {min}, max {max})");
    }

    Ok(())
}

pub fn show_generations(results: &Path) -> Result<()> {
    let results = read_results(results)?;
    let generations: Vec<u32> = results.stats.iter().map(|s| s.generation).collect();

    if generations.is_empty() {
        println!("No recorded generations found.");
        return Ok(());
    }

    println!("\n📈 Recorded Generations:");
    println!("{}", "=".repeat(50));
    println!("Generations: {generations:?}");
    println!("Total: {} snapshots", generations.len());
    print_summary(&results);

    Ok(())
}
