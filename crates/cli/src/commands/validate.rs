use anyhow::Result;
use clonevo_sim::simulation::MAX_POPULATION_SIZE;
use std::path::Path;

use crate::commands::init::read_config;

/// Check a configuration file and report every problem found.
///
/// Returns an error if any check failed.
pub fn validate_config(path: &Path) -> Result<()> {
    println!("🔍 Validating configuration: {}", path.display());

    let config = read_config(path)?;
    println!("✓ Parsed: OK");

    let mut issues = 0;
    let mut check = |name: &str, result: Result<(), String>| match result {
        Ok(()) => println!("✓ {name}: OK"),
        Err(e) => {
            println!("✗ {name}: FAILED - {e}");
            issues += 1;
        }
    };

    check(
        "Population size",
        if config.execution.population_size <= MAX_POPULATION_SIZE {
            Ok(())
        } else {
            Err(format!("exceeds {MAX_POPULATION_SIZE}"))
        },
    );
    check(
        "Demography",
        config.demography.sizes().map(|sizes| {
            println!("  {} generations", sizes.len());
        })
        .map_err(|e| e.to_string()),
    );
    check(
        "Mutation model",
        config.mutation_model().map(|_| ()).map_err(|e| e.to_string()),
    );
    check(
        "Recombination model",
        config
            .recombination_model()
            .map(|_| ())
            .map_err(|e| e.to_string()),
    );
    check("Configuration", config.validate().map_err(|e| e.to_string()));

    if issues > 0 {
        anyhow::bail!("Found {issues} issue(s)");
    }
    println!("\n✓ Configuration is valid");
    Ok(())
}
