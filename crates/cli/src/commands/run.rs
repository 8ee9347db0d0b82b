use anyhow::{Context, Result};
use clonevo_sim::simulation::{Configuration, Fixation, Population, SimRng, Simulation};
use clonevo_sim::storage::{GenerationStats, Recorder, RecordingStrategy, StatsRecorder};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::args::RunArgs;
use crate::commands::init::read_config;
use crate::defaults;
use crate::printing::{print_parameters, print_summary};

/// Everything a finished run writes to its results file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResults {
    /// Seed actually used, so the run can be repeated.
    pub seed: u64,
    pub configuration: Configuration,
    pub generation: u32,
    pub population_size: u32,
    pub segregating_neutral: usize,
    pub segregating_selected: usize,
    pub stats: Vec<GenerationStats>,
    pub fixations: Vec<Fixation>,
    /// Final population, for `clonevo run --resume`.
    pub population: Population,
    /// Generator state after the last generation.
    pub rng: SimRng,
}

impl RunResults {
    fn collect(sim: &Simulation, configuration: Configuration, stats: Vec<GenerationStats>) -> Self {
        let pop = sim.population();
        let (segregating_neutral, segregating_selected) = count_segregating(pop);
        Self {
            seed: sim.seed(),
            configuration,
            generation: pop.generation(),
            population_size: pop.size(),
            segregating_neutral,
            segregating_selected,
            stats,
            fixations: pop.fixations().to_vec(),
            population: pop.clone(),
            rng: sim.rng().clone(),
        }
    }
}

fn count_segregating(pop: &Population) -> (usize, usize) {
    pop.segregating()
        .fold((0, 0), |(neutral, selected), key| {
            if pop.mutations()[key].neutral {
                (neutral + 1, selected)
            } else {
                (neutral, selected + 1)
            }
        })
}

pub fn run_simulation(args: &RunArgs) -> Result<()> {
    println!("🧬 Clonevo - Running Simulation");
    println!("============================================\n");

    let mut config = read_config(&args.config)?;
    if let Some(seed) = args.seed {
        config.execution.seed = Some(seed);
    }
    if let Some(record_every) = args.record_every {
        config.execution.record_every = record_every;
    }

    let results = match &args.resume {
        Some(path) => resume(&config, read_results(path)?, !args.no_progress)?,
        None => simulate(&config, !args.no_progress)?,
    };
    write_results(&results, &args.output)?;

    print_summary(&results);
    println!("\n✓ Simulation complete!");
    println!("  Seed: {}", results.seed);
    println!("  Results written: {}", args.output.display());
    println!(
        "\n💡 Use 'clonevo export -i {}' to export statistics",
        args.output.display()
    );

    Ok(())
}

/// Run `config` to the end of its schedule.
pub fn simulate(config: &Configuration, show_progress: bool) -> Result<RunResults> {
    let sim = Simulation::from_config(config, None)
        .map_err(|e| anyhow::anyhow!("Failed to initialize simulation: {e}"))?;
    execute(sim, config, Vec::new(), show_progress)
}

/// Run the schedule of `config` on from the final state of `previous`.
///
/// The earlier statistics are kept in front of the new ones, so splitting a
/// run and resuming gives the same results as running it in one go.
pub fn resume(
    config: &Configuration,
    previous: RunResults,
    show_progress: bool,
) -> Result<RunResults> {
    println!("📂 Resuming from generation {}", previous.generation);
    let sim = Simulation::resume(config, previous.population, previous.rng, previous.seed)
        .map_err(|e| anyhow::anyhow!("Failed to resume simulation: {e}"))?;
    execute(sim, config, previous.stats, show_progress)
}

fn execute(
    mut sim: Simulation,
    config: &Configuration,
    mut recorded: Vec<GenerationStats>,
    show_progress: bool,
) -> Result<RunResults> {
    // Record the seed so the stored configuration reproduces the run.
    let mut config = config.clone();
    config.execution.seed = Some(sim.seed());

    println!("Configuration:");
    print_parameters(&config);

    let total = sim.total_generations();
    println!("Running {total} generations...");

    let pb = if show_progress {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(defaults::PROGRESS_TEMPLATE)
                .context("Invalid progress bar template")?
                .progress_chars("#>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut stats = StatsRecorder::new(
        config.evolution.fitness,
        RecordingStrategy::every(config.execution.record_every),
    )
    .with_sampling(config.execution.sample_size, sim.seed());
    let mut recorder = |pop: &Population| {
        stats.record(pop);
        pb.inc(1);
    };
    sim.run(&mut recorder)
        .map_err(|e| anyhow::anyhow!("Generation {}: {e}", sim.generation() + 1))?;
    pb.finish_with_message("Done");

    recorded.extend(stats.into_stats());
    Ok(RunResults::collect(&sim, config, recorded))
}

pub fn write_results(results: &RunResults, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(results).context("Failed to serialize results")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

pub fn read_results(path: &Path) -> Result<RunResults> {
    let text = fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read {}. Did you run 'clonevo run' first?",
            path.display()
        )
    })?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}
