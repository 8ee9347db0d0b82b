mod args;
mod commands;
pub mod defaults;
mod minimal_logger;
mod printing;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use args::{ExportArgs, InitArgs, RunArgs};
use commands::{export, init, inspect, run, validate};
use minimal_logger::MinimalLogger;

/// Clonevo: A Clonal Wright-Fisher Simulator
///
/// This tool simulates a diploid population reproducing clonally under
/// mutation, selection and genetic drift, and tracks which mutations are
/// lost and which become fixed.
#[derive(Parser, Debug)]
#[command(name = "clonevo")]
#[command(author, version, about = "Simulates clonal evolution under mutation, selection and drift", long_about = None)]
struct Cli {
    /// Number of threads to use for parallel processing
    ///
    /// If not specified, defaults to the number of logical CPUs.
    #[arg(short = 't', long, global = true)]
    threads: Option<usize>,

    /// More log output (repeat for more detail)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize a new simulation configuration.
    ///
    /// Writes the parameters for a new experiment (population size, mutation
    /// rates, demography, etc.) to a JSON file but does not run it yet.
    Init(Box<InitArgs>),

    /// Run a simulation from a configuration file.
    ///
    /// Executes the simulation generation by generation and writes statistics
    /// and fixations to a results file.
    Run(RunArgs),

    /// Info: Show the configuration of a simulation.
    Info {
        /// Configuration file
        #[arg(short, long, default_value = defaults::CONFIG_FILE)]
        config: PathBuf,
    },

    /// Generations: List all recorded generations of a finished run.
    Generations {
        /// Results file
        #[arg(short, long, default_value = defaults::RESULTS_FILE)]
        input: PathBuf,
    },

    /// Export results to other formats (CSV, JSON).
    ///
    /// Use this to get data out for analysis in Python, R, or other tools.
    Export(ExportArgs),

    /// Validate a configuration file.
    Validate {
        /// Configuration file
        #[arg(short, long, default_value = defaults::CONFIG_FILE)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    MinimalLogger::init(minimal_logger::level_filter(cli.verbose, cli.quiet))?;

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    match cli.command {
        Commands::Init(args) => {
            init::init_simulation(&args)?;
        }
        Commands::Run(args) => {
            run::run_simulation(&args)?;
        }
        Commands::Info { config } => {
            inspect::show_info(&config)?;
        }
        Commands::Generations { input } => {
            inspect::show_generations(&input)?;
        }
        Commands::Export(args) => {
            export::export_data(&args)?;
        }
        Commands::Validate { config } => {
            validate::validate_config(&config)?;
        }
    }

    Ok(())
}
