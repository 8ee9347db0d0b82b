use anyhow::{Context, Result};
use clonevo_sim::simulation::Fixation;
use clonevo_sim::storage::GenerationStats;
use std::fmt::Write as _;
use std::fs;

use crate::args::{ExportArgs, ExportData, ExportFormat};
use crate::commands::run::read_results;

pub fn export_data(args: &ExportArgs) -> Result<()> {
    let results = read_results(&args.input)?;

    let content = match (args.data, args.format) {
        (ExportData::Stats, ExportFormat::Csv) => stats_csv(&results.stats),
        (ExportData::Fixations, ExportFormat::Csv) => fixations_csv(&results.fixations),
        (ExportData::Stats, ExportFormat::Json) => serde_json::to_string_pretty(&results.stats)?,
        (ExportData::Fixations, ExportFormat::Json) => {
            serde_json::to_string_pretty(&results.fixations)?
        }
    };

    if let Some(path) = &args.output {
        fs::write(path, &content).with_context(|| format!("Failed to write {}", path.display()))?;
        eprintln!("✓ Data exported to: {}", path.display());
    } else {
        print!("{content}");
    }

    Ok(())
}

const STATS_HEADER: &str = "generation,n,mean_fitness,relative_load,segregating_load,fixed_load,\
fixed_selected,fixed_neutral,mean_selected_per_diploid,mean_neutral_per_diploid,\
cumulative_selected_frequency,cumulative_neutral_frequency,segregating_neutral,segregating_selected,\
sample_size,neutral_pi,total_pi,neutral_tajimas_d,total_tajimas_d,neutral_hprime,total_hprime";

fn stats_csv(stats: &[GenerationStats]) -> String {
    let mut content = String::new();
    content.push_str(STATS_HEADER);
    content.push('\n');
    for s in stats {
        // Writing to a String cannot fail.
        let _ = writeln!(
            content,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            s.generation,
            s.n,
            s.mean_fitness,
            s.relative_load,
            s.segregating_load,
            s.fixed_load,
            s.fixed_selected,
            s.fixed_neutral,
            s.mean_selected_per_diploid,
            s.mean_neutral_per_diploid,
            s.cumulative_selected_frequency,
            s.cumulative_neutral_frequency,
            s.segregating_neutral,
            s.segregating_selected,
            s.sample_size,
            s.neutral_pi,
            s.total_pi,
            s.neutral_tajimas_d,
            s.total_tajimas_d,
            s.neutral_hprime,
            s.total_hprime
        );
    }
    content
}

fn fixations_csv(fixations: &[Fixation]) -> String {
    let mut content = String::from("position,s,h,origin,fixed_at,neutral\n");
    for f in fixations {
        let m = &f.mutation;
        let _ = writeln!(
            content,
            "{},{},{},{},{},{}",
            m.pos, m.s, m.h, m.g, f.generation, m.neutral
        );
    }
    content
}
