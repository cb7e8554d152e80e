use std::path::PathBuf;

use clap::Parser;

use highlow_bench::config::{BiasBenchConfig, ResolvedOutputs};
use highlow_bench::logging::init_logging;
use highlow_bench::trials::TrialRunner;

/// Bias measurement harness for the high-low shuffle engine.
#[derive(Debug, Parser)]
#[command(
    name = "highlow-bench",
    author,
    version,
    about = "Deterministic shuffle bias harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bias.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of shuffles tallied per algorithm.
    #[arg(long, value_name = "SHUFFLES")]
    shuffles: Option<usize>,

    /// Override the number of guessing sessions played per algorithm.
    #[arg(long, value_name = "GAMES")]
    games: Option<usize>,

    /// Override the RNG seed for the whole run.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Exit after validating the configuration (no trials are run).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BiasBenchConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(shuffles) = cli.shuffles {
        config.trials.shuffles = shuffles;
    }

    if let Some(games) = cli.games {
        config.trials.games = games;
    }

    if let Some(seed) = cli.seed {
        config.trials.seed = Some(seed);
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let algorithm_count = config.algorithms.len();
    let run_id = config.run_id.clone();
    let shuffles = config.trials.shuffles;
    let games = config.trials.games;

    println!(
        "Loaded configuration '{run_id}' with {algorithm_count} algorithm{} ({shuffles} shuffles, {games} games)",
        if algorithm_count == 1 { "" } else { "s" }
    );

    let _logging_guard = init_logging(&config.logging, &outputs)?;
    let runner = TrialRunner::new(config, outputs);

    if cli.validate_only {
        println!("Validation-only mode: trial execution skipped.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Trials complete for '{run_id}': {} shuffles and {} games per algorithm → {} session rows at {}",
        summary.shuffles_per_algorithm,
        summary.games_per_algorithm,
        summary.session_rows_written,
        summary.sessions_jsonl_path.display()
    );
    println!("Frequency table: {}", summary.frequency_csv_path.display());
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(plot_path) = summary.plot_path.as_ref() {
        println!("Frequency plot: {}", plot_path.display());
    }

    Ok(())
}
