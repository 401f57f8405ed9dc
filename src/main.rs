use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;

use who_growth::batch::{read_records, run_batch};
use who_growth::output::save_results;
use who_growth::{Config, GrowthEvaluator};

#[derive(Parser)]
#[command(name = "who_growth")]
#[command(about = "Evaluate child growth measurements against WHO reference tables")]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: PathBuf,

    /// Measurements CSV (patient_id, sex, kind, x, date_of_birth, measured_on, value)
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory
    #[arg(short, long)]
    output: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    let config = Config::from_file(&cli.config)
        .with_context(|| format!("loading configuration from {:?}", cli.config))?;
    info!("Loaded configuration from {:?}", cli.config);
    info!("Reference tables from {:?}", config.reference.directory);

    let evaluator = GrowthEvaluator::from_config(&config);

    let records = read_records(&cli.input)
        .with_context(|| format!("reading measurements from {:?}", cli.input))?;
    info!("Read {} measurements from {:?}", records.len(), cli.input);

    let output = run_batch(&evaluator, &records);

    let failed = output.evaluations.iter().filter(|e| e.error.is_some()).count();
    if failed > 0 {
        warn!("{} of {} measurements could not be evaluated", failed, output.evaluations.len());
    }
    info!(
        "Assessed {} patients ({} reference tables loaded)",
        output.patients.len(),
        evaluator.cache().cached_count()
    );

    std::fs::create_dir_all(&cli.output)
        .with_context(|| format!("creating output directory {:?}", cli.output))?;

    save_results(&output, &cli.output).context("saving results")?;
    info!("Results saved to {:?}", cli.output);

    Ok(())
}
