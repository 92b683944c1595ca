//! refnorm - Reference Protein Normalization CLI
//!
//! Command-line interface for comparing raw and reference-normalized biomarkers.

use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use refnorm::bootstrap::{bootstrap_single_batch, BootstrapConfig};
use refnorm::data::ObservationTable;
use refnorm::error::Result;
use refnorm::pipeline::{run_comparison, ComparisonConfig};
use refnorm::summary::{summarize_comparisons, summarize_stability};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Yaml,
}

/// Reference protein normalization comparison
#[derive(Parser)]
#[command(name = "refnorm")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare normalized and raw biomarkers as described by a YAML configuration
    Compare {
        /// Path to comparison configuration YAML
        #[arg(short, long)]
        config: PathBuf,

        /// Path to observation table TSV
        #[arg(short, long)]
        data: PathBuf,

        /// Directory receiving one results TSV per outcome
        #[arg(short, long)]
        output_dir: PathBuf,
    },

    /// Bootstrap R² of individual biomarkers against one outcome
    Stability {
        /// Path to observation table TSV
        #[arg(short, long)]
        data: PathBuf,

        /// Outcome column
        #[arg(short, long)]
        outcome: String,

        /// Predictor column (repeatable)
        #[arg(short, long = "predictor", required = true)]
        predictors: Vec<String>,

        /// Number of bootstrap iterations
        #[arg(long, default_value = "1000")]
        n_iter: usize,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print an example configuration
    Template,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compare {
            config,
            data,
            output_dir,
        } => cmd_compare(&config, &data, &output_dir),

        Commands::Stability {
            data,
            outcome,
            predictors,
            n_iter,
            seed,
            format,
        } => cmd_stability(&data, &outcome, &predictors, n_iter, seed, format),

        Commands::Template => cmd_template(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Run a configured comparison and write per-outcome result tables
fn cmd_compare(config_path: &Path, data_path: &Path, output_dir: &Path) -> Result<()> {
    info!("Loading configuration from {:?}", config_path);
    let config = ComparisonConfig::from_file(config_path)?;

    info!("Loading observations from {:?}", data_path);
    let table = ObservationTable::from_tsv(data_path)?;
    info!(
        "Loaded {} subjects x {} variables",
        table.n_subjects(),
        table.column_names().len()
    );

    let run = run_comparison(&table, &config)?;

    std::fs::create_dir_all(output_dir)?;
    for result in &run.tables {
        let path = output_dir.join(format!("{}.tsv", result.outcome));
        result.to_tsv(&path)?;
        info!("Wrote {:?}", path);

        println!(
            "{}: {} comparison(s), {} significant at FDR < 0.05",
            result.outcome,
            result.comparisons().count(),
            result.n_significant(0.05)
        );

        if !config.display_names.is_empty() {
            for s in summarize_comparisons(result, &config.display_names)? {
                println!(
                    "  {:<30} {:+.4} [{:+.4}, {:+.4}] {}",
                    s.name,
                    s.mean_difference,
                    s.lower,
                    s.upper,
                    s.tier.marker()
                );
            }
        }
    }

    Ok(())
}

/// Bootstrap single-predictor models and print their R² summaries
fn cmd_stability(
    data_path: &Path,
    outcome: &str,
    predictors: &[String],
    n_iter: usize,
    seed: u64,
    format: OutputFormat,
) -> Result<()> {
    let table = ObservationTable::from_tsv(data_path)?;
    let config = BootstrapConfig {
        n_iter,
        seed,
        ..Default::default()
    };

    let runs = bootstrap_single_batch(&table, predictors, outcome, &config)?;
    let summaries = summarize_stability(&runs)?;

    match format {
        OutputFormat::Text => {
            for s in &summaries {
                println!("{}", s);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summaries)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&summaries)?),
    }

    Ok(())
}

/// Print an example configuration as YAML
fn cmd_template() -> Result<()> {
    let config = ComparisonConfig::new("ab40")
        .name("plasma-ab40")
        .biomarker("ptau217")
        .biomarker("ptau181")
        .biomarker("nfl")
        .outcome("mmse")
        .outcome("cdr_sb");
    print!("{}", config.to_yaml()?);
    Ok(())
}
