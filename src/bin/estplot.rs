//! estplot - Estimation plot CLI
//!
//! Command-line interface for per-entity bootstrap estimation plots.

use clap::{Parser, Subcommand, ValueEnum};
use estimation_stats::data::IntervalMethod;
use estimation_stats::error::Result;
use estimation_stats::group::parse_list;
use estimation_stats::pipeline::{run_estimation, EstimationConfig, RunOptions};
use log::{error, info};
use std::path::{Path, PathBuf};

/// CLI-friendly interval method enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliInterval {
    /// Bias-corrected and accelerated
    Bca,
    /// Plain percentile
    Percentile,
}

impl From<CliInterval> for IntervalMethod {
    fn from(interval: CliInterval) -> Self {
        match interval {
            CliInterval::Bca => IntervalMethod::Bca,
            CliInterval::Percentile => IntervalMethod::Percentile,
        }
    }
}

/// Bootstrap estimation plots for selected entities
#[derive(Parser)]
#[command(name = "estplot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate, plot and export the selected entities
    Run {
        /// Path to the input file (.txt, .tsv or .csv)
        #[arg(short = 'f', long)]
        file_path: PathBuf,

        /// Name of the index column
        #[arg(short = 'i', long)]
        index_col: String,

        /// Comma-separated list of selected entities
        #[arg(short = 'p', long)]
        selected_protein: String,

        /// Path to the sample annotation file (Sample, Condition columns)
        #[arg(short = 's', long)]
        sample_annotation: PathBuf,

        /// Path to the output folder
        #[arg(short = 'o', long)]
        output_folder: PathBuf,

        /// Log2 transform the data
        #[arg(short = 'l', long)]
        log2: bool,

        /// Comma-separated order of the conditions; the first is the baseline
        #[arg(short = 'c', long)]
        condition_order: Option<String>,

        /// Number of bootstrap resamples
        #[arg(long)]
        resamples: Option<usize>,

        /// Confidence level of the interval
        #[arg(long)]
        confidence_level: Option<f64>,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Confidence interval method
        #[arg(long, value_enum)]
        interval: Option<CliInterval>,

        /// Process entities one at a time
        #[arg(long)]
        sequential: bool,

        /// YAML configuration; command-line values take precedence
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the run summary as JSON to this path
        #[arg(long)]
        summary: Option<PathBuf>,
    },

    /// Generate an example configuration file
    Example {
        /// Output path for example YAML
        #[arg(short, long, default_value = "estimation.yaml")]
        output: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            file_path,
            index_col,
            selected_protein,
            sample_annotation,
            output_folder,
            log2,
            condition_order,
            resamples,
            confidence_level,
            seed,
            interval,
            sequential,
            config,
            summary,
        } => {
            let overrides = Overrides {
                log2,
                condition_order,
                resamples,
                confidence_level,
                seed,
                interval,
                sequential,
            };
            cmd_run(
                file_path,
                index_col,
                &selected_protein,
                sample_annotation,
                output_folder,
                config.as_deref(),
                overrides,
                summary.as_deref(),
            )
        }

        Commands::Example { output } => cmd_example(&output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Command-line values that override the configuration file.
struct Overrides {
    log2: bool,
    condition_order: Option<String>,
    resamples: Option<usize>,
    confidence_level: Option<f64>,
    seed: Option<u64>,
    interval: Option<CliInterval>,
    sequential: bool,
}

impl Overrides {
    fn apply(self, mut config: EstimationConfig) -> EstimationConfig {
        if self.log2 {
            config.log2 = true;
        }
        if let Some(order) = self.condition_order {
            let order = parse_list(&order);
            if !order.is_empty() {
                config.condition_order = order;
            }
        }
        if let Some(resamples) = self.resamples {
            config.bootstrap.resamples = resamples;
        }
        if let Some(level) = self.confidence_level {
            config.bootstrap.confidence_level = level;
        }
        if let Some(seed) = self.seed {
            config.bootstrap.seed = seed;
        }
        if let Some(interval) = self.interval {
            config.bootstrap.interval = interval.into();
        }
        if self.sequential {
            config.parallel = false;
        }
        config
    }
}

/// Run the estimation pipeline
#[allow(clippy::too_many_arguments)]
fn cmd_run(
    file_path: PathBuf,
    index_column: String,
    selected: &str,
    sample_annotation: PathBuf,
    output_dir: PathBuf,
    config_path: Option<&Path>,
    overrides: Overrides,
    summary_path: Option<&Path>,
) -> Result<()> {
    info!("Received selected entities: '{}'", selected);
    let entities = parse_list(selected);
    if entities.is_empty() {
        error!("No entities selected!");
        return Ok(());
    }
    info!("Parsed entity list: {:?}", entities);

    let config = match config_path {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            EstimationConfig::from_path(path)?
        }
        None => EstimationConfig::default(),
    };
    let config = overrides.apply(config);
    info!("Parsed condition list: {:?}", config.condition_order);

    let options = RunOptions {
        file_path,
        index_column,
        entities,
        sample_annotation,
        output_dir,
        config,
    };
    let summary = run_estimation(&options)?;

    if let Some(path) = summary_path {
        std::fs::write(path, summary.to_json()?)?;
        info!("Wrote run summary to {}", path.display());
    }

    Ok(())
}

/// Generate example configuration
fn cmd_example(output_path: &Path) -> Result<()> {
    let yaml = EstimationConfig::example().to_yaml()?;

    std::fs::write(output_path, &yaml)?;
    eprintln!("Wrote example configuration to {:?}", output_path);
    eprintln!();
    eprintln!("Contents:");
    println!("{}", yaml);

    Ok(())
}
