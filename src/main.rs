use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use exposure_scores::config::Config;
use exposure_scores::constants;
use exposure_scores::infra::{FileOutputAdapter, JsonTableSource};
use exposure_scores::logging;
use exposure_scores::observability;
use exposure_scores::pipeline::processing::{OccupationGrouping, WeightScheme};
use exposure_scores::pipeline::{Pipeline, PipelineResult, RunMode};

#[derive(Parser)]
#[command(name = "exposure_scores")]
#[command(about = "Occupation-level AI exposure scores from task ratings")]
#[command(version = "0.1.0")]
struct Cli {
    /// Configuration file (missing file means defaults)
    #[arg(long, global = true, default_value = constants::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Directory for output tables and documents
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Task weighting scheme: equal, core, importance, relevance
    #[arg(long, global = true)]
    weights: Option<WeightScheme>,

    /// Occupation grouping: onet or soc
    #[arg(long, global = true)]
    grouping: Option<OccupationGrouping>,

    /// Fail on unrecognized labels and malformed occupation codes
    #[arg(long, global = true)]
    strict: bool,

    /// Directory for rolling JSON log files
    #[arg(long, global = true, default_value = "logs")]
    log_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score, aggregate, merge labor data, and summarize
    Run {
        /// Rated task catalog
        #[arg(long)]
        tasks: Option<PathBuf>,
        /// Occupation employment and wage table
        #[arg(long)]
        labor: Option<PathBuf>,
        /// Industry by occupation employment table
        #[arg(long)]
        industry: Option<PathBuf>,
    },
    /// Write the occupation exposure table only
    Aggregate {
        #[arg(long)]
        tasks: Option<PathBuf>,
    },
    /// Report label and weight coverage of the task catalog without writing
    Check {
        #[arg(long)]
        tasks: Option<PathBuf>,
    },
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;
    config
        .apply_env_overrides()
        .context("Invalid EXPOSURE_* environment override")?;

    if let Some(dir) = &cli.output_dir {
        config.output.dir = dir.clone();
    }
    if let Some(weights) = cli.weights {
        config.aggregation.weights = weights;
    }
    if let Some(grouping) = cli.grouping {
        config.aggregation.grouping = grouping;
    }
    if cli.strict {
        config.scoring.strict_labels = true;
    }

    match &cli.command {
        Commands::Run { tasks, labor, industry } => {
            if let Some(tasks) = tasks {
                config.inputs.tasks = tasks.clone();
            }
            if labor.is_some() {
                config.inputs.labor = labor.clone();
            }
            if industry.is_some() {
                config.inputs.industry = industry.clone();
            }
        }
        Commands::Aggregate { tasks } | Commands::Check { tasks } => {
            if let Some(tasks) = tasks {
                config.inputs.tasks = tasks.clone();
            }
        }
    }

    config.validate()?;
    Ok(config)
}

fn print_result(result: &PipelineResult) {
    println!("\n📊 Exposure run {}:", result.run_id);
    println!("   Tasks read: {}", result.tasks_read);
    println!("   Tasks scored: {}", result.tasks_scored);
    println!("   Occupations: {}", result.occupations);
    if let Some(matched) = result.occupations_matched {
        println!("   Matched to labor data: {}", matched);
    }
    if let Some(industries) = result.industries {
        println!("   Industries: {}", industries);
    }
    println!("   Duration: {:.2}s", result.duration_secs);
    println!("\n📁 Outputs:");
    for output in &result.outputs {
        println!("   - {}", output);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let _guard = logging::init_logging(&cli.log_dir);

    let config = load_config(&cli)?;
    info!(
        "Using weights={} grouping={} strict_labels={}",
        config.aggregation.weights, config.aggregation.grouping, config.scoring.strict_labels
    );

    let source = Arc::new(JsonTableSource::new(&config.inputs));
    let output = Arc::new(FileOutputAdapter::from_config(&config.output));
    let output_dir = output.dir().display().to_string();

    let mut pipeline = Pipeline::new(config.clone(), source, output);
    if config.output.prometheus {
        match observability::init_prometheus() {
            Ok(handle) => pipeline = pipeline.with_metrics(handle),
            Err(e) => warn!("Metrics disabled: {}", e),
        }
    }

    match cli.command {
        Commands::Run { .. } => {
            println!("🚀 Running full exposure pipeline...");
            let result = pipeline.run(RunMode::Full).await?;
            print_result(&result);
            if let Some(summary) = &result.summary {
                println!("\n📈 Exposure summary:");
                for column in &summary.columns {
                    let mean = column
                        .employment_weighted_mean
                        .map(|m| format!("{:.3}", m))
                        .unwrap_or_else(|| "n/a".to_string());
                    println!("   {}: employment-weighted mean {}", column.column, mean);
                }
            }
            println!("✅ Exposure pipeline completed, outputs in {}", output_dir);
        }
        Commands::Aggregate { .. } => {
            println!("🔧 Aggregating occupation exposure...");
            let result = pipeline.run(RunMode::AggregateOnly).await?;
            print_result(&result);
            println!("✅ Aggregation completed, outputs in {}", output_dir);
        }
        Commands::Check { .. } => {
            println!("🔍 Checking task catalog coverage...");
            let report = pipeline.check().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
