//! Command-line driver for the discovery pipeline.
//!
//! Runs a batch from a URL file or the command line, starts the scheduled
//! refresh in the foreground, or prints the defaulting table.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use project_scout::{CsvExporter, Exporter, JsonExporter, PipelineConfig, RunReport};
use server_core::kernel::{build_pipeline, log_report, start_scheduler, timestamped_output};
use server_core::{telemetry, Config};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "scout")]
#[command(about = "Discover, rank and standardize municipal construction project pages")]
struct Cli {
    /// Override SCOUT_TOP_K
    #[arg(long, global = true)]
    top_k: Option<usize>,

    /// Override SCOUT_CONCURRENCY
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the pipeline over a CSV file with a `Source URL` column
    Run {
        /// Input file (defaults to SCOUT_INPUT_FILE)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (defaults to a timestamped file in SCOUT_OUTPUT_DIR)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = Format::Csv)]
        format: Format,
    },

    /// Run the pipeline over URLs given on the command line
    Urls {
        #[arg(required = true)]
        urls: Vec<String>,

        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = Format::Csv)]
        format: Format,
    },

    /// Run the periodic refresh in the foreground until Ctrl-C
    Schedule,

    /// Print the field defaulting table as JSON
    Defaults,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Csv,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    let cli = Cli::parse();
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(top_k) = cli.top_k {
        config.top_k = top_k;
    }
    if let Some(concurrency) = cli.concurrency {
        config.concurrency = concurrency;
    }

    match cli.command {
        Commands::Run {
            input,
            output,
            format,
        } => {
            let input = input.unwrap_or_else(|| config.input_file.clone());
            let file = std::fs::File::open(&input)
                .with_context(|| format!("Failed to open {}", input.display()))?;
            let urls = project_scout::read_source_urls(file)
                .with_context(|| format!("Failed to read URLs from {}", input.display()))?;
            cmd_run(&config, urls, output, format).await
        }
        Commands::Urls {
            urls,
            output,
            format,
        } => cmd_run(&config, urls, output, format).await,
        Commands::Schedule => cmd_schedule(config).await,
        Commands::Defaults => cmd_defaults(),
    }
}

async fn cmd_run(
    config: &Config,
    urls: Vec<String>,
    output: Option<PathBuf>,
    format: Format,
) -> Result<()> {
    let pipeline = build_pipeline(config)?;
    let path = output.unwrap_or_else(|| {
        let path = timestamped_output(&config.output_dir);
        match format {
            Format::Csv => path,
            Format::Json => path.with_extension("json"),
        }
    });
    let exporter: Arc<dyn Exporter> = match format {
        Format::Csv => Arc::new(CsvExporter::new(path)),
        Format::Json => Arc::new(JsonExporter::new(path)),
    };

    let report = pipeline
        .run_and_export(urls, exporter)
        .await
        .context("Export failed")?;

    log_report(&report);
    print_report(&report);
    Ok(())
}

async fn cmd_schedule(config: Config) -> Result<()> {
    let pipeline = Arc::new(build_pipeline(&config)?);
    let mut scheduler = start_scheduler(pipeline, config).await?;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    tracing::info!("Stopping scheduler");
    scheduler.shutdown().await?;
    Ok(())
}

fn cmd_defaults() -> Result<()> {
    let config = PipelineConfig::default();
    let table = serde_json::json!({
        "defaults": config.defaults,
        "placeholders": config.placeholders,
    });
    println!("{}", serde_json::to_string_pretty(&table)?);
    Ok(())
}

fn print_report(report: &RunReport) {
    let result = &report.result;

    println!("Ranking:");
    for (i, entry) in result.ranking.iter().enumerate() {
        println!("  {:>2}. [{}] {}", i + 1, entry.score, entry.url);
    }

    println!("\nRecords: {}", result.records.len());
    for record in &result.records {
        println!("  {} ({}) {}", record.title, record.status.as_str(), record.url);
    }

    if !result.failures.is_empty() {
        println!("\nDropped:");
        for failure in &result.failures {
            println!("  {failure}");
        }
    }

    match report.export.as_ref().and_then(|e| e.path.as_ref()) {
        Some(path) => println!("\nWrote {}", path.display()),
        None => println!("\nNothing to export"),
    }
}
