//! CLI entry point for the preprocessing pipeline.

use anyhow::{Result, anyhow};
use clap::Parser;
use datalens_processing::{
    Pipeline, ProcessingReport, ReportGenerator, SampleDataset, TransformConfig, profile_dataset,
};
use polars::io::csv::read::{CsvParseOptions, CsvReadOptions};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Configuration-driven tabular preprocessing",
    long_about = "Applies a declarative transform configuration to a tabular dataset.\n\n\
                  EXAMPLES:\n  \
                  # Preprocess a CSV with a JSON config\n  \
                  datalens-processing -i data.csv -c transforms.json\n\n  \
                  # Try the pipeline on a built-in sample dataset\n  \
                  datalens-processing --sample sales -c transforms.json\n\n  \
                  # Write Markdown and JSON reports alongside the output\n  \
                  datalens-processing -i data.csv -c transforms.json --emit-report"
)]
struct Args {
    /// Path to the CSV file to process
    #[arg(short, long, conflicts_with = "sample")]
    input: Option<String>,

    /// Use a built-in sample dataset instead of a file (sales, stock, weather)
    #[arg(long)]
    sample: Option<SampleDataset>,

    /// Path to the transform configuration (JSON)
    ///
    /// If not specified, no transforms are applied and only the profile
    /// is reported
    #[arg(short, long)]
    config: Option<String>,

    /// Output directory for results
    #[arg(short, long, default_value = "./outputs")]
    output: String,

    /// Custom output file name (without extension)
    ///
    /// If not specified, uses "<input_stem>_processed"
    #[arg(long)]
    output_name: Option<String>,

    /// Output the report JSON to stdout instead of a human-readable summary
    ///
    /// Disables all logs; only the JSON report is written to stdout.
    #[arg(long)]
    json: bool,

    /// Write Markdown and JSON reports to the output directory
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging stays disabled so stdout only
/// contains the JSON report.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    let (data, source_name) = load_input(&args)?;
    info!("Dataset loaded: {:?}", data.shape());

    let config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|e| anyhow!("Cannot read config '{}': {}", path, e))?;
            TransformConfig::from_json(&json)?
        }
        None => TransformConfig::default(),
    };

    let before = profile_dataset(&data)?;
    let pipeline = Pipeline::new(config)?;
    let outcome = pipeline.apply(&data)?;
    let after = profile_dataset(&outcome.data)?;

    let output_dir = PathBuf::from(&args.output);
    std::fs::create_dir_all(&output_dir)?;

    let stem = args
        .output_name
        .clone()
        .unwrap_or_else(|| format!("{}_processed", source_name));
    let csv_path = output_dir.join(format!("{}.csv", stem));
    write_csv(&outcome.data, &csv_path)?;
    info!("Processed dataset written to: {}", csv_path.display());

    let report = ProcessingReport::build("Data Analysis Report", before, after, &outcome);

    if args.json {
        println!("{}", report.to_json()?);
        return Ok(());
    }

    if args.emit_report {
        let generator = ReportGenerator::new(&output_dir);
        let (md, json) = generator.write(&report, &format!("{}_report", stem))?;
        info!("Reports written to: {}, {}", md.display(), json.display());
    }

    print_summary(&report, &csv_path);
    Ok(())
}

/// Load the input frame from a file or a built-in sample.
fn load_input(args: &Args) -> Result<(DataFrame, String)> {
    if let Some(sample) = args.sample {
        info!("Generating sample dataset: {:?}", sample);
        let name = format!("{:?}", sample).to_lowercase();
        return Ok((sample.generate()?, name));
    }
    let Some(input) = &args.input else {
        return Err(anyhow!("Either --input or --sample is required"));
    };
    if !Path::new(input).exists() {
        return Err(anyhow!("Input file not found: {}", input));
    }
    info!("Loading dataset from: {}", input);
    let stem = Path::new(input)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string();
    Ok((load_csv(input)?, stem))
}

/// Load CSV, retrying without quote handling on failure.
fn load_csv(path: &str) -> Result<DataFrame> {
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Standard loading failed: {}", e);
        }
    }

    CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
        .map_err(|e| anyhow!("Failed to read '{}': {}", path, e))
}

fn write_csv(df: &DataFrame, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    let mut df = df.clone();
    CsvWriter::new(&mut file).finish(&mut df)?;
    Ok(())
}

/// Print a human-readable summary of the run.
///
/// Uses `println!` intentionally: this is the primary CLI output and
/// should be visible regardless of log level.
fn print_summary(report: &ProcessingReport, csv_path: &Path) {
    println!();
    println!("{}", "=".repeat(70));
    println!("PREPROCESSING COMPLETE");
    println!("{}", "=".repeat(70));
    println!();
    println!(
        "Rows:    {} -> {}",
        report.shape.rows_before, report.shape.rows_after
    );
    println!(
        "Columns: {} -> {}",
        report.shape.columns_before, report.shape.columns_after
    );
    println!("Output:  {}", csv_path.display());
    println!();

    if !report.applied.is_empty() {
        println!("Applied transforms:");
        for stage in &report.applied {
            for detail in &stage.details {
                println!("  - {}", detail);
            }
        }
        println!();
    }

    if !report.skipped.is_empty() {
        println!("Skipped transforms:");
        for skip in &report.skipped {
            if let datalens_processing::OutcomeStatus::Skipped { reason } = &skip.status {
                println!(
                    "  ! {} on '{}': {}",
                    skip.stage,
                    skip.column,
                    reason.describe()
                );
            }
        }
        println!();
    }

    println!("Use --json for machine-readable output");
    println!("Use --emit-report to save Markdown and JSON reports");
    println!("{}", "=".repeat(70));
}
