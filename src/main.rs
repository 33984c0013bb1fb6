// Entry point and high-level CLI flow.
//
// The dataset is loaded once at startup; if that fails the program exits
// before serving anything. After that the binary either runs a single
// subcommand (`history`, `summary`, `report`, `districts`) or drops into the
// interactive menu:
// - [1] lists the districts in the dataset,
// - [2] prints a district's history,
// - [3] prints the summary + forecast payload,
// - [4] writes a report bundle.
mod dataset;
mod error;
mod forecast;
mod loader;
mod output;
mod pipeline;
mod report;
mod summary;
mod types;
mod util;

use clap::{Parser, Subcommand, ValueEnum};
use error::{PipelineError, ReportError};
use forecast::{ForecastStrategy, DEFAULT_GROWTH_FACTOR, DEFAULT_HORIZON};
use pipeline::Pipeline;
use report::ReportComposer;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use summary::ReferenceTables;
use types::{DistrictRow, HistoryPayload};

#[derive(Debug, Parser)]
#[command(about = "Deforestation history, summaries and trend forecasts by district")]
struct Args {
    /// Dataset CSV with District, Year, Deforestation_Rate_%, Temperature_C,
    /// Rainfall_mm and Pollution_Index columns.
    #[arg(long, default_value = "data.csv")]
    data: PathBuf,

    /// JSON file overriding the causes / reduction-methods tables.
    #[arg(long)]
    tables: Option<PathBuf>,

    /// Directory report bundles are written under.
    #[arg(long, default_value = "reports")]
    out_dir: PathBuf,

    /// Number of years to forecast.
    #[arg(long, default_value_t = DEFAULT_HORIZON)]
    horizon: usize,

    #[arg(long, value_enum, default_value_t = StrategyArg::AverageDelta)]
    strategy: StrategyArg,

    /// Yearly growth used by the fixed-growth strategy.
    #[arg(long, default_value_t = DEFAULT_GROWTH_FACTOR)]
    growth_factor: f64,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    AverageDelta,
    FixedGrowth,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List districts present in the dataset.
    Districts,
    /// Print the raw history of a district as JSON.
    History { location: String },
    /// Print summary, environment means and forecast as JSON.
    Summary { location: String },
    /// Write a report bundle for a district.
    Report { location: String },
}

impl Args {
    fn strategy(&self) -> ForecastStrategy {
        match self.strategy {
            StrategyArg::AverageDelta => ForecastStrategy::AverageDelta,
            StrategyArg::FixedGrowth => ForecastStrategy::FixedGrowth {
                growth_factor: self.growth_factor,
            },
        }
    }
}

/// Read a single line of input after printing `prompt`.
fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Load the dataset and reference tables. Any failure here is fatal.
fn build_pipeline(args: &Args) -> Result<Pipeline, error::LoadError> {
    let (dataset, load_report) = loader::load_dataset(&args.data)?;
    if dataset.is_empty() {
        log::warn!("{} has no usable rows", args.data.display());
    }
    log::info!(
        "Loaded {} rows from {} ({} rejected, {} unparsable cells)",
        dataset.len(),
        args.data.display(),
        load_report.rejected_rows,
        load_report.invalid_cells()
    );
    if let Some((first, last)) = year_span(&dataset) {
        log::info!("Dataset covers {} to {}", first, last);
    }
    println!(
        "Processing dataset... ({} rows read, {} loaded, {} districts)",
        util::format_int(load_report.total_rows),
        util::format_int(load_report.loaded_rows),
        util::format_int(dataset.districts().len())
    );
    if load_report.invalid_cells() > 0 {
        println!(
            "Note: unparsable values ignored: Year {}, Deforestation_Rate_% {}, Temperature_C {}, Rainfall_mm {}, Pollution_Index {}.",
            load_report.invalid_years,
            load_report.invalid_rates,
            load_report.invalid_temperatures,
            load_report.invalid_rainfall,
            load_report.invalid_pollution
        );
    }
    println!();

    let tables = match &args.tables {
        Some(path) => ReferenceTables::load(path)?,
        None => ReferenceTables::builtin(),
    };
    Ok(Pipeline::new(dataset, tables).with_forecast(args.horizon, args.strategy()))
}

/// Earliest and latest valid year in the dataset.
fn year_span(dataset: &dataset::Dataset) -> Option<(i32, i32)> {
    let years = dataset.records().iter().filter_map(|r| r.year);
    years.clone().min().zip(years.max())
}

fn handle_districts(pipeline: &Pipeline) {
    let rows: Vec<DistrictRow> = pipeline
        .dataset()
        .districts()
        .into_iter()
        .map(|(district, records)| DistrictRow {
            district: district.to_string(),
            records,
        })
        .collect();
    output::preview_table("Districts", None, &rows, rows.len());
}

fn handle_history(pipeline: &Pipeline, location: &str) -> Result<(), PipelineError> {
    let history = pipeline.get_history(location)?;
    print_json(&HistoryPayload { history });
    Ok(())
}

fn handle_summary(pipeline: &Pipeline, location: &str) -> Result<(), PipelineError> {
    let payload = pipeline.get_summary(location)?;
    print_json(&payload);
    Ok(())
}

fn handle_report(pipeline: &Pipeline, composer: &ReportComposer, location: &str) -> Result<(), ReportError> {
    let artifacts = composer.generate(pipeline, location)?;
    println!("Report written to {}", artifacts.markdown.display());
    println!("(Data exported to {})\n", artifacts.dir.display());
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}\n", s),
        Err(e) => log::error!("Failed to serialize output: {}", e),
    }
}

/// Print a not-found (or other) failure without leaving the menu.
fn report_failure(e: &dyn std::error::Error) {
    println!("Error: {}\n", e);
}

fn run_command(pipeline: &Pipeline, composer: &ReportComposer, command: &Command) -> ExitCode {
    let result: Result<(), ReportError> = match command {
        Command::Districts => {
            handle_districts(pipeline);
            Ok(())
        }
        Command::History { location } => handle_history(pipeline, location).map_err(Into::into),
        Command::Summary { location } => handle_summary(pipeline, location).map_err(Into::into),
        Command::Report { location } => handle_report(pipeline, composer, location),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_not_found() => {
            report_failure(&e);
            ExitCode::from(2)
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_menu(pipeline: &Pipeline, composer: &ReportComposer) {
    loop {
        println!("Select an option:");
        println!("[1] List districts");
        println!("[2] Show history");
        println!("[3] Show summary and forecast");
        println!("[4] Generate report");
        println!("[0] Exit\n");
        let Some(choice) = read_line("Enter choice: ") else {
            break;
        };
        match choice.as_str() {
            "1" => handle_districts(pipeline),
            "2" | "3" | "4" => {
                let Some(location) = read_line("Enter district: ") else {
                    break;
                };
                if location.is_empty() {
                    println!("Please enter a district first.\n");
                    continue;
                }
                let result = match choice.as_str() {
                    "2" => handle_history(pipeline, &location).map_err(ReportError::from),
                    "3" => handle_summary(pipeline, &location).map_err(ReportError::from),
                    _ => handle_report(pipeline, composer, &location),
                };
                if let Err(e) = result {
                    if !e.is_not_found() {
                        log::error!("{}", e);
                    }
                    report_failure(&e);
                }
            }
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 0-4.\n"),
        }
    }
}

fn main() -> ExitCode {
    let mut logger = pretty_env_logger::formatted_builder();
    logger.parse_filters(&std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()));
    logger.init();

    let args = Args::parse();
    let pipeline = match build_pipeline(&args) {
        Ok(p) => p,
        Err(e) => {
            log::error!("Failed to load dataset: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let composer = ReportComposer::new(&args.out_dir);
    log::debug!("Reports go under {}", composer.out_dir().display());

    match &args.command {
        Some(command) => run_command(&pipeline, &composer, command),
        None => {
            run_menu(&pipeline, &composer);
            ExitCode::SUCCESS
        }
    }
}
