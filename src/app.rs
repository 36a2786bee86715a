//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and `.env` defaults
//! - sets up logging
//! - ingests the sensor log
//! - runs the batch and prints the summary
//! - writes optional plots/exports

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, FitArgs, GenerateArgs, InputArgs, SolverArgs, ViewArgs};
use crate::data::{SyntheticSpec, generate, write_ohm_csv};
use crate::domain::{DEFAULT_PREFIX, IngestConfig, RunConfig, TimeSource};
use crate::error::AppError;
use crate::fit::FitOptions;
use crate::io::export::write_batch_json;
use crate::io::ingest::load_series;
use crate::io::sink::FileSink;
use crate::plot::{AsciiPlot, PlotRenderer, SvgPlot};
use crate::report::{format_batch_summary, format_row_errors};

pub mod pipeline;

/// Environment variable providing the default `--out-dir`.
pub const ENV_OUT_DIR: &str = "CORE_TEMPS_OUT_DIR";
/// Environment variable providing the default `--prefix`.
pub const ENV_PREFIX: &str = "CORE_TEMPS_PREFIX";

const SVG_SIZE: (u32, u32) = (1024, 640);
const MAX_ROW_ERRORS_SHOWN: usize = 10;

/// Entry point for the `ctemp` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    let interactive = matches!(cli.command, Command::View(_));
    init_tracing(cli.verbose, interactive);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::View(args) => handle_view(args),
        Command::Generate(args) => handle_generate(args),
    }
}

/// Log to stderr. The viewer owns the terminal, so it stays silent unless asked.
fn init_tracing(verbose: u8, interactive: bool) {
    let default = match (verbose, interactive) {
        (0, true) => "off",
        (0, false) => "warn",
        (1, _) => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Defaults read from the environment (and `.env`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvDefaults {
    pub out_dir: Option<PathBuf>,
    pub prefix: Option<String>,
}

impl EnvDefaults {
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self {
            out_dir: std::env::var(ENV_OUT_DIR).ok().filter(|v| !v.is_empty()).map(PathBuf::from),
            prefix: std::env::var(ENV_PREFIX).ok().filter(|v| !v.is_empty()),
        }
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args, &EnvDefaults::load());
    let ingest = load_series(&config.ingest)?;
    if !ingest.row_errors.is_empty() {
        eprint!("{}", format_row_errors(&ingest, MAX_ROW_ERRORS_SHOWN));
    }

    let options = FitOptions {
        pivot: config.pivot,
        digits: config.digits,
    };
    let mut sink = FileSink::new(&config.output_dir, &config.file_prefix, &ingest.series.core_ids());

    let mut renderers: Vec<Box<dyn PlotRenderer>> = Vec::new();
    if config.plot {
        renderers.push(Box::new(AsciiPlot {
            width: config.plot_width,
            height: config.plot_height,
        }));
    }
    if let Some(path) = &config.plot_svg {
        renderers.push(Box::new(SvgPlot {
            path: path.clone(),
            size: SVG_SIZE,
        }));
    }

    let report = pipeline::run_batch(&ingest.series, &options, &mut sink, &mut renderers);
    println!("{}", format_batch_summary(&ingest, &report));

    for core in report.cores.iter().filter(|c| c.sink_error.is_none()) {
        if let Some(path) = sink.path(core.core).filter(|p| p.exists()) {
            println!("Wrote {}", path.display());
        }
    }

    if let Some(path) = &config.export_json {
        write_batch_json(path, &report)?;
        println!("Exported {}", path.display());
    }

    let failures = report.failure_count();
    if failures > 0 {
        return Err(AppError::new(5, format!("Batch finished with {failures} failure(s).")));
    }
    Ok(())
}

fn handle_view(args: ViewArgs) -> Result<(), AppError> {
    let ingest = load_series(&ingest_config_from_args(&args.input))?;
    let source = args.input.csv.display().to_string();
    crate::tui::run(ingest, source, fit_options_from_args(&args.solver))
}

fn handle_generate(args: GenerateArgs) -> Result<(), AppError> {
    let spec = SyntheticSpec {
        samples: args.samples,
        cores: args.cores,
        step: args.step,
        seed: args.seed,
        noise: args.noise,
        base: args.base,
        drift: args.drift,
    };
    let log = generate(&spec)?;
    write_ohm_csv(&args.out, &log)?;
    println!(
        "Wrote {} samples x {} cores to {}",
        spec.samples,
        spec.cores,
        args.out.display()
    );
    Ok(())
}

pub fn ingest_config_from_args(args: &InputArgs) -> IngestConfig {
    let time = match args.time_column {
        Some(col) => TimeSource::Column(col),
        None => TimeSource::Uniform {
            start: args.start,
            step: args.step,
        },
    };
    IngestConfig {
        csv_path: args.csv.clone(),
        columns: args.columns.clone(),
        skip_rows: args.skip_rows,
        time,
    }
}

pub fn fit_options_from_args(args: &SolverArgs) -> FitOptions {
    FitOptions {
        pivot: args.pivot,
        digits: args.digits,
    }
}

/// Flags win over environment defaults, which win over built-in defaults.
pub fn run_config_from_args(args: &FitArgs, env: &EnvDefaults) -> RunConfig {
    RunConfig {
        ingest: ingest_config_from_args(&args.input),
        output_dir: args
            .out_dir
            .clone()
            .or_else(|| env.out_dir.clone())
            .unwrap_or_else(|| PathBuf::from(".")),
        file_prefix: args
            .prefix
            .clone()
            .or_else(|| env.prefix.clone())
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
        pivot: args.solver.pivot,
        digits: args.solver.digits,
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
        plot_svg: args.plot_svg.clone(),
        export_json: args.export_json.clone(),
    }
}
