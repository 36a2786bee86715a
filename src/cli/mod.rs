//! Command-line parsing for the core temperature fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fitting/math code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_COLUMNS, DEFAULT_DIGITS, DEFAULT_STEP, PivotRule};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ctemp", version, about = "Per-core CPU temperature line fits")]
pub struct Cli {
    /// More log output on stderr (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit every core, write the per-core equation files, and print a summary.
    Fit(FitArgs),
    /// Browse the cores and their equations in a terminal UI (writes nothing).
    View(ViewArgs),
    /// Write a synthetic Open Hardware Monitor log.
    Generate(GenerateArgs),
}

/// How to read the sensor log.
#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// Open Hardware Monitor CSV log.
    #[arg(value_name = "CSV")]
    pub csv: PathBuf,

    /// Zero-based temperature columns, one per core.
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_COLUMNS)]
    pub columns: Vec<usize>,

    /// Rows to ignore after the header row.
    #[arg(long, default_value_t = 1)]
    pub skip_rows: usize,

    /// Time offset of the first sample (seconds).
    #[arg(long, default_value_t = 0.0)]
    pub start: f64,

    /// Seconds between samples.
    #[arg(long, default_value_t = DEFAULT_STEP)]
    pub step: f64,

    /// Read time offsets from this column instead (numbers or timestamps).
    #[arg(long, conflicts_with_all = ["start", "step"])]
    pub time_column: Option<usize>,
}

/// Solver settings shared by `fit` and `view`.
#[derive(Debug, Args, Clone)]
pub struct SolverArgs {
    /// Pivot row selection rule.
    #[arg(long, value_enum, default_value_t = PivotRule::Greater)]
    pub pivot: PivotRule,

    /// Significant digits kept in least-squares coefficients (0 keeps all).
    #[arg(long, default_value_t = DEFAULT_DIGITS)]
    pub digits: u32,
}

#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub solver: SolverArgs,

    /// Output directory for the per-core files [env: CORE_TEMPS_OUT_DIR, default: .]
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Output file prefix [env: CORE_TEMPS_PREFIX, default: cpuTemps-core-]
    #[arg(long)]
    pub prefix: Option<String>,

    /// Print an ASCII chart of all cores.
    #[arg(long)]
    pub plot: bool,

    /// ASCII chart width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// ASCII chart height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Also write the chart as SVG.
    #[arg(long, value_name = "SVG")]
    pub plot_svg: Option<PathBuf>,

    /// Export fits, segments and failures to JSON.
    #[arg(long, value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ViewArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub solver: SolverArgs,
}

#[derive(Debug, Args, Clone)]
pub struct GenerateArgs {
    /// Where to write the CSV.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,

    /// Number of samples.
    #[arg(long, default_value_t = 40)]
    pub samples: usize,

    /// Number of cores.
    #[arg(long, default_value_t = 4)]
    pub cores: usize,

    /// Seconds between samples.
    #[arg(long, default_value_t = DEFAULT_STEP)]
    pub step: f64,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Noise standard deviation (degrees).
    #[arg(long, default_value_t = 0.75)]
    pub noise: f64,

    /// Core 0 temperature at the first sample.
    #[arg(long, default_value_t = 42.0)]
    pub base: f64,

    /// Degrees added per sample.
    #[arg(long, default_value_t = 0.05)]
    pub drift: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_defaults() {
        let cli = Cli::parse_from(["ctemp", "fit", "OHM.csv"]);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.input.columns, DEFAULT_COLUMNS.to_vec());
        assert_eq!(args.input.skip_rows, 1);
        assert_eq!(args.input.step, 30.0);
        assert_eq!(args.solver.pivot, PivotRule::Greater);
        assert_eq!(args.solver.digits, 4);
        assert!(args.out_dir.is_none());
        assert!(!args.plot);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn fit_flags() {
        let cli = Cli::parse_from([
            "ctemp", "-vv", "fit", "log.csv", "--columns", "1,2", "--pivot", "magnitude", "--time-column", "0",
        ]);
        assert_eq!(cli.verbose, 2);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.input.columns, vec![1, 2]);
        assert_eq!(args.input.time_column, Some(0));
        assert_eq!(args.solver.pivot, PivotRule::Magnitude);
    }

    #[test]
    fn time_column_conflicts_with_step() {
        let res = Cli::try_parse_from(["ctemp", "fit", "log.csv", "--time-column", "0", "--step", "5"]);
        assert!(res.is_err());
    }
}
