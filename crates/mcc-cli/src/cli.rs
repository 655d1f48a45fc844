//! CLI argument definitions for the completeness checker.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use mcc_cli::config::MethodName;
use mcc_map::RankingMethod;

#[derive(Parser)]
#[command(
    name = "mcc",
    version,
    about = "Metadata completeness checker - reconcile dataset headers with required fields",
    long_about = "Check a tabular metadata file (CSV, XLS, XLSX) against the required fields of a\n\
                  reference dictionary.\n\n\
                  Reports which required fields are present under which header, which are\n\
                  missing, which headers are unexpected, and how complete each record is."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check a dataset against the required fields of a reference dictionary.
    Check(CheckArgs),

    /// List the required fields and aliases of a reference dictionary.
    Fields(FieldsArgs),
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Dataset to check (.csv, .xls or .xlsx).
    #[arg(long = "data", value_name = "PATH")]
    pub data: PathBuf,

    /// Reference dictionary (JSON).
    #[arg(long = "reference", value_name = "PATH")]
    pub reference: PathBuf,

    /// Reference level holding the required fields (default: "Core Fields").
    #[arg(long = "level", value_name = "KEY")]
    pub level: Option<String>,

    /// CSV field separator.
    #[arg(long = "separator", value_name = "CHAR", default_value_t = ',')]
    pub separator: char,

    /// TOML file with match settings.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Strategy to run; repeat to run several in order (replaces configured strategies).
    #[arg(long = "method", value_enum, value_name = "METHOD")]
    pub methods: Vec<MethodName>,

    /// Minimum similarity (0-100) for fuzzy matches.
    #[arg(long = "fuzzy-threshold", value_name = "N")]
    pub fuzzy_threshold: Option<f64>,

    /// Ask about required fields left unmatched.
    #[arg(long = "interactive")]
    pub interactive: bool,

    /// How candidates are ranked for interactive matching.
    #[arg(long = "ranking", value_enum)]
    pub ranking: Option<RankingArg>,

    /// Word-vector file for embedding ranking.
    #[arg(long = "embedding-model", value_name = "PATH")]
    pub embedding_model: Option<PathBuf>,

    /// Number of candidates offered per field.
    #[arg(long = "limit", value_name = "K")]
    pub limit: Option<usize>,

    /// Save completeness charts as PNG.
    #[arg(long = "plot")]
    pub plot: bool,

    /// Directory for charts.
    #[arg(long = "output-dir", value_name = "DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// Also write both reports as JSON.
    #[arg(long = "json", value_name = "PATH")]
    pub json: Option<PathBuf>,
}

#[derive(Parser)]
pub struct FieldsArgs {
    /// Reference dictionary (JSON).
    #[arg(long = "reference", value_name = "PATH")]
    pub reference: PathBuf,

    /// Reference level holding the required fields (default: "Core Fields").
    #[arg(long = "level", value_name = "KEY")]
    pub level: Option<String>,
}

/// CLI ranking choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum RankingArg {
    Fuzzy,
    Embedding,
}

impl From<RankingArg> for RankingMethod {
    fn from(arg: RankingArg) -> Self {
        match arg {
            RankingArg::Fuzzy => RankingMethod::Fuzzy,
            RankingArg::Embedding => RankingMethod::Embedding,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
