//! Cortex CLI: command-line access to the pipeline's file cache and
//! resource estimation.
//!
//! `cortex place` materializes inputs into a working directory, `cortex hash`
//! and `cortex token` inspect cache fingerprints, and `cortex estimate` runs a
//! configured memory estimator over a node's inputs.

#![warn(missing_docs)]

mod clean;
mod config;
mod estimate;
mod hash;
mod place;
mod report;
mod split;
mod token;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Cortex: file cache and resource tooling for neuroimaging pipelines.
#[derive(Parser, Debug)]
#[command(name = "cortex", version, about = "Cortex pipeline cache tools")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a `cortex.toml` file or the directory holding it.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Split a path into directory, stem and extension.
    Split(SplitArgs),
    /// Fingerprint files.
    Hash(HashArgs),
    /// Report the cache token embedded in a name.
    Token(TokenArgs),
    /// Link or copy files into place.
    Place(PlaceArgs),
    /// Estimate the memory a tool needs for a set of inputs.
    Estimate(EstimateArgs),
    /// Remove image and text outputs from a directory.
    Clean(CleanArgs),
}

/// Arguments for the `cortex split` subcommand.
#[derive(Parser, Debug)]
pub struct SplitArgs {
    /// Path to split.
    pub path: PathBuf,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `cortex hash` subcommand.
#[derive(Parser, Debug)]
pub struct HashArgs {
    /// Files to fingerprint.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Hash size and timestamps instead of contents.
    #[arg(long)]
    pub timestamp: bool,

    /// Read buffer size in bytes (overrides `cortex.toml`).
    #[arg(long)]
    pub chunk_size: Option<usize>,
}

/// Arguments for the `cortex token` subcommand.
#[derive(Parser, Debug)]
pub struct TokenArgs {
    /// A file name, or a group of names of which only the first is inspected.
    #[arg(required = true)]
    pub names: Vec<String>,
}

/// Arguments for the `cortex place` subcommand.
#[derive(Parser, Debug)]
pub struct PlaceArgs {
    /// Source files.
    #[arg(required = true)]
    pub sources: Vec<PathBuf>,

    /// A directory, or one destination path per source.
    #[arg(long, required = true, num_args = 1..)]
    pub dest: Vec<PathBuf>,

    /// Copy instead of linking.
    #[arg(long)]
    pub copy: bool,

    /// Diagnostic output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `cortex estimate` subcommand.
#[derive(Parser, Debug)]
pub struct EstimateArgs {
    /// Tool name of an `[estimators.<tool>]` section.
    pub tool: String,

    /// JSON object of input values, or `-` for stdin.
    #[arg(long)]
    pub inputs: String,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `cortex clean` subcommand.
#[derive(Parser, Debug)]
pub struct CleanArgs {
    /// Directory to clean.
    pub dir: PathBuf,

    /// Extensions to remove (overrides `cortex.toml`).
    #[arg(long = "ext", num_args = 1..)]
    pub extensions: Vec<String>,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::io::stderr().is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };
    init_tracing(&global);

    let result = match cli.command {
        Command::Split(ref args) => split::run(args, &global),
        Command::Hash(ref args) => hash::run(args, &global),
        Command::Token(ref args) => token::run(args, &global),
        Command::Place(ref args) => place::run(args, &global),
        Command::Estimate(ref args) => estimate::run(args, &global),
        Command::Clean(ref args) => clean::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` wins over the flags.
fn init_tracing(global: &GlobalArgs) {
    let level = if global.verbose {
        "debug"
    } else if global.quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(global.color)
                .with_target(false),
        )
        .with(filter)
        .init();
}
