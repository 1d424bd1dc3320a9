//! Command-line definitions for the `facetsel` binary
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "facetsel")]
#[command(author, version, about = "Select whole faces of STL meshes", long_about = None)]
pub struct Cli {
    /// Log verbosity (written to stderr)
    #[arg(short, long, value_enum, default_value = "info", global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Display mesh statistics
    Info(InfoArgs),

    /// Grow a region from a seed face
    Grow(GrowArgs),

    /// Pick the seed face with a ray, then grow a region from it
    Pick(PickArgs),
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Input STL file
    pub input: PathBuf,
}

#[derive(Debug, Args)]
pub struct GrowArgs {
    /// Input STL file
    pub input: PathBuf,

    /// Seed face index
    #[arg(short, long, allow_hyphen_values = true)]
    pub seed: i64,

    #[command(flatten)]
    pub selection: SelectionArgs,
}

#[derive(Debug, Args)]
pub struct PickArgs {
    /// Input STL file
    pub input: PathBuf,

    /// Ray origin as x,y,z
    #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
    pub origin: [f64; 3],

    /// Ray direction as x,y,z (need not be normalized)
    #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
    pub direction: [f64; 3],

    #[command(flatten)]
    pub selection: SelectionArgs,
}

/// Options shared by `grow` and `pick`
#[derive(Debug, Args)]
pub struct SelectionArgs {
    /// Angular tolerance in degrees (overrides the config file)
    #[arg(short, long)]
    pub angle: Option<f64>,

    /// JSON config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the region as JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    /// Write the selected faces to this STL file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write ASCII STL instead of binary
    #[arg(long, requires = "output")]
    pub ascii: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Parse `x,y,z` into three floats
pub fn parse_vec3(s: &str) -> Result<[f64; 3], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(format!("expected x,y,z but got '{s}'"));
    };

    let parse = |v: &str| {
        v.parse::<f64>()
            .map_err(|e| format!("invalid coordinate '{v}': {e}"))
    };
    Ok([parse(*x)?, parse(*y)?, parse(*z)?])
}
