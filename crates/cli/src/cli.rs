use crate::tracing::{LogLevel, TracingFormat};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tooldist")]
#[command(about = "Package, publish and fetch versioned tool bundles")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Path to a config.toml")]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        env = "TOOLDIST_STORAGE",
        help = "Root directory of the private store"
    )]
    pub storage: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        env = "TOOLDIST_PUBLIC_STORAGE",
        help = "Root directory of the public store"
    )]
    pub public_storage: Option<PathBuf>,

    #[arg(
        short = 'l',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,

    #[arg(
        long,
        global = true,
        help = "Log output format",
        default_value = "compact",
        value_enum
    )]
    pub log_format: TracingFormat,

    #[arg(long, global = true, help = "Output logs in JSON format (same as --log-format json)")]
    pub json: bool,
}

impl Cli {
    /// The log format after applying `--json`.
    pub const fn tracing_format(&self) -> TracingFormat {
        if self.json {
            TracingFormat::Json
        } else {
            self.log_format
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Archive a directory of executables and upload it")]
    Put {
        #[arg(long, help = "Directory holding the executables")]
        dir: PathBuf,
        #[arg(long, help = "Release stream (defaults to the configured stream)")]
        stream: Option<String>,
        #[arg(long, help = "Version to stamp, as major.minor.patch")]
        version: Option<String>,
        #[arg(long, help = "Target OS or series")]
        os: Option<String>,
        #[arg(long, help = "Target architecture")]
        arch: Option<String>,
        #[arg(long, help = "Use the flat pre-stream naming scheme")]
        legacy: bool,
    },
    #[command(about = "List bundles matching a version")]
    List {
        #[command(flatten)]
        query: Query,
        #[arg(long, help = "Output format", default_value = "text", value_enum)]
        format: OutputFormat,
    },
    #[command(about = "Fetch the newest matching bundle for this platform")]
    Fetch {
        #[command(flatten)]
        query: Query,
        #[arg(long, help = "Directory to unpack into")]
        dest: PathBuf,
    },
    #[command(about = "Fetch the best legacy bundle, falling back to the public store")]
    Get {
        #[arg(long, help = "Major version")]
        major: u32,
        #[arg(long, help = "Directory to unpack into")]
        dest: PathBuf,
    },
}

/// How `list` prints entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One entry per line
    Text,
    /// A JSON array of catalog entries
    Json,
}

/// Version and stream selection shared by `list` and `fetch`.
#[derive(Args, Debug, Clone)]
pub struct Query {
    #[arg(long, help = "Major version")]
    pub major: u32,
    #[arg(long, help = "Minor version (any if omitted)")]
    pub minor: Option<u32>,
    #[arg(long, help = "Release stream (defaults to the configured stream)")]
    pub stream: Option<String>,
}

pub fn parse() -> Cli {
    Cli::parse()
}
