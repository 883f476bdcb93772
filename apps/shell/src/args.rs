//! Command-line arguments for the `tlib` binary.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tlib_logger::LevelFilter;

#[derive(Debug, Parser)]
#[command(name = "tlib")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Inspect module configs through the config registry")]
pub struct Cli {
    /// Directory with one config file per module (`<module>.toml|json|yaml|yml`)
    #[arg(short, long, global = true, default_value = "config")]
    pub dir: PathBuf,

    /// Log verbosity; `RUST_LOG` directives still apply
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the module ids found in the config directory
    List {},
    /// Load modules and print them as JSON
    Show {
        /// Module ids to print
        #[arg(required = true)]
        modules: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}
