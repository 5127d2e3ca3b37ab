// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::parse_duration;

/// Command-line arguments for `timebox`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "timebox",
    version,
    about = "Run commands under a time budget and locate buildable packages.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// If omitted, `Timebox.toml` in the current directory is used when it
    /// exists.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TIMEBOX_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run a command, killing it if the budget runs out (exit code 124).
    Run(RunArgs),
    /// Locate a buildable package and print its directory.
    Locate(LocateArgs),
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Time allowance, e.g. `500ms`, `30s`, `2m`. Overrides `[budget].timeout`.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Maximum number of charged operations. Overrides `[budget].max_entries`.
    #[arg(long, value_name = "N")]
    pub max_entries: Option<usize>,

    /// Working directory for the command.
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Extra environment variable; may be repeated. Overrides `[env]`.
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,

    /// Command to run (path or name looked up on `PATH`).
    pub command: String,

    /// Arguments as one string, passed through as-is (quote it in the shell).
    #[arg(default_value = "", allow_hyphen_values = true)]
    pub args: String,
}

#[derive(Debug, Clone, Args)]
pub struct LocateArgs {
    /// Mark the located package as requiring incremental rebuilds.
    #[arg(long)]
    pub rebuildable: bool,

    /// Package name: a project file path or a directory holding one.
    pub name: String,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn parse_env_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
