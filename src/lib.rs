// src/lib.rs

pub mod budget;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod report;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::budget::Budget;
use crate::cli::{CliArgs, Command, LocateArgs, RunArgs};
use crate::config::{ConfigFile, default_config_path, load_and_validate, load_or_default};
use crate::discovery::{DiscoveryChain, PackageDescriptor};
use crate::exec::{BoundedExecutor, ExecutionRequest};

/// High-level entry point used by `main.rs`.
///
/// Loads the config, dispatches the subcommand, and returns the process exit
/// code to use.
pub async fn run(args: CliArgs) -> Result<i32> {
    let cfg = match &args.config {
        Some(path) => load_and_validate(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => load_or_default(default_config_path())?,
    };
    debug!(?cfg, "configuration loaded");

    match args.command {
        Command::Run(run_args) => run_command(&cfg, run_args).await,
        Command::Locate(locate_args) => locate_package(&cfg, locate_args),
    }
}

/// `timebox run`: bounded execution, captured output echoed to the matching
/// streams, exit code passed through.
async fn run_command(cfg: &ConfigFile, args: RunArgs) -> Result<i32> {
    let budget = Budget::new(
        args.timeout.or(cfg.budget.timeout),
        args.max_entries.or(cfg.budget.max_entries),
    );

    let mut request = ExecutionRequest::new(args.command, args.args)
        .with_envs(cfg.env_pairs())
        .with_envs(args.env);
    if let Some(dir) = args.cwd {
        request = request.with_working_dir(dir);
    }

    let result = BoundedExecutor::with_tracing()
        .execute(&request, &budget)
        .await?;

    for line in result.stdout.iter() {
        println!("{line}");
    }
    for line in result.stderr.iter() {
        eprintln!("{line}");
    }

    info!(
        command = %request.display(),
        exit_code = result.exit_code,
        timed_out = result.timed_out(),
        "run finished"
    );
    Ok(result.exit_code)
}

/// `timebox locate`: print the directory of the located package, or exit 1.
fn locate_package(cfg: &ConfigFile, args: LocateArgs) -> Result<i32> {
    let mut section = cfg.discovery.clone();
    section.rebuildable |= args.rebuildable;

    let chain = DiscoveryChain::from_config(&section);
    let budget = cfg.budget.to_budget();
    let descriptor = PackageDescriptor::new(args.name);

    match chain.locate(&descriptor, &budget)? {
        Some(builder) => {
            println!("{}", builder.directory.display());
            Ok(0)
        }
        None => {
            eprintln!("no package found for '{}'", descriptor.name);
            Ok(1)
        }
    }
}
