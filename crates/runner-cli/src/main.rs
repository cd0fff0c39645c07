// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `runner-cli`: runs a declared set of runners under a manager, reloading
//! the declaration on edit and shutting down cleanly on SIGTERM/SIGINT.
//!
//! Before any of that, `main` checks for `RUNNER_ENGINE_SPAWN_SPEC` in the
//! environment — `runner_engine::ProcessRunner` re-execs this same binary
//! to host a process-hosted worker, so that path is handled first and
//! never reaches argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use runner_core::RunnerName;

#[derive(Parser)]
#[command(name = "runner-cli", about = "Runs a manager declaration")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the manager declared by a TOML file until a termination signal.
    Run {
        /// Path to the manager's TOML declaration.
        manager_path: PathBuf,

        /// Name this manager's own `Status` is published under.
        #[arg(long, default_value = "manager")]
        name: String,

        /// Leave Shared Memory records in place after shutdown instead of
        /// wiping them, so a trailing observer can still read final state.
        #[arg(long)]
        keep_shared_memory: bool,
    },
}

fn main() -> anyhow::Result<()> {
    if let Ok(encoded) = std::env::var(runner_engine::SPAWN_SPEC_ENV_VAR) {
        return run_spawned_worker(&encoded);
    }

    runner_cli::logging::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run { manager_path, name, keep_shared_memory } => {
            runner_cli::run(RunnerName::new(name), manager_path, keep_shared_memory)
        }
    }
}

fn run_spawned_worker(encoded: &str) -> anyhow::Result<()> {
    let spec: runner_engine::ProcessSpawnSpec = serde_json::from_str(encoded)
        .map_err(|source| anyhow::anyhow!("malformed {}: {source}", runner_engine::SPAWN_SPEC_ENV_VAR))?;
    runner_engine::run_spawned_worker(spec, std::io::stdout());
    Ok(())
}
