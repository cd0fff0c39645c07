// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The supervisor's run loop, factored out of `main` so an embedding binary
//! (such as a `demos/` example) can register its own runner/config-provider
//! kinds with [`runner_core::Registry`] and then drive the same loop this
//! crate's own `main` uses.

pub mod logging;
pub mod signal;

use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use runner_core::{RegistryError, RunnerName};
use runner_manager::{DynamicManagerConfigProvider, Manager, ManagerScope};
use tracing::info;

/// How often the run loop checks for a termination signal between manager
/// ticks — distinct from the manager's own reconciliation `core_frequency`.
const SIGNAL_POLL_PERIOD: Duration = Duration::from_millis(100);

/// Builds a manager from `manager_path` (reloaded whenever its mtime
/// advances) and runs its reconciliation loop in the foreground until
/// SIGTERM/SIGINT arrives, then tears everything down via `ManagerScope`.
///
/// The caller must have already registered, with [`runner_core::Registry`],
/// every `class_runner`/`class_config_getter` key the declaration file
/// names — this crate knows nothing about any concrete `Runner` type.
pub fn run(
    manager_name: impl Into<RunnerName>,
    manager_path: impl Into<PathBuf>,
    keep_shared_memory: bool,
) -> anyhow::Result<()> {
    // Idempotent: a caller that already registered its own runner kinds may
    // have called this first, so a duplicate-key failure here is expected,
    // not an error — any other registration failure is not.
    match runner_config::register_builtin_providers() {
        Ok(()) | Err(RegistryError::DuplicateKey(_)) => {}
        Err(err) => return Err(err.into()),
    }

    let manager_path = manager_path.into();
    let provider = Arc::new(
        DynamicManagerConfigProvider::new(manager_path.clone())
            .with_context(|| format!("loading manager config at {}", manager_path.display()))?,
    );
    let manager = Arc::new(Manager::new(manager_name.into(), provider));

    info!(path = %manager_path.display(), "starting manager");
    let scope = ManagerScope::new(manager, keep_shared_memory);

    let term = signal::install_termination_flag()
        .context("installing SIGTERM/SIGINT handlers")?;
    while !term.load(Ordering::Relaxed) && scope.alive() {
        std::thread::sleep(SIGNAL_POLL_PERIOD);
    }

    info!("shutdown requested, tearing down manager");
    drop(scope);
    Ok(())
}
