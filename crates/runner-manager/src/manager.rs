// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reconciles a live set of runners against a declaration: starting newly
//! declared ones, stopping removed ones, respawning ones whose factory
//! changed, and reviving ones that landed in `error`.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use runner_core::{Clock, ConfigValue, RunnerName, RunnerState, Status, SystemClock};
use runner_engine::{ProcessRunner, RunnerHandle, Runner, ThreadRunner};
use tracing::{info, warn};

use crate::config::ManagerConfigProvider;
use crate::declaration::{RunnerFactory, RunnerHost};
use crate::error::ManagerError;

struct Entry {
    factory: RunnerFactory,
    handle: Box<dyn RunnerHandle>,
}

/// Owns the live runner set and performs one reconciliation pass at a time.
/// The manager's own name doubles as its Shared Memory key, the same
/// convention as any other runner — its `Status` reports `running` for as
/// long as the manager itself is ticking, with a `runner_count` entry
/// refreshed each pass.
pub struct Manager {
    name: RunnerName,
    provider: Arc<dyn ManagerConfigProvider>,
    runners: Mutex<IndexMap<RunnerName, Entry>>,
    status: Mutex<Status>,
}

impl Manager {
    pub fn new(name: RunnerName, provider: Arc<dyn ManagerConfigProvider>) -> Self {
        let status = Status::new(name.clone(), "manager".to_string());
        Self {
            name,
            provider,
            runners: Mutex::new(IndexMap::new()),
            status: Mutex::new(status),
        }
    }

    pub fn name(&self) -> &RunnerName {
        &self.name
    }

    /// One reconciliation pass. Returns the error from fetching the
    /// declaration, if any — a manager keeps its previously-reconciled set
    /// running rather than tearing everything down on a transient read
    /// failure.
    pub fn tick(&self) -> Result<(), ManagerError> {
        let declaration = self.provider.get()?;
        let mut runners = self.runners.lock();

        let declared_names: HashSet<RunnerName> =
            declaration.iter().map(|f| f.name.clone()).collect();
        let removed: Vec<RunnerName> = runners
            .keys()
            .filter(|name| !declared_names.contains(*name))
            .cloned()
            .collect();
        let respawning: Vec<RunnerName> = declaration
            .iter()
            .filter(|factory| {
                runners
                    .get(&factory.name)
                    .is_some_and(|entry| entry.factory != **factory)
            })
            .map(|factory| factory.name.clone())
            .collect();

        // Every stop this tick is issued non-blocking up front, across both
        // removed and respawning runners, so they unwind concurrently; only
        // then do we join each one in turn.
        for name in removed.iter().chain(respawning.iter()) {
            if let Some(entry) = runners.get(name) {
                entry.handle.stop(false);
            }
        }

        for name in &removed {
            if let Some(entry) = runners.shift_remove(name) {
                entry.handle.stop(true);
                Status::delete(name.as_str());
                info!(runner = %name, "removed runner reaped");
            }
        }

        for factory in &declaration {
            if respawning.contains(&factory.name) {
                if let Some(entry) = runners.shift_remove(&factory.name) {
                    entry.handle.stop(true);
                }
                let handle = build_handle(factory)?;
                handle.start();
                info!(runner = %factory.name, "respawned runner after factory change");
                runners.insert(
                    factory.name.clone(),
                    Entry {
                        factory: factory.clone(),
                        handle,
                    },
                );
                continue;
            }

            match runners.get(&factory.name) {
                None => {
                    let handle = build_handle(factory)?;
                    handle.start();
                    info!(runner = %factory.name, "started new runner");
                    runners.insert(
                        factory.name.clone(),
                        Entry {
                            factory: factory.clone(),
                            handle,
                        },
                    );
                }
                Some(entry) => {
                    // `stopped()` is `Off`; anything else not `alive()` is
                    // `Error`, the only retained state that gets revived.
                    if !entry.handle.stopped() && !entry.handle.alive() {
                        warn!(runner = %factory.name, "reviving runner from error");
                        entry.handle.revive();
                    }
                }
            }
        }

        self.publish_status(&runners);
        Ok(())
    }

    fn publish_status(&self, runners: &IndexMap<RunnerName, Entry>) {
        let mut status = self.status.lock();
        if status.state() != RunnerState::Running {
            status.set_state(RunnerState::Running, None, SystemClock.epoch_ms());
        }
        let mut entries = indexmap::IndexMap::new();
        entries.insert(
            "runner_count".to_string(),
            ConfigValue::Integer(runners.len() as i64),
        );
        status.set_entries(entries);
    }

    /// Names currently tracked — used by tests and by `ManagerScope` teardown.
    pub fn runner_names(&self) -> Vec<RunnerName> {
        self.runners.lock().keys().cloned().collect()
    }

    pub fn state_of(&self, name: &RunnerName) -> Option<RunnerState> {
        Status::read_state(name.as_str())
    }

    /// Request every tracked runner to stop, without waiting.
    pub fn stop_all(&self) {
        for entry in self.runners.lock().values() {
            entry.handle.stop(false);
        }
    }

    /// Block until every tracked runner has stopped, then forget them. Does
    /// not delete any runner's `Status` record — unlike reconciling away a
    /// runner the declaration no longer names, a full scope teardown leaves
    /// the final `off` status behind for `keep_shared_memory` to govern.
    pub fn join_all(&self) {
        let mut runners = self.runners.lock();
        for (_, entry) in runners.drain(..) {
            entry.handle.stop(true);
        }
        self.status
            .lock()
            .set_state(RunnerState::Off, None, SystemClock.epoch_ms());
    }
}

/// Builds a runner's handle from its factory. A thread-hosted runner's own
/// constructor is deferred into a closure `ThreadRunner` calls on every
/// `start`/`revive` — so only the config provider's construction can fail
/// here; a bad `class_runner` key (including one nothing ever registered,
/// `RunnerConstructionError::NotHarnessed`) surfaces instead the first time
/// the harness actually tries to build the runner, as an `error` status.
fn build_handle(factory: &RunnerFactory) -> Result<Box<dyn RunnerHandle>, ManagerError> {
    let provider: Arc<dyn runner_config::ConfigProvider> =
        runner_core::Registry::construct(&factory.provider_kind, &factory.provider_args)
            .map_err(|err| ManagerError::ConstructionFailed(factory.provider_kind.clone(), err))?;

    Ok(match factory.host {
        RunnerHost::Thread => {
            let runner_kind = factory.runner_kind.clone();
            let runner_args = factory.runner_args.clone();
            let runner_name = factory.name.clone();
            let factory_fn = move || -> Box<dyn Runner> {
                runner_engine::construct_harnessed(&runner_kind, &runner_args).unwrap_or_else(|err| {
                    Box::new(runner_engine::FailedConstruction::new(runner_name.clone(), err.to_string()))
                })
            };
            Box::new(ThreadRunner::new(
                factory.name.clone(),
                factory_fn,
                provider,
                Vec::new(),
            ))
        }
        RunnerHost::Process => Box::new(ProcessRunner::new(
            factory.name.clone(),
            factory.runner_kind.clone(),
            factory.runner_args.clone(),
            factory.provider_kind.clone(),
            factory.provider_args.clone(),
            Vec::new(),
        )),
    })
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
