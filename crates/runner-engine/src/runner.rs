// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The user-facing contract: a single `iterate` step, hosted by a harness
//! that owns the loop. There is no entry point for calling `iterate`
//! directly — [`crate::ThreadRunner`]/[`crate::ProcessRunner`] are the only
//! callers, so the "no exception escapes" invariant holds structurally
//! rather than through a runtime-checked decorator.

use indexmap::IndexMap;
use runner_core::{ConfigValue, Registry, RunnerName};

use crate::{IterateError, RunnerConstructionError};

/// A supervised worker's single step. Implementors own no loop, no sleep,
/// and no state-machine logic — the harness does all of that.
pub trait Runner: Send + 'static {
    fn name(&self) -> &RunnerName;

    /// Perform one unit of work against the current `config`. Any `Err`
    /// moves the runner to `error` with the message preserved; the harness
    /// never lets it propagate further. `Ok` carries the status entries to
    /// publish for this iteration (replacing the previous entries
    /// wholesale) — an empty map clears them.
    fn iterate(
        &mut self,
        config: &ConfigValue,
    ) -> Result<IndexMap<String, ConfigValue>, IterateError>;

    /// Called once before the first `iterate`, and again whenever the
    /// harness observes a structurally different configuration. Default:
    /// no-op.
    fn on_config_change(&mut self, _new: &ConfigValue, _old: &ConfigValue) {}
}

/// A cheap, non-blocking predicate that can cut a runner's inter-iterate
/// wait short. Polled once per core period, never awaited.
pub type Interruptor = Box<dyn Fn() -> bool + Send + Sync>;

/// Lets the harness host a `Box<dyn Runner>` exactly like a concrete `R` —
/// used when the runner is constructed dynamically through
/// [`runner_core::Registry`] rather than known at compile time, as
/// [`crate::process::run_spawned_worker`] does.
impl Runner for Box<dyn Runner> {
    fn name(&self) -> &RunnerName {
        (**self).name()
    }

    fn iterate(
        &mut self,
        config: &ConfigValue,
    ) -> Result<IndexMap<String, ConfigValue>, IterateError> {
        (**self).iterate(config)
    }

    fn on_config_change(&mut self, new: &ConfigValue, old: &ConfigValue) {
        (**self).on_config_change(new, old)
    }
}

/// The only public entry point that turns a `class_runner` registry key
/// into a live `Runner` — the harness constructor path spec.md §7/P11
/// refers to. A key nothing registered under returns
/// [`RunnerConstructionError::NotHarnessed`] rather than a panic; a
/// registered factory that itself fails returns
/// [`RunnerConstructionError::Failed`].
pub fn construct_harnessed(
    key: &str,
    args: &ConfigValue,
) -> Result<Box<dyn Runner>, RunnerConstructionError> {
    Registry::construct::<Box<dyn Runner>>(key, args)
        .map_err(|err| RunnerConstructionError::from_registry(key, err))
}

/// Stands in for a runner whose registry construction failed, so a thread
/// host's deferred factory closure (which cannot itself return `Result`)
/// still surfaces the failure the ordinary way: the worker starts, its
/// first `iterate` fails, and the harness moves it to `error` with
/// `message` preserved — never a panic.
pub struct FailedConstruction {
    name: RunnerName,
    message: String,
}

impl FailedConstruction {
    pub fn new(name: RunnerName, message: String) -> Self {
        Self { name, message }
    }
}

impl Runner for FailedConstruction {
    fn name(&self) -> &RunnerName {
        &self.name
    }

    fn iterate(
        &mut self,
        _config: &ConfigValue,
    ) -> Result<IndexMap<String, ConfigValue>, IterateError> {
        Err(IterateError::new(self.message.clone()))
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
