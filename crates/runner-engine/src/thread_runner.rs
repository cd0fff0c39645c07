// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runs a runner's lifecycle on a thread of the hosting process, sharing
//! the parent's Shared Memory directly.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::Mutex;
use runner_config::ConfigProvider;
use runner_core::{ConfigValue, RunnerName};

use crate::harness::{run_life, HarnessContext};
use crate::lifecycle::Lifecycle;
use crate::{Interruptor, Runner};

/// A runner hosted on a background thread of this process.
///
/// `factory` builds a fresh `R` every time a worker starts — at `start()`
/// and again at each `revive()` — matching the contract that revive spawns
/// an entirely new worker rather than resuming the old one.
pub struct ThreadRunner<R: Runner> {
    lifecycle: Lifecycle,
    factory: Arc<dyn Fn() -> R + Send + Sync>,
    provider: Arc<dyn ConfigProvider>,
    interrupts: Arc<Vec<Interruptor>>,
    core_frequency: f64,
    category: Option<String>,
    join: Mutex<Option<JoinHandle<()>>>,
}

const DEFAULT_CORE_FREQUENCY_HZ: f64 = 200.0;

impl<R: Runner> ThreadRunner<R> {
    pub fn new(
        name: RunnerName,
        factory: impl Fn() -> R + Send + Sync + 'static,
        provider: Arc<dyn ConfigProvider>,
        interrupts: Vec<Interruptor>,
    ) -> Self {
        Self::with_core_frequency(
            name,
            factory,
            provider,
            interrupts,
            DEFAULT_CORE_FREQUENCY_HZ,
        )
    }

    pub fn with_core_frequency(
        name: RunnerName,
        factory: impl Fn() -> R + Send + Sync + 'static,
        provider: Arc<dyn ConfigProvider>,
        interrupts: Vec<Interruptor>,
        core_frequency: f64,
    ) -> Self {
        Self {
            lifecycle: Lifecycle::new(name),
            factory: Arc::new(factory),
            provider,
            interrupts: Arc::new(interrupts),
            core_frequency,
            category: Some("thread".to_string()),
            join: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &RunnerName {
        &self.lifecycle.name
    }

    /// Moves `off -> starting`, spawning the worker thread. A no-op if the
    /// worker is already live.
    pub fn start(&self) {
        if self.lifecycle.alive() {
            return;
        }
        self.spawn();
    }

    fn spawn(&self) {
        self.lifecycle.reset_for_new_life();
        let runner = (self.factory)();
        let ctx = HarnessContext {
            provider: self.provider.clone(),
            interrupts: self.interrupts.clone(),
            core_frequency: self.core_frequency,
            stop: self.lifecycle.stop.clone(),
            current_config: self.lifecycle.current_config.clone(),
            category: self.category.clone(),
            baseline: *self.lifecycle.baseline.lock(),
        };
        let baseline_slot = self.lifecycle.baseline.clone();
        let handle = std::thread::spawn(move || {
            let final_running = run_life(runner, ctx);
            *baseline_slot.lock() = final_running;
        });
        *self.join.lock() = Some(handle);
    }

    /// Signal the worker to exit. If `blocking`, returns only once the
    /// worker has reached `off`.
    pub fn stop(&self, blocking: bool) {
        self.lifecycle.request_stop();
        if blocking {
            if let Some(handle) = self.join.lock().take() {
                let _ = handle.join();
            }
        }
    }

    pub fn stopped(&self) -> bool {
        self.lifecycle.stopped()
    }

    pub fn alive(&self) -> bool {
        self.lifecycle.alive()
    }

    /// Only meaningful from `error`; spawns a fresh worker, preserving the
    /// `running_for` baseline across the revive.
    pub fn revive(&self) {
        if let Some(handle) = self.join.lock().take() {
            let _ = handle.join();
        }
        self.spawn();
    }

    pub fn get_config(&self) -> ConfigValue {
        self.lifecycle.get_config()
    }
}

impl<R: Runner> Drop for ThreadRunner<R> {
    fn drop(&mut self) {
        if self.lifecycle.alive() {
            self.lifecycle.stop.store(true, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
#[path = "thread_runner_tests.rs"]
mod tests;
