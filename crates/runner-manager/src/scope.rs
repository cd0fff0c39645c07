// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ManagerScope`: owns a [`Manager`]'s reconciliation thread, starting it
//! on construction and tearing every tracked runner down on drop — the
//! RAII counterpart of the Python original's `with Manager(...) as manager:`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::Mutex;
use runner_core::SharedMemory;
use tracing::error;

use crate::manager::Manager;

const DEFAULT_CORE_FREQUENCY_HZ: f64 = 10.0;

/// Starts a manager's control thread on construction, ticking its
/// reconciliation pass at `core_frequency`. On drop, every tracked runner
/// is stopped (a non-blocking `stop()` issued to each up front, so they
/// unwind concurrently, then joined one at a time) before Shared Memory is
/// wiped — unless `keep_shared_memory` was requested, in which case every
/// record (including runners already turned `off`) is left for a later
/// observer to read.
pub struct ManagerScope {
    manager: Arc<Manager>,
    stop: Arc<AtomicBool>,
    control_thread: Mutex<Option<JoinHandle<()>>>,
    keep_shared_memory: bool,
}

impl ManagerScope {
    pub fn new(manager: Arc<Manager>, keep_shared_memory: bool) -> Self {
        Self::with_core_frequency(manager, keep_shared_memory, DEFAULT_CORE_FREQUENCY_HZ)
    }

    pub fn with_core_frequency(
        manager: Arc<Manager>,
        keep_shared_memory: bool,
        core_frequency: f64,
    ) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let control_thread = {
            let manager = manager.clone();
            let stop = stop.clone();
            let period = Duration::from_secs_f64(1.0 / core_frequency.max(1.0));
            std::thread::spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    if let Err(err) = manager.tick() {
                        error!(manager = %manager.name(), %err, "reconciliation pass failed");
                    }
                    std::thread::sleep(period);
                }
            })
        };
        Self {
            manager,
            stop,
            control_thread: Mutex::new(Some(control_thread)),
            keep_shared_memory,
        }
    }

    pub fn manager(&self) -> &Manager {
        &self.manager
    }

    /// True as long as the control thread itself is still running — mirrors
    /// the original's `Manager.alive()`, which reports the daemon thread's
    /// liveness rather than any individual runner's.
    pub fn alive(&self) -> bool {
        self.control_thread
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for ManagerScope {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.control_thread.lock().take() {
            let _ = handle.join();
        }
        self.manager.stop_all();
        self.manager.join_all();
        if !self.keep_shared_memory {
            SharedMemory::clear();
        }
    }
}

#[cfg(test)]
#[path = "scope_tests.rs"]
mod tests;
