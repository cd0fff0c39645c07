// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bookkeeping shared by [`crate::ThreadRunner`] and [`crate::ProcessRunner`]:
//! the stop flag, the last-observed configuration, and the running-for
//! baseline carried across a revive.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use runner_core::{ConfigValue, RunnerName, RunnerState, Status};

pub struct Lifecycle {
    pub name: RunnerName,
    pub stop: Arc<AtomicBool>,
    pub current_config: Arc<Mutex<ConfigValue>>,
    pub baseline: Arc<Mutex<Duration>>,
}

impl Lifecycle {
    pub fn new(name: RunnerName) -> Self {
        Self {
            name,
            stop: Arc::new(AtomicBool::new(false)),
            current_config: Arc::new(Mutex::new(ConfigValue::empty_mapping())),
            baseline: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Current lifecycle state, as last persisted to Shared Memory. `Off`
    /// if nothing has ever run under this name.
    pub fn state(&self) -> RunnerState {
        Status::read_state(self.name.as_str()).unwrap_or(RunnerState::Off)
    }

    pub fn stopped(&self) -> bool {
        self.state() == RunnerState::Off
    }

    /// True iff the worker is neither `off` nor `error`.
    pub fn alive(&self) -> bool {
        !matches!(self.state(), RunnerState::Off | RunnerState::Error)
    }

    pub fn get_config(&self) -> ConfigValue {
        self.current_config.lock().clone()
    }

    /// Signal the worker to exit and, so observers see the request even
    /// before the worker itself notices, announce `stopping` immediately.
    /// A no-op if the worker is not currently live.
    pub fn request_stop(&self) {
        if self.alive() {
            Status::announce_stopping(self.name.as_str());
        }
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn reset_for_new_life(&self) {
        self.stop.store(false, Ordering::Relaxed);
    }
}
