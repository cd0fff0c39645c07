// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A host-agnostic view over a supervised worker, so a manager can hold a
//! mix of thread- and process-hosted runners in one collection.

use runner_core::{ConfigValue, RunnerName};

use crate::process::ProcessRunner;
use crate::runner::Runner;
use crate::thread_runner::ThreadRunner;

/// Implemented by both [`ThreadRunner`] and [`ProcessRunner`] — the surface
/// a manager needs, independent of how the worker is hosted.
pub trait RunnerHandle: Send + Sync {
    fn name(&self) -> &RunnerName;
    fn start(&self);
    fn stop(&self, blocking: bool);
    fn stopped(&self) -> bool;
    fn alive(&self) -> bool;
    fn revive(&self);
    fn get_config(&self) -> ConfigValue;
}

impl<R: Runner> RunnerHandle for ThreadRunner<R> {
    fn name(&self) -> &RunnerName {
        ThreadRunner::name(self)
    }
    fn start(&self) {
        ThreadRunner::start(self)
    }
    fn stop(&self, blocking: bool) {
        ThreadRunner::stop(self, blocking)
    }
    fn stopped(&self) -> bool {
        ThreadRunner::stopped(self)
    }
    fn alive(&self) -> bool {
        ThreadRunner::alive(self)
    }
    fn revive(&self) {
        ThreadRunner::revive(self)
    }
    fn get_config(&self) -> ConfigValue {
        ThreadRunner::get_config(self)
    }
}

impl RunnerHandle for ProcessRunner {
    fn name(&self) -> &RunnerName {
        ProcessRunner::name(self)
    }
    fn start(&self) {
        ProcessRunner::start(self)
    }
    fn stop(&self, blocking: bool) {
        ProcessRunner::stop(self, blocking)
    }
    fn stopped(&self) -> bool {
        ProcessRunner::stopped(self)
    }
    fn alive(&self) -> bool {
        ProcessRunner::alive(self)
    }
    fn revive(&self) {
        ProcessRunner::revive(self)
    }
    fn get_config(&self) -> ConfigValue {
        ProcessRunner::get_config(self)
    }
}
