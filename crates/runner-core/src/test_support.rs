// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Polling helpers shared by integration tests across the workspace.
//!
//! Gated behind the `test-support` feature so the dependency only reaches
//! `dev-dependencies` of downstream crates, never their release builds.

use crate::SharedMemory;
use std::time::{Duration, Instant};

/// Poll the Shared Memory record named `name` until `predicate` accepts the
/// current `state` field, or `timeout` elapses.
///
/// Mirrors the `wait_for_status` helper the original test suite used to
/// synchronize against a runner/manager's background thread without a
/// fixed sleep.
pub fn wait_for_status(
    name: &str,
    timeout: Duration,
    mut predicate: impl FnMut(Option<&str>) -> bool,
) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        let record = SharedMemory::get(name);
        let state = record.lock().get("state").and_then(|v| v.as_str().map(str::to_string));
        if predicate(state.as_deref()) {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}
