// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A flag that flips on SIGTERM/SIGINT, so the run loop can notice a
//! termination request and unwind its `ManagerScope` cleanly instead of
//! leaving runners mid-life on an abrupt process exit.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use signal_hook::consts::{SIGINT, SIGTERM};

/// Registers SIGTERM and SIGINT against a shared flag and returns it.
/// `signal_hook::flag::register` owns the only signal-handler registration
/// involved and is itself safe to call.
pub fn install_termination_flag() -> std::io::Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    for signal in [SIGTERM, SIGINT] {
        signal_hook::flag::register(signal, flag.clone())?;
    }
    Ok(flag)
}
