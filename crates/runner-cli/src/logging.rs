// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-time `tracing` subscriber setup for the binary. Library crates in
//! this workspace only ever emit `tracing::{info,warn,error}` events; this
//! is the sole place a subscriber is installed.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs a stderr-writing subscriber honoring `RUST_LOG`, defaulting to
/// `info` when unset or unparsable.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
