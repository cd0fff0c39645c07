// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The loop every runner variant is hosted by. This is the sole caller of
//! [`Runner::iterate`] — the "no exception escapes" invariant holds because
//! nothing else ever invokes it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use runner_config::ConfigProvider;
use runner_core::{Clock, ConfigValue, RunnerState, Status, SystemClock};

use crate::{Interruptor, Runner};

const DEFAULT_FREQUENCY_HZ: f64 = 1.0;

/// Everything the harness needs that is shared with the owning
/// [`crate::ThreadRunner`]/[`crate::ProcessRunner`] handle.
pub struct HarnessContext {
    pub provider: Arc<dyn ConfigProvider>,
    pub interrupts: Arc<Vec<Interruptor>>,
    pub core_frequency: f64,
    pub stop: Arc<AtomicBool>,
    pub current_config: Arc<Mutex<ConfigValue>>,
    pub category: Option<String>,
    /// Running time accumulated across any prior life of this runner,
    /// seeded by a revive.
    pub baseline: Duration,
}

/// Run one full life of a runner: from `Starting` through to either `Off`
/// (stop requested) or `Error` (iterate/config failure). Returns the total
/// running time accumulated by the time the life ended, for the caller to
/// pass as the next life's `baseline` on revive.
pub fn run_life<R: Runner>(mut runner: R, ctx: HarnessContext) -> Duration {
    let clock = SystemClock;
    let mut status =
        Status::new_with_baseline(runner.name().clone(), ctx.category.clone(), ctx.baseline);
    status.set_state(RunnerState::Starting, None, clock.epoch_ms());

    let mut previous_config = ConfigValue::empty_mapping();
    let core_period = core_period(ctx.core_frequency);

    loop {
        // The stop request itself is announced to observers synchronously
        // by the handle that issued it (see `crate::handle::request_stop`);
        // here we only need to notice it and unwind to `off`. A low
        // frequency runner may still be mid-wait when a stop is requested,
        // in which case this check does not fire until the wait ends on
        // its own (elapsed time or an interrupt) — stop does not itself
        // cut the wait short.
        if ctx.stop.load(Ordering::Relaxed) {
            status.set_state(RunnerState::Off, None, clock.epoch_ms());
            return status.accumulated_running(clock.epoch_ms());
        }

        let config = match ctx.provider.get() {
            Ok(config) => config,
            Err(err) => {
                status.set_state(RunnerState::Error, Some(err.to_string()), clock.epoch_ms());
                return status.accumulated_running(clock.epoch_ms());
            }
        };

        if config != previous_config {
            runner.on_config_change(&config, &previous_config);
            previous_config = config.clone();
        }
        *ctx.current_config.lock() = config.clone();

        match runner.iterate(&config) {
            Ok(entries) => {
                if status.state() != RunnerState::Running {
                    status.set_state(RunnerState::Running, None, clock.epoch_ms());
                }
                status.set_entries(entries);
            }
            Err(err) => {
                if !err.entries().is_empty() {
                    status.set_entries(err.entries().clone());
                }
                status.set_state(
                    RunnerState::Error,
                    Some(err.message().to_string()),
                    clock.epoch_ms(),
                );
                return status.accumulated_running(clock.epoch_ms());
            }
        }

        let frequency = config
            .as_mapping()
            .and_then(|m| m.get("frequency"))
            .and_then(ConfigValue::as_f64)
            .filter(|f| *f > 0.0)
            .unwrap_or(DEFAULT_FREQUENCY_HZ);
        let wait_for = Duration::from_secs_f64(1.0 / frequency);
        wait_out(&ctx, wait_for, core_period);
    }
}

fn core_period(core_frequency: f64) -> Duration {
    Duration::from_secs_f64(1.0 / core_frequency.max(1.0))
}

/// Cooperative sleep of `wait_for`, broken into `core_period` chunks and
/// polling interrupt predicates between each. A stop request does not cut
/// this short by itself — only an interrupt or the elapsed deadline does;
/// the stop request is noticed at the top of the outer loop once the wait
/// ends, which is what lets a low-frequency runner's interrupt predicate
/// shorten an otherwise long shutdown.
fn wait_out(ctx: &HarnessContext, wait_for: Duration, core_period: Duration) {
    let mut waited = Duration::ZERO;
    loop {
        if ctx.interrupts.iter().any(|predicate| predicate()) {
            return;
        }
        if waited >= wait_for {
            return;
        }
        let remaining = wait_for - waited;
        let nap = remaining.min(core_period);
        std::thread::sleep(nap);
        waited += nap;
    }
}
