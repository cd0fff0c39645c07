// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runs a runner's lifecycle in a fresh OS process.
//!
//! There is no reflective class loading in this workspace (runners resolve
//! through [`runner_core::Registry`] instead), so a process worker is the
//! same executable re-invoked with a spawn spec describing which registered
//! runner and config provider to construct. The parent hands its current
//! Shared Memory snapshot to the child via an environment variable; the
//! child streams its status back over stdout, one JSON object per line,
//! which the parent folds into its own registry. This is the systems-native
//! replacement for the interpreter-managed cross-process proxy: see
//! `runner_core::SharedMemory` for the in-process half of the contract.
//!
//! A process worker can't carry an [`crate::Interruptor`] closure across
//! the boundary — a closure isn't serializable — so interrupts are named
//! instead: [`InterruptFlag`] points at a Shared Memory record and field,
//! and the parent mirrors that record into the child continuously (not
//! just at spawn, unlike the rest of Shared Memory) over the same pipe
//! plumbing used in reverse for status, at the child's own core period.
//! The child's harness then polls its own local copy exactly like a
//! thread-hosted runner polls the live registry directly.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use parking_lot::Mutex;
use runner_core::{Clock, ConfigValue, RunnerName, RunnerState, SharedMemory, Status, SystemClock};
use serde::{Deserialize, Serialize};

use crate::lifecycle::Lifecycle;

/// The environment variable a child process checks for on startup to learn
/// it should run as a spawned runner worker instead of the normal CLI.
pub const SPAWN_SPEC_ENV_VAR: &str = "RUNNER_ENGINE_SPAWN_SPEC";

#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessSpawnSpec {
    pub name: RunnerName,
    pub runner_key: String,
    pub runner_args: ConfigValue,
    pub provider_key: String,
    pub provider_args: ConfigValue,
    pub core_frequency: f64,
    pub shared_snapshot: HashMap<String, IndexMap<String, ConfigValue>>,
    #[serde(default)]
    pub interrupt_flags: Vec<InterruptFlag>,
}

/// Names one Shared Memory record and field a process-hosted runner's
/// worker polls as an interrupt — the serializable stand-in for a
/// [`crate::Interruptor`] closure, which can't itself cross the process
/// boundary. `field` holds `true` (a [`ConfigValue::Bool`]) when the
/// interrupt is asserted, the same convention a thread-hosted runner's own
/// interrupt closures read directly off the live registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InterruptFlag {
    pub record: String,
    pub field: String,
}

/// A runner hosted in its own OS process, spawned by re-executing the
/// current binary.
pub struct ProcessRunner {
    lifecycle: Lifecycle,
    runner_key: String,
    runner_args: ConfigValue,
    provider_key: String,
    provider_args: ConfigValue,
    core_frequency: f64,
    interrupt_flags: Vec<InterruptFlag>,
    child: Mutex<Option<ChildGuard>>,
}

struct ChildGuard {
    child: Child,
    reader: std::thread::JoinHandle<()>,
    forwarder: Option<ForwarderHandle>,
}

struct ForwarderHandle {
    stop: Arc<AtomicBool>,
    thread: std::thread::JoinHandle<()>,
}

const DEFAULT_CORE_FREQUENCY_HZ: f64 = 200.0;

impl ProcessRunner {
    pub fn new(
        name: RunnerName,
        runner_key: impl Into<String>,
        runner_args: ConfigValue,
        provider_key: impl Into<String>,
        provider_args: ConfigValue,
        interrupt_flags: Vec<InterruptFlag>,
    ) -> Self {
        Self {
            lifecycle: Lifecycle::new(name),
            runner_key: runner_key.into(),
            runner_args,
            provider_key: provider_key.into(),
            provider_args,
            core_frequency: DEFAULT_CORE_FREQUENCY_HZ,
            interrupt_flags,
            child: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &RunnerName {
        &self.lifecycle.name
    }

    pub fn start(&self) {
        if self.lifecycle.alive() {
            return;
        }
        self.spawn();
    }

    /// Spawns the child worker. A failure here — the spec can't be encoded,
    /// the current executable can't be resolved, or the OS refuses to fork —
    /// is reported the same way an iterate failure is: the runner moves to
    /// `error` with the cause as its message, rather than taking down the
    /// parent process.
    fn spawn(&self) {
        self.lifecycle.reset_for_new_life();

        if let Err(message) = self.try_spawn() {
            let mut status = Status::new(self.lifecycle.name.clone(), "process".to_string());
            status.set_state(RunnerState::Error, Some(message), SystemClock.epoch_ms());
        }
    }

    fn try_spawn(&self) -> Result<(), String> {
        let shared_snapshot = SharedMemory::get_all()
            .into_iter()
            .map(|(name, record)| (name, record.lock().clone()))
            .collect();

        let spec = ProcessSpawnSpec {
            name: self.lifecycle.name.clone(),
            runner_key: self.runner_key.clone(),
            runner_args: self.runner_args.clone(),
            provider_key: self.provider_key.clone(),
            provider_args: self.provider_args.clone(),
            core_frequency: self.core_frequency,
            shared_snapshot,
            interrupt_flags: self.interrupt_flags.clone(),
        };
        let encoded =
            serde_json::to_string(&spec).map_err(|err| format!("encoding spawn spec: {err}"))?;

        let exe = std::env::current_exe()
            .map_err(|err| format!("resolving current executable: {err}"))?;
        let needs_stdin = !self.interrupt_flags.is_empty();
        let mut child = Command::new(exe)
            .env(SPAWN_SPEC_ENV_VAR, encoded)
            .stdout(Stdio::piped())
            .stdin(if needs_stdin { Stdio::piped() } else { Stdio::null() })
            .spawn()
            .map_err(|err| format!("spawning process runner worker: {err}"))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| "child stdout was not piped".to_string())?;
        let reader = std::thread::spawn(move || drain_status_lines(stdout));

        let forwarder = if needs_stdin {
            let stdin = child
                .stdin
                .take()
                .ok_or_else(|| "child stdin was not piped".to_string())?;
            let stop = Arc::new(AtomicBool::new(false));
            let flags = self.interrupt_flags.clone();
            let period = Duration::from_secs_f64(1.0 / self.core_frequency.max(1.0));
            let forwarder_stop = stop.clone();
            let thread =
                std::thread::spawn(move || forward_interrupt_flags(stdin, flags, period, forwarder_stop));
            Some(ForwarderHandle { stop, thread })
        } else {
            None
        };

        *self.child.lock() = Some(ChildGuard { child, reader, forwarder });
        Ok(())
    }

    /// Requests a graceful stop: announces `stopping`, then sends the child
    /// process SIGTERM, which its own signal-hook flag turns into the same
    /// stop condition [`crate::harness::run_life`] checks at the top of its
    /// loop. There is no other channel to reach a worker in another process.
    pub fn stop(&self, blocking: bool) {
        self.lifecycle.request_stop();
        if let Some(guard) = self.child.lock().as_ref() {
            send_sigterm(guard.child.id());
        }
        if blocking {
            self.join();
        }
    }

    fn join(&self) {
        if let Some(mut guard) = self.child.lock().take() {
            let _ = guard.child.wait();
            let _ = guard.reader.join();
            if let Some(forwarder) = guard.forwarder.take() {
                forwarder.stop.store(true, Ordering::Relaxed);
                let _ = forwarder.thread.join();
            }
        }
    }

    pub fn stopped(&self) -> bool {
        self.lifecycle.stopped()
    }

    pub fn alive(&self) -> bool {
        self.lifecycle.alive()
    }

    pub fn revive(&self) {
        self.join();
        self.spawn();
    }

    pub fn get_config(&self) -> ConfigValue {
        self.lifecycle.get_config()
    }
}

impl Drop for ProcessRunner {
    fn drop(&mut self) {
        if self.lifecycle.alive() {
            self.lifecycle.stop.store(true, Ordering::Relaxed);
        }
        if let Some(mut guard) = self.child.lock().take() {
            if let Some(forwarder) = guard.forwarder.take() {
                forwarder.stop.store(true, Ordering::Relaxed);
            }
            let _ = guard.child.kill();
            let _ = guard.child.wait();
        }
    }
}

/// Send SIGTERM to another process by shelling out to `kill`, rather than
/// an unsafe `libc`/`nix` call — the same approach this workspace's sibling
/// daemon-management tooling takes for signaling a child it does not own a
/// direct handle into.
fn send_sigterm(pid: u32) {
    let _ = Command::new("kill")
        .args(["-TERM", &pid.to_string()])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
}

/// Read newline-delimited JSON Shared Memory snapshots from the child's
/// stdout and fold each into the parent's own registry.
fn drain_status_lines(stdout: impl std::io::Read) {
    for line in BufReader::new(stdout).lines() {
        let Ok(line) = line else { break };
        if line.is_empty() {
            continue;
        }
        let Ok(records) =
            serde_json::from_str::<HashMap<String, IndexMap<String, ConfigValue>>>(&line)
        else {
            continue;
        };
        for (name, fields) in records {
            *SharedMemory::get(&name).lock() = fields;
        }
    }
}

/// The parent side of [`InterruptFlag`] forwarding: every `period`, mirror
/// whichever watched records changed since the last pass down to the
/// child's stdin as the same newline-delimited JSON shape
/// [`drain_status_lines`] reads — the child folds it straight into its own
/// Shared Memory with that same function. Only changed records are sent,
/// so an idle flag costs nothing beyond the read.
fn forward_interrupt_flags(
    mut sink: impl Write,
    flags: Vec<InterruptFlag>,
    period: Duration,
    stop: Arc<AtomicBool>,
) {
    let mut last_sent: HashMap<String, IndexMap<String, ConfigValue>> = HashMap::new();
    while !stop.load(Ordering::Relaxed) {
        let mut changed = HashMap::new();
        for flag in &flags {
            let record = SharedMemory::get(&flag.record).lock().clone();
            if last_sent.get(&flag.record) != Some(&record) {
                changed.insert(flag.record.clone(), record.clone());
                last_sent.insert(flag.record.clone(), record);
            }
        }
        if !changed.is_empty() {
            let Ok(line) = serde_json::to_string(&changed) else {
                continue;
            };
            if writeln!(sink, "{line}").is_err() {
                break;
            }
        }
        std::thread::sleep(period);
    }
}

/// The child side: adopt the parent's snapshot, construct the runner and
/// provider from the registry, and run its lifecycle in the foreground,
/// posting status snapshots back over stdout every core period. Called
/// from the CLI binary's `main` when [`SPAWN_SPEC_ENV_VAR`] is set.
pub fn run_spawned_worker<W: Write + Send + 'static>(
    spec: ProcessSpawnSpec,
    stdout: W,
) -> Duration {
    let snapshot = spec
        .shared_snapshot
        .into_iter()
        .map(|(name, fields)| (name, Arc::new(Mutex::new(fields))))
        .collect();
    SharedMemory::set_all(snapshot);

    let runner_args = spec.runner_args.clone();
    let provider_args = spec.provider_args.clone();
    let stdout = Arc::new(Mutex::new(stdout));

    let provider: Arc<dyn runner_config::ConfigProvider> =
        match runner_core::Registry::construct(&spec.provider_key, &provider_args) {
            Ok(provider) => provider,
            Err(err) => {
                report_construction_failure(&spec.name, format!("constructing config provider: {err}"));
                post_status_line(&stdout);
                return Duration::ZERO;
            }
        };

    let runner: Box<dyn crate::Runner> =
        match crate::construct_harnessed(&spec.runner_key, &runner_args) {
            Ok(runner) => runner,
            Err(err) => {
                report_construction_failure(&spec.name, format!("constructing runner: {err}"));
                post_status_line(&stdout);
                return Duration::ZERO;
            }
        };

    let stop = Arc::new(std::sync::atomic::AtomicBool::new(false));
    if let Err(err) = signal_hook::flag::register(signal_hook::consts::SIGTERM, stop.clone()) {
        tracing::warn!(%err, "failed to install SIGTERM handler; this worker only exits on iterate failure");
    }
    let current_config = Arc::new(Mutex::new(ConfigValue::empty_mapping()));

    if !spec.interrupt_flags.is_empty() {
        std::thread::spawn(|| drain_status_lines(std::io::stdin()));
    }
    let interrupts: Vec<crate::Interruptor> = spec
        .interrupt_flags
        .iter()
        .cloned()
        .map(|flag| {
            Box::new(move || {
                SharedMemory::get(&flag.record)
                    .lock()
                    .get(&flag.field)
                    .is_some_and(|value| matches!(value, ConfigValue::Bool(true)))
            }) as crate::Interruptor
        })
        .collect();

    let poller_stop = stop.clone();
    let poller_name = spec.name.clone();
    let poller_stdout = stdout.clone();
    let core_period = Duration::from_secs_f64(1.0 / spec.core_frequency.max(1.0));
    let poller = std::thread::spawn(move || {
        while !poller_stop.load(Ordering::Relaxed) {
            post_status_line(&poller_stdout);
            std::thread::sleep(core_period);
        }
        let _ = poller_name;
    });

    let ctx = crate::harness::HarnessContext {
        provider,
        interrupts: Arc::new(interrupts),
        core_frequency: spec.core_frequency,
        stop,
        current_config,
        category: Some("process".to_string()),
        baseline: Duration::ZERO,
    };
    let final_running = crate::harness::run_life(runner, ctx);

    post_status_line(&stdout);
    let _ = poller.join();
    final_running
}

/// The child can't run the harness loop at all if construction fails; it
/// persists the failure to its own `Status` and relies on the parent's
/// stdout-draining loop to eventually reflect that through its exit status,
/// since there is no harness iteration to report it through.
fn report_construction_failure(name: &RunnerName, message: String) {
    let mut status = Status::new(name.clone(), "process".to_string());
    status.set_state(RunnerState::Error, Some(message), SystemClock.epoch_ms());
}

fn post_status_line<W: Write>(stdout: &Mutex<W>) {
    let snapshot: HashMap<String, IndexMap<String, ConfigValue>> = SharedMemory::get_all()
        .into_iter()
        .map(|(name, record)| (name, record.lock().clone()))
        .collect();
    if let Ok(line) = serde_json::to_string(&snapshot) {
        let mut out = stdout.lock();
        let _ = writeln!(out, "{line}");
        let _ = out.flush();
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
