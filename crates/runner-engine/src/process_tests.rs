// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use runner_core::{ConfigValue, Registry, RunnerName, SharedMemory};
use runner_config::{ConfigProvider, FixedConfigProvider};
use serial_test::serial;

use super::*;
use crate::{IterateError, Runner};

const RUNNER_KEY: &str = "process-test-runner";
const PROVIDER_KEY: &str = "process-test-provider";

/// Succeeds once (publishing an `entries` marker), then fails — just enough
/// to drive `run_life` through one full iteration and back out again
/// without needing access to the harness's internal stop flag.
struct OnceThenFail {
    name: RunnerName,
    iterated: bool,
}

impl Runner for OnceThenFail {
    fn name(&self) -> &RunnerName {
        &self.name
    }

    fn iterate(&mut self, _config: &ConfigValue) -> Result<IndexMap<String, ConfigValue>, IterateError> {
        if !self.iterated {
            self.iterated = true;
            let mut entries = IndexMap::new();
            entries.insert("seen".to_string(), ConfigValue::Bool(true));
            Ok(entries)
        } else {
            Err(IterateError::new("done after one iteration"))
        }
    }
}

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn setup() {
    Registry::clear();
    Registry::register::<Box<dyn Runner>>(
        RUNNER_KEY,
        Box::new(|_args| {
            Ok(Box::new(OnceThenFail {
                name: RunnerName::new("child-runner"),
                iterated: false,
            }) as Box<dyn Runner>)
        }),
    )
    .unwrap();
    Registry::register::<Arc<dyn ConfigProvider>>(
        PROVIDER_KEY,
        Box::new(|args| Ok(Arc::new(FixedConfigProvider::new(args.clone(), None)) as Arc<dyn ConfigProvider>)),
    )
    .unwrap();
}

/// The child side of the wire contract: it runs the registered runner to
/// completion and posts Shared Memory snapshots — as JSON lines — over
/// whatever writer it was given, standing in for the pipe to the parent.
#[test]
#[serial]
fn run_spawned_worker_posts_the_child_runners_status_as_a_json_line() {
    let _guard = SharedMemory::clean_scope();
    setup();

    let mut kwargs = IndexMap::new();
    kwargs.insert("frequency".to_string(), ConfigValue::Float(1000.0));

    let spec = ProcessSpawnSpec {
        name: RunnerName::new("child-runner"),
        runner_key: RUNNER_KEY.to_string(),
        runner_args: ConfigValue::Sequence(Vec::new()),
        provider_key: PROVIDER_KEY.to_string(),
        provider_args: ConfigValue::Mapping(kwargs),
        core_frequency: 1000.0,
        shared_snapshot: HashMap::new(),
        interrupt_flags: Vec::new(),
    };

    let buf = SharedBuf::default();
    run_spawned_worker(spec, buf.clone());

    let captured = String::from_utf8(buf.0.lock().clone()).unwrap();
    let last_line = captured.lines().last().expect("at least one status line was posted");
    let snapshot: HashMap<String, IndexMap<String, ConfigValue>> =
        serde_json::from_str(last_line).unwrap();
    let fields = snapshot.get("child-runner").expect("child runner's own record was posted");
    assert_eq!(fields.get("state"), Some(&ConfigValue::String("error".to_string())));
}

/// A child's low-frequency wait is cut short the moment its interrupt
/// flag is already set when it starts — proving `interrupt_flags` reaches
/// the harness's poll, not just that the field round-trips through JSON.
/// Without the interrupt, this test would block for the runner's declared
/// 100-second wait.
#[test]
#[serial]
fn a_child_runners_low_frequency_wait_is_cut_short_by_an_interrupt_flag() {
    let _guard = SharedMemory::clean_scope();
    setup();

    SharedMemory::get("watched")
        .lock()
        .insert("on".to_string(), ConfigValue::Bool(true));

    let mut kwargs = IndexMap::new();
    kwargs.insert("frequency".to_string(), ConfigValue::Float(0.01));

    let spec = ProcessSpawnSpec {
        name: RunnerName::new("child-runner"),
        runner_key: RUNNER_KEY.to_string(),
        runner_args: ConfigValue::Sequence(Vec::new()),
        provider_key: PROVIDER_KEY.to_string(),
        provider_args: ConfigValue::Mapping(kwargs),
        core_frequency: 1000.0,
        shared_snapshot: HashMap::new(),
        interrupt_flags: vec![InterruptFlag {
            record: "watched".to_string(),
            field: "on".to_string(),
        }],
    };

    let buf = SharedBuf::default();
    let started = std::time::Instant::now();
    run_spawned_worker(spec, buf.clone());
    assert!(
        started.elapsed() < Duration::from_secs(5),
        "the interrupt flag should have cut the 100s wait short"
    );
}

/// The parent side of the forwarder: a watched record's changes stream out
/// as the same newline-delimited JSON shape `drain_status_lines` reads,
/// and stop once told to.
#[test]
#[serial]
fn forward_interrupt_flags_streams_changes_until_stopped() {
    let _guard = SharedMemory::clean_scope();
    SharedMemory::get("watched")
        .lock()
        .insert("on".to_string(), ConfigValue::Bool(false));

    let buf = SharedBuf::default();
    let stop = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let flags = vec![InterruptFlag {
        record: "watched".to_string(),
        field: "on".to_string(),
    }];
    let forwarder_stop = stop.clone();
    let forwarder_buf = buf.clone();
    let handle = std::thread::spawn(move || {
        forward_interrupt_flags(forwarder_buf, flags, Duration::from_millis(5), forwarder_stop)
    });

    std::thread::sleep(Duration::from_millis(30));
    SharedMemory::get("watched")
        .lock()
        .insert("on".to_string(), ConfigValue::Bool(true));
    std::thread::sleep(Duration::from_millis(30));
    stop.store(true, std::sync::atomic::Ordering::Relaxed);
    handle.join().unwrap();

    let captured = String::from_utf8(buf.0.lock().clone()).unwrap();
    let last_line = captured.lines().last().expect("at least one change was forwarded");
    let snapshot: HashMap<String, IndexMap<String, ConfigValue>> =
        serde_json::from_str(last_line).unwrap();
    assert_eq!(
        snapshot.get("watched").and_then(|fields| fields.get("on")),
        Some(&ConfigValue::Bool(true))
    );
}

/// The parent side: folding a child's posted snapshot line into this
/// process's own Shared Memory, exactly as `ProcessRunner`'s reader thread
/// does — proving P12 (cross-process observation) end to end without
/// needing an actual second OS process.
#[test]
#[serial]
fn drain_status_lines_folds_a_childs_snapshot_into_this_processs_shared_memory() {
    let _guard = SharedMemory::clean_scope();

    let mut child_fields = IndexMap::new();
    child_fields.insert("state".to_string(), ConfigValue::String("running".to_string()));
    let mut snapshot = HashMap::new();
    snapshot.insert("remote-runner".to_string(), child_fields);
    let line = serde_json::to_string(&snapshot).unwrap();

    drain_status_lines(format!("{line}\n").as_bytes());

    let record = SharedMemory::get("remote-runner");
    let fields = record.lock();
    assert_eq!(
        fields.get("state"),
        Some(&ConfigValue::String("running".to_string()))
    );
}
