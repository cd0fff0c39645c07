// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-runner health record, persisted into [`crate::SharedMemory`].

use crate::{ConfigValue, RunnerName, SharedMemory, StatusError};
use indexmap::IndexMap;
use std::time::Duration;

/// Runner lifecycle state.
///
/// `Error` is terminal for the current life; a runner resumes only via an
/// explicit revive, which moves it back to `Starting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Off,
    Starting,
    Running,
    Stopping,
    Error,
}

crate::simple_display! {
    RunnerState {
        Off => "off",
        Starting => "starting",
        Running => "running",
        Stopping => "stopping",
        Error => "error",
    }
}

impl RunnerState {
    /// Parse a state's string form as persisted by [`Status::persist`] —
    /// used when a reader observes a record through raw Shared Memory
    /// rather than through its own `Status` handle.
    pub fn parse(text: &str) -> Option<Self> {
        Some(match text {
            "off" => Self::Off,
            "starting" => Self::Starting,
            "running" => Self::Running,
            "stopping" => Self::Stopping,
            "error" => Self::Error,
            _ => return None,
        })
    }
}

/// A current/previous pair, used identically for `error` and `issue`: when
/// the current value is cleared, it is copied to `previous` first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Current {
    pub current: Option<String>,
    pub previous: Option<String>,
}

impl Current {
    fn set(&mut self, message: String) {
        self.current = Some(message);
    }

    fn clear(&mut self) {
        if let Some(msg) = self.current.take() {
            self.previous = Some(msg);
        }
    }
}

/// A snapshot copy of a runner's status, as returned by [`Status::get`].
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshot {
    pub name: RunnerName,
    pub category: Option<String>,
    pub state: RunnerState,
    pub running_for: Option<Duration>,
    pub entries: IndexMap<String, ConfigValue>,
    pub error: Current,
    pub issue: Current,
    pub miscellaneous: IndexMap<String, ConfigValue>,
}

/// Thin wrapper around one Shared Memory record named after the runner.
pub struct Status {
    name: RunnerName,
    category: Option<String>,
    state: RunnerState,
    /// Epoch ms (via [`crate::Clock::epoch_ms`]) the state last transitioned
    /// into `Running`, minus any `running_for` accumulated across a prior
    /// life — this is what lets `running_for` stay monotone across revive
    /// (spec.md P8).
    running_since_ms: Option<u64>,
    accumulated_running: Duration,
    entries: IndexMap<String, ConfigValue>,
    error: Current,
    issue: Current,
    miscellaneous: IndexMap<String, ConfigValue>,
}

impl Status {
    pub fn new(name: RunnerName, category: impl Into<Option<String>>) -> Self {
        Self::new_with_baseline(name, category, Duration::ZERO)
    }

    /// Construct a status that starts its `running_for` accounting from
    /// `baseline` instead of zero — used by a revive, where a fresh worker
    /// (and fresh `Status`) must still report a running time that picks up
    /// where the previous life left off.
    pub fn new_with_baseline(
        name: RunnerName,
        category: impl Into<Option<String>>,
        baseline: Duration,
    ) -> Self {
        let status = Self {
            name,
            category: category.into(),
            state: RunnerState::Off,
            running_since_ms: None,
            accumulated_running: baseline,
            entries: IndexMap::new(),
            error: Current::default(),
            issue: Current::default(),
            miscellaneous: IndexMap::new(),
        };
        status.persist();
        status
    }

    /// Total running time accumulated so far, including any baseline this
    /// status was seeded with. Read by a harness right before a worker's
    /// life ends, to seed the next life's baseline on revive.
    pub fn accumulated_running(&self, now_ms: u64) -> Duration {
        match self.running_since_ms {
            Some(since) => {
                self.accumulated_running + Duration::from_millis(now_ms.saturating_sub(since))
            }
            None => self.accumulated_running,
        }
    }

    pub fn name(&self) -> &RunnerName {
        &self.name
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    /// Update `state`. When entering `Error`, `error` must be `Some` and is
    /// stored as the current error message; when leaving `Error`, any
    /// current error message is moved to `previous` and cleared. `running_for`
    /// baselines when entering `Running` and freezes when leaving it.
    pub fn set_state(&mut self, new_state: RunnerState, error: Option<String>, now_ms: u64) {
        if new_state == RunnerState::Error {
            if let Some(msg) = error {
                self.error.set(msg);
            }
        } else if self.state == RunnerState::Error {
            self.error.clear();
        }

        if new_state == RunnerState::Running && self.state != RunnerState::Running {
            self.running_since_ms = Some(now_ms);
        } else if new_state != RunnerState::Running && self.state == RunnerState::Running {
            if let Some(since) = self.running_since_ms.take() {
                self.accumulated_running += Duration::from_millis(now_ms.saturating_sub(since));
            }
        }

        self.state = new_state;
        self.persist();
    }

    pub fn set_issue(&mut self, message: impl Into<String>) {
        self.issue.set(message.into());
        self.persist();
    }

    pub fn remove_issue(&mut self) {
        self.issue.clear();
        self.persist();
    }

    pub fn set_entries(&mut self, entries: IndexMap<String, ConfigValue>) {
        self.entries = entries;
        self.persist();
    }

    pub fn set_miscellaneous(&mut self, misc: IndexMap<String, ConfigValue>) {
        self.miscellaneous = misc;
        self.persist();
    }

    /// Snapshot copy, with `running_for` computed as `now - running_since`
    /// when the runner is currently running, plus whatever accumulated in
    /// prior lives.
    pub fn get(&self, now_ms: u64) -> StatusSnapshot {
        let running_for = match self.running_since_ms {
            Some(since) => {
                Some(self.accumulated_running + Duration::from_millis(now_ms.saturating_sub(since)))
            }
            None if self.accumulated_running > Duration::ZERO => Some(self.accumulated_running),
            None => None,
        };
        StatusSnapshot {
            name: self.name.clone(),
            category: self.category.clone(),
            state: self.state,
            running_for,
            entries: self.entries.clone(),
            error: self.error.clone(),
            issue: self.issue.clone(),
            miscellaneous: self.miscellaneous.clone(),
        }
    }

    /// Write the current fields into the process-wide Shared Memory record
    /// named after this runner.
    fn persist(&self) {
        let record = SharedMemory::get(self.name.as_str());
        let mut fields = record.lock();
        fields.clear();
        fields.insert("state".into(), ConfigValue::String(self.state.to_string()));
        if let Some(category) = &self.category {
            fields.insert("category".into(), ConfigValue::String(category.clone()));
        }
        if let Some(msg) = &self.error.current {
            fields.insert("error_message".into(), ConfigValue::String(msg.clone()));
        }
        if let Some(msg) = &self.error.previous {
            fields.insert("error_previous".into(), ConfigValue::String(msg.clone()));
        }
        if let Some(msg) = &self.issue.current {
            fields.insert("issue_message".into(), ConfigValue::String(msg.clone()));
        }
        if let Some(msg) = &self.issue.previous {
            fields.insert("issue_previous".into(), ConfigValue::String(msg.clone()));
        }
        if let Some(since) = self.running_since_ms {
            fields.insert("running_since_ms".into(), ConfigValue::Integer(since as i64));
        }
        fields.insert(
            "accumulated_running_ms".into(),
            ConfigValue::Integer(self.accumulated_running.as_millis() as i64),
        );
        if !self.entries.is_empty() {
            fields.insert(
                "entries".into(),
                ConfigValue::Mapping(self.entries.clone()),
            );
        }
        if !self.miscellaneous.is_empty() {
            fields.insert(
                "miscellaneous".into(),
                ConfigValue::Mapping(self.miscellaneous.clone()),
            );
        }
    }

    /// Fetch an existing status by name, failing when absent.
    ///
    /// This models the Python original's `Status.retrieve`: this crate keeps
    /// the live [`Status`] objects inside the runner harness rather than
    /// reconstructing one from Shared Memory fields, so `retrieve` here
    /// checks presence without materializing a full handle — callers that
    /// need the structured fields use [`Status::get`] on their own handle,
    /// or read the raw record via [`SharedMemory::get`] for cross-process
    /// observation.
    pub fn retrieve(name: &str) -> Result<(), StatusError> {
        let record = SharedMemory::get(name);
        if record.lock().is_empty() {
            Err(StatusError::NoSuchStatus(RunnerName::new(name)))
        } else {
            Ok(())
        }
    }

    pub fn delete(name: &str) {
        SharedMemory::get(name).lock().clear();
    }

    /// Enumerate every persisted status currently in Shared Memory — the
    /// original's `Status.retrieve_all()`, which `test_delete`/
    /// `test_clear_all` use to assert on how many status records exist.
    ///
    /// Only records carrying a `state` field are reconstructed: Shared
    /// Memory is also used in this tree for ad-hoc records that are not a
    /// `Status` at all (a test's flag record, for instance), and those
    /// should not be counted as one.
    pub fn retrieve_all(now_ms: u64) -> Vec<StatusSnapshot> {
        SharedMemory::get_all()
            .into_iter()
            .filter_map(|(name, record)| snapshot_from_fields(&name, &record.lock(), now_ms))
            .collect()
    }

    /// Delete every persisted status from Shared Memory — the original's
    /// `Status.clear_all()`. Like [`Status::retrieve_all`], this only
    /// touches records carrying a `state` field, leaving any other
    /// Shared Memory record a caller keeps for its own purposes untouched.
    pub fn clear_all() {
        let named: Vec<String> = SharedMemory::get_all()
            .into_iter()
            .filter(|(_, record)| record.lock().contains_key("state"))
            .map(|(name, _)| name)
            .collect();
        for name in named {
            Status::delete(&name);
        }
    }

    /// Overwrite just the `state` field of a raw Shared Memory record to
    /// `stopping`, without owning the record's `Status`. Called by a
    /// runner handle's `stop()` so observers see the request announced
    /// immediately, even while the worker itself may still be deep inside
    /// an interruptible wait and has not yet noticed the request.
    pub fn announce_stopping(name: &str) {
        let record = SharedMemory::get(name);
        record.lock().insert(
            "state".to_string(),
            ConfigValue::String(RunnerState::Stopping.to_string()),
        );
    }

    /// Read just the `state` field out of a raw Shared Memory record — how
    /// an external observer (a runner handle, the manager, a test) checks a
    /// worker's lifecycle state without holding the `Status` object itself,
    /// which the worker thread or child process owns exclusively.
    pub fn read_state(name: &str) -> Option<RunnerState> {
        let record = SharedMemory::get(name);
        let fields = record.lock();
        fields.get("state").and_then(|v| v.as_str()).and_then(RunnerState::parse)
    }

    /// Compute `running_for` for an observer holding only the raw Shared
    /// Memory record — reconstructs the same value [`Status::get`] would,
    /// from the persisted `running_since_ms`/`accumulated_running_ms`
    /// fields, without needing the owning `Status` handle.
    pub fn read_running_for(name: &str, now_ms: u64) -> Option<Duration> {
        let record = SharedMemory::get(name);
        let fields = record.lock();
        running_for_from_fields(&fields, now_ms)
    }
}

/// The arithmetic shared by [`Status::read_running_for`] and
/// [`snapshot_from_fields`] — kept as a standalone function over an
/// already-locked record's fields so neither caller needs to re-lock the
/// same Shared Memory record they're already holding.
fn running_for_from_fields(fields: &IndexMap<String, ConfigValue>, now_ms: u64) -> Option<Duration> {
    let accumulated = fields
        .get("accumulated_running_ms")
        .and_then(ConfigValue::as_f64)
        .map(|ms| Duration::from_millis(ms as u64))
        .unwrap_or(Duration::ZERO);
    match fields.get("running_since_ms").and_then(ConfigValue::as_f64) {
        Some(since) => Some(accumulated + Duration::from_millis(now_ms.saturating_sub(since as u64))),
        None if accumulated > Duration::ZERO => Some(accumulated),
        None => None,
    }
}

/// Reconstruct a [`StatusSnapshot`] from a raw Shared Memory record's
/// fields, the way an external observer (no owning `Status` handle) sees
/// it — used by [`Status::retrieve_all`]. Takes the already-locked
/// `fields` directly (rather than re-fetching and re-locking the record
/// by name, as [`Status::read_state`]/[`Status::read_running_for`] do for
/// a single named lookup) since a caller enumerating every record is
/// already holding each one's lock as it visits it.
/// Returns `None` when `fields` carries no `state`, i.e. it is not a
/// status record at all.
fn snapshot_from_fields(
    name: &str,
    fields: &IndexMap<String, ConfigValue>,
    now_ms: u64,
) -> Option<StatusSnapshot> {
    let state = fields.get("state").and_then(ConfigValue::as_str).and_then(RunnerState::parse)?;
    let category = fields.get("category").and_then(ConfigValue::as_str).map(str::to_string);
    let error = Current {
        current: fields.get("error_message").and_then(ConfigValue::as_str).map(str::to_string),
        previous: fields.get("error_previous").and_then(ConfigValue::as_str).map(str::to_string),
    };
    let issue = Current {
        current: fields.get("issue_message").and_then(ConfigValue::as_str).map(str::to_string),
        previous: fields.get("issue_previous").and_then(ConfigValue::as_str).map(str::to_string),
    };
    let entries = fields
        .get("entries")
        .and_then(ConfigValue::as_mapping)
        .cloned()
        .unwrap_or_default();
    let miscellaneous = fields
        .get("miscellaneous")
        .and_then(ConfigValue::as_mapping)
        .cloned()
        .unwrap_or_default();

    Some(StatusSnapshot {
        name: RunnerName::new(name),
        category,
        state,
        running_for: running_for_from_fields(fields, now_ms),
        entries,
        error,
        issue,
        miscellaneous,
    })
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
