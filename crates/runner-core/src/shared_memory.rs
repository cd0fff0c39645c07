// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide registry of named mutable records.
//!
//! Each record behaves as a mapping from string keys to [`ConfigValue`]s.
//! Within a process, accesses to a record are serialized through a
//! `parking_lot::Mutex`. Cross-process coherence is handed off explicitly
//! via [`SharedMemory::get_all`]/[`SharedMemory::set_all`] rather than
//! relying on an interpreter-managed proxy, since a spawned child process
//! cannot share this process's in-memory registry directly.

use crate::ConfigValue;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// One named mutable record: a mapping from string keys to config values.
pub type SharedRecord = Arc<Mutex<IndexMap<String, ConfigValue>>>;

/// A full registry snapshot, suitable for handing off to a spawned child
/// process via [`SharedMemory::set_all`].
pub type Snapshot = HashMap<String, SharedRecord>;

static REGISTRY: Lazy<Mutex<Snapshot>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// Process-wide shared memory: a named-record store visible to in-process
/// observers and, after [`SharedMemory::set_all`], to child processes.
pub struct SharedMemory;

impl SharedMemory {
    /// Return the record for `name`, creating an empty one on first access.
    pub fn get(name: &str) -> SharedRecord {
        let mut registry = REGISTRY.lock();
        registry
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(IndexMap::new())))
            .clone()
    }

    /// Hand off the complete registry — the structure a freshly spawned
    /// child process should adopt so both sides observe the same writes.
    pub fn get_all() -> Snapshot {
        REGISTRY.lock().clone()
    }

    /// Adopt a registry snapshot handed off from a parent process.
    pub fn set_all(snapshot: Snapshot) {
        *REGISTRY.lock() = snapshot;
    }

    /// Drop every record.
    pub fn clear() {
        REGISTRY.lock().clear();
    }

    /// Enter a scoped region that restores the registry to empty on exit,
    /// regardless of how the region is left (including via panic unwind).
    pub fn clean_scope() -> CleanGuard {
        CleanGuard
    }
}

/// RAII guard returned by [`SharedMemory::clean_scope`]; clears the registry
/// on drop.
#[must_use]
pub struct CleanGuard;

impl Drop for CleanGuard {
    fn drop(&mut self) {
        SharedMemory::clear();
    }
}

#[cfg(test)]
#[path = "shared_memory_tests.rs"]
mod tests;
