// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::RunnerName;
use serial_test::serial;

#[test]
#[serial]
fn new_status_starts_off_with_no_running_for() {
    let _guard = SharedMemory::clean_scope();
    let status = Status::new(RunnerName::new("r"), None);
    let snap = status.get(1_000);
    assert_eq!(snap.state, RunnerState::Off);
    assert_eq!(snap.running_for, None);
}

#[test]
#[serial]
fn running_for_accumulates_while_running() {
    let _guard = SharedMemory::clean_scope();
    let mut status = Status::new(RunnerName::new("r"), None);
    status.set_state(RunnerState::Starting, None, 0);
    status.set_state(RunnerState::Running, None, 1_000);
    let snap = status.get(1_500);
    assert_eq!(snap.running_for, Some(Duration::from_millis(500)));
}

#[test]
#[serial]
fn running_for_freezes_once_stopped() {
    let _guard = SharedMemory::clean_scope();
    let mut status = Status::new(RunnerName::new("r"), None);
    status.set_state(RunnerState::Running, None, 0);
    status.set_state(RunnerState::Stopping, None, 1_000);
    status.set_state(RunnerState::Off, None, 5_000);
    let snap = status.get(9_000);
    assert_eq!(snap.running_for, Some(Duration::from_millis(1_000)));
}

#[test]
#[serial]
fn running_for_keeps_accumulating_across_a_revive() {
    let _guard = SharedMemory::clean_scope();
    let mut status = Status::new(RunnerName::new("r"), None);
    status.set_state(RunnerState::Running, None, 0);
    status.set_state(RunnerState::Error, Some("boom".into()), 1_000);
    // revive: back to Starting, then Running again later
    status.set_state(RunnerState::Starting, None, 2_000);
    status.set_state(RunnerState::Running, None, 2_500);
    let snap = status.get(3_500);
    assert_eq!(snap.running_for, Some(Duration::from_millis(2_000)));
}

#[test]
#[serial]
fn entering_error_records_the_message_and_leaving_moves_it_to_previous() {
    let _guard = SharedMemory::clean_scope();
    let mut status = Status::new(RunnerName::new("r"), None);
    status.set_state(RunnerState::Error, Some("disk full".into()), 0);
    let snap = status.get(0);
    assert_eq!(snap.error.current.as_deref(), Some("disk full"));
    assert_eq!(snap.error.previous, None);

    status.set_state(RunnerState::Starting, None, 10);
    let snap = status.get(10);
    assert_eq!(snap.error.current, None);
    assert_eq!(snap.error.previous.as_deref(), Some("disk full"));
}

#[test]
#[serial]
fn issue_set_and_cleared_mirrors_error_current_previous_semantics() {
    let _guard = SharedMemory::clean_scope();
    let mut status = Status::new(RunnerName::new("r"), None);
    status.set_issue("slow iteration");
    assert_eq!(status.get(0).issue.current.as_deref(), Some("slow iteration"));

    status.remove_issue();
    let snap = status.get(0);
    assert_eq!(snap.issue.current, None);
    assert_eq!(snap.issue.previous.as_deref(), Some("slow iteration"));
}

#[test]
#[serial]
fn retrieve_fails_for_a_name_never_written() {
    let _guard = SharedMemory::clean_scope();
    assert!(Status::retrieve("nobody-home").is_err());
}

#[test]
#[serial]
fn retrieve_succeeds_once_a_status_has_persisted() {
    let _guard = SharedMemory::clean_scope();
    let _status = Status::new(RunnerName::new("present"), None);
    assert!(Status::retrieve("present").is_ok());
}

#[test]
#[serial]
fn delete_removes_the_shared_memory_record() {
    let _guard = SharedMemory::clean_scope();
    let _status = Status::new(RunnerName::new("gone-soon"), None);
    Status::delete("gone-soon");
    assert!(Status::retrieve("gone-soon").is_err());
}

#[test]
#[serial]
fn retrieve_all_counts_every_persisted_status_and_ignores_delete() {
    let _guard = SharedMemory::clean_scope();
    let _keep = Status::new(RunnerName::new("status-keep"), None);
    let _drop_me = Status::new(RunnerName::new("status-drop"), None);
    assert_eq!(Status::retrieve_all(0).len(), 2);

    Status::delete("status-drop");
    assert_eq!(Status::retrieve_all(0).len(), 1);
}

#[test]
#[serial]
fn retrieve_all_ignores_shared_memory_records_with_no_state_field() {
    let _guard = SharedMemory::clean_scope();
    let _status = Status::new(RunnerName::new("status-only"), None);
    SharedMemory::get("not-a-status")
        .lock()
        .insert("fail".to_string(), ConfigValue::Bool(true));

    assert_eq!(Status::retrieve_all(0).len(), 1);
}

#[test]
#[serial]
fn clear_all_deletes_every_persisted_status() {
    let _guard = SharedMemory::clean_scope();
    let _first = Status::new(RunnerName::new("status-a"), None);
    let _second = Status::new(RunnerName::new("status-b"), None);
    assert_eq!(Status::retrieve_all(0).len(), 2);

    Status::clear_all();
    assert_eq!(Status::retrieve_all(0).len(), 0);
}

#[test]
#[serial]
fn entries_round_trip_through_the_snapshot() {
    let _guard = SharedMemory::clean_scope();
    let mut status = Status::new(RunnerName::new("r"), None);
    let mut entries = IndexMap::new();
    entries.insert("count".to_string(), ConfigValue::Integer(7));
    status.set_entries(entries.clone());
    assert_eq!(status.get(0).entries, entries);
}
