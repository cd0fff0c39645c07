// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use runner_core::{test_support::wait_for_status, ConfigValue, Registry, RunnerName, RunnerState, SharedMemory};
use serial_test::serial;

use super::Manager;
use crate::config::ManagerConfigProvider;
use crate::declaration::{ManagerDeclaration, RunnerFactory, RunnerHost};
use crate::error::ManagerError;
use crate::test_fixtures::{register_fixed_provider, register_flag_runner, set_fail};

const RUNNER_KEY: &str = "manager-test-runner";
const PROVIDER_KEY: &str = "manager-test-provider";
const TIMEOUT: Duration = Duration::from_secs(2);

struct TestDeclarationProvider {
    declaration: Mutex<ManagerDeclaration>,
}

impl TestDeclarationProvider {
    fn new(declaration: ManagerDeclaration) -> Self {
        Self {
            declaration: Mutex::new(declaration),
        }
    }

    fn set(&self, declaration: ManagerDeclaration) {
        *self.declaration.lock() = declaration;
    }
}

impl ManagerConfigProvider for TestDeclarationProvider {
    fn get(&self) -> Result<ManagerDeclaration, ManagerError> {
        Ok(self.declaration.lock().clone())
    }
}

fn factory(name: &str, flag_key: &str) -> RunnerFactory {
    RunnerFactory {
        name: RunnerName::new(name),
        runner_kind: RUNNER_KEY.to_string(),
        runner_args: ConfigValue::Sequence(vec![
            ConfigValue::String(name.to_string()),
            ConfigValue::String(flag_key.to_string()),
        ]),
        provider_kind: PROVIDER_KEY.to_string(),
        provider_args: ConfigValue::empty_mapping(),
        host: RunnerHost::Thread,
    }
}

fn wait_state(name: &str, state: &str) -> bool {
    wait_for_status(name, TIMEOUT, |s| s == Some(state))
}

fn setup() {
    Registry::clear();
    register_flag_runner(RUNNER_KEY);
    register_fixed_provider(PROVIDER_KEY);
}

#[test]
#[serial]
fn tick_starts_declared_runners_and_reaps_removed_ones() {
    let _guard = SharedMemory::clean_scope();
    setup();

    let provider = Arc::new(TestDeclarationProvider::new(vec![
        factory("r1", "r1-flag"),
        factory("r2", "r2-flag"),
    ]));
    let manager = Manager::new(RunnerName::new("mgr-start-stop"), provider.clone());

    manager.tick().unwrap();
    assert!(wait_state("r1", "running"));
    assert!(wait_state("r2", "running"));

    provider.set(vec![factory("r1", "r1-flag")]);
    manager.tick().unwrap();
    assert!(wait_state("r2", "off"));
    assert_eq!(manager.state_of(&RunnerName::new("r2")), Some(RunnerState::Off));
    assert_eq!(manager.runner_names(), vec![RunnerName::new("r1")]);

    manager.join_all();
}

#[test]
#[serial]
fn tick_revives_an_errored_runner_whose_declaration_is_unchanged() {
    let _guard = SharedMemory::clean_scope();
    setup();

    let provider = Arc::new(TestDeclarationProvider::new(vec![factory("r1", "r1-flag")]));
    let manager = Manager::new(RunnerName::new("mgr-revive"), provider);

    manager.tick().unwrap();
    assert!(wait_state("r1", "running"));

    set_fail("r1-flag", true);
    assert!(wait_state("r1", "error"));

    set_fail("r1-flag", false);
    manager.tick().unwrap();
    assert!(wait_state("r1", "running"));

    manager.join_all();
}

#[test]
#[serial]
fn tick_respawns_a_runner_whose_bound_arguments_changed() {
    let _guard = SharedMemory::clean_scope();
    setup();

    let provider = Arc::new(TestDeclarationProvider::new(vec![factory("r1", "r1-flag")]));
    let manager = Manager::new(RunnerName::new("mgr-respawn"), provider.clone());

    manager.tick().unwrap();
    assert!(wait_state("r1", "running"));

    // Same runner name, different bound flag key: a structural factory
    // change the manager must treat as stop-and-respawn, not a no-op.
    provider.set(vec![factory("r1", "r1-flag-2")]);
    manager.tick().unwrap();
    assert!(wait_state("r1", "running"));

    // Confirm the respawned life is actually watching the new flag.
    set_fail("r1-flag-2", true);
    assert!(wait_state("r1", "error"));
    set_fail("r1-flag-2", false);

    manager.join_all();
}

#[test]
#[serial]
fn tick_publishes_its_own_status_with_a_runner_count_entry() {
    let _guard = SharedMemory::clean_scope();
    setup();

    let provider = Arc::new(TestDeclarationProvider::new(vec![
        factory("r1", "r1-flag"),
        factory("r2", "r2-flag"),
    ]));
    let manager = Manager::new(RunnerName::new("mgr-status"), provider);
    manager.tick().unwrap();

    assert_eq!(
        manager.state_of(&RunnerName::new("mgr-status")),
        Some(RunnerState::Running)
    );
    let record = SharedMemory::get("mgr-status");
    let fields = record.lock();
    let entries = fields
        .get("entries")
        .and_then(ConfigValue::as_mapping)
        .expect("manager publishes an entries mapping");
    assert_eq!(entries.get("runner_count"), Some(&ConfigValue::Integer(2)));
    drop(fields);

    manager.join_all();
}

#[test]
#[serial]
fn an_unregistered_runner_kind_lands_the_runner_in_error_not_a_panic() {
    let _guard = SharedMemory::clean_scope();
    setup();

    let mut bad = factory("r1", "r1-flag");
    bad.runner_kind = "no-such-runner-kind".to_string();
    let provider = Arc::new(TestDeclarationProvider::new(vec![bad]));
    let manager = Manager::new(RunnerName::new("mgr-bad-kind"), provider);

    manager.tick().unwrap();
    assert!(wait_state("r1", "error"));

    manager.join_all();
}
