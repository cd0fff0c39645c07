// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serial_test::serial;

use super::*;

const KEY: &str = "runner-tests-kind";

struct Noop {
    name: RunnerName,
}

impl Runner for Noop {
    fn name(&self) -> &RunnerName {
        &self.name
    }

    fn iterate(&mut self, _config: &ConfigValue) -> Result<IndexMap<String, ConfigValue>, IterateError> {
        Ok(IndexMap::new())
    }
}

#[test]
#[serial]
fn an_unregistered_key_is_reported_as_not_harnessed() {
    Registry::clear();
    let err = construct_harnessed(KEY, &ConfigValue::empty_mapping()).unwrap_err();
    assert!(matches!(err, RunnerConstructionError::NotHarnessed(key) if key == KEY));
}

#[test]
#[serial]
fn a_registered_key_builds_the_runner_it_names() {
    Registry::clear();
    Registry::register::<Box<dyn Runner>>(
        KEY,
        Box::new(|_args| Ok(Box::new(Noop { name: RunnerName::new("noop") }) as Box<dyn Runner>)),
    )
    .unwrap();

    let runner = construct_harnessed(KEY, &ConfigValue::empty_mapping()).unwrap();
    assert_eq!(runner.name(), &RunnerName::new("noop"));
}

#[test]
#[serial]
fn a_registered_factory_that_fails_is_reported_as_failed_not_not_harnessed() {
    Registry::clear();
    Registry::register::<Box<dyn Runner>>(
        KEY,
        Box::new(|_args: &ConfigValue| -> Result<Box<dyn Runner>, String> { Err("boom".to_string()) }),
    )
    .unwrap();

    let err = construct_harnessed(KEY, &ConfigValue::empty_mapping()).unwrap_err();
    assert!(matches!(err, RunnerConstructionError::Failed(key, message) if key == KEY && message == "boom"));
}
