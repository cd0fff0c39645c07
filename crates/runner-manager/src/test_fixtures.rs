// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for `manager`/`scope` tests: a runner whose success or
//! failure is driven by a Shared Memory flag the test sets directly,
//! independent of its declared config — letting a test force `error` and
//! `revive` without rewriting the declaration, which would trigger a
//! respawn instead.

use indexmap::IndexMap;
use runner_config::{ConfigProvider, FixedConfigProvider};
use runner_core::{ConfigValue, Registry, RunnerName, SharedMemory};
use runner_engine::{IterateError, Runner};
use std::sync::Arc;

struct FlagRunner {
    name: RunnerName,
    flag_key: String,
}

impl Runner for FlagRunner {
    fn name(&self) -> &RunnerName {
        &self.name
    }

    fn iterate(
        &mut self,
        _config: &ConfigValue,
    ) -> Result<IndexMap<String, ConfigValue>, IterateError> {
        let failing = SharedMemory::get(&self.flag_key)
            .lock()
            .get("fail")
            .is_some_and(|v| matches!(v, ConfigValue::Bool(true)));
        if failing {
            Err(IterateError::new("flagged to fail"))
        } else {
            Ok(IndexMap::new())
        }
    }
}

pub fn set_fail(flag_key: &str, fail: bool) {
    SharedMemory::get(flag_key)
        .lock()
        .insert("fail".to_string(), ConfigValue::Bool(fail));
}

/// Registers a [`FlagRunner`] factory under `key`. Expects `args` to be a
/// two-element sequence `[name, flag_key]`, matching how
/// `crate::declaration::RunnerFactory::runner_args` binds a runner's
/// positional arguments.
pub fn register_flag_runner(key: &str) {
    Registry::register::<Box<dyn Runner>>(
        key,
        Box::new(|args| {
            let ConfigValue::Sequence(items) = args else {
                return Err("expected a [name, flag_key] sequence".to_string());
            };
            let (Some(ConfigValue::String(name)), Some(ConfigValue::String(flag_key))) =
                (items.first(), items.get(1))
            else {
                return Err("expected [name, flag_key] as strings".to_string());
            };
            let runner: Box<dyn Runner> = Box::new(FlagRunner {
                name: RunnerName::new(name.clone()),
                flag_key: flag_key.clone(),
            });
            Ok(runner)
        }),
    )
    .unwrap();
}

/// Registers a provider under `key` that always returns `args` unchanged —
/// `FlagRunner`'s behavior is driven by its Shared Memory flag, not by its
/// config, so a fixed value is all these tests need.
pub fn register_fixed_provider(key: &str) {
    Registry::register::<Arc<dyn ConfigProvider>>(
        key,
        Box::new(|args| {
            let provider: Arc<dyn ConfigProvider> =
                Arc::new(FixedConfigProvider::new(args.clone(), None));
            Ok(provider)
        }),
    )
    .unwrap();
}
