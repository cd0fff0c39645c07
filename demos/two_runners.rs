// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end wiring example: two trivial runners declared in
//! `demos/manager.toml`, run under a manager until Ctrl-C.
//!
//! `ticker` counts its own iterations into a status entry; `greeter` logs
//! its configured message once a cycle. Run with:
//! `cargo run --bin two_runners -- demos/manager.toml`

use indexmap::IndexMap;
use runner_core::{ConfigValue, Registry, RunnerName};
use runner_engine::{IterateError, Runner};
use tracing::info;

struct Ticker {
    name: RunnerName,
    count: u64,
}

impl Runner for Ticker {
    fn name(&self) -> &RunnerName {
        &self.name
    }

    fn iterate(&mut self, _config: &ConfigValue) -> Result<IndexMap<String, ConfigValue>, IterateError> {
        self.count += 1;
        let mut entries = IndexMap::new();
        entries.insert("count".to_string(), ConfigValue::Integer(self.count as i64));
        Ok(entries)
    }
}

struct Greeter {
    name: RunnerName,
}

impl Runner for Greeter {
    fn name(&self) -> &RunnerName {
        &self.name
    }

    fn iterate(&mut self, config: &ConfigValue) -> Result<IndexMap<String, ConfigValue>, IterateError> {
        let message = config
            .as_mapping()
            .and_then(|m| m.get("message"))
            .and_then(ConfigValue::as_str)
            .unwrap_or("(no message configured)");
        info!(runner = %self.name, %message, "greeting");
        Ok(IndexMap::new())
    }
}

fn register_demo_runners() -> Result<(), runner_core::RegistryError> {
    Registry::register::<Box<dyn Runner>>(
        "demo_ticker",
        Box::new(|args| {
            let name = first_string_arg(args)?;
            Ok(Box::new(Ticker { name: RunnerName::new(name), count: 0 }) as Box<dyn Runner>)
        }),
    )?;
    Registry::register::<Box<dyn Runner>>(
        "demo_greeter",
        Box::new(|args| {
            let name = first_string_arg(args)?;
            Ok(Box::new(Greeter { name: RunnerName::new(name) }) as Box<dyn Runner>)
        }),
    )?;
    Ok(())
}

fn first_string_arg(args: &ConfigValue) -> Result<String, String> {
    match args {
        ConfigValue::Sequence(values) => values
            .first()
            .and_then(ConfigValue::as_str)
            .map(str::to_string)
            .ok_or_else(|| "expected a runner name as the first positional argument".to_string()),
        _ => Err("expected a sequence of positional arguments".to_string()),
    }
}

fn main() -> anyhow::Result<()> {
    runner_cli::logging::init();

    let manager_path = std::env::args_os()
        .nth(1)
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| std::path::PathBuf::from("demos/manager.toml"));

    register_demo_runners()?;
    runner_cli::run(RunnerName::new("demo-manager"), manager_path, false)
}
