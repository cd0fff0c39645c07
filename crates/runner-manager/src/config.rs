// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loading a manager declaration from a TOML file.
//!
//! Shape: one top-level table per runner name. `class_runner` and
//! `class_config_getter` name registry keys (replacing the original's
//! dotted-path class references); `args` is the runner's bound positional
//! arguments; `[<name>.kwargs]` is the config provider's bound arguments;
//! `host` (`"thread"` default, or `"process"`) picks how the worker runs.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use indexmap::IndexMap;
use parking_lot::Mutex;
use runner_config::toml_to_config_value;
use runner_core::{ConfigValue, RunnerName};

use crate::declaration::{ManagerDeclaration, RunnerFactory, RunnerHost};
use crate::error::ManagerError;

/// Supplies the manager's control loop with the current declaration.
pub trait ManagerConfigProvider: Send + Sync {
    fn get(&self) -> Result<ManagerDeclaration, ManagerError>;
}

/// Loads a manager declaration from a TOML file once, with no reloading —
/// matching [`runner_config::StaticTomlConfigProvider`]'s contract for the
/// manager's own declaration (spec.md's resolved Open Question: a manager
/// does not watch its own declaration file for live edits the way runner
/// config files are watched).
pub struct StaticManagerConfigProvider {
    declaration: ManagerDeclaration,
}

impl StaticManagerConfigProvider {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, ManagerError> {
        Ok(Self {
            declaration: load(path.as_ref())?,
        })
    }
}

impl ManagerConfigProvider for StaticManagerConfigProvider {
    fn get(&self) -> Result<ManagerDeclaration, ManagerError> {
        Ok(self.declaration.clone())
    }
}

/// Reloads the declaration file whenever its mtime advances — lets an
/// operator add or remove runner sections without restarting the manager
/// process, while per-runner config edits still flow through each runner's
/// own [`runner_config::ConfigProvider`] rather than this one.
pub struct DynamicManagerConfigProvider {
    path: PathBuf,
    cache: Mutex<(ManagerDeclaration, SystemTime)>,
}

impl DynamicManagerConfigProvider {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, ManagerError> {
        let path = path.into();
        let declaration = load(&path)?;
        let mtime = mtime_of(&path)?;
        Ok(Self {
            path,
            cache: Mutex::new((declaration, mtime)),
        })
    }
}

impl ManagerConfigProvider for DynamicManagerConfigProvider {
    fn get(&self) -> Result<ManagerDeclaration, ManagerError> {
        let current_mtime = mtime_of(&self.path)?;
        let mut cache = self.cache.lock();
        if current_mtime > cache.1 {
            cache.0 = load(&self.path)?;
            cache.1 = current_mtime;
        }
        Ok(cache.0.clone())
    }
}

fn mtime_of(path: &Path) -> Result<SystemTime, ManagerError> {
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|source| ManagerError::Read {
            path: path.to_path_buf(),
            source,
        })
}

fn load(path: &Path) -> Result<ManagerDeclaration, ManagerError> {
    if !path.exists() {
        return Err(ManagerError::Missing(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path).map_err(|source| ManagerError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: toml::Value = toml::from_str(&text).map_err(|source| ManagerError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let table = parsed.as_table().cloned().unwrap_or_default();

    let mut declaration = Vec::with_capacity(table.len());
    for (name, section) in table {
        declaration.push(parse_section(&name, &section)?);
    }
    Ok(declaration)
}

fn parse_section(name: &str, section: &toml::Value) -> Result<RunnerFactory, ManagerError> {
    let table = section.as_table().ok_or_else(|| {
        ManagerError::MissingKey(name.to_string(), "<runner section must be a table>")
    })?;

    let class_runner = table
        .get("class_runner")
        .and_then(toml::Value::as_str)
        .ok_or_else(|| ManagerError::MissingKey(name.to_string(), "class_runner"))?
        .to_string();
    let class_config_getter = table
        .get("class_config_getter")
        .and_then(toml::Value::as_str)
        .ok_or_else(|| ManagerError::MissingKey(name.to_string(), "class_config_getter"))?
        .to_string();

    let host = match table.get("host").and_then(toml::Value::as_str) {
        None | Some("thread") => RunnerHost::Thread,
        Some("process") => RunnerHost::Process,
        Some(other) => {
            return Err(ManagerError::UnknownHost(name.to_string(), other.to_string()))
        }
    };

    let runner_args = match table.get("args") {
        Some(value) => toml_to_config_value(value)?,
        None => ConfigValue::Sequence(Vec::new()),
    };
    let provider_args = match table.get("kwargs") {
        Some(value) => toml_to_config_value(value)?,
        None => ConfigValue::Mapping(IndexMap::new()),
    };

    Ok(RunnerFactory {
        name: RunnerName::new(name),
        runner_kind: class_runner,
        runner_args,
        provider_kind: class_config_getter,
        provider_args,
        host,
    })
}
