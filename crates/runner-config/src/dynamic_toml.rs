// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TOML config provider that reloads from disk whenever the file's mtime
//! advances past the last load.

use crate::provider::ConfigProvider;
use crate::{loader, ConfigError};
use parking_lot::Mutex;
use runner_core::ConfigValue;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

struct Cache {
    value: ConfigValue,
    loaded_mtime: SystemTime,
}

/// Reloads `path` inside `get()` whenever its mtime has advanced since the
/// last successful load; otherwise returns the cached value.
pub struct DynamicTomlConfigProvider {
    path: PathBuf,
    vars_path: Option<PathBuf>,
    override_value: Option<ConfigValue>,
    cache: Mutex<Cache>,
}

impl DynamicTomlConfigProvider {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Self::with_vars_and_override(path, None, None)
    }

    pub fn with_override(
        path: impl Into<PathBuf>,
        override_value: Option<ConfigValue>,
    ) -> Result<Self, ConfigError> {
        Self::with_vars_and_override(path, None, override_value)
    }

    pub fn with_vars_and_override(
        path: impl Into<PathBuf>,
        vars_path: Option<PathBuf>,
        override_value: Option<ConfigValue>,
    ) -> Result<Self, ConfigError> {
        let path = path.into();
        let (value, mtime) = Self::load(&path, vars_path.as_deref(), override_value.as_ref())?;
        Ok(Self {
            path,
            vars_path,
            override_value,
            cache: Mutex::new(Cache {
                value,
                loaded_mtime: mtime,
            }),
        })
    }

    fn load(
        path: &Path,
        vars_path: Option<&Path>,
        override_value: Option<&ConfigValue>,
    ) -> Result<(ConfigValue, SystemTime), ConfigError> {
        let vars = vars_path.map(loader::load_vars).transpose()?;
        let value = loader::load(path, vars.as_ref(), override_value)?;
        let mtime = mtime_of(path)?;
        Ok((value, mtime))
    }
}

impl ConfigProvider for DynamicTomlConfigProvider {
    fn get(&self) -> Result<ConfigValue, ConfigError> {
        let current_mtime = mtime_of(&self.path)?;
        let mut cache = self.cache.lock();
        if current_mtime > cache.loaded_mtime {
            let (value, mtime) = Self::load(
                &self.path,
                self.vars_path.as_deref(),
                self.override_value.as_ref(),
            )?;
            cache.value = value;
            cache.loaded_mtime = mtime;
        }
        Ok(cache.value.clone())
    }
}

fn mtime_of(path: &Path) -> Result<SystemTime, ConfigError> {
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
#[path = "dynamic_toml_tests.rs"]
mod tests;
