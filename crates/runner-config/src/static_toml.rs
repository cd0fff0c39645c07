// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Load-once TOML config provider.

use crate::provider::ConfigProvider;
use crate::{loader, ConfigError};
use runner_core::ConfigValue;
use std::path::{Path, PathBuf};

/// Reads `path` exactly once, at construction, and returns that value for
/// every subsequent `get()`.
pub struct StaticTomlConfigProvider {
    value: ConfigValue,
}

impl StaticTomlConfigProvider {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::with_override(path, None)
    }

    pub fn with_override(
        path: impl AsRef<Path>,
        override_value: Option<ConfigValue>,
    ) -> Result<Self, ConfigError> {
        Self::with_vars_and_override(path, None, override_value)
    }

    pub fn with_vars_and_override(
        path: impl AsRef<Path>,
        vars_path: Option<PathBuf>,
        override_value: Option<ConfigValue>,
    ) -> Result<Self, ConfigError> {
        let vars = vars_path.map(|p| loader::load_vars(&p)).transpose()?;
        let value = loader::load(path.as_ref(), vars.as_ref(), override_value.as_ref())?;
        Ok(Self { value })
    }
}

impl ConfigProvider for StaticTomlConfigProvider {
    fn get(&self) -> Result<ConfigValue, ConfigError> {
        Ok(self.value.clone())
    }
}

#[cfg(test)]
#[path = "static_toml_tests.rs"]
mod tests;
