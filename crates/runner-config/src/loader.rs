// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared TOML-file loading: read, optionally interpolate `{{ name }}`
//! variables, parse, convert, and deep-merge an override on top.

use crate::toml_value::toml_to_config_value;
use crate::vars::interpolate;
use crate::ConfigError;
use runner_core::ConfigValue;
use std::path::Path;

pub fn load_vars(path: &Path) -> Result<ConfigValue, ConfigError> {
    let text = read_to_string(path)?;
    let parsed: toml::Value = toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    toml_to_config_value(&parsed)
}

pub fn load(
    path: &Path,
    vars: Option<&ConfigValue>,
    override_value: Option<&ConfigValue>,
) -> Result<ConfigValue, ConfigError> {
    let mut text = read_to_string(path)?;
    if let Some(vars) = vars {
        text = interpolate(&text, vars)?;
    }
    let parsed: toml::Value = toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let value = toml_to_config_value(&parsed)?;
    Ok(match override_value {
        Some(over) => value.merged_with(over),
        None => value,
    })
}

fn read_to_string(path: &Path) -> Result<String, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::Missing(path.to_path_buf()));
    }
    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}
