// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conversion between `toml::Value` and [`ConfigValue`].

use crate::ConfigError;
use indexmap::IndexMap;
use runner_core::ConfigValue;

pub fn toml_to_config_value(value: &toml::Value) -> Result<ConfigValue, ConfigError> {
    Ok(match value {
        toml::Value::String(s) => ConfigValue::String(s.clone()),
        toml::Value::Integer(i) => ConfigValue::Integer(*i),
        toml::Value::Float(f) => ConfigValue::Float(*f),
        toml::Value::Boolean(b) => ConfigValue::Bool(*b),
        toml::Value::Array(items) => {
            let converted = items
                .iter()
                .map(toml_to_config_value)
                .collect::<Result<Vec<_>, _>>()?;
            ConfigValue::Sequence(converted)
        }
        toml::Value::Table(table) => {
            let mut mapping = IndexMap::new();
            for (key, val) in table {
                mapping.insert(key.clone(), toml_to_config_value(val)?);
            }
            ConfigValue::Mapping(mapping)
        }
        toml::Value::Datetime(dt) => {
            return Err(ConfigError::UnsupportedValue(format!("datetime `{dt}`")))
        }
    })
}

/// The literal textual form substituted for a `{{ name }}` token: scalars
/// are stringified without adding surrounding quotes (a string variable
/// supplies its own TOML quoting if it wants any), matching the behavior
/// the config loader's variable interpolation relies on.
pub fn config_value_to_literal_text(value: &ConfigValue) -> Result<String, ConfigError> {
    Ok(match value {
        ConfigValue::String(s) => s.clone(),
        ConfigValue::Integer(i) => i.to_string(),
        ConfigValue::Float(f) => f.to_string(),
        ConfigValue::Bool(b) => b.to_string(),
        other => {
            return Err(ConfigError::UnsupportedValue(format!(
                "variable value {other:?} is not a scalar"
            )))
        }
    })
}
