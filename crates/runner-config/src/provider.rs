// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The [`ConfigProvider`] trait and its three implementations.

use crate::ConfigError;
use runner_core::ConfigValue;

/// Supplies a runner (or the manager) with its current configuration.
/// Called once per `iterate` in the runner harness, so implementations
/// that read from disk must be cheap when nothing changed.
pub trait ConfigProvider: Send + Sync {
    fn get(&self) -> Result<ConfigValue, ConfigError>;
}

/// Always returns the same value: a base mapping with an optional override
/// deep-merged on top at construction time.
pub struct FixedConfigProvider {
    value: ConfigValue,
}

impl FixedConfigProvider {
    pub fn new(base: ConfigValue, override_value: Option<ConfigValue>) -> Self {
        let value = match override_value {
            Some(over) => base.merged_with(&over),
            None => base,
        };
        Self { value }
    }
}

impl ConfigProvider for FixedConfigProvider {
    fn get(&self) -> Result<ConfigValue, ConfigError> {
        Ok(self.value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    #[test]
    fn fixed_provider_merges_the_override_at_construction() {
        let mut base = IndexMap::new();
        base.insert("a".to_string(), ConfigValue::Integer(1));
        base.insert("b".to_string(), ConfigValue::Integer(10));

        let mut over = IndexMap::new();
        over.insert("a".to_string(), ConfigValue::Integer(2));

        let provider = FixedConfigProvider::new(
            ConfigValue::Mapping(base),
            Some(ConfigValue::Mapping(over)),
        );
        let got = provider.get().unwrap();
        let mapping = got.as_mapping().unwrap();
        assert_eq!(mapping.get("a"), Some(&ConfigValue::Integer(2)));
        assert_eq!(mapping.get("b"), Some(&ConfigValue::Integer(10)));
    }
}
