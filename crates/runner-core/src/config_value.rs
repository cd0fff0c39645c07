// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The recursive configuration value and its structural comparator.
//!
//! [`ConfigValue`] models a TOML-shaped mapping: scalars, nested mappings,
//! and sequences. [`ConfigValue::BoundCallable`] additionally models a
//! "partially-applied callable" — a registry key plus the positional
//! arguments a factory was constructed with — so a runner factory
//! declaration can be compared the same way a partially-applied callable
//! is: equal iff target and bound args match.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A recursively nested configuration value.
///
/// `PartialEq` is a structural comparator: it recurses into mappings and
/// sequences, and is the sole trigger for
/// re-applying configuration inside a runner (any differing scalar, added
/// key, removed key, or length change yields inequality).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Integer(i64),
    Float(f64),
    Bool(bool),
    String(String),
    Sequence(Vec<ConfigValue>),
    Mapping(IndexMap<String, ConfigValue>),
    /// A registry key with its bound positional arguments — the Rust
    /// stand-in for a partially-applied callable.
    BoundCallable {
        target: String,
        bound_args: Vec<ConfigValue>,
    },
}

impl PartialEq for ConfigValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Sequence(a), Self::Sequence(b)) => a == b,
            (Self::Mapping(a), Self::Mapping(b)) => {
                a.len() == b.len() && a.iter().all(|(k, v)| b.get(k).is_some_and(|bv| bv == v))
            }
            (
                Self::BoundCallable {
                    target: t1,
                    bound_args: a1,
                },
                Self::BoundCallable {
                    target: t2,
                    bound_args: a2,
                },
            ) => t1 == t2 && a1 == a2,
            _ => false,
        }
    }
}

impl ConfigValue {
    /// The empty mapping — the baseline the harness compares the very first
    /// observed configuration against.
    pub fn empty_mapping() -> Self {
        Self::Mapping(IndexMap::new())
    }

    pub fn as_mapping(&self) -> Option<&IndexMap<String, ConfigValue>> {
        match self {
            Self::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Deep-merge `override_value` onto `self`; override wins at every leaf,
    /// recursing into nested mappings. Non-mapping values are replaced
    /// wholesale, matching the Python original's `dict.update`-style merge.
    pub fn merged_with(&self, override_value: &ConfigValue) -> ConfigValue {
        match (self, override_value) {
            (ConfigValue::Mapping(base), ConfigValue::Mapping(over)) => {
                let mut merged = base.clone();
                for (key, over_value) in over {
                    match merged.get(key) {
                        Some(base_value) => {
                            merged.insert(key.clone(), base_value.merged_with(over_value));
                        }
                        None => {
                            merged.insert(key.clone(), over_value.clone());
                        }
                    }
                }
                ConfigValue::Mapping(merged)
            }
            _ => override_value.clone(),
        }
    }
}

#[cfg(test)]
#[path = "config_value_tests.rs"]
mod tests;
