// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A type-erased, string-keyed constructor registry.
//!
//! Replaces the dotted-path reflective class loading of the original
//! implementation (`importlib` + attribute walk) with explicit registration:
//! a runner or config provider implementation calls [`Registry::register`]
//! once, at startup, under the key a TOML declaration will later name.
//! Lookup is namespaced by the constructed type (via [`TypeId`]) as well as
//! the key, so `runner-engine`'s runner registry and a future config
//! provider registry never collide even if they reuse the same key string.

use crate::{ConfigValue, RegistryError};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::any::{Any, TypeId};
use std::collections::HashMap;

/// A constructor taking the runner/provider's own config slice and
/// producing `T`, or a human-readable failure message.
pub type Constructor<T> = Box<dyn Fn(&ConfigValue) -> Result<T, String> + Send + Sync>;

type Entry = Box<dyn Any + Send + Sync>;

static REGISTRY: Lazy<Mutex<HashMap<(TypeId, String), Entry>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Process-wide registry mapping `(type, key)` pairs to constructors.
pub struct Registry;

impl Registry {
    /// Register `constructor` under `key` for type `T`. Fails if `key` is
    /// already taken for `T` — re-registration under a live key is almost
    /// always a programming mistake (e.g. two runner kinds fighting over
    /// the same TOML `class_runner` name).
    pub fn register<T: 'static>(
        key: impl Into<String>,
        constructor: Constructor<T>,
    ) -> Result<(), RegistryError> {
        let key = key.into();
        let mut registry = REGISTRY.lock();
        let slot = (TypeId::of::<T>(), key.clone());
        if registry.contains_key(&slot) {
            return Err(RegistryError::DuplicateKey(key));
        }
        registry.insert(slot, Box::new(constructor));
        Ok(())
    }

    /// Construct a `T` from the constructor registered under `key`,
    /// forwarding `config` to it.
    pub fn construct<T: 'static>(key: &str, config: &ConfigValue) -> Result<T, RegistryError> {
        let registry = REGISTRY.lock();
        let slot = (TypeId::of::<T>(), key.to_string());
        let entry = registry
            .get(&slot)
            .ok_or_else(|| RegistryError::UnknownKey(key.to_string()))?;
        // The slot is keyed by `TypeId::of::<T>()`, so a downcast failure
        // here would mean two distinct types share a `TypeId` — treated as
        // an unknown key rather than trusted to never happen.
        let constructor = entry
            .downcast_ref::<Constructor<T>>()
            .ok_or_else(|| RegistryError::UnknownKey(key.to_string()))?;
        constructor(config).map_err(|msg| RegistryError::ConstructionFailed(key.to_string(), msg))
    }

    /// Whether `key` has a constructor registered for `T`. Useful for
    /// startup validation of a manager declaration before any runner is
    /// actually spawned.
    pub fn contains<T: 'static>(key: &str) -> bool {
        REGISTRY
            .lock()
            .contains_key(&(TypeId::of::<T>(), key.to_string()))
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn clear() {
        REGISTRY.lock().clear();
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
