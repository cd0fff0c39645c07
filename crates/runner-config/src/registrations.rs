// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registers this crate's built-in `ConfigProvider`s with
//! [`runner_core::Registry`], under the keys a manager declaration's
//! `class_config_getter` names: `"static_toml"`, `"dynamic_toml"`, and
//! `"fixed"`. Call once at process startup, before any manager reconciles
//! a declaration that names one of these keys.

use std::path::PathBuf;

use runner_core::{ConfigValue, Registry, RegistryError};

use crate::{ConfigProvider, DynamicTomlConfigProvider, FixedConfigProvider, StaticTomlConfigProvider};

const STATIC_TOML_KEY: &str = "static_toml";
const DYNAMIC_TOML_KEY: &str = "dynamic_toml";
const FIXED_KEY: &str = "fixed";

pub fn register_builtin_providers() -> Result<(), RegistryError> {
    Registry::register::<std::sync::Arc<dyn ConfigProvider>>(
        STATIC_TOML_KEY,
        Box::new(|args| {
            let (path, vars) = path_and_vars(args)?;
            let provider = StaticTomlConfigProvider::with_vars_and_override(path, vars, None)
                .map_err(|err| err.to_string())?;
            Ok(std::sync::Arc::new(provider))
        }),
    )?;
    Registry::register::<std::sync::Arc<dyn ConfigProvider>>(
        DYNAMIC_TOML_KEY,
        Box::new(|args| {
            let (path, vars) = path_and_vars(args)?;
            let provider = DynamicTomlConfigProvider::with_vars_and_override(path, vars, None)
                .map_err(|err| err.to_string())?;
            Ok(std::sync::Arc::new(provider))
        }),
    )?;
    Registry::register::<std::sync::Arc<dyn ConfigProvider>>(
        FIXED_KEY,
        Box::new(|args| {
            let provider = FixedConfigProvider::new(args.clone(), None);
            Ok(std::sync::Arc::new(provider))
        }),
    )?;
    Ok(())
}

/// Both file-backed providers take the same `kwargs` shape:
/// `path` (required) and an optional `vars` path.
fn path_and_vars(args: &ConfigValue) -> Result<(PathBuf, Option<PathBuf>), String> {
    let mapping = args
        .as_mapping()
        .ok_or_else(|| "expected a kwargs mapping with a \"path\" key".to_string())?;
    let path = mapping
        .get("path")
        .and_then(ConfigValue::as_str)
        .ok_or_else(|| "missing required \"path\" key".to_string())?;
    let vars = mapping
        .get("vars")
        .and_then(ConfigValue::as_str)
        .map(PathBuf::from);
    Ok((PathBuf::from(path), vars))
}
