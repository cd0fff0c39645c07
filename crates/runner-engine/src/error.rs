// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The error a runner's `iterate` step can return, and the typed failure
//! for trying to construct one outside the harness's registry-backed
//! factory path.

use indexmap::IndexMap;
use runner_core::{ConfigValue, RegistryError};
use thiserror::Error;

/// Any failure from user `iterate` code. The harness catches this, never
/// propagates it, and records its message on the runner's [`runner_core::Status`].
///
/// `entries` carries whatever status entries the runner wants published
/// alongside the error — mirroring the original's habit of recording an
/// entry describing what went wrong before raising.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct IterateError {
    message: String,
    entries: IndexMap<String, ConfigValue>,
}

impl IterateError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            entries: IndexMap::new(),
        }
    }

    pub fn with_entries(mut self, entries: IndexMap<String, ConfigValue>) -> Self {
        self.entries = entries;
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn entries(&self) -> &IndexMap<String, ConfigValue> {
        &self.entries
    }
}

impl From<runner_config::ConfigError> for IterateError {
    fn from(err: runner_config::ConfigError) -> Self {
        Self::new(err.to_string())
    }
}

/// Why a runner could not be produced through the harness's registry-backed
/// factory path. The harness (`ThreadRunner`/`ProcessRunner`) is the only
/// thing that ever calls `Runner::iterate`, and [`crate::construct_harnessed`]
/// is the only public entry point that turns a `class_runner` registry key
/// into a live `Runner` for it to host — so a key that was never registered
/// is refused here rather than reaching a harness at all.
#[derive(Debug, Error)]
pub enum RunnerConstructionError {
    /// `key` names a `class_runner` registry entry that was never
    /// registered — the runner it would have named was never harnessed
    /// through a factory.
    #[error("no runner factory registered under key {0:?}; it was never harnessed")]
    NotHarnessed(String),

    /// `key` was registered, but its factory itself returned an error
    /// while building the runner.
    #[error("runner factory {0:?} failed: {1}")]
    Failed(String, String),
}

impl RunnerConstructionError {
    pub(crate) fn from_registry(key: &str, err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownKey(key) => Self::NotHarnessed(key),
            RegistryError::ConstructionFailed(key, message) => Self::Failed(key, message),
            RegistryError::DuplicateKey(_) => Self::Failed(key.to_string(), err.to_string()),
        }
    }
}
