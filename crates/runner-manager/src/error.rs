// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors surfaced while loading a manager declaration or reconciling it.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("manager config not found at {0}")]
    Missing(PathBuf),
    #[error("failed to read manager config at {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse manager config at {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("runner section {0:?} is missing required key {1:?}")]
    MissingKey(String, &'static str),
    #[error("runner section {0:?} names unknown host kind {1:?}")]
    UnknownHost(String, String),
    #[error(transparent)]
    Config(#[from] runner_config::ConfigError),
    #[error("runner {0:?}: {1}")]
    ConstructionFailed(String, #[source] runner_core::RegistryError),
}
