// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy shared by the status and registry modules.

use crate::RunnerName;
use thiserror::Error;

/// Errors raised by [`crate::Status`] lookups.
#[derive(Debug, Error)]
pub enum StatusError {
    #[error("no status recorded for runner `{0}`")]
    NoSuchStatus(RunnerName),
}

/// Errors raised while resolving a registry key to a constructor.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no entry registered under key `{0}` for this type")]
    UnknownKey(String),

    #[error("key `{0}` was already registered for this type")]
    DuplicateKey(String),

    #[error("construction failed for key `{0}`: {1}")]
    ConstructionFailed(String, String),
}
