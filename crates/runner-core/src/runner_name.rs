// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runner identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A runner's user-chosen name.
///
/// Doubles as the runner's Shared Memory key for its [`crate::Status`]
/// record and for any auxiliary record the runner keeps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RunnerName(String);

impl RunnerName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunnerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RunnerName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RunnerName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::borrow::Borrow<str> for RunnerName {
    fn borrow(&self) -> &str {
        &self.0
    }
}
