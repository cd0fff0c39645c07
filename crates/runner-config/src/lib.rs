// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration loading: the [`ConfigProvider`] trait and its
//! fixed/static-file/dynamic-file implementations, plus `{{ name }}`
//! variable interpolation over raw TOML text.

mod dynamic_toml;
mod error;
mod loader;
mod provider;
mod registrations;
mod static_toml;
mod toml_value;
mod vars;

pub use dynamic_toml::DynamicTomlConfigProvider;
pub use error::ConfigError;
pub use provider::{ConfigProvider, FixedConfigProvider};
pub use registrations::register_builtin_providers;
pub use static_toml::StaticTomlConfigProvider;
pub use toml_value::{config_value_to_literal_text, toml_to_config_value};
pub use vars::interpolate;
