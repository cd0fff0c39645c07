// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `{{ name }}` variable interpolation over raw TOML text, applied before
//! parsing so a variable can change the value's type (e.g. substituting an
//! integer variable into a position that was otherwise a bare token turns
//! it into a TOML integer, not a string).

use crate::ConfigError;
use crate::toml_value::config_value_to_literal_text;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use runner_core::ConfigValue;

#[allow(clippy::expect_used)]
static VARIABLE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_.]+)\s*\}\}").expect("constant regex pattern is valid"));

/// Replace every `{{ name }}` occurrence in `text` with the literal textual
/// form of `name`'s value in `vars`. Fails if any referenced name is absent.
pub fn interpolate(text: &str, vars: &ConfigValue) -> Result<String, ConfigError> {
    let mapping = vars.as_mapping();
    let mut first_error = None;

    let substituted = VARIABLE_TOKEN.replace_all(text, |caps: &Captures| {
        let name = &caps[1];
        let resolved = mapping
            .and_then(|m| m.get(name))
            .ok_or_else(|| ConfigError::UnresolvedVariable(name.to_string()))
            .and_then(config_value_to_literal_text);
        match resolved {
            Ok(literal) => literal,
            Err(err) => {
                first_error.get_or_insert(err);
                String::new()
            }
        }
    });

    match first_error {
        Some(err) => Err(err),
        None => Ok(substituted.into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn vars_mapping() -> ConfigValue {
        let mut m = IndexMap::new();
        m.insert("value1".to_string(), ConfigValue::Integer(1));
        m.insert(
            "value2".to_string(),
            ConfigValue::String("\"v2\"".to_string()),
        );
        m.insert("value3".to_string(), ConfigValue::Integer(3));
        ConfigValue::Mapping(m)
    }

    #[test]
    fn substitutes_an_integer_token_without_quotes() {
        let vars = vars_mapping();
        let out = interpolate("t12 = {{ value1 }}", &vars).unwrap();
        assert_eq!(out, "t12 = 1");
    }

    #[test]
    fn substitutes_a_string_variable_that_supplies_its_own_quotes() {
        let vars = vars_mapping();
        let out = interpolate("t2 = {{ value2 }}", &vars).unwrap();
        assert_eq!(out, "t2 = \"v2\"");
    }

    #[test]
    fn is_whitespace_insensitive_around_the_name() {
        let vars = vars_mapping();
        let out = interpolate("t3 = {{value3}}", &vars).unwrap();
        assert_eq!(out, "t3 = 3");
    }

    #[test]
    fn unresolved_variable_is_an_error() {
        let vars = vars_mapping();
        let result = interpolate("t = {{ missing }}", &vars);
        assert!(matches!(result, Err(ConfigError::UnresolvedVariable(name)) if name == "missing"));
    }

    #[test]
    fn text_without_any_token_passes_through_unchanged() {
        let vars = vars_mapping();
        let out = interpolate("t4 = 4", &vars).unwrap();
        assert_eq!(out, "t4 = 4");
    }
}
