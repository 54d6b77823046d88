// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `{name}` placeholder interpolation against the per-message data map.

use crate::data::DataMap;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Regex pattern for {variable_name} placeholders
// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_]*)\}").expect("constant regex pattern is valid")
});

#[derive(Debug, Error)]
pub enum InterpolateError {
    #[error("no value for placeholder '{{{0}}}'")]
    MissingKey(String),
}

/// Substitute `{name}` placeholders with rendered values from the data
/// map. A placeholder with no corresponding key is an error so callers
/// can drop the offending target rather than deliver a broken string.
pub fn interpolate(template: &str, data: &DataMap) -> Result<String, InterpolateError> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(template) {
        // Allow expect: capture group 0 always exists on a match
        #[allow(clippy::expect_used)]
        let whole = caps.get(0).expect("match has a group 0");
        let name = &caps[1];

        out.push_str(&template[last..whole.start()]);
        match data.get(name) {
            Some(value) => out.push_str(&value.render()),
            None => return Err(InterpolateError::MissingKey(name.to_string())),
        }
        last = whole.end();
    }

    out.push_str(&template[last..]);
    Ok(out)
}

/// Translate embedded `\n` escapes into real newlines.
pub fn unescape_newlines(s: &str) -> String {
    s.replace("\\n", "\n")
}

#[cfg(test)]
#[path = "interpolate_tests.rs"]
mod tests;
