// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hook references of the form `mod.path:name()`.

use std::fmt;

/// A reference to a registered hook function: a dotted module path and a
/// function name, written `mod.path:name()` in configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FuncSpec {
    pub module: String,
    pub name: String,
}

impl FuncSpec {
    /// Parse a funcspec. Returns `None` unless the text has the exact
    /// shape `identifier(.identifier)*:identifier()`.
    pub fn parse(text: &str) -> Option<FuncSpec> {
        let text = text.trim();
        let (module, func) = text.split_once(':')?;

        if module.is_empty() || !module.split('.').all(is_identifier) {
            return None;
        }

        let name = func.strip_suffix("()")?;
        if !is_identifier(name) {
            return None;
        }

        Some(FuncSpec { module: module.to_string(), name: name.to_string() })
    }

    /// Registry key: `module:name` without the call marker.
    pub fn key(&self) -> String {
        format!("{}:{}", self.module, self.name)
    }
}

impl fmt::Display for FuncSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}()", self.module, self.name)
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
#[path = "funcspec_tests.rs"]
mod tests;
