// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! INI-dialect file reader.
//!
//! `[section]` headers, `key = value` (or `key: value`) options,
//! `#`/`;` full-line comments, and indented continuation lines that are
//! joined into the previous option's value. Section names keep their
//! case; option keys are lowercased. Section and option order is
//! preserved.

use crate::error::ConfigError;
use indexmap::IndexMap;
use std::path::Path;
use warble_core::Value;

type Section = IndexMap<String, String>;

/// A parsed configuration file: raw option text by section, plus typed
/// access through [`Ini::value`].
#[derive(Debug, Clone, Default)]
pub struct Ini {
    sections: IndexMap<String, Section>,
}

impl Ini {
    pub fn load(path: &Path) -> Result<Ini, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Ini::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Ini, ConfigError> {
        let mut sections: IndexMap<String, Section> = IndexMap::new();
        let mut current_section: Option<String> = None;
        let mut current_key: Option<String> = None;

        for (idx, raw_line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw_line.trim_end();

            if line.trim().is_empty() {
                current_key = None;
                continue;
            }

            let first = line.trim_start().chars().next().unwrap_or(' ');
            if first == '#' || first == ';' {
                continue;
            }

            // Indented continuation of the previous option value
            if line.starts_with(|c: char| c == ' ' || c == '\t') {
                let (Some(section), Some(key)) = (&current_section, &current_key) else {
                    return Err(ConfigError::Parse {
                        line: line_no,
                        message: "continuation line without a preceding option".into(),
                    });
                };
                if let Some(value) = sections
                    .get_mut(section.as_str())
                    .and_then(|s| s.get_mut(key.as_str()))
                {
                    value.push('\n');
                    value.push_str(line.trim());
                }
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                let name = name.trim();
                if name.is_empty() {
                    return Err(ConfigError::Parse {
                        line: line_no,
                        message: "empty section name".into(),
                    });
                }
                if sections.contains_key(name) {
                    return Err(ConfigError::Parse {
                        line: line_no,
                        message: format!("duplicate section [{name}]"),
                    });
                }
                sections.insert(name.to_string(), Section::new());
                current_section = Some(name.to_string());
                current_key = None;
                continue;
            }

            let Some(section) = &current_section else {
                return Err(ConfigError::Parse {
                    line: line_no,
                    message: "option before any section header".into(),
                });
            };

            let Some((key, value)) = split_option(line) else {
                return Err(ConfigError::Parse {
                    line: line_no,
                    message: format!("expected 'key = value', got '{line}'"),
                });
            };

            let key = key.trim().to_ascii_lowercase();
            if let Some(options) = sections.get_mut(section.as_str()) {
                options.insert(key.clone(), value.trim().to_string());
            }
            current_key = Some(key);
        }

        Ok(Ini { sections })
    }

    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    pub fn has_option(&self, section: &str, key: &str) -> bool {
        self.sections.get(section).is_some_and(|s| s.contains_key(key))
    }

    /// Raw option text, untyped.
    pub fn raw(&self, section: &str, key: &str) -> Option<&str> {
        self.sections.get(section).and_then(|s| s.get(key)).map(String::as_str)
    }

    /// Option value through the permissive typed parser.
    pub fn value(&self, section: &str, key: &str) -> Option<Value> {
        self.raw(section, key).map(Value::parse)
    }

    /// All options of a section as typed values, minus the given keys.
    /// Used for `config:<service>` sections where `targets` and `module`
    /// are structural rather than sink configuration.
    pub fn section_values(
        &self,
        section: &str,
        exclude: &[&str],
    ) -> IndexMap<String, Value> {
        self.sections
            .get(section)
            .map(|options| {
                options
                    .iter()
                    .filter(|(key, _)| !exclude.contains(&key.as_str()))
                    .map(|(key, value)| (key.clone(), Value::parse(value)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Split a `key = value` or `key: value` line at the first delimiter.
fn split_option(line: &str) -> Option<(&str, &str)> {
    let eq = line.find('=');
    let colon = line.find(':');
    let pos = match (eq, colon) {
        (Some(e), Some(c)) => e.min(c),
        (Some(e), None) => e,
        (None, Some(c)) => c,
        (None, None) => return None,
    };
    Some((&line[..pos], &line[pos + 1..]))
}

#[cfg(test)]
#[path = "ini_tests.rs"]
mod tests;
