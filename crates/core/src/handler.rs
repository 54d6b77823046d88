// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handler target and transformation option shapes.

use crate::funcspec::FuncSpec;
use crate::value::Value;
use indexmap::IndexMap;
use std::fmt;

/// One `(service, target?)` pair. An absent target key means fan-out to
/// every valid target key of the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetAddr {
    pub service: String,
    pub target: Option<String>,
}

impl TargetAddr {
    pub fn new(service: impl Into<String>, target: Option<&str>) -> Self {
        Self {
            service: service.into(),
            target: target.filter(|t| !t.is_empty()).map(str::to_string),
        }
    }

    /// Parse `"service"` or `"service:target"`.
    pub fn parse(text: &str) -> TargetAddr {
        match text.split_once(':') {
            Some((service, target)) => TargetAddr::new(service.trim(), Some(target.trim())),
            None => TargetAddr::new(text.trim(), None),
        }
    }
}

impl fmt::Display for TargetAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Some(target) => write!(f, "{}:{}", self.service, target),
            None => f.write_str(&self.service),
        }
    }
}

/// The `targets` option of a handler section, in one of its three shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetsSpec {
    /// Ordered list used verbatim.
    Static(Vec<TargetAddr>),
    /// Topic-keyed mapping; the most specific matching key wins.
    Mapping(IndexMap<String, Vec<TargetAddr>>),
    /// User function invoked per message.
    Dynamic(FuncSpec),
}

/// Shape of a `format`/`title`/`image`/`priority` handler option.
#[derive(Debug, Clone, PartialEq)]
pub enum XformSpec {
    /// Mapping literal: look the input up, pass it through when missing.
    Map(IndexMap<String, Value>),
    /// Registered hook called with `(value, data)`.
    Func(FuncSpec),
    /// Template text with `{...}` placeholders.
    Text(String),
}

impl XformSpec {
    /// Classify a configured option value by shape.
    pub fn from_value(value: &Value) -> XformSpec {
        match value {
            Value::Map(map) => XformSpec::Map(map.clone()),
            other => {
                let text = other.render();
                match FuncSpec::parse(&text) {
                    Some(spec) => XformSpec::Func(spec),
                    None => XformSpec::Text(text),
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
