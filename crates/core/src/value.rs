// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Permissive typed configuration values.
//!
//! Option text from the INI file is parsed into a [`Value`] with a small
//! recursive-descent parser: case-insensitive `TRUE`/`FALSE`/`NONE`
//! specials, integers, floats, quoted strings, bracketed lists, and
//! brace mappings. Anything that does not parse cleanly falls back to
//! the verbatim string.

use indexmap::IndexMap;
use std::fmt;

/// A typed configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
}

impl Value {
    /// Parse option text permissively. Never fails: input that is not a
    /// recognizable literal is returned as a verbatim string.
    pub fn parse(input: &str) -> Value {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Value::Str(String::new());
        }
        let mut cur = Cursor::new(trimmed);
        match cur.parse_value(&[]) {
            Some(value) => {
                cur.skip_ws();
                if cur.at_end() {
                    value
                } else {
                    Value::Str(trimmed.to_string())
                }
            }
            None => Value::Str(trimmed.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean coercion for settings options: booleans, 0/1 integers,
    /// and the usual on/off spellings.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Int(0) => Some(false),
            Value::Int(1) => Some(true),
            Value::Str(s) => match s.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Some(true),
                "false" | "no" | "off" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Render for interpolation: strings verbatim, scalars via Display,
    /// null as empty, containers as JSON.
    pub fn render(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Str(s) => s.clone(),
            Value::List(_) | Value::Map(_) => self.to_json().to_string(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    pub fn from_json(value: &serde_json::Value) -> Value {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::Str(s.clone()),
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.iter().map(|(k, v)| (k.clone(), Value::from_json(v))).collect(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
    fn new(source: &str) -> Self {
        Self { chars: source.chars().collect(), pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    /// Parse one value. `terminators` are the characters that end a bare
    /// (unquoted) scalar token in the current context; empty means the
    /// token runs to the end of input.
    fn parse_value(&mut self, terminators: &[char]) -> Option<Value> {
        self.skip_ws();
        match self.peek()? {
            '[' => self.parse_list(),
            '{' => self.parse_map(),
            '\'' | '"' => self.parse_quoted().map(Value::Str),
            _ => {
                let token = self.take_until(terminators);
                let token = token.trim();
                if token.is_empty() {
                    return None;
                }
                Some(classify_scalar(token).unwrap_or_else(|| Value::Str(token.to_string())))
            }
        }
    }

    fn parse_list(&mut self) -> Option<Value> {
        self.bump(); // '['
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            match self.peek()? {
                ']' => {
                    self.bump();
                    return Some(Value::List(items));
                }
                ',' => {
                    self.bump();
                }
                _ => {
                    items.push(self.parse_value(&[',', ']'])?);
                }
            }
        }
    }

    fn parse_map(&mut self) -> Option<Value> {
        self.bump(); // '{'
        let mut map = IndexMap::new();
        loop {
            self.skip_ws();
            match self.peek()? {
                '}' => {
                    self.bump();
                    return Some(Value::Map(map));
                }
                ',' => {
                    self.bump();
                }
                _ => {
                    let key = self.parse_key()?;
                    self.skip_ws();
                    if self.bump()? != ':' {
                        return None;
                    }
                    let value = self.parse_value(&[',', '}'])?;
                    map.insert(key, value);
                }
            }
        }
    }

    fn parse_key(&mut self) -> Option<String> {
        self.skip_ws();
        match self.peek()? {
            '\'' | '"' => self.parse_quoted(),
            _ => {
                let token = self.take_until(&[':']);
                let token = token.trim();
                if token.is_empty() {
                    None
                } else {
                    Some(token.to_string())
                }
            }
        }
    }

    fn parse_quoted(&mut self) -> Option<String> {
        let quote = self.bump()?;
        let mut out = String::new();
        loop {
            match self.bump()? {
                '\\' => match self.bump()? {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    other => out.push(other),
                },
                c if c == quote => return Some(out),
                c => out.push(c),
            }
        }
    }

    fn take_until(&mut self, terminators: &[char]) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if terminators.contains(&c) {
                break;
            }
            out.push(c);
            self.pos += 1;
        }
        out
    }
}

fn classify_scalar(token: &str) -> Option<Value> {
    match token.to_ascii_uppercase().as_str() {
        "TRUE" => return Some(Value::Bool(true)),
        "FALSE" => return Some(Value::Bool(false)),
        "NONE" => return Some(Value::Null),
        _ => {}
    }

    if let Ok(int) = token.parse::<i64>() {
        return Some(Value::Int(int));
    }

    // Guard the float parse so words like "inf" stay strings
    let numeric_shape = token
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'));
    if numeric_shape {
        if let Ok(float) = token.parse::<f64>() {
            return Some(Value::Float(float));
        }
    }

    None
}

#[cfg(test)]
#[path = "value_tests.rs"]
mod tests;
