// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-message transformation data map.

use crate::value::Value;
use chrono::{Local, Utc};
use indexmap::IndexMap;

/// String-keyed transformation data handed to hooks and used for
/// placeholder interpolation. Insertion order is preserved.
pub type DataMap = IndexMap<String, Value>;

/// Build the built-in fields present for every message.
///
/// `payload` is the lossy UTF-8 decoding of the raw bytes; inside the
/// map `raw_payload` carries the same string, since interpolation
/// cannot represent bytes (sinks receive the true bytes on the item).
pub fn builtin_data(topic: &str, payload: &str) -> DataMap {
    let utc = Utc::now();
    let local = Local::now();

    let mut data = DataMap::new();
    data.insert("topic".into(), Value::Str(topic.to_string()));
    data.insert("payload".into(), Value::Str(payload.to_string()));
    data.insert("raw_payload".into(), Value::Str(payload.to_string()));
    data.insert("_dt".into(), Value::Str(utc.format("%Y-%m-%d %H:%M:%S").to_string()));
    data.insert("_lt".into(), Value::Str(local.format("%Y-%m-%d %H:%M:%S").to_string()));
    data.insert("_dtepoch".into(), Value::Int(utc.timestamp()));
    data.insert("_dtiso".into(), Value::Str(utc.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()));
    data.insert("_ltiso".into(), Value::Str(local.to_rfc3339()));
    data.insert("_lthhmm".into(), Value::Str(local.format("%H:%M").to_string()));
    data.insert("_lthhmmss".into(), Value::Str(local.format("%H:%M:%S").to_string()));
    data
}

/// Merge the top-level keys of a JSON-object payload into the data map.
///
/// Non-object or unparsable payloads leave the map untouched; JSON keys
/// override built-ins where they collide. Trailing NUL bytes are
/// stripped before parsing (some publishers pad payloads).
pub fn merge_json_payload(data: &mut DataMap, payload: &str) {
    let trimmed = payload.trim_end_matches('\0');
    if let Ok(serde_json::Value::Object(object)) = serde_json::from_str(trimmed) {
        for (key, value) in &object {
            data.insert(key.clone(), Value::from_json(value));
        }
    }
}

#[cfg(test)]
#[path = "data_tests.rs"]
mod tests;
