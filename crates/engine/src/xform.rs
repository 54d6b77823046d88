// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Evaluation of the format/title/image/priority handler options.
//!
//! A configured value is, by shape: a mapping literal (look the input
//! up, pass it through when missing), a hook reference (call with the
//! input and the data map), or template text with `{placeholders}`.
//! Failures degrade to the input value; embedded `\n` escapes in
//! string results become real newlines.

use crate::handlers::XformStep;
use warble_core::{interpolate, unescape_newlines, DataMap, Value};

/// Apply one transformation step to `input`. Absent steps and failed
/// evaluations return the input unchanged (failures are logged).
pub fn apply(step: Option<&XformStep>, input: Value, data: &DataMap, section: &str) -> Value {
    let result = match step {
        None => input,

        Some(XformStep::Map(map)) => {
            let key = input.render();
            map.get(&key).cloned().unwrap_or(input)
        }

        Some(XformStep::Func { name, hook }) => match hook.as_ref()(&input, data) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(section, hook = %name, %error, "cannot invoke transformation hook");
                input
            }
        },

        Some(XformStep::Text(template)) => match interpolate(template, data) {
            Ok(text) => Value::Str(text),
            Err(error) => {
                tracing::warn!(section, %error, "cannot format message");
                input
            }
        },
    };

    match result {
        Value::Str(s) => Value::Str(unescape_newlines(&s)),
        other => other,
    }
}

/// Resolve the priority option to an integer. Anything that does not
/// coerce cleanly is zero, with a debug log.
pub fn priority(step: Option<&XformStep>, data: &DataMap, section: &str) -> i64 {
    let value = apply(step, Value::Int(0), data, section);
    match value.as_i64() {
        Some(priority) => priority,
        None => {
            tracing::debug!(section, value = %value, "priority is not an integer, defaulting to zero");
            0
        }
    }
}

#[cfg(test)]
#[path = "xform_tests.rs"]
mod tests;
