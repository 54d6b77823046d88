// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::handlers::XformStep;
use crate::hooks::HookError;
use indexmap::IndexMap;
use std::sync::Arc;
use warble_core::FuncSpec;

fn data(pairs: &[(&str, Value)]) -> DataMap {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

#[test]
fn absent_step_passes_input_through() {
    let out = apply(None, Value::Str("payload".into()), &DataMap::new(), "s");
    assert_eq!(out, Value::Str("payload".into()));
}

#[test]
fn mapping_looks_up_input() {
    let mut map = IndexMap::new();
    map.insert("0".to_string(), Value::Str("OFF".into()));
    map.insert("1".to_string(), Value::Str("ON".into()));
    let step = XformStep::Map(map);

    let out = apply(Some(&step), Value::Str("1".into()), &DataMap::new(), "s");
    assert_eq!(out, Value::Str("ON".into()));
}

#[test]
fn mapping_miss_returns_input_unchanged() {
    let step = XformStep::Map(IndexMap::new());
    let out = apply(Some(&step), Value::Str("42".into()), &DataMap::new(), "s");
    assert_eq!(out, Value::Str("42".into()));
}

#[test]
fn text_interpolates_against_data() {
    let step = XformStep::Text("{room}:{value}".into());
    let data = data(&[("room", Value::Str("kitchen".into())), ("value", Value::Int(21))]);
    let out = apply(Some(&step), Value::Str("raw".into()), &data, "s");
    assert_eq!(out, Value::Str("kitchen:21".into()));
}

#[test]
fn text_interpolation_failure_keeps_input() {
    let step = XformStep::Text("{missing}".into());
    let out = apply(Some(&step), Value::Str("original payload".into()), &DataMap::new(), "s");
    assert_eq!(out, Value::Str("original payload".into()));
}

#[test]
fn hook_result_is_used() {
    let step = XformStep::Func {
        name: FuncSpec::parse("h:upper()").unwrap(),
        hook: Arc::new(|value: &Value, _: &DataMap| Ok(Value::Str(value.render().to_uppercase()))),
    };
    let out = apply(Some(&step), Value::Str("hello".into()), &DataMap::new(), "s");
    assert_eq!(out, Value::Str("HELLO".into()));
}

#[test]
fn hook_failure_keeps_input() {
    let step = XformStep::Func {
        name: FuncSpec::parse("h:explode()").unwrap(),
        hook: Arc::new(|_: &Value, _: &DataMap| Err(HookError::failed("boom"))),
    };
    let out = apply(Some(&step), Value::Str("kept".into()), &DataMap::new(), "s");
    assert_eq!(out, Value::Str("kept".into()));
}

#[test]
fn newline_escapes_translated_in_string_results() {
    let step = XformStep::Text("line one\\nline two".into());
    let out = apply(Some(&step), Value::Null, &DataMap::new(), "s");
    assert_eq!(out, Value::Str("line one\nline two".into()));
}

// =============================================================================
// priority coercion
// =============================================================================

#[test]
fn priority_defaults_to_zero() {
    assert_eq!(priority(None, &DataMap::new(), "s"), 0);
}

#[test]
fn priority_from_text_placeholder() {
    let step = XformStep::Text("{prio}".into());
    let data = data(&[("prio", Value::Int(2))]);
    assert_eq!(priority(Some(&step), &data, "s"), 2);
}

#[test]
fn priority_from_mapping() {
    let mut map = IndexMap::new();
    map.insert("0".to_string(), Value::Int(-1));
    let step = XformStep::Map(map);
    assert_eq!(priority(Some(&step), &DataMap::new(), "s"), -1);
}

#[test]
fn non_integer_priority_coerces_to_zero() {
    let step = XformStep::Text("not a number".into());
    assert_eq!(priority(Some(&step), &DataMap::new(), "s"), 0);
}
