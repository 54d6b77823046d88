// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn resolves_registered_filter_verbatim() {
    let mut hooks = HookRegistry::new();
    hooks.register_filter("samplehooks:battery_ok", |_t, _p| Ok(true));

    let spec = FuncSpec::parse("samplehooks:battery_ok()").unwrap();
    let filter = hooks.resolve_filter(&spec).unwrap();
    assert!(filter.as_ref()("t", "p").unwrap());
}

#[test]
fn unregistered_hook_is_load_error() {
    let hooks = HookRegistry::new();
    let spec = FuncSpec::parse("ghost:nothing()").unwrap();
    let err = hooks.resolve_filter(&spec).unwrap_err();
    assert!(err.to_string().contains("ghost:nothing()"));
}

#[test]
fn search_path_namespaces_tried_in_order() {
    let mut hooks = HookRegistry::new();
    hooks.add_search_namespace("first");
    hooks.add_search_namespace("second");
    hooks.register_xform("second.fmt:upper", |v, _| Ok(v.clone()));

    let spec = FuncSpec::parse("fmt:upper()").unwrap();
    assert!(hooks.resolve_xform(&spec).is_ok());
}

#[test]
fn verbatim_wins_over_search_path() {
    let mut hooks = HookRegistry::new();
    hooks.add_search_namespace("ns");
    hooks.register_xform("fmt:upper", |_, _| Ok(Value::Str("direct".into())));
    hooks.register_xform("ns.fmt:upper", |_, _| Ok(Value::Str("namespaced".into())));

    let spec = FuncSpec::parse("fmt:upper()").unwrap();
    let hook = hooks.resolve_xform(&spec).unwrap();
    let result = hook.as_ref()(&Value::Null, &DataMap::new()).unwrap();
    assert_eq!(result, Value::Str("direct".into()));
}

#[test]
fn hook_kinds_are_independent_namespaces() {
    let mut hooks = HookRegistry::new();
    hooks.register_filter("h:f", |_t, _p| Ok(false));

    let spec = FuncSpec::parse("h:f()").unwrap();
    assert!(hooks.resolve_filter(&spec).is_ok());
    assert!(hooks.resolve_datamap(&spec).is_err());
}

#[tokio::test]
async fn cron_hooks_are_async() {
    let mut hooks = HookRegistry::new();
    hooks.register_cron("h:tick", |_ctx| async { Ok(()) });

    let spec = FuncSpec::parse("h:tick()").unwrap();
    let cron = hooks.resolve_cron(&spec).unwrap();
    let ctx = CronContext::new("tick", warble_sinks::Publisher::disconnected());
    cron.as_ref()(ctx).await.unwrap();
}
