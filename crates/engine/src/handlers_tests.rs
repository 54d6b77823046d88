// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::registry::SinkFactories;
use warble_sinks::Publisher;

const BASE: &str = "\
[defaults]
launch = log

[config:log]
targets = {'info': ['info'], 'warn': ['warn']}

";

fn table(extra: &str) -> Result<HandlerTable, EngineError> {
    table_with_hooks(extra, HookRegistry::new())
}

fn table_with_hooks(extra: &str, hooks: HookRegistry) -> Result<HandlerTable, EngineError> {
    let ini = Ini::parse(&format!("{BASE}{extra}")).unwrap();
    let registry = ServiceRegistry::build(
        &ini,
        &["log".to_string()],
        &SinkFactories::new(),
        &Publisher::disconnected(),
    )
    .unwrap();
    HandlerTable::build(&ini, &registry, &hooks)
}

#[test]
fn one_handler_per_valid_section() {
    let table = table("[a/topic]\ntargets = log:info\n\n[b/topic]\ntargets = log:warn\n").unwrap();
    assert_eq!(table.handlers().len(), 2);
    assert_eq!(table.handlers()[0].section, "a/topic");
    assert_eq!(table.handlers()[1].section, "b/topic");
}

#[test]
fn targetless_sections_are_not_handlers() {
    let table = table("[a/topic]\ntargets = log:info\n\n[orphan]\nformat = x\n").unwrap();
    assert_eq!(table.handlers().len(), 1);
}

#[test]
fn handler_with_no_loaded_service_is_config_error() {
    let result = table("[a/topic]\ntargets = ghost:x\n");
    assert!(matches!(result, Err(EngineError::Config(_))));
}

#[test]
fn handler_with_one_valid_service_survives() {
    // ghost is dropped at dispatch; the handler stays because log is loaded
    let table = table("[a/topic]\ntargets = ghost:x, log:info\n").unwrap();
    assert_eq!(table.handlers().len(), 1);
}

#[test]
fn dynamic_targets_need_no_service_validation() {
    let mut hooks = HookRegistry::new();
    hooks.register_targets("h:route", |_s, _t, _d| Ok(vec![]));
    let table = table_with_hooks("[a/topic]\ntargets = h:route()\n", hooks).unwrap();
    assert_eq!(table.handlers().len(), 1);
}

#[test]
fn unresolved_hook_skips_handler() {
    // Two sections; the one with the unknown filter hook is skipped
    let table = table(
        "[a/topic]\ntargets = log:info\nfilter = ghost:f()\n\n[b/topic]\ntargets = log:info\n",
    )
    .unwrap();
    assert_eq!(table.handlers().len(), 1);
    assert_eq!(table.handlers()[0].section, "b/topic");
}

#[test]
fn all_handlers_unusable_aborts() {
    let result = table("[a/topic]\ntargets = log:info\nfilter = ghost:f()\n");
    assert!(matches!(result, Err(EngineError::NoHandlers)));
}

#[test]
fn no_handler_sections_is_allowed() {
    // cron-only configurations are valid
    let table = table("").unwrap();
    assert!(table.is_empty());
}

#[test]
fn subscriptions_deduplicate_with_max_qos() {
    let table = table(
        "[one]\ntopic = sensors/#\nqos = 0\ntargets = log:info\n\n\
         [two]\ntopic = sensors/#\nqos = 2\ntargets = log:warn\n\n\
         [three]\ntopic = doors/+\nqos = 1\ntargets = log:info\n",
    )
    .unwrap();
    assert_eq!(
        table.subscriptions(),
        vec![("sensors/#".to_string(), 2), ("doors/+".to_string(), 1)]
    );
}

#[test]
fn mapping_targets_sorted_most_specific_first() {
    let table = table(
        "[a/#]\ntargets = {'a/#': 'log:info', 'a/b/c': 'log:warn', 'a/+/c': 'log:info'}\n",
    )
    .unwrap();
    match &table.handlers()[0].targets {
        CompiledTargets::Mapping(entries) => {
            let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
            assert_eq!(keys, vec!["a/b/c", "a/+/c", "a/#"]);
        }
        _ => panic!("expected mapping targets"),
    }
}

#[test]
fn by_section_finds_failover() {
    let table = table("[a/topic]\ntargets = log:info\n\n[failover]\ntargets = log:warn\n").unwrap();
    assert!(table.failover().is_some());
    assert!(table.by_section("failover").is_some());
    assert!(table.by_section("a/topic").is_some());
    assert!(table.by_section("nope").is_none());
}
