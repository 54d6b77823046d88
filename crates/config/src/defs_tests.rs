// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const BASE: &str = "\
[defaults]
launch = log

[config:log]
targets = {'info': ['info'], 'warn': ['warn']}

";

fn ini(extra: &str) -> Ini {
    Ini::parse(&format!("{BASE}{extra}")).unwrap()
}

// =============================================================================
// section classification
// =============================================================================

#[yare::parameterized(
    defaults = { "defaults" },
    failover = { "failover" },
    cron     = { "cron:ping" },
    config   = { "config:log" },
)]
fn reserved_sections(name: &str) {
    assert!(is_reserved_section(name));
}

#[test]
fn handler_sections_skip_reserved_and_targetless() {
    let ini = ini(
        "[sensors/+/temp]\ntargets = log:info\n\n[no-targets-here]\nformat = x\n\n[cron:tick]\ntarget = hooks:tick()\ninterval = 60\n",
    );
    assert_eq!(handler_sections(&ini), vec!["sensors/+/temp"]);
}

#[test]
fn handler_sections_keep_file_order() {
    let ini = ini("[b/topic]\ntargets = log\n\n[a/topic]\ntargets = log\n");
    assert_eq!(handler_sections(&ini), vec!["b/topic", "a/topic"]);
}

// =============================================================================
// handler definitions
// =============================================================================

#[test]
fn section_name_is_default_filter() {
    let ini = ini("[sensors/+/temp]\ntargets = log:info\n");
    let def = handler_def(&ini, "sensors/+/temp").unwrap();
    assert_eq!(def.topic, "sensors/+/temp");
    assert_eq!(def.qos, 0);
}

#[test]
fn topic_option_overrides_section_name() {
    let ini = ini("[temperature]\ntopic = sensors/+/temp\nqos = 2\ntargets = log:info\n");
    let def = handler_def(&ini, "temperature").unwrap();
    assert_eq!(def.topic, "sensors/+/temp");
    assert_eq!(def.qos, 2);
}

#[test]
fn static_targets_from_comma_list() {
    let ini = ini("[h]\ntargets = log:info, log:warn\n");
    let def = handler_def(&ini, "h").unwrap();
    match def.targets {
        TargetsSpec::Static(addrs) => {
            assert_eq!(addrs.len(), 2);
            assert_eq!(addrs[0].to_string(), "log:info");
            assert_eq!(addrs[1].to_string(), "log:warn");
        }
        other => panic!("expected static targets, got {other:?}"),
    }
}

#[test]
fn bare_service_means_fan_out() {
    let ini = ini("[h]\ntargets = log\n");
    let def = handler_def(&ini, "h").unwrap();
    match def.targets {
        TargetsSpec::Static(addrs) => assert_eq!(addrs[0].target, None),
        other => panic!("expected static targets, got {other:?}"),
    }
}

#[test]
fn mapping_targets() {
    let ini = ini("[h]\ntargets = {'a/b/c': 'log:info', 'a/#': ['log:warn', 'log:info']}\n");
    let def = handler_def(&ini, "h").unwrap();
    match def.targets {
        TargetsSpec::Mapping(map) => {
            assert_eq!(map.get("a/b/c").unwrap().len(), 1);
            assert_eq!(map.get("a/#").unwrap().len(), 2);
        }
        other => panic!("expected mapping targets, got {other:?}"),
    }
}

#[test]
fn dynamic_targets_from_funcspec() {
    let ini = ini("[h]\ntargets = hooks:choose_targets()\n");
    let def = handler_def(&ini, "h").unwrap();
    match def.targets {
        TargetsSpec::Dynamic(spec) => assert_eq!(spec.key(), "hooks:choose_targets"),
        other => panic!("expected dynamic targets, got {other:?}"),
    }
}

#[test]
fn nested_pair_in_target_list() {
    let ini = ini("[h]\ntargets = [['log', 'info'], 'log:warn']\n");
    let def = handler_def(&ini, "h").unwrap();
    match def.targets {
        TargetsSpec::Static(addrs) => {
            assert_eq!(addrs[0].to_string(), "log:info");
            assert_eq!(addrs[1].to_string(), "log:warn");
        }
        other => panic!("expected static targets, got {other:?}"),
    }
}

#[test]
fn hook_and_xform_options() {
    let ini = ini(
        "[h]\ntargets = log:info\nfilter = hooks:skip_low_battery()\ndatamap = hooks:decorate()\n\
         format = {room}: {value}\npriority = {'alarm': '2'}\ntemplate = alert.j2\nskipretained = true\n",
    );
    let def = handler_def(&ini, "h").unwrap();
    assert_eq!(def.filter.unwrap().key(), "hooks:skip_low_battery");
    assert_eq!(def.datamap.unwrap().key(), "hooks:decorate");
    assert!(matches!(def.format, Some(XformSpec::Text(_))));
    assert!(matches!(def.priority, Some(XformSpec::Map(_))));
    assert_eq!(def.template.as_deref(), Some("alert.j2"));
    assert_eq!(def.skip_retained, Some(true));
}

#[yare::parameterized(
    bad_qos    = { "[h]\nqos = 3\ntargets = log\n" },
    bad_filter = { "[h]\ntargets = log\nfilter = not-a-funcspec\n" },
    int_targets = { "[h]\ntargets = 42\n" },
)]
fn invalid_handler_options(extra: &str) {
    let ini = ini(extra);
    assert!(handler_def(&ini, "h").is_err());
}

// =============================================================================
// service definitions
// =============================================================================

#[test]
fn service_def_reads_targets_module_and_config() {
    let ini = ini(
        "[config:myfile]\nmodule = file\ntargets = {'f1': ['/tmp/f1'], 'f2': ['/tmp/f2']}\nappend_newline = true\n",
    );
    let def = service_def(&ini, "myfile").unwrap();
    assert_eq!(def.module, "file");
    assert_eq!(def.targets.len(), 2);
    assert_eq!(def.config.get("append_newline"), Some(&Value::Bool(true)));
    assert!(!def.config.contains_key("targets"));
}

#[test]
fn service_module_defaults_to_name() {
    let ini = ini("");
    let def = service_def(&ini, "log").unwrap();
    assert_eq!(def.module, "log");
}

#[test]
fn scalar_address_becomes_single_element_list() {
    let ini = ini("[config:one]\ntargets = {'t': '/tmp/x'}\n");
    let def = service_def(&ini, "one").unwrap();
    assert_eq!(def.targets.get("t").unwrap().len(), 1);
}

#[test]
fn missing_service_section_is_error() {
    let ini = ini("");
    assert!(matches!(service_def(&ini, "ghost"), Err(ConfigError::MissingSection(_))));
}

#[test]
fn non_mapping_service_targets_is_error() {
    let ini = ini("[config:bad]\ntargets = log:info\n");
    assert!(service_def(&ini, "bad").is_err());
}

// =============================================================================
// cron definitions
// =============================================================================

#[test]
fn cron_defs_parse() {
    let ini = ini("[cron:ping]\ntarget = hooks:publish_ip()\ninterval = 60.5\nnow = true\n");
    let defs = cron_defs(&ini).unwrap();
    assert_eq!(defs.len(), 1);
    assert_eq!(defs[0].name, "ping");
    assert_eq!(defs[0].target.key(), "hooks:publish_ip");
    assert_eq!(defs[0].interval_secs, 60.5);
    assert!(defs[0].now);
}

#[test]
fn cron_now_defaults_false() {
    let ini = ini("[cron:tick]\ntarget = hooks:tick()\ninterval = 10\n");
    assert!(!cron_defs(&ini).unwrap()[0].now);
}

#[yare::parameterized(
    missing_target   = { "[cron:x]\ninterval = 5\n" },
    missing_interval = { "[cron:x]\ntarget = hooks:f()\n" },
    zero_interval    = { "[cron:x]\ntarget = hooks:f()\ninterval = 0\n" },
    bad_target       = { "[cron:x]\ntarget = nope\ninterval = 5\n" },
)]
fn invalid_cron_sections(extra: &str) {
    let ini = ini(extra);
    assert!(cron_defs(&ini).is_err());
}

// =============================================================================
// failover
// =============================================================================

#[test]
fn failover_def_present_when_configured() {
    let ini = ini("[failover]\ntargets = log:warn\n");
    let def = failover_def(&ini).unwrap().unwrap();
    assert_eq!(def.section, "failover");
}

#[test]
fn failover_def_absent_by_default() {
    let ini = ini("");
    assert!(failover_def(&ini).is_none());
}
