// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handler, service, and cron section definitions.
//!
//! A handler is any section that is not reserved and declares a
//! `targets` option; its subscription filter defaults to the section
//! name. `config:<name>` sections describe services; `cron:<name>`
//! sections describe periodic tasks; `failover` is dispatched on
//! unclean broker disconnects.

use crate::error::ConfigError;
use crate::ini::Ini;
use indexmap::IndexMap;
use warble_core::{FuncSpec, TargetAddr, TargetsSpec, Value, XformSpec};

/// A handler section, still carrying unresolved hook references. The
/// engine resolves hooks against its registry when compiling the
/// handler table.
#[derive(Debug, Clone)]
pub struct HandlerDef {
    pub section: String,
    /// Subscription filter: explicit `topic` option or the section name.
    pub topic: String,
    pub qos: u8,
    pub skip_retained: Option<bool>,
    pub filter: Option<FuncSpec>,
    pub datamap: Option<FuncSpec>,
    pub alldata: Option<FuncSpec>,
    pub targets: TargetsSpec,
    pub format: Option<XformSpec>,
    pub title: Option<XformSpec>,
    pub image: Option<XformSpec>,
    pub priority: Option<XformSpec>,
    pub template: Option<String>,
}

/// A `config:<name>` service section.
#[derive(Debug, Clone)]
pub struct ServiceDef {
    pub name: String,
    /// Sink module: explicit `module` option or the service name.
    pub module: String,
    /// Valid target keys with their address lists.
    pub targets: IndexMap<String, Vec<Value>>,
    /// Remaining sink-specific options.
    pub config: IndexMap<String, Value>,
}

/// A `cron:<name>` periodic task section.
#[derive(Debug, Clone)]
pub struct CronDef {
    pub name: String,
    pub target: FuncSpec,
    pub interval_secs: f64,
    pub now: bool,
}

/// Reserved section names never become handlers.
pub fn is_reserved_section(name: &str) -> bool {
    name == "defaults"
        || name == "failover"
        || name.starts_with("cron:")
        || name.starts_with("config:")
}

/// All non-reserved sections that declare `targets`, in file order.
/// Sections without `targets` are skipped with a warning (non-fatal).
pub fn handler_sections(ini: &Ini) -> Vec<String> {
    let mut sections = Vec::new();
    for name in ini.sections() {
        if is_reserved_section(name) {
            continue;
        }
        if ini.has_option(name, "targets") {
            sections.push(name.to_string());
        } else {
            tracing::warn!(section = name, "section has no targets defined, skipping");
        }
    }
    sections
}

/// Build the handler definition for one section.
pub fn handler_def(ini: &Ini, section: &str) -> Result<HandlerDef, ConfigError> {
    let topic = ini
        .value(section, "topic")
        .map(|v| v.render())
        .unwrap_or_else(|| section.to_string());

    let qos = match ini.value(section, "qos") {
        None => 0,
        Some(v) => match v.as_i64() {
            Some(q @ 0..=2) => q as u8,
            _ => {
                return Err(ConfigError::Invalid {
                    section: section.into(),
                    option: "qos".into(),
                    message: format!("qos must be 0, 1 or 2, got '{v}'"),
                })
            }
        },
    };

    let skip_retained = match ini.value(section, "skipretained") {
        None => None,
        Some(v) => Some(v.as_bool().ok_or_else(|| ConfigError::Invalid {
            section: section.into(),
            option: "skipretained".into(),
            message: format!("expected a boolean, got '{v}'"),
        })?),
    };

    let targets_value = ini.value(section, "targets").ok_or_else(|| {
        ConfigError::MissingOption { section: section.into(), option: "targets".into() }
    })?;
    let targets = parse_targets(section, &targets_value)?;

    Ok(HandlerDef {
        section: section.to_string(),
        topic,
        qos,
        skip_retained,
        filter: hook_option(ini, section, "filter")?,
        datamap: hook_option(ini, section, "datamap")?,
        alldata: hook_option(ini, section, "alldata")?,
        targets,
        format: ini.value(section, "format").map(|v| XformSpec::from_value(&v)),
        title: ini.value(section, "title").map(|v| XformSpec::from_value(&v)),
        image: ini.value(section, "image").map(|v| XformSpec::from_value(&v)),
        priority: ini.value(section, "priority").map(|v| XformSpec::from_value(&v)),
        template: ini.value(section, "template").map(|v| v.render()),
    })
}

/// The optional `failover` pseudo-section as a handler definition.
pub fn failover_def(ini: &Ini) -> Option<Result<HandlerDef, ConfigError>> {
    if ini.has_section("failover") && ini.has_option("failover", "targets") {
        Some(handler_def(ini, "failover"))
    } else {
        None
    }
}

/// Build the service definition for `config:<name>`.
pub fn service_def(ini: &Ini, name: &str) -> Result<ServiceDef, ConfigError> {
    let section = format!("config:{name}");
    if !ini.has_section(&section) {
        return Err(ConfigError::MissingSection(section));
    }

    let targets_value = ini.value(&section, "targets").ok_or_else(|| {
        ConfigError::MissingOption { section: section.clone(), option: "targets".into() }
    })?;
    let Some(target_map) = targets_value.as_map() else {
        return Err(ConfigError::Invalid {
            section: section.clone(),
            option: "targets".into(),
            message: "service targets must be a mapping of target key to address list".into(),
        });
    };

    let mut targets = IndexMap::new();
    for (key, addrs) in target_map {
        let list = match addrs {
            Value::List(items) => items.clone(),
            single => vec![single.clone()],
        };
        targets.insert(key.clone(), list);
    }

    let module = ini
        .value(&section, "module")
        .map(|v| v.render())
        .unwrap_or_else(|| name.to_string());

    Ok(ServiceDef {
        name: name.to_string(),
        module,
        targets,
        config: ini.section_values(&section, &["targets", "module"]),
    })
}

/// All `cron:<name>` sections, in file order.
pub fn cron_defs(ini: &Ini) -> Result<Vec<CronDef>, ConfigError> {
    let mut defs = Vec::new();
    for section in ini.sections() {
        let Some(name) = section.strip_prefix("cron:") else {
            continue;
        };

        let target_text = ini.raw(section, "target").ok_or_else(|| {
            ConfigError::MissingOption { section: section.into(), option: "target".into() }
        })?;
        let target = FuncSpec::parse(target_text).ok_or_else(|| ConfigError::Invalid {
            section: section.into(),
            option: "target".into(),
            message: format!("expected a function reference like mod:name(), got '{target_text}'"),
        })?;

        let interval = ini.value(section, "interval").ok_or_else(|| {
            ConfigError::MissingOption { section: section.into(), option: "interval".into() }
        })?;
        let interval_secs = match interval.as_f64() {
            Some(secs) if secs > 0.0 => secs,
            _ => {
                return Err(ConfigError::Invalid {
                    section: section.into(),
                    option: "interval".into(),
                    message: format!("interval must be a positive number of seconds, got '{interval}'"),
                })
            }
        };

        let now = match ini.value(section, "now") {
            None => false,
            Some(v) => v.as_bool().ok_or_else(|| ConfigError::Invalid {
                section: section.into(),
                option: "now".into(),
                message: format!("expected a boolean, got '{v}'"),
            })?,
        };

        defs.push(CronDef { name: name.to_string(), target, interval_secs, now });
    }
    Ok(defs)
}

fn hook_option(ini: &Ini, section: &str, option: &str) -> Result<Option<FuncSpec>, ConfigError> {
    match ini.raw(section, option) {
        None => Ok(None),
        Some(text) => FuncSpec::parse(text).map(Some).ok_or_else(|| ConfigError::Invalid {
            section: section.into(),
            option: option.into(),
            message: format!("expected a function reference like mod:name(), got '{text}'"),
        }),
    }
}

/// Parse the `targets` option of a handler into one of its three shapes.
fn parse_targets(section: &str, value: &Value) -> Result<TargetsSpec, ConfigError> {
    match value {
        Value::Map(map) => {
            let mut mapping = IndexMap::new();
            for (filter, targets) in map {
                mapping.insert(filter.clone(), parse_addr_list(section, targets)?);
            }
            Ok(TargetsSpec::Mapping(mapping))
        }
        Value::List(_) => Ok(TargetsSpec::Static(parse_addr_list(section, value)?)),
        Value::Str(text) => {
            if let Some(spec) = FuncSpec::parse(text) {
                return Ok(TargetsSpec::Dynamic(spec));
            }
            let addrs = text
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(TargetAddr::parse)
                .collect::<Vec<_>>();
            if addrs.is_empty() {
                return Err(ConfigError::Invalid {
                    section: section.into(),
                    option: "targets".into(),
                    message: "targets is empty".into(),
                });
            }
            Ok(TargetsSpec::Static(addrs))
        }
        other => Err(ConfigError::Invalid {
            section: section.into(),
            option: "targets".into(),
            message: format!("targets must be a list, mapping or function reference, got '{other}'"),
        }),
    }
}

/// A target list value: a single `service:target` string or a list of
/// them (a nested `[service, target]` pair is also accepted).
fn parse_addr_list(section: &str, value: &Value) -> Result<Vec<TargetAddr>, ConfigError> {
    let invalid = |message: String| ConfigError::Invalid {
        section: section.into(),
        option: "targets".into(),
        message,
    };

    match value {
        Value::Str(text) => Ok(vec![TargetAddr::parse(text)]),
        Value::List(items) => {
            let mut addrs = Vec::new();
            for item in items {
                match item {
                    Value::Str(text) => addrs.push(TargetAddr::parse(text)),
                    Value::List(pair) => match pair.as_slice() {
                        [Value::Str(service), Value::Str(target)] => {
                            addrs.push(TargetAddr::new(service.as_str(), Some(target.as_str())));
                        }
                        [Value::Str(service)] => addrs.push(TargetAddr::new(service.as_str(), None)),
                        other => {
                            return Err(invalid(format!(
                                "expected a [service, target] pair, got {other:?}"
                            )))
                        }
                    },
                    other => return Err(invalid(format!("invalid target entry '{other}'"))),
                }
            }
            Ok(addrs)
        }
        other => Err(invalid(format!("invalid target list '{other}'"))),
    }
}

#[cfg(test)]
#[path = "defs_tests.rs"]
mod tests;
