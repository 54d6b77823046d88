// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The compiled handler table.
//!
//! Built once at bootstrap and immutable afterwards: hook references
//! are resolved to callables, topic-keyed target mappings are
//! pre-sorted most-specific-first, and the subscription plan (unique
//! filters with the maximum QoS of the handlers sharing them) is
//! derived from it.

use crate::error::{EngineError, LoadError};
use crate::hooks::{AllDataFn, DataMapFn, FilterFn, HookRegistry, TargetsFn, XformFn};
use crate::registry::ServiceRegistry;
use indexmap::IndexMap;
use std::sync::Arc;
use warble_config::{failover_def, handler_def, handler_sections, HandlerDef, Ini};
use warble_core::{precedence_key, FuncSpec, TargetAddr, TargetsSpec, Value, XformSpec};

/// Compiled `targets` option.
pub enum CompiledTargets {
    Static(Vec<TargetAddr>),
    /// Pre-sorted most-specific-first; the first matching key wins.
    Mapping(Vec<(String, Vec<TargetAddr>)>),
    Dynamic { name: FuncSpec, hook: Arc<TargetsFn> },
}

/// Compiled format/title/image/priority option.
pub enum XformStep {
    Map(IndexMap<String, Value>),
    Func { name: FuncSpec, hook: Arc<XformFn> },
    Text(String),
}

/// One compiled handler rule.
pub struct Handler {
    pub section: String,
    /// Subscription filter this handler listens on.
    pub topic: String,
    pub qos: u8,
    pub skip_retained: Option<bool>,
    pub filter_hook: Option<Arc<FilterFn>>,
    pub datamap_hook: Option<Arc<DataMapFn>>,
    pub alldata_hook: Option<Arc<AllDataFn>>,
    pub targets: CompiledTargets,
    pub format: Option<XformStep>,
    pub title: Option<XformStep>,
    pub image: Option<XformStep>,
    pub priority: Option<XformStep>,
    pub template: Option<String>,
}

/// Immutable snapshot of all handlers, in configuration order.
#[derive(Default)]
pub struct HandlerTable {
    handlers: Vec<Handler>,
    failover: Option<Handler>,
}

impl HandlerTable {
    /// Compile every handler section. Handlers whose hooks cannot be
    /// resolved are skipped with an error; a handler whose declared
    /// services are all missing from the registry is a fatal
    /// configuration error. Bootstrap aborts when sections were
    /// declared but none compiled.
    pub fn build(
        ini: &Ini,
        registry: &ServiceRegistry,
        hooks: &HookRegistry,
    ) -> Result<HandlerTable, EngineError> {
        let sections = handler_sections(ini);
        let declared = sections.len();

        let mut handlers = Vec::new();
        for section in &sections {
            let def = handler_def(ini, section)?;
            validate_targets(&def, registry)?;

            match compile(def, hooks) {
                Ok(handler) => handlers.push(handler),
                Err(error) => {
                    tracing::error!(section = section.as_str(), %error, "cannot compile handler, skipping");
                }
            }
        }

        if declared > 0 && handlers.is_empty() {
            return Err(EngineError::NoHandlers);
        }

        let failover = match failover_def(ini) {
            None => None,
            Some(def) => match compile(def?, hooks) {
                Ok(handler) => Some(handler),
                Err(error) => {
                    tracing::error!(%error, "cannot compile failover handler, skipping");
                    None
                }
            },
        };

        Ok(HandlerTable { handlers, failover })
    }

    pub fn handlers(&self) -> &[Handler] {
        &self.handlers
    }

    pub fn failover(&self) -> Option<&Handler> {
        self.failover.as_ref()
    }

    /// Look a handler up by its section name (workers resolve the
    /// format options of their job's handler this way).
    pub fn by_section(&self, section: &str) -> Option<&Handler> {
        if section == "failover" {
            return self.failover.as_ref();
        }
        self.handlers.iter().find(|h| h.section == section)
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Subscription plan: unique filters in configuration order, each
    /// with the maximum QoS declared among the handlers sharing it.
    pub fn subscriptions(&self) -> Vec<(String, u8)> {
        let mut plan: IndexMap<&str, u8> = IndexMap::new();
        for handler in &self.handlers {
            let qos = plan.entry(handler.topic.as_str()).or_insert(0);
            *qos = (*qos).max(handler.qos);
        }
        plan.into_iter().map(|(filter, qos)| (filter.to_string(), qos)).collect()
    }
}

/// A handler must reference at least one loaded service (dynamic
/// targets are trusted until dispatch).
fn validate_targets(def: &HandlerDef, registry: &ServiceRegistry) -> Result<(), EngineError> {
    let pairs: Vec<&TargetAddr> = match &def.targets {
        TargetsSpec::Dynamic(_) => return Ok(()),
        TargetsSpec::Static(addrs) => addrs.iter().collect(),
        TargetsSpec::Mapping(map) => map.values().flatten().collect(),
    };

    if pairs.iter().any(|addr| registry.contains(&addr.service)) {
        return Ok(());
    }

    Err(EngineError::Config(warble_config::ConfigError::Invalid {
        section: def.section.clone(),
        option: "targets".into(),
        message: "no target pair references a loaded service".into(),
    }))
}

fn compile(def: HandlerDef, hooks: &HookRegistry) -> Result<Handler, LoadError> {
    let targets = match def.targets {
        TargetsSpec::Static(addrs) => CompiledTargets::Static(addrs),
        TargetsSpec::Mapping(map) => {
            let mut entries: Vec<(String, Vec<TargetAddr>)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| precedence_key(b).cmp(&precedence_key(a)));
            CompiledTargets::Mapping(entries)
        }
        TargetsSpec::Dynamic(name) => {
            let hook = hooks.resolve_targets(&name)?;
            CompiledTargets::Dynamic { name, hook }
        }
    };

    Ok(Handler {
        section: def.section,
        topic: def.topic,
        qos: def.qos,
        skip_retained: def.skip_retained,
        filter_hook: def.filter.map(|spec| hooks.resolve_filter(&spec)).transpose()?,
        datamap_hook: def.datamap.map(|spec| hooks.resolve_datamap(&spec)).transpose()?,
        alldata_hook: def.alldata.map(|spec| hooks.resolve_alldata(&spec)).transpose()?,
        targets,
        format: compile_xform(def.format, hooks)?,
        title: compile_xform(def.title, hooks)?,
        image: compile_xform(def.image, hooks)?,
        priority: compile_xform(def.priority, hooks)?,
        template: def.template,
    })
}

fn compile_xform(
    spec: Option<XformSpec>,
    hooks: &HookRegistry,
) -> Result<Option<XformStep>, LoadError> {
    match spec {
        None => Ok(None),
        Some(XformSpec::Map(map)) => Ok(Some(XformStep::Map(map))),
        Some(XformSpec::Text(text)) => Ok(Some(XformStep::Text(text))),
        Some(XformSpec::Func(name)) => {
            let hook = hooks.resolve_xform(&name)?;
            Ok(Some(XformStep::Func { name, hook }))
        }
    }
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;
