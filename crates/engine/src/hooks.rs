// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The hook registry.
//!
//! Hooks are plain Rust callables registered under dotted names at
//! startup. Configuration references them as `mod.path:name()`; the
//! engine resolves every reference once while compiling the handler
//! table and stores the typed callable on the handler, so nothing is
//! looked up per message. Resolution tries the reference verbatim and
//! then each entry of an optional namespace search list.

use crate::error::LoadError;
use crate::scheduler::CronContext;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use warble_core::{DataMap, FuncSpec, TargetAddr, Value};

/// Error raised by a user hook. Hook failures never abort the pipeline;
/// they degrade the current handler evaluation and are logged.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct HookError(String);

impl HookError {
    pub fn failed(message: impl Into<String>) -> Self {
        HookError(message.into())
    }
}

/// `filter(topic, payload) -> bool`; true suppresses the message.
pub type FilterFn = dyn Fn(&str, &str) -> Result<bool, HookError> + Send + Sync;
/// `datamap(topic, data)`; mutates the data map in place.
pub type DataMapFn = dyn Fn(&str, &mut DataMap) -> Result<(), HookError> + Send + Sync;
/// `alldata(topic, data) -> mapping?`; the result is merged into data.
pub type AllDataFn = dyn Fn(&str, &DataMap) -> Result<Option<DataMap>, HookError> + Send + Sync;
/// `targets(section, topic, data) -> [(service, target?)]`.
pub type TargetsFn =
    dyn Fn(&str, &str, &DataMap) -> Result<Vec<TargetAddr>, HookError> + Send + Sync;
/// `f(value, data) -> value` for format/title/image/priority options.
pub type XformFn = dyn Fn(&Value, &DataMap) -> Result<Value, HookError> + Send + Sync;

type CronFuture = Pin<Box<dyn Future<Output = Result<(), HookError>> + Send>>;
/// Periodic task body, invoked with a context granting broker access.
pub type CronFn = dyn Fn(CronContext) -> CronFuture + Send + Sync;

/// All hooks available to the configuration, keyed by dotted name.
#[derive(Default)]
pub struct HookRegistry {
    search_path: Vec<String>,
    filters: HashMap<String, Arc<FilterFn>>,
    datamaps: HashMap<String, Arc<DataMapFn>>,
    alldatas: HashMap<String, Arc<AllDataFn>>,
    targets: HashMap<String, Arc<TargetsFn>>,
    xforms: HashMap<String, Arc<XformFn>>,
    crons: HashMap<String, Arc<CronFn>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a namespace tried (in order) when a reference does not
    /// resolve verbatim: `ns` + `.` + reference.
    pub fn add_search_namespace(&mut self, namespace: impl Into<String>) {
        self.search_path.push(namespace.into());
    }

    pub fn register_filter<F>(&mut self, key: &str, hook: F)
    where
        F: Fn(&str, &str) -> Result<bool, HookError> + Send + Sync + 'static,
    {
        self.filters.insert(key.to_string(), Arc::new(hook));
    }

    pub fn register_datamap<F>(&mut self, key: &str, hook: F)
    where
        F: Fn(&str, &mut DataMap) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.datamaps.insert(key.to_string(), Arc::new(hook));
    }

    pub fn register_alldata<F>(&mut self, key: &str, hook: F)
    where
        F: Fn(&str, &DataMap) -> Result<Option<DataMap>, HookError> + Send + Sync + 'static,
    {
        self.alldatas.insert(key.to_string(), Arc::new(hook));
    }

    pub fn register_targets<F>(&mut self, key: &str, hook: F)
    where
        F: Fn(&str, &str, &DataMap) -> Result<Vec<TargetAddr>, HookError> + Send + Sync + 'static,
    {
        self.targets.insert(key.to_string(), Arc::new(hook));
    }

    pub fn register_xform<F>(&mut self, key: &str, hook: F)
    where
        F: Fn(&Value, &DataMap) -> Result<Value, HookError> + Send + Sync + 'static,
    {
        self.xforms.insert(key.to_string(), Arc::new(hook));
    }

    pub fn register_cron<F, Fut>(&mut self, key: &str, hook: F)
    where
        F: Fn(CronContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        self.crons.insert(key.to_string(), Arc::new(move |ctx| Box::pin(hook(ctx))));
    }

    pub fn resolve_filter(&self, spec: &FuncSpec) -> Result<Arc<FilterFn>, LoadError> {
        self.resolve(&self.filters, spec)
    }

    pub fn resolve_datamap(&self, spec: &FuncSpec) -> Result<Arc<DataMapFn>, LoadError> {
        self.resolve(&self.datamaps, spec)
    }

    pub fn resolve_alldata(&self, spec: &FuncSpec) -> Result<Arc<AllDataFn>, LoadError> {
        self.resolve(&self.alldatas, spec)
    }

    pub fn resolve_targets(&self, spec: &FuncSpec) -> Result<Arc<TargetsFn>, LoadError> {
        self.resolve(&self.targets, spec)
    }

    pub fn resolve_xform(&self, spec: &FuncSpec) -> Result<Arc<XformFn>, LoadError> {
        self.resolve(&self.xforms, spec)
    }

    pub fn resolve_cron(&self, spec: &FuncSpec) -> Result<Arc<CronFn>, LoadError> {
        self.resolve(&self.crons, spec)
    }

    fn resolve<T: ?Sized>(
        &self,
        map: &HashMap<String, Arc<T>>,
        spec: &FuncSpec,
    ) -> Result<Arc<T>, LoadError> {
        if let Some(hook) = map.get(&spec.key()) {
            return Ok(hook.clone());
        }
        for namespace in &self.search_path {
            if let Some(hook) = map.get(&format!("{namespace}.{}", spec.key())) {
                return Ok(hook.clone());
            }
        }
        Err(LoadError::HookNotFound(spec.to_string()))
    }
}

#[cfg(test)]
#[path = "hooks_tests.rs"]
mod tests;
