// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The service registry.
//!
//! Built once at bootstrap from `defaults.launch`: each service needs a
//! `config:<name>` section with a `targets` mapping, and a sink module
//! resolved from the explicit `module` option or the service name.
//! Custom factories registered by the embedder win over the builtin
//! namespace. The registry is read-only afterwards and shared by all
//! workers.

use crate::error::{EngineError, LoadError};
use crate::SCRIPT_NAME;
use indexmap::IndexMap;
use std::sync::Arc;
use warble_config::{service_def, Ini};
use warble_core::Value;
use warble_sinks::{builtin, Publisher, ServiceConfig, Sink, SinkContext, SinkError};

/// One loaded service: its sink instance, configuration, and valid
/// target keys.
pub struct Service {
    pub name: String,
    pub config: ServiceConfig,
    targets: IndexMap<String, Vec<Value>>,
    sink: Arc<dyn Sink>,
}

impl Service {
    pub fn sink(&self) -> Arc<dyn Sink> {
        self.sink.clone()
    }

    pub fn has_target(&self, key: &str) -> bool {
        self.targets.contains_key(key)
    }

    pub fn target_keys(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(String::as_str)
    }

    /// Address list of one target key.
    pub fn addrs(&self, key: &str) -> Option<&Vec<Value>> {
        self.targets.get(key)
    }
}

type BoxedFactory =
    Box<dyn Fn(SinkContext, &ServiceConfig) -> Result<Box<dyn Sink>, SinkError> + Send + Sync>;

/// Embedder-registered sink constructors, tried before the builtin
/// namespace when resolving a service's `module`.
#[derive(Default)]
pub struct SinkFactories {
    custom: IndexMap<String, BoxedFactory>,
}

impl SinkFactories {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, module: &str, factory: F)
    where
        F: Fn(SinkContext, &ServiceConfig) -> Result<Box<dyn Sink>, SinkError>
            + Send
            + Sync
            + 'static,
    {
        self.custom.insert(module.to_string(), Box::new(factory));
    }

    fn build(
        &self,
        module: &str,
        ctx: SinkContext,
        config: &ServiceConfig,
    ) -> Option<Result<Box<dyn Sink>, SinkError>> {
        if let Some(factory) = self.custom.get(module) {
            return Some(factory(ctx, config));
        }
        builtin(module).map(|factory| factory(ctx, config))
    }
}

/// All loaded services, keyed by name. Immutable after bootstrap.
#[derive(Default)]
pub struct ServiceRegistry {
    services: IndexMap<String, Service>,
}

impl ServiceRegistry {
    /// Load every service in `launch`. A service that fails to load is
    /// skipped with an error; bootstrap aborts only when none loaded.
    pub fn build(
        ini: &Ini,
        launch: &[String],
        factories: &SinkFactories,
        publisher: &Publisher,
    ) -> Result<ServiceRegistry, EngineError> {
        if launch.is_empty() {
            return Err(EngineError::NoServices);
        }

        let mut services = IndexMap::new();
        for name in launch {
            match load_service(ini, name, factories, publisher) {
                Ok(service) => {
                    tracing::info!(service = name.as_str(), "loaded service");
                    services.insert(name.clone(), service);
                }
                Err(error) => {
                    tracing::error!(service = name.as_str(), %error, "cannot load service");
                }
            }
        }

        if services.is_empty() {
            return Err(EngineError::NoServices);
        }
        Ok(ServiceRegistry { services })
    }

    pub fn get(&self, name: &str) -> Option<&Service> {
        self.services.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Call each service's `close` at shutdown.
    pub async fn close_all(&self) {
        for (name, service) in &self.services {
            tracing::debug!(service = name.as_str(), "closing service");
            service.sink.close().await;
        }
    }
}

/// Build one service from its definition and sink factory.
pub(crate) fn load_service(
    ini: &Ini,
    name: &str,
    factories: &SinkFactories,
    publisher: &Publisher,
) -> Result<Service, LoadError> {
    let def = service_def(ini, name)?;
    let ctx = SinkContext::new(name, SCRIPT_NAME, publisher.clone());

    let sink = factories
        .build(&def.module, ctx, &def.config)
        .ok_or_else(|| LoadError::ModuleNotFound {
            service: name.to_string(),
            module: def.module.clone(),
        })?
        .map_err(|source| LoadError::Sink { service: name.to_string(), source })?;

    Ok(Service {
        name: name.to_string(),
        config: def.config,
        targets: def.targets,
        sink: Arc::from(sink),
    })
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
