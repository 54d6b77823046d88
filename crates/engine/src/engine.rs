// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The engine aggregate and lifecycle controller.
//!
//! Bootstrap wires everything in dependency order: service registry,
//! handler table, job queue, workers, broker client, scheduler. `run`
//! drives the broker receive loop until the shutdown token fires (or a
//! fatal error), then tears down in the documented order: cancel
//! periodic tasks, publish the LWT-dead value, stop the receive loop
//! and disconnect, drain the queue under a deadline, join the workers,
//! and close every service.

use crate::broker::Broker;
use crate::error::EngineError;
use crate::handlers::HandlerTable;
use crate::hooks::HookRegistry;
use crate::pipeline::Pipeline;
use crate::queue::JobQueue;
use crate::registry::{ServiceRegistry, SinkFactories};
use crate::scheduler::Scheduler;
use crate::template::Templates;
use crate::worker::{WorkerContext, WorkerPool};
use crate::SCRIPT_NAME;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use warble_config::{cron_defs, Ini, Settings};
use warble_core::Value;
use warble_sinks::{Item, Publisher};

/// How long shutdown waits for the queue to drain before logging and
/// dropping the remaining jobs.
const DRAIN_DEADLINE: Duration = Duration::from_secs(10);

pub struct Engine {
    registry: Arc<ServiceRegistry>,
    table: Arc<HandlerTable>,
    pipeline: Arc<Pipeline>,
    queue: JobQueue,
    workers: WorkerPool,
    scheduler: Scheduler,
    broker: Broker,
    shutdown: CancellationToken,
}

impl Engine {
    /// Wire the whole engine from a parsed configuration. Hooks and
    /// custom sink factories must be registered before this point;
    /// everything is resolved here, once.
    pub fn bootstrap(
        ini: &Ini,
        settings: &Settings,
        hooks: HookRegistry,
        factories: SinkFactories,
    ) -> Result<Engine, EngineError> {
        if let Some(path) = &settings.functions {
            tracing::warn!(
                path = path.as_str(),
                "the 'functions' option is not supported; register hooks with the registry instead"
            );
        }

        let broker = Broker::new(settings)?;
        let publisher = broker.publisher();

        let registry = Arc::new(ServiceRegistry::build(
            ini,
            &settings.launch,
            &factories,
            &publisher,
        )?);
        tracing::info!(services = registry.len(), "service registry ready");

        let table = Arc::new(HandlerTable::build(ini, &registry, &hooks)?);
        tracing::info!(handlers = table.handlers().len(), "handler table compiled");

        let queue = JobQueue::new(settings.queue_size);

        tracing::info!(workers = settings.num_workers, "starting workers");
        let workers = WorkerPool::spawn(
            settings.num_workers,
            queue.receiver(),
            WorkerContext {
                registry: registry.clone(),
                table: table.clone(),
                templates: Arc::new(Templates::load(Path::new("templates"))),
                deadline: Duration::from_secs_f64(settings.job_timeout_secs),
            },
        );

        let pipeline = Arc::new(Pipeline::new(
            registry.clone(),
            table.clone(),
            queue.clone(),
            settings.skip_retained,
        ));

        let crons = cron_defs(ini)?;
        let scheduler = Scheduler::start(&crons, &hooks, publisher);
        if scheduler.task_count() > 0 {
            tracing::info!(tasks = scheduler.task_count(), "periodic scheduler running");
        }

        Ok(Engine {
            registry,
            table,
            pipeline,
            queue,
            workers,
            scheduler,
            broker,
            shutdown: CancellationToken::new(),
        })
    }

    /// Token that stops the engine when cancelled; hand this to the
    /// signal handler.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Run until shutdown, then drain and tear down.
    pub async fn run(mut self) -> Result<(), EngineError> {
        let result = self
            .broker
            .receive_loop(&self.pipeline, &self.table, &self.shutdown)
            .await;

        // 1. Periodic tasks stop first so nothing new is published
        self.scheduler.cancel().await;

        // 2 + 3. Announce death, stop the receive loop, disconnect
        self.broker.finalize().await;

        // 4 + 5. Drain the queue, then join the workers
        self.queue.close();
        let pending = self.queue.len();
        if pending > 0 {
            tracing::info!(pending, "waiting for job queue to drain");
        }
        match tokio::time::timeout(DRAIN_DEADLINE, self.workers.join()).await {
            Ok(()) => tracing::debug!("workers joined"),
            Err(_) => {
                tracing::warn!(
                    dropped = self.queue.len(),
                    "drain deadline elapsed, dropping remaining jobs"
                );
            }
        }

        // 6. Let services release long-lived state
        self.registry.close_all().await;

        tracing::info!("engine stopped");
        result
    }
}

/// Run one sink directly, bypassing broker and dispatch: build an item
/// from the given JSON object and deliver it. The configuration still
/// provides the service's section.
pub async fn run_plugin(
    ini: &Ini,
    name: &str,
    factories: &SinkFactories,
    data: &serde_json::Value,
) -> Result<(), EngineError> {
    let publisher = Publisher::disconnected();
    let service = crate::registry::load_service(ini, name, factories, &publisher)
        .map_err(|error| EngineError::Plugin(error.to_string()))?;

    let field = |key: &str| -> String {
        data.get(key).map(|v| Value::from_json(v).render()).unwrap_or_default()
    };

    let target = {
        let requested = field("target");
        if requested.is_empty() {
            service.target_keys().next().unwrap_or_default().to_string()
        } else {
            requested
        }
    };
    let addrs = service.addrs(&target).cloned().unwrap_or_default();

    let payload = field("payload");
    let message = {
        let message = field("message");
        if message.is_empty() {
            payload.clone()
        } else {
            message
        }
    };

    let data_map = match data {
        serde_json::Value::Object(object) => {
            object.iter().map(|(k, v)| (k.clone(), Value::from_json(v))).collect()
        }
        _ => Default::default(),
    };

    let item = Item {
        service: name.to_string(),
        section: name.to_string(),
        target,
        config: service.config.clone(),
        addrs,
        topic: field("topic"),
        payload: payload.clone(),
        raw_payload: payload.into_bytes(),
        data: data_map,
        title: {
            let title = field("title");
            if title.is_empty() {
                SCRIPT_NAME.to_string()
            } else {
                title
            }
        },
        image: field("image"),
        message,
        priority: data.get("priority").and_then(serde_json::Value::as_i64).unwrap_or(0),
    };

    let sink = service.sink();
    match sink.deliver(&item).await {
        Ok(()) => {
            tracing::info!(service = name, "plugin delivered successfully");
            Ok(())
        }
        Err(error) => {
            tracing::error!(service = name, %error, "plugin delivery failed");
            Err(EngineError::Plugin(error.to_string()))
        }
    }
}
