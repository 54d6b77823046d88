// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The worker pool.
//!
//! Workers drain the job queue in FIFO order. For each job the worker
//! builds the sink item (title, image, format or template, priority, in
//! that order), suppresses empty messages, and invokes the sink inside
//! a per-job deadline. The sink call runs as its own task: on deadline
//! the worker abandons it and moves on. The call is never killed and
//! may finish in the background, so a chronically slow sink can
//! accumulate stray tasks. Exactly one outcome (success, failure, or
//! timeout) is recorded per job.

use crate::handlers::HandlerTable;
use crate::registry::ServiceRegistry;
use crate::template::Templates;
use crate::{xform, SCRIPT_NAME};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use warble_core::{Job, Value};
use warble_sinks::Item;

/// Everything a worker borrows, read-only.
#[derive(Clone)]
pub struct WorkerContext {
    pub registry: Arc<ServiceRegistry>,
    pub table: Arc<HandlerTable>,
    pub templates: Arc<Templates>,
    pub deadline: Duration,
}

pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn spawn(
        count: usize,
        rx: async_channel::Receiver<Job>,
        ctx: WorkerContext,
    ) -> WorkerPool {
        let handles = (0..count)
            .map(|worker_id| {
                let rx = rx.clone();
                let ctx = ctx.clone();
                tokio::spawn(worker_loop(worker_id, rx, ctx))
            })
            .collect();
        WorkerPool { handles }
    }

    /// Wait for all workers to exit (the queue must be closed first).
    /// Dropping the returned future abandons the workers.
    pub async fn join(self) {
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}

async fn worker_loop(worker_id: usize, rx: async_channel::Receiver<Job>, ctx: WorkerContext) {
    while let Ok(job) = rx.recv().await {
        handle_job(worker_id, job, &ctx).await;
    }
    tracing::debug!(worker_id, "worker exiting");
}

async fn handle_job(worker_id: usize, job: Job, ctx: &WorkerContext) {
    let topic = job.envelope.topic.as_str();
    tracing::debug!(
        worker_id,
        service = job.service.as_str(),
        target = job.target.as_str(),
        section = job.section.as_str(),
        topic,
        "handling job"
    );

    // Sanity checks: the dispatcher validated these, but the registry is
    // the source of truth at delivery time
    let Some(service) = ctx.registry.get(&job.service) else {
        tracing::error!(
            service = job.service.as_str(),
            section = job.section.as_str(),
            topic,
            "cannot handle job: unknown service"
        );
        return;
    };
    let Some(addrs) = service.addrs(&job.target) else {
        tracing::error!(
            service = job.service.as_str(),
            target = job.target.as_str(),
            section = job.section.as_str(),
            topic,
            "invalid configuration: topic points to non-existing target"
        );
        return;
    };
    let Some(handler) = ctx.table.by_section(&job.section) else {
        tracing::error!(
            section = job.section.as_str(),
            topic,
            "cannot handle job: unknown handler section"
        );
        return;
    };

    let data = job.data;
    let section = job.section.as_str();

    // Fixed evaluation order: title, image, format (or template), priority
    let title =
        xform::apply(handler.title.as_ref(), Value::Str(SCRIPT_NAME.into()), &data, section)
            .render();
    let image =
        xform::apply(handler.image.as_ref(), Value::Str(String::new()), &data, section).render();

    let payload_text = job.envelope.payload_text();
    let mut message =
        xform::apply(handler.format.as_ref(), Value::Str(payload_text.clone()), &data, section)
            .render();
    if let Some(template) = &handler.template {
        match ctx.templates.render(template, &data) {
            Ok(text) => message = text,
            Err(error) => {
                tracing::warn!(section, %error, "cannot render template, keeping format output");
            }
        }
    }

    let priority = xform::priority(handler.priority.as_ref(), &data, section);

    // A rendered "0" is one character, so numeric zero is never
    // mistaken for an empty message
    if message.is_empty() {
        tracing::warn!(
            service = job.service.as_str(),
            target = job.target.as_str(),
            section,
            topic,
            "notification suppressed: text is empty"
        );
        return;
    }

    let item = Item {
        service: job.service.clone(),
        section: job.section.clone(),
        target: job.target.clone(),
        config: service.config.clone(),
        addrs: addrs.clone(),
        topic: job.envelope.topic.clone(),
        payload: payload_text,
        raw_payload: job.envelope.payload.clone(),
        data,
        title,
        image,
        message,
        priority,
    };

    let sink = service.sink();
    let call = tokio::spawn(async move {
        let result = sink.deliver(&item).await;
        tracing::trace!(
            service = item.service.as_str(),
            target = item.target.as_str(),
            ok = result.is_ok(),
            "sink call finished"
        );
        result
    });

    match tokio::time::timeout(ctx.deadline, call).await {
        Ok(Ok(Ok(()))) => {
            tracing::debug!(
                service = job.service.as_str(),
                target = job.target.as_str(),
                topic,
                "notified"
            );
        }
        Ok(Ok(Err(error))) => {
            tracing::warn!(
                service = job.service.as_str(),
                target = job.target.as_str(),
                section,
                topic,
                %error,
                "notification failed"
            );
        }
        Ok(Err(join_error)) => {
            tracing::error!(
                service = job.service.as_str(),
                target = job.target.as_str(),
                section,
                topic,
                %join_error,
                "sink call aborted abnormally"
            );
        }
        Err(_elapsed) => {
            // Dropping the join handle abandons the call without
            // killing it; it may still complete in the background
            tracing::warn!(
                service = job.service.as_str(),
                target = job.target.as_str(),
                section,
                topic,
                deadline_secs = ctx.deadline.as_secs_f64(),
                "notification timed out, abandoning sink call"
            );
        }
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
