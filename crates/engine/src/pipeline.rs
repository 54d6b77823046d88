// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-message transformation pipeline.
//!
//! For each incoming message: find the handlers whose subscription
//! filter matches the topic (memoized per topic), then for each handler
//! in configuration order apply retained policy, the filter hook, build
//! the data map (builtins, JSON top-level keys, datamap/alldata hooks),
//! resolve targets, and enqueue one job per resolved target key.
//! Errors inside the pipeline never abort the process; they degrade the
//! current handler evaluation and are logged.

use crate::dispatch;
use crate::handlers::{Handler, HandlerTable};
use crate::queue::JobQueue;
use crate::registry::ServiceRegistry;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use warble_core::{
    builtin_data, interpolate, merge_json_payload, Clock, Envelope, Job, SystemClock,
};

pub struct Pipeline {
    registry: Arc<ServiceRegistry>,
    table: Arc<HandlerTable>,
    queue: JobQueue,
    skip_retained: bool,
    clock: SystemClock,
    // Topic cardinality is bounded by the subscriptions, so the memo
    // cache needs no eviction; handlers never change after bootstrap
    match_cache: Mutex<HashMap<String, Arc<Vec<usize>>>>,
}

impl Pipeline {
    pub fn new(
        registry: Arc<ServiceRegistry>,
        table: Arc<HandlerTable>,
        queue: JobQueue,
        skip_retained: bool,
    ) -> Pipeline {
        Pipeline {
            registry,
            table,
            queue,
            skip_retained,
            clock: SystemClock,
            match_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Process one message from the broker.
    pub async fn on_message(&self, envelope: Envelope) {
        let topic = envelope.topic.clone();
        tracing::debug!(topic = topic.as_str(), retained = envelope.retained, "message received");

        for index in self.matched_handlers(&topic).iter() {
            let handler = &self.table.handlers()[*index];
            tracing::debug!(
                section = handler.section.as_str(),
                topic = topic.as_str(),
                "section matches message, processing"
            );
            self.run_handler(handler, &envelope).await;
        }
    }

    /// Dispatch a synthesized envelope through the `failover` handler,
    /// if one is configured. Invoked on unclean broker disconnects with
    /// the machine-readable reason as the topic.
    pub async fn dispatch_failover(&self, reason: &str, message: &str) {
        tracing::warn!(reason, "{}", message);
        if let Some(handler) = self.table.failover() {
            self.run_handler(handler, &Envelope::new(reason, message, false)).await;
        }
    }

    fn matched_handlers(&self, topic: &str) -> Arc<Vec<usize>> {
        if let Some(cached) = self.match_cache.lock().get(topic) {
            return cached.clone();
        }

        let matched: Arc<Vec<usize>> = Arc::new(
            self.table
                .handlers()
                .iter()
                .enumerate()
                .filter(|(_, handler)| warble_core::matches(&handler.topic, topic))
                .map(|(index, _)| index)
                .collect(),
        );
        self.match_cache.lock().insert(topic.to_string(), matched.clone());
        matched
    }

    async fn run_handler(&self, handler: &Handler, envelope: &Envelope) {
        let topic = envelope.topic.as_str();
        let section = handler.section.as_str();

        if envelope.retained && handler.skip_retained.unwrap_or(self.skip_retained) {
            tracing::debug!(section, topic, "skipping retained message");
            return;
        }

        let payload = envelope.payload_text();

        if let Some(filter) = &handler.filter_hook {
            match filter.as_ref()(topic, &payload) {
                Ok(true) => {
                    tracing::debug!(section, topic, "filter has skipped message");
                    return;
                }
                Ok(false) => {}
                Err(error) => {
                    // Filter errors are never grounds for losing a message
                    tracing::warn!(section, topic, %error, "filter hook failed, not suppressing");
                }
            }
        }

        let mut data = builtin_data(topic, &payload);
        merge_json_payload(&mut data, &payload);

        if let Some(hook) = &handler.datamap_hook {
            if let Err(error) = hook.as_ref()(topic, &mut data) {
                tracing::warn!(section, topic, %error, "datamap hook failed");
            }
        }
        if let Some(hook) = &handler.alldata_hook {
            match hook.as_ref()(topic, &data) {
                Ok(Some(extra)) => {
                    for (key, value) in extra {
                        data.insert(key, value);
                    }
                }
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!(section, topic, %error, "alldata hook failed");
                }
            }
        }

        let Some(addrs) = dispatch::resolve_targets(handler, topic, &data) else {
            return;
        };

        for addr in addrs {
            // The target key may carry {placeholders}; a failure drops
            // this pair only
            let target = match &addr.target {
                None => None,
                Some(template) => match interpolate(template, &data) {
                    Ok(target) => Some(target),
                    Err(error) => {
                        tracing::error!(
                            service = addr.service.as_str(),
                            target = template.as_str(),
                            section,
                            topic,
                            %error,
                            "cannot interpolate target, dropping pair"
                        );
                        continue;
                    }
                },
            };

            let Some(service) = self.registry.get(&addr.service) else {
                tracing::error!(
                    service = addr.service.as_str(),
                    section,
                    topic,
                    "invalid configuration: topic points to non-existing service"
                );
                continue;
            };

            // An absent target key fans out to every valid target
            let keys: Vec<String> = match target {
                Some(key) => {
                    if service.has_target(&key) {
                        vec![key]
                    } else {
                        tracing::error!(
                            service = addr.service.as_str(),
                            target = key.as_str(),
                            section,
                            topic,
                            "invalid configuration: topic points to non-existing target"
                        );
                        continue;
                    }
                }
                None => service.target_keys().map(str::to_string).collect(),
            };

            for key in keys {
                tracing::debug!(
                    service = addr.service.as_str(),
                    target = key.as_str(),
                    topic,
                    "new job"
                );
                let job = Job {
                    priority: 1,
                    service: addr.service.clone(),
                    target: key,
                    section: handler.section.clone(),
                    envelope: envelope.clone(),
                    data: data.clone(),
                    enqueued_at_ms: self.clock.epoch_ms(),
                };
                if !self.queue.push(job).await {
                    tracing::warn!(section, topic, "job queue closed, dropping job");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
