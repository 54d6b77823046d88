// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The periodic-task scheduler.
//!
//! One task per `cron:<name>` section. With `now = true` the first
//! invocation happens immediately, otherwise after one interval; each
//! subsequent invocation is scheduled exactly one interval after the
//! previous invocation *started*, whether it succeeded or failed.
//! Cancellation stops pending timers at once; an in-flight invocation
//! finishes but is not rescheduled.

use crate::hooks::{CronFn, HookRegistry};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use warble_config::CronDef;
use warble_sinks::{Publisher, SinkError};

/// Context handed to each periodic task invocation: identity plus the
/// shared broker publish capability.
#[derive(Clone)]
pub struct CronContext {
    pub name: String,
    publisher: Publisher,
}

impl CronContext {
    pub fn new(name: impl Into<String>, publisher: Publisher) -> Self {
        Self { name: name.into(), publisher }
    }

    /// Publish to the broker at QoS 0 without retain.
    pub async fn publish(
        &self,
        topic: &str,
        payload: impl Into<Vec<u8>>,
    ) -> Result<(), SinkError> {
        self.publisher.publish(topic, 0, false, payload).await
    }

    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }
}

pub struct Scheduler {
    token: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    /// Launch one timer task per cron definition. Definitions whose
    /// target hook is not registered are skipped with an error.
    pub fn start(defs: &[CronDef], hooks: &HookRegistry, publisher: Publisher) -> Scheduler {
        let token = CancellationToken::new();
        let mut handles = Vec::new();

        for def in defs {
            let hook = match hooks.resolve_cron(&def.target) {
                Ok(hook) => hook,
                Err(error) => {
                    tracing::error!(cron = def.name.as_str(), %error, "cannot schedule periodic task");
                    continue;
                }
            };

            tracing::debug!(
                cron = def.name.as_str(),
                interval_secs = def.interval_secs,
                now = def.now,
                "scheduling periodic task"
            );
            let ctx = CronContext::new(def.name.clone(), publisher.clone());
            handles.push(tokio::spawn(run_periodic(
                def.name.clone(),
                Duration::from_secs_f64(def.interval_secs),
                def.now,
                hook,
                ctx,
                token.clone(),
            )));
        }

        Scheduler { token, handles }
    }

    pub fn task_count(&self) -> usize {
        self.handles.len()
    }

    /// Cancel all tasks and wait for in-flight invocations to finish.
    pub async fn cancel(self) {
        self.token.cancel();
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}

async fn run_periodic(
    name: String,
    interval: Duration,
    now: bool,
    hook: Arc<CronFn>,
    ctx: CronContext,
    token: CancellationToken,
) {
    if !now {
        tokio::select! {
            _ = token.cancelled() => return,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    loop {
        let started = tokio::time::Instant::now();
        if let Err(error) = hook.as_ref()(ctx.clone()).await {
            tracing::error!(cron = name.as_str(), %error, "periodic task failed");
        }

        // Next run is one interval after this invocation started
        tokio::select! {
            _ = token.cancelled() => {
                tracing::debug!(cron = name.as_str(), "periodic task cancelled");
                return;
            }
            _ = tokio::time::sleep_until(started + interval) => {}
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
