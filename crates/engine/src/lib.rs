// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The warble dispatch engine.
//!
//! Subscribes to MQTT topics, matches each message against the compiled
//! handler table, runs the per-message transformation pipeline, and
//! drains the resulting jobs through a worker pool that drives sink
//! plugins with per-job deadlines. A periodic scheduler runs
//! user-registered tasks on wall-clock intervals.
//!
//! The [`Engine`] aggregate owns everything; there is no process-wide
//! state. Embedders register hooks and custom sinks at bootstrap; both
//! are resolved once and referenced by handle afterwards.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod broker;
mod dispatch;
mod engine;
mod error;
mod handlers;
mod hooks;
mod pipeline;
mod queue;
mod registry;
mod scheduler;
mod template;
mod worker;
mod xform;

pub use engine::{run_plugin, Engine};
pub use error::{EngineError, LoadError, TransformError};
pub use handlers::{CompiledTargets, Handler, HandlerTable, XformStep};
pub use hooks::{
    AllDataFn, CronFn, DataMapFn, FilterFn, HookError, HookRegistry, TargetsFn, XformFn,
};
pub use pipeline::Pipeline;
pub use queue::JobQueue;
pub use registry::{Service, ServiceRegistry, SinkFactories};
pub use scheduler::{CronContext, Scheduler};
pub use template::Templates;
pub use worker::{WorkerContext, WorkerPool};

/// Name of the calling program, used for logging and user-facing
/// defaults such as the fallback notification title.
pub const SCRIPT_NAME: &str = "warble";
