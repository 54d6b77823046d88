// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sink plugins for the warble notification router.
//!
//! A sink is the terminal delivery component: it receives one fully
//! transformed item and delivers it somewhere (a log, a file, a pipe, a
//! process, an HTTP endpoint, the broker itself, the desktop). Sinks are
//! constructed once at bootstrap with their service context and
//! configuration and shared across all workers.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod context;
mod desktop;
mod execute;
mod file;
mod http;
mod item;
mod log;
mod mqttpub;
mod pipe;

use async_trait::async_trait;
use indexmap::IndexMap;
use thiserror::Error;
use warble_core::Value;

pub use context::{Publisher, SinkContext};
pub use item::Item;

/// Errors from sink construction and delivery.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("invalid sink configuration: {0}")]
    Config(String),

    #[error("delivery failed: {0}")]
    Failed(String),
}

impl SinkError {
    pub fn failed(message: impl Into<String>) -> Self {
        SinkError::Failed(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        SinkError::Config(message.into())
    }
}

/// Sink-specific options from the `config:<service>` section, minus the
/// structural `targets`/`module` keys.
pub type ServiceConfig = IndexMap<String, Value>;

/// A loaded sink plugin.
///
/// `deliver` is called once per job; returning `Err` records a failed
/// delivery (there are no retries). `close` runs at shutdown for sinks
/// holding long-lived state.
#[async_trait]
pub trait Sink: Send + Sync {
    async fn deliver(&self, item: &Item) -> Result<(), SinkError>;

    async fn close(&self) {}
}

/// Constructor shared by all builtin sinks.
pub type SinkFactory = fn(SinkContext, &ServiceConfig) -> Result<Box<dyn Sink>, SinkError>;

/// Look a sink module up in the builtin namespace.
pub fn builtin(module: &str) -> Option<SinkFactory> {
    match module {
        "log" => Some(log::LogSink::factory),
        "file" => Some(file::FileSink::factory),
        "pipe" => Some(pipe::PipeSink::factory),
        "execute" => Some(execute::ExecuteSink::factory),
        "http" => Some(http::HttpSink::factory),
        "mqttpub" => Some(mqttpub::MqttPubSink::factory),
        "desktop" => Some(desktop::DesktopSink::factory),
        _ => None,
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeSink, RecordedDelivery};
