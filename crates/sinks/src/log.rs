// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `log` sink: route the message to the process log at the level named
//! by the target's first address (`debug`, `info`, `warn`, `error`,
//! `crit`).

use crate::{Item, ServiceConfig, Sink, SinkContext, SinkError};
use async_trait::async_trait;

pub(crate) struct LogSink;

impl LogSink {
    pub(crate) fn factory(
        _ctx: SinkContext,
        _config: &ServiceConfig,
    ) -> Result<Box<dyn Sink>, SinkError> {
        Ok(Box::new(LogSink))
    }
}

#[async_trait]
impl Sink for LogSink {
    async fn deliver(&self, item: &Item) -> Result<(), SinkError> {
        let level = item
            .addr_str(0)
            .ok_or_else(|| SinkError::config("log target has no level address"))?;

        let text = item.message.as_str();
        match level.as_str() {
            "debug" => tracing::debug!(topic = %item.topic, "{}", text),
            "info" => tracing::info!(topic = %item.topic, "{}", text),
            "warn" => tracing::warn!(topic = %item.topic, "{}", text),
            "error" | "crit" => tracing::error!(topic = %item.topic, "{}", text),
            other => {
                return Err(SinkError::failed(format!("unknown log level '{other}'")));
            }
        }
        Ok(())
    }
}
