// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mqttpub` sink: republish the message on the same broker connection.
//!
//! Target address shape: `[topic]` or `[topic, qos, retain]`. The
//! outgoing topic may carry `{placeholders}` from the data map; when
//! interpolation fails the message is not published.

use crate::{Item, ServiceConfig, Sink, SinkContext, SinkError};
use async_trait::async_trait;
use warble_core::{interpolate, Value};

pub(crate) struct MqttPubSink {
    ctx: SinkContext,
}

impl MqttPubSink {
    pub(crate) fn factory(
        ctx: SinkContext,
        _config: &ServiceConfig,
    ) -> Result<Box<dyn Sink>, SinkError> {
        Ok(Box::new(MqttPubSink { ctx }))
    }
}

#[async_trait]
impl Sink for MqttPubSink {
    async fn deliver(&self, item: &Item) -> Result<(), SinkError> {
        let topic_template = item
            .addr_str(0)
            .ok_or_else(|| SinkError::config("mqttpub target has no topic address"))?;
        let qos = item.addrs.get(1).and_then(Value::as_i64).unwrap_or(0) as u8;
        let retain = item.addrs.get(2).and_then(Value::as_bool).unwrap_or(false);

        let topic = interpolate(&topic_template, &item.data).map_err(|e| {
            SinkError::failed(format!("outgoing topic cannot be formatted, not published: {e}"))
        })?;

        self.ctx.publisher.publish(&topic, qos, retain, item.message.as_bytes().to_vec()).await
    }
}
