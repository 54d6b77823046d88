// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service context handed to each sink at construction.

use crate::SinkError;
use rumqttc::{AsyncClient, QoS};

/// Shared broker publish capability. Publishes are serialized by the
/// underlying client's request channel; sinks and periodic tasks may
/// call this concurrently. In standalone plugin mode there is no broker
/// connection and publishing fails cleanly.
#[derive(Clone, Default)]
pub struct Publisher {
    client: Option<AsyncClient>,
}

impl Publisher {
    pub fn new(client: AsyncClient) -> Self {
        Self { client: Some(client) }
    }

    /// A publisher with no broker connection (standalone plugin mode).
    pub fn disconnected() -> Self {
        Self { client: None }
    }

    pub async fn publish(
        &self,
        topic: &str,
        qos: u8,
        retain: bool,
        payload: impl Into<Vec<u8>>,
    ) -> Result<(), SinkError> {
        let Some(client) = &self.client else {
            return Err(SinkError::failed("no broker connection"));
        };
        client
            .publish(topic, qos_level(qos), retain, payload.into())
            .await
            .map_err(|e| SinkError::failed(format!("publish to '{topic}' failed: {e}")))
    }
}

/// Clamp a configured QoS integer to a protocol level.
pub(crate) fn qos_level(qos: u8) -> QoS {
    match qos {
        2 => QoS::ExactlyOnce,
        1 => QoS::AtLeastOnce,
        _ => QoS::AtMostOnce,
    }
}

/// Context granting a sink access to its identity and the shared broker
/// publish capability.
#[derive(Clone)]
pub struct SinkContext {
    /// Service name this sink was loaded under.
    pub service: String,
    /// Name of the calling program, for user-facing defaults.
    pub script_name: &'static str,
    pub publisher: Publisher,
}

impl SinkContext {
    pub fn new(service: impl Into<String>, script_name: &'static str, publisher: Publisher) -> Self {
        Self { service: service.into(), script_name, publisher }
    }
}
