// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The fully transformed record handed to a sink.

use crate::ServiceConfig;
use warble_core::{DataMap, Value};

/// Everything a sink needs to deliver one notification.
#[derive(Debug, Clone)]
pub struct Item {
    pub service: String,
    pub section: String,
    pub target: String,
    /// Sink-specific options from the service's config section.
    pub config: ServiceConfig,
    /// Address list of the resolved target key.
    pub addrs: Vec<Value>,
    pub topic: String,
    /// Lossy UTF-8 payload.
    pub payload: String,
    pub raw_payload: Vec<u8>,
    pub data: DataMap,
    pub title: String,
    pub image: String,
    /// The transformed outgoing message.
    pub message: String,
    pub priority: i64,
}

impl Item {
    /// Address at `idx`, rendered to a string.
    pub fn addr_str(&self, idx: usize) -> Option<String> {
        self.addrs.get(idx).map(Value::render)
    }

    pub fn config_bool(&self, key: &str, default: bool) -> bool {
        self.config.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    pub fn config_str(&self, key: &str) -> Option<String> {
        self.config.get(key).map(Value::render)
    }
}
