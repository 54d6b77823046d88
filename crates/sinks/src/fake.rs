// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recording fake sink for tests.

use crate::{Item, Sink, SinkError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// One recorded delivery.
#[derive(Debug, Clone)]
pub struct RecordedDelivery {
    pub service: String,
    pub section: String,
    pub target: String,
    pub topic: String,
    pub message: String,
    pub title: String,
    pub priority: i64,
}

#[derive(Default)]
struct FakeSinkState {
    deliveries: Vec<RecordedDelivery>,
    fail: bool,
    delay: Option<Duration>,
}

/// Fake sink that records every delivery. Clones share state, so tests
/// keep one clone while the engine owns another.
#[derive(Clone, Default)]
pub struct FakeSink {
    inner: Arc<Mutex<FakeSinkState>>,
}

impl FakeSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded deliveries, in order.
    pub fn deliveries(&self) -> Vec<RecordedDelivery> {
        self.inner.lock().deliveries.clone()
    }

    /// Just the delivered messages, in order.
    pub fn messages(&self) -> Vec<String> {
        self.inner.lock().deliveries.iter().map(|d| d.message.clone()).collect()
    }

    /// Make every subsequent delivery fail.
    pub fn set_fail(&self, fail: bool) {
        self.inner.lock().fail = fail;
    }

    /// Delay every subsequent delivery (for deadline tests). The
    /// delivery is recorded after the delay, so timed-out jobs show up
    /// only once the abandoned call finishes.
    pub fn set_delay(&self, delay: Duration) {
        self.inner.lock().delay = Some(delay);
    }
}

#[async_trait]
impl Sink for FakeSink {
    async fn deliver(&self, item: &Item) -> Result<(), SinkError> {
        let delay = self.inner.lock().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.inner.lock();
        state.deliveries.push(RecordedDelivery {
            service: item.service.clone(),
            section: item.section.clone(),
            target: item.target.clone(),
            topic: item.topic.clone(),
            message: item.message.clone(),
            title: item.title.clone(),
            priority: item.priority,
        });

        if state.fail {
            Err(SinkError::failed("fake sink configured to fail"))
        } else {
            Ok(())
        }
    }
}
