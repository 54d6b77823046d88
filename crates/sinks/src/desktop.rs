// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `desktop` sink: show the item as a desktop notification.
//!
//! macOS needs care: `mac-notification-sys` (which backs `notify-rust`
//! there) wants a bundle identifier and, if none was set, resolves one
//! with an AppleScript on the first notification. A headless service
//! has no Automation permission, so that script never returns. Setting
//! an identifier up front at construction skips the lookup.

use crate::{Item, ServiceConfig, Sink, SinkContext, SinkError};
use async_trait::async_trait;

pub(crate) struct DesktopSink;

impl DesktopSink {
    pub(crate) fn factory(
        _ctx: SinkContext,
        _config: &ServiceConfig,
    ) -> Result<Box<dyn Sink>, SinkError> {
        #[cfg(target_os = "macos")]
        {
            let _ = mac_notification_sys::set_application("com.apple.Terminal");
        }
        Ok(Box::new(DesktopSink))
    }
}

#[async_trait]
impl Sink for DesktopSink {
    async fn deliver(&self, item: &Item) -> Result<(), SinkError> {
        let title = item.title.clone();
        let message = item.message.clone();
        // Notification::show() is synchronous on macOS; run it on the
        // bounded blocking pool so it never stalls the worker.
        let shown = tokio::task::spawn_blocking(move || {
            notify_rust::Notification::new().summary(&title).body(&message).show().map(|_| ())
        })
        .await
        .map_err(|e| SinkError::failed(format!("notification task failed: {e}")))?;

        shown.map_err(|e| SinkError::failed(format!("desktop notification failed: {e}")))
    }
}
