// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `file` sink: write the message to the path named by the target's
//! first address. Appends by default; the service options
//! `append_newline` and `overwrite` adjust behavior.

use crate::{Item, ServiceConfig, Sink, SinkContext, SinkError};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use warble_core::interpolate;

pub(crate) struct FileSink {
    append_newline: bool,
    overwrite: bool,
}

impl FileSink {
    pub(crate) fn factory(
        _ctx: SinkContext,
        config: &ServiceConfig,
    ) -> Result<Box<dyn Sink>, SinkError> {
        Ok(Box::new(FileSink {
            append_newline: config.get("append_newline").and_then(|v| v.as_bool()).unwrap_or(false),
            overwrite: config.get("overwrite").and_then(|v| v.as_bool()).unwrap_or(false),
        }))
    }
}

#[async_trait]
impl Sink for FileSink {
    async fn deliver(&self, item: &Item) -> Result<(), SinkError> {
        let path_template = item
            .addr_str(0)
            .ok_or_else(|| SinkError::config("file target has no path address"))?;

        // The path may carry {placeholders} from the data map
        let path = interpolate(&path_template, &item.data)
            .map_err(|e| SinkError::failed(format!("cannot resolve path '{path_template}': {e}")))?;

        let mut text = item.message.clone();
        if self.append_newline {
            text.push('\n');
        }

        let mut options = tokio::fs::OpenOptions::new();
        options.create(true).write(true);
        if self.overwrite {
            options.truncate(true);
        } else {
            options.append(true);
        }

        let mut file = options
            .open(&path)
            .await
            .map_err(|e| SinkError::failed(format!("cannot open '{path}': {e}")))?;
        file.write_all(text.as_bytes())
            .await
            .map_err(|e| SinkError::failed(format!("cannot write to '{path}': {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
