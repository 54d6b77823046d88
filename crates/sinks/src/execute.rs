// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `execute` sink: run the target's argv, replacing a placeholder token
//! (`[TEXT]` by default, configurable via `text_replace`) with the
//! message in every argument. Output is captured so it never lands on
//! the router's stdout.

use crate::{Item, ServiceConfig, Sink, SinkContext, SinkError};
use async_trait::async_trait;
use std::path::PathBuf;

pub(crate) struct ExecuteSink {
    cwd: PathBuf,
    text_replace: String,
}

impl ExecuteSink {
    pub(crate) fn factory(
        _ctx: SinkContext,
        config: &ServiceConfig,
    ) -> Result<Box<dyn Sink>, SinkError> {
        Ok(Box::new(ExecuteSink {
            cwd: config
                .get("cwd")
                .map(|v| PathBuf::from(v.render()))
                .unwrap_or_else(std::env::temp_dir),
            text_replace: config
                .get("text_replace")
                .map(|v| v.render())
                .unwrap_or_else(|| "[TEXT]".to_string()),
        }))
    }
}

#[async_trait]
impl Sink for ExecuteSink {
    async fn deliver(&self, item: &Item) -> Result<(), SinkError> {
        let argv: Vec<String> = item
            .addrs
            .iter()
            .map(|a| a.render().replace(&self.text_replace, &item.message))
            .collect();
        if argv.is_empty() || argv[0].is_empty() {
            return Err(SinkError::config(format!(
                "no command configured for target '{}'",
                item.target
            )));
        }

        let output = tokio::process::Command::new(&argv[0])
            .args(&argv[1..])
            .current_dir(&self.cwd)
            .output()
            .await
            .map_err(|e| SinkError::failed(format!("cannot execute '{}': {e}", argv[0])))?;

        if output.status.success() {
            Ok(())
        } else {
            tracing::debug!(
                command = %argv.join(" "),
                output = %String::from_utf8_lossy(&output.stdout),
                "command output"
            );
            Err(SinkError::failed(format!(
                "'{}' returned non-zero exit value: {}",
                argv[0], output.status
            )))
        }
    }
}

#[cfg(test)]
#[path = "execute_tests.rs"]
mod tests;
