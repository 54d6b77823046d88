// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pipe` sink: spawn the target's argv and write the message to its
//! stdin, appending a trailing newline when missing. With the
//! `format_args` service option, arguments (but not the program name)
//! are interpolated against the data map.
//!
//! A new process is spawned per delivery, which is deliberately simple
//! and correspondingly resource-intensive.

use crate::{Item, ServiceConfig, Sink, SinkContext, SinkError};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use warble_core::interpolate;

pub(crate) struct PipeSink {
    cwd: PathBuf,
    format_args: bool,
}

impl PipeSink {
    pub(crate) fn factory(
        _ctx: SinkContext,
        config: &ServiceConfig,
    ) -> Result<Box<dyn Sink>, SinkError> {
        Ok(Box::new(PipeSink {
            cwd: config
                .get("cwd")
                .map(|v| PathBuf::from(v.render()))
                .unwrap_or_else(std::env::temp_dir),
            format_args: config.get("format_args").and_then(|v| v.as_bool()).unwrap_or(false),
        }))
    }

    fn argv(&self, item: &Item) -> Result<Vec<String>, SinkError> {
        let mut argv: Vec<String> = item.addrs.iter().map(|a| a.render()).collect();
        if argv.is_empty() || argv[0].is_empty() {
            return Err(SinkError::config(format!(
                "no command configured for target '{}'",
                item.target
            )));
        }

        if self.format_args {
            // Program name stays verbatim; failed interpolation keeps
            // the original argument
            for arg in argv.iter_mut().skip(1) {
                if let Ok(formatted) = interpolate(arg, &item.data) {
                    *arg = formatted;
                }
            }
        }
        Ok(argv)
    }
}

#[async_trait]
impl Sink for PipeSink {
    async fn deliver(&self, item: &Item) -> Result<(), SinkError> {
        let argv = self.argv(item)?;

        let mut text = item.message.clone();
        if !text.ends_with('\n') {
            text.push('\n');
        }

        let mut child = tokio::process::Command::new(&argv[0])
            .args(&argv[1..])
            .current_dir(&self.cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| SinkError::failed(format!("cannot spawn '{}': {e}", argv[0])))?;

        if let Some(stdin) = child.stdin.as_mut() {
            stdin
                .write_all(text.as_bytes())
                .await
                .map_err(|e| SinkError::failed(format!("cannot write to pipe: {e}")))?;
        }
        drop(child.stdin.take());

        let status = child
            .wait()
            .await
            .map_err(|e| SinkError::failed(format!("cannot wait for '{}': {e}", argv[0])))?;
        if status.success() {
            Ok(())
        } else {
            Err(SinkError::failed(format!("'{}' exited with {status}", argv[0])))
        }
    }
}

#[cfg(test)]
#[path = "pipe_tests.rs"]
mod tests;
