// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logging setup from the `[defaults]` logging options.
//!
//! `loglevel` picks the default filter (overridable with `RUST_LOG`),
//! `logfile` selects stderr (`stream://stderr`, the default) or a file,
//! and `logformat` picks the line layout: `full` (default), `compact`,
//! or `json`.

use anyhow::Context;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use warble_config::Settings;

/// Initialize the global subscriber. The returned guard must stay alive
/// for the process lifetime when logging to a file.
pub fn init(settings: &Settings) -> anyhow::Result<Option<WorkerGuard>> {
    let default_filter = match settings.loglevel.to_ascii_uppercase().as_str() {
        "ERROR" | "CRITICAL" | "FATAL" => "error",
        "WARN" | "WARNING" => "warn",
        "INFO" => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    match settings.logfile.as_deref() {
        None | Some("stream://stderr") | Some("stream://sys.stderr") => {
            build(settings, filter, std::io::stderr)?;
            Ok(None)
        }
        Some(path) => {
            let path = Path::new(path);
            let directory = path.parent().filter(|p| !p.as_os_str().is_empty());
            let filename = path.file_name().context("logfile has no file name")?;
            let appender = tracing_appender::rolling::never(
                directory.unwrap_or_else(|| Path::new(".")),
                filename,
            );
            let (writer, guard) = tracing_appender::non_blocking(appender);
            build(settings, filter, writer)?;
            Ok(Some(guard))
        }
    }
}

fn build<W>(settings: &Settings, filter: EnvFilter, writer: W) -> anyhow::Result<()>
where
    W: for<'a> tracing_subscriber::fmt::MakeWriter<'a> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false);

    let result = match settings.logformat.as_deref() {
        Some("json") => builder.json().try_init(),
        Some("compact") => builder.compact().try_init(),
        _ => builder.try_init(),
    };
    result.map_err(|e| anyhow::anyhow!("cannot initialize logging: {e}"))
}
