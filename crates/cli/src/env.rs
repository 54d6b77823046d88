// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! The override variable names derive from the program name:
//! `WARBLEINI` points at the configuration file, `WARBLELOG` at the
//! log file.

use std::path::PathBuf;
use warble_engine::SCRIPT_NAME;

fn prefixed(suffix: &str) -> String {
    format!("{}{suffix}", SCRIPT_NAME.to_uppercase())
}

/// Configuration file path: `WARBLEINI`, else `warble.ini` in the
/// working directory.
pub fn config_path() -> PathBuf {
    std::env::var(prefixed("INI"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(format!("{SCRIPT_NAME}.ini")))
}

/// Log file override: `WARBLELOG`.
pub fn log_path_override() -> Option<String> {
    std::env::var(prefixed("LOG")).ok().filter(|s| !s.is_empty())
}
