// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading or interpreting the configuration file. All of
/// these are fatal at bootstrap (process exit 2).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("missing section [{0}]")]
    MissingSection(String),

    #[error("section [{section}] has no '{option}' option")]
    MissingOption { section: String, option: String },

    #[error("invalid option '{option}' in section [{section}]: {message}")]
    Invalid { section: String, option: String, message: String },
}
