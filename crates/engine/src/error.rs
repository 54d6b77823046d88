// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine error taxonomy.
//!
//! Bootstrap problems abort startup; everything inside the per-message
//! pipeline degrades gracefully and is logged instead.

use thiserror::Error;
use warble_config::ConfigError;
use warble_core::InterpolateError;
use warble_sinks::SinkError;

/// Fatal engine errors: bad configuration at bootstrap or an
/// unrecoverable broker failure.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no usable services configured")]
    NoServices,

    #[error("no usable handlers configured")]
    NoHandlers,

    #[error("broker: {0}")]
    Broker(String),

    #[error("plugin: {0}")]
    Plugin(String),
}

/// Load failures for individual services and hooks. The offending item
/// is skipped; bootstrap aborts only when nothing usable remains.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("hook '{0}' is not registered")]
    HookNotFound(String),

    #[error("service '{service}': sink module '{module}' not found")]
    ModuleNotFound { service: String, module: String },

    #[error("service '{service}': {source}")]
    Sink {
        service: String,
        #[source]
        source: SinkError,
    },
}

/// Per-message transformation failures. Never fatal: the handler
/// evaluation degrades (default value, dropped target, original
/// payload) and the error is logged.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error(transparent)]
    Interpolate(#[from] InterpolateError),

    #[error("template '{name}': {message}")]
    Template { name: String, message: String },
}
