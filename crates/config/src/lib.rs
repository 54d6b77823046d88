// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration loading for the warble notification router.
//!
//! Parses the INI-dialect configuration file into typed settings and
//! handler/service/cron section definitions. The dispatch engine
//! consumes the already-parsed values; nothing here touches the network.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod defs;
mod error;
mod ini;
mod sample;
mod settings;

pub use defs::{
    cron_defs, failover_def, handler_def, handler_sections, is_reserved_section, service_def,
    CronDef, HandlerDef, ServiceDef,
};
pub use error::ConfigError;
pub use ini::Ini;
pub use sample::{SAMPLE_CONFIG, SAMPLE_HOOKS};
pub use settings::{Settings, Transport};
