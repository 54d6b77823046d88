// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Embedded sample assets for `make-config` and `make-hooks`.

/// A complete, commented sample configuration file.
pub const SAMPLE_CONFIG: &str = include_str!("../assets/warble.ini");

/// Sample hook-module source demonstrating the registry contract.
pub const SAMPLE_HOOKS: &str = include_str!("../assets/samplehooks.rs");
