// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Target resolution.
//!
//! Resolves a handler's compiled `targets` against one message: dynamic
//! hooks are invoked per message, topic-keyed mappings pick the single
//! most specific matching filter, static lists are used verbatim.

use crate::handlers::{CompiledTargets, Handler};
use warble_core::{matches, DataMap, TargetAddr};

/// Resolve the effective target list for one message.
///
/// `None` aborts dispatch for this message (a dynamic hook failed);
/// `Some(vec![])` is a no-op (a mapping with no matching key, which is
/// a valid configuration).
pub fn resolve_targets(
    handler: &Handler,
    topic: &str,
    data: &DataMap,
) -> Option<Vec<TargetAddr>> {
    match &handler.targets {
        CompiledTargets::Static(addrs) => Some(addrs.clone()),

        CompiledTargets::Mapping(entries) => {
            // Entries are pre-sorted most-specific-first; the first
            // match wins and stops the search
            for (filter, addrs) in entries {
                if matches(filter, topic) {
                    tracing::debug!(
                        section = handler.section.as_str(),
                        filter = filter.as_str(),
                        topic,
                        "most specific match dispatched"
                    );
                    return Some(addrs.clone());
                }
            }
            tracing::debug!(
                section = handler.section.as_str(),
                topic,
                "no matching topic/target pair in dispatcher mapping"
            );
            Some(Vec::new())
        }

        CompiledTargets::Dynamic { name, hook } => {
            match hook.as_ref()(&handler.section, topic, data) {
                Ok(addrs) => Some(addrs),
                Err(error) => {
                    tracing::error!(
                        section = handler.section.as_str(),
                        hook = %name,
                        topic,
                        %error,
                        "targets function failed, aborting dispatch for this message"
                    );
                    None
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
