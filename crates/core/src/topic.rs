// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! MQTT 3.1.1 topic filter matching and dispatch precedence ordering.

/// Match a subscription filter against a concrete topic.
///
/// `/`-delimited levels; `+` matches exactly one level; `#` matches zero
/// or more trailing levels and is only valid as the final level. Empty
/// levels (from a double `/`) are distinct levels. Topics beginning with
/// `$` never match a filter whose first level is a wildcard.
pub fn matches(filter: &str, topic: &str) -> bool {
    if topic.starts_with('$') && (filter.starts_with('+') || filter.starts_with('#')) {
        return false;
    }

    let filter_levels: Vec<&str> = filter.split('/').collect();
    let topic_levels: Vec<&str> = topic.split('/').collect();

    for (i, level) in filter_levels.iter().enumerate() {
        match *level {
            // '#' swallows the rest, but only when it is the last level
            "#" => return i == filter_levels.len() - 1,
            "+" => {
                if topic_levels.get(i).is_none() {
                    return false;
                }
            }
            literal => {
                if topic_levels.get(i) != Some(&literal) {
                    return false;
                }
            }
        }
    }

    filter_levels.len() == topic_levels.len()
}

/// Specificity key for ordering topic-keyed target mappings.
///
/// Sorting keys in descending order yields most-specific-first: deeper
/// filters (more levels) win, ties break reverse-lexicographically with
/// `#` mapped to 0x01 and `+` to 0x02 so literal levels sort above
/// single-level wildcards and those above the multi-level wildcard.
pub fn precedence_key(filter: &str) -> (usize, String) {
    let modified: String = filter
        .chars()
        .map(|c| match c {
            '#' => '\u{01}',
            '+' => '\u{02}',
            other => other,
        })
        .collect();
    (filter.split('/').count(), modified)
}

#[cfg(test)]
#[path = "topic_tests.rs"]
mod tests;
