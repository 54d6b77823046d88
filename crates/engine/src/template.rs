// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Template rendering.
//!
//! Handlers may name a template instead of (or in addition to) a
//! `format` option; rendering it against the data map replaces the
//! format output. Templates live in a `templates/` directory next to
//! the working directory. A missing directory is not an error: the
//! configured template logs a warning per use and the format output
//! stands.

use crate::error::TransformError;
use std::path::Path;
use warble_core::DataMap;

pub struct Templates {
    env: Option<minijinja::Environment<'static>>,
}

impl Templates {
    /// Build an engine over `dir` when it exists.
    pub fn load(dir: &Path) -> Templates {
        if !dir.is_dir() {
            return Templates { env: None };
        }
        let mut env = minijinja::Environment::new();
        env.set_loader(minijinja::path_loader(dir));
        Templates { env: Some(env) }
    }

    /// An engine with no templates available.
    pub fn disabled() -> Templates {
        Templates { env: None }
    }

    pub fn is_available(&self) -> bool {
        self.env.is_some()
    }

    pub fn render(&self, name: &str, data: &DataMap) -> Result<String, TransformError> {
        let Some(env) = &self.env else {
            return Err(TransformError::Template {
                name: name.to_string(),
                message: "no templates directory".into(),
            });
        };

        let json: serde_json::Map<String, serde_json::Value> =
            data.iter().map(|(k, v)| (k.clone(), v.to_json())).collect();

        let template = env.get_template(name).map_err(|e| TransformError::Template {
            name: name.to_string(),
            message: e.to_string(),
        })?;
        template
            .render(minijinja::Value::from_serialize(&json))
            .map_err(|e| TransformError::Template { name: name.to_string(), message: e.to_string() })
    }
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
