// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `http` sink: send the item to an HTTP(S) endpoint.
//!
//! Target address shape: `[url]` or `[url, {params}]` with optional
//! params `method` (GET/POST, default GET), `data` (request data
//! mapping), `auth` (basic-auth `[user, pass]` pair), `json` (POST the
//! data JSON-encoded), `timeout` (seconds).
//!
//! String values in `data` are interpolated against the data map; a
//! value starting with `@` looks the remainder up in the data map
//! directly, which keeps non-string values (numbers, booleans) intact
//! for JSON requests. With the `format_url` service option the URL
//! itself is interpolated, and interpolation failure aborts delivery.

use crate::{Item, ServiceConfig, Sink, SinkContext, SinkError};
use async_trait::async_trait;
use std::time::Duration;
use warble_core::{interpolate, Value};

pub(crate) struct HttpSink {
    client: reqwest::Client,
    script_name: &'static str,
    format_url: bool,
}

impl HttpSink {
    pub(crate) fn factory(
        ctx: SinkContext,
        config: &ServiceConfig,
    ) -> Result<Box<dyn Sink>, SinkError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| SinkError::config(format!("cannot build HTTP client: {e}")))?;
        Ok(Box::new(HttpSink {
            client,
            script_name: ctx.script_name,
            format_url: config.get("format_url").and_then(|v| v.as_bool()).unwrap_or(false),
        }))
    }
}

#[async_trait]
impl Sink for HttpSink {
    async fn deliver(&self, item: &Item) -> Result<(), SinkError> {
        let url_template = item
            .addr_str(0)
            .ok_or_else(|| SinkError::config("http target has no URL address"))?;

        let url = if self.format_url {
            interpolate(&url_template, &item.data)
                .map_err(|e| SinkError::failed(format!("URL cannot be formatted: {e}")))?
        } else {
            url_template
        };

        let params = item.addrs.get(1).and_then(Value::as_map);
        let method = params
            .and_then(|p| p.get("method"))
            .map(|v| v.render().to_ascii_uppercase())
            .unwrap_or_else(|| "GET".to_string());
        let use_json = params
            .and_then(|p| p.get("json"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let timeout = params
            .and_then(|p| p.get("timeout"))
            .and_then(Value::as_f64)
            .unwrap_or(10.0);
        let auth = params.and_then(|p| p.get("auth")).and_then(Value::as_list);
        let data = params
            .and_then(|p| p.get("data"))
            .and_then(Value::as_map)
            .map(|map| resolve_data(map.iter().map(|(k, v)| (k.as_str(), v)), item))
            .transpose()?;

        let mut request = match method.as_str() {
            "GET" => {
                let mut req = self.client.get(&url);
                if let Some(data) = &data {
                    let pairs: Vec<(String, String)> = data
                        .iter()
                        .map(|(k, v)| (k.clone(), render_json(v)))
                        .collect();
                    req = req.query(&pairs);
                }
                req
            }
            "POST" => {
                let req = self.client.post(&url);
                match &data {
                    Some(data) if use_json => {
                        req.json(&serde_json::Value::Object(data.clone().into_iter().collect()))
                    }
                    Some(data) => {
                        let pairs: Vec<(String, String)> = data
                            .iter()
                            .map(|(k, v)| (k.clone(), render_json(v)))
                            .collect();
                        req.form(&pairs)
                    }
                    None => req.body(item.message.clone()),
                }
            }
            other => return Err(SinkError::failed(format!("unsupported HTTP method: {other}"))),
        };

        request = request
            .header(reqwest::header::USER_AGENT, self.script_name)
            .timeout(Duration::from_secs_f64(timeout));

        if let Some([user, pass]) = auth.map(|a| a.to_vec()).as_deref() {
            request = request.basic_auth(user.render(), Some(pass.render()));
        }

        let response = request
            .send()
            .await
            .map_err(|e| SinkError::failed(format!("{method} request to {url} failed: {e}")))?;
        response
            .error_for_status()
            .map_err(|e| SinkError::failed(format!("{method} request to {url} failed: {e}")))?;
        Ok(())
    }
}

/// Resolve a request-data mapping against the item's data map.
fn resolve_data<'a>(
    entries: impl Iterator<Item = (&'a str, &'a Value)>,
    item: &Item,
) -> Result<Vec<(String, serde_json::Value)>, SinkError> {
    let mut out = Vec::new();
    for (key, value) in entries {
        let resolved = match value {
            Value::Str(text) => match text.strip_prefix('@') {
                // '@name' looks the value up directly, keeping its type
                Some(name) => {
                    item.data.get(name).map(Value::to_json).unwrap_or(serde_json::Value::Null)
                }
                None => {
                    let formatted = interpolate(text, &item.data).map_err(|e| {
                        SinkError::failed(format!("parameter '{key}' cannot be formatted: {e}"))
                    })?;
                    serde_json::Value::String(formatted)
                }
            },
            other => other.to_json(),
        };
        out.push((key.to_string(), resolved));
    }
    Ok(out)
}

fn render_json(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
