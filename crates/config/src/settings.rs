// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed `[defaults]` settings.

use crate::error::ConfigError;
use crate::ini::Ini;
use std::path::PathBuf;
use warble_core::Value;

/// Broker transport selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    #[default]
    Tcp,
    Websockets,
}

/// Runtime options from the `[defaults]` section.
#[derive(Debug, Clone)]
pub struct Settings {
    pub hostname: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub client_id: String,
    pub lwt: Option<String>,
    pub skip_retained: bool,
    pub clean_session: bool,
    pub protocol: u8,
    pub transport: Transport,
    pub directory: PathBuf,
    pub logfile: Option<String>,
    pub logformat: Option<String>,
    pub loglevel: String,
    pub num_workers: usize,
    pub queue_size: usize,
    pub job_timeout_secs: f64,
    pub launch: Vec<String>,
    /// Legacy option naming a hook source file. Parsed so old
    /// configurations load; hooks come from the registry instead.
    pub functions: Option<String>,
    pub tls: bool,
    pub ca_certs: Option<PathBuf>,
    pub certfile: Option<PathBuf>,
    pub keyfile: Option<PathBuf>,
    pub tls_version: Option<String>,
    pub tls_insecure: bool,
}

impl Settings {
    /// Read `[defaults]`, applying the documented defaults. `scriptname`
    /// seeds `client_id` and the LWT topic the way the executable name
    /// always has.
    pub fn from_ini(ini: &Ini, scriptname: &str) -> Result<Settings, ConfigError> {
        let get = |key: &str| ini.value("defaults", key);

        let mut settings = Settings {
            hostname: string_opt(&get("hostname")).unwrap_or_else(|| "localhost".into()),
            port: int_option(ini, "port", 1883)? as u16,
            username: string_opt(&get("username")),
            password: string_opt(&get("password")),
            client_id: string_opt(&get("client_id")).unwrap_or_else(|| scriptname.to_string()),
            lwt: match get("lwt") {
                Some(Value::Null) => None,
                Some(v) => string_opt(&Some(v)),
                None => Some(format!("clients/{scriptname}")),
            },
            skip_retained: bool_option(ini, "skipretained", false)?,
            clean_session: bool_option(ini, "clean_session", false)?,
            protocol: int_option(ini, "protocol", 4)? as u8,
            transport: match get("transport") {
                None => Transport::Tcp,
                Some(v) => match v.render().as_str() {
                    "tcp" => Transport::Tcp,
                    "websockets" => Transport::Websockets,
                    other => {
                        return Err(ConfigError::Invalid {
                            section: "defaults".into(),
                            option: "transport".into(),
                            message: format!("unknown transport '{other}'"),
                        })
                    }
                },
            },
            directory: string_opt(&get("directory")).map(PathBuf::from).unwrap_or_else(|| ".".into()),
            logfile: string_opt(&get("logfile")),
            logformat: string_opt(&get("logformat")),
            loglevel: string_opt(&get("loglevel")).unwrap_or_else(|| "DEBUG".into()),
            num_workers: int_option(ini, "num_workers", 1)?.max(1) as usize,
            queue_size: int_option(ini, "queue_size", 0)?.max(0) as usize,
            job_timeout_secs: float_option(ini, "job_timeout", 10.0)?,
            launch: match get("launch") {
                Some(v) => comma_list(&v.render()),
                None => Vec::new(),
            },
            functions: string_opt(&get("functions")),
            tls: bool_option(ini, "tls", false)?,
            ca_certs: string_opt(&get("ca_certs")).map(PathBuf::from),
            certfile: string_opt(&get("certfile")).map(PathBuf::from),
            keyfile: string_opt(&get("keyfile")).map(PathBuf::from),
            tls_version: string_opt(&get("tls_version")),
            tls_insecure: bool_option(ini, "tls_insecure", false)?,
        };

        // A CA bundle implies TLS, matching long-standing behavior
        if settings.ca_certs.is_some() {
            settings.tls = true;
        }

        if let Some(version) = &settings.tls_version {
            if !matches!(version.as_str(), "tlsv1" | "tlsv1_1" | "tlsv1_2") {
                return Err(ConfigError::Invalid {
                    section: "defaults".into(),
                    option: "tls_version".into(),
                    message: format!("unknown TLS version '{version}'"),
                });
            }
        }

        Ok(settings)
    }
}

fn string_opt(value: &Option<Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(v) => {
            let s = v.render();
            if s.is_empty() {
                None
            } else {
                Some(s)
            }
        }
    }
}

fn bool_option(ini: &Ini, key: &str, default: bool) -> Result<bool, ConfigError> {
    match ini.value("defaults", key) {
        None => Ok(default),
        Some(v) => v.as_bool().ok_or_else(|| ConfigError::Invalid {
            section: "defaults".into(),
            option: key.into(),
            message: format!("expected a boolean, got '{v}'"),
        }),
    }
}

fn int_option(ini: &Ini, key: &str, default: i64) -> Result<i64, ConfigError> {
    match ini.value("defaults", key) {
        None => Ok(default),
        Some(v) => v.as_i64().ok_or_else(|| ConfigError::Invalid {
            section: "defaults".into(),
            option: key.into(),
            message: format!("expected an integer, got '{v}'"),
        }),
    }
}

fn float_option(ini: &Ini, key: &str, default: f64) -> Result<f64, ConfigError> {
    match ini.value("defaults", key) {
        None => Ok(default),
        Some(v) => v.as_f64().ok_or_else(|| ConfigError::Invalid {
            section: "defaults".into(),
            option: key.into(),
            message: format!("expected a number, got '{v}'"),
        }),
    }
}

fn comma_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
