// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn parse(defaults: &str) -> Settings {
    let ini = Ini::parse(&format!("[defaults]\n{defaults}")).unwrap();
    Settings::from_ini(&ini, "warble").unwrap()
}

#[test]
fn defaults_apply_when_section_is_empty() {
    let settings = parse("");
    assert_eq!(settings.hostname, "localhost");
    assert_eq!(settings.port, 1883);
    assert_eq!(settings.client_id, "warble");
    assert_eq!(settings.lwt.as_deref(), Some("clients/warble"));
    assert!(!settings.skip_retained);
    assert!(!settings.clean_session);
    assert_eq!(settings.num_workers, 1);
    assert_eq!(settings.queue_size, 0);
    assert_eq!(settings.job_timeout_secs, 10.0);
    assert_eq!(settings.transport, Transport::Tcp);
    assert!(!settings.tls);
}

#[test]
fn explicit_options_override_defaults() {
    let settings = parse(
        "hostname = broker.example.org\nport = 8883\nusername = jane\npassword = s3cret\n\
         skipretained = True\nnum_workers = 4\nlaunch = log, file, http\n",
    );
    assert_eq!(settings.hostname, "broker.example.org");
    assert_eq!(settings.port, 8883);
    assert_eq!(settings.username.as_deref(), Some("jane"));
    assert!(settings.skip_retained);
    assert_eq!(settings.num_workers, 4);
    assert_eq!(settings.launch, vec!["log", "file", "http"]);
}

#[test]
fn lwt_none_disables_will() {
    let settings = parse("lwt = None\n");
    assert_eq!(settings.lwt, None);
}

#[test]
fn ca_certs_implies_tls() {
    let settings = parse("ca_certs = /etc/ssl/ca.pem\n");
    assert!(settings.tls);
    assert_eq!(settings.ca_certs.as_deref(), Some(std::path::Path::new("/etc/ssl/ca.pem")));
}

#[test]
fn websockets_transport() {
    let settings = parse("transport = websockets\n");
    assert_eq!(settings.transport, Transport::Websockets);
}

#[yare::parameterized(
    bad_transport = { "transport = carrier-pigeon\n" },
    bad_port      = { "port = not-a-number\n" },
    bad_bool      = { "clean_session = maybe\n" },
    bad_tls_ver   = { "tls_version = sslv3\n" },
)]
fn invalid_options_are_config_errors(defaults: &str) {
    let ini = Ini::parse(&format!("[defaults]\n{defaults}")).unwrap();
    assert!(Settings::from_ini(&ini, "warble").is_err());
}

#[test]
fn num_workers_floor_is_one() {
    let settings = parse("num_workers = 0\n");
    assert_eq!(settings.num_workers, 1);
}
