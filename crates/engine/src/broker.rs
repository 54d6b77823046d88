// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The broker adapter.
//!
//! Wraps the rumqttc client and event loop: builds connection options
//! from the settings (credentials, clean session, last will, TLS,
//! websocket transport), subscribes once per unique filter on
//! connection, publishes the LWT-alive value retained, and feeds
//! incoming publishes to the pipeline. Connection loss delegates to the
//! failover handler and retries on a fixed interval. Publishes from
//! sinks, cron tasks, and the adapter itself are serialized through the
//! client's request channel.

use crate::error::EngineError;
use crate::handlers::HandlerTable;
use crate::pipeline::Pipeline;
use rumqttc::{
    AsyncClient, ConnectReturnCode, ConnectionError, Event, EventLoop, LastWill, MqttOptions,
    Packet, QoS,
};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use warble_config::{Settings, Transport};
use warble_core::Envelope;
use warble_sinks::Publisher;

/// Values published on the LWT topic.
pub(crate) const LWT_ALIVE: &str = "1";
pub(crate) const LWT_DEAD: &str = "0";

const RECONNECT_INTERVAL: Duration = Duration::from_secs(5);
const KEEP_ALIVE: Duration = Duration::from_secs(60);

pub(crate) struct Broker {
    client: AsyncClient,
    eventloop: EventLoop,
    lwt: Option<String>,
    clean_session: bool,
    client_id: String,
}

impl Broker {
    /// Build the client. The network connection is established lazily
    /// by the receive loop's first poll.
    pub(crate) fn new(settings: &Settings) -> Result<Broker, EngineError> {
        let options = mqtt_options(settings)?;
        let (client, eventloop) = AsyncClient::new(options, 64);
        Ok(Broker {
            client,
            eventloop,
            lwt: settings.lwt.clone(),
            clean_session: settings.clean_session,
            client_id: settings.client_id.clone(),
        })
    }

    /// Shared publish capability for sinks and periodic tasks.
    pub(crate) fn publisher(&self) -> Publisher {
        Publisher::new(self.client.clone())
    }

    /// Poll the broker until shutdown. Refused connections are logged
    /// with their reason; connection loss dispatches the failover
    /// handler and retries every five seconds.
    pub(crate) async fn receive_loop(
        &mut self,
        pipeline: &Pipeline,
        table: &HandlerTable,
        shutdown: &CancellationToken,
    ) -> Result<(), EngineError> {
        loop {
            let event = tokio::select! {
                _ = shutdown.cancelled() => return Ok(()),
                event = self.eventloop.poll() => event,
            };

            match event {
                Ok(Event::Incoming(Packet::ConnAck(ack)))
                    if ack.code == ConnectReturnCode::Success =>
                {
                    self.on_connected(table).await;
                }
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    tracing::error!(reason = refusal_reason(ack.code), "connection refused");
                    if !self.backoff(shutdown).await {
                        return Ok(());
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    tracing::debug!(topic = publish.topic.as_str(), "message on broker");
                    let envelope = Envelope::new(
                        publish.topic.clone(),
                        publish.payload.to_vec(),
                        publish.retain,
                    );
                    pipeline.on_message(envelope).await;
                }
                Ok(Event::Incoming(Packet::Disconnect)) => {
                    tracing::info!("clean disconnection from broker");
                }
                Ok(_) => {}
                Err(ConnectionError::ConnectionRefused(code)) => {
                    tracing::error!(reason = refusal_reason(code), "connection refused");
                    if !self.backoff(shutdown).await {
                        return Ok(());
                    }
                }
                Err(error) => {
                    if shutdown.is_cancelled() {
                        return Ok(());
                    }
                    tracing::warn!(%error, "broker connection lost");
                    pipeline
                        .dispatch_failover(
                            "brokerdisconnected",
                            "Broker connection lost. Will attempt to reconnect in 5s...",
                        )
                        .await;
                    if !self.backoff(shutdown).await {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Publish the LWT-dead value retained, disconnect, and flush the
    /// outstanding requests.
    pub(crate) async fn finalize(mut self) {
        if let Some(lwt) = &self.lwt {
            tracing::debug!(topic = lwt.as_str(), "publishing last-will dead value");
            if let Err(error) = self.client.publish(lwt, QoS::AtMostOnce, true, LWT_DEAD).await {
                tracing::warn!(%error, "cannot publish last-will dead value");
            }
        }

        let _ = self.client.disconnect().await;

        // Drive the event loop until the disconnect is on the wire
        for _ in 0..32 {
            match tokio::time::timeout(Duration::from_secs(2), self.eventloop.poll()).await {
                Ok(Ok(_)) => {}
                _ => break,
            }
        }
    }

    async fn on_connected(&self, table: &HandlerTable) {
        tracing::debug!("connected to MQTT broker, subscribing to topics");
        if !self.clean_session {
            tracing::debug!(
                client_id = self.client_id.as_str(),
                "clean_session off; previous subscriptions for this client id remain active on broker"
            );
        }

        for (filter, qos) in table.subscriptions() {
            tracing::debug!(filter = filter.as_str(), qos, "subscribing");
            if let Err(error) = self.client.subscribe(filter.clone(), qos_level(qos)).await {
                tracing::error!(filter = filter.as_str(), %error, "cannot subscribe");
            }
        }

        if let Some(lwt) = &self.lwt {
            if let Err(error) = self.client.publish(lwt, QoS::AtMostOnce, true, LWT_ALIVE).await {
                tracing::warn!(%error, "cannot publish last-will alive value");
            }
        }
    }

    /// Sleep out the reconnect interval; false means shutdown fired.
    async fn backoff(&self, shutdown: &CancellationToken) -> bool {
        tokio::select! {
            _ = shutdown.cancelled() => false,
            _ = tokio::time::sleep(RECONNECT_INTERVAL) => true,
        }
    }
}

fn mqtt_options(settings: &Settings) -> Result<MqttOptions, EngineError> {
    if settings.protocol != 4 {
        tracing::warn!(
            protocol = settings.protocol,
            "unsupported protocol level requested, speaking MQTT 3.1.1"
        );
    }

    let mut options =
        MqttOptions::new(settings.client_id.clone(), settings.hostname.clone(), settings.port);
    options.set_keep_alive(KEEP_ALIVE);
    options.set_clean_session(settings.clean_session);

    if let Some(username) = &settings.username {
        options.set_credentials(username.clone(), settings.password.clone().unwrap_or_default());
    }

    if let Some(lwt) = &settings.lwt {
        tracing::debug!(topic = lwt.as_str(), "setting last will and testament");
        options.set_last_will(LastWill::new(lwt, LWT_DEAD, QoS::AtMostOnce, true));
    }

    match settings.transport {
        Transport::Websockets => {
            // With websockets the hostname carries the full ws:// URL
            options.set_transport(rumqttc::Transport::Ws);
        }
        Transport::Tcp if settings.tls => {
            let Some(ca_path) = &settings.ca_certs else {
                return Err(EngineError::Broker(
                    "tls requires ca_certs to be configured".into(),
                ));
            };
            let ca = std::fs::read(ca_path).map_err(|e| {
                EngineError::Broker(format!("cannot read ca_certs {}: {e}", ca_path.display()))
            })?;

            let client_auth = match (&settings.certfile, &settings.keyfile) {
                (Some(cert), Some(key)) => {
                    let cert = std::fs::read(cert).map_err(|e| {
                        EngineError::Broker(format!("cannot read certfile {}: {e}", cert.display()))
                    })?;
                    let key = std::fs::read(key).map_err(|e| {
                        EngineError::Broker(format!("cannot read keyfile {}: {e}", key.display()))
                    })?;
                    Some((cert, key))
                }
                (None, None) => None,
                _ => {
                    return Err(EngineError::Broker(
                        "certfile and keyfile must be configured together".into(),
                    ));
                }
            };

            if settings.tls_insecure {
                tracing::warn!(
                    "tls_insecure is set but certificate verification cannot be disabled; ignoring"
                );
            }
            if let Some(version) = &settings.tls_version {
                tracing::debug!(version = version.as_str(), "TLS version is negotiated automatically");
            }

            options.set_transport(rumqttc::Transport::tls(ca, client_auth, None));
        }
        Transport::Tcp => {}
    }

    Ok(options)
}

fn qos_level(qos: u8) -> QoS {
    match qos {
        2 => QoS::ExactlyOnce,
        1 => QoS::AtLeastOnce,
        _ => QoS::AtMostOnce,
    }
}

/// Human-readable reasons for the CONNACK refusal codes.
fn refusal_reason(code: ConnectReturnCode) -> &'static str {
    match code {
        ConnectReturnCode::Success => "success",
        ConnectReturnCode::RefusedProtocolVersion => "unacceptable protocol version",
        ConnectReturnCode::BadClientId => "identifier rejected",
        ConnectReturnCode::ServiceUnavailable => "server unavailable",
        ConnectReturnCode::BadUserNamePassword => "bad user name or password",
        ConnectReturnCode::NotAuthorized => "not authorized",
    }
}
