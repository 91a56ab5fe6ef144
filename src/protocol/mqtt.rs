// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT transport for the vehicle state topics.
//!
//! # Examples
//!
//! ```no_run
//! use carwatch::protocol::{CarTopics, MessageHandler, MqttTransport};
//!
//! struct Print;
//!
//! impl MessageHandler for Print {
//!     fn on_message(&mut self, topic: &str, payload: &str) {
//!         println!("{topic} = {payload}");
//!     }
//! }
//!
//! # async fn example() -> carwatch::Result<()> {
//! let transport = MqttTransport::builder()
//!     .host("192.168.1.50")
//!     .port(1883)
//!     .topics(CarTopics::new("teslamate", 1))
//!     .build()?;
//!
//! // Drives the connection until disconnected or the policy gives up
//! transport.run(&mut Print).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS};
use uuid::Uuid;

use crate::error::ProtocolError;

use super::{CarTopics, ConnectionEvent, MessageHandler, ReconnectionPolicy};

/// Capacity of the client request channel.
const REQUEST_CHANNEL_CAPACITY: usize = 10;

/// Configuration for the MQTT transport.
#[derive(Debug, Clone)]
pub struct MqttTransportConfig {
    host: String,
    port: u16,
    credentials: Option<(String, String)>,
    keep_alive: Duration,
    topics: CarTopics,
    reconnection: ReconnectionPolicy,
}

impl Default for MqttTransportConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 1883,
            credentials: None,
            keep_alive: Duration::from_secs(30),
            topics: CarTopics::new("teslamate", 1),
            reconnection: ReconnectionPolicy::default(),
        }
    }
}

/// A persistent MQTT connection subscribed to one vehicle's state topics.
///
/// Created with [`MqttTransport::builder`] and driven by
/// [`run`](Self::run). Subscriptions are re-issued on every connect, so a
/// clean-session reconnect keeps receiving the same topics.
pub struct MqttTransport {
    client: AsyncClient,
    event_loop: EventLoop,
    config: MqttTransportConfig,
    stopping: Arc<AtomicBool>,
}

/// Handle used to stop a running transport from another task.
#[derive(Debug, Clone)]
pub struct TransportHandle {
    client: AsyncClient,
    stopping: Arc<AtomicBool>,
}

impl TransportHandle {
    /// Disconnects from the broker; [`MqttTransport::run`] then returns `Ok`.
    ///
    /// # Errors
    ///
    /// Returns error if the disconnect request cannot be queued.
    pub async fn disconnect(&self) -> Result<(), ProtocolError> {
        self.stopping.store(true, Ordering::Release);
        self.client.disconnect().await.map_err(ProtocolError::Mqtt)
    }
}

impl MqttTransport {
    /// Creates a new builder for configuring the transport.
    #[must_use]
    pub fn builder() -> MqttTransportBuilder {
        MqttTransportBuilder::default()
    }

    /// Returns the subscribed topics.
    #[must_use]
    pub fn topics(&self) -> &CarTopics {
        &self.config.topics
    }

    /// Returns a handle that can stop this transport.
    #[must_use]
    pub fn handle(&self) -> TransportHandle {
        TransportHandle {
            client: self.client.clone(),
            stopping: Arc::clone(&self.stopping),
        }
    }

    /// Drives the connection and delivers messages to `handler`.
    ///
    /// Connection failures are reported to the handler as
    /// [`ConnectionEvent`]s and retried per the reconnection policy.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::ReconnectExhausted`] once the policy stops
    /// retrying.
    pub async fn run<H: MessageHandler>(mut self, handler: &mut H) -> Result<(), ProtocolError> {
        let mut attempt: u32 = 0;

        loop {
            match self.event_loop.poll().await {
                Ok(Event::Incoming(packet)) => {
                    if matches!(packet, Packet::ConnAck(_)) {
                        attempt = 0;
                    }
                    self.on_incoming(packet, handler);
                }
                Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                    tracing::info!(host = %self.config.host, "Disconnected from MQTT broker");
                    return Ok(());
                }
                Ok(_) => {}
                Err(e) => {
                    if self.stopping.load(Ordering::Acquire) {
                        return Ok(());
                    }

                    tracing::error!(error = %e, "MQTT connection error");
                    handler.on_connection_event(&ConnectionEvent::Disconnected {
                        reason: e.to_string(),
                    });

                    if !self.config.reconnection.should_retry(attempt) {
                        return Err(ProtocolError::ReconnectExhausted { attempts: attempt });
                    }

                    let delay = self.config.reconnection.delay_for_attempt(attempt);
                    attempt += 1;
                    tracing::warn!(attempt, ?delay, "Reconnecting to MQTT broker");
                    handler.on_connection_event(&ConnectionEvent::Reconnecting { attempt, delay });
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Reacts to one packet received from the broker.
    fn on_incoming<H: MessageHandler>(&self, packet: Packet, handler: &mut H) {
        match packet {
            Packet::ConnAck(connack) => {
                tracing::info!(
                    host = %self.config.host,
                    port = self.config.port,
                    ?connack,
                    "Connected to MQTT broker"
                );
                self.subscribe();
                handler.on_connection_event(&ConnectionEvent::Connected);
            }
            Packet::SubAck(suback) => {
                tracing::debug!(?suback, "MQTT subscription acknowledged");
            }
            Packet::Publish(publish) => {
                let payload = String::from_utf8_lossy(&publish.payload);
                tracing::debug!(
                    topic = %publish.topic,
                    payload = %payload,
                    "MQTT message received"
                );
                handler.on_message(&publish.topic, &payload);
            }
            Packet::Disconnect => {
                // The next poll fails and goes through the reconnect path
                tracing::warn!("MQTT broker requested disconnect");
                handler.on_connection_event(&ConnectionEvent::Disconnected {
                    reason: "broker requested disconnect".to_string(),
                });
            }
            _ => {}
        }
    }

    /// Queues subscriptions for both state topics.
    fn subscribe(&self) {
        for topic in self.config.topics.all() {
            // try_subscribe: the request channel is drained by this same task
            match self.client.try_subscribe(topic, QoS::AtLeastOnce) {
                Ok(()) => tracing::debug!(topic = %topic, "Subscribing"),
                Err(e) => tracing::error!(topic = %topic, error = %e, "Failed to subscribe"),
            }
        }
    }
}

impl std::fmt::Debug for MqttTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttTransport")
            .field("host", &self.config.host)
            .field("port", &self.config.port)
            .field("topics", &self.config.topics)
            .finish_non_exhaustive()
    }
}

/// Builder for the MQTT transport.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use carwatch::protocol::{CarTopics, MqttTransport, ReconnectionPolicy};
///
/// let transport = MqttTransport::builder()
///     .host("192.168.1.50")
///     .port(1883)
///     .credentials("user", "password")
///     .keep_alive(Duration::from_secs(60))
///     .topics(CarTopics::new("teslamate", 2))
///     .reconnection(ReconnectionPolicy::fixed(Duration::from_secs(5)))
///     .build()
///     .unwrap();
/// assert_eq!(transport.topics().state(), "teslamate/cars/2/state");
/// ```
#[derive(Debug, Default)]
pub struct MqttTransportBuilder {
    config: MqttTransportConfig,
}

impl MqttTransportBuilder {
    /// Sets the broker host address.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Sets the broker port (default: 1883).
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Sets authentication credentials.
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets the keep-alive interval (default: 30 seconds).
    #[must_use]
    pub fn keep_alive(mut self, duration: Duration) -> Self {
        self.config.keep_alive = duration;
        self
    }

    /// Sets the topics to subscribe to.
    #[must_use]
    pub fn topics(mut self, topics: CarTopics) -> Self {
        self.config.topics = topics;
        self
    }

    /// Sets the reconnection policy (default: exponential, infinite).
    #[must_use]
    pub fn reconnection(mut self, policy: ReconnectionPolicy) -> Self {
        self.config.reconnection = policy;
        self
    }

    /// Builds the transport. No connection is made until it is run.
    ///
    /// # Errors
    ///
    /// Returns error if the host is not set.
    pub fn build(self) -> Result<MqttTransport, ProtocolError> {
        if self.config.host.is_empty() {
            return Err(ProtocolError::InvalidAddress(
                "MQTT broker host is required".to_string(),
            ));
        }

        let simple = Uuid::new_v4().simple().to_string();
        let client_id = format!("carwatch-{}", &simple[..12]);

        let mut mqtt_options = MqttOptions::new(client_id, &self.config.host, self.config.port);
        mqtt_options.set_keep_alive(self.config.keep_alive);
        mqtt_options.set_clean_session(true);

        if let Some((ref username, ref password)) = self.config.credentials {
            mqtt_options.set_credentials(username, password);
        }

        let (client, event_loop) = AsyncClient::new(mqtt_options, REQUEST_CHANNEL_CAPACITY);

        Ok(MqttTransport {
            client,
            event_loop,
            config: self.config,
            stopping: Arc::new(AtomicBool::new(false)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_default_values() {
        let builder = MqttTransportBuilder::default();
        assert_eq!(builder.config.port, 1883);
        assert!(builder.config.host.is_empty());
        assert!(builder.config.credentials.is_none());
        assert_eq!(builder.config.keep_alive, Duration::from_secs(30));
        assert_eq!(builder.config.reconnection, ReconnectionPolicy::default());
    }

    #[test]
    fn builder_chain() {
        let builder = MqttTransportBuilder::default()
            .host("broker")
            .port(8883)
            .credentials("admin", "secret")
            .topics(CarTopics::new("tm", 4));

        assert_eq!(builder.config.host, "broker");
        assert_eq!(builder.config.port, 8883);
        assert_eq!(
            builder.config.credentials,
            Some(("admin".to_string(), "secret".to_string()))
        );
        assert_eq!(builder.config.topics.state(), "tm/cars/4/state");
    }

    #[derive(Default)]
    struct Recorder {
        messages: Vec<(String, String)>,
        events: Vec<ConnectionEvent>,
    }

    impl MessageHandler for Recorder {
        fn on_message(&mut self, topic: &str, payload: &str) {
            self.messages.push((topic.to_string(), payload.to_string()));
        }

        fn on_connection_event(&mut self, event: &ConnectionEvent) {
            self.events.push(event.clone());
        }
    }

    fn transport() -> MqttTransport {
        MqttTransport::builder().host("localhost").build().unwrap()
    }

    #[test]
    fn broker_disconnect_is_reported() {
        let transport = transport();
        let mut recorder = Recorder::default();

        transport.on_incoming(Packet::Disconnect, &mut recorder);

        assert!(matches!(
            recorder.events.as_slice(),
            [ConnectionEvent::Disconnected { .. }]
        ));
    }

    #[test]
    fn publish_is_delivered_lossily() {
        let transport = transport();
        let mut recorder = Recorder::default();

        let publish = rumqttc::Publish::new(
            "teslamate/cars/1/state",
            QoS::AtLeastOnce,
            vec![b'o', b'n', 0xff],
        );
        transport.on_incoming(Packet::Publish(publish), &mut recorder);

        assert_eq!(
            recorder.messages,
            vec![(
                "teslamate/cars/1/state".to_string(),
                "on\u{fffd}".to_string()
            )]
        );
        assert!(recorder.events.is_empty());
    }

    #[test]
    fn builder_missing_host_fails() {
        let err = MqttTransportBuilder::default().build().unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidAddress(_)));
    }
}
