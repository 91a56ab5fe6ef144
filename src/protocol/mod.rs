// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Telemetry transport.
//!
//! The transport owns the broker connection and its reconnect policy and
//! hands every inbound `(topic, payload)` pair to a single
//! [`MessageHandler`], in wire order. It never interprets payloads.
//!
//! # Architecture
//!
//! ```text
//! MQTT Message: teslamate/cars/1/state → driving
//!                     ↓
//!          MqttTransport::run() event loop
//!                     ↓
//!        handler.on_message(topic, payload)
//!                     ↓
//!   TransitionDispatcher updates tracker, schedules work
//! ```

#[cfg(feature = "mqtt")]
mod mqtt;
mod reconnection;
mod topics;

#[cfg(feature = "mqtt")]
pub use mqtt::{MqttTransport, MqttTransportBuilder, MqttTransportConfig, TransportHandle};
pub use reconnection::ReconnectionPolicy;
pub use topics::CarTopics;

use std::time::Duration;

/// Connection lifecycle notifications from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// Connected (or reconnected) and subscriptions were re-issued.
    Connected,
    /// The connection dropped or could not be established.
    Disconnected {
        /// Description of the failure.
        reason: String,
    },
    /// A reconnect attempt is about to be made after `delay`.
    Reconnecting {
        /// Attempt number, starting at 1.
        attempt: u32,
        /// Wait before the attempt.
        delay: Duration,
    },
}

/// Receiver of inbound messages.
///
/// Called on the transport's task, one message at a time; two calls never
/// overlap.
pub trait MessageHandler: Send {
    /// Handles one inbound message.
    fn on_message(&mut self, topic: &str, payload: &str);

    /// Observes a connection lifecycle change.
    fn on_connection_event(&mut self, event: &ConnectionEvent) {
        let _ = event;
    }
}
