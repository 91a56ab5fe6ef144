// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `carwatch` engine.
//!
//! The engine itself never surfaces these to the dispatcher: transport errors
//! are absorbed by the reconnect loop, and collaborator errors are logged by
//! the scheduled work that produced them. They are returned from the
//! collaborator seams and from startup (configuration, initial connect).

use thiserror::Error;

/// The main error type for this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred in the messaging transport.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Configuration is missing or invalid.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The range/statistics provider failed.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// A notification could not be delivered.
    #[error("notify error: {0}")]
    Notify(#[from] NotifyError),

    /// A report action failed.
    #[error("action error: {0}")]
    Action(#[from] ActionError),
}

/// Errors related to the MQTT transport.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A client request (subscribe, disconnect) could not be queued.
    #[cfg(feature = "mqtt")]
    #[error("MQTT client error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// The MQTT event loop reported a connection failure.
    #[cfg(feature = "mqtt")]
    #[error("MQTT connection error: {0}")]
    Connection(#[from] rumqttc::ConnectionError),

    /// Connection to the broker failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Invalid broker address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The reconnection policy gave up.
    #[error("gave up reconnecting after {attempts} attempts")]
    ReconnectExhausted {
        /// Number of reconnect attempts made.
        attempts: u32,
    },
}

/// Errors raised while loading configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required setting is absent or empty.
    #[error("missing setting: {0}")]
    Missing(String),

    /// A setting could not be parsed.
    #[error("invalid value for {key}: {value:?}")]
    Invalid {
        /// The setting name.
        key: String,
        /// The raw value that failed to parse.
        value: String,
    },
}

/// Errors raised by the range/statistics provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP request failed.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not valid JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The query returned no rows.
    #[error("query returned no rows")]
    EmptyResult,

    /// An expected column is missing from the result.
    #[error("missing column in result: {0}")]
    MissingField(String),
}

/// Errors raised while delivering a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// HTTP request failed.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The notification service refused the message.
    #[error("message rejected with status {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },
}

/// Errors raised by a report action.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The command could not be spawned.
    #[error("failed to run report command: {0}")]
    Io(#[from] std::io::Error),

    /// The command exited unsuccessfully.
    #[error("report command exited with {code:?}: {stderr}")]
    NonZeroExit {
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::Invalid {
            key: "MQTT_PORT".to_string(),
            value: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "invalid value for MQTT_PORT: \"abc\"");
    }

    #[test]
    fn reconnect_exhausted_display() {
        let err = ProtocolError::ReconnectExhausted { attempts: 5 };
        assert_eq!(err.to_string(), "gave up reconnecting after 5 attempts");
    }

    #[test]
    fn error_from_conversions() {
        let err: Error = ConfigError::Missing("CAR_ID".to_string()).into();
        assert!(matches!(err, Error::Config(_)));

        let err: Error = ProviderError::EmptyResult.into();
        assert!(matches!(err, Error::Provider(_)));

        let err: Error = NotifyError::Rejected {
            status: 400,
            body: "bad".to_string(),
        }
        .into();
        assert!(err.to_string().contains("400"));
    }

    #[test]
    fn action_error_display() {
        let err = ActionError::NonZeroExit {
            code: Some(2),
            stderr: "boom".to_string(),
        };
        assert!(err.to_string().contains("boom"));
    }
}
