// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration for the engine and its collaborators.
//!
//! [`EngineConfig`] holds what the engine needs to connect and derive its
//! topics. [`AppConfig`] adds the collaborator settings used by the binary
//! and is loaded from environment variables.

use std::time::Duration;

use crate::error::ConfigError;
use crate::protocol::{CarTopics, ReconnectionPolicy};
use crate::scheduler::TriggerPolicy;

/// Engine configuration.
///
/// # Examples
///
/// ```
/// use carwatch::config::EngineConfig;
///
/// let config = EngineConfig::new("192.168.1.50")
///     .with_car_id(2)
///     .with_topic_prefix("tm")
///     .with_credentials("user", "pass");
///
/// assert_eq!(config.port(), 1883);
/// assert_eq!(config.topics().state(), "tm/cars/2/state");
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    host: String,
    port: u16,
    credentials: Option<(String, String)>,
    car_id: u32,
    topic_prefix: String,
    keep_alive: Duration,
    trigger_policy: TriggerPolicy,
    reconnection: ReconnectionPolicy,
}

impl EngineConfig {
    /// Default MQTT port.
    pub const DEFAULT_PORT: u16 = 1883;
    /// Default vehicle id.
    pub const DEFAULT_CAR_ID: u32 = 1;
    /// Default topic prefix.
    pub const DEFAULT_TOPIC_PREFIX: &'static str = "teslamate";
    /// Default keep-alive interval.
    pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(30);

    /// Creates a configuration for the given broker host.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            credentials: None,
            car_id: Self::DEFAULT_CAR_ID,
            topic_prefix: Self::DEFAULT_TOPIC_PREFIX.to_string(),
            keep_alive: Self::DEFAULT_KEEP_ALIVE,
            trigger_policy: TriggerPolicy::default(),
            reconnection: ReconnectionPolicy::default(),
        }
    }

    /// Sets the broker port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets broker credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets the vehicle id.
    #[must_use]
    pub fn with_car_id(mut self, car_id: u32) -> Self {
        self.car_id = car_id;
        self
    }

    /// Sets the topic prefix.
    #[must_use]
    pub fn with_topic_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.topic_prefix = prefix.into();
        self
    }

    /// Sets the MQTT keep-alive interval.
    #[must_use]
    pub fn with_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    /// Sets the debounce/delay windows.
    #[must_use]
    pub fn with_trigger_policy(mut self, policy: TriggerPolicy) -> Self {
        self.trigger_policy = policy;
        self
    }

    /// Sets the transport reconnection policy.
    #[must_use]
    pub fn with_reconnection(mut self, policy: ReconnectionPolicy) -> Self {
        self.reconnection = policy;
        self
    }

    /// Returns the broker host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the broker port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the credentials if set.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        self.credentials
            .as_ref()
            .map(|(u, p)| (u.as_str(), p.as_str()))
    }

    /// Returns the vehicle id.
    #[must_use]
    pub fn car_id(&self) -> u32 {
        self.car_id
    }

    /// Returns the topic prefix.
    #[must_use]
    pub fn topic_prefix(&self) -> &str {
        &self.topic_prefix
    }

    /// Returns the keep-alive interval.
    #[must_use]
    pub fn keep_alive(&self) -> Duration {
        self.keep_alive
    }

    /// Returns the trigger policy.
    #[must_use]
    pub fn trigger_policy(&self) -> &TriggerPolicy {
        &self.trigger_policy
    }

    /// Returns the reconnection policy.
    #[must_use]
    pub fn reconnection(&self) -> &ReconnectionPolicy {
        &self.reconnection
    }

    /// Derives the vehicle's state topics.
    #[must_use]
    pub fn topics(&self) -> CarTopics {
        CarTopics::new(&self.topic_prefix, self.car_id)
    }
}

/// Settings for the Grafana range provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrafanaSettings {
    /// Grafana base URL.
    pub url: String,
    /// Datasource uid to query.
    pub datasource_uid: String,
    /// Service account token.
    pub token: Option<String>,
    /// SQL query override.
    pub query: Option<String>,
}

/// Settings for the Telegram notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramSettings {
    /// Bot token.
    pub bot_token: String,
    /// Target chat id.
    pub chat_id: String,
}

/// Full application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Engine settings.
    pub engine: EngineConfig,
    /// Range provider settings.
    pub grafana: GrafanaSettings,
    /// Notifier settings.
    pub telegram: TelegramSettings,
    /// Command line of the report generator.
    pub report_command: String,
}

impl AppConfig {
    /// Report command used when `REPORT_COMMAND` is unset.
    pub const DEFAULT_REPORT_COMMAND: &'static str = "carwatch-report";

    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a numeric
    /// variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a numeric
    /// variable does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let require = |key: &str| get(key).ok_or_else(|| ConfigError::Missing(key.to_string()));

        let mut engine = EngineConfig::new(require("MQTT_HOST")?);
        if let Some(port) = get("MQTT_PORT") {
            engine = engine.with_port(parse(&port, "MQTT_PORT")?);
        }
        if let Some(car_id) = get("CAR_ID") {
            engine = engine.with_car_id(parse(&car_id, "CAR_ID")?);
        }
        if let Some(prefix) = get("TOPIC_PREFIX") {
            engine = engine.with_topic_prefix(prefix);
        }
        if let Some(username) = get("MQTT_USERNAME") {
            engine = engine.with_credentials(username, get("MQTT_PASSWORD").unwrap_or_default());
        }

        let grafana = GrafanaSettings {
            url: require("GRAFANA_URL")?,
            datasource_uid: require("GRAFANA_DATASOURCE_UID")?,
            token: get("GRAFANA_TOKEN"),
            query: get("GRAFANA_QUERY"),
        };

        let telegram = TelegramSettings {
            bot_token: require("TELEGRAM_BOT_TOKEN")?,
            chat_id: require("TELEGRAM_CHAT_ID")?,
        };

        Ok(Self {
            engine,
            grafana,
            telegram,
            report_command: get("REPORT_COMMAND")
                .unwrap_or_else(|| Self::DEFAULT_REPORT_COMMAND.to_string()),
        })
    }
}

fn parse<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
    })
}
