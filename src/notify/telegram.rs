// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Telegram Bot API notifier.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

use crate::error::NotifyError;

use super::Notifier;

/// Settings for sending messages through a Telegram bot.
///
/// # Examples
///
/// ```
/// use carwatch::notify::TelegramConfig;
///
/// let config = TelegramConfig::new("123:abc", "-100200300");
/// assert_eq!(
///     config.send_message_url(),
///     "https://api.telegram.org/bot123:abc/sendMessage"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    api_base: String,
    bot_token: String,
    chat_id: String,
    timeout: Duration,
}

impl TelegramConfig {
    /// Public Bot API endpoint.
    pub const DEFAULT_API_BASE: &'static str = "https://api.telegram.org";
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration for the given bot token and target chat.
    #[must_use]
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            api_base: Self::DEFAULT_API_BASE.to_string(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the Bot API base URL (self-hosted Bot API servers, tests).
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the `sendMessage` endpoint.
    #[must_use]
    pub fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }

    /// Creates a notifier from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn into_notifier(self) -> Result<TelegramNotifier, NotifyError> {
        let client = Client::builder().timeout(self.timeout).build()?;
        Ok(TelegramNotifier {
            client,
            config: self,
        })
    }
}

/// [`Notifier`] that posts to a Telegram chat.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: Client,
    config: TelegramConfig,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

impl Notifier for TelegramNotifier {
    async fn send_text(&self, message: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(self.config.send_message_url())
            .json(&SendMessage {
                chat_id: &self.config.chat_id,
                text: message,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(chat_id = %self.config.chat_id, "Notification delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_base_override() {
        let config = TelegramConfig::new("tok", "42").with_api_base("http://127.0.0.1:9000/");
        assert_eq!(
            config.send_message_url(),
            "http://127.0.0.1:9000/bottok/sendMessage"
        );
    }

    #[test]
    fn payload_shape() {
        let payload = serde_json::to_value(SendMessage {
            chat_id: "42",
            text: "hello",
        })
        .unwrap();
        assert_eq!(payload, serde_json::json!({ "chat_id": "42", "text": "hello" }));
    }
}
