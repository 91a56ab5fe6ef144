// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `carwatch` daemon: runs the automation engine with the Grafana range
//! provider, the Telegram notifier and an external report command, all
//! configured from the environment.

use carwatch::action::CommandReportAction;
use carwatch::notify::TelegramConfig;
use carwatch::provider::GrafanaConfig;
use carwatch::{AppConfig, ConfigError, Engine};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> carwatch::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("carwatch=info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    let mut grafana = GrafanaConfig::new(&config.grafana.url, &config.grafana.datasource_uid);
    if let Some(token) = &config.grafana.token {
        grafana = grafana.with_token(token);
    }
    if let Some(query) = &config.grafana.query {
        grafana = grafana.with_query(query);
    }
    let provider = grafana.into_provider()?;

    let notifier =
        TelegramConfig::new(&config.telegram.bot_token, &config.telegram.chat_id).into_notifier()?;

    let reporter = CommandReportAction::from_command_line(&config.report_command)
        .ok_or_else(|| ConfigError::Missing("REPORT_COMMAND".to_string()))?;

    let engine = Engine::new(config.engine, provider, notifier, reporter);
    let transport = engine.transport()?;
    let stop = transport.handle();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutting down");
            if let Err(e) = stop.disconnect().await {
                tracing::error!(error = %e, "Failed to disconnect cleanly");
            }
        }
    });

    engine.run_on(transport).await
}
