// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The automation engine for one vehicle.
//!
//! An [`Engine`] owns exactly one [`StateTracker`](crate::state::StateTracker)
//! and wires it to the dispatcher, scheduler and composer. State lives for
//! the lifetime of the engine; a new engine starts with everything unknown.

use std::sync::Arc;

use crate::action::ReportAction;
use crate::composer::SnapshotComposer;
use crate::config::EngineConfig;
use crate::dispatcher::TransitionDispatcher;
use crate::notify::Notifier;
use crate::provider::RangeStatsProvider;
use crate::scheduler::Scheduler;
use crate::state::{SharedTracker, StateTracker};

#[cfg(feature = "mqtt")]
use crate::error::ProtocolError;
#[cfg(feature = "mqtt")]
use crate::protocol::MqttTransport;

/// Telemetry-driven automation engine.
///
/// # Examples
///
/// ```ignore
/// use carwatch::{Engine, config::EngineConfig};
///
/// let engine = Engine::new(EngineConfig::new("mosquitto"), provider, notifier, reporter);
/// let transport = engine.transport()?;
/// let stop = transport.handle();
/// engine.run_on(transport).await?;
/// ```
pub struct Engine<P, N, R> {
    config: EngineConfig,
    dispatcher: TransitionDispatcher<P, N, R>,
}

impl<P, N, R> Engine<P, N, R>
where
    P: RangeStatsProvider,
    N: Notifier,
    R: ReportAction,
{
    /// Creates an engine using the tokio clock and timer.
    #[must_use]
    pub fn new(config: EngineConfig, provider: P, notifier: N, reporter: R) -> Self {
        let scheduler = Scheduler::new(*config.trigger_policy());
        Self::with_scheduler(config, scheduler, provider, notifier, reporter)
    }

    /// Creates an engine with a custom scheduler (injected clock or timer).
    #[must_use]
    pub fn with_scheduler(
        config: EngineConfig,
        scheduler: Scheduler,
        provider: P,
        notifier: N,
        reporter: R,
    ) -> Self {
        let tracker = StateTracker::shared();
        let composer = Arc::new(SnapshotComposer::new(
            Arc::clone(&tracker),
            Arc::new(provider),
            Arc::new(notifier),
        ));
        let dispatcher = TransitionDispatcher::new(
            config.car_id(),
            config.topics(),
            tracker,
            scheduler,
            composer,
            Arc::new(reporter),
        );

        Self { config, dispatcher }
    }

    /// Returns the engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the engine's state tracker.
    #[must_use]
    pub fn tracker(&self) -> &SharedTracker {
        self.dispatcher.tracker()
    }

    /// Returns the dispatcher, for feeding messages without a transport.
    #[must_use]
    pub fn dispatcher(&self) -> &TransitionDispatcher<P, N, R> {
        &self.dispatcher
    }
}

#[cfg(feature = "mqtt")]
impl<P, N, R> Engine<P, N, R>
where
    P: RangeStatsProvider,
    N: Notifier,
    R: ReportAction,
{
    /// Builds the MQTT transport described by the configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the broker host is empty.
    pub fn transport(&self) -> Result<MqttTransport, ProtocolError> {
        let mut builder = MqttTransport::builder()
            .host(self.config.host())
            .port(self.config.port())
            .keep_alive(self.config.keep_alive())
            .topics(self.config.topics())
            .reconnection(self.config.reconnection().clone());
        if let Some((username, password)) = self.config.credentials() {
            builder = builder.credentials(username, password);
        }
        builder.build()
    }

    /// Connects to the broker and processes messages until disconnected.
    ///
    /// # Errors
    ///
    /// Returns error if the transport cannot be built or gives up
    /// reconnecting.
    pub async fn run(self) -> crate::Result<()> {
        let transport = self.transport()?;
        self.run_on(transport).await
    }

    /// Processes messages from `transport` until it stops.
    ///
    /// # Errors
    ///
    /// Returns error if the transport gives up reconnecting.
    pub async fn run_on(mut self, transport: MqttTransport) -> crate::Result<()> {
        tracing::info!(
            car_id = self.config.car_id(),
            state = %transport.topics().state(),
            charging_state = %transport.topics().charging_state(),
            "Starting automation engine"
        );
        transport.run(&mut self.dispatcher).await?;
        Ok(())
    }
}

impl<P, N, R> std::fmt::Debug for Engine<P, N, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
