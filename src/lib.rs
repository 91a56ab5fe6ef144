// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `carwatch` - telemetry-driven automation for a TeslaMate vehicle.
//!
//! The engine subscribes to a vehicle's `state` and `charging_state` MQTT
//! topics, tracks both values over time and triggers side effects on the
//! transitions that matter:
//!
//! - **Drive finished** (`driving` → anything else): generate the drive report
//! - **Charge finished** (`Charging` → `Complete`/`Disconnected`): generate
//!   the charge report
//! - **Went offline**: capture a range/battery snapshot
//! - **Back online**: send a notification with the standby loss since the
//!   snapshot
//!
//! Each trigger kind is debounced and delayed independently so duplicate
//! deliveries and flapping states produce at most one action per window, and
//! the data store has time to catch up before a report is generated.
//!
//! # Quick Start
//!
//! ```no_run
//! use carwatch::action::CommandReportAction;
//! use carwatch::config::EngineConfig;
//! use carwatch::notify::TelegramConfig;
//! use carwatch::provider::GrafanaConfig;
//! use carwatch::Engine;
//!
//! #[tokio::main]
//! async fn main() -> carwatch::Result<()> {
//!     let provider = GrafanaConfig::new("http://grafana:3000", "TeslaMate")
//!         .with_token("glsa_xxx")
//!         .into_provider()?;
//!     let notifier = TelegramConfig::new("123:abc", "42").into_notifier()?;
//!     let reporter = CommandReportAction::new("carwatch-report");
//!
//!     let engine = Engine::new(
//!         EngineConfig::new("mosquitto").with_car_id(1),
//!         provider,
//!         notifier,
//!         reporter,
//!     );
//!     engine.run().await
//! }
//! ```

pub mod action;
pub mod composer;
pub mod config;
pub mod dispatcher;
mod engine;
pub mod error;
pub mod notify;
pub mod protocol;
pub mod provider;
pub mod scheduler;
pub mod state;
pub mod types;

pub use composer::SnapshotComposer;
pub use config::{AppConfig, EngineConfig};
pub use dispatcher::{DispatchOutcome, Rule, TransitionDispatcher};
pub use engine::Engine;
pub use error::{ActionError, ConfigError, Error, NotifyError, ProtocolError, ProviderError, Result};
pub use scheduler::{Scheduler, TriggerPolicy, TriggerWindow};
pub use state::{RangeSnapshot, StateTracker};
pub use types::{ChargingState, TriggerKind, VehicleState};
