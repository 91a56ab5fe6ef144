// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The engine's state aggregate.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::types::{ChargingState, TriggerKind, VehicleState};

use super::RangeSnapshot;

/// Tracker shared between the dispatcher and the work it spawns.
///
/// Writes from the dispatcher happen synchronously inside message handling;
/// the lock is never held across an `.await`.
pub type SharedTracker = Arc<Mutex<StateTracker>>;

/// Current state of one vehicle plus trigger bookkeeping.
///
/// All fields start unknown. Nothing is persisted across restarts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateTracker {
    /// Last value seen on the vehicle state topic.
    vehicle_state: Option<VehicleState>,
    /// Last value seen on the charging state topic.
    charging_state: Option<ChargingState>,
    /// When the drive report last fired.
    last_drive_trigger_at: Option<Instant>,
    /// When the charge report last fired.
    last_charge_trigger_at: Option<Instant>,
    /// When the online notification last fired.
    last_online_trigger_at: Option<Instant>,
    /// Snapshot taken when the vehicle last went offline.
    last_offline_range: Option<RangeSnapshot>,
}

impl StateTracker {
    /// Creates a tracker with every field unknown.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a fresh tracker for sharing.
    #[must_use]
    pub fn shared() -> SharedTracker {
        Arc::new(Mutex::new(Self::new()))
    }

    // ========== State dimensions ==========

    /// Returns the current vehicle state.
    #[must_use]
    pub fn vehicle_state(&self) -> Option<&VehicleState> {
        self.vehicle_state.as_ref()
    }

    /// Overwrites the vehicle state and returns the previous value.
    pub fn set_vehicle_state(&mut self, next: VehicleState) -> Option<VehicleState> {
        self.vehicle_state.replace(next)
    }

    /// Returns the current charging state.
    #[must_use]
    pub fn charging_state(&self) -> Option<&ChargingState> {
        self.charging_state.as_ref()
    }

    /// Overwrites the charging state and returns the previous value.
    pub fn set_charging_state(&mut self, next: ChargingState) -> Option<ChargingState> {
        self.charging_state.replace(next)
    }

    // ========== Trigger bookkeeping ==========

    /// Returns when the given trigger kind last fired.
    #[must_use]
    pub fn last_trigger_at(&self, kind: TriggerKind) -> Option<Instant> {
        match kind {
            TriggerKind::Drive => self.last_drive_trigger_at,
            TriggerKind::Charge => self.last_charge_trigger_at,
            TriggerKind::Online => self.last_online_trigger_at,
        }
    }

    /// Records that the given trigger kind fired at `at`.
    ///
    /// Timestamps never move backwards: an `at` older than the stored value
    /// is ignored.
    pub fn record_trigger(&mut self, kind: TriggerKind, at: Instant) {
        let slot = match kind {
            TriggerKind::Drive => &mut self.last_drive_trigger_at,
            TriggerKind::Charge => &mut self.last_charge_trigger_at,
            TriggerKind::Online => &mut self.last_online_trigger_at,
        };
        *slot = Some(slot.map_or(at, |prev| prev.max(at)));
    }

    // ========== Offline snapshot ==========

    /// Returns the snapshot captured when the vehicle last went offline.
    #[must_use]
    pub fn last_offline_range(&self) -> Option<&RangeSnapshot> {
        self.last_offline_range.as_ref()
    }

    /// Replaces the offline snapshot.
    pub fn set_last_offline_range(&mut self, snapshot: RangeSnapshot) {
        self.last_offline_range = Some(snapshot);
    }
}
