// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Offline snapshot capture and online notification composition.
//!
//! Capture and compose are separated by however long the vehicle stays
//! offline, and either can fail on its own. The snapshot therefore lives in
//! the [`StateTracker`](crate::state::StateTracker), not in a closure.

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::Utc;

use crate::notify::Notifier;
use crate::provider::{RangeStats, RangeStatsProvider};
use crate::state::{RangeSnapshot, SharedTracker};

/// Captures range snapshots and composes the "back online" message.
///
/// Failures are logged and swallowed; neither operation retries.
pub struct SnapshotComposer<P, N> {
    tracker: SharedTracker,
    provider: Arc<P>,
    notifier: Arc<N>,
}

impl<P, N> SnapshotComposer<P, N>
where
    P: RangeStatsProvider,
    N: Notifier,
{
    /// Creates a composer writing snapshots into `tracker`.
    #[must_use]
    pub fn new(tracker: SharedTracker, provider: Arc<P>, notifier: Arc<N>) -> Self {
        Self {
            tracker,
            provider,
            notifier,
        }
    }

    /// Queries the provider and stores the result as the offline snapshot.
    ///
    /// On failure the previous snapshot (or none) is left in place.
    pub async fn capture_offline_snapshot(&self, car_id: u32) {
        let stats = match self.provider.range_stats(car_id).await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::error!(car_id, error = %e, "Failed to capture offline snapshot");
                return;
            }
        };

        let snapshot = RangeSnapshot::from_stats(&stats, Utc::now());
        tracing::info!(
            car_id,
            range_km = snapshot.range_km,
            battery_level = snapshot.battery_level,
            "Captured offline snapshot"
        );
        self.tracker.lock().set_last_offline_range(snapshot);
    }

    /// Queries current values, builds the online message and sends it.
    pub async fn compose_online_notification(&self, car_id: u32) {
        let stats = match self.provider.range_stats(car_id).await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::error!(car_id, error = %e, "Failed to query range for online notification");
                return;
            }
        };

        let snapshot = self.tracker.lock().last_offline_range().cloned();
        let message = online_message(&stats, snapshot.as_ref());

        match self.notifier.send_text(&message).await {
            Ok(()) => tracing::info!(car_id, "Online notification sent"),
            Err(e) => tracing::error!(car_id, error = %e, "Failed to send online notification"),
        }
    }
}

/// Builds the online notification text.
///
/// The standby loss line lists only the positive losses relative to
/// `snapshot`, and is omitted when there are none.
///
/// # Examples
///
/// ```
/// use carwatch::composer::online_message;
/// use carwatch::provider::RangeStats;
///
/// let stats = RangeStats {
///     projected_range: 500.0,
///     avg_battery_level: 61.0,
///     avg_usable_battery_level: 60.0,
///     current_odometer: 1_000.0,
/// };
/// let message = online_message(&stats, None);
/// assert!(message.contains("Range: 300 km"));
/// assert!(message.contains("Battery: 60%"));
/// assert!(!message.contains("Standby loss"));
/// ```
#[must_use]
pub fn online_message(current: &RangeStats, snapshot: Option<&RangeSnapshot>) -> String {
    let range = current.usable_range_km();
    let level = current.usable_battery_level();

    let mut message = format!("🔌 Car is online\nRange: {range} km\nBattery: {level}%");

    if let Some(snapshot) = snapshot {
        let range_loss = snapshot.range_km - range;
        let level_loss = snapshot.battery_level - level;

        let mut losses = Vec::with_capacity(2);
        if range_loss > 0 {
            losses.push(format!("{range_loss} km"));
        }
        if level_loss > 0 {
            losses.push(format!("{level_loss}%"));
        }
        if !losses.is_empty() {
            let _ = write!(message, "\nStandby loss: {}", losses.join(", "));
        }
    }

    message
}
