// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Range snapshot captured at a state boundary.

use chrono::{DateTime, Utc};

use crate::provider::RangeStats;

/// Estimated range and charge level at the instant the vehicle went offline.
///
/// # Examples
///
/// ```
/// use carwatch::provider::RangeStats;
/// use carwatch::state::RangeSnapshot;
///
/// let stats = RangeStats {
///     projected_range: 375.0,
///     avg_battery_level: 81.0,
///     avg_usable_battery_level: 80.0,
///     current_odometer: 42_000.0,
/// };
/// let snapshot = RangeSnapshot::from_stats(&stats, chrono::Utc::now());
/// assert_eq!(snapshot.range_km, 300);
/// assert_eq!(snapshot.battery_level, 80);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RangeSnapshot {
    /// Usable range in kilometres.
    pub range_km: i64,
    /// Usable battery level in percent.
    pub battery_level: i64,
    /// When the snapshot was taken.
    pub captured_at: DateTime<Utc>,
}

impl RangeSnapshot {
    /// Creates a snapshot from a provider reading.
    ///
    /// The range is the projected range scaled by the usable battery level,
    /// rounded to the nearest kilometre.
    #[must_use]
    pub fn from_stats(stats: &RangeStats, captured_at: DateTime<Utc>) -> Self {
        Self {
            range_km: stats.usable_range_km(),
            battery_level: stats.usable_battery_level(),
            captured_at,
        }
    }
}
