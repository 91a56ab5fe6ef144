// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Range/statistics provider.
//!
//! The engine reads one thing from the data store: the current projected
//! range, battery levels and odometer of a vehicle. [`RangeStatsProvider`] is
//! the seam; [`GrafanaRangeProvider`] answers it through a Grafana datasource
//! query.

#[cfg(feature = "http")]
mod grafana;

#[cfg(feature = "http")]
pub use grafana::{GrafanaConfig, GrafanaRangeProvider};

use std::future::Future;

use crate::error::ProviderError;

/// Current range and battery statistics of a vehicle.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RangeStats {
    /// Projected range at 100% in kilometres.
    pub projected_range: f64,
    /// Average battery level in percent.
    pub avg_battery_level: f64,
    /// Average usable battery level in percent.
    pub avg_usable_battery_level: f64,
    /// Current odometer in kilometres.
    pub current_odometer: f64,
}

impl RangeStats {
    /// Usable range: projected range scaled by usable level, rounded.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn usable_range_km(&self) -> i64 {
        (self.projected_range * self.avg_usable_battery_level / 100.0).round() as i64
    }

    /// Usable battery level, rounded.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn usable_battery_level(&self) -> i64 {
        self.avg_usable_battery_level.round() as i64
    }
}

/// Source of range statistics for a vehicle.
pub trait RangeStatsProvider: Send + Sync + 'static {
    /// Fetches the current statistics for `car_id`.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` if the query fails or the result is unusable.
    fn range_stats(
        &self,
        car_id: u32,
    ) -> impl Future<Output = Result<RangeStats, ProviderError>> + Send;
}
