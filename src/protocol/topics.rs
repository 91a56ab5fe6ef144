// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Topic names for one vehicle.

use crate::types::StateDimension;

/// The two state topics of a vehicle.
///
/// # Examples
///
/// ```
/// use carwatch::protocol::CarTopics;
/// use carwatch::types::StateDimension;
///
/// let topics = CarTopics::new("teslamate", 1);
/// assert_eq!(topics.state(), "teslamate/cars/1/state");
/// assert_eq!(
///     topics.dimension("teslamate/cars/1/charging_state"),
///     Some(StateDimension::Charging)
/// );
/// assert_eq!(topics.dimension("teslamate/cars/1/speed"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarTopics {
    state: String,
    charging_state: String,
}

impl CarTopics {
    /// Derives the topics from a prefix and vehicle id.
    #[must_use]
    pub fn new(prefix: &str, car_id: u32) -> Self {
        let prefix = prefix.trim_end_matches('/');
        Self {
            state: format!("{prefix}/cars/{car_id}/state"),
            charging_state: format!("{prefix}/cars/{car_id}/charging_state"),
        }
    }

    /// Returns the vehicle state topic.
    #[must_use]
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Returns the charging state topic.
    #[must_use]
    pub fn charging_state(&self) -> &str {
        &self.charging_state
    }

    /// Returns both topics, in subscription order.
    #[must_use]
    pub fn all(&self) -> [&str; 2] {
        [&self.state, &self.charging_state]
    }

    /// Maps a topic to the state dimension it drives.
    ///
    /// Returns `None` for any other topic.
    #[must_use]
    pub fn dimension(&self, topic: &str) -> Option<StateDimension> {
        if topic == self.state {
            Some(StateDimension::Vehicle)
        } else if topic == self.charging_state {
            Some(StateDimension::Charging)
        } else {
            None
        }
    }
}
