// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! High-level power/activity state of the vehicle.

use std::fmt;

/// The vehicle's power/activity state as published on the `state` topic.
///
/// # Examples
///
/// ```
/// use carwatch::types::VehicleState;
///
/// assert_eq!(VehicleState::from("driving"), VehicleState::Driving);
/// assert_eq!(VehicleState::Offline.as_str(), "offline");
///
/// // Unknown payloads are kept as-is.
/// let other = VehicleState::from("parked");
/// assert_eq!(other.as_str(), "parked");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VehicleState {
    /// Awake and reachable.
    Online,
    /// Sleeping.
    Asleep,
    /// Charging.
    Charging,
    /// Being driven.
    Driving,
    /// Logging suspended, waiting to fall asleep.
    Suspended,
    /// Not reachable.
    Offline,
    /// Installing a software update.
    Updating,
    /// Any payload not listed above, stored verbatim.
    Other(String),
}

impl VehicleState {
    /// Returns the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Online => "online",
            Self::Asleep => "asleep",
            Self::Charging => "charging",
            Self::Driving => "driving",
            Self::Suspended => "suspended",
            Self::Offline => "offline",
            Self::Updating => "updating",
            Self::Other(raw) => raw,
        }
    }
}

impl From<&str> for VehicleState {
    fn from(payload: &str) -> Self {
        match payload {
            "online" => Self::Online,
            "asleep" => Self::Asleep,
            "charging" => Self::Charging,
            "driving" => Self::Driving,
            "suspended" => Self::Suspended,
            "offline" => Self::Offline,
            "updating" => Self::Updating,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for VehicleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
