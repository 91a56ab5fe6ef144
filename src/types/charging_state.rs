// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Charging state of the vehicle.

use std::fmt;

/// The charging state as published on the `charging_state` topic.
///
/// Independent of [`VehicleState`](super::VehicleState).
///
/// # Examples
///
/// ```
/// use carwatch::types::ChargingState;
///
/// assert_eq!(ChargingState::from("Complete"), ChargingState::Complete);
/// assert!(ChargingState::Disconnected.ends_session());
/// assert!(!ChargingState::Starting.ends_session());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChargingState {
    /// Energy is flowing.
    Charging,
    /// Charge limit reached.
    Complete,
    /// Cable unplugged.
    Disconnected,
    /// Plugged in but the charger delivers no power.
    NoPower,
    /// Charging stopped by the user or schedule.
    Stopped,
    /// Charging session is starting.
    Starting,
    /// Any payload not listed above, stored verbatim.
    Other(String),
}

impl ChargingState {
    /// Returns the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Charging => "Charging",
            Self::Complete => "Complete",
            Self::Disconnected => "Disconnected",
            Self::NoPower => "NoPower",
            Self::Stopped => "Stopped",
            Self::Starting => "Starting",
            Self::Other(raw) => raw,
        }
    }

    /// Returns true if leaving `Charging` for this state finishes a session.
    #[must_use]
    pub fn ends_session(&self) -> bool {
        matches!(self, Self::Complete | Self::Disconnected)
    }
}

impl From<&str> for ChargingState {
    fn from(payload: &str) -> Self {
        match payload {
            "Charging" => Self::Charging,
            "Complete" => Self::Complete,
            "Disconnected" => Self::Disconnected,
            "NoPower" => Self::NoPower,
            "Stopped" => Self::Stopped,
            "Starting" => Self::Starting,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ChargingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_payloads() {
        assert_eq!(ChargingState::from("Charging"), ChargingState::Charging);
        assert_eq!(ChargingState::from("NoPower"), ChargingState::NoPower);
        assert_eq!(ChargingState::from("Stopped"), ChargingState::Stopped);
    }

    #[test]
    fn only_complete_and_disconnected_end_a_session() {
        let ending: Vec<_> = [
            ChargingState::Charging,
            ChargingState::Complete,
            ChargingState::Disconnected,
            ChargingState::NoPower,
            ChargingState::Stopped,
            ChargingState::Starting,
            ChargingState::Other("Complete ".to_string()),
        ]
        .into_iter()
        .filter(ChargingState::ends_session)
        .collect();

        assert_eq!(
            ending,
            vec![ChargingState::Complete, ChargingState::Disconnected]
        );
    }
}
