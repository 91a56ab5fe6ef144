// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;

/// An automation category with its own debounce/delay window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    /// Generate the drive report after a drive ends.
    Drive,
    /// Generate the charge report after a charging session ends.
    Charge,
    /// Send the "back online" notification.
    Online,
}

impl TriggerKind {
    /// All trigger kinds.
    pub const ALL: [Self; 3] = [Self::Drive, Self::Charge, Self::Online];

    /// Returns the name passed to the report generator and used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Drive => "drive",
            Self::Charge => "charge",
            Self::Online => "online",
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The independently tracked state dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateDimension {
    /// Driven by the `state` topic.
    Vehicle,
    /// Driven by the `charging_state` topic.
    Charging,
}

impl fmt::Display for StateDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vehicle => f.write_str("vehicle"),
            Self::Charging => f.write_str("charging"),
        }
    }
}
