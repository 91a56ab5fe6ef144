// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for the tracked state dimensions and trigger kinds.
//!
//! Payloads on the state topics are opaque strings. Known values map to
//! named variants; anything else is kept verbatim in an `Other` variant so it
//! still compares by equality but never satisfies a transition guard.

mod charging_state;
mod trigger_kind;
mod vehicle_state;

pub use charging_state::ChargingState;
pub use trigger_kind::{StateDimension, TriggerKind};
pub use vehicle_state::VehicleState;
