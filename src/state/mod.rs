// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Engine state tracking.
//!
//! The [`StateTracker`] is the single source of truth for the engine: the
//! current value of both state dimensions, the last time each trigger kind
//! fired, and the snapshot captured when the vehicle last went offline.
//!
//! # Examples
//!
//! ```
//! use carwatch::state::StateTracker;
//! use carwatch::types::VehicleState;
//!
//! let mut tracker = StateTracker::new();
//!
//! // Setting returns the previous value
//! let prev = tracker.set_vehicle_state(VehicleState::Online);
//! assert_eq!(prev, None);
//!
//! let prev = tracker.set_vehicle_state(VehicleState::Offline);
//! assert_eq!(prev, Some(VehicleState::Online));
//! ```

mod snapshot;
mod tracker;

pub use snapshot::RangeSnapshot;
pub use tracker::{SharedTracker, StateTracker};
