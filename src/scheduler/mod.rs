// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Debounce/delay scheduling of triggered actions.
//!
//! Every trigger kind has a [`TriggerWindow`]: a debounce window (minimum
//! time between two accepted triggers of that kind) and a delay window (how
//! long to wait before running the action, so the data store can catch up).
//!
//! ```text
//!   qualifying transition
//!            ↓
//!   now - last_trigger_at[kind] < debounce ?  ── yes ──→ dropped
//!            ↓ no
//!   last_trigger_at[kind] = now
//!            ↓
//!   timer: run action after delay
//! ```
//!
//! The clock and timer are injected so windows can be tested without waiting
//! on the wall clock.

mod clock;
mod policy;
mod timer;

pub use clock::{Clock, ManualClock, TokioClock};
pub use policy::{TriggerPolicy, TriggerWindow};
pub use timer::{ScheduledTask, TaskHandle, Timer, TokioTimer};

use std::future::Future;
use std::sync::Arc;

use crate::state::StateTracker;
use crate::types::TriggerKind;

/// Accepts or drops triggers per kind and runs accepted ones after a delay.
///
/// Scheduled work is fire-and-forget: there is no cancellation, and the work
/// is expected to log its own failures.
#[derive(Clone)]
pub struct Scheduler {
    policy: TriggerPolicy,
    clock: Arc<dyn Clock>,
    timer: Arc<dyn Timer>,
}

impl Scheduler {
    /// Creates a scheduler on the tokio clock and timer.
    #[must_use]
    pub fn new(policy: TriggerPolicy) -> Self {
        Self {
            policy,
            clock: Arc::new(TokioClock),
            timer: Arc::new(TokioTimer),
        }
    }

    /// Replaces the clock used for debounce decisions.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the timer used to delay actions.
    #[must_use]
    pub fn with_timer(mut self, timer: Arc<dyn Timer>) -> Self {
        self.timer = timer;
        self
    }

    /// Returns the trigger policy.
    #[must_use]
    pub fn policy(&self) -> &TriggerPolicy {
        &self.policy
    }

    /// Schedules `task` for `kind` unless it is inside the debounce window.
    ///
    /// The trigger timestamp is recorded immediately, so a burst arriving
    /// before the delayed task runs is debounced against this call.
    ///
    /// Returns `None` if the trigger was debounced.
    pub fn schedule<F>(
        &self,
        tracker: &mut StateTracker,
        kind: TriggerKind,
        task: F,
    ) -> Option<TaskHandle>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let window = self.policy.window(kind);
        let now = self.clock.now();

        if let Some(last) = tracker.last_trigger_at(kind) {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < window.debounce() {
                tracing::warn!(
                    %kind,
                    ?elapsed,
                    debounce = ?window.debounce(),
                    "Trigger debounced"
                );
                return None;
            }
        }

        tracker.record_trigger(kind, now);
        tracing::info!(
            %kind,
            delay = ?window.delay(),
            "Trigger scheduled"
        );
        Some(self.timer.schedule(window.delay(), Box::pin(task)))
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
