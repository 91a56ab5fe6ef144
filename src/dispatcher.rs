// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transition dispatcher.
//!
//! Maps a topic to a state dimension, swaps the new value into the tracker
//! and evaluates the transition rules against the previous value, in this
//! order:
//!
//! | Rule | Guard | Action |
//! |---|---|---|
//! | [`Rule::CaptureOffline`] | `next == offline && prev != offline` | capture snapshot now |
//! | [`Rule::NotifyOnline`] | `prev == offline && next != offline` | schedule online trigger |
//! | [`Rule::DriveFinished`] | `prev == driving && next != driving` | schedule drive trigger |
//! | [`Rule::ChargeFinished`] | `prev == Charging && next in {Complete, Disconnected}` | schedule charge trigger |
//!
//! A repeated payload leaves `prev == next`, so no guard holds.

use std::future::Future;
use std::sync::Arc;

use crate::action::ReportAction;
use crate::composer::SnapshotComposer;
use crate::notify::Notifier;
use crate::protocol::{CarTopics, ConnectionEvent, MessageHandler};
use crate::provider::RangeStatsProvider;
use crate::scheduler::{Scheduler, TaskHandle};
use crate::state::{SharedTracker, StateTracker};
use crate::types::{ChargingState, StateDimension, TriggerKind, VehicleState};

/// A transition rule whose guard held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// The vehicle went offline.
    CaptureOffline,
    /// The vehicle left offline.
    NotifyOnline,
    /// A drive ended.
    DriveFinished,
    /// A charging session ended.
    ChargeFinished,
}

/// What one message caused.
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    /// Dimension the topic mapped to, if any.
    pub dimension: Option<StateDimension>,
    /// Rules whose guard held, in evaluation order.
    pub fired: Vec<Rule>,
    /// Trigger kinds that passed the debounce check.
    pub scheduled: Vec<TriggerKind>,
    /// Handles of work started by this message.
    pub tasks: Vec<TaskHandle>,
}

impl DispatchOutcome {
    /// Waits for every task started by this message.
    pub async fn join(self) {
        for task in self.tasks {
            task.join().await;
        }
    }
}

/// Turns inbound state messages into tracker updates and scheduled work.
pub struct TransitionDispatcher<P, N, R> {
    car_id: u32,
    topics: CarTopics,
    tracker: SharedTracker,
    scheduler: Scheduler,
    composer: Arc<SnapshotComposer<P, N>>,
    reporter: Arc<R>,
}

impl<P, N, R> TransitionDispatcher<P, N, R>
where
    P: RangeStatsProvider,
    N: Notifier,
    R: ReportAction,
{
    /// Creates a dispatcher for one vehicle.
    #[must_use]
    pub fn new(
        car_id: u32,
        topics: CarTopics,
        tracker: SharedTracker,
        scheduler: Scheduler,
        composer: Arc<SnapshotComposer<P, N>>,
        reporter: Arc<R>,
    ) -> Self {
        Self {
            car_id,
            topics,
            tracker,
            scheduler,
            composer,
            reporter,
        }
    }

    /// Returns the tracker this dispatcher mutates.
    #[must_use]
    pub fn tracker(&self) -> &SharedTracker {
        &self.tracker
    }

    /// Handles one message.
    ///
    /// Every tracker write happens here, synchronously; side effects run on
    /// spawned tasks whose handles are returned in the outcome.
    pub fn dispatch(&self, topic: &str, payload: &str) -> DispatchOutcome {
        let Some(dimension) = self.topics.dimension(topic) else {
            tracing::trace!(topic = %topic, "Ignoring message on unknown topic");
            return DispatchOutcome::default();
        };

        let mut outcome = DispatchOutcome {
            dimension: Some(dimension),
            ..DispatchOutcome::default()
        };

        let mut tracker = self.tracker.lock();
        match dimension {
            StateDimension::Vehicle => {
                let next = VehicleState::from(payload);
                let prev = tracker.set_vehicle_state(next.clone());
                tracing::debug!(car_id = self.car_id, ?prev, %next, "Vehicle state");
                self.on_vehicle_transition(&mut tracker, prev.as_ref(), &next, &mut outcome);
            }
            StateDimension::Charging => {
                let next = ChargingState::from(payload);
                let prev = tracker.set_charging_state(next.clone());
                tracing::debug!(car_id = self.car_id, ?prev, %next, "Charging state");
                self.on_charging_transition(&mut tracker, prev.as_ref(), &next, &mut outcome);
            }
        }

        outcome
    }

    fn on_vehicle_transition(
        &self,
        tracker: &mut StateTracker,
        prev: Option<&VehicleState>,
        next: &VehicleState,
        outcome: &mut DispatchOutcome,
    ) {
        let was_offline = prev == Some(&VehicleState::Offline);
        let is_offline = *next == VehicleState::Offline;

        if is_offline && !was_offline {
            outcome.fired.push(Rule::CaptureOffline);
            tracing::info!(car_id = self.car_id, "Vehicle went offline, capturing range");
            // Not awaited: a quick offline -> online may compose before this lands
            let composer = Arc::clone(&self.composer);
            let car_id = self.car_id;
            outcome.tasks.push(TaskHandle::spawn(async move {
                composer.capture_offline_snapshot(car_id).await;
            }));
        }

        if was_offline && !is_offline {
            outcome.fired.push(Rule::NotifyOnline);
            let composer = Arc::clone(&self.composer);
            let car_id = self.car_id;
            self.schedule(tracker, TriggerKind::Online, outcome, async move {
                composer.compose_online_notification(car_id).await;
            });
        }

        if prev == Some(&VehicleState::Driving) && *next != VehicleState::Driving {
            outcome.fired.push(Rule::DriveFinished);
            let task = report_task(Arc::clone(&self.reporter), self.car_id, TriggerKind::Drive);
            self.schedule(tracker, TriggerKind::Drive, outcome, task);
        }
    }

    fn on_charging_transition(
        &self,
        tracker: &mut StateTracker,
        prev: Option<&ChargingState>,
        next: &ChargingState,
        outcome: &mut DispatchOutcome,
    ) {
        if prev == Some(&ChargingState::Charging) && next.ends_session() {
            outcome.fired.push(Rule::ChargeFinished);
            let task = report_task(Arc::clone(&self.reporter), self.car_id, TriggerKind::Charge);
            self.schedule(tracker, TriggerKind::Charge, outcome, task);
        }
    }

    fn schedule<F>(
        &self,
        tracker: &mut StateTracker,
        kind: TriggerKind,
        outcome: &mut DispatchOutcome,
        task: F,
    ) where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Some(handle) = self.scheduler.schedule(tracker, kind, task) {
            outcome.scheduled.push(kind);
            outcome.tasks.push(handle);
        }
    }
}

/// Builds the work that runs the report generator and logs the result.
fn report_task<R: ReportAction>(
    reporter: Arc<R>,
    car_id: u32,
    kind: TriggerKind,
) -> impl Future<Output = ()> + Send {
    async move {
        match reporter.run(kind).await {
            Ok(output) => tracing::info!(car_id, %kind, %output, "Report generated"),
            Err(e) => tracing::error!(car_id, %kind, error = %e, "Report generation failed"),
        }
    }
}

impl<P, N, R> MessageHandler for TransitionDispatcher<P, N, R>
where
    P: RangeStatsProvider,
    N: Notifier,
    R: ReportAction,
{
    fn on_message(&mut self, topic: &str, payload: &str) {
        // Handles are detached; the work keeps running.
        drop(self.dispatch(topic, payload));
    }

    fn on_connection_event(&mut self, event: &ConnectionEvent) {
        match event {
            ConnectionEvent::Connected => {
                tracing::info!(car_id = self.car_id, "Listening for state changes");
            }
            ConnectionEvent::Disconnected { reason } => {
                tracing::warn!(car_id = self.car_id, %reason, "Telemetry connection lost");
            }
            ConnectionEvent::Reconnecting { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use parking_lot::Mutex;

    use super::*;
    use crate::error::{ActionError, NotifyError, ProviderError};
    use crate::provider::RangeStats;
    use crate::scheduler::TriggerPolicy;

    const STATE: &str = "teslamate/cars/1/state";
    const CHARGING: &str = "teslamate/cars/1/charging_state";

    struct StubProvider;

    impl RangeStatsProvider for StubProvider {
        async fn range_stats(&self, _car_id: u32) -> Result<RangeStats, ProviderError> {
            Ok(RangeStats {
                projected_range: 375.0,
                avg_battery_level: 80.0,
                avg_usable_battery_level: 80.0,
                current_odometer: 0.0,
            })
        }
    }

    #[derive(Default)]
    struct StubNotifier {
        sent: Mutex<Vec<String>>,
    }

    impl Notifier for StubNotifier {
        async fn send_text(&self, message: &str) -> Result<(), NotifyError> {
            self.sent.lock().push(message.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct StubReporter {
        runs: Mutex<Vec<TriggerKind>>,
        failures: AtomicUsize,
    }

    impl ReportAction for StubReporter {
        async fn run(&self, kind: TriggerKind) -> Result<String, ActionError> {
            self.runs.lock().push(kind);
            if self.failures.load(Ordering::SeqCst) > 0 {
                self.failures.fetch_sub(1, Ordering::SeqCst);
                return Err(ActionError::NonZeroExit {
                    code: Some(1),
                    stderr: "boom".to_string(),
                });
            }
            Ok(format!("{kind} report"))
        }
    }

    type TestDispatcher = TransitionDispatcher<StubProvider, StubNotifier, StubReporter>;

    fn dispatcher() -> (TestDispatcher, Arc<StubNotifier>, Arc<StubReporter>) {
        let tracker = StateTracker::shared();
        let notifier = Arc::new(StubNotifier::default());
        let reporter = Arc::new(StubReporter::default());
        let composer = Arc::new(SnapshotComposer::new(
            Arc::clone(&tracker),
            Arc::new(StubProvider),
            Arc::clone(&notifier),
        ));
        let dispatcher = TransitionDispatcher::new(
            1,
            CarTopics::new("teslamate", 1),
            tracker,
            Scheduler::new(TriggerPolicy::default()),
            composer,
            Arc::clone(&reporter),
        );
        (dispatcher, notifier, reporter)
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_topic_is_a_no_op() {
        let (dispatcher, _, _) = dispatcher();

        let outcome = dispatcher.dispatch("teslamate/cars/1/speed", "42");

        assert!(outcome.dimension.is_none());
        assert!(outcome.fired.is_empty());
        assert!(dispatcher.tracker().lock().vehicle_state().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn first_message_fires_nothing() {
        let (dispatcher, _, _) = dispatcher();

        let outcome = dispatcher.dispatch(STATE, "online");

        assert!(outcome.fired.is_empty());
        assert!(outcome.tasks.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn drive_end_schedules_report() {
        let (dispatcher, _, reporter) = dispatcher();
        dispatcher.dispatch(STATE, "driving");

        let outcome = dispatcher.dispatch(STATE, "asleep");
        assert_eq!(outcome.fired, vec![Rule::DriveFinished]);
        assert_eq!(outcome.scheduled, vec![TriggerKind::Drive]);

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert!(reporter.runs.lock().is_empty());

        outcome.join().await;
        assert_eq!(*reporter.runs.lock(), vec![TriggerKind::Drive]);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_payload_fires_nothing() {
        let (dispatcher, _, _) = dispatcher();
        dispatcher.dispatch(STATE, "driving");

        for _ in 0..3 {
            let outcome = dispatcher.dispatch(STATE, "driving");
            assert!(outcome.fired.is_empty());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn charge_end_on_complete_and_disconnected() {
        for end in ["Complete", "Disconnected"] {
            let (dispatcher, _, _) = dispatcher();
            dispatcher.dispatch(CHARGING, "Charging");

            let outcome = dispatcher.dispatch(CHARGING, end);

            assert_eq!(outcome.fired, vec![Rule::ChargeFinished], "{end}");
            assert_eq!(outcome.scheduled, vec![TriggerKind::Charge]);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn charge_to_other_states_fires_nothing() {
        for other in ["Starting", "Stopped", "NoPower", "garbage"] {
            let (dispatcher, _, _) = dispatcher();
            dispatcher.dispatch(CHARGING, "Charging");

            let outcome = dispatcher.dispatch(CHARGING, other);

            assert!(outcome.fired.is_empty(), "{other}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn vehicle_charging_does_not_drive_charge_rules() {
        let (dispatcher, _, _) = dispatcher();
        dispatcher.dispatch(STATE, "charging");

        let outcome = dispatcher.dispatch(CHARGING, "Complete");

        assert!(outcome.fired.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn offline_captures_and_online_notifies() {
        let (dispatcher, notifier, _) = dispatcher();
        dispatcher.dispatch(STATE, "online");

        let offline = dispatcher.dispatch(STATE, "offline");
        assert_eq!(offline.fired, vec![Rule::CaptureOffline]);
        assert!(offline.scheduled.is_empty());
        offline.join().await;
        assert_eq!(
            dispatcher
                .tracker()
                .lock()
                .last_offline_range()
                .map(|s| s.range_km),
            Some(300)
        );

        let online = dispatcher.dispatch(STATE, "online");
        assert_eq!(online.fired, vec![Rule::NotifyOnline]);
        online.join().await;
        assert_eq!(notifier.sent.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn offline_to_asleep_also_notifies() {
        let (dispatcher, _, _) = dispatcher();
        dispatcher.dispatch(STATE, "offline");

        let outcome = dispatcher.dispatch(STATE, "asleep");

        assert_eq!(outcome.fired, vec![Rule::NotifyOnline]);
    }

    #[tokio::test(start_paused = true)]
    async fn driving_to_offline_fires_capture_then_drive() {
        let (dispatcher, _, _) = dispatcher();
        dispatcher.dispatch(STATE, "driving");

        let outcome = dispatcher.dispatch(STATE, "offline");

        assert_eq!(
            outcome.fired,
            vec![Rule::CaptureOffline, Rule::DriveFinished]
        );
        assert_eq!(outcome.scheduled, vec![TriggerKind::Drive]);
    }

    #[tokio::test(start_paused = true)]
    async fn drives_inside_debounce_window_report_once() {
        let (dispatcher, _, reporter) = dispatcher();

        let mut tasks = Vec::new();
        for _ in 0..3 {
            dispatcher.dispatch(STATE, "driving");
            let outcome = dispatcher.dispatch(STATE, "online");
            tasks.extend(outcome.tasks);
            tokio::time::advance(Duration::from_secs(10)).await;
        }
        for task in tasks {
            task.join().await;
        }

        assert_eq!(reporter.runs.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn drives_outside_debounce_window_each_report() {
        let (dispatcher, _, reporter) = dispatcher();

        dispatcher.dispatch(STATE, "driving");
        let first = dispatcher.dispatch(STATE, "online");
        tokio::time::advance(Duration::from_secs(61)).await;
        dispatcher.dispatch(STATE, "driving");
        let second = dispatcher.dispatch(STATE, "online");

        assert_eq!(first.scheduled, vec![TriggerKind::Drive]);
        assert_eq!(second.scheduled, vec![TriggerKind::Drive]);
        first.join().await;
        second.join().await;
        assert_eq!(reporter.runs.lock().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failing_report_does_not_block_later_messages() {
        let (dispatcher, _, reporter) = dispatcher();
        reporter.failures.store(1, Ordering::SeqCst);

        dispatcher.dispatch(CHARGING, "Charging");
        dispatcher.dispatch(CHARGING, "Complete").join().await;

        tokio::time::advance(Duration::from_secs(60)).await;
        dispatcher.dispatch(CHARGING, "Charging");
        dispatcher.dispatch(CHARGING, "Disconnected").join().await;

        assert_eq!(
            *reporter.runs.lock(),
            vec![TriggerKind::Charge, TriggerKind::Charge]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn message_handler_updates_tracker() {
        let (mut dispatcher, _, _) = dispatcher();

        dispatcher.on_message(CHARGING, "Starting");

        assert_eq!(
            dispatcher.tracker().lock().charging_state(),
            Some(&ChargingState::Starting)
        );
    }
}
