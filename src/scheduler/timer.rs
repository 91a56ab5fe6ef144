// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Delayed execution of scheduled work.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::task::JoinHandle;

/// A boxed unit of scheduled work.
pub type ScheduledTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Runs work after a delay without blocking the caller.
pub trait Timer: Send + Sync {
    /// Starts `task` once `delay` has elapsed.
    fn schedule(&self, delay: Duration, task: ScheduledTask) -> TaskHandle;
}

/// Timer that spawns a tokio task which sleeps, then runs the work.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

impl Timer for TokioTimer {
    fn schedule(&self, delay: Duration, task: ScheduledTask) -> TaskHandle {
        TaskHandle::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        })
    }
}

/// Handle to in-flight work.
///
/// Dropping the handle detaches the work; it keeps running. Awaiting
/// [`join`](Self::join) waits for it to finish.
#[derive(Debug)]
pub struct TaskHandle {
    inner: JoinHandle<()>,
}

impl TaskHandle {
    /// Spawns `task` on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn<F>(task: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            inner: tokio::spawn(task),
        }
    }

    /// Returns true if the work has completed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    /// Waits for the work to complete.
    ///
    /// A panic inside the work is logged, not propagated.
    pub async fn join(self) {
        if let Err(e) = self.inner.await {
            tracing::error!(error = %e, "Scheduled task panicked");
        }
    }
}
