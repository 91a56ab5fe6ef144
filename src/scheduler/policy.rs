// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Debounce and delay windows per trigger kind.

use std::time::Duration;

use crate::types::TriggerKind;

/// Debounce and delay for one trigger kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerWindow {
    debounce: Duration,
    delay: Duration,
}

impl TriggerWindow {
    /// Creates a window.
    #[must_use]
    pub const fn new(debounce: Duration, delay: Duration) -> Self {
        Self { debounce, delay }
    }

    /// Minimum time between two accepted triggers.
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Wait between an accepted trigger and running its action.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }
}

/// Trigger windows for every kind.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use carwatch::scheduler::{TriggerPolicy, TriggerWindow};
/// use carwatch::types::TriggerKind;
///
/// let policy = TriggerPolicy::default()
///     .with_window(TriggerKind::Online, TriggerWindow::new(
///         Duration::from_secs(120),
///         Duration::from_secs(10),
///     ));
/// assert_eq!(policy.window(TriggerKind::Online).delay(), Duration::from_secs(10));
/// assert_eq!(policy.window(TriggerKind::Drive).delay(), Duration::from_secs(30));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerPolicy {
    drive: TriggerWindow,
    charge: TriggerWindow,
    online: TriggerWindow,
}

impl TriggerPolicy {
    /// Window for drive reports.
    pub const DRIVE: TriggerWindow =
        TriggerWindow::new(Duration::from_secs(60), Duration::from_secs(30));
    /// Window for charge reports.
    pub const CHARGE: TriggerWindow =
        TriggerWindow::new(Duration::from_secs(60), Duration::from_secs(30));
    /// Window for online notifications.
    pub const ONLINE: TriggerWindow =
        TriggerWindow::new(Duration::from_secs(60), Duration::from_secs(5));

    /// Returns the window for `kind`.
    #[must_use]
    pub const fn window(&self, kind: TriggerKind) -> TriggerWindow {
        match kind {
            TriggerKind::Drive => self.drive,
            TriggerKind::Charge => self.charge,
            TriggerKind::Online => self.online,
        }
    }

    /// Replaces the window for `kind`.
    #[must_use]
    pub fn with_window(mut self, kind: TriggerKind, window: TriggerWindow) -> Self {
        match kind {
            TriggerKind::Drive => self.drive = window,
            TriggerKind::Charge => self.charge = window,
            TriggerKind::Online => self.online = window,
        }
        self
    }
}

impl Default for TriggerPolicy {
    fn default() -> Self {
        Self {
            drive: Self::DRIVE,
            charge: Self::CHARGE,
            online: Self::ONLINE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_windows() {
        let policy = TriggerPolicy::default();
        assert_eq!(
            policy.window(TriggerKind::Drive),
            TriggerWindow::new(Duration::from_secs(60), Duration::from_secs(30))
        );
        assert_eq!(
            policy.window(TriggerKind::Charge),
            TriggerWindow::new(Duration::from_secs(60), Duration::from_secs(30))
        );
        assert_eq!(
            policy.window(TriggerKind::Online),
            TriggerWindow::new(Duration::from_secs(60), Duration::from_secs(5))
        );
    }
}
