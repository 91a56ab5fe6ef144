// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outbound text notifications.

#[cfg(feature = "http")]
mod telegram;

#[cfg(feature = "http")]
pub use telegram::{TelegramConfig, TelegramNotifier};

use std::future::Future;

use crate::error::NotifyError;

/// Sends a text message to a preconfigured channel.
pub trait Notifier: Send + Sync + 'static {
    /// Delivers `message`.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError` if the message could not be delivered.
    fn send_text(&self, message: &str) -> impl Future<Output = Result<(), NotifyError>> + Send;
}
