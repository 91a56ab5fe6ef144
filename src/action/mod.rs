// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Report generation actions.
//!
//! The engine only asks for a report by kind; how it is produced is up to the
//! [`ReportAction`] implementation. [`CommandReportAction`] shells out to an
//! external program.

mod command;

pub use command::CommandReportAction;

use std::future::Future;

use crate::error::ActionError;
use crate::types::TriggerKind;

/// Produces the report for a finished drive or charging session.
pub trait ReportAction: Send + Sync + 'static {
    /// Generates the report for `kind` and returns its textual output.
    ///
    /// # Errors
    ///
    /// Returns `ActionError` if the report could not be generated.
    fn run(&self, kind: TriggerKind) -> impl Future<Output = Result<String, ActionError>> + Send;
}
