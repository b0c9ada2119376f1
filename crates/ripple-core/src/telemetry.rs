// SPDX-License-Identifier: Apache-2.0
//! Observability seam for the scheduler.
//!
//! Hosts inject a [`TelemetrySink`] at scheduler construction to observe
//! drain activity. All hooks are best-effort notifications with empty
//! default bodies; the scheduler never depends on their behavior.

use crate::tag::ActionTag;

/// Receives scheduler lifecycle notifications.
pub trait TelemetrySink {
    /// A job's driver ran. `deferred` is true when the driver returned a
    /// still-pending result linked across ticks.
    fn on_executed(&self, _tag: ActionTag, _deferred: bool) {}

    /// A drain observed an empty batch and ended the tick, having executed
    /// `executed` jobs.
    fn on_tick_end(&self, _executed: usize) {}

    /// An emission in async mode requested a wake from the host hook.
    fn on_wake_requested(&self) {}

    /// A driver failure abandoned the remainder of the batch, dropping
    /// `dropped` queued jobs.
    fn on_abandoned(&self, _dropped: usize) {}
}

/// Sink that ignores every notification; the default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTelemetrySink;

impl TelemetrySink for NullTelemetrySink {}
