// SPDX-License-Identifier: Apache-2.0
//! The dispatch surface: emitters and the dispatch error taxonomy.

use std::rc::Rc;

use thiserror::Error;

use crate::action::IntoAction;
use crate::deferred::Deferred;
use crate::driver::{DriverTable, Outcome};
use crate::scheduler::Job;
use crate::tag::ActionTag;

/// Boxed error type drivers use to surface domain failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by dispatch and the drain loop.
///
/// Every variant except [`DispatchError::Driver`] is a contract violation —
/// a programming error to fix, not a condition to retry. The core never
/// retries anything.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No driver registered for the emitted tag. Raised by `emit` before
    /// any job is queued, so a failed emission has no partial side effect.
    #[error("no driver registered for action `{0}`")]
    Unhandled(ActionTag),
    /// A driver asked for a payload type its tag was not stamped with.
    #[error("payload type mismatch for action `{0}`")]
    PayloadMismatch(ActionTag),
    /// A driver failed while executing. The remainder of the current batch
    /// was abandoned: still-queued jobs were dropped and their deferreds
    /// stay pending forever. Hosts catch this at the wake-hook boundary.
    #[error("driver for action `{tag}` failed")]
    Driver {
        /// Tag of the action whose driver failed.
        tag: ActionTag,
        /// The driver's underlying failure.
        #[source]
        source: BoxError,
    },
    /// A driver table declared an emission for which no driver exists;
    /// detected at audit time, before anything runs.
    #[error("driver table audit: `{by}` may emit `{missing}` which has no driver")]
    AuditMissing {
        /// The registered tag declaring the emission.
        by: ActionTag,
        /// The declared tag with no registered driver.
        missing: ActionTag,
    },
    /// Emission through an emitter whose scheduler has been dropped.
    #[error("scheduler dropped before emission")]
    SchedulerGone,
}

impl DispatchError {
    /// Wraps a driver's domain failure with the tag that was executing.
    pub fn driver(tag: ActionTag, source: impl Into<BoxError>) -> Self {
        Self::Driver {
            tag,
            source: source.into(),
        }
    }
}

pub(crate) type EnqueueFn<N> = Rc<dyn Fn(Job<N>) -> Result<(), DispatchError>>;

/// Dispatch surface pairing a driver table with the scheduler's enqueue
/// primitive.
///
/// Stateless beyond those two bindings: cloning is cheap, and a scoped
/// emitter derived via [`Emitter::with_drivers`] is a pure value sharing
/// the same enqueue path.
pub struct Emitter<N> {
    drivers: DriverTable<N>,
    enqueue: EnqueueFn<N>,
}

impl<N> Clone for Emitter<N> {
    fn clone(&self) -> Self {
        Self {
            drivers: self.drivers.clone(),
            enqueue: Rc::clone(&self.enqueue),
        }
    }
}

impl<N> std::fmt::Debug for Emitter<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("drivers", &self.drivers)
            .finish_non_exhaustive()
    }
}

impl<N: Clone + 'static> Emitter<N> {
    pub(crate) fn new(drivers: DriverTable<N>, enqueue: EnqueueFn<N>) -> Self {
        Self { drivers, enqueue }
    }

    /// Emits an action against a node, returning the job's deferred result.
    ///
    /// Resolves the driver up front: an unregistered tag fails with
    /// [`DispatchError::Unhandled`] before any job enters the scheduler.
    /// The call never blocks — whether the returned deferred is already
    /// done depends on the driver and the scheduler's current mode.
    ///
    /// Accepts a [`Stamped`](crate::Stamped) action (capability set checked
    /// against `N` at compile time) or a raw [`Action`](crate::Action).
    pub fn emit(
        &self,
        node: &N,
        action: impl IntoAction<N>,
    ) -> Result<Deferred<Outcome<N>>, DispatchError> {
        let action = action.into_action();
        let run = self
            .drivers
            .driver(action.tag())
            .ok_or_else(|| DispatchError::Unhandled(action.tag()))?;
        let deferred = Deferred::new();
        (self.enqueue)(Job {
            node: node.clone(),
            action,
            run,
            emitter: self.clone(),
            deferred: deferred.clone(),
        })?;
        Ok(deferred)
    }

    /// Derives an emitter with an augmented driver table and the same
    /// enqueue primitive.
    ///
    /// Scoping is lexical: only emissions through the returned emitter
    /// observe the augmentation; this emitter, and any emitter previously
    /// derived from it, are unaffected.
    #[must_use]
    pub fn with_drivers(&self, f: impl FnOnce(&DriverTable<N>) -> DriverTable<N>) -> Self {
        Self {
            drivers: f(&self.drivers),
            enqueue: Rc::clone(&self.enqueue),
        }
    }

    /// The driver table bound to this emitter.
    #[must_use]
    pub fn drivers(&self) -> &DriverTable<N> {
        &self.drivers
    }
}
