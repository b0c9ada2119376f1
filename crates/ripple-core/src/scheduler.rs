// SPDX-License-Identifier: Apache-2.0
//! Batching scheduler with deterministic drain/tick ordering.
//!
//! Ordering invariant:
//! - Within one tick, jobs execute in strict emission order (FIFO),
//!   including jobs emitted recursively mid-drain, which append after
//!   everything already queued — never depth-first.
//! - Ticks are totally ordered: no job of tick N+1 is dequeued before every
//!   job of tick N has been dequeued. Completion may still straddle ticks
//!   when a driver returns a pending deferred.
//!
//! The drain loop never blocks: a pending driver result suspends only its
//! own job's completion, linked via [`depends_on`]. Once a drain observes
//! an empty batch the scheduler flips to async mode; the next emission
//! requests a wake from the host hook, enqueues, and flips back to sync so
//! further same-turn emissions batch without redundant wake requests. What
//! "next scheduling boundary" means (microtask, frame, immediate) is the
//! host's policy, not this module's.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use crate::action::{Action, IntoAction};
use crate::deferred::{depends_on, Deferred};
use crate::driver::{DriverFn, DriverTable, Outcome, Step};
use crate::emitter::{DispatchError, Emitter};
use crate::telemetry::{NullTelemetrySink, TelemetrySink};

/// A tick callback handed to the host's wake hook.
///
/// Running it drains the batch accumulated since the hook was invoked.
/// The `Result` is the host's catch point for driver failures that would
/// otherwise abandon a batch unnoticed.
pub type TickFn = Box<dyn FnOnce() -> Result<(), DispatchError>>;

type WakeFn = Rc<dyn Fn(TickFn)>;

/// One queued, not-yet-executed dispatch of an action against a node.
pub(crate) struct Job<N> {
    pub(crate) node: N,
    pub(crate) action: Action,
    pub(crate) run: DriverFn<N>,
    pub(crate) emitter: Emitter<N>,
    pub(crate) deferred: Deferred<Outcome<N>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Sync,
    Async,
}

struct SchedulerState<N> {
    batch: RefCell<VecDeque<Job<N>>>,
    mode: Cell<Mode>,
    wake: WakeFn,
    telemetry: Rc<dyn TelemetrySink>,
}

/// Owns the current batch of pending jobs and arbitrates the sync→async
/// transition across ticks.
///
/// Single cooperative thread of control: no locks, no `Send` bounds. The
/// only shared mutable state is the batch queue and the mode flag, both
/// owned here and touched only by `emit` and the drain routine.
pub struct Scheduler<N> {
    state: Rc<SchedulerState<N>>,
}

impl<N> std::fmt::Debug for Scheduler<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("queued", &self.state.batch.borrow().len())
            .field("mode", &self.state.mode.get())
            .finish_non_exhaustive()
    }
}

impl<N: Clone + 'static> Scheduler<N> {
    /// Creates a scheduler with the host's wake hook and no telemetry.
    ///
    /// The hook receives a [`TickFn`] whenever an async-mode emission needs
    /// a future drain; the host runs it at its chosen scheduling boundary.
    pub fn new(wake: impl Fn(TickFn) + 'static) -> Self {
        Self::with_telemetry(wake, Rc::new(NullTelemetrySink))
    }

    /// Creates a scheduler with an injected telemetry sink.
    pub fn with_telemetry(wake: impl Fn(TickFn) + 'static, telemetry: Rc<dyn TelemetrySink>) -> Self {
        Self {
            state: Rc::new(SchedulerState {
                batch: RefCell::new(VecDeque::new()),
                mode: Cell::new(Mode::Sync),
                wake: Rc::new(wake),
                telemetry,
            }),
        }
    }

    /// Runs one root action against one node with one driver table,
    /// draining synchronously until the batch — including everything the
    /// root's driver recursively emitted — is empty.
    ///
    /// Audits the table first, so a composition with a declared-but-missing
    /// driver fails before anything executes. Returns the root's deferred;
    /// it is already done if every step completed within this drain.
    pub fn run(
        &self,
        node: &N,
        drivers: DriverTable<N>,
        action: impl IntoAction<N>,
    ) -> Result<Deferred<Outcome<N>>, DispatchError> {
        drivers.audit()?;
        // A root emission starts its own synchronous drain; reset mode so
        // the emit below enqueues without requesting a wake.
        self.state.mode.set(Mode::Sync);
        let emitter = self.emitter(drivers);
        let deferred = match emitter.emit(node, action) {
            Ok(deferred) => deferred,
            Err(err) => {
                // Nothing queued; leave the scheduler in async mode so a
                // retained emitter still requests a wake for later work.
                self.state.mode.set(Mode::Async);
                return Err(err);
            }
        };
        Self::drain(&self.state)?;
        Ok(deferred)
    }

    /// Builds a long-lived emitter wired to this scheduler's queue.
    ///
    /// Emissions through it follow the current mode: same-tick append while
    /// a drain is running, wake-request-then-append once the scheduler has
    /// gone async. The emitter holds only a weak reference; emitting after
    /// the scheduler is dropped fails with [`DispatchError::SchedulerGone`].
    pub fn emitter(&self, drivers: DriverTable<N>) -> Emitter<N> {
        let weak = Rc::downgrade(&self.state);
        Emitter::new(
            drivers,
            Rc::new(move |job| {
                weak.upgrade()
                    .map_or(Err(DispatchError::SchedulerGone), |state| {
                        Self::enqueue(&state, job);
                        Ok(())
                    })
            }),
        )
    }

    fn enqueue(state: &Rc<SchedulerState<N>>, job: Job<N>) {
        if state.mode.get() == Mode::Async {
            // Request the next tick before enqueueing, then flip to sync so
            // further same-turn emissions batch behind this one.
            state.telemetry.on_wake_requested();
            let weak: Weak<SchedulerState<N>> = Rc::downgrade(state);
            (state.wake)(Box::new(move || {
                weak.upgrade().map_or(Ok(()), |state| Self::drain(&state))
            }));
            state.mode.set(Mode::Sync);
        }
        state.batch.borrow_mut().push_back(job);
    }

    /// Drains until the batch is observed empty, re-checking after every
    /// job so recursive emissions execute within the same tick.
    fn drain(state: &Rc<SchedulerState<N>>) -> Result<(), DispatchError> {
        let mut executed = 0usize;
        loop {
            let next = state.batch.borrow_mut().pop_front();
            let Some(job) = next else { break };
            executed += 1;
            match (job.run)(&job.node, &job.action, &job.emitter) {
                Ok(Step::Done(outcome)) => {
                    state.telemetry.on_executed(job.action.tag(), false);
                    job.deferred.done(outcome);
                }
                Ok(Step::Wait(dep)) => {
                    state.telemetry.on_executed(job.action.tag(), true);
                    depends_on(&dep, &job.deferred);
                }
                Err(err) => {
                    // Abandon-on-error: drop the rest of the batch. Jobs
                    // already completed stay completed; dropped jobs leave
                    // their deferreds pending forever.
                    let dropped = {
                        let mut batch = state.batch.borrow_mut();
                        let dropped = batch.len();
                        batch.clear();
                        dropped
                    };
                    state.mode.set(Mode::Async);
                    state.telemetry.on_abandoned(dropped);
                    return Err(err);
                }
            }
        }
        state.mode.set(Mode::Async);
        state.telemetry.on_tick_end(executed);
        Ok(())
    }
}
