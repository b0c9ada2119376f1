// SPDX-License-Identifier: Apache-2.0
//! Single-assignment deferred values with chaining and fan-in.
//!
//! [`Deferred<T>`] is the minimal future primitive the scheduler composes
//! results with. Its state machine is `Pending → Done`, monotonic, with no
//! cancelled or failed state: driver failures travel as `Result` through the
//! drain loop, never as a deferred state.
//!
//! Continuations registered while pending fire exactly once, in registration
//! order, synchronously inside the [`Deferred::done`] call that completes
//! the value. The primitive itself introduces no scheduling delay; tick
//! boundaries are entirely the scheduler's business.
//!
//! Completing an already-completed deferred is a silent no-op; `done`
//! returns whether the call performed the completion.

use std::cell::RefCell;
use std::rc::Rc;

type Continuation<T> = Box<dyn FnOnce(T)>;

enum State<T> {
    Pending(Vec<Continuation<T>>),
    Done(T),
}

/// A value that becomes available at most once.
///
/// Cloning produces another handle to the same underlying cell; completion
/// through any handle is observed by all of them. `T: Clone` because each
/// registered continuation receives its own copy of the value — in practice
/// `T` is a node handle or small result enum and the clone is an `Rc` bump.
pub struct Deferred<T> {
    inner: Rc<RefCell<State<T>>>,
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &*self.inner.borrow() {
            State::Pending(waiters) => format!("Pending({} waiting)", waiters.len()),
            State::Done(_) => "Done".to_owned(),
        };
        f.debug_tuple("Deferred").field(&state).finish()
    }
}

impl<T: Clone + 'static> Default for Deferred<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> Deferred<T> {
    /// Creates a pending deferred.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(State::Pending(Vec::new()))),
        }
    }

    /// Creates an already-completed deferred.
    #[must_use]
    pub fn resolved(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(State::Done(value))),
        }
    }

    /// Whether the value is available.
    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(&*self.inner.borrow(), State::Done(_))
    }

    /// Returns a copy of the value if completed.
    #[must_use]
    pub fn value(&self) -> Option<T> {
        match &*self.inner.borrow() {
            State::Done(value) => Some(value.clone()),
            State::Pending(_) => None,
        }
    }

    /// Completes the deferred, firing pending continuations in registration
    /// order before returning.
    ///
    /// Returns `true` if this call performed the completion; completing an
    /// already-done deferred is a no-op returning `false`.
    pub fn done(&self, value: T) -> bool {
        // Take the waiters out before running any of them: a continuation
        // may re-enter this deferred (register another continuation, query
        // state) and must not observe a held borrow.
        let waiters = {
            let mut state = self.inner.borrow_mut();
            match &mut *state {
                State::Done(_) => return false,
                State::Pending(waiters) => {
                    let waiters = std::mem::take(waiters);
                    *state = State::Done(value.clone());
                    waiters
                }
            }
        };
        for waiter in waiters {
            waiter(value.clone());
        }
        true
    }

    /// Registers a continuation.
    ///
    /// Runs immediately if the value is already available, otherwise at the
    /// moment of completion, after every continuation registered earlier.
    pub fn then(&self, f: impl FnOnce(T) + 'static) {
        let ready = {
            let mut state = self.inner.borrow_mut();
            match &mut *state {
                State::Pending(waiters) => {
                    waiters.push(Box::new(f));
                    return;
                }
                State::Done(value) => value.clone(),
            }
        };
        f(ready);
    }

    /// Transforms the eventual value, preserving pending/done timing.
    pub fn map<U: Clone + 'static>(&self, f: impl FnOnce(T) -> U + 'static) -> Deferred<U> {
        let out = Deferred::new();
        let sink = out.clone();
        self.then(move |value| {
            sink.done(f(value));
        });
        out
    }

    /// Chains to a deferred-producing continuation, flattening one level.
    pub fn and_then<U: Clone + 'static>(
        &self,
        f: impl FnOnce(T) -> Deferred<U> + 'static,
    ) -> Deferred<U> {
        let out = Deferred::new();
        let sink = out.clone();
        self.then(move |value| {
            depends_on(&f(value), &sink);
        });
        out
    }
}

/// Makes `outer` complete with `inner`'s eventual value.
///
/// Lets a driver's asynchronous result satisfy the job's own completion
/// contract: the scheduler links the deferred a driver returned to the
/// deferred the original `emit` call handed out.
pub fn depends_on<T: Clone + 'static>(inner: &Deferred<T>, outer: &Deferred<T>) {
    let outer = outer.clone();
    inner.then(move |value| {
        outer.done(value);
    });
}

/// Completes with a fixed value once `dep` completes, discarding `dep`'s
/// own value. Sequencing without depending on the value.
pub fn const_map<T, U>(value: U, dep: &Deferred<T>) -> Deferred<U>
where
    T: Clone + 'static,
    U: Clone + 'static,
{
    let out = Deferred::new();
    let sink = out.clone();
    dep.then(move |_| {
        sink.done(value);
    });
    out
}

/// Completes once every element completes, with results in input order.
///
/// The last-completing element releases the aggregate, regardless of the
/// order in which elements resolve. An empty input completes immediately
/// with an empty vector.
pub fn wait_all<T: Clone + 'static>(items: Vec<Deferred<T>>) -> Deferred<Vec<T>> {
    let out = Deferred::new();
    let total = items.len();
    if total == 0 {
        out.done(Vec::new());
        return out;
    }

    let slots: Rc<RefCell<Vec<Option<T>>>> =
        Rc::new(RefCell::new((0..total).map(|_| None).collect()));
    let remaining = Rc::new(std::cell::Cell::new(total));

    for (index, item) in items.into_iter().enumerate() {
        let slots = Rc::clone(&slots);
        let remaining = Rc::clone(&remaining);
        let sink = out.clone();
        item.then(move |value| {
            slots.borrow_mut()[index] = Some(value);
            remaining.set(remaining.get() - 1);
            if remaining.get() == 0 {
                let values: Vec<T> = slots.take().into_iter().flatten().collect();
                sink.done(values);
            }
        });
    }
    out
}
