// SPDX-License-Identifier: Apache-2.0
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use ripple_core::{
    Action, Capability, DispatchError, Emitter, Outcome, Provides, Step, TickFn,
};

/// Cheaply cloneable mock render target. Equality is handle identity, the
/// way real node handles behave.
#[derive(Clone)]
pub struct MockNode {
    inner: Rc<NodeInner>,
}

struct NodeInner {
    name: &'static str,
    values: RefCell<HashMap<&'static str, i64>>,
}

impl MockNode {
    pub fn new(name: &'static str) -> Self {
        Self {
            inner: Rc::new(NodeInner {
                name,
                values: RefCell::new(HashMap::new()),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    pub fn set(&self, key: &'static str, value: i64) {
        self.inner.values.borrow_mut().insert(key, value);
    }

    pub fn get(&self, key: &'static str) -> i64 {
        self.inner.values.borrow().get(key).copied().unwrap_or(0)
    }
}

impl PartialEq for MockNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for MockNode {}

impl std::fmt::Debug for MockNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MockNode({})", self.inner.name)
    }
}

/// Capability: the node bears a tag name.
pub struct BearsTag;
impl Capability for BearsTag {}
impl Provides<BearsTag> for MockNode {}

/// Capability: the node accepts child insertion.
pub struct AcceptsChildren;
impl Capability for AcceptsChildren {}
impl Provides<AcceptsChildren> for MockNode {}

/// Shared execution trace recorded by instrumented drivers.
#[derive(Clone, Default)]
pub struct Trace {
    entries: Rc<RefCell<Vec<String>>>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.entries.borrow_mut().push(entry.into());
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }
}

/// Driver that records `label` into the trace and completes immediately.
pub fn tracing_driver(
    trace: &Trace,
    label: &'static str,
) -> impl Fn(&MockNode, &Action, &Emitter<MockNode>) -> Result<Step<MockNode>, DispatchError> + 'static
{
    let trace = trace.clone();
    move |_, _, _| {
        trace.push(label);
        Ok(Step::Done(Outcome::Unit))
    }
}

/// Host-side wake hook that collects tick callbacks for the test to run
/// explicitly, standing in for "next microtask" / "next frame".
#[derive(Clone, Default)]
pub struct ManualHost {
    ticks: Rc<RefCell<VecDeque<TickFn>>>,
    wakes: Rc<std::cell::Cell<usize>>,
}

impl ManualHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hook(&self) -> impl Fn(TickFn) + 'static {
        let ticks = Rc::clone(&self.ticks);
        let wakes = Rc::clone(&self.wakes);
        move |tick| {
            wakes.set(wakes.get() + 1);
            ticks.borrow_mut().push_back(tick);
        }
    }

    /// Total wake requests observed since construction.
    pub fn wake_count(&self) -> usize {
        self.wakes.get()
    }

    /// Ticks scheduled but not yet run.
    pub fn pending(&self) -> usize {
        self.ticks.borrow().len()
    }

    /// Runs the oldest scheduled tick.
    pub fn run_next(&self) -> Result<(), DispatchError> {
        let tick = self
            .ticks
            .borrow_mut()
            .pop_front()
            .expect("a tick was scheduled");
        tick()
    }
}
