// SPDX-License-Identifier: Apache-2.0
//! Chaining and fan-in across out-of-order completion.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::cell::RefCell;
use std::rc::Rc;

use ripple_core::{const_map, depends_on, wait_all, Deferred};

#[test]
fn wait_all_yields_input_order_regardless_of_completion_order() {
    let d1: Deferred<&'static str> = Deferred::new();
    let d2: Deferred<&'static str> = Deferred::new();
    let d3: Deferred<&'static str> = Deferred::new();
    let agg = wait_all(vec![d1.clone(), d2.clone(), d3.clone()]);

    // Complete out of order: d2, then d3, then d1.
    d2.done("v2");
    assert!(!agg.is_done());
    d3.done("v3");
    assert!(!agg.is_done());
    d1.done("v1");

    // The last-completing element released the aggregate, and values sit
    // in input order.
    assert_eq!(agg.value(), Some(vec!["v1", "v2", "v3"]));
}

#[test]
fn wait_all_of_resolved_elements_is_already_done() {
    let agg = wait_all(vec![Deferred::resolved(1), Deferred::resolved(2)]);
    assert_eq!(agg.value(), Some(vec![1, 2]));
}

#[test]
fn depends_on_forwards_the_eventual_value() {
    let inner: Deferred<u32> = Deferred::new();
    let outer: Deferred<u32> = Deferred::new();
    depends_on(&inner, &outer);

    assert!(!outer.is_done());
    inner.done(77);
    assert_eq!(outer.value(), Some(77));
}

#[test]
fn const_map_sequences_without_depending_on_the_value() {
    let dep: Deferred<u32> = Deferred::new();
    let gated = const_map("ready", &dep);

    assert!(!gated.is_done());
    dep.done(0);
    assert_eq!(gated.value(), Some("ready"));
}

#[test]
fn chains_complete_synchronously_at_the_moment_of_completion() {
    let source: Deferred<u32> = Deferred::new();
    let order = Rc::new(RefCell::new(Vec::new()));

    let first = Rc::clone(&order);
    source.map(|v| v + 1).then(move |v| first.borrow_mut().push(("mapped", v)));
    let second = Rc::clone(&order);
    source.then(move |v| second.borrow_mut().push(("raw", v)));

    source.done(10);
    // No hidden scheduling delay: both fired inside `done`, in the order
    // their chains were registered on the source.
    assert_eq!(*order.borrow(), vec![("mapped", 11), ("raw", 10)]);
}
