// SPDX-License-Identifier: Apache-2.0
//! Property tests for the deferred primitive.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::cast_possible_truncation
)]

use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;
use ripple_core::{wait_all, Deferred};

proptest! {
    /// Whatever order elements resolve in, the aggregate carries values in
    /// input order and completes only at the final resolution.
    #[test]
    fn wait_all_is_input_ordered_under_any_completion_order(
        values in proptest::collection::vec(any::<i32>(), 1..16),
        order_seed in any::<u64>(),
    ) {
        let n = values.len();
        let deferreds: Vec<Deferred<i32>> = (0..n).map(|_| Deferred::new()).collect();
        let agg = wait_all(deferreds.clone());

        // Derive a completion permutation from the seed (Fisher-Yates with
        // a splitmix step) so the property covers arbitrary orders without
        // a shuffle strategy.
        let mut order: Vec<usize> = (0..n).collect();
        let mut state = order_seed;
        for i in (1..n).rev() {
            state = state
                .wrapping_add(0x9E37_79B9_7F4A_7C15)
                .wrapping_mul(0xBF58_476D_1CE4_E5B9);
            let j = (state % (i as u64 + 1)) as usize;
            order.swap(i, j);
        }

        for (completed, &index) in order.iter().enumerate() {
            prop_assert!(!agg.is_done());
            deferreds[index].done(values[index]);
            let expect_done = completed + 1 == n;
            prop_assert_eq!(agg.is_done(), expect_done);
        }
        prop_assert_eq!(agg.value(), Some(values));
    }

    /// Every continuation registered before completion fires exactly once,
    /// in registration order; registrations after completion fire
    /// immediately.
    #[test]
    fn continuations_fire_once_in_registration_order(
        before in 0usize..32,
        value in any::<i64>(),
    ) {
        let d: Deferred<i64> = Deferred::new();
        let fired = Rc::new(RefCell::new(Vec::new()));

        for index in 0..before {
            let fired = Rc::clone(&fired);
            d.then(move |v| fired.borrow_mut().push((index, v)));
        }
        prop_assert!(fired.borrow().is_empty());

        d.done(value);
        let expected: Vec<(usize, i64)> = (0..before).map(|i| (i, value)).collect();
        prop_assert_eq!(fired.borrow().clone(), expected);

        let late = Rc::new(std::cell::Cell::new(0u32));
        let counter = Rc::clone(&late);
        d.then(move |_| counter.set(counter.get() + 1));
        prop_assert_eq!(late.get(), 1);
    }

    /// Completion is single-assignment: later `done` calls neither replace
    /// the value nor re-fire continuations.
    #[test]
    fn first_completion_wins(a in any::<i32>(), b in any::<i32>()) {
        let d: Deferred<i32> = Deferred::new();
        let fires = Rc::new(std::cell::Cell::new(0u32));
        let counter = Rc::clone(&fires);
        d.then(move |_| counter.set(counter.get() + 1));

        prop_assert!(d.done(a));
        prop_assert!(!d.done(b));
        prop_assert_eq!(d.value(), Some(a));
        prop_assert_eq!(fires.get(), 1);
    }
}
