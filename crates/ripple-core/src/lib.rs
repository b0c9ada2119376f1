// SPDX-License-Identifier: Apache-2.0
//! ripple-core: deterministic effect dispatch and deferred-scheduling engine.
//!
//! Side-effecting operations are described as typed, inert [`Action`]
//! values, executed through pluggable drivers bound to a target node, and
//! composed through a minimal [`Deferred`] future — whether a driver
//! completes immediately or ticks later, on a single cooperative thread.
//!
//! The crate is a closed dispatch kernel: it requires no specific action
//! tags to exist. Collaborators (rendering targets, reactive adapters,
//! test harnesses) supply a [`DriverTable`] for the tags they understand
//! and a wake hook telling the [`Scheduler`] how to reach the host's next
//! scheduling boundary.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::unreadable_literal,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::module_name_repetitions,
    clippy::use_self,
    clippy::cognitive_complexity,
    clippy::option_if_let_else,
    clippy::significant_drop_tightening,
    clippy::doc_markdown,
    clippy::too_long_first_doc_paragraph,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::similar_names,
    clippy::trivially_copy_pass_by_ref,
    clippy::manual_let_else,
    clippy::needless_pass_by_value,
    clippy::multiple_crate_versions
)]

mod action;
mod capability;
mod deferred;
mod driver;
mod emitter;
mod scheduler;
mod tag;
mod telemetry;

// Re-exports for stable public API
/// Inert effect descriptors and typed constructors.
pub use action::{Action, ActionKind, ActionType, IntoAction, Stamped};
/// Compile-time capability contracts between actions and node types.
pub use capability::{Capability, CapabilitySet, Provides};
/// Single-assignment deferred values with chaining and fan-in.
pub use deferred::{const_map, depends_on, wait_all, Deferred};
/// Driver signatures and immutable driver tables.
pub use driver::{DriverEntry, DriverFn, DriverTable, Outcome, Step};
/// Dispatch surface and error taxonomy.
pub use emitter::{BoxError, DispatchError, Emitter};
/// Batching scheduler and tick callback type.
pub use scheduler::{Scheduler, TickFn};
/// Identity-based action tags.
pub use tag::{allocate_tag, ActionTag};
/// Scheduler observability seam.
pub use telemetry::{NullTelemetrySink, TelemetrySink};
