// SPDX-License-Identifier: Apache-2.0
//! Identity-based action tags.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic source of process-unique tag identities. Never reused, never
/// derived from the label, so two families created from the same label
/// remain distinct.
static NEXT_TAG_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier selecting the driver an action dispatches to.
///
/// Tags compare by identity (allocation order), not by label: equality of
/// two tags means they came from the same [`allocate_tag`] call. The label
/// exists purely for diagnostics and error messages; collisions between
/// labels are harmless.
///
/// `ActionTag` is `Copy` and hashes by identity, making it a cheap map key
/// for driver tables.
#[derive(Clone, Copy)]
pub struct ActionTag {
    id: u64,
    label: &'static str,
}

impl ActionTag {
    /// Returns the diagnostic label this tag was allocated with.
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl PartialEq for ActionTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ActionTag {}

impl std::hash::Hash for ActionTag {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ActionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActionTag({}#{})", self.label, self.id)
    }
}

impl fmt::Display for ActionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label)
    }
}

/// Allocates a fresh tag identity with the given diagnostic label.
///
/// Called by [`ActionType::new`](crate::ActionType::new); exposed for
/// collaborators that manage their own action families.
pub fn allocate_tag(label: &'static str) -> ActionTag {
    ActionTag {
        id: NEXT_TAG_ID.fetch_add(1, Ordering::Relaxed),
        label,
    }
}
