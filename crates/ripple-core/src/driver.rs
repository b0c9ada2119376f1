// SPDX-License-Identifier: Apache-2.0
//! Drivers and immutable driver tables.
//!
//! A driver is the executable handler behind one action tag. Tables map
//! tags to drivers and compose by structural extension only: [`DriverTable::extend`]
//! builds a new table, so concurrent holders of the base never observe an
//! augmentation. This is what lets a higher layer transparently intercept a
//! subset of tags (typically node-producing placeholders) while delegating
//! everything else.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::action::{Action, ActionType};
use crate::deferred::Deferred;
use crate::emitter::{DispatchError, Emitter};
use crate::tag::ActionTag;

/// Result shape of a successfully executed action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<N> {
    /// Setup and infrastructure actions complete with no value.
    Unit,
    /// Node-producing actions yield a new or transformed node.
    Node(N),
}

impl<N> Outcome<N> {
    /// Extracts the node from a node-producing outcome.
    pub fn into_node(self) -> Option<N> {
        match self {
            Self::Node(node) => Some(node),
            Self::Unit => None,
        }
    }
}

/// What a driver produced: an immediate result, or a deferred one the
/// scheduler links to the job's own completion.
#[derive(Debug)]
pub enum Step<N> {
    /// The effect completed within the driver call.
    Done(Outcome<N>),
    /// The effect will complete later; the job's deferred follows this one.
    Wait(Deferred<Outcome<N>>),
}

/// Handler bound to one action tag.
///
/// Given the target node, the (erased) action, and the emitter for the
/// current execution, performs the effect. Errors propagate out of the
/// drain loop uncaught — see the scheduler's batch-abandonment contract.
pub type DriverFn<N> = Rc<dyn Fn(&N, &Action, &Emitter<N>) -> Result<Step<N>, DispatchError>>;

struct TableEntry<N> {
    emits: Rc<[ActionTag]>,
    run: DriverFn<N>,
}

impl<N> Clone for TableEntry<N> {
    fn clone(&self) -> Self {
        Self {
            emits: Rc::clone(&self.emits),
            run: Rc::clone(&self.run),
        }
    }
}

/// One registration unit: an action family paired with its driver.
pub struct DriverEntry<N> {
    tag: ActionTag,
    emits: Rc<[ActionTag]>,
    run: DriverFn<N>,
}

impl<N> DriverEntry<N> {
    /// Binds a driver to `family`'s tag, carrying over the family's declared
    /// recursive emissions for table auditing.
    pub fn new<P: 'static, C>(
        family: &ActionType<P, C>,
        run: impl Fn(&N, &Action, &Emitter<N>) -> Result<Step<N>, DispatchError> + 'static,
    ) -> Self {
        Self {
            tag: family.tag(),
            emits: family.emitted_tags().into(),
            run: Rc::new(run),
        }
    }

    /// The tag this entry registers.
    #[must_use]
    pub fn tag(&self) -> ActionTag {
        self.tag
    }
}

/// Immutable mapping from action tags to drivers.
///
/// Cloning a table is cheap (shared backing map). All composition produces
/// new tables; an existing table is never mutated.
pub struct DriverTable<N> {
    entries: Rc<FxHashMap<ActionTag, TableEntry<N>>>,
}

impl<N> Clone for DriverTable<N> {
    fn clone(&self) -> Self {
        Self {
            entries: Rc::clone(&self.entries),
        }
    }
}

impl<N> Default for DriverTable<N> {
    fn default() -> Self {
        Self {
            entries: Rc::new(FxHashMap::default()),
        }
    }
}

impl<N> std::fmt::Debug for DriverTable<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverTable")
            .field("tags", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<N> DriverTable<N> {
    /// Builds an initial table from registration entries.
    ///
    /// Later entries for the same tag replace earlier ones, consistent with
    /// [`DriverTable::extend`].
    #[must_use]
    pub fn base(entries: impl IntoIterator<Item = DriverEntry<N>>) -> Self {
        Self::default().extend(entries)
    }

    /// Returns a new table where tags present in `overrides` replace or add
    /// to this table, all other tags inherited unchanged.
    ///
    /// `self` is untouched; holders of it are unaffected.
    #[must_use]
    pub fn extend(&self, overrides: impl IntoIterator<Item = DriverEntry<N>>) -> Self {
        let mut entries: FxHashMap<ActionTag, TableEntry<N>> = (*self.entries).clone();
        for entry in overrides {
            entries.insert(
                entry.tag,
                TableEntry {
                    emits: entry.emits,
                    run: entry.run,
                },
            );
        }
        Self {
            entries: Rc::new(entries),
        }
    }

    /// Whether a driver is registered for `tag`.
    #[must_use]
    pub fn contains(&self, tag: ActionTag) -> bool {
        self.entries.contains_key(&tag)
    }

    /// Number of registered tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Verifies every tag any registered driver declared it may emit is
    /// itself registered, so `Unhandled` cannot surface mid-drain for a
    /// declared composition.
    ///
    /// Called by [`Scheduler::run`](crate::Scheduler::run) before the root
    /// emission; also usable directly at table-construction sites.
    pub fn audit(&self) -> Result<(), DispatchError> {
        for (by, entry) in self.entries.iter() {
            for required in entry.emits.iter() {
                if !self.entries.contains_key(required) {
                    return Err(DispatchError::AuditMissing {
                        by: *by,
                        missing: *required,
                    });
                }
            }
        }
        Ok(())
    }

    pub(crate) fn driver(&self, tag: ActionTag) -> Option<DriverFn<N>> {
        self.entries.get(&tag).map(|entry| Rc::clone(&entry.run))
    }
}
