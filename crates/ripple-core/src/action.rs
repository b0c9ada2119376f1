// SPDX-License-Identifier: Apache-2.0
//! Inert action descriptors and their typed constructors.
//!
//! An [`Action`] is a pure description of an effect: a tag selecting the
//! driver, a [`ActionKind`] describing its result shape, and an opaque
//! payload the driver downcasts. Construction is infallible and side-effect
//! free; actions are cheap to clone and safe to share across emissions.
//!
//! The typed layer, [`ActionType`], is where the static contracts live: the
//! capability set the target node must provide (a phantom type parameter,
//! never represented at runtime) and the tags the action's driver may
//! recursively emit (audited against a driver table before execution, see
//! [`DriverTable::audit`](crate::DriverTable::audit)).

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::capability::CapabilitySet;
use crate::emitter::DispatchError;
use crate::tag::{allocate_tag, ActionTag};

/// Semantic classification of an action's execution and result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Mutates execution context; completes with no value.
    Setup,
    /// Produces a new or transformed node.
    Node,
    /// Cross-cutting infrastructure, e.g. cleanup registration.
    Infra,
}

/// An erased, immutable effect descriptor ready for dispatch.
#[derive(Clone)]
pub struct Action {
    tag: ActionTag,
    kind: ActionKind,
    payload: Rc<dyn Any>,
}

impl Action {
    /// Wraps a payload under the given tag and kind.
    pub fn new<P: 'static>(tag: ActionTag, kind: ActionKind, payload: P) -> Self {
        Self {
            tag,
            kind,
            payload: Rc::new(payload),
        }
    }

    /// The tag selecting this action's driver.
    #[must_use]
    pub fn tag(&self) -> ActionTag {
        self.tag
    }

    /// The semantic kind of this action.
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    /// Downcasts the payload to the concrete type the driver expects.
    ///
    /// A mismatch means a driver was registered under the wrong tag — a
    /// programming error, reported as [`DispatchError::PayloadMismatch`].
    pub fn payload<P: 'static>(&self) -> Result<&P, DispatchError> {
        self.payload
            .downcast_ref::<P>()
            .ok_or(DispatchError::PayloadMismatch(self.tag))
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("tag", &self.tag)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Typed constructor for one action family.
///
/// `P` is the payload type; `C` is the capability set ([`CapabilitySet`])
/// the target node must provide. `C` exists only at compile time — stamping
/// and dispatching never inspect it.
pub struct ActionType<P, C = ()> {
    tag: ActionTag,
    kind: ActionKind,
    emits: Vec<ActionTag>,
    _marker: PhantomData<fn(P) -> C>,
}

impl<P, C> Clone for ActionType<P, C> {
    fn clone(&self) -> Self {
        Self {
            tag: self.tag,
            kind: self.kind,
            emits: self.emits.clone(),
            _marker: PhantomData,
        }
    }
}

impl<P: 'static, C> ActionType<P, C> {
    /// Allocates a fresh tag for this family.
    pub fn new(label: &'static str, kind: ActionKind) -> Self {
        Self {
            tag: allocate_tag(label),
            kind,
            emits: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Declares the tags this family's driver may recursively emit.
    ///
    /// Used by [`DriverTable::audit`](crate::DriverTable::audit) to verify a
    /// table is exhaustive for a composition before anything runs.
    #[must_use]
    pub fn emits(mut self, tags: impl IntoIterator<Item = ActionTag>) -> Self {
        self.emits.extend(tags);
        self
    }

    /// This family's tag.
    #[must_use]
    pub fn tag(&self) -> ActionTag {
        self.tag
    }

    /// This family's kind.
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    /// Tags declared via [`ActionType::emits`].
    #[must_use]
    pub fn emitted_tags(&self) -> &[ActionTag] {
        &self.emits
    }

    /// Stamps a payload into an emission-ready action.
    ///
    /// Never fails, performs no side effect; the result is distinguishable
    /// from other families purely by tag identity.
    pub fn make(&self, payload: P) -> Stamped<C> {
        Stamped {
            action: Action::new(self.tag, self.kind, payload),
            _caps: PhantomData,
        }
    }
}

/// An erased action carrying its family's capability set as a phantom.
///
/// Emitting a `Stamped<C>` against node type `N` requires
/// `C: CapabilitySet<N>`; see [`IntoAction`].
pub struct Stamped<C = ()> {
    action: Action,
    _caps: PhantomData<fn() -> C>,
}

impl<C> Stamped<C> {
    /// Borrows the erased action, e.g. for inspecting the tag.
    #[must_use]
    pub fn action(&self) -> &Action {
        &self.action
    }
}

impl<C> Clone for Stamped<C> {
    fn clone(&self) -> Self {
        Self {
            action: self.action.clone(),
            _caps: PhantomData,
        }
    }
}

impl<C> fmt::Debug for Stamped<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Stamped").field(&self.action).finish()
    }
}

/// Conversion seam between typed and erased emission.
///
/// [`Emitter::emit`](crate::Emitter::emit) accepts any `IntoAction<N>`:
/// a [`Stamped`] action (capability-checked against `N` at compile time) or
/// a raw [`Action`] (no static contract — the path drivers use when
/// re-emitting actions they received erased).
pub trait IntoAction<N> {
    /// Erases `self` into a dispatchable [`Action`].
    fn into_action(self) -> Action;
}

impl<N> IntoAction<N> for Action {
    fn into_action(self) -> Action {
        self
    }
}

impl<N> IntoAction<N> for &Action {
    fn into_action(self) -> Action {
        self.clone()
    }
}

impl<N, C: CapabilitySet<N>> IntoAction<N> for Stamped<C> {
    fn into_action(self) -> Action {
        self.action
    }
}

impl<N, C: CapabilitySet<N>> IntoAction<N> for &Stamped<C> {
    fn into_action(self) -> Action {
        self.action.clone()
    }
}
