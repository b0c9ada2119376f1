// SPDX-License-Identifier: Apache-2.0
//! Compile-time capability contracts between actions and node types.
//!
//! A capability is a zero-sized marker describing something an action needs
//! from its target node ("bears a tag name", "accepts child insertion").
//! Node types advertise capabilities by implementing [`Provides`]; action
//! families declare them through the capability-set type parameter of
//! [`ActionType`](crate::ActionType). Nothing here exists at runtime — the
//! check happens entirely at the `emit` call site, which is what keeps
//! dispatch a plain map lookup.

/// Marker trait for a single structural capability.
///
/// Implementations are unit structs; the trait carries no methods.
pub trait Capability: 'static {}

/// Advertises that a node type satisfies capability `C`.
pub trait Provides<C: Capability> {}

/// A (possibly empty) tuple of capabilities, all of which node type `N`
/// must provide.
///
/// Implemented for `()` and tuples up to four capabilities; actions needing
/// more than that should reconsider their granularity.
pub trait CapabilitySet<N> {}

impl<N> CapabilitySet<N> for () {}

impl<N, A> CapabilitySet<N> for (A,)
where
    A: Capability,
    N: Provides<A>,
{
}

impl<N, A, B> CapabilitySet<N> for (A, B)
where
    A: Capability,
    B: Capability,
    N: Provides<A> + Provides<B>,
{
}

impl<N, A, B, C> CapabilitySet<N> for (A, B, C)
where
    A: Capability,
    B: Capability,
    C: Capability,
    N: Provides<A> + Provides<B> + Provides<C>,
{
}

impl<N, A, B, C, D> CapabilitySet<N> for (A, B, C, D)
where
    A: Capability,
    B: Capability,
    C: Capability,
    D: Capability,
    N: Provides<A> + Provides<B> + Provides<C> + Provides<D>,
{
}
