// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Binding and panel identifiers.

use core::fmt;

/// Identifies one binding on an element.
///
/// A binding id names the bound target property; an element holds at most one
/// binding per id. Ids are assigned by the host and only need to be unique per
/// element.
///
/// ```rust
/// use understory_binding::BindingId;
///
/// let id = BindingId::new(7);
/// assert_eq!(id.index(), 7);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BindingId(u32);

impl BindingId {
    /// Creates a binding id from its raw index.
    #[must_use]
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    #[must_use]
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BindingId").field(&self.0).finish()
    }
}

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BindingId({})", self.0)
    }
}

/// Identifies the panel (UI root) an element is attached to.
///
/// Elements refer to their panel by id rather than by reference; a request
/// whose element reports a different panel, or none, is stale.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PanelId(u32);

impl PanelId {
    /// Creates a panel id from its raw index.
    #[must_use]
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    #[must_use]
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

/// A binding addressed through its element: the `(element, id)` pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BindingKey<E> {
    /// The element the binding is attached to.
    pub element: E,
    /// The binding on that element.
    pub binding: BindingId,
}

impl<E> BindingKey<E> {
    /// Creates a key for `binding` on `element`.
    #[must_use]
    #[inline]
    pub const fn new(element: E, binding: BindingId) -> Self {
        Self { element, binding }
    }
}
