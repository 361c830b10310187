// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pending per-element requests, accumulated between frames.

use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashSet;

/// Structural change reported for an element by the UI tree.
///
/// Only [`Add`](Self::Add) and [`Remove`](Self::Remove) are treated specially;
/// every other change may alter the element's inherited data source and
/// queues a source-changed request.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HierarchyChange {
    /// The element was attached to the tree.
    Add,
    /// The element was detached from the tree.
    Remove,
    /// The element moved to another parent without being detached.
    Move,
    /// The element's children were reordered.
    ChildrenReordered,
}

bitflags::bitflags! {
    /// Which aspects of an element changed, as reported by the UI tree.
    ///
    /// Only [`BINDING_REGISTRATION`](Self::BINDING_REGISTRATION) and
    /// [`DATA_SOURCE`](Self::DATA_SOURCE) concern bindings; other bits are
    /// accepted and ignored.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct VersionChange: u32 {
        /// Bindings were added to or removed from the element.
        const BINDING_REGISTRATION = 1 << 0;
        /// The element's data source or data source path changed.
        const DATA_SOURCE          = 1 << 1;
        /// The element's place in the hierarchy changed.
        const HIERARCHY            = 1 << 2;
        /// The element's style changed.
        const STYLE                = 1 << 3;
        /// The element's layout changed.
        const LAYOUT               = 1 << 4;
    }
}

/// Deduplicated element requests waiting for the next frame.
///
/// Three sets are kept: elements whose binding registrations changed,
/// elements whose resolved data source may differ, and elements removed from
/// the tree. Every request is idempotent and the sets are unordered.
///
/// Removal and re-attachment interact:
///
/// - Removing an element cancels its pending source-changed request.
/// - Adding an element back cancels its pending removal and queues a
///   source-changed request instead, so a move only re-resolves sources.
///
/// ```rust
/// use understory_binding::{HierarchyChange, RequestQueues};
///
/// let mut queues = RequestQueues::<u32>::new();
///
/// queues.request_source_changed(1);
/// queues.on_hierarchy_change(1, HierarchyChange::Remove);
/// assert!(queues.is_removal_pending(1));
/// assert!(!queues.is_source_change_pending(1));
///
/// queues.on_hierarchy_change(1, HierarchyChange::Add);
/// assert!(!queues.is_removal_pending(1));
/// assert!(queues.is_source_change_pending(1));
/// ```
#[derive(Clone, Debug)]
pub struct RequestQueues<E>
where
    E: Copy + Eq + Hash,
{
    registrations: HashSet<E>,
    source_changes: HashSet<E>,
    removals: HashSet<E>,
    order_dirty: bool,
}

/// The contents of [`RequestQueues`] taken at the start of a frame.
///
/// Buffers keep their capacity between frames when reused through
/// [`RequestQueues::drain_into`].
#[derive(Clone, Debug)]
pub struct DrainedRequests<E> {
    /// Elements whose binding registrations must be processed.
    pub registrations: Vec<E>,
    /// Elements whose cached data source must be re-resolved.
    pub source_changes: Vec<E>,
    /// Elements removed from the tree.
    pub removals: Vec<E>,
    /// `true` if any hierarchy change was reported since the last drain.
    pub order_dirty: bool,
}

impl<E> Default for DrainedRequests<E> {
    fn default() -> Self {
        Self {
            registrations: Vec::new(),
            source_changes: Vec::new(),
            removals: Vec::new(),
            order_dirty: false,
        }
    }
}

impl<E> DrainedRequests<E> {
    /// Returns `true` if nothing was drained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
            && self.source_changes.is_empty()
            && self.removals.is_empty()
            && !self.order_dirty
    }

    fn clear(&mut self) {
        self.registrations.clear();
        self.source_changes.clear();
        self.removals.clear();
        self.order_dirty = false;
    }
}

impl<E> Default for RequestQueues<E>
where
    E: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> RequestQueues<E>
where
    E: Copy + Eq + Hash,
{
    /// Creates empty queues.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registrations: HashSet::new(),
            source_changes: HashSet::new(),
            removals: HashSet::new(),
            order_dirty: false,
        }
    }

    /// Queues a binding-registration request for `element`.
    ///
    /// Returns `false` if one was already pending.
    pub fn request_registration(&mut self, element: E) -> bool {
        self.registrations.insert(element)
    }

    /// Queues a source-changed request for `element`.
    ///
    /// Returns `false` if one was already pending.
    pub fn request_source_changed(&mut self, element: E) -> bool {
        self.source_changes.insert(element)
    }

    /// Records that `element` was detached, cancelling any pending
    /// source-changed request for it.
    pub fn element_removed(&mut self, element: E) {
        self.source_changes.remove(&element);
        self.removals.insert(element);
    }

    /// Records that `element` was attached.
    ///
    /// A pending removal of the same element is cancelled; either way the
    /// element's data source must be re-resolved.
    pub fn element_added(&mut self, element: E) {
        self.removals.remove(&element);
        self.source_changes.insert(element);
    }

    /// Routes a hierarchy notification to the matching queue.
    pub fn on_hierarchy_change(&mut self, element: E, change: HierarchyChange) {
        match change {
            HierarchyChange::Add => self.element_added(element),
            HierarchyChange::Remove => self.element_removed(element),
            HierarchyChange::Move | HierarchyChange::ChildrenReordered => {
                self.request_source_changed(element);
            }
        }
        self.order_dirty = true;
    }

    /// Routes a version notification to the matching queues.
    pub fn on_version_change(&mut self, element: E, change: VersionChange) {
        if change.contains(VersionChange::BINDING_REGISTRATION) {
            self.request_registration(element);
        }
        if change.contains(VersionChange::DATA_SOURCE) {
            self.request_source_changed(element);
        }
    }

    /// Returns `true` if a registration request is pending for `element`.
    #[must_use]
    pub fn is_registration_pending(&self, element: E) -> bool {
        self.registrations.contains(&element)
    }

    /// Returns `true` if a source-changed request is pending for `element`.
    #[must_use]
    pub fn is_source_change_pending(&self, element: E) -> bool {
        self.source_changes.contains(&element)
    }

    /// Returns `true` if a removal is pending for `element`.
    #[must_use]
    pub fn is_removal_pending(&self, element: E) -> bool {
        self.removals.contains(&element)
    }

    /// Returns `true` if the hierarchy changed since the last drain.
    #[must_use]
    pub fn is_order_dirty(&self) -> bool {
        self.order_dirty
    }

    /// Returns `true` if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
            && self.source_changes.is_empty()
            && self.removals.is_empty()
            && !self.order_dirty
    }

    /// Moves every pending request into `out` and empties the queues.
    ///
    /// `out` is cleared first.
    pub fn drain_into(&mut self, out: &mut DrainedRequests<E>) {
        out.clear();
        out.registrations.extend(self.registrations.drain());
        out.source_changes.extend(self.source_changes.drain());
        out.removals.extend(self.removals.drain());
        out.order_dirty = core::mem::take(&mut self.order_dirty);
    }

    /// Drops every pending request.
    pub fn clear(&mut self) {
        self.registrations.clear();
        self.source_changes.clear();
        self.removals.clear();
        self.order_dirty = false;
    }
}
