// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Data sources and their optional change-detection capabilities.
//!
//! The engine treats a data source as opaque. A source may opt in to cheaper
//! change detection by exposing one or both capabilities:
//!
//! - [`ViewHashProvider`]: a single integer summarizing the observable state.
//!   Bindings on the source are skipped while the hash is stable.
//! - [`ChangeNotifier`]: the set of paths known to have changed. Clean bindings
//!   whose path is unaffected are skipped.
//!
//! A source with neither capability is considered changed on every frame.

use alloc::vec::Vec;

use crate::path::{PropertyPath, is_prefix};

/// An object bindings read from and write to.
///
/// Both capability accessors default to `None`. Implement them by returning
/// `Some(self)` when the type also implements the capability trait.
///
/// ```rust
/// use understory_binding::{DataSource, ViewHashProvider};
///
/// struct Counter {
///     edits: i64,
/// }
///
/// impl ViewHashProvider for Counter {
///     fn view_hash(&self) -> i64 {
///         self.edits
///     }
/// }
///
/// impl DataSource for Counter {
///     fn as_view_hash_provider(&self) -> Option<&dyn ViewHashProvider> {
///         Some(self)
///     }
/// }
///
/// let counter = Counter { edits: 7 };
/// assert_eq!(counter.as_view_hash_provider().map(|p| p.view_hash()), Some(7));
/// assert!(counter.as_change_notifier().is_none());
/// ```
pub trait DataSource {
    /// Returns the hash capability, if this source has one.
    fn as_view_hash_provider(&self) -> Option<&dyn ViewHashProvider> {
        None
    }

    /// Returns the change-notification capability, if this source has one.
    fn as_change_notifier(&self) -> Option<&dyn ChangeNotifier> {
        None
    }
}

/// A source that can summarize its observable state as one integer.
///
/// The hash must change whenever any value a binding could read changes.
/// Collisions make the engine miss updates, so prefer a revision counter over
/// a content hash when one is available.
pub trait ViewHashProvider {
    /// Returns the current view hash.
    fn view_hash(&self) -> i64;
}

/// A source that records which of its paths changed.
///
/// Reported paths stay visible until the host clears them, which happens at
/// the end of every frame in which the source was observed
/// (see [`BindingHost::clear_changes_from_source`](crate::BindingHost::clear_changes_from_source)).
pub trait ChangeNotifier {
    /// Returns the paths changed since the last clear.
    ///
    /// The empty path means the whole source changed.
    fn changed_paths(&self) -> &[PropertyPath];
}

/// A deduplicated list of changed paths.
///
/// Convenient backing storage for [`ChangeNotifier`] implementations.
///
/// ```rust
/// use understory_binding::{ChangedPaths, PropertyPath};
///
/// let mut changes = ChangedPaths::new();
/// changes.record(PropertyPath::new().with_name("title"));
/// changes.record(PropertyPath::new().with_name("title"));
/// assert_eq!(changes.as_slice().len(), 1);
///
/// changes.clear();
/// assert!(changes.is_empty());
/// ```
#[derive(Clone, Debug, Default)]
pub struct ChangedPaths {
    paths: Vec<PropertyPath>,
}

impl ChangedPaths {
    /// Creates an empty change list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `path` as changed.
    ///
    /// Returns `false` if an equal path was already recorded.
    pub fn record(&mut self, path: PropertyPath) -> bool {
        if self.paths.contains(&path) {
            return false;
        }
        self.paths.push(path);
        true
    }

    /// Returns the recorded paths in recording order.
    #[must_use]
    pub fn as_slice(&self) -> &[PropertyPath] {
        &self.paths
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Returns `true` if any recorded path is a prefix of `path`.
    #[must_use]
    pub fn affects(&self, path: &PropertyPath) -> bool {
        self.paths.iter().any(|changed| is_prefix(changed, path))
    }

    /// Forgets every recorded path.
    pub fn clear(&mut self) {
        self.paths.clear();
    }
}
