// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-source version bookkeeping.

use core::hash::Hash;

use hashbrown::HashMap;

/// Version reported for a source seen for the first time without a view hash.
pub const INITIAL_VERSION: i64 = 0;

/// Outcome of a version check: whether the source changed, and the version to
/// record for it at the end of the frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SourceVersion {
    /// `true` if bindings on the source may observe new values.
    pub changed: bool,
    /// The version to commit once the frame is over.
    pub version: i64,
}

/// Remembers the last committed version of every observed data source.
///
/// The ledger answers "did this source change since it was last committed?"
/// without mutating anything; the driver commits versions only after every
/// binding of the frame has been evaluated, so all bindings sharing a source
/// see the same answer.
///
/// Sources with a view hash use it as their version. Sources without one
/// cannot say they are unchanged: every check reports a change and bumps the
/// version by one. The bump saturates at `i64::MAX`, which such a source can
/// only reach by having reported a hash near it before losing its hash
/// capability; from there every check still reports a change.
///
/// ```rust
/// use understory_binding::VersionLedger;
///
/// let mut ledger = VersionLedger::<u32>::new();
///
/// // First sighting of a hashed source.
/// let v = ledger.source_version(1, Some(40));
/// assert!(v.changed);
/// ledger.update_version(1, v.version);
///
/// // Same hash: unchanged.
/// assert!(!ledger.source_version(1, Some(40)).changed);
///
/// // Unhashed sources always change.
/// ledger.update_version(2, 0);
/// let v = ledger.source_version(2, None);
/// assert!(v.changed);
/// assert_eq!(v.version, 1);
/// ```
#[derive(Clone, Debug)]
pub struct VersionLedger<S>
where
    S: Copy + Eq + Hash,
{
    versions: HashMap<S, i64>,
}

impl<S> Default for VersionLedger<S>
where
    S: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> VersionLedger<S>
where
    S: Copy + Eq + Hash,
{
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self {
            versions: HashMap::new(),
        }
    }

    /// Returns the last committed version of `source`.
    #[must_use]
    pub fn last_version(&self, source: S) -> Option<i64> {
        self.versions.get(&source).copied()
    }

    /// Checks `source` against its last committed version.
    ///
    /// `view_hash` is the source's current hash, or `None` when it has no hash
    /// capability.
    #[must_use]
    pub fn source_version(&self, source: S, view_hash: Option<i64>) -> SourceVersion {
        match (self.last_version(source), view_hash) {
            (None, hash) => SourceVersion {
                changed: true,
                version: hash.unwrap_or(INITIAL_VERSION),
            },
            (Some(last), None) => SourceVersion {
                changed: true,
                version: last.saturating_add(1),
            },
            (Some(last), Some(hash)) => SourceVersion {
                changed: hash != last,
                version: hash,
            },
        }
    }

    /// Commits `version` as the last seen version of `source`.
    pub fn update_version(&mut self, source: S, version: i64) {
        self.versions.insert(source, version);
    }

    /// Forgets `source`, returning its last version.
    pub fn forget(&mut self, source: S) -> Option<i64> {
        self.versions.remove(&source)
    }

    /// Returns the number of tracked sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Returns `true` if no source is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Forgets every source.
    pub fn clear(&mut self) {
        self.versions.clear();
    }
}
