// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Binding results and the per-direction result cache.

use alloc::string::String;
use core::hash::Hash;

use hashbrown::HashMap;

use crate::id::BindingKey;

/// Outcome class of one binding execution.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BindingStatus {
    /// The value was transferred.
    Success,
    /// The value could not be transferred yet; try again later.
    Pending,
    /// The value could not be transferred.
    Failure,
}

/// Result of one binding execution.
///
/// This is the only error channel of the update path: bindings report
/// problems through `status` and an optional `message`, never by panicking.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BindingResult {
    /// What happened.
    pub status: BindingStatus,
    /// Human-readable details; empty when there is nothing to say.
    pub message: String,
}

impl BindingResult {
    /// A successful result with no message.
    #[must_use]
    pub fn success() -> Self {
        Self::new(BindingStatus::Success, String::new())
    }

    /// A pending result with `message`.
    #[must_use]
    pub fn pending(message: impl Into<String>) -> Self {
        Self::new(BindingStatus::Pending, message.into())
    }

    /// A failed result with `message`.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(BindingStatus::Failure, message.into())
    }

    /// Creates a result from its parts.
    #[must_use]
    pub fn new(status: BindingStatus, message: String) -> Self {
        Self { status, message }
    }

    /// Returns `true` if the message is empty or only whitespace.
    #[must_use]
    pub fn is_silent(&self) -> bool {
        self.message.trim().is_empty()
    }
}

/// Direction of a binding execution, also used as the scheduling stage.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UpdateStage {
    /// Source values flow into the UI.
    UpdateUi,
    /// UI edits flow into the source.
    UpdateSource,
}

/// How much of the binding result stream reaches the diagnostic sink.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum LogLevel {
    /// Never log.
    None,
    /// Log a result only when it differs from the previous one for the same
    /// binding and direction.
    Once,
    /// Log every result that carries a message.
    #[default]
    All,
}

impl LogLevel {
    /// Decides whether `result` should be logged, given the previously cached
    /// result for the same binding and direction.
    #[must_use]
    pub fn should_log(self, previous: Option<&BindingResult>, result: &BindingResult) -> bool {
        if result.is_silent() {
            return false;
        }
        match self {
            Self::None => false,
            Self::Once => previous != Some(result),
            Self::All => true,
        }
    }
}

/// Last result per binding, kept separately for each direction.
///
/// ```rust
/// use understory_binding::{BindingId, BindingKey, BindingResult, ResultCache, UpdateStage};
///
/// let mut cache = ResultCache::<u32>::new();
/// let key = BindingKey::new(1, BindingId::new(0));
///
/// let previous = cache.cache(key, UpdateStage::UpdateUi, BindingResult::pending("loading"));
/// assert!(previous.is_none());
/// assert!(cache.last(key, UpdateStage::UpdateSource).is_none());
/// ```
#[derive(Clone, Debug)]
pub struct ResultCache<E>
where
    E: Copy + Eq + Hash,
{
    ui: HashMap<BindingKey<E>, BindingResult>,
    source: HashMap<BindingKey<E>, BindingResult>,
}

impl<E> Default for ResultCache<E>
where
    E: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> ResultCache<E>
where
    E: Copy + Eq + Hash,
{
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ui: HashMap::new(),
            source: HashMap::new(),
        }
    }

    fn map(&self, stage: UpdateStage) -> &HashMap<BindingKey<E>, BindingResult> {
        match stage {
            UpdateStage::UpdateUi => &self.ui,
            UpdateStage::UpdateSource => &self.source,
        }
    }

    /// Returns the last result cached for `key` in direction `stage`.
    #[must_use]
    pub fn last(&self, key: BindingKey<E>, stage: UpdateStage) -> Option<&BindingResult> {
        self.map(stage).get(&key)
    }

    /// Caches `result`, returning the result it replaces.
    pub fn cache(
        &mut self,
        key: BindingKey<E>,
        stage: UpdateStage,
        result: BindingResult,
    ) -> Option<BindingResult> {
        let map = match stage {
            UpdateStage::UpdateUi => &mut self.ui,
            UpdateStage::UpdateSource => &mut self.source,
        };
        map.insert(key, result)
    }

    /// Drops every result cached for bindings on `element`.
    pub fn forget_element(&mut self, element: E) {
        self.ui.retain(|key, _| key.element != element);
        self.source.retain(|key, _| key.element != element);
    }

    /// Returns the number of cached results across both directions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ui.len() + self.source.len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ui.is_empty() && self.source.is_empty()
    }

    /// Drops every cached result.
    pub fn clear(&mut self) {
        self.ui.clear();
        self.source.clear();
    }
}
