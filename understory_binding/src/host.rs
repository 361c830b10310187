// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The interface between the updater and the UI it drives.

use alloc::vec::Vec;
use core::fmt;
use core::hash::Hash;

use crate::id::{BindingId, BindingKey, PanelId};
use crate::path::PropertyPath;
use crate::result::{BindingResult, UpdateStage};
use crate::source::DataSource;

/// A binding's data source and path, as resolved by the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedSource<S> {
    /// The source, or `None` if the binding currently resolves to nothing.
    pub source: Option<S>,
    /// The path into the source.
    pub path: PropertyPath,
}

impl<S> ResolvedSource<S> {
    /// A resolution to `path` on `source`.
    #[must_use]
    pub fn new(source: S, path: PropertyPath) -> Self {
        Self {
            source: Some(source),
            path,
        }
    }

    /// A resolution to no source at all.
    #[must_use]
    pub fn unresolved() -> Self {
        Self {
            source: None,
            path: PropertyPath::new(),
        }
    }
}

/// Everything a binding execution needs to know about its target and source.
///
/// Built by the updater right before calling
/// [`BindingHost::update_ui`] or [`BindingHost::update_source`].
#[derive(Clone, Copy, Debug)]
pub struct BindingContext<'a, E, S> {
    /// The target element.
    pub element: E,
    /// The binding, which also identifies the target property.
    pub binding: BindingId,
    /// The resolved source.
    pub source: Option<S>,
    /// The resolved path into the source.
    pub path: &'a PropertyPath,
}

impl<E: Copy, S> BindingContext<'_, E, S> {
    /// Returns the key of the binding being executed.
    #[must_use]
    pub fn key(&self) -> BindingKey<E> {
        BindingKey::new(self.element, self.binding)
    }
}

/// The UI tree, binding manager, and binding execution the updater drives.
///
/// The updater owns no bindings, elements, or sources. It reaches them through
/// this trait, addressing elements by [`Element`](Self::Element) keys and
/// sources by [`Source`](Self::Source) keys.
///
/// # Host responsibilities
///
/// - New bindings created by [`process_binding_requests`](Self::process_binding_requests)
///   start dirty.
/// - [`invalidate_cached_data_source`](Self::invalidate_cached_data_source)
///   marks the bindings whose resolved source may have changed dirty, and
///   forgets bindings of removed elements.
/// - [`drain_ui_changes`](Self::drain_ui_changes) reports each UI-side edit
///   collected since the previous frame and forgets it.
///
/// Every method is called from within [`BindingUpdater::update`](crate::BindingUpdater::update)
/// on a single thread; none of them may call back into the updater.
pub trait BindingHost {
    /// Key of a UI element.
    type Element: Copy + Eq + Hash + fmt::Debug;
    /// Key of a data source.
    type Source: Copy + Eq + Hash + fmt::Debug;

    // Tree

    /// Returns the panel `element` is attached to, or `None` if it is detached.
    fn element_panel(&self, element: Self::Element) -> Option<PanelId>;

    /// Returns the display name of `panel`, used in diagnostics.
    fn panel_name(&self, panel: PanelId) -> &str;

    // Registrations

    /// Applies pending binding registrations and unregistrations of `element`.
    fn process_binding_requests(&mut self, element: Self::Element);

    /// Drops cached source resolutions for `changed` and `removed` elements
    /// (and, typically, their descendants).
    fn invalidate_cached_data_source(
        &mut self,
        changed: &[Self::Element],
        removed: &[Self::Element],
    );

    /// Notes that the hierarchy changed and bound elements may need reordering.
    fn dirty_binding_order(&mut self) {}

    /// Writes every element with at least one binding into `out`.
    ///
    /// `out` is empty on entry. The order is the sweep order.
    fn bound_elements(&self, out: &mut Vec<Self::Element>);

    /// Returns the number of elements with at least one binding.
    fn bound_elements_count(&self) -> usize;

    /// Writes the bindings of `element` into `out`, which is empty on entry.
    fn bindings(&self, element: Self::Element, out: &mut Vec<BindingId>);

    /// Returns `true` if `key` still names a registered binding.
    fn contains_binding(&self, key: BindingKey<Self::Element>) -> bool;

    /// Resolves the current data source and path of a binding.
    fn resolve_data_source(
        &mut self,
        key: BindingKey<Self::Element>,
    ) -> ResolvedSource<Self::Source>;

    // Sources

    /// Looks up a data source by key.
    fn data_source(&self, source: Self::Source) -> Option<&dyn DataSource>;

    /// Returns the paths `source` reported as changed, if it reports changes.
    fn changes_from_source(&self, source: Self::Source) -> Option<&[PropertyPath]> {
        self.data_source(source)?
            .as_change_notifier()
            .map(|notifier| notifier.changed_paths())
    }

    /// Forgets the changes `source` reported.
    ///
    /// Called once per frame for every source observed in that frame.
    fn clear_changes_from_source(&mut self, source: Self::Source);

    /// Drops every cached source-side state (resolutions, change records).
    ///
    /// Called when no element is bound anymore, and on disposal.
    fn clear_source_cache(&mut self) {}

    /// Moves the bindings edited from the UI since the last frame into `out`.
    fn drain_ui_changes(&mut self, out: &mut Vec<BindingKey<Self::Element>>);

    // Bindings

    /// Returns the dirty flag of a binding.
    fn is_dirty(&self, key: BindingKey<Self::Element>) -> bool;

    /// Sets the dirty flag of a binding.
    fn set_dirty(&mut self, key: BindingKey<Self::Element>, dirty: bool);

    /// Decides whether a binding runs at `stage` this frame.
    ///
    /// `source_changed` tells whether the binding's source changed since its
    /// version was last committed. See [`BindingSchedule`](crate::BindingSchedule)
    /// for the conventional answer.
    fn should_process_at_stage(
        &self,
        key: BindingKey<Self::Element>,
        stage: UpdateStage,
        source_changed: bool,
    ) -> bool;

    /// Transfers the source value into the UI.
    fn update_ui(
        &mut self,
        context: &BindingContext<'_, Self::Element, Self::Source>,
    ) -> BindingResult;

    /// Transfers the UI value into the source.
    fn update_source(
        &mut self,
        context: &BindingContext<'_, Self::Element, Self::Source>,
    ) -> BindingResult;
}
