// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conventional per-binding scheduling.
//!
//! The updater asks its host whether a binding should run at a given stage
//! (see [`BindingHost::should_process_at_stage`](crate::BindingHost::should_process_at_stage)).
//! Hosts are free to answer however they like; [`BindingSchedule`] is the
//! usual answer, built from an update trigger and a binding mode.

use crate::result::UpdateStage;

/// When a binding pulls from its source.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum UpdateTrigger {
    /// Only when the binding is dirty.
    WhenDirty,
    /// When the source changed or the binding is dirty.
    #[default]
    OnSourceChanged,
    /// Every frame.
    EveryUpdate,
}

/// Which directions a binding transfers values in.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum BindingMode {
    /// Source to UI and UI to source.
    #[default]
    TwoWay,
    /// UI to source only.
    ToSource,
    /// Source to UI only.
    ToTarget,
    /// Source to UI, once per time the binding is dirtied.
    ToTargetOnce,
}

impl BindingMode {
    /// Returns `true` if values flow from the source into the UI.
    #[must_use]
    pub const fn updates_ui(self) -> bool {
        !matches!(self, Self::ToSource)
    }

    /// Returns `true` if values flow from the UI into the source.
    #[must_use]
    pub const fn updates_source(self) -> bool {
        matches!(self, Self::TwoWay | Self::ToSource)
    }
}

/// Trigger and mode of one binding.
///
/// ```rust
/// use understory_binding::{BindingMode, BindingSchedule, UpdateStage, UpdateTrigger};
///
/// let schedule = BindingSchedule::new(UpdateTrigger::OnSourceChanged, BindingMode::TwoWay);
///
/// // Clean binding on an unchanged source: nothing to do.
/// assert!(!schedule.should_process(UpdateStage::UpdateUi, false, false));
/// // The source changed.
/// assert!(schedule.should_process(UpdateStage::UpdateUi, true, false));
/// // UI edits always flow back for two-way bindings.
/// assert!(schedule.should_process(UpdateStage::UpdateSource, false, false));
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BindingSchedule {
    /// When the binding pulls from its source.
    pub trigger: UpdateTrigger,
    /// Which directions the binding transfers values in.
    pub mode: BindingMode,
}

impl BindingSchedule {
    /// Creates a schedule.
    #[must_use]
    pub const fn new(trigger: UpdateTrigger, mode: BindingMode) -> Self {
        Self { trigger, mode }
    }

    /// Decides whether the binding runs at `stage`.
    ///
    /// `source_changed` is the ledger's verdict for the binding's source this
    /// frame; `dirty` is the binding's dirty flag.
    #[must_use]
    pub fn should_process(self, stage: UpdateStage, source_changed: bool, dirty: bool) -> bool {
        match stage {
            UpdateStage::UpdateUi => {
                if !self.mode.updates_ui() {
                    return false;
                }
                if self.mode == BindingMode::ToTargetOnce {
                    return dirty;
                }
                match self.trigger {
                    UpdateTrigger::WhenDirty => dirty,
                    UpdateTrigger::OnSourceChanged => source_changed || dirty,
                    UpdateTrigger::EveryUpdate => true,
                }
            }
            UpdateStage::UpdateSource => self.mode.updates_source(),
        }
    }
}
