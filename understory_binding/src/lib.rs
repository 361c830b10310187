// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Binding: incremental two-way data binding for retained UI trees.
//!
//! Elements of a UI tree carry bindings, each linking one UI property to a
//! path into a data source. Once per frame, [`BindingUpdater::update`] moves
//! source values into the UI and UI edits back into sources, doing work only
//! for bindings whose inputs changed:
//!
//! - **Version ledger** ([`VersionLedger`]): sources exposing a
//!   [`ViewHashProvider`] are skipped while their hash is stable. Sources
//!   without one are re-read every frame.
//! - **Path filtering** ([`PropertyPath`], [`is_prefix`]): sources exposing a
//!   [`ChangeNotifier`] only wake bindings at or below a changed path.
//! - **Dirty flags**: new or re-targeted bindings are dirty and always run;
//!   a successful run clears the flag.
//! - **Request queues** ([`RequestQueues`]): registrations, source changes and
//!   removals reported between frames are deduplicated and applied at the
//!   start of the next frame.
//! - **Results** ([`BindingResult`], [`ResultCache`]): each execution reports
//!   success, pending, or failure. The last result per direction is kept and
//!   messages are logged through a [`DiagnosticSink`] according to a
//!   [`LogLevel`].
//!
//! The UI tree, binding storage and the binding logic itself stay with the
//! embedder, which exposes them by implementing [`BindingHost`].
//!
//! ## Frame protocol
//!
//! ```text
//! requests ─▶ UI pull ─▶ source push (+ round trip) ─▶ commit versions
//! ```
//!
//! A binding that successfully pulled from its source is not pushed back in
//! the same frame, and source versions are committed only after both sweeps,
//! so every binding sharing a source sees the same verdict. See
//! [`BindingUpdater`] for the exact rules.
//!
//! ## Scheduling
//!
//! Whether a binding runs at a stage is the host's decision
//! ([`BindingHost::should_process_at_stage`]). [`BindingSchedule`] implements
//! the usual trigger/mode matrix for hosts that do not need anything special.
//!
//! ## Diagnostics
//!
//! [`TracingSink`], the default sink, reports results as `tracing` events.
//! The updater additionally emits a `TRACE` summary per frame.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod config;
mod diagnostics;
mod host;
mod id;
mod ledger;
mod path;
mod requests;
mod result;
mod schedule;
mod source;
mod updater;

pub use config::UpdaterConfig;
pub use diagnostics::{BindingLogRecord, DiagnosticSink, TracingSink};
pub use host::{BindingContext, BindingHost, ResolvedSource};
pub use id::{BindingId, BindingKey, PanelId};
pub use ledger::{INITIAL_VERSION, SourceVersion, VersionLedger};
pub use path::{PathParseError, PathPart, PropertyPath, is_prefix};
pub use requests::{DrainedRequests, HierarchyChange, RequestQueues, VersionChange};
pub use result::{BindingResult, BindingStatus, LogLevel, ResultCache, UpdateStage};
pub use schedule::{BindingMode, BindingSchedule, UpdateTrigger};
pub use source::{ChangeNotifier, ChangedPaths, DataSource, ViewHashProvider};
pub use updater::{BindingUpdater, FrameSummary};
