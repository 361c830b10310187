// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-frame binding update driver.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;
use core::hash::Hash;
use core::mem;

use hashbrown::{HashMap, HashSet};

use crate::config::UpdaterConfig;
use crate::diagnostics::{BindingLogRecord, DiagnosticSink, TracingSink};
use crate::host::{BindingContext, BindingHost, ResolvedSource};
use crate::id::{BindingId, BindingKey, PanelId};
use crate::ledger::{SourceVersion, VersionLedger};
use crate::path::is_prefix;
use crate::requests::{DrainedRequests, HierarchyChange, RequestQueues, VersionChange};
use crate::result::{BindingResult, BindingStatus, LogLevel, ResultCache, UpdateStage};

/// What one call to [`BindingUpdater::update`] did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameSummary {
    /// The frame number, starting at 1.
    pub frame: u64,
    /// Registration requests handed to the host.
    pub registrations: usize,
    /// Elements whose cached data source was invalidated (changed or removed).
    pub invalidated: usize,
    /// UI-direction executions in the UI-pull sweep.
    pub ui_updates: usize,
    /// Source-direction executions.
    pub source_updates: usize,
    /// UI-direction executions following a successful source update.
    pub round_trips: usize,
    /// Bindings considered but not executed.
    pub skipped: usize,
}

#[derive(Debug)]
struct Scratch<E> {
    requests: DrainedRequests<E>,
    elements: Vec<E>,
    bindings: Vec<BindingId>,
    ui_changes: Vec<BindingKey<E>>,
}

impl<E> Default for Scratch<E> {
    fn default() -> Self {
        Self {
            requests: DrainedRequests::default(),
            elements: Vec::new(),
            bindings: Vec::new(),
            ui_changes: Vec::new(),
        }
    }
}

/// Drives every binding of one panel, once per frame.
///
/// Between frames the updater accumulates element notifications
/// ([`on_hierarchy_change`](Self::on_hierarchy_change),
/// [`on_version_change`](Self::on_version_change)). Each call to
/// [`update`](Self::update) then runs, in order:
///
/// 1. **Requests**: pending registrations are handed to the host, and cached
///    sources of changed or removed elements are invalidated. Requests for
///    elements no longer attached to this panel are dropped.
/// 2. **UI pull**: every binding of every bound element is considered. Its
///    source version is checked against the ledger, the host's schedule is
///    consulted, and sources that report explicit changes are filtered by path.
///    Bindings that pass are executed towards the UI.
/// 3. **Source push**: every UI edit reported by the host is executed towards
///    its source, unless the same binding already succeeded in the UI pull.
///    A successful push is followed by one more UI execution so the UI shows
///    the value as the source stored it.
/// 4. **Commit**: source versions observed during the frame are written to the
///    ledger, and the sources' change records are cleared.
///
/// # Dirty flags
///
/// A binding's dirty flag is cleared right before each UI execution. A
/// successful result leaves it clear. A pending result restores it only if it
/// was set going in, so a clean binding does not retry on its own. A failure
/// leaves it clear, so a binding that keeps failing waits for its next source
/// change, unless [`UpdaterConfig::retry_failures`] is set.
///
/// # Convergence
///
/// Within one frame a binding runs at most once towards the UI in the pull
/// sweep, at most once towards its source, and at most once more towards the
/// UI after a successful push. A binding that succeeded in the pull sweep is
/// not pushed in the same frame, so a UI edit and a source change cannot
/// chase each other.
pub struct BindingUpdater<E, S>
where
    E: Copy + Eq + Hash + fmt::Debug,
    S: Copy + Eq + Hash,
{
    panel: PanelId,
    config: UpdaterConfig,
    frame: u64,
    requests: RequestQueues<E>,
    ledger: VersionLedger<S>,
    results: ResultCache<E>,
    sink: Box<dyn DiagnosticSink>,
    /// Verdicts observed this frame; the first observation of a source wins.
    frame_versions: HashMap<S, SourceVersion>,
    /// Bindings considered by the UI pull this frame.
    pulled: HashSet<BindingKey<E>>,
    /// Bindings whose UI pull succeeded this frame.
    pull_succeeded: HashSet<BindingKey<E>>,
    /// Bindings pushed to their source this frame.
    pushed: HashSet<BindingKey<E>>,
    scratch: Scratch<E>,
}

impl<E, S> fmt::Debug for BindingUpdater<E, S>
where
    E: Copy + Eq + Hash + fmt::Debug,
    S: Copy + Eq + Hash + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingUpdater")
            .field("panel", &self.panel)
            .field("config", &self.config)
            .field("frame", &self.frame)
            .field("requests", &self.requests)
            .field("ledger", &self.ledger)
            .field("results", &self.results)
            .finish_non_exhaustive()
    }
}

impl<E, S> BindingUpdater<E, S>
where
    E: Copy + Eq + Hash + fmt::Debug,
    S: Copy + Eq + Hash,
{
    /// Creates an updater for `panel` with the default configuration, logging
    /// through [`TracingSink`].
    #[must_use]
    pub fn new(panel: PanelId) -> Self {
        Self::with_config(panel, UpdaterConfig::default())
    }

    /// Creates an updater for `panel` with `config`, logging through
    /// [`TracingSink`].
    #[must_use]
    pub fn with_config(panel: PanelId, config: UpdaterConfig) -> Self {
        Self {
            panel,
            config,
            frame: 0,
            requests: RequestQueues::new(),
            ledger: VersionLedger::new(),
            results: ResultCache::new(),
            sink: Box::new(TracingSink),
            frame_versions: HashMap::new(),
            pulled: HashSet::new(),
            pull_succeeded: HashSet::new(),
            pushed: HashSet::new(),
            scratch: Scratch::default(),
        }
    }

    /// Replaces the diagnostic sink.
    #[must_use]
    pub fn with_sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.set_sink(sink);
        self
    }

    /// Replaces the diagnostic sink.
    pub fn set_sink(&mut self, sink: impl DiagnosticSink + 'static) {
        self.sink = Box::new(sink);
    }

    /// Returns the panel this updater drives.
    #[must_use]
    pub fn panel(&self) -> PanelId {
        self.panel
    }

    /// Returns the number of the last frame run, or 0 before the first.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    /// Returns the current log level.
    #[must_use]
    pub fn log_level(&self) -> LogLevel {
        self.config.log_level
    }

    /// Changes the log level; takes effect with the next result.
    pub fn set_log_level(&mut self, log_level: LogLevel) {
        self.config.log_level = log_level;
    }

    /// Returns the pending request queues.
    #[must_use]
    pub fn requests(&self) -> &RequestQueues<E> {
        &self.requests
    }

    /// Returns the pending request queues for direct queuing.
    pub fn requests_mut(&mut self) -> &mut RequestQueues<E> {
        &mut self.requests
    }

    /// Queues the requests implied by a structural change of `element`.
    pub fn on_hierarchy_change(&mut self, element: E, change: HierarchyChange) {
        self.requests.on_hierarchy_change(element, change);
    }

    /// Queues the requests implied by a version change of `element`.
    pub fn on_version_change(&mut self, element: E, change: VersionChange) {
        self.requests.on_version_change(element, change);
    }

    /// Returns the source version ledger.
    #[must_use]
    pub fn ledger(&self) -> &VersionLedger<S> {
        &self.ledger
    }

    /// Returns the number of data sources with a committed version.
    #[must_use]
    pub fn tracked_data_sources(&self) -> usize {
        self.ledger.len()
    }

    /// Returns the last committed version of `source`.
    #[must_use]
    pub fn last_version(&self, source: S) -> Option<i64> {
        self.ledger.last_version(source)
    }

    /// Returns the cached binding results.
    #[must_use]
    pub fn results(&self) -> &ResultCache<E> {
        &self.results
    }

    /// Returns the last UI-direction result of `key`.
    #[must_use]
    pub fn last_ui_result(&self, key: BindingKey<E>) -> Option<&BindingResult> {
        self.results.last(key, UpdateStage::UpdateUi)
    }

    /// Returns the last source-direction result of `key`.
    #[must_use]
    pub fn last_source_result(&self, key: BindingKey<E>) -> Option<&BindingResult> {
        self.results.last(key, UpdateStage::UpdateSource)
    }

    /// Runs one frame.
    ///
    /// # Panics
    ///
    /// Panics if the host lists a binding in [`BindingHost::bindings`] that
    /// [`BindingHost::contains_binding`] denies.
    pub fn update<H>(&mut self, host: &mut H) -> FrameSummary
    where
        H: BindingHost<Element = E, Source = S>,
    {
        self.frame += 1;
        let mut summary = FrameSummary {
            frame: self.frame,
            ..FrameSummary::default()
        };

        self.process_requests(host, &mut summary);

        if host.bound_elements_count() == 0 {
            // Edits of bindings that no longer exist.
            let mut changes = mem::take(&mut self.scratch.ui_changes);
            changes.clear();
            host.drain_ui_changes(&mut changes);
            changes.clear();
            self.scratch.ui_changes = changes;

            if !self.ledger.is_empty() {
                tracing::debug!(
                    frame = self.frame,
                    tracked = self.ledger.len(),
                    "no bound elements, clearing source cache"
                );
                self.ledger.clear();
                host.clear_source_cache();
            }
            return summary;
        }

        self.pull_into_ui(host, &mut summary);
        self.push_into_sources(host, &mut summary);
        self.commit(host);

        tracing::trace!(
            frame = summary.frame,
            registrations = summary.registrations,
            invalidated = summary.invalidated,
            ui_updates = summary.ui_updates,
            source_updates = summary.source_updates,
            round_trips = summary.round_trips,
            skipped = summary.skipped,
            "binding frame done"
        );
        summary
    }

    /// Drops all pending requests, versions, and cached results, and clears
    /// the host's source cache.
    pub fn dispose<H>(&mut self, host: &mut H)
    where
        H: BindingHost<Element = E, Source = S>,
    {
        self.requests.clear();
        self.ledger.clear();
        self.results.clear();
        self.frame_versions.clear();
        self.pulled.clear();
        self.pull_succeeded.clear();
        self.pushed.clear();
        host.clear_source_cache();
    }

    fn is_attached<H>(&self, host: &H, element: E) -> bool
    where
        H: BindingHost<Element = E, Source = S>,
    {
        host.element_panel(element) == Some(self.panel)
    }

    fn process_requests<H>(&mut self, host: &mut H, summary: &mut FrameSummary)
    where
        H: BindingHost<Element = E, Source = S>,
    {
        let mut drained = mem::take(&mut self.scratch.requests);
        self.requests.drain_into(&mut drained);

        if drained.order_dirty {
            host.dirty_binding_order();
        }

        for &element in &drained.registrations {
            if self.is_attached(host, element) {
                host.process_binding_requests(element);
                summary.registrations += 1;
            } else {
                tracing::trace!(?element, "dropping stale registration request");
            }
        }

        let panel = self.panel;
        drained.source_changes.retain(|&element| {
            let attached = host.element_panel(element) == Some(panel);
            if !attached {
                tracing::trace!(?element, "dropping stale source change request");
            }
            attached
        });
        if !drained.source_changes.is_empty() || !drained.removals.is_empty() {
            host.invalidate_cached_data_source(&drained.source_changes, &drained.removals);
            summary.invalidated = drained.source_changes.len() + drained.removals.len();
        }
        for &element in &drained.removals {
            self.results.forget_element(element);
        }

        self.scratch.requests = drained;
    }

    /// Checks `source` against the ledger once per frame and returns whether
    /// it changed.
    ///
    /// Later observations in the same frame reuse the first verdict, so a
    /// binding that writes to a shared source does not wake its siblings
    /// until the next frame.
    fn observe_source<H>(&mut self, host: &H, source: S) -> bool
    where
        H: BindingHost<Element = E, Source = S>,
    {
        if let Some(observed) = self.frame_versions.get(&source) {
            return observed.changed;
        }
        let view_hash = host
            .data_source(source)
            .and_then(|data| data.as_view_hash_provider())
            .map(|provider| provider.view_hash());
        let observed = self.ledger.source_version(source, view_hash);
        self.frame_versions.insert(source, observed);
        observed.changed
    }

    /// Returns the verdict observed for `source` this frame, or `true` if it
    /// was not observed.
    fn changed_this_frame(&self, source: S) -> bool {
        self.frame_versions
            .get(&source)
            .is_none_or(|observed| observed.changed)
    }

    /// Returns `true` if a clean binding on a change-reporting source can be
    /// skipped because none of the reported changes reach its path.
    fn unaffected_by_changes<H>(
        host: &H,
        key: BindingKey<E>,
        resolved: &ResolvedSource<S>,
    ) -> bool
    where
        H: BindingHost<Element = E, Source = S>,
    {
        let Some(source) = resolved.source else {
            return false;
        };
        let notifies = host
            .data_source(source)
            .is_some_and(|data| data.as_change_notifier().is_some());
        if !notifies || host.is_dirty(key) {
            return false;
        }
        !host.changes_from_source(source).is_some_and(|changes| {
            changes
                .iter()
                .any(|changed| is_prefix(changed, &resolved.path))
        })
    }

    fn pull_into_ui<H>(&mut self, host: &mut H, summary: &mut FrameSummary)
    where
        H: BindingHost<Element = E, Source = S>,
    {
        let mut elements = mem::take(&mut self.scratch.elements);
        let mut bindings = mem::take(&mut self.scratch.bindings);
        elements.clear();
        host.bound_elements(&mut elements);

        for &element in &elements {
            bindings.clear();
            host.bindings(element, &mut bindings);
            for &binding in &bindings {
                let key = BindingKey::new(element, binding);
                if self.pulled.insert(key) {
                    self.pull_binding(host, key, summary);
                }
            }
        }

        self.scratch.elements = elements;
        self.scratch.bindings = bindings;
    }

    fn pull_binding<H>(&mut self, host: &mut H, key: BindingKey<E>, summary: &mut FrameSummary)
    where
        H: BindingHost<Element = E, Source = S>,
    {
        assert!(
            host.contains_binding(key),
            "host listed {key:?} as bound but does not contain it"
        );
        let resolved = host.resolve_data_source(key);
        let changed = match resolved.source {
            Some(source) => self.observe_source(host, source),
            None => true,
        };

        if !host.should_process_at_stage(key, UpdateStage::UpdateUi, changed)
            || Self::unaffected_by_changes(host, key, &resolved)
        {
            summary.skipped += 1;
            return;
        }

        let was_dirty = host.is_dirty(key);
        host.set_dirty(key, false);
        let context = BindingContext {
            element: key.element,
            binding: key.binding,
            source: resolved.source,
            path: &resolved.path,
        };
        let result = host.update_ui(&context);
        summary.ui_updates += 1;

        let status = self.record(host, key, UpdateStage::UpdateUi, result);
        if status == BindingStatus::Success {
            self.pull_succeeded.insert(key);
        } else {
            self.settle_dirty(host, key, was_dirty, status);
        }
    }

    fn push_into_sources<H>(&mut self, host: &mut H, summary: &mut FrameSummary)
    where
        H: BindingHost<Element = E, Source = S>,
    {
        let mut changes = mem::take(&mut self.scratch.ui_changes);
        changes.clear();
        host.drain_ui_changes(&mut changes);

        for &key in &changes {
            if !self.is_attached(host, key.element) || !host.contains_binding(key) {
                continue;
            }
            self.push_binding(host, key, summary);
        }

        self.scratch.ui_changes = changes;
    }

    fn push_binding<H>(&mut self, host: &mut H, key: BindingKey<E>, summary: &mut FrameSummary)
    where
        H: BindingHost<Element = E, Source = S>,
    {
        let resolved = host.resolve_data_source(key);
        let changed = resolved
            .source
            .is_none_or(|source| self.changed_this_frame(source));

        if !host.should_process_at_stage(key, UpdateStage::UpdateSource, changed)
            || self.pull_succeeded.contains(&key)
            || !self.pushed.insert(key)
        {
            summary.skipped += 1;
            return;
        }

        let context = BindingContext {
            element: key.element,
            binding: key.binding,
            source: resolved.source,
            path: &resolved.path,
        };
        let result = host.update_source(&context);
        summary.source_updates += 1;
        if self.record(host, key, UpdateStage::UpdateSource, result) != BindingStatus::Success {
            return;
        }

        // Reflect the value as the source stored it.
        let was_dirty = host.is_dirty(key);
        host.set_dirty(key, false);
        let result = host.update_ui(&context);
        summary.round_trips += 1;
        let status = self.record(host, key, UpdateStage::UpdateUi, result);
        self.settle_dirty(host, key, was_dirty, status);
    }

    /// Restores the dirty flag after a non-successful UI execution.
    fn settle_dirty<H>(
        &self,
        host: &mut H,
        key: BindingKey<E>,
        was_dirty: bool,
        status: BindingStatus,
    ) where
        H: BindingHost<Element = E, Source = S>,
    {
        if retry_after(status, was_dirty, self.config.retry_failures) {
            host.set_dirty(key, true);
        }
    }

    /// Logs `result` if the log level asks for it, then caches it.
    fn record<H>(
        &mut self,
        host: &H,
        key: BindingKey<E>,
        stage: UpdateStage,
        result: BindingResult,
    ) -> BindingStatus
    where
        H: BindingHost<Element = E, Source = S>,
    {
        let status = result.status;
        if self
            .config
            .log_level
            .should_log(self.results.last(key, stage), &result)
        {
            self.sink.binding_result(&BindingLogRecord {
                panel: host.panel_name(self.panel),
                element: &key.element,
                binding: key.binding,
                stage,
                frame: self.frame,
                result: &result,
            });
        }
        self.results.cache(key, stage, result);
        status
    }

    fn commit<H>(&mut self, host: &mut H)
    where
        H: BindingHost<Element = E, Source = S>,
    {
        for (source, observed) in self.frame_versions.drain() {
            self.ledger.update_version(source, observed.version);
            host.clear_changes_from_source(source);
        }
        self.pulled.clear();
        self.pull_succeeded.clear();
        self.pushed.clear();
    }
}

/// Returns whether a binding should be dirty again after a UI execution
/// ending in `status`.
fn retry_after(status: BindingStatus, was_dirty: bool, retry_failures: bool) -> bool {
    match status {
        BindingStatus::Success => false,
        BindingStatus::Pending => was_dirty,
        BindingStatus::Failure => retry_failures,
    }
}
