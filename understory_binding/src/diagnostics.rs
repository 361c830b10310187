// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diagnostic output for binding results.
//!
//! The updater decides *whether* a result is reported (see
//! [`LogLevel`](crate::LogLevel)); a [`DiagnosticSink`] decides *where* it
//! goes. [`TracingSink`] forwards to `tracing`, and any
//! `FnMut(&BindingLogRecord<'_>)` closure is a sink as well.

use core::fmt;

use crate::id::BindingId;
use crate::result::{BindingResult, BindingStatus, UpdateStage};

/// One reported binding result.
#[derive(Clone, Copy)]
pub struct BindingLogRecord<'a> {
    /// Display name of the panel the element belongs to.
    pub panel: &'a str,
    /// The element the binding is attached to.
    pub element: &'a dyn fmt::Debug,
    /// The binding that produced the result.
    pub binding: BindingId,
    /// Direction of the execution.
    pub stage: UpdateStage,
    /// Frame number the result was produced in.
    pub frame: u64,
    /// The result itself.
    pub result: &'a BindingResult,
}

impl fmt::Debug for BindingLogRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingLogRecord")
            .field("panel", &self.panel)
            .field("element", self.element)
            .field("binding", &self.binding)
            .field("stage", &self.stage)
            .field("frame", &self.frame)
            .field("result", self.result)
            .finish()
    }
}

/// Receives binding results selected for logging.
pub trait DiagnosticSink {
    /// Reports one result.
    fn binding_result(&mut self, record: &BindingLogRecord<'_>);
}

impl<F> DiagnosticSink for F
where
    F: FnMut(&BindingLogRecord<'_>),
{
    #[inline]
    fn binding_result(&mut self, record: &BindingLogRecord<'_>) {
        self(record);
    }
}

/// Reports binding results as `tracing` events.
///
/// Failures are emitted at `WARN`, pending results at `DEBUG`, and messages
/// attached to successful results at `INFO`.
#[derive(Copy, Clone, Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn binding_result(&mut self, record: &BindingLogRecord<'_>) {
        let BindingLogRecord {
            panel,
            element,
            binding,
            stage,
            frame,
            result,
        } = *record;
        let binding = binding.index();
        match result.status {
            BindingStatus::Failure => tracing::warn!(
                panel,
                ?element,
                binding,
                ?stage,
                frame,
                "binding failed: {}",
                result.message
            ),
            BindingStatus::Pending => tracing::debug!(
                panel,
                ?element,
                binding,
                ?stage,
                frame,
                "binding pending: {}",
                result.message
            ),
            BindingStatus::Success => tracing::info!(
                panel,
                ?element,
                binding,
                ?stage,
                frame,
                "{}",
                result.message
            ),
        }
    }
}
