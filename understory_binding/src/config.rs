// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Updater configuration.

use crate::result::LogLevel;

/// Configuration of a [`BindingUpdater`](crate::BindingUpdater).
///
/// ```rust
/// use understory_binding::{LogLevel, UpdaterConfig};
///
/// let config = UpdaterConfig::new()
///     .with_log_level(LogLevel::Once)
///     .with_retry_failures(true);
///
/// assert_eq!(config.log_level, LogLevel::Once);
/// assert!(config.retry_failures);
/// assert_eq!(UpdaterConfig::default().log_level, LogLevel::All);
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdaterConfig {
    /// Which binding results reach the diagnostic sink.
    pub log_level: LogLevel,
    /// Re-mark a binding dirty after every failed UI update, so it is retried
    /// on the next frame.
    ///
    /// When unset, a failed binding is left clean and runs again only when
    /// its source changes or it is dirtied by the host.
    pub retry_failures: bool,
}

impl UpdaterConfig {
    /// The default configuration: log everything, no forced retries.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            log_level: LogLevel::All,
            retry_failures: false,
        }
    }

    /// Sets [`log_level`](Self::log_level).
    #[must_use]
    pub const fn with_log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = log_level;
        self
    }

    /// Sets [`retry_failures`](Self::retry_failures).
    #[must_use]
    pub const fn with_retry_failures(mut self, retry_failures: bool) -> Self {
        self.retry_failures = retry_failures;
        self
    }
}
