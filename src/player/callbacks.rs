//! Embedder callbacks
//!
//! Every callback runs on the player's event loop. A panicking callback is
//! caught and logged; it never takes the player down with it.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::Error;
use crate::logger::{log_error, Logger};
use crate::stats::BufferStats;

type StatsFn = dyn Fn(&BufferStats) + Send + Sync;
type NotifyFn = dyn Fn() + Send + Sync;
type FailedFn = dyn Fn(u32) + Send + Sync;
type ErrorFn = dyn Fn(&Error) + Send + Sync;

/// Optional observers for player lifecycle and buffer state
#[derive(Clone, Default)]
pub struct Callbacks {
    on_stats: Option<Arc<StatsFn>>,
    on_reconnect_success: Option<Arc<NotifyFn>>,
    on_reconnect_failed: Option<Arc<FailedFn>>,
    on_source_buffer_ready: Option<Arc<NotifyFn>>,
    on_merger_error: Option<Arc<ErrorFn>>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer statistics after every completed sink update
    pub fn on_stats<F>(mut self, f: F) -> Self
    where
        F: Fn(&BufferStats) + Send + Sync + 'static,
    {
        self.on_stats = Some(Arc::new(f));
        self
    }

    /// Media became ready again after at least one automatic reconnect
    pub fn on_reconnect_success<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_reconnect_success = Some(Arc::new(f));
        self
    }

    /// Reconnect budget exhausted; receives the attempt count
    pub fn on_reconnect_failed<F>(mut self, f: F) -> Self
    where
        F: Fn(u32) + Send + Sync + 'static,
    {
        self.on_reconnect_failed = Some(Arc::new(f));
        self
    }

    /// Sink accepted the codec description and can take appends
    pub fn on_source_buffer_ready<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_source_buffer_ready = Some(Arc::new(f));
        self
    }

    /// Buffering fault; the sink was torn down and the connection will cycle
    pub fn on_merger_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        self.on_merger_error = Some(Arc::new(f));
        self
    }

    pub(crate) fn stats(&self, log: &Logger, stats: &BufferStats) {
        if let Some(f) = &self.on_stats {
            guarded(log, "on_stats", || f(stats));
        }
    }

    pub(crate) fn reconnect_success(&self, log: &Logger) {
        if let Some(f) = &self.on_reconnect_success {
            guarded(log, "on_reconnect_success", || f());
        }
    }

    pub(crate) fn reconnect_failed(&self, log: &Logger, attempts: u32) {
        if let Some(f) = &self.on_reconnect_failed {
            guarded(log, "on_reconnect_failed", || f(attempts));
        }
    }

    pub(crate) fn source_buffer_ready(&self, log: &Logger) {
        if let Some(f) = &self.on_source_buffer_ready {
            guarded(log, "on_source_buffer_ready", || f());
        }
    }

    pub(crate) fn merger_error(&self, log: &Logger, error: &Error) {
        if let Some(f) = &self.on_merger_error {
            guarded(log, "on_merger_error", || f(error));
        }
    }
}

fn guarded(log: &Logger, name: &'static str, f: impl FnOnce()) {
    if catch_unwind(AssertUnwindSafe(f)).is_err() {
        log_error!(log, callback = name, "callback panicked");
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_stats", &self.on_stats.is_some())
            .field("on_reconnect_success", &self.on_reconnect_success.is_some())
            .field("on_reconnect_failed", &self.on_reconnect_failed.is_some())
            .field("on_source_buffer_ready", &self.on_source_buffer_ready.is_some())
            .field("on_merger_error", &self.on_merger_error.is_some())
            .finish()
    }
}
