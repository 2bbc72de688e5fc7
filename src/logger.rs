//! Scoped, toggle-able diagnostics
//!
//! Each component owns a [`Logger`] carrying its scope name and whether
//! debug output was requested. `log_debug!` and `log_warn!` only reach
//! `tracing` when the logger is enabled; `log_error!` always does.

/// Scope plus enabled flag for one component
#[derive(Debug, Clone, Copy)]
pub struct Logger {
    scope: &'static str,
    enabled: bool,
}

impl Logger {
    pub const fn new(scope: &'static str, enabled: bool) -> Self {
        Self { scope, enabled }
    }

    pub fn scope(&self) -> &'static str {
        self.scope
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }
}

macro_rules! log_debug {
    ($log:expr, $($arg:tt)+) => {{
        let log = &$log;
        if log.enabled() {
            tracing::debug!(scope = log.scope(), $($arg)+);
        }
    }};
}

macro_rules! log_warn {
    ($log:expr, $($arg:tt)+) => {{
        let log = &$log;
        if log.enabled() {
            tracing::warn!(scope = log.scope(), $($arg)+);
        }
    }};
}

macro_rules! log_error {
    ($log:expr, $($arg:tt)+) => {{
        let log = &$log;
        tracing::error!(scope = log.scope(), $($arg)+);
    }};
}

pub(crate) use {log_debug, log_error, log_warn};
