//! Per-engine debug output.
//!
//! Each engine owns a [`Trace`] built from its configuration. Nothing here
//! is process-global: two engines in the same process can log differently.

use std::fmt;

/// Enabled/disabled context for an engine's diagnostic output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Trace {
    enabled: bool,
}

impl Trace {
    pub fn enabled() -> Self {
        Self { enabled: true }
    }

    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Emit a debug event if this context is enabled.
    pub fn debug(&self, target: &'static str, args: fmt::Arguments<'_>) {
        if self.enabled {
            tracing::debug!(engine = target, "{}", args);
        }
    }

    /// Emit a trace-level event if this context is enabled.
    pub fn trace(&self, target: &'static str, args: fmt::Arguments<'_>) {
        if self.enabled {
            tracing::trace!(engine = target, "{}", args);
        }
    }
}
