//! Usage reporting capability
//!
//! Clients never call a concrete callback; they hold a [`UsageSink`]. Any
//! `Fn(Usage)` closure is a sink, and so is a Tokio channel sender, which
//! lets the caller move usage records onto another task.

use super::types::Usage;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::warn;

/// Receives token usage reports. Called synchronously from inside the
/// client, at most once per completion and once per usage frame when
/// streaming.
pub trait UsageSink: Send + Sync {
    /// Handle one usage record
    fn record_usage(&self, usage: Usage);
}

/// A usage sink that can be moved into a stream
pub type SharedUsageSink = Arc<dyn UsageSink>;

impl<F> UsageSink for F
where
    F: Fn(Usage) + Send + Sync,
{
    fn record_usage(&self, usage: Usage) {
        self(usage)
    }
}

impl UsageSink for mpsc::UnboundedSender<Usage> {
    fn record_usage(&self, usage: Usage) {
        if self.send(usage).is_err() {
            warn!("Usage receiver dropped, discarding usage report");
        }
    }
}

/// Keeps the most recent usage record
#[derive(Debug, Default)]
pub struct UsageRecorder {
    last: Mutex<Option<Usage>>,
}

impl UsageRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last usage reported, if any
    pub fn last(&self) -> Option<Usage> {
        match self.last.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

impl UsageSink for UsageRecorder {
    fn record_usage(&self, usage: Usage) {
        match self.last.lock() {
            Ok(mut guard) => *guard = Some(usage),
            Err(poisoned) => *poisoned.into_inner() = Some(usage),
        }
    }
}
