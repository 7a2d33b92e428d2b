/*!
 * Dispatch Loop Statistics
 */

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by the dispatch loop
#[derive(Debug, Default)]
pub(crate) struct LoopCounters {
    messages: AtomicU64,
    errors: AtomicU64,
    timeouts: AtomicU64,
}

impl LoopCounters {
    #[inline]
    pub(crate) fn record_message(&self) {
        self.messages.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> LoopStats {
        LoopStats {
            messages: self.messages.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of a server's dispatch counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoopStats {
    /// Messages dispatched to listeners
    pub messages: u64,
    /// Receive errors dispatched to listeners
    pub errors: u64,
    /// Poll timeouts swallowed by the loop
    pub timeouts: u64,
}
