/*!
 * Core Types
 * Common types used across the IPC layer
 */

use super::limits::INFINITE_TIMEOUT;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Kernel IPC port handle (negative values are never valid)
pub type Port = i32;

/// Integer tag carried alongside every message payload
pub type MessageCode = i32;

/// Size type for payload lengths
pub type Size = usize;

/// Handle value of a port that has not been created or resolved yet
pub const INVALID_PORT: Port = -1;

/// Check whether a raw handle can be passed to the primitive layer
#[inline(always)]
#[must_use]
pub const fn is_valid_port(port: Port) -> bool {
    port >= 0
}

/// Receive timeout as understood by the primitive layer
///
/// Wraps the raw signed value handed to `recv_message`. Any negative value
/// blocks without a time bound; non-negative values are milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeout(i64);

impl Timeout {
    /// Block until a message arrives
    pub const INFINITE: Self = Self(INFINITE_TIMEOUT);

    #[inline]
    #[must_use]
    pub const fn millis(ms: u32) -> Self {
        Self(ms as i64)
    }

    #[inline]
    #[must_use]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    #[inline]
    #[must_use]
    pub const fn as_raw(self) -> i64 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn is_infinite(self) -> bool {
        self.0 < 0
    }

    /// Wall-clock bound, `None` when infinite
    #[must_use]
    pub fn to_duration(self) -> Option<Duration> {
        if self.is_infinite() {
            None
        } else {
            Some(Duration::from_millis(self.0 as u64))
        }
    }
}

impl Default for Timeout {
    fn default() -> Self {
        Self::INFINITE
    }
}

impl From<Duration> for Timeout {
    fn from(d: Duration) -> Self {
        Self(d.as_millis().min(i64::MAX as u128) as i64)
    }
}

impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_infinite() {
            f.write_str("infinite")
        } else {
            write!(f, "{}ms", self.0)
        }
    }
}
