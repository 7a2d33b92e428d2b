/*!
 * IPC Types
 * Error taxonomy and message types for port-based IPC
 */

use crate::core::types::{MessageCode, Size};
use miette::Diagnostic;
use nix::errno::Errno;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// IPC operation result
///
/// # Must Use
/// IPC operations can fail and must be handled to prevent lost messages
pub type IpcResult<T> = Result<T, IpcError>;

/// Result code the primitive layer reports when a receive timed out
pub const TIMEOUT_CODE: i32 = -(Errno::ETIME as i32);

/// Unified IPC error type with miette diagnostics
///
/// `Receive` and `Timeout` together form the receive class: a timeout is a
/// receive failure with a fixed code. Use [`IpcError::is_receive`] rather than
/// matching `Receive` alone when both must be handled.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Diagnostic)]
#[serde(rename_all = "snake_case", tag = "error", content = "details")]
pub enum IpcError {
    /// Bad constructor or configuration arguments
    #[error("Invalid IPC argument: {0}")]
    #[diagnostic(
        code(ipc::validation),
        help("Pass either a port name or a non-negative port handle.")
    )]
    Validation(String),

    /// Port creation, registration or lookup failed
    #[error("{0}")]
    #[diagnostic(
        code(ipc::open),
        help("Check that the port name is registered and not already taken.")
    )]
    Open(String),

    /// Operation attempted before a successful `open()`
    #[error("IPC {name} is not opened")]
    #[diagnostic(code(ipc::not_opened), help("Call open() before sending or reading."))]
    NotOpened { name: String },

    /// Receive failed with an OS error code other than the timeout code
    #[error("{message} ({code})")]
    #[diagnostic(code(ipc::receive))]
    Receive { code: i32, message: String },

    /// No message arrived within the requested timeout
    #[error("{message} ({code})")]
    #[diagnostic(
        code(ipc::timeout),
        help("Increase the timeout or make sure a sender is attached to the port.")
    )]
    Timeout { code: i32, message: String },

    /// `start_loop` called while the loop already runs on another thread
    #[error("IPC {name} dispatch loop is already running")]
    #[diagnostic(code(ipc::already_running), help("Call stop() and wait for the loop to return first."))]
    AlreadyRunning { name: String },

    /// `delete_listener` was given a listener that is not registered
    #[error("Listener is not registered")]
    #[diagnostic(code(ipc::listener_not_registered))]
    ListenerNotRegistered,
}

impl IpcError {
    /// Receive failure for a negative OS code
    #[must_use]
    pub fn receive(code: i32) -> Self {
        Self::Receive {
            code,
            message: receive_message(code),
        }
    }

    /// Timeout failure; a non-empty `detail` is appended to the message
    #[must_use]
    pub fn timeout(detail: impl AsRef<str>) -> Self {
        let mut message = receive_message(TIMEOUT_CODE);
        let detail = detail.as_ref();
        if !detail.is_empty() {
            message.push_str("; ");
            message.push_str(detail);
        }
        Self::Timeout {
            code: TIMEOUT_CODE,
            message,
        }
    }

    /// Classify a raw receive result
    ///
    /// Non-negative results are byte counts. `detail` is only evaluated for
    /// timeouts.
    pub fn check_receive_result<D>(result: i32, detail: impl FnOnce() -> D) -> IpcResult<Size>
    where
        D: AsRef<str>,
    {
        match result {
            r if r >= 0 => Ok(r as Size),
            TIMEOUT_CODE => Err(Self::timeout(detail())),
            r => Err(Self::receive(r)),
        }
    }

    /// True for every receive-class error, timeouts included
    #[inline]
    #[must_use]
    pub const fn is_receive(&self) -> bool {
        matches!(self, Self::Receive { .. } | Self::Timeout { .. })
    }

    #[inline]
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// OS error code carried by receive-class errors
    #[must_use]
    pub const fn code(&self) -> Option<i32> {
        match self {
            Self::Receive { code, .. } | Self::Timeout { code, .. } => Some(*code),
            _ => None,
        }
    }
}

fn receive_message(code: i32) -> String {
    format!("IPC receive error: {}", Errno::from_raw(code.saturating_abs()).desc())
}

/// Message returned by a successful receive
///
/// Transient: exists for one `read()` or one dispatch round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivedMessage {
    /// Bytes received, as reported by the primitive layer
    pub size: Size,
    pub code: MessageCode,
    pub data: Vec<u8>,
}

impl ReceivedMessage {
    #[inline]
    #[must_use]
    pub fn new(size: Size, code: MessageCode, data: Vec<u8>) -> Self {
        Self { size, code, data }
    }

    /// `(size, code, data)` view
    #[must_use]
    pub fn into_parts(self) -> (Size, MessageCode, Vec<u8>) {
        (self.size, self.code, self.data)
    }
}
