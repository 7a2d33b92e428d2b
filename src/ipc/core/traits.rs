/*!
 * IPC Traits
 * Seams between the wrapper, the primitive port layer and listeners
 */

use super::types::IpcError;
use crate::core::types::{MessageCode, Port, Size, Timeout};
use tracing::{info, warn};

/// Raw outcome of a primitive receive
///
/// `result` is the byte count on success and a negative OS code otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawMessage {
    pub result: i32,
    pub code: MessageCode,
    pub data: Vec<u8>,
}

impl RawMessage {
    /// Failed receive carrying `result`
    #[must_use]
    pub fn failed(result: i32) -> Self {
        Self {
            result,
            code: -1,
            data: Vec::new(),
        }
    }
}

/// Primitive port operations provided by the host
///
/// Every call mirrors the host ABI: negative integers signal failure and no
/// error is raised here. Callers never pass a negative port.
#[cfg_attr(test, mockall::automock)]
pub trait PortPrimitives: Send + Sync {
    /// Resolve a registered name, negative on failure
    fn get_named_port(&self, name: &str) -> Port;

    /// Allocate a new port, negative on failure
    fn create_port(&self) -> Port;

    /// Bind `name` to `port`, negative error code on failure
    fn register_named_port(&self, name: &str, port: Port) -> i32;

    /// Enqueue a message; the result is opaque and passed to the caller
    fn send_message(&self, port: Port, code: MessageCode, data: &[u8]) -> i32;

    /// Dequeue one message of at most `max_size` bytes
    fn recv_message(&self, port: Port, max_size: Size, timeout: Timeout) -> RawMessage;
}

/// Receiver of dispatch loop notifications
pub trait MessageListener: Send + Sync {
    /// Called once per received message
    fn received(&self, data: &[u8], code: MessageCode, size: Size);

    /// Called once per non-timeout receive failure
    fn error(&self, error: &IpcError);
}

/// Listener that writes every notification to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingListener;

impl MessageListener for LoggingListener {
    fn received(&self, data: &[u8], code: MessageCode, size: Size) {
        info!(
            code,
            size,
            message = %String::from_utf8_lossy(data),
            "IPC message received"
        );
    }

    fn error(&self, error: &IpcError) {
        warn!(error = %error, "IPC receive failed");
    }
}
