/*!
 * Port Client
 * Resolves a named or explicit port and sends fire-and-forget messages
 */

use crate::core::types::{is_valid_port, MessageCode, Port, INVALID_PORT};
use crate::ipc::core::traits::PortPrimitives;
use crate::ipc::core::types::{IpcError, IpcResult};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Sending side of a port
pub struct PortClient {
    primitives: Arc<dyn PortPrimitives>,
    name: String,
    port: Port,
}

impl PortClient {
    /// Build a client from a name, an explicit port, or both
    ///
    /// Fails with [`IpcError::Validation`] when the name is empty and the
    /// port is negative.
    pub fn new(
        primitives: Arc<dyn PortPrimitives>,
        name: impl Into<String>,
        port: Port,
    ) -> IpcResult<Self> {
        let name = name.into();
        if name.is_empty() && !is_valid_port(port) {
            return Err(IpcError::Validation(
                "No IPC port or name parameter is passed".to_string(),
            ));
        }
        Ok(Self {
            primitives,
            name,
            port,
        })
    }

    /// Client resolved lazily through the name registry
    pub fn named(primitives: Arc<dyn PortPrimitives>, name: impl Into<String>) -> IpcResult<Self> {
        Self::new(primitives, name, INVALID_PORT)
    }

    /// Client bound to a known port handle
    pub fn with_port(primitives: Arc<dyn PortPrimitives>, port: Port) -> IpcResult<Self> {
        Self::new(primitives, String::new(), port)
    }

    /// Resolve the port by name if not resolved yet
    ///
    /// Idempotent: once resolved, the cached handle is returned without
    /// touching the registry again.
    pub fn open(&mut self) -> IpcResult<Port> {
        if !is_valid_port(self.port) {
            let port = self.primitives.get_named_port(&self.name);
            if !is_valid_port(port) {
                return Err(IpcError::Open(format!(
                    "Can't query IPC by name {}",
                    self.name
                )));
            }
            self.port = port;
            info!(name = %self.name, port, "Resolved named IPC port");
        }
        Ok(self.port)
    }

    /// Send `data` tagged with `code`
    ///
    /// Returns the primitive layer's raw result; delivery is not confirmed.
    pub fn send(&self, data: &[u8], code: MessageCode) -> IpcResult<i32> {
        if !self.is_open() {
            return Err(IpcError::NotOpened {
                name: self.name.clone(),
            });
        }
        let result = self.primitives.send_message(self.port, code, data);
        debug!(port = self.port, code, size = data.len(), result, "Sent IPC message");
        Ok(result)
    }

    #[inline]
    pub fn port(&self) -> Port {
        self.port
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        is_valid_port(self.port)
    }
}

impl fmt::Debug for PortClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortClient")
            .field("name", &self.name)
            .field("port", &self.port)
            .finish()
    }
}
