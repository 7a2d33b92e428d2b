/*!
 * Port IPC Library
 * Client, server and listener dispatch over named kernel IPC ports
 */

pub mod core;
pub mod ipc;
pub mod monitoring;

// Re-exports
pub use crate::core::limits::INFINITE_TIMEOUT;
pub use crate::core::types::{MessageCode, Port, Timeout, INVALID_PORT};
pub use ipc::{
    IpcError, IpcResult, ListenerRef, LocalPorts, LoggingListener, LoopStats, MessageListener,
    PortClient, PortPrimitives, PortServer, RawMessage, ReceivedMessage, ServerConfig,
    StopHandle,
};
pub use monitoring::{init_tracing, try_init_tracing};
