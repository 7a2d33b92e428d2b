/*!
 * IPC Module
 * Named port IPC: client, server with listener dispatch, and a local backend
 */

pub mod client;
pub mod core;
pub mod local;
pub mod server;

// Re-export for convenience
pub use client::PortClient;
pub use self::core::*;
pub use local::LocalPorts;
pub use server::{ListenerRef, LoopStats, PortServer, StopHandle};
