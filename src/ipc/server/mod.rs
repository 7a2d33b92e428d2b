/*!
 * Server Module
 * Port ownership, listener registry and the dispatch loop
 */

pub mod listeners;
pub mod server;
pub mod stats;

pub use listeners::{ListenerRef, ListenerSet};
pub use server::{PortServer, StopHandle};
pub use stats::LoopStats;
