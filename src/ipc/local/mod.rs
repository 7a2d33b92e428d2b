/*!
 * Local Port Backend
 * Loopback primitive layer for tests, demos and hosts without native ports
 */

pub mod ports;

pub use ports::LocalPorts;
