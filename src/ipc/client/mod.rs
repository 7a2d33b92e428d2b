/*!
 * Client Module
 */

pub mod client;

pub use client::PortClient;
