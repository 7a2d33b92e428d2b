/*!
 * IPC Core Module
 * Core IPC types, traits, and configuration
 */

pub mod config;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use config::ServerConfig;
pub use traits::*;
pub use types::*;
