/*!
 * System Limits and Constants
 *
 * Defaults shared by the client, the server and the configuration layer.
 */

// =============================================================================
// RECEIVE LIMITS
// =============================================================================

/// Raw timeout value meaning "block with no time bound"
pub const INFINITE_TIMEOUT: i64 = -1;

/// Default receive buffer bound for a server (32 bytes)
/// Larger messages are rejected by the primitive layer
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 32;

// =============================================================================
// DISPATCH LOOP
// =============================================================================

/// Poll timeout used by the dispatch loop (1s)
/// Bounds how long `stop()` may take to be observed
pub const DEFAULT_POLL_TIMEOUT_MS: u32 = 1000;
