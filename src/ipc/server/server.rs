/*!
 * Port Server
 * Owns a port, optionally registers it by name, and dispatches received
 * messages to listeners from a blocking loop
 */

use super::listeners::{ListenerRef, ListenerSet};
use super::stats::{LoopCounters, LoopStats};
use crate::core::types::{is_valid_port, Port, Timeout, INVALID_PORT};
use crate::ipc::core::config::ServerConfig;
use crate::ipc::core::traits::PortPrimitives;
use crate::ipc::core::types::{IpcError, IpcResult, ReceivedMessage};
use crate::monitoring::span_dispatch;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Cloneable handle that asks a dispatch loop to stop
///
/// Stopping is cooperative: the flag is checked before each receive, so a
/// receive already in flight completes (or times out) first.
#[derive(Debug, Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    fn new_stopped() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    /// Request loop termination
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

// Loop lifecycle; STARTING is claimed but not yet visible through is_running()
const LOOP_IDLE: u8 = 0;
const LOOP_STARTING: u8 = 1;
const LOOP_RUNNING: u8 = 2;

/// Returns the loop state to idle however the loop exits
struct RunningGuard<'a>(&'a AtomicU8);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(LOOP_IDLE, Ordering::SeqCst);
    }
}

/// Receiving side of a port
///
/// `open()` needs exclusive access; everything else takes `&self`, so an
/// opened server can be shared through an `Arc` between the thread running
/// [`PortServer::start_loop`] and threads managing listeners or stopping it.
pub struct PortServer {
    primitives: Arc<dyn PortPrimitives>,
    name: String,
    port: Port,
    config: ServerConfig,
    listeners: ListenerSet,
    stop_flag: StopHandle,
    state: AtomicU8,
    counters: LoopCounters,
}

impl PortServer {
    /// Server registered under `name` once opened; an empty name skips registration
    pub fn new(
        primitives: Arc<dyn PortPrimitives>,
        name: impl Into<String>,
        config: ServerConfig,
    ) -> IpcResult<Self> {
        config.validate()?;
        Ok(Self {
            primitives,
            name: name.into(),
            port: INVALID_PORT,
            config,
            listeners: ListenerSet::new(),
            stop_flag: StopHandle::new_stopped(),
            state: AtomicU8::new(LOOP_IDLE),
            counters: LoopCounters::default(),
        })
    }

    /// Named server with default configuration
    pub fn named(primitives: Arc<dyn PortPrimitives>, name: impl Into<String>) -> IpcResult<Self> {
        Self::new(primitives, name, ServerConfig::default())
    }

    /// Unregistered server with default configuration
    pub fn anonymous(primitives: Arc<dyn PortPrimitives>) -> IpcResult<Self> {
        Self::new(primitives, String::new(), ServerConfig::default())
    }

    /// Create the port and register it under the server name
    ///
    /// If registration fails the server is left unopened and `open()` may be
    /// retried.
    pub fn open(&mut self) -> IpcResult<Port> {
        let port = self.primitives.create_port();
        if !is_valid_port(port) {
            return Err(IpcError::Open(format!("Can't create ipc port: {}", port)));
        }
        self.port = port;

        if !self.name.is_empty() {
            let ecode = self.primitives.register_named_port(&self.name, port);
            if ecode < 0 {
                self.port = INVALID_PORT;
                warn!(name = %self.name, port, ecode, "Named port registration failed");
                return Err(IpcError::Open(format!(
                    "Can't register ipc port: {}; err: {}",
                    self.name, ecode
                )));
            }
        }

        info!(name = %self.name, port, "IPC server opened");
        Ok(port)
    }

    /// Register a listener; false if it is already registered
    pub fn add_listener(&self, listener: ListenerRef) -> bool {
        self.listeners.add(listener)
    }

    /// Unregister a listener
    pub fn delete_listener(&self, listener: &ListenerRef) -> IpcResult<()> {
        self.listeners.remove(listener)
    }

    pub fn clear_listeners(&self) {
        self.listeners.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Receive one message, waiting at most `timeout`
    ///
    /// Negative primitive results become [`IpcError::Timeout`] or
    /// [`IpcError::Receive`].
    pub fn read(&self, timeout: Timeout) -> IpcResult<ReceivedMessage> {
        if !self.is_open() {
            return Err(IpcError::NotOpened {
                name: self.name.clone(),
            });
        }

        let raw = self
            .primitives
            .recv_message(self.port, self.config.max_message_size, timeout);
        let size = IpcError::check_receive_result(raw.result, || {
            format!("IPC timeout: {}", self.port)
        })?;

        Ok(ReceivedMessage::new(size, raw.code, raw.data))
    }

    /// Run the dispatch loop on the calling thread until [`PortServer::stop`]
    ///
    /// Timeouts are swallowed, other receive failures go to every listener's
    /// `error`, and messages go to every listener's `received`, all in
    /// registration order.
    pub fn start_loop(&self) -> IpcResult<()> {
        if !self.is_open() {
            return Err(IpcError::NotOpened {
                name: self.name.clone(),
            });
        }
        if self
            .state
            .compare_exchange(LOOP_IDLE, LOOP_STARTING, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(IpcError::AlreadyRunning {
                name: self.name.clone(),
            });
        }
        let _running = RunningGuard(&self.state);
        // Clear stale stops before the loop is observable; a stop() issued
        // after is_running() turns true must survive
        self.stop_flag.reset();
        self.state.store(LOOP_RUNNING, Ordering::SeqCst);
        let _span = span_dispatch(&self.name, self.port).entered();

        info!(
            name = %self.name,
            port = self.port,
            poll_timeout = %self.config.poll_timeout,
            "IPC dispatch loop started"
        );

        while !self.stop_flag.is_stopped() {
            match self.read(self.config.poll_timeout) {
                Ok(message) => {
                    self.counters.record_message();
                    self.notify_received(&message);
                }
                Err(e) if e.is_timeout() => {
                    self.counters.record_timeout();
                    trace!(port = self.port, "IPC poll timed out");
                }
                Err(e) if e.is_receive() => {
                    self.counters.record_error();
                    warn!(port = self.port, error = %e, "IPC receive failed");
                    self.notify_error(&e);
                }
                Err(e) => return Err(e),
            }
        }

        info!(name = %self.name, port = self.port, "IPC dispatch loop stopped");
        Ok(())
    }

    /// Ask the dispatch loop to stop before its next receive
    pub fn stop(&self) {
        self.stop_flag.stop();
    }

    /// Handle for stopping the loop from elsewhere
    pub fn stop_handle(&self) -> StopHandle {
        self.stop_flag.clone()
    }

    fn notify_received(&self, message: &ReceivedMessage) {
        debug!(
            port = self.port,
            code = message.code,
            size = message.size,
            "Dispatching IPC message"
        );
        for listener in self.listeners.snapshot() {
            listener.received(&message.data, message.code, message.size);
        }
    }

    fn notify_error(&self, error: &IpcError) {
        for listener in self.listeners.snapshot() {
            listener.error(error);
        }
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
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        is_valid_port(self.port)
    }

    /// True while `start_loop` is executing
    ///
    /// Once this returns true, a following [`PortServer::stop`] is guaranteed
    /// to end the loop.
    pub fn is_running(&self) -> bool {
        self.state.load(Ordering::SeqCst) == LOOP_RUNNING
    }

    pub fn stats(&self) -> LoopStats {
        self.counters.snapshot()
    }
}

impl fmt::Debug for PortServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortServer")
            .field("name", &self.name)
            .field("port", &self.port)
            .field("config", &self.config)
            .field("listeners", &self.listeners.len())
            .field("running", &self.is_running())
            .finish()
    }
}
