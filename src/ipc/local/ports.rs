/*!
 * Local Ports
 * In-process port registry backed by flume channels
 */

use crate::core::types::{is_valid_port, MessageCode, Port, Size, Timeout};
use crate::ipc::core::traits::{PortPrimitives, RawMessage};
use crate::ipc::core::types::TIMEOUT_CODE;
use ahash::RandomState;
use dashmap::DashMap;
use flume::{Receiver, RecvTimeoutError, Sender};
use nix::errno::Errno;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

type Envelope = (MessageCode, Vec<u8>);

struct PortQueue {
    tx: Sender<Envelope>,
    rx: Receiver<Envelope>,
}

impl PortQueue {
    fn new() -> Self {
        let (tx, rx) = flume::unbounded();
        Self { tx, rx }
    }
}

#[inline]
const fn neg(errno: Errno) -> i32 {
    -(errno as i32)
}

/// Primitive result for a received payload of `len` bytes
///
/// The result carries the size, so payloads past `i32::MAX` report `-E2BIG`.
#[inline]
fn size_result(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(neg(Errno::E2BIG))
}

/// In-process implementation of the primitive port layer
///
/// Clones share the same registry, so a client and a server built from
/// clones of one `LocalPorts` talk to each other.
///
/// # Performance
/// - Queue handles are cloned out of the maps before blocking, so a reader
///   waiting on one port never holds a shard lock
#[derive(Clone)]
pub struct LocalPorts {
    queues: Arc<DashMap<Port, PortQueue, RandomState>>,
    names: Arc<DashMap<String, Port, RandomState>>,
    next_port: Arc<AtomicI32>,
}

impl Default for LocalPorts {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalPorts {
    pub fn new() -> Self {
        Self {
            queues: Arc::new(DashMap::with_hasher(RandomState::new())),
            names: Arc::new(DashMap::with_hasher(RandomState::new())),
            next_port: Arc::new(AtomicI32::new(1)),
        }
    }

    /// Number of live ports
    pub fn port_count(&self) -> usize {
        self.queues.len()
    }

    /// Messages waiting on `port`
    pub fn pending(&self, port: Port) -> usize {
        self.queues.get(&port).map(|q| q.rx.len()).unwrap_or(0)
    }

    /// Drop a port and every name bound to it
    ///
    /// Returns false if the port did not exist.
    pub fn destroy_port(&self, port: Port) -> bool {
        if self.queues.remove(&port).is_none() {
            return false;
        }
        self.names.retain(|_, bound| *bound != port);
        info!(port, "Destroyed local port");
        true
    }

    fn sender(&self, port: Port) -> Option<Sender<Envelope>> {
        self.queues.get(&port).map(|q| q.tx.clone())
    }

    fn receiver(&self, port: Port) -> Option<Receiver<Envelope>> {
        self.queues.get(&port).map(|q| q.rx.clone())
    }
}

impl PortPrimitives for LocalPorts {
    fn get_named_port(&self, name: &str) -> Port {
        match self.names.get(name) {
            Some(port) => *port,
            None => neg(Errno::ENOENT),
        }
    }

    fn create_port(&self) -> Port {
        let port = self.next_port.fetch_add(1, Ordering::SeqCst);
        if !is_valid_port(port) {
            return neg(Errno::ENOSPC);
        }
        self.queues.insert(port, PortQueue::new());
        debug!(port, "Created local port");
        port
    }

    fn register_named_port(&self, name: &str, port: Port) -> i32 {
        if !self.queues.contains_key(&port) {
            return neg(Errno::EINVAL);
        }
        match self.names.entry(name.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => neg(Errno::EEXIST),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(port);
                info!(name, port, "Registered named port");
                0
            }
        }
    }

    fn send_message(&self, port: Port, code: MessageCode, data: &[u8]) -> i32 {
        let Some(tx) = self.sender(port) else {
            return neg(Errno::EINVAL);
        };
        match tx.send((code, data.to_vec())) {
            Ok(()) => 0,
            Err(_) => neg(Errno::EINVAL),
        }
    }

    fn recv_message(&self, port: Port, max_size: Size, timeout: Timeout) -> RawMessage {
        let Some(rx) = self.receiver(port) else {
            return RawMessage::failed(neg(Errno::EINVAL));
        };

        let received = match timeout.to_duration() {
            None => rx.recv().map_err(|_| neg(Errno::EINVAL)),
            Some(bound) => rx.recv_timeout(bound).map_err(|e| match e {
                RecvTimeoutError::Timeout => TIMEOUT_CODE,
                RecvTimeoutError::Disconnected => neg(Errno::EINVAL),
            }),
        };

        match received {
            Ok((_, data)) if data.len() > max_size => RawMessage::failed(neg(Errno::E2BIG)),
            Ok((code, data)) => match size_result(data.len()) {
                result if result < 0 => RawMessage::failed(result),
                result => RawMessage { result, code, data },
            },
            Err(result) => RawMessage::failed(result),
        }
    }
}
