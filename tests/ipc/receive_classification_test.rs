/*!
 * Receive Classification Tests
 * Every negative receive result maps to exactly one error kind
 */

use parking_lot::Mutex;
use port_ipc::ipc::TIMEOUT_CODE;
use port_ipc::{
    IpcError, ListenerRef, MessageCode, MessageListener, Port, PortPrimitives, PortServer,
    RawMessage, ServerConfig, Timeout,
};
use proptest::prelude::*;
use std::sync::Arc;

/// Primitive layer that answers every receive with a fixed result
struct FixedResult {
    result: i32,
}

impl PortPrimitives for FixedResult {
    fn get_named_port(&self, _name: &str) -> Port {
        1
    }

    fn create_port(&self) -> Port {
        1
    }

    fn register_named_port(&self, _name: &str, _port: Port) -> i32 {
        0
    }

    fn send_message(&self, _port: Port, _code: MessageCode, _data: &[u8]) -> i32 {
        0
    }

    fn recv_message(&self, _port: Port, _max_size: usize, _timeout: Timeout) -> RawMessage {
        RawMessage::failed(self.result)
    }
}

/// Stops the server on the first error notification
struct StopOnError {
    server: Mutex<Option<std::sync::Weak<PortServer>>>,
    errors: Mutex<Vec<Option<i32>>>,
}

impl MessageListener for StopOnError {
    fn received(&self, _data: &[u8], _code: MessageCode, _size: usize) {}

    fn error(&self, error: &IpcError) {
        self.errors.lock().push(error.code());
        if let Some(server) = self.server.lock().as_ref().and_then(|s| s.upgrade()) {
            server.stop();
        }
    }
}

fn opened(result: i32) -> PortServer {
    let mut server = PortServer::anonymous(Arc::new(FixedResult { result })).unwrap();
    server.open().unwrap();
    server
}

proptest! {
    #[test]
    fn prop_negative_results_are_receive_errors(code in i32::MIN..0) {
        prop_assume!(code != TIMEOUT_CODE);
        let err = opened(code).read(Timeout::millis(1)).unwrap_err();
        prop_assert!(matches!(err, IpcError::Receive { .. }), "expected IpcError::Receive, got {:?}", err);
        prop_assert_eq!(err.code(), Some(code));
    }

    #[test]
    fn prop_receive_errors_reach_listeners(code in -4096i32..0) {
        prop_assume!(code != TIMEOUT_CODE);
        let server = Arc::new(opened(code));
        let listener = Arc::new(StopOnError {
            server: Mutex::new(Some(Arc::downgrade(&server))),
            errors: Mutex::new(Vec::new()),
        });
        let as_ref: ListenerRef = listener.clone();
        server.add_listener(as_ref);

        prop_assert!(server.start_loop().is_ok());
        prop_assert_eq!(listener.errors.lock().clone(), vec![Some(code)]);
    }
}

#[test]
fn test_timeout_code_maps_to_timeout() {
    let err = opened(TIMEOUT_CODE).read(Timeout::millis(1)).unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(err.code(), Some(TIMEOUT_CODE));
}

#[test]
fn test_timeouts_never_reach_listeners() {
    let config = ServerConfig::default().with_poll_timeout(Timeout::millis(1));
    let mut server = PortServer::new(Arc::new(FixedResult { result: TIMEOUT_CODE }), "", config).unwrap();
    server.open().unwrap();
    let server = Arc::new(server);

    let listener = Arc::new(StopOnError {
        server: Mutex::new(None),
        errors: Mutex::new(Vec::new()),
    });
    let as_ref: ListenerRef = listener.clone();
    server.add_listener(as_ref);

    let worker = {
        let server = Arc::clone(&server);
        std::thread::spawn(move || server.start_loop())
    };
    while server.stats().timeouts < 3 {
        std::thread::sleep(std::time::Duration::from_millis(1));
    }
    server.stop();
    worker.join().unwrap().unwrap();

    assert!(listener.errors.lock().is_empty());
    assert_eq!(server.stats().errors, 0);
}
