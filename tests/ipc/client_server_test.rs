/*!
 * Client/Server Tests
 * Named registration, resolution and direct reads over the local backend
 */

use port_ipc::{
    IpcError, LocalPorts, PortClient, PortPrimitives, PortServer, ServerConfig, Timeout,
    INVALID_PORT,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn backend() -> (LocalPorts, Arc<dyn PortPrimitives>) {
    let ports = LocalPorts::new();
    let shared: Arc<dyn PortPrimitives> = Arc::new(ports.clone());
    (ports, shared)
}

#[test]
fn test_named_round_trip() {
    let (_, ports) = backend();

    let mut server = PortServer::named(ports.clone(), "svc").unwrap();
    let port = server.open().unwrap();
    assert!(port >= 0);

    let mut client = PortClient::named(ports, "svc").unwrap();
    assert_eq!(client.open().unwrap(), port);

    client.send(b"hi", 7).unwrap();
    let message = server.read(Timeout::millis(500)).unwrap();
    assert_eq!(message.into_parts(), (2, 7, b"hi".to_vec()));
}

#[test]
fn test_client_with_explicit_port() {
    let (_, ports) = backend();

    let mut server = PortServer::anonymous(ports.clone()).unwrap();
    let port = server.open().unwrap();

    let client = PortClient::with_port(ports, port).unwrap();
    assert!(client.is_open());
    client.send(b"direct", 0).unwrap();

    let message = server.read(Timeout::INFINITE).unwrap();
    assert_eq!(message.data, b"direct");
    assert_eq!(message.code, 0);
}

#[test]
fn test_client_open_unknown_name() {
    let (_, ports) = backend();

    let mut client = PortClient::named(ports, "nobody").unwrap();
    assert!(matches!(client.open(), Err(IpcError::Open(_))));
    assert!(!client.is_open());
    assert!(matches!(
        client.send(b"lost", 1),
        Err(IpcError::NotOpened { .. })
    ));
}

#[test]
fn test_client_requires_name_or_port() {
    let (_, ports) = backend();
    assert!(matches!(
        PortClient::new(ports, "", INVALID_PORT),
        Err(IpcError::Validation(_))
    ));
}

#[test]
fn test_duplicate_name_rolls_back_and_retries() {
    let (local, ports) = backend();

    let mut first = PortServer::named(ports.clone(), "svc").unwrap();
    let first_port = first.open().unwrap();

    let mut second = PortServer::named(ports.clone(), "svc").unwrap();
    assert!(matches!(second.open(), Err(IpcError::Open(_))));
    assert_eq!(second.port(), INVALID_PORT);
    assert!(matches!(
        second.read(Timeout::millis(1)),
        Err(IpcError::NotOpened { .. })
    ));

    // Freeing the name lets the second server retry from scratch
    assert!(local.destroy_port(first_port));
    let second_port = second.open().unwrap();
    assert_ne!(second_port, first_port);

    let mut client = PortClient::named(ports, "svc").unwrap();
    assert_eq!(client.open().unwrap(), second_port);
}

#[test]
fn test_read_timeout_and_receive_errors() {
    let (_, ports) = backend();

    let config = ServerConfig::default().with_max_message_size(4);
    let mut server = PortServer::new(ports.clone(), "", config).unwrap();
    let port = server.open().unwrap();

    let err = server.read(Timeout::millis(10)).unwrap_err();
    assert!(err.is_timeout());

    let client = PortClient::with_port(ports, port).unwrap();
    client.send(b"too long", 1).unwrap();
    let err = server.read(Timeout::millis(100)).unwrap_err();
    assert!(err.is_receive());
    assert!(!err.is_timeout());
    assert_eq!(err.code(), Some(-(nix::errno::Errno::E2BIG as i32)));
}

#[test]
fn test_messages_arrive_in_send_order() {
    let (_, ports) = backend();

    let mut server = PortServer::named(ports.clone(), "ordered").unwrap();
    server.open().unwrap();
    let mut client = PortClient::named(ports, "ordered").unwrap();
    client.open().unwrap();

    for code in 0..5 {
        client.send(format!("m{}", code).as_bytes(), code).unwrap();
    }
    for code in 0..5 {
        let message = server.read(Timeout::millis(100)).unwrap();
        assert_eq!(message.code, code);
        assert_eq!(message.data, format!("m{}", code).into_bytes());
    }
}
