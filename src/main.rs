/*!
 * Port IPC Demo
 *
 * Opens a named server over the local port backend, runs its dispatch loop
 * on a worker thread, and sends a few messages through a client.
 */

use port_ipc::{
    init_tracing, ListenerRef, LocalPorts, LoggingListener, PortClient, PortServer, PortPrimitives,
    ServerConfig,
};
use std::error::Error;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

const SERVICE_NAME: &str = "demo.echo";
const SENT_MESSAGES: u64 = 4;
const DEMO_DEADLINE: Duration = Duration::from_secs(5);

/// Poll `done` until it holds or the demo deadline passes
fn wait_for(what: &str, mut done: impl FnMut() -> bool) -> Result<(), Box<dyn Error>> {
    let deadline = Instant::now() + DEMO_DEADLINE;
    while !done() {
        if Instant::now() >= deadline {
            return Err(format!("timed out waiting for {}", what).into());
        }
        thread::sleep(Duration::from_millis(5));
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let config = ServerConfig::from_env()?;
    let ports: Arc<dyn PortPrimitives> = Arc::new(LocalPorts::new());

    let mut server = PortServer::new(ports.clone(), SERVICE_NAME, config)?;
    let port = server.open()?;
    let listener: ListenerRef = Arc::new(LoggingListener);
    server.add_listener(listener);

    let server = Arc::new(server);
    let worker = {
        let server = Arc::clone(&server);
        thread::Builder::new()
            .name("ipc-dispatch".into())
            .spawn(move || server.start_loop())?
    };

    wait_for("dispatch loop start", || server.is_running())?;

    let mut client = PortClient::named(ports, SERVICE_NAME)?;
    let resolved = client.open()?;
    info!(port, resolved, "Client resolved service port");

    for (code, text) in [(1, "hello"), (2, "from"), (3, "port-ipc")] {
        client.send(text.as_bytes(), code)?;
    }
    // Exceeds the default 32 byte bound; the loop reports it to listeners
    client.send(&[b'x'; 64], 99)?;

    let dispatched = wait_for("dispatch of every message", || {
        let stats = server.stats();
        stats.messages + stats.errors >= SENT_MESSAGES
    });
    server.stop();

    match worker.join() {
        Ok(result) => result?,
        Err(_) => return Err("dispatch thread panicked".into()),
    }
    dispatched?;

    info!(stats = ?server.stats(), "Demo finished");
    Ok(())
}
