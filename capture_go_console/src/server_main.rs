use std::net::Shutdown;
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use async_std::net::{TcpListener, TcpStream};
use capture_go::network::CommunicationError;
use capture_go::server::*;
use futures_util::StreamExt;
use instant::Instant;
use log::{error, info, warn};

use crate::network;
use crate::server_config::ServerConfig;


const TICK_PERIOD: Duration = Duration::from_millis(100);
// Time for writer tasks to deliver the shutdown notice.
const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_millis(300);

async fn handle_connection(
    stream: TcpStream, tx: mpsc::SyncSender<IncomingEvent>, clients: Arc<Clients>,
) {
    let peer_addr = stream.peer_addr().map_or_else(|_| "unknown".to_owned(), |a| a.to_string());
    let (client_tx, client_rx) = async_std::channel::unbounded();
    let (client_id, role) = clients.add_client(client_tx, peer_addr.clone());
    info!("Client {} connected as {:?}", peer_addr, role);
    if tx.send(IncomingEvent::Connected(client_id)).is_err() {
        clients.remove_client(client_id);
        return;
    }

    // Client -> Server
    let mut stream_rx = stream.clone();
    let clients_remover = Arc::clone(&clients);
    async_std::task::spawn(async move {
        loop {
            match network::read_obj_async(&mut stream_rx).await {
                Ok(ev) => {
                    if tx.send(IncomingEvent::Network(client_id, ev)).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    if let Some(logging_id) = clients_remover.remove_client(client_id) {
                        match err {
                            CommunicationError::ConnectionClosed => {
                                info!("Client {} disconnected", logging_id)
                            }
                            err => warn!(
                                "Client {} disconnected due to read error: {:?}",
                                logging_id, err
                            ),
                        }
                    }
                    break;
                }
            }
        }
    });

    // Server -> Client. The channel is closed when the client is removed from the registry.
    let mut stream_tx = stream;
    while let Ok(ev) = client_rx.recv().await {
        if let Err(err) = network::write_obj_async(&mut stream_tx, &ev).await {
            if let Some(logging_id) = clients.remove_client(client_id) {
                warn!("Client {} disconnected due to write error: {:?}", logging_id, err);
            }
            break;
        }
    }
    // Wakes up the reader if the server dropped the client first.
    let _ = stream_tx.shutdown(Shutdown::Both);
}

pub fn bind(port: u16) -> anyhow::Result<TcpListener> {
    async_std::task::block_on(TcpListener::bind(("0.0.0.0", port)))
        .with_context(|| format!("Failed to listen on port {port}"))
}

pub fn run(config: ServerConfig) -> anyhow::Result<()> {
    let listener = bind(config.port)?;
    serve(listener, config)
}

// Runs until Ctrl-C.
pub fn serve(listener: TcpListener, config: ServerConfig) -> anyhow::Result<()> {
    // Limited buffer for data streaming from clients into the server.
    // When this is full because ServerState::apply_event isn't coping with
    // the load, we start putting back pressure on client sockets.
    let (tx, rx) = mpsc::sync_channel(10000);
    let tx_tick = tx.clone();
    let tx_terminate = tx.clone();
    let clients = Arc::new(Clients::new());

    ctrlc::set_handler(move || {
        let _ = tx_terminate.send(IncomingEvent::Terminate);
    })
    .context("Error setting Ctrl-C handler")?;

    thread::spawn(move || {
        loop {
            thread::sleep(TICK_PERIOD);
            if tx_tick.send(IncomingEvent::Tick).is_err() {
                break;
            }
        }
    });

    info!(
        "Listening on {}; win score {}, restart delay {:?}",
        listener.local_addr().map_or_else(|_| "?".to_owned(), |a| a.to_string()),
        config.win_score,
        config.restart_delay
    );
    let clients_copy = Arc::clone(&clients);
    async_std::task::spawn(async move {
        let mut incoming = listener.incoming();
        while let Some(stream) = incoming.next().await {
            match stream {
                Ok(stream) => {
                    let _ = stream.set_nodelay(true);
                    async_std::task::spawn(handle_connection(
                        stream,
                        tx.clone(),
                        Arc::clone(&clients_copy),
                    ));
                }
                Err(err) => error!("Failed to accept connection: {}", err),
            }
        }
    });

    let mut server_state = ServerState::new(clients, config.rules());
    for event in rx {
        if server_state.apply_event(event, Instant::now()).is_break() {
            thread::sleep(SHUTDOWN_GRACE_PERIOD);
            return Ok(());
        }
    }
    anyhow::bail!("Unexpected end of events stream")
}
