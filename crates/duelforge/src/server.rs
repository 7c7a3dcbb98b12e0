//! `DuelServer` builder and server loop.
//!
//! This is the entry point for running a duel server. The accept loop
//! spawns one task per connection; each task decodes inbound intents
//! and forwards them to the gateway actor, while a paired writer task
//! drains that client's outbox back onto the socket.

use std::sync::Arc;

use duelforge_engine::EngineConfig;
use duelforge_protocol::{ClientEvent, Codec, JsonCodec, ServerEvent};
use duelforge_transport::{
    Connection, Transport, WebSocketConnection, WebSocketTransport,
};
use tokio::sync::mpsc;

use crate::DuelforgeError;
use crate::gateway::{Gateway, GatewayCommand, GatewayHandle};

/// Builder for configuring and starting a duel server.
pub struct DuelServerBuilder {
    bind_addr: String,
    config: EngineConfig,
}

impl DuelServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            config: EngineConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the engine configuration (starting HP, reset delay).
    pub fn engine_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the transport and starts the gateway actor.
    pub async fn build(self) -> Result<DuelServer, DuelforgeError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let gateway = Gateway::spawn(self.config);
        Ok(DuelServer { transport, gateway })
    }
}

impl Default for DuelServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running duel server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct DuelServer {
    transport: WebSocketTransport,
    gateway: GatewayHandle,
}

impl DuelServer {
    /// Creates a new builder.
    pub fn builder() -> DuelServerBuilder {
        DuelServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr, DuelforgeError> {
        Ok(self.transport.local_addr()?)
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), DuelforgeError> {
        tracing::info!("duel server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let gateway = self.gateway.clone();
                    tokio::spawn(async move {
                        handle_connection(conn, gateway).await;
                    });
                }
                Err(e) => {
                    // Includes rejected handshakes (no clientId); the
                    // accept loop keeps going.
                    tracing::debug!(error = %e, "accept failed");
                }
            }
        }
    }
}

/// Handles a single identified connection from accept to close.
///
/// Takes the concrete connection type: the writer task moves the
/// connection's futures onto a spawned task, which needs them `Send` —
/// a guarantee the `Connection` trait's `async fn`s do not carry.
async fn handle_connection(conn: WebSocketConnection, gateway: GatewayHandle) {
    let client = conn.client_id().clone();
    let connection = conn.id();
    let codec = JsonCodec;
    tracing::debug!(%connection, %client, "handling new connection");

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();
    gateway.send(GatewayCommand::Register {
        client: client.clone(),
        connection,
        sender: tx,
    });

    // One writer task per socket keeps outbound events in gateway order.
    let conn = Arc::new(conn);
    let writer_conn = Arc::clone(&conn);
    let writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match codec.encode(&event).map(String::from_utf8) {
                Ok(Ok(text)) => text,
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "non-utf8 outbound payload");
                    continue;
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to encode event");
                    continue;
                }
            };
            if writer_conn.send(&text).await.is_err() {
                break;
            }
        }
    });

    loop {
        match conn.recv().await {
            Ok(Some(data)) => match codec.decode::<ClientEvent>(&data) {
                Ok(event) => {
                    gateway.send(GatewayCommand::Event {
                        client: client.clone(),
                        connection,
                        event,
                    });
                }
                Err(e) => {
                    // Unknown or malformed events are dropped, the
                    // connection stays up.
                    tracing::debug!(
                        %client, error = %e, "ignoring undecodable message"
                    );
                }
            },
            Ok(None) => {
                tracing::info!(%client, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%client, error = %e, "recv error");
                break;
            }
        }
    }

    // Socket gone either way: run departure through the gateway so the
    // opponent is notified and the room cleaned up.
    gateway.send(GatewayCommand::Disconnect { client, connection });
    writer.abort();
}
