//! Transport abstraction layer for Duelforge.
//!
//! Provides the [`Transport`] and [`Connection`] traits the server loop
//! is written against. A connection is more than a byte pipe here: every
//! accepted socket carries the [`ClientId`] the browser presented during
//! the handshake, because the engine keys all room state by client, not
//! by socket.
//!
//! # Feature Flags
//!
//! - `websocket` (default) — WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketTransport};

use duelforge_protocol::{ClientId, ConnectionId};

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    ///
    /// Handshakes that do not identify a client are rejected here; the
    /// server loop only ever sees identified connections.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;

    /// The local address the transport is listening on.
    fn local_addr(&self) -> Result<std::net::SocketAddr, Self::Error>;
}

/// A single identified connection that can send and receive messages.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends a text payload to the remote peer.
    async fn send(&self, data: &str) -> Result<(), Self::Error>;

    /// Receives the next message from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this socket. Fresh on every
    /// reconnect — never a player identity.
    fn id(&self) -> ConnectionId;

    /// The stable client identity presented during the handshake.
    fn client_id(&self) -> &ClientId;
}
