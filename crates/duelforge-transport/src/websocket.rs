//! WebSocket transport implementation using `tokio-tungstenite`.
//!
//! Identity rides on the upgrade request: the browser connects to
//! `ws://host/?clientId=<uuid>` with the identifier it generated once
//! and keeps in local storage. The handshake callback pulls it out of
//! the query string and rejects upgrades that omit it.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use duelforge_protocol::{ClientId, ConnectionId};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{
    ErrorResponse, Request, Response,
};
use tokio_tungstenite::tungstenite::http::StatusCode;

use crate::{Connection, Transport, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

type WsStream = tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>;

/// Extracts the `clientId` query parameter from an upgrade request query
/// string.
fn client_id_from_query(query: &str) -> Option<ClientId> {
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == "clientId" && !value.is_empty()).then(|| ClientId::from(value))
    })
}

/// A WebSocket-based [`Transport`] that listens for incoming connections.
pub struct WebSocketTransport {
    listener: TcpListener,
}

impl WebSocketTransport {
    /// Binds a new WebSocket transport to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "WebSocket transport listening");
        Ok(Self { listener })
    }
}

impl Transport for WebSocketTransport {
    type Connection = WebSocketConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let mut client_id = None;
        let ws = tokio_tungstenite::accept_hdr_async(
            stream,
            |req: &Request, resp: Response| {
                client_id = req.uri().query().and_then(client_id_from_query);
                if client_id.is_some() {
                    Ok(resp)
                } else {
                    let mut reject = ErrorResponse::new(Some(
                        "missing clientId query parameter".to_string(),
                    ));
                    *reject.status_mut() = StatusCode::BAD_REQUEST;
                    Err(reject)
                }
            },
        )
        .await
        .map_err(|e| TransportError::HandshakeRejected(e.to_string()))?;

        // The callback only lets identified handshakes through.
        let Some(client_id) = client_id else {
            return Err(TransportError::HandshakeRejected(
                "handshake completed without a client id".to_string(),
            ));
        };

        let id = ConnectionId(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(%id, %addr, client = %client_id, "accepted WebSocket connection");

        Ok(WebSocketConnection {
            id,
            client_id,
            ws: Arc::new(Mutex::new(ws)),
        })
    }

    fn local_addr(&self) -> Result<SocketAddr, Self::Error> {
        self.listener
            .local_addr()
            .map_err(TransportError::AcceptFailed)
    }
}

/// A single identified WebSocket connection.
pub struct WebSocketConnection {
    id: ConnectionId,
    client_id: ClientId,
    ws: Arc<Mutex<WsStream>>,
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    async fn send(&self, data: &str) -> Result<(), Self::Error> {
        use futures_util::SinkExt;
        let msg = Message::Text(data.into());
        self.ws.lock().await.send(msg).await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        })
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        use futures_util::StreamExt;
        loop {
            let msg = self.ws.lock().await.next().await;
            match msg {
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Some(data.into()));
                }
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_bytes().to_vec()));
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // skip ping/pong/frame
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(
                        std::io::Error::new(
                            std::io::ErrorKind::ConnectionReset,
                            e,
                        ),
                    ));
                }
            }
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.ws.lock().await.close(None).await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        })
    }

    fn id(&self) -> ConnectionId {
        self.id
    }

    fn client_id(&self) -> &ClientId {
        &self.client_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_id_from_query_single_param() {
        let id = client_id_from_query("clientId=u-1");
        assert_eq!(id, Some(ClientId::from("u-1")));
    }

    #[test]
    fn test_client_id_from_query_among_other_params() {
        let id = client_id_from_query("v=2&clientId=abc-def&debug=1");
        assert_eq!(id, Some(ClientId::from("abc-def")));
    }

    #[test]
    fn test_client_id_from_query_missing_or_empty() {
        assert_eq!(client_id_from_query("v=2&debug=1"), None);
        assert_eq!(client_id_from_query("clientId="), None);
        assert_eq!(client_id_from_query(""), None);
    }
}
