//! Unified error type for the Duelforge server.

use duelforge_engine::EngineError;
use duelforge_protocol::ProtocolError;
use duelforge_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `duelforge` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate.
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum DuelforgeError {
    /// A transport-level error (connection, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// An engine-level error (room state).
    #[error(transparent)]
    Engine(#[from] EngineError),
}
