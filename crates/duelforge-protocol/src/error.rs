//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding wire events.
///
/// A decode failure on one connection is never fatal — the gateway logs
/// it and drops the frame, per the stale/unknown-reference policy.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    /// Common causes: malformed JSON, missing fields, unknown event tags.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded but violates a protocol rule — e.g. a
    /// handshake without a `clientId`.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
