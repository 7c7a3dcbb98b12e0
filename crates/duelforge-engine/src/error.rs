//! Error types for the engine.
//!
//! Deliberately small: most engine failure modes are contractually
//! silent (stale previews and submissions are dropped, departures are
//! idempotent), and invariant violations are logged rather than
//! surfaced. The one user-visible failure is a capacity rejection.

use duelforge_protocol::RoomCode;

/// Errors that can occur during engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The room already holds two distinct occupants. No state was
    /// mutated; the caller notifies only the rejected client.
    #[error("room {0} is full")]
    RoomFull(RoomCode),
}
