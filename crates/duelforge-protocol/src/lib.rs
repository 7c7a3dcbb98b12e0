//! Wire protocol for Duelforge.
//!
//! This crate defines the "language" that the dice-duel client and server
//! speak:
//!
//! - **Types** ([`ClientEvent`], [`ServerEvent`], [`PlayerValues`],
//!   identifiers) — the event structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those events are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong doing so.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and the engine
//! (authoritative room state). It knows nothing about sockets or rooms —
//! only how events are spelled.
//!
//! ```text
//! Transport (bytes) → Protocol (ClientEvent) → Engine (room state)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientEvent, ClientId, ConnectionId, PlayerMap, PlayerValues, RoomCode,
    Scope, ServerEvent, Submission, Verdict,
};
