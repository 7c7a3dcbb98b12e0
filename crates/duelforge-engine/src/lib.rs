//! Room lifecycle and round resolution for Duelforge.
//!
//! This crate is the authoritative core of the dice duel: it owns every
//! room, tracks which client sits where, collects per-round submissions,
//! and resolves combat. It has no opinion about transports — intents come
//! in as method calls, and everything the outside world should do comes
//! back out as [`Effect`]s.
//!
//! # Key types
//!
//! - [`DuelEngine`] — the state machine; consumes client intents,
//!   produces effects
//! - [`RoomRegistry`] — owns rooms and the quick-match pointer
//! - [`SessionIndex`] — client → room, for resolving bare disconnects
//! - [`combat::resolve`] — the pure round resolver
//! - [`EngineConfig`] — starting HP and the match-reset delay

pub mod combat;
mod config;
mod engine;
mod error;
mod registry;
mod room;
mod sessions;

pub use config::{EngineConfig, ROOM_CAPACITY};
pub use engine::{DuelEngine, Effect};
pub use error::EngineError;
pub use registry::RoomRegistry;
pub use room::{Room, RoundState, Seat};
pub use sessions::SessionIndex;
