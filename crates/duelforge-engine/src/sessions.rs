//! Session index: client → room, for resolving bare disconnects.
//!
//! A transport-level disconnect carries no room id, and the departure
//! path must not trust a client-supplied one anyway. This index is the
//! authoritative answer to "which room is this client in", kept strictly
//! in sync with seat membership by the engine.

use std::collections::HashMap;

use duelforge_protocol::{ClientId, RoomCode};

/// One-to-one mapping from client to occupied room.
///
/// Holds non-owning back-references (room codes) for routing only — the
/// registry owns the rooms themselves.
#[derive(Debug, Default)]
pub struct SessionIndex {
    by_client: HashMap<ClientId, RoomCode>,
}

impl SessionIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `client` now occupies `room`.
    pub fn bind(&mut self, client: ClientId, room: RoomCode) {
        self.by_client.insert(client, room);
    }

    /// Removes the binding for `client`, if any.
    pub fn unbind(&mut self, client: &ClientId) {
        self.by_client.remove(client);
    }

    /// The room this client currently occupies.
    pub fn resolve(&self, client: &ClientId) -> Option<&RoomCode> {
        self.by_client.get(client)
    }

    /// Number of bound clients.
    pub fn len(&self) -> usize {
        self.by_client.len()
    }

    /// `true` when no clients are bound.
    pub fn is_empty(&self) -> bool {
        self.by_client.is_empty()
    }
}
