//! Core protocol types for Duelforge's wire format.
//!
//! This module defines every type that travels "on the wire" — the
//! structures that get serialized to JSON, sent over the socket, and
//! deserialized on the other side. Event names and field spellings match
//! what the browser client expects (`hostRoom`, `diceRolled`,
//! `playerValuesUpdated`, ...), so every enum here carries explicit serde
//! renames. Change a rename and you break the client.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A stable identifier for a client, assigned by the identity provider
/// (the browser generates a UUID once and persists it in local storage).
///
/// This survives reconnects — the same human reconnecting on a new socket
/// presents the same `ClientId`. It is the key for room seats, the session
/// index, and the `results`/`players` maps in outbound events.
///
/// `#[serde(transparent)]` makes it serialize as a bare string, so it can
/// double as a JSON object key in the player maps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub String);

impl ClientId {
    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ClientId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// An opaque, human-shareable room code.
///
/// Generated server-side as 8 uppercase hex characters (4 random bytes).
/// 2^32 possibilities is plenty for the handful of concurrent rooms a
/// single process hosts — callers treat collisions as negligible and do
/// not retry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(pub String);

impl RoomCode {
    /// Generates a fresh high-entropy room code.
    pub fn generate() -> Self {
        use rand::Rng;
        use std::fmt::Write;

        let bytes: [u8; 4] = rand::rng().random();
        let mut code = String::with_capacity(8);
        for b in bytes {
            let _ = write!(code, "{b:02X}");
        }
        Self(code)
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RoomCode {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifies a live socket. Assigned by the transport, replaced on every
/// reconnect, and never used for player identity — that is what
/// [`ClientId`] is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Player values
// ---------------------------------------------------------------------------

/// A player's authoritative per-match resources, as broadcast to clients.
///
/// `hp` is only ever mutated by the combat resolver or a full match reset.
/// The dice and special slots are `None` between rounds; previews and
/// submissions fill them, resolution clears them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerValues {
    pub hp: i32,
    pub dice_one: Option<i32>,
    pub dice_two: Option<i32>,
    pub dice_three: Option<i32>,
    #[serde(rename = "special1")]
    pub special_one: Option<i32>,
    #[serde(rename = "special2")]
    pub special_two: Option<i32>,
}

impl PlayerValues {
    /// Fresh values for a newly admitted player.
    pub fn starting(hp: i32) -> Self {
        Self {
            hp,
            dice_one: None,
            dice_two: None,
            dice_three: None,
            special_one: None,
            special_two: None,
        }
    }

    /// Clears every die and special slot, leaving `hp` untouched.
    pub fn clear_dice(&mut self) {
        self.dice_one = None;
        self.dice_two = None;
        self.dice_three = None;
        self.special_one = None;
        self.special_two = None;
    }
}

/// The committed attack/defense/special selections for one round.
///
/// Exactly these four fields and nothing else — in particular `hp` is
/// absent by construction, so a client can never smuggle a health value
/// through a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub dice_one: Option<i32>,
    pub dice_two: Option<i32>,
    #[serde(rename = "special1")]
    pub special_one: Option<i32>,
    #[serde(rename = "special2")]
    pub special_two: Option<i32>,
}

/// Snapshot of every seat in a room, keyed by client. This is what
/// `playerValuesUpdated`, `roundResult`, and `gameReset` carry.
pub type PlayerMap = HashMap<ClientId, PlayerValues>;

// ---------------------------------------------------------------------------
// Inbound events (client → server)
// ---------------------------------------------------------------------------

/// An intent submitted by a client.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON:
/// `{ "type": "joinByCode", "roomId": "3FA9B210" }`. Variant names are
/// camelCased to match the original event vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// Create a room with a fresh code and take the first seat.
    HostRoom,

    /// Join (or create — unseen codes are valid) the named room.
    JoinByCode { room_id: RoomCode },

    /// Anonymous quick-match: pair with a waiting player or start waiting.
    JoinRandom,

    /// Voluntarily leave the current room.
    LeaveRoom,

    /// Preview-only dice sync. Best effort, never affects the round.
    /// Absent dice fields leave the corresponding slot untouched.
    DiceRolled {
        room_id: RoomCode,
        #[serde(default)]
        dice_value_one: Option<i32>,
        #[serde(default)]
        dice_value_two: Option<i32>,
        #[serde(default)]
        dice_value_three: Option<i32>,
    },

    /// Commit final values for the current round.
    SendValues {
        room_id: RoomCode,
        values: Submission,
    },
}

// ---------------------------------------------------------------------------
// Outbound events (server → client or room group)
// ---------------------------------------------------------------------------

/// A per-player match verdict, spelled exactly as the client displays it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "You win")]
    Win,
    #[serde(rename = "You lose")]
    Lose,
    #[serde(rename = "Tie")]
    Tie,
}

/// A state notification pushed by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Reply to `hostRoom`/`joinRandom`: a fresh room was created for you.
    RoomCreated { room_id: RoomCode },

    /// Reply to `joinByCode`/`joinRandom`: you were seated in this room.
    JoinedRoom { room_id: RoomCode },

    /// Reply to a rejected join: the room already holds two players.
    RoomFull { room_id: RoomCode },

    /// Reply to `leaveRoom`: departure acknowledged.
    ReturnedToLobby,

    /// Your opponent left or disconnected; the round was abandoned.
    OpponentLeft { room_id: RoomCode },

    /// Current occupancy of the room.
    PlayerCountUpdate { count: usize },

    /// Full player map after a preview or a submission. Lets the client
    /// show "opponent is ready" without revealing the outcome.
    PlayerValuesUpdated { players: PlayerMap },

    /// A new round is open for submissions.
    RoundStart { round_number: u32 },

    /// Post-resolution snapshot: new HP, dice cleared.
    RoundResult { players: PlayerMap },

    /// The match was reset to round 1 with full HP.
    GameReset {
        message: String,
        round_number: u32,
        players: PlayerMap,
    },

    /// The match ended. `results` carries one verdict per client.
    EndGame {
        message: String,
        results: HashMap<ClientId, Verdict>,
        game_info: PlayerMap,
    },
}

// ---------------------------------------------------------------------------
// Scope — who receives an outbound event
// ---------------------------------------------------------------------------

/// Delivery scope for a [`ServerEvent`].
///
/// The engine returns `(Scope, ServerEvent)` pairs; the gateway fans
/// `Room` scopes out to every seated client. There is no cross-room
/// scope — a room's events never leak into another room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Deliver to one client.
    Client(ClientId),

    /// Deliver to every current member of the room, in seat order.
    Room(RoomCode),
}

// =========================================================================
// Tests
// =========================================================================
