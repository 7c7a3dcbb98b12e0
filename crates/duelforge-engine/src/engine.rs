//! The duel engine: admission, submission collection, resolution, reset.
//!
//! The engine is synchronous and transport-free. Each inbound intent is
//! one method call that runs to completion and returns the full list of
//! [`Effect`]s it produced — broadcasts to emit and timers to schedule.
//! The caller (the gateway actor) serializes calls, so no two mutations
//! of the same room ever interleave and no handler suspends mid-transition.

use duelforge_protocol::{
    ClientEvent, ClientId, ConnectionId, PlayerValues, RoomCode, Scope,
    ServerEvent, Submission, Verdict,
};

use crate::room::{Room, RoundState, Seat};
use crate::{EngineConfig, EngineError, ROOM_CAPACITY, RoomRegistry, SessionIndex, combat};

/// Something the engine wants done in the outside world.
///
/// Effects are produced in emission order; the gateway delivers `Emit`
/// effects in that order and turns `ScheduleMatchReset` into a delayed
/// command on its own queue.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Deliver an event to a client or fan it out to a room.
    Emit(Scope, ServerEvent),

    /// Fire a match reset for this room after
    /// [`EngineConfig::match_reset_delay`]. Must be a no-op if the room
    /// is gone by then.
    ScheduleMatchReset(RoomCode),
}

/// Owns the room registry and session index; the only component that
/// mutates room state.
pub struct DuelEngine {
    config: EngineConfig,
    registry: RoomRegistry,
    sessions: SessionIndex,
}

impl DuelEngine {
    /// Creates an engine with no rooms.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            registry: RoomRegistry::new(),
            sessions: SessionIndex::new(),
        }
    }

    /// The configuration this engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Dispatches one inbound client intent.
    pub fn handle(
        &mut self,
        client: &ClientId,
        connection: ConnectionId,
        event: ClientEvent,
    ) -> Vec<Effect> {
        match event {
            ClientEvent::HostRoom => self.host_room(client, connection),
            ClientEvent::JoinByCode { room_id } => {
                self.join_by_code(client, connection, room_id)
            }
            ClientEvent::JoinRandom => self.join_random(client, connection),
            ClientEvent::LeaveRoom => self.leave(client),
            ClientEvent::DiceRolled {
                room_id,
                dice_value_one,
                dice_value_two,
                dice_value_three,
            } => self.record_dice_preview(
                &room_id,
                client,
                [dice_value_one, dice_value_two, dice_value_three],
            ),
            ClientEvent::SendValues { room_id, values } => {
                self.submit_values(&room_id, client, values)
            }
        }
    }

    // -----------------------------------------------------------------
    // Admission
    // -----------------------------------------------------------------

    /// Creates a room with a fresh code and seats the host.
    ///
    /// Hosted rooms are joined by sharing the code; they never become
    /// the quick-match target.
    pub fn host_room(
        &mut self,
        client: &ClientId,
        connection: ConnectionId,
    ) -> Vec<Effect> {
        let code = self.registry.generate_code();
        let mut effects = vec![Effect::Emit(
            Scope::Client(client.clone()),
            ServerEvent::RoomCreated { room_id: code.clone() },
        )];
        // A generated code colliding with a full room is vanishingly
        // rare; when it happens the host is told like any other joiner.
        if let Err(EngineError::RoomFull(room_id)) =
            self.admit(&code, client, connection, &mut effects)
        {
            effects.clear();
            effects.push(Effect::Emit(
                Scope::Client(client.clone()),
                ServerEvent::RoomFull { room_id },
            ));
        }
        effects
    }

    /// Seats the client in the named room, creating it for unseen codes.
    pub fn join_by_code(
        &mut self,
        client: &ClientId,
        connection: ConnectionId,
        code: RoomCode,
    ) -> Vec<Effect> {
        let mut effects = Vec::new();
        match self.admit(&code, client, connection, &mut effects) {
            Ok(()) => {
                effects.insert(
                    0,
                    Effect::Emit(
                        Scope::Client(client.clone()),
                        ServerEvent::JoinedRoom { room_id: code },
                    ),
                );
            }
            Err(EngineError::RoomFull(room_id)) => {
                // Capacity rejection mutates nothing and is reported to
                // the rejected client only.
                effects.clear();
                effects.push(Effect::Emit(
                    Scope::Client(client.clone()),
                    ServerEvent::RoomFull { room_id },
                ));
            }
        }
        effects
    }

    /// Anonymous quick-match: pair with the waiting room if one exists,
    /// otherwise open a new room and wait.
    pub fn join_random(
        &mut self,
        client: &ClientId,
        connection: ConnectionId,
    ) -> Vec<Effect> {
        let mut effects = Vec::new();

        if let Some(code) = self.registry.open_room().cloned() {
            if self.registry.player_count(&code) == 1 {
                match self.admit(&code, client, connection, &mut effects) {
                    Ok(()) => {
                        effects.insert(
                            0,
                            Effect::Emit(
                                Scope::Client(client.clone()),
                                ServerEvent::JoinedRoom { room_id: code },
                            ),
                        );
                        return effects;
                    }
                    Err(EngineError::RoomFull(_)) => {
                        self.registry.clear_open_room_if(&code);
                    }
                }
            } else {
                tracing::debug!(room = %code, "stale quick-match pointer cleared");
                self.registry.clear_open_room_if(&code);
            }
        }

        let code = self.registry.generate_code();
        effects.push(Effect::Emit(
            Scope::Client(client.clone()),
            ServerEvent::RoomCreated { room_id: code.clone() },
        ));
        match self.admit(&code, client, connection, &mut effects) {
            Ok(()) => self.registry.set_open_room(code),
            Err(EngineError::RoomFull(room_id)) => {
                // Generated-code collision with a full room.
                effects.clear();
                effects.push(Effect::Emit(
                    Scope::Client(client.clone()),
                    ServerEvent::RoomFull { room_id },
                ));
            }
        }
        effects
    }

    /// Seats a client in a room, or refreshes their connection if they
    /// already hold a seat (reconnect). A client seated elsewhere is
    /// departed from that room first; a capacity rejection happens
    /// before the departure and mutates nothing.
    ///
    /// On the 1→2 occupancy transition the round counter resets, a
    /// `roundStart` goes out, and any quick-match pointer at this room
    /// is cleared.
    fn admit(
        &mut self,
        code: &RoomCode,
        client: &ClientId,
        connection: ConnectionId,
        effects: &mut Vec<Effect>,
    ) -> Result<(), EngineError> {
        // Reject before any mutation: a failed join leaves every room
        // untouched, including one the client is about to switch from.
        if let Some(room) = self.registry.get(code) {
            if room.seat(client).is_none()
                && room.player_count() >= ROOM_CAPACITY
            {
                return Err(EngineError::RoomFull(code.clone()));
            }
        }

        // A client switching rooms departs the old one first — the
        // session index and seat membership must always agree, and the
        // abandoned room must be notified and reclaimable.
        if self
            .sessions
            .resolve(client)
            .is_some_and(|current| current != code)
        {
            let departure = self.depart(client, None);
            effects.extend(departure);
        }

        let starting_hp = self.config.starting_hp;
        let room = self.registry.ensure(code);

        if let Some(seat) = room.seat_mut(client) {
            seat.connection = connection;
            let count = room.player_count();
            tracing::info!(room = %code, %client, "player reconnected");
            effects.push(Effect::Emit(
                Scope::Room(code.clone()),
                ServerEvent::PlayerCountUpdate { count },
            ));
            return Ok(());
        }

        if room.player_count() >= ROOM_CAPACITY {
            return Err(EngineError::RoomFull(code.clone()));
        }

        room.seats.push(Seat {
            client: client.clone(),
            connection,
            values: PlayerValues::starting(starting_hp),
        });
        let count = room.player_count();
        if count == ROOM_CAPACITY {
            room.round = RoundState::fresh();
        }

        self.sessions.bind(client.clone(), code.clone());
        tracing::info!(room = %code, %client, players = count, "player joined");

        effects.push(Effect::Emit(
            Scope::Room(code.clone()),
            ServerEvent::PlayerCountUpdate { count },
        ));
        if count == ROOM_CAPACITY {
            self.registry.clear_open_room_if(code);
            effects.push(Effect::Emit(
                Scope::Room(code.clone()),
                ServerEvent::RoundStart { round_number: 1 },
            ));
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Round flow
    // -----------------------------------------------------------------

    /// Preview-only dice sync. Best effort: unknown rooms or players are
    /// ignored, `hp` and the submission count are never touched.
    pub fn record_dice_preview(
        &mut self,
        code: &RoomCode,
        client: &ClientId,
        dice: [Option<i32>; 3],
    ) -> Vec<Effect> {
        let mut effects = Vec::new();
        let Some(room) = self.registry.get_mut(code) else {
            tracing::debug!(room = %code, "preview for unknown room dropped");
            return effects;
        };
        let Some(seat) = room.seat_mut(client) else {
            tracing::debug!(room = %code, %client, "preview from non-member dropped");
            return effects;
        };

        // Only the supplied dice overwrite; absent fields keep their slot.
        let [one, two, three] = dice;
        if one.is_some() {
            seat.values.dice_one = one;
        }
        if two.is_some() {
            seat.values.dice_two = two;
        }
        if three.is_some() {
            seat.values.dice_three = three;
        }

        effects.push(Effect::Emit(
            Scope::Room(code.clone()),
            ServerEvent::PlayerValuesUpdated { players: room.snapshot() },
        ));
        effects
    }

    /// Commits a player's values for the current round and resolves the
    /// round once every seated player has submitted.
    ///
    /// Unknown rooms and players are silently dropped — expected under
    /// reconnect races, not an error the user sees.
    pub fn submit_values(
        &mut self,
        code: &RoomCode,
        client: &ClientId,
        submission: Submission,
    ) -> Vec<Effect> {
        let mut effects = Vec::new();
        let Some(room) = self.registry.get_mut(code) else {
            tracing::debug!(room = %code, "submission for unknown room dropped");
            return effects;
        };
        let Some(seat) = room.seat_mut(client) else {
            tracing::debug!(room = %code, %client, "submission from non-member dropped");
            return effects;
        };

        warn_on_parity(client, &submission);

        // Exactly the four submitted fields land; hp is not part of a
        // submission and cannot be.
        seat.values.dice_one = submission.dice_one;
        seat.values.dice_two = submission.dice_two;
        seat.values.special_one = submission.special_one;
        seat.values.special_two = submission.special_two;
        room.round.submissions += 1;

        effects.push(Effect::Emit(
            Scope::Room(code.clone()),
            ServerEvent::PlayerValuesUpdated { players: room.snapshot() },
        ));

        if usize::from(room.round.submissions) < room.player_count() {
            return effects;
        }

        // Resolution destructures exactly two seats. Anything else here
        // is an internal defect: abort without touching HP and recover
        // the submission counter.
        if room.player_count() != ROOM_CAPACITY {
            tracing::error!(
                room = %code,
                players = room.player_count(),
                "resolution requires exactly two seated players; aborting"
            );
            room.round.submissions = 0;
            return effects;
        }

        // Snapshot both value sets before mutating either, so each
        // direction of damage sees pre-round numbers.
        let one = room.seats[0].values.clone();
        let two = room.seats[1].values.clone();
        let outcome = combat::resolve(&one, &two);

        room.seats[0].values.hp = outcome.hp_one;
        room.seats[1].values.hp = outcome.hp_two;
        for seat in &mut room.seats {
            seat.values.clear_dice();
        }
        room.round.submissions = 0;

        if outcome.ended {
            let results = room
                .seats
                .iter()
                .map(|s| {
                    let verdict = if outcome.tie {
                        Verdict::Tie
                    } else if s.values.hp <= 0 {
                        Verdict::Lose
                    } else {
                        Verdict::Win
                    };
                    (s.client.clone(), verdict)
                })
                .collect();
            let message = if outcome.tie {
                "The game ended in a tie! Thank you for playing".to_string()
            } else {
                "Game has ended! Thank you for playing".to_string()
            };
            let snapshot = room.snapshot();

            tracing::info!(room = %code, tie = outcome.tie, "match ended");
            effects.push(Effect::Emit(
                Scope::Room(code.clone()),
                ServerEvent::EndGame {
                    message,
                    results,
                    game_info: snapshot.clone(),
                },
            ));
            effects.push(Effect::Emit(
                Scope::Room(code.clone()),
                ServerEvent::RoundResult { players: snapshot },
            ));
            effects.push(Effect::ScheduleMatchReset(code.clone()));
        } else {
            effects.push(Effect::Emit(
                Scope::Room(code.clone()),
                ServerEvent::RoundResult { players: room.snapshot() },
            ));
            room.round.number += 1;
            effects.push(Effect::Emit(
                Scope::Room(code.clone()),
                ServerEvent::RoundStart { round_number: room.round.number },
            ));
        }
        effects
    }

    /// Restores a room to round 1 with full HP after the post-match
    /// delay. A no-op if the room was destroyed while the timer ran.
    pub fn match_reset_due(&mut self, code: &RoomCode) -> Vec<Effect> {
        let starting_hp = self.config.starting_hp;
        let mut effects = Vec::new();
        let Some(room) = self.registry.get_mut(code) else {
            tracing::debug!(room = %code, "match reset for vanished room skipped");
            return effects;
        };

        for seat in &mut room.seats {
            seat.values = PlayerValues::starting(starting_hp);
        }
        room.round = RoundState::fresh();

        tracing::info!(room = %code, "match reset");
        effects.push(Effect::Emit(
            Scope::Room(code.clone()),
            ServerEvent::GameReset {
                message: "New match! Roll your dice".to_string(),
                round_number: 1,
                players: room.snapshot(),
            },
        ));
        effects.push(Effect::Emit(
            Scope::Room(code.clone()),
            ServerEvent::RoundStart { round_number: 1 },
        ));
        effects
    }

    // -----------------------------------------------------------------
    // Departure
    // -----------------------------------------------------------------

    /// Voluntary departure. Idempotent: a client in no room just gets
    /// the lobby acknowledgement.
    pub fn leave(&mut self, client: &ClientId) -> Vec<Effect> {
        let mut effects = self.depart(client, None);
        effects.push(Effect::Emit(
            Scope::Client(client.clone()),
            ServerEvent::ReturnedToLobby,
        ));
        effects
    }

    /// Transport-level disconnect, routed through the same departure
    /// contract. `connection` guards against the reconnect race: if the
    /// seat already belongs to a newer socket, the stale drop is ignored.
    pub fn disconnect(
        &mut self,
        client: &ClientId,
        connection: ConnectionId,
    ) -> Vec<Effect> {
        self.depart(client, Some(connection))
    }

    fn depart(
        &mut self,
        client: &ClientId,
        only_from: Option<ConnectionId>,
    ) -> Vec<Effect> {
        let mut effects = Vec::new();
        let Some(code) = self.sessions.resolve(client).cloned() else {
            return effects;
        };
        let Some(room) = self.registry.get_mut(&code) else {
            // Index out of sync with the registry; recover quietly.
            self.sessions.unbind(client);
            return effects;
        };

        if let Some(conn) = only_from {
            if room.seat(client).map(|s| s.connection) != Some(conn) {
                tracing::debug!(%client, %conn, "stale disconnect ignored");
                return effects;
            }
        }

        room.remove_seat(client);
        let remaining = room.player_count();
        if remaining == 1 {
            // The in-flight round is abandoned; no resolution occurs.
            room.round.submissions = 0;
        }
        self.sessions.unbind(client);
        tracing::info!(room = %code, %client, players = remaining, "player left");

        effects.push(Effect::Emit(
            Scope::Room(code.clone()),
            ServerEvent::PlayerCountUpdate { count: remaining },
        ));
        if remaining == 1 {
            effects.push(Effect::Emit(
                Scope::Room(code.clone()),
                ServerEvent::OpponentLeft { room_id: code.clone() },
            ));
        } else if remaining == 0 {
            self.registry.destroy_if_empty(&code);
        }
        effects
    }

    // -----------------------------------------------------------------
    // Introspection (gateway fan-out, tests)
    // -----------------------------------------------------------------

    /// Shared view of a room.
    pub fn room(&self, code: &RoomCode) -> Option<&Room> {
        self.registry.get(code)
    }

    /// Current members of a room in seat order; empty for unknown codes.
    pub fn room_members(&self, code: &RoomCode) -> Vec<ClientId> {
        self.registry.get(code).map(Room::members).unwrap_or_default()
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.registry.room_count()
    }

    /// The quick-match waiting room, if any.
    pub fn open_room(&self) -> Option<&RoomCode> {
        self.registry.open_room()
    }

    /// The room a client currently occupies.
    pub fn resolve_session(&self, client: &ClientId) -> Option<&RoomCode> {
        self.sessions.resolve(client)
    }
}

/// The client UI constrains attack dice to even values and defense dice
/// to odd ones. The resolver accepts anything, but a violation here
/// means a non-conforming client, which is worth a defect signal.
fn warn_on_parity(client: &ClientId, submission: &Submission) {
    if let Some(attack) = submission.dice_one {
        if attack % 2 != 0 {
            tracing::warn!(%client, attack, "attack die is odd");
        }
    }
    if let Some(defense) = submission.dice_two {
        if defense % 2 == 0 {
            tracing::warn!(%client, defense, "defense die is even");
        }
    }
}
