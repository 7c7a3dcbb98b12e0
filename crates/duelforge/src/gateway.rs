//! The gateway actor: one task that owns the engine.
//!
//! Every connection task funnels its commands through one unbounded
//! channel into this actor, so engine calls never interleave — the room
//! state needs no locks and every transition runs to completion before
//! the next one starts. Match-reset timers come back through the same
//! channel, which keeps them ordered with everything else.

use std::collections::HashMap;

use duelforge_engine::{DuelEngine, Effect, EngineConfig};
use duelforge_protocol::{
    ClientEvent, ClientId, ConnectionId, RoomCode, Scope, ServerEvent,
};
use tokio::sync::mpsc;

/// A command for the gateway actor.
pub(crate) enum GatewayCommand {
    /// A new socket for this client is ready to receive events.
    Register {
        client: ClientId,
        connection: ConnectionId,
        sender: mpsc::UnboundedSender<ServerEvent>,
    },

    /// An inbound intent decoded off a socket.
    Event {
        client: ClientId,
        connection: ConnectionId,
        event: ClientEvent,
    },

    /// The socket dropped or its reader task ended.
    Disconnect {
        client: ClientId,
        connection: ConnectionId,
    },

    /// A post-match reset timer fired.
    MatchResetDue { room: RoomCode },
}

/// Cheap handle for submitting commands to the gateway.
#[derive(Clone)]
pub(crate) struct GatewayHandle {
    commands: mpsc::UnboundedSender<GatewayCommand>,
}

impl GatewayHandle {
    /// Enqueues a command. The gateway task holds its own handle, so
    /// the channel stays open for the life of the process.
    pub(crate) fn send(&self, command: GatewayCommand) {
        let _ = self.commands.send(command);
    }
}

/// The sink for one client's outbound events, tied to the socket that
/// registered it.
struct Outbox {
    connection: ConnectionId,
    sender: mpsc::UnboundedSender<ServerEvent>,
}

/// The actor state: the engine plus one outbox per connected client.
pub(crate) struct Gateway {
    engine: DuelEngine,
    outboxes: HashMap<ClientId, Outbox>,
    commands: mpsc::UnboundedReceiver<GatewayCommand>,
    handle: GatewayHandle,
}

impl Gateway {
    /// Starts the gateway task and returns a handle to it.
    pub(crate) fn spawn(config: EngineConfig) -> GatewayHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = GatewayHandle { commands: tx };
        let gateway = Gateway {
            engine: DuelEngine::new(config),
            outboxes: HashMap::new(),
            commands: rx,
            handle: handle.clone(),
        };
        tokio::spawn(gateway.run());
        handle
    }

    async fn run(mut self) {
        while let Some(command) = self.commands.recv().await {
            match command {
                GatewayCommand::Register { client, connection, sender } => {
                    // A newer socket for a known client replaces the
                    // old outbox; the engine sees the same player.
                    self.outboxes
                        .insert(client, Outbox { connection, sender });
                }
                GatewayCommand::Event { client, connection, event } => {
                    let effects =
                        self.engine.handle(&client, connection, event);
                    self.apply(effects);
                }
                GatewayCommand::Disconnect { client, connection } => {
                    // Keep the outbox if a newer socket already replaced
                    // this one.
                    if self
                        .outboxes
                        .get(&client)
                        .is_some_and(|o| o.connection == connection)
                    {
                        self.outboxes.remove(&client);
                    }
                    let effects = self.engine.disconnect(&client, connection);
                    self.apply(effects);
                }
                GatewayCommand::MatchResetDue { room } => {
                    let effects = self.engine.match_reset_due(&room);
                    self.apply(effects);
                }
            }
        }
    }

    /// Carries out the effects of one engine call, in emission order.
    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Emit(scope, event) => self.deliver(scope, event),
                Effect::ScheduleMatchReset(room) => {
                    let handle = self.handle.clone();
                    let delay = self.engine.config().match_reset_delay;
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        handle.send(GatewayCommand::MatchResetDue { room });
                    });
                }
            }
        }
    }

    fn deliver(&mut self, scope: Scope, event: ServerEvent) {
        match scope {
            Scope::Client(client) => self.send_to(&client, event),
            Scope::Room(code) => {
                // Fan out to whoever is seated right now — a departed
                // player is no longer a member and gets nothing.
                for member in self.engine.room_members(&code) {
                    self.send_to(&member, event.clone());
                }
            }
        }
    }

    fn send_to(&mut self, client: &ClientId, event: ServerEvent) {
        let Some(outbox) = self.outboxes.get(client) else {
            tracing::debug!(%client, "dropping event for offline client");
            return;
        };
        if outbox.sender.send(event).is_err() {
            // Writer task gone; the Disconnect command is on its way.
            tracing::debug!(%client, "outbox closed, removing");
            self.outboxes.remove(client);
        }
    }
}
