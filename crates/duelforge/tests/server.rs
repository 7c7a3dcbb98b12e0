//! Integration tests for the duel server: real sockets, full flow.

use std::time::Duration;

use duelforge::DuelServerBuilder;
use duelforge_engine::EngineConfig;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a server on a random port and returns the address.
async fn start_server(config: EngineConfig) -> String {
    let server = DuelServerBuilder::new()
        .bind("127.0.0.1:0")
        .engine_config(config)
        .build()
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

async fn connect(addr: &str, client: &str) -> ClientWs {
    let url = format!("ws://{addr}/?clientId={client}");
    let (ws, _) = tokio_tungstenite::connect_async(&url)
        .await
        .expect("should connect");
    ws
}

async fn send_json(ws: &mut ClientWs, value: serde_json::Value) {
    ws.send(Message::Text(value.to_string().into()))
        .await
        .expect("send should succeed");
}

/// Receives the next JSON event, skipping non-text frames.
async fn recv_json(ws: &mut ClientWs) -> serde_json::Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for event")
            .expect("stream ended")
            .expect("websocket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).expect("event should be JSON");
        }
    }
}

/// Receives events until one with the given type tag arrives.
async fn recv_until(ws: &mut ClientWs, event_type: &str) -> serde_json::Value {
    loop {
        let event = recv_json(ws).await;
        if event["type"] == event_type {
            return event;
        }
    }
}

fn send_values(room: &serde_json::Value, attack: i32, defense: i32) -> serde_json::Value {
    serde_json::json!({
        "type": "sendValues",
        "roomId": room,
        "values": {
            "diceOne": attack,
            "diceTwo": defense,
            "special1": null,
            "special2": null,
        },
    })
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_host_and_join_starts_a_round() {
    let addr = start_server(EngineConfig::default()).await;
    let mut host = connect(&addr, "p1").await;
    let mut guest = connect(&addr, "p2").await;

    send_json(&mut host, serde_json::json!({"type": "hostRoom"})).await;
    let created = recv_json(&mut host).await;
    assert_eq!(created["type"], "roomCreated");
    let room = created["roomId"].clone();

    let count = recv_json(&mut host).await;
    assert_eq!(count["type"], "playerCountUpdate");
    assert_eq!(count["count"], 1);

    send_json(
        &mut guest,
        serde_json::json!({"type": "joinByCode", "roomId": room}),
    )
    .await;
    let joined = recv_json(&mut guest).await;
    assert_eq!(joined["type"], "joinedRoom");
    assert_eq!(joined["roomId"], room);

    // Both sides see the room fill and round 1 open.
    for ws in [&mut host, &mut guest] {
        let count = recv_json(ws).await;
        assert_eq!(count["type"], "playerCountUpdate");
        assert_eq!(count["count"], 2);
        let start = recv_json(ws).await;
        assert_eq!(start["type"], "roundStart");
        assert_eq!(start["roundNumber"], 1);
    }
}

#[tokio::test]
async fn test_quick_match_pairs_two_clients() {
    let addr = start_server(EngineConfig::default()).await;
    let mut first = connect(&addr, "qm-1").await;
    let mut second = connect(&addr, "qm-2").await;

    send_json(&mut first, serde_json::json!({"type": "joinRandom"})).await;
    let created = recv_json(&mut first).await;
    assert_eq!(created["type"], "roomCreated");
    let room = created["roomId"].clone();

    send_json(&mut second, serde_json::json!({"type": "joinRandom"})).await;
    let joined = recv_json(&mut second).await;
    assert_eq!(joined["type"], "joinedRoom");
    assert_eq!(joined["roomId"], room, "paired into the waiting room");

    let start = recv_until(&mut second, "roundStart").await;
    assert_eq!(start["roundNumber"], 1);
}

#[tokio::test]
async fn test_round_resolves_over_the_wire() {
    let addr = start_server(EngineConfig::default()).await;
    let mut one = connect(&addr, "w-1").await;
    let mut two = connect(&addr, "w-2").await;

    send_json(&mut one, serde_json::json!({"type": "hostRoom"})).await;
    let room = recv_json(&mut one).await["roomId"].clone();
    send_json(
        &mut two,
        serde_json::json!({"type": "joinByCode", "roomId": room}),
    )
    .await;
    recv_until(&mut one, "roundStart").await;
    recv_until(&mut two, "roundStart").await;

    // w-1 attacks 6 against defense 5; w-2 attacks 2 against defense 3.
    send_json(&mut one, send_values(&room, 6, 3)).await;
    send_json(&mut two, send_values(&room, 2, 5)).await;

    let result = recv_until(&mut one, "roundResult").await;
    assert_eq!(result["players"]["w-1"]["hp"], 10);
    assert_eq!(result["players"]["w-2"]["hp"], 9);
    assert!(result["players"]["w-1"]["diceOne"].is_null(), "dice cleared");

    let next = recv_json(&mut one).await;
    assert_eq!(next["type"], "roundStart");
    assert_eq!(next["roundNumber"], 2);
}

#[tokio::test]
async fn test_knockout_emits_end_game_and_reset() {
    // Short reset delay so the test observes the new match promptly.
    let config = EngineConfig {
        starting_hp: 5,
        match_reset_delay: Duration::from_millis(50),
    };
    let addr = start_server(config).await;
    let mut one = connect(&addr, "ko-1").await;
    let mut two = connect(&addr, "ko-2").await;

    send_json(&mut one, serde_json::json!({"type": "hostRoom"})).await;
    let room = recv_json(&mut one).await["roomId"].clone();
    send_json(
        &mut two,
        serde_json::json!({"type": "joinByCode", "roomId": room}),
    )
    .await;
    recv_until(&mut two, "roundStart").await;

    // 6 attack vs 1 defense lands 5 damage: one round ends the match.
    send_json(&mut one, send_values(&room, 6, 1)).await;
    send_json(&mut two, send_values(&room, 2, 1)).await;

    let end = recv_until(&mut two, "endGame").await;
    assert_eq!(end["results"]["ko-1"], "You win");
    assert_eq!(end["results"]["ko-2"], "You lose");
    assert_eq!(end["gameInfo"]["ko-2"]["hp"], 0);

    // The final snapshot follows, then the timed reset restores HP.
    let result = recv_json(&mut two).await;
    assert_eq!(result["type"], "roundResult");

    let reset = recv_until(&mut two, "gameReset").await;
    assert_eq!(reset["roundNumber"], 1);
    assert_eq!(reset["players"]["ko-2"]["hp"], 5);
    let start = recv_json(&mut two).await;
    assert_eq!(start["type"], "roundStart");
    assert_eq!(start["roundNumber"], 1);
}

#[tokio::test]
async fn test_disconnect_notifies_opponent() {
    let addr = start_server(EngineConfig::default()).await;
    let mut one = connect(&addr, "d-1").await;
    let mut two = connect(&addr, "d-2").await;

    send_json(&mut one, serde_json::json!({"type": "hostRoom"})).await;
    let room = recv_json(&mut one).await["roomId"].clone();
    send_json(
        &mut two,
        serde_json::json!({"type": "joinByCode", "roomId": room}),
    )
    .await;
    recv_until(&mut two, "roundStart").await;

    // d-1's socket drops without a leaveRoom.
    one.close(None).await.expect("close should succeed");

    let count = recv_until(&mut two, "playerCountUpdate").await;
    assert_eq!(count["count"], 1);
    let left = recv_json(&mut two).await;
    assert_eq!(left["type"], "opponentLeft");
    assert_eq!(left["roomId"], room);
}

#[tokio::test]
async fn test_leave_room_returns_to_lobby() {
    let addr = start_server(EngineConfig::default()).await;
    let mut one = connect(&addr, "l-1").await;

    send_json(&mut one, serde_json::json!({"type": "hostRoom"})).await;
    recv_until(&mut one, "playerCountUpdate").await;

    send_json(&mut one, serde_json::json!({"type": "leaveRoom"})).await;
    let back = recv_json(&mut one).await;
    assert_eq!(back["type"], "returnedToLobby");
}

#[tokio::test]
async fn test_undecodable_message_is_ignored() {
    let addr = start_server(EngineConfig::default()).await;
    let mut one = connect(&addr, "g-1").await;

    // Garbage first; the connection must survive and keep working.
    one.send(Message::Text("not json".into())).await.unwrap();
    one.send(Message::Text(r#"{"type": "castFireball"}"#.into()))
        .await
        .unwrap();

    send_json(&mut one, serde_json::json!({"type": "hostRoom"})).await;
    let created = recv_json(&mut one).await;
    assert_eq!(created["type"], "roomCreated");
}

#[tokio::test]
async fn test_dice_preview_syncs_to_opponent() {
    let addr = start_server(EngineConfig::default()).await;
    let mut one = connect(&addr, "pv-1").await;
    let mut two = connect(&addr, "pv-2").await;

    send_json(&mut one, serde_json::json!({"type": "hostRoom"})).await;
    let room = recv_json(&mut one).await["roomId"].clone();
    send_json(
        &mut two,
        serde_json::json!({"type": "joinByCode", "roomId": room}),
    )
    .await;
    recv_until(&mut one, "roundStart").await;

    send_json(
        &mut one,
        serde_json::json!({
            "type": "diceRolled",
            "roomId": room,
            "diceValueOne": 6,
        }),
    )
    .await;

    let update = recv_until(&mut two, "playerValuesUpdated").await;
    assert_eq!(update["players"]["pv-1"]["diceOne"], 6);
    assert_eq!(update["players"]["pv-1"]["hp"], 10);
}
