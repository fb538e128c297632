//! End-to-end adapter tests: real sockets, real match loop
//!
//! Each test boots the full stack (TCP server plus the match-loop task)
//! on an ephemeral port and drives it the way a network client would,
//! asserting on the raw JSON lines that come back.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use tunnel_cat::adapter::protocol::create_join;
use tunnel_cat::adapter::{
    run_match_loop, run_server, InboundCommand, OutboundMessage, ServerConfig,
};
use tunnel_cat::core::Match;

type LineReader = Lines<BufReader<OwnedReadHalf>>;

async fn spawn_stack(seed: u32) -> (SocketAddr, JoinHandle<()>, JoinHandle<()>) {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        protocol_version: "1.0.0".to_string(),
        max_pending_commands: 8,
        seed: None,
    };

    let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(8);
    let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
    let (ready_tx, ready_rx) = oneshot::channel();

    let match_handle = tokio::spawn(run_match_loop(Match::new(seed), cmd_rx, out_tx));
    let server_handle = tokio::spawn(async move {
        let _ = run_server(config, cmd_tx, out_rx, Some(ready_tx)).await;
    });

    let addr = tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .expect("server did not signal ready")
        .expect("ready channel dropped");

    (addr, server_handle, match_handle)
}

async fn connect(addr: SocketAddr) -> (LineReader, OwnedWriteHalf) {
    let stream = TcpStream::connect(addr).await.expect("connect failed");
    let (read_half, write_half) = stream.into_split();
    (BufReader::new(read_half).lines(), write_half)
}

async fn send_line(write_half: &mut OwnedWriteHalf, line: &str) {
    write_half.write_all(line.as_bytes()).await.unwrap();
    write_half.write_all(b"\n").await.unwrap();
    write_half.flush().await.unwrap();
}

async fn join_as(write_half: &mut OwnedWriteHalf, name: &str) {
    let join = serde_json::to_string(&create_join(name)).unwrap();
    send_line(write_half, &join).await;
}

async fn read_json(lines: &mut LineReader) -> serde_json::Value {
    let line = tokio::time::timeout(Duration::from_secs(2), lines.next_line())
        .await
        .expect("timed out waiting for a line")
        .unwrap()
        .expect("connection closed early");
    serde_json::from_str(&line).unwrap()
}

fn tunnel_card_index(state: &serde_json::Value, player: usize) -> Option<usize> {
    state["players"][player]["hand"]
        .as_array()
        .expect("state carries hands")
        .iter()
        .position(|card| card["kind"] == "tunnel")
}

#[tokio::test]
async fn adapter_join_welcome_and_state_flow() {
    let (addr, server, match_loop) = spawn_stack(7).await;
    let (mut lines, mut write_half) = connect(addr).await;

    join_as(&mut write_half, "Alice").await;

    let welcome = read_json(&mut lines).await;
    assert_eq!(welcome["type"], "welcome");
    assert_eq!(welcome["seq"], 0);
    assert_eq!(welcome["player_id"], 1);
    assert_eq!(welcome["protocol_version"], "1.0.0");

    let state = read_json(&mut lines).await;
    assert_eq!(state["type"], "state");
    assert_eq!(state["seq"], 1);
    assert_eq!(state["players"][0]["name"], "Alice");
    assert_eq!(state["players"][0]["hand"].as_array().unwrap().len(), 3);
    assert_eq!(state["current_player"], 1);
    assert_eq!(state["deck_remaining"], 47);
    assert_eq!(state["open_exits"], 2);
    assert_eq!(state["tiles"].as_array().unwrap().len(), 3);
    assert_eq!(state["over"], false);
    assert_eq!(state["outcome"], serde_json::Value::Null);

    server.abort();
    match_loop.abort();
}

#[tokio::test]
async fn adapter_broadcasts_state_to_every_client() {
    let (addr, server, match_loop) = spawn_stack(7).await;

    let (mut lines1, mut write1) = connect(addr).await;
    join_as(&mut write1, "Alice").await;
    let _welcome = read_json(&mut lines1).await;
    let _state = read_json(&mut lines1).await;

    let (mut lines2, mut write2) = connect(addr).await;
    join_as(&mut write2, "Bob").await;
    let welcome = read_json(&mut lines2).await;
    assert_eq!(welcome["player_id"], 2);

    // Both connections see Bob's join
    let state_for_1 = read_json(&mut lines1).await;
    let state_for_2 = read_json(&mut lines2).await;
    for state in [&state_for_1, &state_for_2] {
        assert_eq!(state["type"], "state");
        assert_eq!(state["players"].as_array().unwrap().len(), 2);
        assert_eq!(state["deck_remaining"], 44);
        // Bob joining does not steal Alice's turn
        assert_eq!(state["current_player"], 1);
    }

    server.abort();
    match_loop.abort();
}

#[tokio::test]
async fn adapter_drives_a_placement_through_the_wire() {
    let (addr, server, match_loop) = spawn_stack(42).await;
    let (mut lines, mut write_half) = connect(addr).await;

    join_as(&mut write_half, "Alice").await;
    let _welcome = read_json(&mut lines).await;
    let mut state = read_json(&mut lines).await;

    // Draw until the hand holds a tunnel card; alone at the table the
    // turn never leaves us
    let mut seq = 1u64;
    let card = loop {
        if let Some(index) = tunnel_card_index(&state, 0) {
            break index;
        }
        let draw = format!(r#"{{"type":"command","seq":{seq},"play":{{"kind":"draw"}}}}"#);
        send_line(&mut write_half, &draw).await;
        state = read_json(&mut lines).await;
        assert_eq!(state["type"], "state");
        seq += 1;
        assert!(seq < 20, "no tunnel card surfaced after many draws");
    };

    let hand_before = state["players"][0]["hand"].as_array().unwrap().len();

    // Above the house only the house's open top is adjacent, so any
    // tunnel tile fits there
    let play = format!(
        r#"{{"type":"command","seq":{seq},"play":{{"kind":"playTunnel","card":{card},"x":0,"y":-1,"rotation":0}}}}"#
    );
    send_line(&mut write_half, &play).await;

    let after = read_json(&mut lines).await;
    assert_eq!(after["type"], "state");
    assert_eq!(after["tiles"].as_array().unwrap().len(), 4);
    // One card left the hand and a replacement was drawn
    assert_eq!(
        after["players"][0]["hand"].as_array().unwrap().len(),
        hand_before
    );

    server.abort();
    match_loop.abort();
}

#[tokio::test]
async fn adapter_targets_errors_at_the_offender() {
    let (addr, server, match_loop) = spawn_stack(7).await;

    let (mut lines1, mut write1) = connect(addr).await;
    join_as(&mut write1, "Alice").await;
    let _welcome = read_json(&mut lines1).await;
    let _state = read_json(&mut lines1).await;

    let (mut lines2, mut write2) = connect(addr).await;
    join_as(&mut write2, "Bob").await;
    let _welcome = read_json(&mut lines2).await;
    let _state_for_1 = read_json(&mut lines1).await;
    let _state_for_2 = read_json(&mut lines2).await;

    // Bob draws out of turn and is told so privately
    send_line(&mut write2, r#"{"type":"command","seq":1,"play":{"kind":"draw"}}"#).await;
    let error = read_json(&mut lines2).await;
    assert_eq!(error["type"], "error");
    assert_eq!(error["code"], "not_your_turn");
    assert_eq!(error["seq"], 1);

    // Alice never saw the rejection: her next message is the state from
    // her own legal draw
    send_line(&mut write1, r#"{"type":"command","seq":1,"play":{"kind":"draw"}}"#).await;
    let state = read_json(&mut lines1).await;
    assert_eq!(state["type"], "state");
    assert_eq!(state["current_player"], 2);

    server.abort();
    match_loop.abort();
}

#[tokio::test]
async fn adapter_rejects_stale_sequence_numbers() {
    let (addr, server, match_loop) = spawn_stack(7).await;
    let (mut lines, mut write_half) = connect(addr).await;

    join_as(&mut write_half, "Alice").await;
    let _welcome = read_json(&mut lines).await;
    let _state = read_json(&mut lines).await;

    send_line(&mut write_half, r#"{"type":"command","seq":5,"play":{"kind":"draw"}}"#).await;
    let state = read_json(&mut lines).await;
    assert_eq!(state["type"], "state");

    // Replaying seq 5 is rejected before it reaches the match
    send_line(&mut write_half, r#"{"type":"command","seq":5,"play":{"kind":"draw"}}"#).await;
    let error = read_json(&mut lines).await;
    assert_eq!(error["type"], "error");
    assert_eq!(error["code"], "invalid_command");
    assert_eq!(error["seq"], 5);

    // Moving past the stale number recovers the stream
    send_line(&mut write_half, r#"{"type":"command","seq":6,"play":{"kind":"draw"}}"#).await;
    let recovered = read_json(&mut lines).await;
    assert_eq!(recovered["type"], "state");

    server.abort();
    match_loop.abort();
}

#[tokio::test]
async fn adapter_requires_join_and_valid_json() {
    let (addr, server, match_loop) = spawn_stack(7).await;
    let (mut lines, mut write_half) = connect(addr).await;

    // Commands before join are turned away
    send_line(&mut write_half, r#"{"type":"command","seq":1,"play":{"kind":"draw"}}"#).await;
    let error = read_json(&mut lines).await;
    assert_eq!(error["type"], "error");
    assert_eq!(error["code"], "join_required");
    assert_eq!(error["seq"], 1);

    // Unknown message types and broken JSON get invalid_command
    send_line(&mut write_half, r#"{"type":"bogus","seq":9}"#).await;
    let unknown = read_json(&mut lines).await;
    assert_eq!(unknown["code"], "invalid_command");
    assert_eq!(unknown["seq"], 9);

    send_line(&mut write_half, "this is not json").await;
    let garbage = read_json(&mut lines).await;
    assert_eq!(garbage["code"], "invalid_command");
    assert_eq!(garbage["seq"], 0);

    // The connection is still usable afterwards
    join_as(&mut write_half, "Alice").await;
    let welcome = read_json(&mut lines).await;
    assert_eq!(welcome["type"], "welcome");

    server.abort();
    match_loop.abort();
}

#[tokio::test]
async fn adapter_turns_disconnect_into_leave() {
    let (addr, server, match_loop) = spawn_stack(7).await;

    let (mut lines1, mut write1) = connect(addr).await;
    join_as(&mut write1, "Alice").await;
    let _welcome = read_json(&mut lines1).await;
    let _state = read_json(&mut lines1).await;

    let (lines2, mut write2) = connect(addr).await;
    join_as(&mut write2, "Bob").await;
    let _state_with_bob = read_json(&mut lines1).await;

    // Dropping Bob's socket counts as leaving the match
    drop(lines2);
    drop(write2);

    let state = read_json(&mut lines1).await;
    assert_eq!(state["type"], "state");
    assert_eq!(state["players"].as_array().unwrap().len(), 1);
    assert_eq!(state["players"][0]["name"], "Alice");

    server.abort();
    match_loop.abort();
}

#[tokio::test]
async fn adapter_turns_read_errors_into_leave() {
    let (addr, server, match_loop) = spawn_stack(7).await;

    let (mut lines1, mut write1) = connect(addr).await;
    join_as(&mut write1, "Alice").await;
    let _welcome = read_json(&mut lines1).await;
    let _state = read_json(&mut lines1).await;

    // Bob's read half stays open the whole time, so only the bad line
    // can be what removes him
    let (_lines2, mut write2) = connect(addr).await;
    join_as(&mut write2, "Bob").await;
    let _state_with_bob = read_json(&mut lines1).await;

    // A line of invalid UTF-8 fails the server-side read; that counts
    // as leaving too
    write2.write_all(&[0xff, 0xfe, b'\n']).await.unwrap();
    write2.flush().await.unwrap();

    let state = read_json(&mut lines1).await;
    assert_eq!(state["type"], "state");
    assert_eq!(state["players"].as_array().unwrap().len(), 1);
    assert_eq!(state["players"][0]["name"], "Alice");

    // Bob's slot left the rotation with him; Alice's draw wraps back
    // to her instead of stalling on a vacant seat
    send_line(&mut write1, r#"{"type":"command","seq":1,"play":{"kind":"draw"}}"#).await;
    let after = read_json(&mut lines1).await;
    assert_eq!(after["type"], "state");
    assert_eq!(after["current_player"], 1);

    server.abort();
    match_loop.abort();
}

#[tokio::test]
async fn adapter_rejects_commands_when_the_queue_is_full() {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        protocol_version: "1.0.0".to_string(),
        max_pending_commands: 1,
        seed: None,
    };

    // No match loop: the single-slot command queue fills on join and
    // never drains
    let (cmd_tx, _cmd_rx) = mpsc::channel::<InboundCommand>(1);
    let (_out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
    let (ready_tx, ready_rx) = oneshot::channel();
    let server = tokio::spawn(async move {
        let _ = run_server(config, cmd_tx, out_rx, Some(ready_tx)).await;
    });
    let addr = tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .expect("server did not signal ready")
        .expect("ready channel dropped");

    let (mut lines, mut write_half) = connect(addr).await;
    join_as(&mut write_half, "Alice").await;
    let welcome = read_json(&mut lines).await;
    assert_eq!(welcome["type"], "welcome");

    // The join occupies the only slot, so the next command overflows
    send_line(&mut write_half, r#"{"type":"command","seq":1,"play":{"kind":"draw"}}"#).await;
    let error = read_json(&mut lines).await;
    assert_eq!(error["type"], "error");
    assert_eq!(error["code"], "invalid_command");
    assert_eq!(error["seq"], 1);
    assert_eq!(error["message"], "Command queue is full");

    server.abort();
}
