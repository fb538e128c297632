//! Adapter runtime integration
//!
//! Bridges the TCP server with the rules engine. A single match-loop task
//! owns the [`Match`] and applies the serialized command stream, so no two
//! actions ever mutate the match concurrently.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use tunnel_cat_core::{Match, MatchSnapshot};
use tunnel_cat_types::{PlayerAction, PlayerId};

use crate::protocol::{build_state, create_error};

/// Command delivered to the match loop
#[derive(Debug, Clone)]
pub struct InboundCommand {
    pub player_id: PlayerId,
    /// Client sequence number, echoed on rejection; 0 for connection events
    pub seq: u64,
    pub action: PlayerAction,
}

/// Outbound message to be delivered by the server
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClient { player_id: PlayerId, line: String },
    Broadcast { line: String },
}

/// Run the match loop until the command channel closes
///
/// Accepted actions produce a `state` broadcast carrying the loop's own
/// monotonic sequence number; rejections produce an `error` targeted at the
/// acting client only. The loop also exits when the outbound channel is
/// gone, meaning the server side has shut down.
pub async fn run_match_loop(
    mut match_state: Match,
    mut cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
) {
    let mut snapshot = MatchSnapshot::default();
    let mut broadcast_seq: u64 = 0;

    while let Some(cmd) = cmd_rx.recv().await {
        let was_over = match_state.is_over();
        match match_state.apply_action(cmd.player_id, cmd.action) {
            Ok(()) => {
                debug!(player = cmd.player_id, "action applied");
                if !was_over && match_state.is_over() {
                    info!(
                        outcome = ?match_state.outcome(),
                        status = match_state.status(),
                        "match ended"
                    );
                }

                broadcast_seq += 1;
                match_state.snapshot_into(&mut snapshot);
                let state = build_state(broadcast_seq, &snapshot);
                match serde_json::to_string(&state) {
                    Ok(line) => {
                        if out_tx.send(OutboundMessage::Broadcast { line }).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!(error = %e, "state serialization failed"),
                }
            }
            Err(err) => {
                debug!(player = cmd.player_id, error = %err, "action rejected");
                let error = create_error(cmd.seq, err.into(), &err.to_string());
                match serde_json::to_string(&error) {
                    Ok(line) => {
                        let targeted = OutboundMessage::ToClient {
                            player_id: cmd.player_id,
                            line,
                        };
                        if out_tx.send(targeted).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!(error = %e, "error serialization failed"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn join(player_id: PlayerId, name: &str) -> InboundCommand {
        InboundCommand {
            player_id,
            seq: 0,
            action: PlayerAction::Join {
                name: name.to_string(),
            },
        }
    }

    #[tokio::test]
    async fn accepted_action_broadcasts_state() {
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        let loop_handle = tokio::spawn(run_match_loop(Match::new(1), cmd_rx, out_tx));

        cmd_tx.send(join(1, "Alice")).await.unwrap();

        match out_rx.recv().await.expect("expected a broadcast") {
            OutboundMessage::Broadcast { line } => {
                let v: serde_json::Value = serde_json::from_str(&line).unwrap();
                assert_eq!(v["type"], "state");
                assert_eq!(v["seq"], 1);
                assert_eq!(v["players"][0]["name"], "Alice");
                assert_eq!(v["deck_remaining"], 47);
            }
            other => panic!("expected broadcast, got {:?}", other),
        }

        drop(cmd_tx);
        loop_handle.await.unwrap();
    }

    #[tokio::test]
    async fn rejected_action_targets_acting_client() {
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        let loop_handle = tokio::spawn(run_match_loop(Match::new(1), cmd_rx, out_tx));

        cmd_tx.send(join(1, "Alice")).await.unwrap();
        cmd_tx.send(join(2, "Bob")).await.unwrap();
        let _ = out_rx.recv().await;
        let _ = out_rx.recv().await;

        // Bob acts out of turn
        cmd_tx
            .send(InboundCommand {
                player_id: 2,
                seq: 5,
                action: PlayerAction::Draw,
            })
            .await
            .unwrap();

        match out_rx.recv().await.expect("expected an error") {
            OutboundMessage::ToClient { player_id, line } => {
                assert_eq!(player_id, 2);
                let v: serde_json::Value = serde_json::from_str(&line).unwrap();
                assert_eq!(v["type"], "error");
                assert_eq!(v["seq"], 5);
                assert_eq!(v["code"], "not_your_turn");
            }
            other => panic!("expected targeted error, got {:?}", other),
        }

        drop(cmd_tx);
        loop_handle.await.unwrap();
    }

    #[tokio::test]
    async fn loop_exits_when_commands_close() {
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(1);
        let (out_tx, _out_rx) = mpsc::unbounded_channel();
        let loop_handle = tokio::spawn(run_match_loop(Match::new(1), cmd_rx, out_tx));

        drop(cmd_tx);
        loop_handle.await.unwrap();
    }
}
