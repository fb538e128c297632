//! TCP server for the match adapter
//!
//! Handles incoming connections and manages client lifecycle. Each
//! connection is one player identity: the numeric id assigned at accept
//! time doubles as the engine's player id, and closing the socket turns
//! into a leave action. Uses tokio for async networking.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{info, warn};

use tunnel_cat_types::{PlayerAction, PlayerId, Rotation};

use crate::protocol::{
    create_error, create_welcome, parse_message, ErrorCode, GameCommand, ParsedMessage,
    PROTOCOL_VERSION,
};
use crate::runtime::{InboundCommand, OutboundMessage};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    /// Bound of the command channel into the match loop
    pub max_pending_commands: usize,
    /// Fixed match seed; `None` lets the binary derive one
    pub seed: Option<u32>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands: 64,
            seed: None,
        }
    }
}

impl ServerConfig {
    /// Create from `TUNNELCAT_*` environment variables
    ///
    /// Unset or unparseable values fall back to the defaults; a port of 0
    /// binds an ephemeral port.
    pub fn from_env() -> Self {
        use std::env;

        let host = env::var("TUNNELCAT_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("TUNNELCAT_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(7878);
        let max_pending_commands = env::var("TUNNELCAT_MAX_PENDING")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(64);
        let seed = env::var("TUNNELCAT_SEED")
            .ok()
            .and_then(|s| s.parse().ok());

        Self {
            host,
            port,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands,
            seed,
        }
    }
}

/// Shared server state
pub struct ServerState {
    config: ServerConfig,
    clients: Arc<RwLock<Vec<ClientHandle>>>,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            clients: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

/// Handle to a connected client
pub struct ClientHandle {
    pub id: PlayerId,
    pub addr: SocketAddr,
    pub joined: bool,
    pub last_seq: Option<u64>,
    /// Channel of serialized lines to this client's writer task
    pub tx: mpsc::UnboundedSender<String>,
}

async fn is_joined(state: &Arc<ServerState>, player_id: PlayerId) -> bool {
    let clients = state.clients.read().await;
    clients
        .iter()
        .find(|c| c.id == player_id)
        .map(|c| c.joined)
        .unwrap_or(false)
}

async fn check_and_update_seq(state: &Arc<ServerState>, player_id: PlayerId, seq: u64) -> bool {
    let mut clients = state.clients.write().await;
    let Some(client) = clients.iter_mut().find(|c| c.id == player_id) else {
        return true;
    };

    match client.last_seq {
        None => {
            client.last_seq = Some(seq);
            true
        }
        Some(prev) => {
            if seq <= prev {
                false
            } else {
                client.last_seq = Some(seq);
                true
            }
        }
    }
}

/// Best-effort `seq` recovery from a line that failed to parse
fn extract_seq_best_effort(raw: &str) -> Option<u64> {
    let after_key = raw.split_once("\"seq\"")?.1.trim_start();
    let after_colon = after_key.strip_prefix(':')?.trim_start();
    let end = after_colon
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(after_colon.len());
    if end == 0 {
        return None;
    }
    after_colon[..end].parse().ok()
}

/// Start the TCP server
///
/// Accepted client commands are fed into `command_tx`; everything the match
/// loop emits on the paired outbound channel is routed back to the sockets.
/// `ready_tx` reports the bound address, which matters when binding port 0.
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    let bound = listener.local_addr()?;
    info!(addr = %bound, "match server listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new(config));
    let mut player_id_counter: PlayerId = 0;

    // Outbound dispatcher
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                match msg {
                    OutboundMessage::ToClient { player_id, line } => {
                        let clients = state.clients.read().await;
                        if let Some(c) = clients.iter().find(|c| c.id == player_id) {
                            let _ = c.tx.send(line);
                        }
                    }
                    OutboundMessage::Broadcast { line } => {
                        let clients = state.clients.read().await;
                        for c in clients.iter() {
                            let _ = c.tx.send(line.clone());
                        }
                    }
                }
            }
        });
    }

    // Accept incoming connections
    loop {
        let (socket, addr) = listener.accept().await?;
        player_id_counter += 1;
        let player_id = player_id_counter;
        info!(player = player_id, %addr, "client connected");

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, addr, player_id, state, command_tx).await {
                warn!(player = player_id, error = %e, "client error");
            }
            info!(player = player_id, "client disconnected");
        });
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    player_id: PlayerId,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);

    // Channel of serialized lines to this client
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    {
        let mut clients = state.clients.write().await;
        clients.push(ClientHandle {
            id: player_id,
            addr,
            joined: false,
            last_seq: None,
            tx: tx.clone(),
        });
    }

    // Writer task: one message per line
    let write_task = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            if writer.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            if writer.write_all(b"\n").await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
    });

    // Handle incoming messages
    let mut line = String::new();
    let mut read_error = None;
    loop {
        line.clear();
        // A failed read (reset, invalid UTF-8) ends the session the same
        // way EOF does; the error resurfaces after cleanup
        let bytes_read = match reader.read_line(&mut line).await {
            Ok(n) => n,
            Err(e) => {
                read_error = Some(e);
                break;
            }
        };
        if bytes_read == 0 {
            // Client disconnected
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match parse_message(trimmed) {
            Ok(ParsedMessage::Join(join)) => {
                {
                    let mut clients = state.clients.write().await;
                    if let Some(client) = clients.iter_mut().find(|c| c.id == player_id) {
                        client.joined = true;
                    }
                }

                let welcome = create_welcome(player_id, &state.config.protocol_version);
                if let Ok(out) = serde_json::to_string(&welcome) {
                    let _ = tx.send(out);
                }

                // The engine seats the player and the loop broadcasts state
                let _ = command_tx
                    .send(InboundCommand {
                        player_id,
                        seq: 0,
                        action: PlayerAction::Join { name: join.name },
                    })
                    .await;
            }

            Ok(ParsedMessage::Command(cmd)) => {
                if !is_joined(&state, player_id).await {
                    send_error(&tx, cmd.seq, ErrorCode::JoinRequired, "Send join before command");
                    continue;
                }

                // Sequencing: enforce monotonic seq per sender
                if !check_and_update_seq(&state, player_id, cmd.seq).await {
                    send_error(
                        &tx,
                        cmd.seq,
                        ErrorCode::InvalidCommand,
                        "seq must be strictly increasing",
                    );
                    continue;
                }

                let inbound = InboundCommand {
                    player_id,
                    seq: cmd.seq,
                    action: map_command(cmd.play),
                };
                if command_tx.try_send(inbound).is_err() {
                    send_error(&tx, cmd.seq, ErrorCode::InvalidCommand, "Command queue is full");
                }
            }

            Ok(ParsedMessage::Unknown(unknown)) => {
                send_error(
                    &tx,
                    unknown.seq,
                    ErrorCode::InvalidCommand,
                    "Unknown message type",
                );
            }

            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                send_error(
                    &tx,
                    seq,
                    ErrorCode::InvalidCommand,
                    &format!("JSON parse error: {}", e),
                );
            }
        }
    }

    // Clean up: deregister, then hand the departure to the engine
    let was_joined = {
        let mut clients = state.clients.write().await;
        let was = clients.iter().any(|c| c.id == player_id && c.joined);
        clients.retain(|c| c.id != player_id);
        was
    };
    if was_joined {
        let _ = command_tx
            .send(InboundCommand {
                player_id,
                seq: 0,
                action: PlayerAction::Leave,
            })
            .await;
    }

    // Cancel write task
    drop(tx);
    let _ = write_task.await;

    match read_error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

fn send_error(tx: &mpsc::UnboundedSender<String>, seq: u64, code: ErrorCode, message: &str) {
    let error = create_error(seq, code, message);
    if let Ok(line) = serde_json::to_string(&error) {
        let _ = tx.send(line);
    }
}

/// Map a wire command onto an engine action
fn map_command(play: GameCommand) -> PlayerAction {
    match play {
        GameCommand::PlayTunnel {
            card,
            x,
            y,
            rotation,
        } => PlayerAction::PlayTunnel {
            hand_index: card,
            x,
            y,
            rotation: Rotation::from_quarter_turns(rotation),
        },
        GameCommand::PlayAction { card } => PlayerAction::PlayAction { hand_index: card },
        GameCommand::Draw => PlayerAction::Draw,
        GameCommand::Restart => PlayerAction::Restart,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 7878);
        assert_eq!(config.max_pending_commands, 64);
        assert_eq!(config.seed, None);
        assert_eq!(config.protocol_version, PROTOCOL_VERSION);
    }

    #[test]
    fn test_server_config_from_env() {
        // This test just ensures it doesn't panic
        let _config = ServerConfig::from_env();
    }

    #[test]
    fn test_map_command() {
        assert_eq!(
            map_command(GameCommand::PlayTunnel {
                card: 2,
                x: 0,
                y: -1,
                rotation: 1,
            }),
            PlayerAction::PlayTunnel {
                hand_index: 2,
                x: 0,
                y: -1,
                rotation: Rotation::R90,
            }
        );
        assert_eq!(
            map_command(GameCommand::PlayAction { card: 0 }),
            PlayerAction::PlayAction { hand_index: 0 }
        );
        assert_eq!(map_command(GameCommand::Draw), PlayerAction::Draw);
        assert_eq!(map_command(GameCommand::Restart), PlayerAction::Restart);
    }

    #[test]
    fn test_extract_seq_best_effort() {
        assert_eq!(extract_seq_best_effort(r#"{"seq": 12, "type":}"#), Some(12));
        assert_eq!(extract_seq_best_effort(r#"{"seq":3"#), Some(3));
        assert_eq!(extract_seq_best_effort(r#"{"type":"command"}"#), None);
        assert_eq!(extract_seq_best_effort(r#"{"seq":"oops"}"#), None);
    }
}
