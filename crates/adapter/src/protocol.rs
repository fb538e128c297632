//! Protocol module - JSON message types for the match server
//!
//! Implements the line-delimited JSON protocol: one message object per line
//! over TCP. Client messages are tagged by `type` (`join`, `command`);
//! server messages (`welcome`, `state`, `error`) additionally carry `seq`
//! and `ts` (timestamp in ms).
//!
//! The core crate stays serde-free, so this module mirrors its public
//! vocabulary in dedicated wire types and converts at the boundary.

use serde::{Deserialize, Serialize};

use tunnel_cat_core::{ActionError, Card, CardKind, MatchSnapshot};
use tunnel_cat_types::{ActionKind, Edges, Outcome, PlayerId, ShapeKind, TileId};

/// Version talked on the wire, checked by nothing yet but reported in
/// `welcome` so clients can log a mismatch
pub const PROTOCOL_VERSION: &str = "1.0.0";

// ============== Client -> Server Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinType {
    #[serde(rename = "join")]
    Join,
}

impl Default for JoinType {
    fn default() -> Self {
        Self::Join
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandType {
    #[serde(rename = "command")]
    Command,
}

impl Default for CommandType {
    fn default() -> Self {
        Self::Command
    }
}

/// Join message (first message on a connection)
///
/// A missing or empty `name` gets a default assigned by the rules engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: JoinType,
    #[serde(default)]
    pub name: String,
}

/// Command message (joined clients only)
///
/// `seq` must be strictly increasing per connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: CommandType,
    pub seq: u64,
    pub play: GameCommand,
}

/// The game command a `command` message carries
///
/// `card` is an index into the acting player's hand. `rotation` counts
/// clockwise quarter turns; values of 4 and above wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GameCommand {
    PlayTunnel {
        card: usize,
        x: i32,
        y: i32,
        #[serde(default)]
        rotation: u8,
    },
    PlayAction {
        card: usize,
    },
    Draw,
    Restart,
}

// ============== Server -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WelcomeType {
    #[serde(rename = "welcome")]
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateType {
    #[serde(rename = "state")]
    State,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "invalid_placement")]
    InvalidPlacement,
    #[serde(rename = "not_your_turn")]
    NotYourTurn,
    #[serde(rename = "match_over")]
    MatchOver,
    #[serde(rename = "unknown_player")]
    UnknownPlayer,
    #[serde(rename = "invalid_card")]
    InvalidCard,
    #[serde(rename = "join_required")]
    JoinRequired,
    #[serde(rename = "invalid_command")]
    InvalidCommand,
}

impl From<ActionError> for ErrorCode {
    fn from(err: ActionError) -> Self {
        match err {
            ActionError::IllegalPlacement => ErrorCode::InvalidPlacement,
            ActionError::NotYourTurn => ErrorCode::NotYourTurn,
            ActionError::MatchOver => ErrorCode::MatchOver,
            ActionError::UnknownPlayer => ErrorCode::UnknownPlayer,
            ActionError::NoSuchCard | ActionError::WrongCardKind => ErrorCode::InvalidCard,
        }
    }
}

/// Welcome message (response to join)
///
/// The first message a connection ever receives, hence the fixed `seq` of 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    pub player_id: PlayerId,
    pub protocol_version: String,
}

/// Error message (targeted at the offending client, never broadcast)
///
/// `seq` echoes the rejected command's sequence number, 0 when unknown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

/// Full match state (broadcast to every client after each accepted action)
///
/// `seq` is the match loop's own monotonic broadcast counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateMessage {
    #[serde(rename = "type")]
    pub msg_type: StateType,
    pub seq: u64,
    pub ts: u64,
    pub tiles: Vec<WireTile>,
    pub players: Vec<WirePlayer>,
    pub current_player: Option<PlayerId>,
    pub deck_remaining: u32,
    pub open_exits: u32,
    pub status: String,
    pub over: bool,
    pub outcome: Option<WireOutcome>,
    pub seed: u32,
}

/// One placed tile on the wire
///
/// `rotation` is the recorded placement rotation in clockwise quarter turns;
/// `edges` are already rotated into board orientation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireTile {
    pub id: TileId,
    pub shape: WireShape,
    pub x: i32,
    pub y: i32,
    pub rotation: u8,
    pub edges: WireEdges,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WirePlayer {
    pub id: PlayerId,
    pub name: String,
    pub hand: Vec<WireCard>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WireCard {
    Tunnel {
        id: TileId,
        shape: WireShape,
        edges: WireEdges,
    },
    Action {
        id: TileId,
        action: WireActionCard,
    },
}

impl From<Card> for WireCard {
    fn from(card: Card) -> Self {
        match card.kind {
            CardKind::Tunnel { shape, edges } => WireCard::Tunnel {
                id: card.id,
                shape: shape.into(),
                edges: edges.into(),
            },
            CardKind::Action(kind) => WireCard::Action {
                id: card.id,
                action: kind.into(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireEdges {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl From<Edges> for WireEdges {
    fn from(edges: Edges) -> Self {
        WireEdges {
            top: edges.top,
            right: edges.right,
            bottom: edges.bottom,
            left: edges.left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireShape {
    #[serde(rename = "turn")]
    Turn,
    #[serde(rename = "cross")]
    Cross,
    #[serde(rename = "t-shape")]
    Tee,
    #[serde(rename = "line")]
    Line,
    #[serde(rename = "block")]
    Block,
    #[serde(rename = "house")]
    House,
    #[serde(rename = "start-block")]
    StartBlock,
}

impl From<ShapeKind> for WireShape {
    fn from(shape: ShapeKind) -> Self {
        match shape {
            ShapeKind::Turn => Self::Turn,
            ShapeKind::Cross => Self::Cross,
            ShapeKind::Tee => Self::Tee,
            ShapeKind::Line => Self::Line,
            ShapeKind::Block => Self::Block,
            ShapeKind::House => Self::House,
            ShapeKind::StartBlock => Self::StartBlock,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireActionCard {
    #[serde(rename = "cat_startled")]
    CatStartled,
    #[serde(rename = "cat_plays")]
    CatPlays,
    #[serde(rename = "cat_licked")]
    CatLicked,
    #[serde(rename = "cat_sleeps")]
    CatSleeps,
}

impl From<ActionKind> for WireActionCard {
    fn from(kind: ActionKind) -> Self {
        match kind {
            ActionKind::CatStartled => Self::CatStartled,
            ActionKind::CatPlays => Self::CatPlays,
            ActionKind::CatLicked => Self::CatLicked,
            ActionKind::CatSleeps => Self::CatSleeps,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireOutcome {
    #[serde(rename = "cat_caught")]
    CatCaught,
    #[serde(rename = "cat_escaped")]
    CatEscaped,
}

impl From<Outcome> for WireOutcome {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::CatCaught => Self::CatCaught,
            Outcome::CatEscaped => Self::CatEscaped,
        }
    }
}

// ============== Message Parsing ==============

/// Parse a JSON message from a string
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type")]
    enum InboundMessage {
        #[serde(rename = "join")]
        Join(JoinMessage),
        #[serde(rename = "command")]
        Command(CommandMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Join(m)) => Ok(ParsedMessage::Join(m)),
        Ok(InboundMessage::Command(m)) => Ok(ParsedMessage::Command(m)),
        Err(e) => {
            // An unrecognized message type is not a hard parse error
            #[derive(Debug, Deserialize)]
            struct TypeOnly<'a> {
                #[serde(rename = "type")]
                msg_type: Option<&'a str>,
            }
            let msg_type = serde_json::from_str::<TypeOnly>(json)?
                .msg_type
                .unwrap_or("unknown");
            if msg_type != "join" && msg_type != "command" {
                #[derive(Debug, Deserialize)]
                struct SeqOnly {
                    seq: Option<u64>,
                }
                let seq = serde_json::from_str::<SeqOnly>(json)?.seq.unwrap_or(0);
                return Ok(ParsedMessage::Unknown(UnknownMessage { seq }));
            }
            Err(e)
        }
    }
}

/// Parsed incoming message
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Join(JoinMessage),
    Command(CommandMessage),
    Unknown(UnknownMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMessage {
    pub seq: u64,
}

// ============== Utility Functions ==============

/// Create a join message (client side)
pub fn create_join(name: &str) -> JoinMessage {
    JoinMessage {
        msg_type: JoinType::Join,
        name: name.to_string(),
    }
}

/// Create a command message (client side)
pub fn create_command(seq: u64, play: GameCommand) -> CommandMessage {
    CommandMessage {
        msg_type: CommandType::Command,
        seq,
        play,
    }
}

/// Create a welcome message
pub fn create_welcome(player_id: PlayerId, protocol_version: &str) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq: 0,
        ts: current_timestamp_ms(),
        player_id,
        protocol_version: protocol_version.to_string(),
    }
}

/// Create an error message
pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

/// Build a state broadcast from an engine snapshot
pub fn build_state(seq: u64, snapshot: &MatchSnapshot) -> StateMessage {
    let tiles = snapshot
        .tiles
        .iter()
        .map(|view| WireTile {
            id: view.tile.id,
            shape: view.tile.shape.into(),
            x: view.x,
            y: view.y,
            rotation: view.tile.rotation.quarter_turns(),
            edges: view.tile.edges.into(),
        })
        .collect();

    let players = snapshot
        .players
        .iter()
        .map(|player| WirePlayer {
            id: player.id,
            name: player.name.clone(),
            hand: player.hand.iter().copied().map(WireCard::from).collect(),
        })
        .collect();

    StateMessage {
        msg_type: StateType::State,
        seq,
        ts: current_timestamp_ms(),
        tiles,
        players,
        current_player: snapshot.current_player,
        deck_remaining: snapshot.deck_remaining as u32,
        open_exits: snapshot.open_exits,
        status: snapshot.status.clone(),
        over: snapshot.over,
        outcome: snapshot.outcome.map(WireOutcome::from),
        seed: snapshot.seed,
    }
}

/// Get current timestamp in milliseconds
pub(crate) fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
