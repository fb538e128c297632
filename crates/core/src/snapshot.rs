//! Public match state emitted after every accepted action
//!
//! Plain data, no serialization; the transport adapter maps this onto its
//! wire format. Hands are visible for every player by design; the snapshot
//! is not a secrecy boundary.

use tunnel_cat_types::{Outcome, PlayerId};

use crate::board::PlacedTile;
use crate::deck::Card;

/// One placed tile with its board position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedTileView {
    pub x: i32,
    pub y: i32,
    pub tile: PlacedTile,
}

/// One player's public entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub hand: Vec<Card>,
}

/// Full public state of the match
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSnapshot {
    /// Placed tiles sorted by `(x, y)` for stable output
    pub tiles: Vec<PlacedTileView>,
    /// Players in turn order
    pub players: Vec<PlayerView>,
    /// Whose turn it is, when anyone has joined
    pub current_player: Option<PlayerId>,
    pub deck_remaining: usize,
    pub open_exits: u32,
    pub status: String,
    pub over: bool,
    pub outcome: Option<Outcome>,
    /// Seed the match RNG started from, for deterministic replays
    pub seed: u32,
}

impl MatchSnapshot {
    /// Reset to the empty state, keeping allocations for reuse
    pub fn clear(&mut self) {
        self.tiles.clear();
        self.players.clear();
        self.current_player = None;
        self.deck_remaining = 0;
        self.open_exits = 0;
        self.status.clear();
        self.over = false;
        self.outcome = None;
        self.seed = 0;
    }
}
