//! The match aggregate: roster, turns, action dispatch, win detection
//!
//! A [`Match`] owns everything a single game needs: the board, the shared
//! deck, the player roster with turn order, and the RNG every random
//! decision flows through. All mutation goes through
//! [`Match::apply_action`]; external code never writes fields directly.
//!
//! Each action is an atomic transaction: validation happens first, and a
//! rejected action leaves the match exactly as it was. The caller is
//! expected to feed actions one at a time from a single serialized stream.

use std::collections::HashMap;
use std::fmt;

use tunnel_cat_types::{
    ActionKind, Outcome, PlayerAction, PlayerId, Rotation, STARTING_HAND_SIZE,
};

use crate::board::{Board, Coord, PlacedTile};
use crate::deck::{Card, CardKind, Deck};
use crate::rng::GameRng;
use crate::snapshot::{MatchSnapshot, PlacedTileView, PlayerView};
use crate::tiles;

/// Why an action was rejected
///
/// Rejection never mutates match state; every error is recoverable by the
/// acting player retrying with corrected input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionError {
    /// The tile cannot go there: cell occupied, no neighbor, or an open
    /// mouth would run into a wall
    IllegalPlacement,
    /// The acting identity never joined this match
    UnknownPlayer,
    /// Another player holds the turn
    NotYourTurn,
    /// The match is over; only restart (or join/leave) is accepted
    MatchOver,
    /// Hand index out of range
    NoSuchCard,
    /// The indexed card is the wrong category for this action
    WrongCardKind,
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            ActionError::IllegalPlacement => "this tile cannot be placed there",
            ActionError::UnknownPlayer => "player has not joined the match",
            ActionError::NotYourTurn => "it is not this player's turn",
            ActionError::MatchOver => "the match is already over",
            ActionError::NoSuchCard => "no card at that hand index",
            ActionError::WrongCardKind => "wrong card kind for this action",
        };
        f.write_str(message)
    }
}

impl std::error::Error for ActionError {}

/// A joined player and their hand
#[derive(Debug, Clone)]
pub struct Player {
    id: PlayerId,
    name: String,
    hand: Vec<Card>,
}

impl Player {
    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hand(&self) -> &[Card] {
        &self.hand
    }
}

/// The single authoritative match
#[derive(Debug, Clone)]
pub struct Match {
    board: Board,
    deck: Deck,
    players: HashMap<PlayerId, Player>,
    turn_order: Vec<PlayerId>,
    current_turn: usize,
    over: bool,
    outcome: Option<Outcome>,
    status: String,
    rng: GameRng,
    seed: u32,
}

impl Match {
    /// Fresh match: seeded board, generated deck, empty roster
    pub fn new(seed: u32) -> Self {
        let mut rng = GameRng::new(seed);
        let deck = Deck::generate(&mut rng);
        Match {
            board: Board::new(),
            deck,
            players: HashMap::new(),
            turn_order: Vec::new(),
            current_turn: 0,
            over: false,
            outcome: None,
            status: String::from("Waiting for players..."),
            rng,
            seed,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn deck_remaining(&self) -> usize {
        self.deck.remaining()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Whose turn it is, when anyone has joined
    pub fn current_player(&self) -> Option<PlayerId> {
        self.turn_order.get(self.current_turn).copied()
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Player ids in join order
    pub fn turn_order(&self) -> &[PlayerId] {
        &self.turn_order
    }

    /// Apply one player action
    ///
    /// The single entry point for all mutation. Validation happens before
    /// any state change, so an `Err` means the match is untouched and the
    /// error concerns only the acting player. Join and leave are accepted
    /// at any time; restart additionally bypasses the turn check and the
    /// terminal freeze.
    pub fn apply_action(
        &mut self,
        player: PlayerId,
        action: PlayerAction,
    ) -> Result<(), ActionError> {
        match action {
            PlayerAction::Join { name } => {
                self.join(player, name);
                Ok(())
            }
            PlayerAction::Leave => {
                self.leave(player);
                Ok(())
            }
            PlayerAction::Restart => self.restart(player),
            PlayerAction::PlayTunnel {
                hand_index,
                x,
                y,
                rotation,
            } => self.play_tunnel(player, hand_index, x, y, rotation),
            PlayerAction::PlayAction { hand_index } => self.play_action_card(player, hand_index),
            PlayerAction::Draw => self.draw_and_pass(player),
        }
    }

    /// Build the public snapshot into a reusable buffer
    pub fn snapshot_into(&self, out: &mut MatchSnapshot) {
        out.clear();
        for (at, tile) in self.board.iter() {
            out.tiles.push(PlacedTileView {
                x: at.0,
                y: at.1,
                tile: *tile,
            });
        }
        out.tiles.sort_unstable_by_key(|view| (view.x, view.y));
        for id in &self.turn_order {
            if let Some(player) = self.players.get(id) {
                out.players.push(PlayerView {
                    id: player.id,
                    name: player.name.clone(),
                    hand: player.hand.clone(),
                });
            }
        }
        out.current_player = self.current_player();
        out.deck_remaining = self.deck.remaining();
        out.open_exits = self.board.open_exit_count();
        out.status.push_str(&self.status);
        out.over = self.over;
        out.outcome = self.outcome;
        out.seed = self.seed;
    }

    /// Build a fresh public snapshot
    pub fn snapshot(&self) -> MatchSnapshot {
        let mut out = MatchSnapshot::default();
        self.snapshot_into(&mut out);
        out
    }

    fn join(&mut self, id: PlayerId, name: String) {
        // Re-joining is a no-op; the caller still gets a fresh snapshot
        if self.players.contains_key(&id) {
            return;
        }
        let name = if name.is_empty() {
            String::from("Player")
        } else {
            name
        };
        let hand = self.deck.draw(STARTING_HAND_SIZE);
        self.players.insert(id, Player { id, name, hand });
        self.turn_order.push(id);
    }

    fn leave(&mut self, id: PlayerId) {
        if self.players.remove(&id).is_none() {
            return;
        }
        self.turn_order.retain(|entry| *entry != id);
        // If the pointer fell off the end, the rotation restarts at the
        // head of the order. This can hand the turn to a player unrelated
        // to the leaver; long-standing behavior, kept deliberately.
        if self.current_turn >= self.turn_order.len() {
            self.current_turn = 0;
        }
    }

    fn restart(&mut self, id: PlayerId) -> Result<(), ActionError> {
        if !self.players.contains_key(&id) {
            return Err(ActionError::UnknownPlayer);
        }
        self.board = Board::new();
        self.deck = Deck::generate(&mut self.rng);
        self.over = false;
        self.outcome = None;
        // Fresh hands for everyone, dealt in turn order; the order itself
        // and the turn pointer survive the restart
        let order: Vec<PlayerId> = self.turn_order.clone();
        for player_id in order {
            let hand = self.deck.draw(STARTING_HAND_SIZE);
            if let Some(player) = self.players.get_mut(&player_id) {
                player.hand = hand;
            }
        }
        self.status = String::from("A new game has begun!");
        Ok(())
    }

    fn require_turn(&self, id: PlayerId) -> Result<(), ActionError> {
        if !self.players.contains_key(&id) {
            return Err(ActionError::UnknownPlayer);
        }
        if self.over {
            return Err(ActionError::MatchOver);
        }
        match self.current_player() {
            Some(current) if current == id => Ok(()),
            _ => Err(ActionError::NotYourTurn),
        }
    }

    fn play_tunnel(
        &mut self,
        id: PlayerId,
        hand_index: usize,
        x: i32,
        y: i32,
        rotation: Rotation,
    ) -> Result<(), ActionError> {
        self.require_turn(id)?;
        let (card_id, shape, edges) = {
            let player = self.players.get(&id).ok_or(ActionError::UnknownPlayer)?;
            let card = player.hand.get(hand_index).ok_or(ActionError::NoSuchCard)?;
            match card.kind {
                CardKind::Tunnel { shape, edges } => (card.id, shape, edges),
                CardKind::Action(_) => return Err(ActionError::WrongCardKind),
            }
        };
        let placed_edges = tiles::rotate_edges(edges, rotation);
        if !self.board.can_place(placed_edges, (x, y)) {
            return Err(ActionError::IllegalPlacement);
        }
        if let Some(player) = self.players.get_mut(&id) {
            player.hand.remove(hand_index);
            self.board.place(
                (x, y),
                PlacedTile {
                    id: card_id,
                    shape,
                    edges: placed_edges,
                    rotation,
                },
            );
            if let Some(card) = self.deck.draw_one() {
                player.hand.push(card);
            }
        }
        self.check_outcome();
        if !self.over {
            self.advance_turn(true);
        }
        Ok(())
    }

    fn play_action_card(&mut self, id: PlayerId, hand_index: usize) -> Result<(), ActionError> {
        self.require_turn(id)?;
        let kind = {
            let player = self.players.get(&id).ok_or(ActionError::UnknownPlayer)?;
            let card = player.hand.get(hand_index).ok_or(ActionError::NoSuchCard)?;
            match card.kind {
                CardKind::Action(kind) => kind,
                CardKind::Tunnel { .. } => return Err(ActionError::WrongCardKind),
            }
        };
        if let Some(player) = self.players.get_mut(&id) {
            player.hand.remove(hand_index);
        }
        self.resolve_action(id, kind);
        // The turn still passes, but the effect message stays on the
        // status line instead of the usual turn announcement
        self.advance_turn(false);
        Ok(())
    }

    fn draw_and_pass(&mut self, id: PlayerId) -> Result<(), ActionError> {
        self.require_turn(id)?;
        if let Some(card) = self.deck.draw_one() {
            if let Some(player) = self.players.get_mut(&id) {
                player.hand.push(card);
            }
        }
        self.advance_turn(true);
        Ok(())
    }

    /// Apply an action card's effect, then the standard replacement draw
    ///
    /// Every kind gets the replacement draw regardless of branch; near deck
    /// exhaustion the draws simply yield nothing.
    fn resolve_action(&mut self, id: PlayerId, kind: ActionKind) {
        let name = match self.players.get(&id) {
            Some(player) => player.name.clone(),
            None => return,
        };
        let mut message = format!("{} played {}!", name, kind.label());
        match kind {
            ActionKind::CatStartled => {
                let blocks = self.board.start_blocks();
                if blocks.is_empty() {
                    message.push_str(" But every sealed exit is already gone.");
                } else {
                    let target: Coord =
                        blocks[self.rng.next_range(blocks.len() as u32) as usize];
                    self.board.remove_start_block(target);
                    message.push_str(" One of the sealed exits broke open!");
                }
            }
            ActionKind::CatPlays => {
                if let Some(player) = self.players.get_mut(&id) {
                    if !player.hand.is_empty() {
                        let victim = self.rng.next_range(player.hand.len() as u32) as usize;
                        player.hand.remove(victim);
                        message.push_str(" The cat knocked a card out of their hand!");
                    }
                }
            }
            ActionKind::CatLicked => {
                if let Some(card) = self.deck.draw_one() {
                    if let Some(player) = self.players.get_mut(&id) {
                        player.hand.push(card);
                    }
                    message.push_str(" They drew an extra card.");
                }
            }
            ActionKind::CatSleeps => {}
        }
        if let Some(card) = self.deck.draw_one() {
            if let Some(player) = self.players.get_mut(&id) {
                player.hand.push(card);
            }
        }
        self.status = message;
    }

    /// Victory first, then deck-exhaustion defeat
    ///
    /// Runs after every tunnel placement. Action plays and draws never end
    /// the match, even when they empty the deck.
    fn check_outcome(&mut self) {
        if self.board.open_exit_count() == 0 {
            self.over = true;
            self.outcome = Some(Outcome::CatCaught);
            self.status = String::from("Victory! The cat is caught!");
        } else if self.deck.is_empty() {
            self.over = true;
            self.outcome = Some(Outcome::CatEscaped);
            self.status = String::from("Defeat! The deck ran out and the cat escaped!");
        }
    }

    fn advance_turn(&mut self, announce: bool) {
        if self.turn_order.is_empty() {
            self.current_turn = 0;
            return;
        }
        self.current_turn = (self.current_turn + 1) % self.turn_order.len();
        if announce {
            let current = self.turn_order[self.current_turn];
            if let Some(player) = self.players.get(&current) {
                self.status = format!("Turn: {}", player.name);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn set_hand(&mut self, id: PlayerId, hand: Vec<Card>) {
        if let Some(player) = self.players.get_mut(&id) {
            player.hand = hand;
        }
    }

    #[cfg(test)]
    pub(crate) fn drain_deck(&mut self) {
        while self.deck.draw_one().is_some() {}
    }
}
