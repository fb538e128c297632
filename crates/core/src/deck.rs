//! Deck construction and drawing
//!
//! The shared draw pile is built once per match: 40 tunnel tiles sampled
//! uniformly (with replacement) from the shape catalog plus 10 action cards
//! sampled uniformly from the four kinds, shuffled with the injected RNG.
//! Cards only ever leave the deck; nothing is ever put back.

use crate::rng::GameRng;
use crate::tiles;
use tunnel_cat_types::{
    ActionKind, Edges, ShapeKind, TileId, ACTION_CARD_COUNT, DECK_SIZE, TUNNEL_TILE_COUNT,
};

/// What a card is, discriminated explicitly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardKind {
    /// A placeable tunnel tile with its catalog edge flags
    Tunnel { shape: ShapeKind, edges: Edges },
    /// A one-shot action, never placed on the board
    Action(ActionKind),
}

/// A drawable card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    pub id: TileId,
    pub kind: CardKind,
}

/// The shared draw pile
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Build and shuffle a fresh 50-card deck
    ///
    /// Tunnel cards take ids `0..40`, action cards `40..50`; the shuffle
    /// only changes order, never composition.
    pub fn generate(rng: &mut GameRng) -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for i in 0..TUNNEL_TILE_COUNT {
            let shape = tiles::DECK_SHAPES[rng.next_range(tiles::DECK_SHAPES.len() as u32) as usize];
            cards.push(Card {
                id: i as TileId,
                kind: CardKind::Tunnel {
                    shape,
                    edges: tiles::base_edges(shape),
                },
            });
        }
        for i in 0..ACTION_CARD_COUNT {
            let kind = ActionKind::ALL[rng.next_range(ActionKind::ALL.len() as u32) as usize];
            cards.push(Card {
                id: (TUNNEL_TILE_COUNT + i) as TileId,
                kind: CardKind::Action(kind),
            });
        }
        rng.shuffle(&mut cards);
        Deck { cards }
    }

    /// Remove and return up to `n` cards from the tail of the pile
    ///
    /// Partial draws near exhaustion are normal; an empty deck yields an
    /// empty draw, never an error.
    pub fn draw(&mut self, n: usize) -> Vec<Card> {
        let mut drawn = Vec::with_capacity(n.min(self.cards.len()));
        for _ in 0..n {
            match self.cards.pop() {
                Some(card) => drawn.push(card),
                None => break,
            }
        }
        drawn
    }

    /// Remove and return the tail card, if any remain
    pub fn draw_one(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Cards left in the pile
    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
