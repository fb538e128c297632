//! Core game rules - pure, deterministic, and testable
//!
//! This crate contains the full rules of the cooperative tunnel game:
//! board geometry, the card deck, turn rotation, and win detection. It has
//! **zero dependencies** on networking or I/O, making it:
//!
//! - **Deterministic**: Same seed and same action sequence produce
//!   identical matches
//! - **Testable**: Every rule is exercised by unit tests
//! - **Portable**: Can run behind any transport (TCP, in-process, headless)
//!
//! # Module Structure
//!
//! - [`board`]: Sparse unbounded grid, seeded with the house and two
//!   sealed start blocks, plus placement validation and the open-exit scan
//! - [`deck`]: The 50-card supply of tunnel tiles and action cards
//! - [`match_state`]: The [`Match`] aggregate - roster, turns, action
//!   dispatch, outcome
//! - [`rng`]: Seedable LCG and Fisher-Yates shuffle
//! - [`snapshot`]: Broadcast-friendly view of a match
//! - [`tiles`]: Tunnel shape catalog and edge rotation
//!
//! # Game Rules
//!
//! - **Cooperative goal**: Players extend the tunnel network from the
//!   central house and win together by sealing every open exit
//! - **Placement**: A tile needs at least one neighbor, and an open mouth
//!   may never face a sealed wall
//! - **Turns**: Rotate in join order; placing, playing an action card, or
//!   drawing each spend the turn
//! - **Action cards**: Four cat effects, from reopening a sealed exit to
//!   doing nothing at all
//! - **Outcome**: Zero open exits means the cat is caught; an exhausted
//!   deck with exits still open means it escaped
//!
//! # Example
//!
//! ```
//! use tunnel_cat_core::Match;
//! use tunnel_cat_types::PlayerAction;
//!
//! // Create a match and seat a player
//! let mut game = Match::new(12345);
//! game.apply_action(1, PlayerAction::Join { name: "Alice".to_string() }).unwrap();
//!
//! // Drawing a card spends the turn
//! game.apply_action(1, PlayerAction::Draw).unwrap();
//!
//! let snapshot = game.snapshot();
//! assert_eq!(snapshot.players[0].hand.len(), 4);
//! assert_eq!(snapshot.deck_remaining, 46);
//! assert_eq!(snapshot.open_exits, 2);
//! ```

pub mod board;
pub mod deck;
pub mod match_state;
pub mod rng;
pub mod snapshot;
pub mod tiles;

pub use tunnel_cat_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, Coord, PlacedTile};
pub use deck::{Card, CardKind, Deck};
pub use match_state::{ActionError, Match, Player};
pub use rng::GameRng;
pub use snapshot::{MatchSnapshot, PlacedTileView, PlayerView};
pub use tiles::{base_edges, edges_at, open_directions, rotate_edges};
