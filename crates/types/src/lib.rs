//! Shared types for the tunnel-cat rules engine
//!
//! This crate defines the vocabulary used throughout the workspace.
//! All types are pure data structures with no external dependencies, making
//! them usable in any context (rules engine, transport adapter, tooling).
//!
//! # Deck Composition
//!
//! A fresh deck always contains exactly 50 cards:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TUNNEL_TILE_COUNT` | 40 | Tunnel tiles, sampled from the shape catalog |
//! | `ACTION_CARD_COUNT` | 10 | One-shot action cards |
//! | `STARTING_HAND_SIZE` | 3 | Cards dealt on join and on restart |
//!
//! # Geometry
//!
//! The board is an unbounded grid of signed integer coordinates. The Y axis
//! grows downward, matching the way clients draw the grid: [`Direction::Up`]
//! is the cell at `(x, y - 1)`.
//!
//! # Examples
//!
//! ```
//! use tunnel_cat_types::{Direction, Rotation, ShapeKind};
//!
//! // Directions know their opposites and offsets
//! assert_eq!(Direction::Up.opposite(), Direction::Down);
//! assert_eq!(Direction::Left.offset(), (-1, 0));
//!
//! // Rotations are quarter turns and wrap modulo 4
//! assert_eq!(Rotation::from_quarter_turns(5), Rotation::R90);
//!
//! // Shape kinds round-trip through their wire names
//! let shape = ShapeKind::from_str("t-shape").unwrap();
//! assert_eq!(shape.as_str(), "t-shape");
//! ```

/// Tunnel tiles in a fresh deck (40)
pub const TUNNEL_TILE_COUNT: usize = 40;

/// Action cards in a fresh deck (10)
pub const ACTION_CARD_COUNT: usize = 10;

/// Total cards in a fresh deck (50)
pub const DECK_SIZE: usize = TUNNEL_TILE_COUNT + ACTION_CARD_COUNT;

/// Cards dealt to each player on join and on restart (3)
pub const STARTING_HAND_SIZE: usize = 3;

/// Opaque player identity, assigned by the transport layer
pub type PlayerId = u64;

/// Stable identity of a deck card or a board-seeded tile
pub type TileId = u32;

/// The four board directions
///
/// Y grows downward: `Up` points at `(x, y - 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// All four directions in top/right/bottom/left order
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Coordinate offset of the adjacent cell in this direction
    ///
    /// # Examples
    ///
    /// ```
    /// use tunnel_cat_types::Direction;
    ///
    /// assert_eq!(Direction::Up.offset(), (0, -1));
    /// assert_eq!(Direction::Down.offset(), (0, 1));
    /// ```
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }

    /// The direction a neighbor in this direction faces back from
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }
}

/// Clockwise rotation in 90° steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    /// All rotations in increasing order
    pub const ALL: [Rotation; 4] = [
        Rotation::R0,
        Rotation::R90,
        Rotation::R180,
        Rotation::R270,
    ];

    /// Number of quarter turns, 0..=3
    pub fn quarter_turns(self) -> u8 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 1,
            Rotation::R180 => 2,
            Rotation::R270 => 3,
        }
    }

    /// Build from a quarter-turn count, wrapping modulo 4
    ///
    /// # Examples
    ///
    /// ```
    /// use tunnel_cat_types::Rotation;
    ///
    /// assert_eq!(Rotation::from_quarter_turns(0), Rotation::R0);
    /// assert_eq!(Rotation::from_quarter_turns(3), Rotation::R270);
    /// assert_eq!(Rotation::from_quarter_turns(5), Rotation::R90);
    /// ```
    pub fn from_quarter_turns(turns: u8) -> Rotation {
        match turns % 4 {
            0 => Rotation::R0,
            1 => Rotation::R90,
            2 => Rotation::R180,
            _ => Rotation::R270,
        }
    }
}

/// A tile's four edge flags
///
/// `true` means the edge has an open tunnel mouth, `false` means the edge is
/// a sealed wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Edges {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl Edges {
    /// All four edges sealed
    pub const SEALED: Edges = Edges::new(false, false, false, false);

    /// All four edges open
    pub const OPEN: Edges = Edges::new(true, true, true, true);

    pub const fn new(top: bool, right: bool, bottom: bool, left: bool) -> Self {
        Edges {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Flag on the given side
    pub fn side(self, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.top,
            Direction::Right => self.right,
            Direction::Down => self.bottom,
            Direction::Left => self.left,
        }
    }
}

/// Tunnel tile shapes
///
/// The first five appear on deck cards; `House` and `StartBlock` are seeded
/// onto the board at match start and never dealt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// Corner piece, top and right open
    Turn,
    /// Four-way junction, everything open
    Cross,
    /// Three-way junction, only the left sealed
    Tee,
    /// Straight corridor, top and bottom open
    Line,
    /// Dead end, all edges sealed
    Block,
    /// The central tile at the origin, all edges open
    House,
    /// Removable seed wall flanking the house
    StartBlock,
}

impl ShapeKind {
    /// Wire/display name
    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Turn => "turn",
            ShapeKind::Cross => "cross",
            ShapeKind::Tee => "t-shape",
            ShapeKind::Line => "line",
            ShapeKind::Block => "block",
            ShapeKind::House => "house",
            ShapeKind::StartBlock => "start-block",
        }
    }

    /// Parse a wire name back into a shape kind
    ///
    /// # Examples
    ///
    /// ```
    /// use tunnel_cat_types::ShapeKind;
    ///
    /// assert_eq!(ShapeKind::from_str("line"), Some(ShapeKind::Line));
    /// assert_eq!(ShapeKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "turn" => Some(ShapeKind::Turn),
            "cross" => Some(ShapeKind::Cross),
            "t-shape" => Some(ShapeKind::Tee),
            "line" => Some(ShapeKind::Line),
            "block" => Some(ShapeKind::Block),
            "house" => Some(ShapeKind::House),
            "start-block" => Some(ShapeKind::StartBlock),
            _ => None,
        }
    }
}

/// One-shot action card kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Knocks a random start-block off the board, reopening that exit
    CatStartled,
    /// Swats a random card out of the acting player's hand
    CatPlays,
    /// Grants one extra draw on top of the usual replacement
    CatLicked,
    /// No effect beyond the replacement draw
    CatSleeps,
}

impl ActionKind {
    /// All four kinds, in catalog order
    pub const ALL: [ActionKind; 4] = [
        ActionKind::CatStartled,
        ActionKind::CatPlays,
        ActionKind::CatLicked,
        ActionKind::CatSleeps,
    ];

    /// Wire name
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::CatStartled => "cat_startled",
            ActionKind::CatPlays => "cat_plays",
            ActionKind::CatLicked => "cat_licked",
            ActionKind::CatSleeps => "cat_sleeps",
        }
    }

    /// Parse a wire name back into an action kind
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "cat_startled" => Some(ActionKind::CatStartled),
            "cat_plays" => Some(ActionKind::CatPlays),
            "cat_licked" => Some(ActionKind::CatLicked),
            "cat_sleeps" => Some(ActionKind::CatSleeps),
            _ => None,
        }
    }

    /// Human-readable label used in status messages
    pub fn label(self) -> &'static str {
        match self {
            ActionKind::CatStartled => "Cat Startled",
            ActionKind::CatPlays => "Cat Plays",
            ActionKind::CatLicked => "Cat Licked",
            ActionKind::CatSleeps => "Cat Sleeps",
        }
    }
}

/// Terminal result of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every tunnel mouth sealed or connected; the players win
    CatCaught,
    /// Deck exhausted with exits still open; the players lose
    CatEscaped,
}

impl Outcome {
    /// Wire name
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::CatCaught => "cat_caught",
            Outcome::CatEscaped => "cat_escaped",
        }
    }
}

/// One player action entering the match controller
///
/// `Join` and `Leave` are accepted at any time. `Restart` also works after
/// the match has ended and regardless of whose turn it is. Everything else
/// requires the acting player to hold the current turn in a live match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerAction {
    /// Enter the roster and receive a starting hand
    Join { name: String },
    /// Place the tunnel card at `hand_index` onto the board
    PlayTunnel {
        hand_index: usize,
        x: i32,
        y: i32,
        rotation: Rotation,
    },
    /// Play the action card at `hand_index`
    PlayAction { hand_index: usize },
    /// Draw one card (if any remain) and pass the turn
    Draw,
    /// Fresh board and deck; roster and turn order survive
    Restart,
    /// Leave the roster
    Leave,
}
