//! Sparse tunnel board and placement rules
//!
//! The board is an unbounded grid stored sparsely; absence of a key means an
//! empty cell. A fresh board carries the house at the origin with all four
//! exits open, flanked by two sealed start-blocks. Occupied cells are never
//! vacated, with one exception: a start-block can be knocked out by the
//! matching action card.

use std::collections::HashMap;

use crate::tiles;
use tunnel_cat_types::{Direction, Edges, Rotation, ShapeKind, TileId};

/// Board coordinate `(x, y)`; y grows downward
pub type Coord = (i32, i32);

/// Reserved id for the seeded house tile, outside the deck id range
pub const HOUSE_TILE_ID: TileId = 100;

/// Reserved ids for the two seeded start-blocks
pub const START_BLOCK_TILE_IDS: [TileId; 2] = [101, 102];

/// Cells the start-blocks are seeded into, flanking the house
pub const START_BLOCK_CELLS: [Coord; 2] = [(-1, 0), (1, 0)];

/// A tile fixed on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedTile {
    pub id: TileId,
    pub shape: ShapeKind,
    /// Edge flags after the recorded rotation was applied
    pub edges: Edges,
    /// Rotation the card was played with, for display
    pub rotation: Rotation,
}

/// Sparse coordinate-indexed grid of placed tiles
#[derive(Debug, Clone)]
pub struct Board {
    tiles: HashMap<Coord, PlacedTile>,
}

impl Board {
    /// Fresh board with the house and both start-blocks seeded
    pub fn new() -> Self {
        let mut tiles = HashMap::new();
        tiles.insert(
            (0, 0),
            PlacedTile {
                id: HOUSE_TILE_ID,
                shape: ShapeKind::House,
                edges: Edges::OPEN,
                rotation: Rotation::R0,
            },
        );
        for (cell, id) in START_BLOCK_CELLS.into_iter().zip(START_BLOCK_TILE_IDS) {
            tiles.insert(
                cell,
                PlacedTile {
                    id,
                    shape: ShapeKind::StartBlock,
                    edges: Edges::SEALED,
                    rotation: Rotation::R0,
                },
            );
        }
        Board { tiles }
    }

    /// Tile at a cell, if any
    pub fn get(&self, at: Coord) -> Option<&PlacedTile> {
        self.tiles.get(&at)
    }

    pub fn is_occupied(&self, at: Coord) -> bool {
        self.tiles.contains_key(&at)
    }

    /// Number of placed tiles
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// All placed tiles with their coordinates, unordered
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &PlacedTile)> {
        self.tiles.iter().map(|(&at, tile)| (at, tile))
    }

    /// Placement legality for a tile with the given (already rotated) edges
    ///
    /// 1. The target cell must be empty.
    /// 2. At least one of the four neighbor cells must be occupied.
    /// 3. No open edge of the new tile may face a sealed neighbor edge.
    ///
    /// Sealing one's own edge against an open neighbor mouth is legal; the
    /// compatibility rule is one-directional.
    pub fn can_place(&self, edges: Edges, at: Coord) -> bool {
        if self.is_occupied(at) {
            return false;
        }
        let mut has_neighbor = false;
        for dir in Direction::ALL {
            let (dx, dy) = dir.offset();
            let neighbor_cell = (at.0 + dx, at.1 + dy);
            if let Some(neighbor) = self.tiles.get(&neighbor_cell) {
                has_neighbor = true;
                // A tunnel mouth may not run into a neighbor's wall
                if edges.side(dir) && !neighbor.edges.side(dir.opposite()) {
                    return false;
                }
            }
        }
        has_neighbor
    }

    /// Write a tile into a cell
    ///
    /// Callers validate with [`Board::can_place`] first; this is the blind
    /// write half.
    pub fn place(&mut self, at: Coord, tile: PlacedTile) {
        self.tiles.insert(at, tile);
    }

    /// Cells still holding a start-block, sorted for deterministic targeting
    pub fn start_blocks(&self) -> Vec<Coord> {
        let mut cells: Vec<Coord> = self
            .tiles
            .iter()
            .filter(|(_, tile)| tile.shape == ShapeKind::StartBlock)
            .map(|(&at, _)| at)
            .collect();
        cells.sort_unstable();
        cells
    }

    /// Knock the start-block out of a cell, vacating it
    ///
    /// Refuses anything that is not a start-block; no other shape ever
    /// leaves the board.
    pub fn remove_start_block(&mut self, at: Coord) -> bool {
        match self.tiles.get(&at) {
            Some(tile) if tile.shape == ShapeKind::StartBlock => {
                self.tiles.remove(&at);
                true
            }
            _ => false,
        }
    }

    /// Count of (open edge, empty neighbor) pairs over the whole board
    ///
    /// Zero means every tunnel mouth is sealed or connected and the cat is
    /// caught.
    pub fn open_exit_count(&self) -> u32 {
        let mut count = 0;
        for (&(x, y), tile) in &self.tiles {
            for dir in tiles::open_directions(tile.edges) {
                let (dx, dy) = dir.offset();
                if !self.tiles.contains_key(&(x + dx, y + dy)) {
                    count += 1;
                }
            }
        }
        count
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
