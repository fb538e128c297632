//! Tile catalog and rotation
//!
//! Static edge-flag definitions for every tile shape, and the rotation
//! transform applied when a tunnel card is placed.

use arrayvec::ArrayVec;
use tunnel_cat_types::{Direction, Edges, Rotation, ShapeKind};

/// Shapes that appear on deck tunnel cards, in catalog order
pub const DECK_SHAPES: [ShapeKind; 5] = [
    ShapeKind::Turn,
    ShapeKind::Cross,
    ShapeKind::Tee,
    ShapeKind::Line,
    ShapeKind::Block,
];

/// Edge flags for a shape at rotation 0
pub fn base_edges(shape: ShapeKind) -> Edges {
    match shape {
        ShapeKind::Turn => Edges::new(true, true, false, false),
        ShapeKind::Cross => Edges::OPEN,
        ShapeKind::Tee => Edges::new(true, true, true, false),
        ShapeKind::Line => Edges::new(true, false, true, false),
        ShapeKind::Block => Edges::SEALED,
        ShapeKind::House => Edges::OPEN,
        ShapeKind::StartBlock => Edges::SEALED,
    }
}

/// Rotate edge flags clockwise
///
/// One quarter turn cyclically right-rotates the `[top, right, bottom, left]`
/// vector: left lands on top, top on right, right on bottom, bottom on left.
/// Returns a new value; the placed tile records the applied rotation
/// separately for display.
pub fn rotate_edges(edges: Edges, rotation: Rotation) -> Edges {
    let Edges {
        top,
        right,
        bottom,
        left,
    } = edges;
    match rotation {
        Rotation::R0 => edges,
        Rotation::R90 => Edges::new(left, top, right, bottom),
        Rotation::R180 => Edges::new(bottom, left, top, right),
        Rotation::R270 => Edges::new(right, bottom, left, top),
    }
}

/// Edge flags for a shape under a rotation
pub fn edges_at(shape: ShapeKind, rotation: Rotation) -> Edges {
    rotate_edges(base_edges(shape), rotation)
}

/// Directions whose edge is an open tunnel mouth
///
/// Stack-only; at most four entries.
pub fn open_directions(edges: Edges) -> ArrayVec<Direction, 4> {
    let mut open = ArrayVec::new();
    for dir in Direction::ALL {
        if edges.side(dir) {
            open.push(dir);
        }
    }
    open
}
